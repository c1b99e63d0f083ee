//! Diagram assembly: parse schema text, resolve table positions, and hand
//! out routed connectors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geom::{CanvasBounds, Point};
use crate::layout::{allocate_position, route_connector, would_overlap, RoutedConnector};
use crate::measure::TableMetrics;
use crate::parser::{parse_relationships, parse_schema};
use crate::schema::{Relationship, TableMap};

/// Saved table positions, keyed by table name. Serialized to TOML alongside
/// the schema so a diagram keeps its layout across edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionMap {
    #[serde(default)]
    pub tables: IndexMap<String, Point>,
}

impl PositionMap {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// A laid-out diagram. Tables keep their source order; relationships keep
/// theirs. Positions are the only state that changes after construction.
#[derive(Debug, Clone)]
pub struct Diagram {
    pub tables: TableMap,
    pub relationships: Vec<Relationship>,
    pub metrics: TableMetrics,
    pub bounds: CanvasBounds,
}

impl Diagram {
    /// Parse schema text and lay out the tables. Positions in `prior` are
    /// carried forward by table name; tables without one get a fresh
    /// allocation, in source order, against everything placed so far.
    pub fn build(
        source: &str,
        prior: &PositionMap,
        metrics: TableMetrics,
        bounds: CanvasBounds,
    ) -> Self {
        let parsed = parse_schema(source);
        let relationships = parse_relationships(source);

        let mut tables = TableMap::new();
        for (name, mut table) in parsed {
            table.position = match prior.tables.get(&name) {
                Some(&position) => position,
                None => allocate_position(&table.fields, &tables, &metrics, &bounds),
            };
            tables.insert(name, table);
        }

        Self {
            tables,
            relationships,
            metrics,
            bounds,
        }
    }

    /// Snapshot of current positions, for saving.
    pub fn positions(&self) -> PositionMap {
        PositionMap {
            tables: self
                .tables
                .iter()
                .map(|(name, table)| (name.clone(), table.position))
                .collect(),
        }
    }

    /// Route every resolvable relationship. Relationships naming unknown
    /// tables or fields are dropped.
    pub fn connectors(&self) -> Vec<RoutedConnector> {
        self.relationships
            .iter()
            .filter_map(|rel| route_connector(rel, &self.tables, &self.metrics))
            .collect()
    }

    /// Try to move a table. The candidate is snapped to the grid and kept
    /// non-negative; the move is rejected when it would collide with another
    /// table. Returns whether the move was applied.
    pub fn move_table(&mut self, name: &str, candidate: Point) -> bool {
        if !self.tables.contains_key(name) {
            return false;
        }

        let target = candidate.snapped().floored();
        if would_overlap(name, target, &self.tables, &self.metrics) {
            return false;
        }

        if let Some(table) = self.tables.get_mut(name) {
            table.position = target;
        }
        true
    }
}
