//! The parsed schema model: tables, fields, and relationships.

use indexmap::IndexMap;

use crate::geom::Point;

/// Insertion-ordered mapping of table name to table. Source order matters:
/// the allocator places tables one at a time in order of appearance, so a
/// re-parse of the same text reproduces the same layout.
pub type TableMap = IndexMap<String, Table>;

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    /// The only mutable part of a table after parsing, updated by layout
    /// allocation or user drag.
    pub position: Point,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub typ: String,
    pub is_primary: bool,
    pub is_required: bool,
    /// At most one inline `[ref: ...]` per field.
    pub reference: Option<FieldRef>,
}

/// An inline reference annotation on a field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    pub direction: RefDirection,
    pub table: String,
    pub field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefDirection {
    /// `>`: this field references the target.
    ToTarget,
    /// `<`: the target references this field.
    FromSource,
}

/// A directed, cardinality-typed edge between two fields. Not owned by any
/// table; a relationship naming a missing table or field is simply skipped
/// at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub from_table: String,
    pub from_field: String,
    pub to_table: String,
    pub to_field: String,
    pub kind: RelationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    OneToMany,
    ManyToOne,
    OneToOne,
    ManyToMany,
}

impl Table {
    /// Look up a field index by name. First match wins.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}
