//! The overlap oracle: padded axis-aligned box intersection.
//!
//! Both the allocator and interactive drag validation reduce to the same
//! predicate, differing only in which tables are tested and how much
//! clearance is demanded.

use crate::geom::Point;
use crate::measure::TableMetrics;
use crate::schema::TableMap;

/// True when two table boxes, inflated by `spacing` on every side, intersect.
/// Touching at exactly the spacing distance counts as clear.
pub fn boxes_overlap(
    a: Point,
    height_a: f64,
    b: Point,
    height_b: f64,
    width: f64,
    spacing: f64,
) -> bool {
    a.x < b.x + width + spacing
        && a.x + width + spacing > b.x
        && a.y < b.y + height_b + spacing
        && a.y + height_a + spacing > b.y
}

/// Does a candidate box with `field_count` rows collide with any existing
/// table? Used by the allocator, which tests against every placed table.
pub fn overlaps_any(
    candidate: Point,
    field_count: usize,
    tables: &TableMap,
    metrics: &TableMetrics,
    spacing: f64,
) -> bool {
    let height = metrics.table_height(field_count);
    tables.values().any(|other| {
        boxes_overlap(
            candidate,
            height,
            other.position,
            metrics.table_height(other.fields.len()),
            metrics.table_width,
            spacing,
        )
    })
}

/// Drag validation: would moving `name` to `candidate` collide with any
/// *other* table? Unknown names validate trivially.
pub fn would_overlap(
    name: &str,
    candidate: Point,
    tables: &TableMap,
    metrics: &TableMetrics,
) -> bool {
    let Some(table) = tables.get(name) else {
        return false;
    };
    let height = metrics.table_height(table.fields.len());

    tables.values().filter(|other| other.name != name).any(|other| {
        boxes_overlap(
            candidate,
            height,
            other.position,
            metrics.table_height(other.fields.len()),
            metrics.table_width,
            metrics.drag_spacing,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Table;

    fn table(name: &str, x: f64, y: f64, rows: usize) -> Table {
        Table {
            name: name.into(),
            position: Point::new(x, y),
            fields: std::iter::repeat_with(|| crate::schema::Field {
                name: "f".into(),
                typ: "integer".into(),
                is_primary: false,
                is_required: true,
                reference: None,
            })
            .take(rows)
            .collect(),
        }
    }

    fn map(tables: Vec<Table>) -> TableMap {
        tables.into_iter().map(|t| (t.name.clone(), t)).collect()
    }

    #[test]
    fn test_distant_boxes_clear() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1000.0, 0.0);
        assert!(!boxes_overlap(a, 59.0, b, 59.0, 200.0, 60.0));
    }

    #[test]
    fn test_spacing_counts_as_collision() {
        // Visually 50px apart, but inside the 60px clearance.
        let a = Point::new(0.0, 0.0);
        let b = Point::new(250.0, 0.0);
        assert!(boxes_overlap(a, 59.0, b, 59.0, 200.0, 60.0));
        // At exactly spacing distance the boxes are clear.
        let c = Point::new(260.0, 0.0);
        assert!(!boxes_overlap(a, 59.0, c, 59.0, 200.0, 60.0));
    }

    #[test]
    fn test_vertical_separation_clears() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 500.0);
        assert!(!boxes_overlap(a, 59.0, b, 59.0, 200.0, 60.0));
    }

    #[test]
    fn test_would_overlap_skips_self() {
        let tables = map(vec![table("users", 100.0, 100.0, 2)]);
        let m = TableMetrics::default();
        // A table never collides with its own current position.
        assert!(!would_overlap("users", Point::new(100.0, 100.0), &tables, &m));
    }

    #[test]
    fn test_would_overlap_against_neighbor() {
        let tables = map(vec![
            table("users", 100.0, 100.0, 2),
            table("posts", 600.0, 100.0, 2),
        ]);
        let m = TableMetrics::default();
        assert!(would_overlap("users", Point::new(550.0, 100.0), &tables, &m));
        assert!(!would_overlap("users", Point::new(100.0, 400.0), &tables, &m));
    }

    #[test]
    fn test_unknown_table_validates() {
        let tables = map(vec![table("users", 100.0, 100.0, 2)]);
        let m = TableMetrics::default();
        assert!(!would_overlap("ghost", Point::new(100.0, 100.0), &tables, &m));
    }
}
