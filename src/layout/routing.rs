//! Connector routing between field anchors.
//!
//! Routes are orthogonal polylines with rounded corners. The topology is
//! chosen from the horizontal relation of the two table boxes: disjoint
//! tables get an S-shaped run through the midpoint between their facing
//! edges, horizontally overlapping tables detour around the widest right
//! edge. Endpoints sit a few pixels off the table edge so cardinality
//! markers do not touch the box border.

use log::warn;

use crate::geom::Point;
use crate::measure::TableMetrics;
use crate::schema::{RelationKind, Relationship, TableMap};

/// Detour clearance beyond the widest right edge when tables overlap
/// horizontally.
const CLEARANCE: f64 = 35.0;
/// Gap between a table edge and the connector endpoint.
const ENDPOINT_OFFSET: f64 = 3.0;
/// Corner rounding radius.
const CURVE_RADIUS: f64 = 5.0;

/// One drawing instruction of a routed path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    Move(Point),
    Line(Point),
    Quad { ctrl: Point, to: Point },
}

/// Cardinality glyph drawn at a connector endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Perpendicular tick.
    One,
    /// Crow's foot.
    Many,
    /// Tick plus circle, for one-to-one ends.
    OneCircle,
}

/// A fully routed connector, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedConnector {
    pub path: Vec<PathOp>,
    pub from_anchor: Point,
    pub to_anchor: Point,
    pub from_marker: MarkerKind,
    pub to_marker: MarkerKind,
    /// Marker rotations in degrees. 0 points the marker rightward.
    pub from_rotation: f64,
    pub to_rotation: f64,
}

/// Route one relationship. Returns `None` when either endpoint names a
/// table or field that does not exist; the connector is simply dropped.
pub fn route_connector(
    rel: &Relationship,
    tables: &TableMap,
    metrics: &TableMetrics,
) -> Option<RoutedConnector> {
    let from = tables.get(&rel.from_table)?;
    let to = tables.get(&rel.to_table)?;

    let (Some(from_index), Some(to_index)) =
        (from.field_index(&rel.from_field), to.field_index(&rel.to_field))
    else {
        warn!(
            "dropping connector {}.{} -> {}.{}: field not found",
            rel.from_table, rel.from_field, rel.to_table, rel.to_field
        );
        return None;
    };

    let from_y = metrics.field_anchor_y(from.position, from_index);
    let to_y = metrics.field_anchor_y(to.position, to_index);
    let from_right = from.position.x + metrics.table_width;
    let to_right = to.position.x + metrics.table_width;

    let (points, from_rotation, to_rotation) = if from_right < to.position.x {
        // Source strictly left of target: exit right, enter left.
        let fx = from_right + ENDPOINT_OFFSET;
        let tx = to.position.x - ENDPOINT_OFFSET;
        let mid = fx + (tx - fx) / 2.0;
        (
            vec![
                Point::new(fx, from_y),
                Point::new(mid, from_y),
                Point::new(mid, to_y),
                Point::new(tx, to_y),
            ],
            0.0,
            180.0,
        )
    } else if to_right < from.position.x {
        // Mirrored: exit left, enter right.
        let fx = from.position.x - ENDPOINT_OFFSET;
        let tx = to_right + ENDPOINT_OFFSET;
        let mid = tx + (fx - tx) / 2.0;
        (
            vec![
                Point::new(fx, from_y),
                Point::new(mid, from_y),
                Point::new(mid, to_y),
                Point::new(tx, to_y),
            ],
            180.0,
            0.0,
        )
    } else {
        // Horizontal overlap: both ends exit right and detour around the
        // widest right edge.
        let detour = from_right.max(to_right) + CLEARANCE;
        let fx = from_right + ENDPOINT_OFFSET;
        let tx = to_right + ENDPOINT_OFFSET;
        (
            vec![
                Point::new(fx, from_y),
                Point::new(detour, from_y),
                Point::new(detour, to_y),
                Point::new(tx, to_y),
            ],
            0.0,
            0.0,
        )
    };

    let (from_marker, to_marker) = marker_kinds(rel.kind);
    let from_anchor = points[0];
    let to_anchor = points[points.len() - 1];

    Some(RoutedConnector {
        path: smooth_corners(&points, CURVE_RADIUS),
        from_anchor,
        to_anchor,
        from_marker,
        to_marker,
        from_rotation,
        to_rotation,
    })
}

fn marker_kinds(kind: RelationKind) -> (MarkerKind, MarkerKind) {
    match kind {
        RelationKind::OneToMany => (MarkerKind::One, MarkerKind::Many),
        RelationKind::ManyToOne => (MarkerKind::Many, MarkerKind::One),
        RelationKind::OneToOne => (MarkerKind::OneCircle, MarkerKind::OneCircle),
        RelationKind::ManyToMany => (MarkerKind::Many, MarkerKind::Many),
    }
}

/// Turn an orthogonal polyline into path ops with rounded corners.
///
/// Each interior corner is replaced by a straight approach stopping one
/// radius short, then a quadratic curve through the corner point. Segments
/// shorter than the radius keep their sharp corner. The first and last
/// points are always preserved exactly.
pub fn smooth_corners(points: &[Point], radius: f64) -> Vec<PathOp> {
    let mut ops = Vec::new();
    if points.len() < 2 {
        return ops;
    }

    ops.push(PathOp::Move(points[0]));

    for i in 0..points.len() - 1 {
        let current = points[i];
        let next = points[i + 1];

        if i + 2 >= points.len() {
            ops.push(PathOp::Line(next));
            continue;
        }
        let after = points[i + 2];

        let horizontal_then_vertical = (current.x - next.x).abs() > (current.y - next.y).abs()
            && (next.y - after.y).abs() > (next.x - after.x).abs();
        let vertical_then_horizontal = (current.y - next.y).abs() > (current.x - next.x).abs()
            && (next.x - after.x).abs() > (next.y - after.y).abs();

        if horizontal_then_vertical {
            let approach_x = if next.x > current.x {
                next.x - radius
            } else {
                next.x + radius
            };
            let exit_y = if after.y > next.y {
                next.y + radius
            } else {
                next.y - radius
            };
            ops.push(PathOp::Line(Point::new(approach_x, next.y)));
            ops.push(PathOp::Quad {
                ctrl: next,
                to: Point::new(next.x, exit_y),
            });
        } else if vertical_then_horizontal {
            let approach_y = if next.y > current.y {
                next.y - radius
            } else {
                next.y + radius
            };
            let exit_x = if after.x > next.x {
                next.x + radius
            } else {
                next.x - radius
            };
            ops.push(PathOp::Line(Point::new(next.x, approach_y)));
            ops.push(PathOp::Quad {
                ctrl: next,
                to: Point::new(exit_x, next.y),
            });
        } else {
            ops.push(PathOp::Line(next));
        }
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Table};
    use float_cmp::assert_approx_eq;

    fn table(name: &str, x: f64, y: f64, field_names: &[&str]) -> Table {
        Table {
            name: name.into(),
            position: Point::new(x, y),
            fields: field_names
                .iter()
                .map(|n| Field {
                    name: (*n).into(),
                    typ: "integer".into(),
                    is_primary: false,
                    is_required: true,
                    reference: None,
                })
                .collect(),
        }
    }

    fn map(tables: Vec<Table>) -> TableMap {
        tables.into_iter().map(|t| (t.name.clone(), t)).collect()
    }

    fn rel(kind: RelationKind) -> Relationship {
        Relationship {
            from_table: "posts".into(),
            from_field: "user_id".into(),
            to_table: "users".into(),
            to_field: "id".into(),
            kind,
        }
    }

    fn first_point(ops: &[PathOp]) -> Point {
        match ops[0] {
            PathOp::Move(p) => p,
            _ => panic!("path must start with a move"),
        }
    }

    fn last_point(ops: &[PathOp]) -> Point {
        match ops[ops.len() - 1] {
            PathOp::Line(p) | PathOp::Move(p) => p,
            PathOp::Quad { to, .. } => to,
        }
    }

    #[test]
    fn test_disjoint_left_to_right() {
        let tables = map(vec![
            table("posts", 100.0, 100.0, &["id", "user_id"]),
            table("users", 600.0, 100.0, &["id"]),
        ]);
        let m = TableMetrics::default();
        let routed = route_connector(&rel(RelationKind::ManyToOne), &tables, &m).unwrap();

        // Exit the source's right edge, enter the target's left edge.
        assert_approx_eq!(f64, routed.from_anchor.x, 100.0 + 200.0 + 3.0);
        assert_approx_eq!(f64, routed.to_anchor.x, 600.0 - 3.0);
        assert_approx_eq!(f64, routed.from_rotation, 0.0);
        assert_approx_eq!(f64, routed.to_rotation, 180.0);

        // Anchors land on the field rows.
        assert_approx_eq!(f64, routed.from_anchor.y, m.field_anchor_y(Point::new(0.0, 100.0), 1));
        assert_approx_eq!(f64, routed.to_anchor.y, m.field_anchor_y(Point::new(0.0, 100.0), 0));

        assert_eq!(first_point(&routed.path), routed.from_anchor);
        assert_eq!(last_point(&routed.path), routed.to_anchor);
    }

    #[test]
    fn test_disjoint_right_to_left_mirrors() {
        let tables = map(vec![
            table("posts", 600.0, 100.0, &["id", "user_id"]),
            table("users", 100.0, 100.0, &["id"]),
        ]);
        let m = TableMetrics::default();
        let routed = route_connector(&rel(RelationKind::ManyToOne), &tables, &m).unwrap();

        assert_approx_eq!(f64, routed.from_anchor.x, 600.0 - 3.0);
        assert_approx_eq!(f64, routed.to_anchor.x, 100.0 + 200.0 + 3.0);
        assert_approx_eq!(f64, routed.from_rotation, 180.0);
        assert_approx_eq!(f64, routed.to_rotation, 0.0);
    }

    #[test]
    fn test_horizontal_overlap_detours_right() {
        let tables = map(vec![
            table("posts", 100.0, 100.0, &["id", "user_id"]),
            table("users", 150.0, 400.0, &["id"]),
        ]);
        let m = TableMetrics::default();
        let routed = route_connector(&rel(RelationKind::ManyToOne), &tables, &m).unwrap();

        // Both ends face right.
        assert_approx_eq!(f64, routed.from_rotation, 0.0);
        assert_approx_eq!(f64, routed.to_rotation, 0.0);

        // The detour runs past the widest right edge plus clearance.
        let detour = 150.0 + 200.0 + 35.0;
        let max_x = routed
            .path
            .iter()
            .map(|op| match op {
                PathOp::Move(p) | PathOp::Line(p) => p.x,
                PathOp::Quad { ctrl, .. } => ctrl.x,
            })
            .fold(f64::MIN, f64::max);
        assert_approx_eq!(f64, max_x, detour);
    }

    #[test]
    fn test_missing_table_drops_connector() {
        let tables = map(vec![table("posts", 100.0, 100.0, &["id", "user_id"])]);
        let m = TableMetrics::default();
        assert!(route_connector(&rel(RelationKind::ManyToOne), &tables, &m).is_none());
    }

    #[test]
    fn test_missing_field_drops_connector() {
        let tables = map(vec![
            table("posts", 100.0, 100.0, &["id", "user_id"]),
            table("users", 600.0, 100.0, &["uuid"]),
        ]);
        let m = TableMetrics::default();
        assert!(route_connector(&rel(RelationKind::ManyToOne), &tables, &m).is_none());
    }

    #[test]
    fn test_marker_kinds_by_cardinality() {
        assert_eq!(
            marker_kinds(RelationKind::OneToMany),
            (MarkerKind::One, MarkerKind::Many)
        );
        assert_eq!(
            marker_kinds(RelationKind::ManyToOne),
            (MarkerKind::Many, MarkerKind::One)
        );
        assert_eq!(
            marker_kinds(RelationKind::OneToOne),
            (MarkerKind::OneCircle, MarkerKind::OneCircle)
        );
        assert_eq!(
            marker_kinds(RelationKind::ManyToMany),
            (MarkerKind::Many, MarkerKind::Many)
        );
    }

    #[test]
    fn test_smoothing_preserves_endpoints() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 80.0),
            Point::new(200.0, 80.0),
        ];
        let ops = smooth_corners(&points, 5.0);
        assert_eq!(ops[0], PathOp::Move(points[0]));
        match ops[ops.len() - 1] {
            PathOp::Line(p) => assert_eq!(p, points[3]),
            _ => panic!("path must end with a straight segment"),
        }
        // Two interior corners become two curves.
        let quads = ops
            .iter()
            .filter(|op| matches!(op, PathOp::Quad { .. }))
            .count();
        assert_eq!(quads, 2);
    }

    #[test]
    fn test_straight_run_has_no_curves() {
        let points = vec![Point::new(0.0, 0.0), Point::new(200.0, 0.0)];
        let ops = smooth_corners(&points, 5.0);
        assert_eq!(
            ops,
            vec![
                PathOp::Move(Point::new(0.0, 0.0)),
                PathOp::Line(Point::new(200.0, 0.0)),
            ]
        );
    }
}
