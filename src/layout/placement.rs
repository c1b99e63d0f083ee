//! Automatic position allocation for newly parsed tables.
//!
//! Placement is a staged search: a three-column grid slot first, then a
//! spiral of probes around that slot, then deterministic fallbacks. Every
//! stage tests candidates with the padded overlap oracle and clamps them
//! into the canvas, so a successful early return never collides with an
//! existing table. Only the final best-effort position may overlap, and
//! that stage is reached only on a saturated canvas.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::{CanvasBounds, Point};
use crate::measure::TableMetrics;
use crate::schema::{Field, TableMap};

use super::overlap::overlaps_any;

const GRID_COLUMNS: usize = 3;
const SPIRAL_MAX_RADIUS: usize = 20;
const SPIRAL_ANGLE_STEP: usize = 15;
const SPIRAL_MAX_PROBES: usize = 400;
const RANDOM_PROBES: usize = 50;
const LAST_RESORT_STEP: f64 = 10.0;

/// Find a collision-free position for a table with the given fields.
///
/// Deterministic: the result depends only on the current table snapshot,
/// so re-running over the same schema reproduces the same layout.
pub fn allocate_position(
    fields: &[Field],
    existing: &TableMap,
    metrics: &TableMetrics,
    bounds: &CanvasBounds,
) -> Point {
    let height = metrics.table_height(fields.len());
    let clamp = |p: Point| bounds.clamp(p, metrics.table_width, height);

    if existing.is_empty() {
        return clamp(bounds.anchor());
    }

    let spacing = metrics.min_spacing;
    let col_pitch = metrics.table_width + spacing * 2.0;
    let row_pitch = height + spacing * 2.0;
    let origin = Point::new(bounds.min_x + bounds.padding, bounds.min_y + bounds.padding);

    // Stage 1: the next free slot in a three-column grid.
    let slot = existing.len();
    let col = (slot % GRID_COLUMNS) as f64;
    let row = (slot / GRID_COLUMNS) as f64;
    let base = Point::new(origin.x + col * col_pitch, origin.y + row * row_pitch);

    let candidate = clamp(base);
    if !overlaps_any(candidate, fields.len(), existing, metrics, spacing) {
        return candidate;
    }
    debug!("grid slot {slot} occupied, probing outward");

    // Stage 2: spiral outward from the grid slot, widening one pitch per
    // revolution, capped at a fixed probe budget.
    let mut probes = 0;
    for radius in 1..=SPIRAL_MAX_RADIUS {
        for angle in (0..360).step_by(SPIRAL_ANGLE_STEP) {
            if probes >= SPIRAL_MAX_PROBES {
                break;
            }
            probes += 1;

            let radians = (angle as f64).to_radians();
            let probe = clamp(Point::new(
                base.x + radius as f64 * col_pitch * radians.cos(),
                base.y + radius as f64 * row_pitch * radians.sin(),
            ));
            if !overlaps_any(probe, fields.len(), existing, metrics, spacing) {
                return probe;
            }
        }
    }
    debug!("spiral search exhausted after {probes} probes");

    fallback_position(fields, existing, metrics, bounds, height)
}

/// Stages after the spiral: right of the rightmost table, below the
/// bottommost, scattered grid-snapped probes, then a best-effort position
/// that ignores overlap entirely.
fn fallback_position(
    fields: &[Field],
    existing: &TableMap,
    metrics: &TableMetrics,
    bounds: &CanvasBounds,
    height: f64,
) -> Point {
    let spacing = metrics.min_spacing;
    let clamp = |p: Point| bounds.clamp(p, metrics.table_width, height);
    let origin = Point::new(bounds.min_x + bounds.padding, bounds.min_y + bounds.padding);

    let mut max_right = origin.x;
    let mut max_bottom = origin.y;
    for table in existing.values() {
        max_right = max_right.max(table.position.x + metrics.table_width);
        max_bottom = max_bottom.max(table.position.y + metrics.table_height(table.fields.len()));
    }

    let right = clamp(Point::new(max_right + spacing, origin.y));
    if !overlaps_any(right, fields.len(), existing, metrics, spacing) {
        return right;
    }

    let below = clamp(Point::new(origin.x, max_bottom + spacing));
    if !overlaps_any(below, fields.len(), existing, metrics, spacing) {
        return below;
    }

    // Scattered probes, seeded on the table count so the same snapshot
    // always visits the same cells.
    let mut rng = StdRng::seed_from_u64(existing.len() as u64);
    let span_x = (bounds.width - 2.0 * bounds.padding - metrics.table_width).max(0.0);
    let span_y = (bounds.height - 2.0 * bounds.padding - height).max(0.0);
    for _ in 0..RANDOM_PROBES {
        let probe = clamp(
            Point::new(
                origin.x + rng.random::<f64>() * span_x,
                origin.y + rng.random::<f64>() * span_y,
            )
            .snapped(),
        );
        if !overlaps_any(probe, fields.len(), existing, metrics, spacing) {
            return probe;
        }
    }

    debug!("canvas saturated, returning best-effort position");
    let offset = existing.len() as f64 * LAST_RESORT_STEP;
    clamp(Point::new(origin.x + offset, origin.y + offset))
}
