//! Table box metrics.
//!
//! Geometry (overlap tests, connector anchors) uses the fixed
//! `table_width`; only the SVG renderer widens boxes to fit their text.

use unicode_width::UnicodeWidthStr;

use crate::geom::Point;
use crate::schema::Field;

#[derive(Debug, Clone)]
pub struct TableMetrics {
    /// Fixed box width used for placement and routing.
    pub table_width: f64,
    pub header_height: f64,
    pub field_row_height: f64,
    /// Vertical offset from a field row's top to its connector anchor.
    pub field_anchor_offset: f64,
    /// Minimum clearance between boxes when allocating new positions.
    pub min_spacing: f64,
    /// Clearance used when validating an interactive drag target.
    pub drag_spacing: f64,
    /// Approximate monospace character width for render sizing.
    pub char_width: f64,
    pub max_render_width: f64,
}

impl Default for TableMetrics {
    fn default() -> Self {
        Self {
            table_width: 200.0,
            header_height: 32.0,
            field_row_height: 27.0,
            field_anchor_offset: 13.0,
            min_spacing: 60.0,
            drag_spacing: 40.0,
            char_width: 8.0,
            max_render_width: 400.0,
        }
    }
}

impl TableMetrics {
    /// A table's rendered height is a pure function of its field count.
    pub fn table_height(&self, field_count: usize) -> f64 {
        self.header_height + field_count as f64 * self.field_row_height
    }

    /// Y coordinate of the connector anchor for the field at `index`.
    pub fn field_anchor_y(&self, position: Point, index: usize) -> f64 {
        position.y
            + self.header_height
            + index as f64 * self.field_row_height
            + self.field_anchor_offset
    }

    pub fn text_width(&self, text: &str) -> f64 {
        UnicodeWidthStr::width(text) as f64 * self.char_width
    }

    /// Content-fitted width for rendering, clamped between the fixed
    /// geometry width and `max_render_width`.
    pub fn render_width(&self, name: &str, fields: &[Field]) -> f64 {
        let mut width = self.text_width(name) + 40.0;

        for field in fields {
            let key_icon = if field.is_primary { self.char_width * 2.0 } else { 0.0 };
            let row = self.text_width(&field.name) + key_icon + self.text_width(&field.typ) + 50.0;
            width = width.max(row);
        }

        width.max(self.table_width).min(self.max_render_width)
    }
}
