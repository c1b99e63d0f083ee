use std::fmt::Write;

use crate::diagram::Diagram;
use crate::geom::Point;
use crate::layout::{MarkerKind, PathOp, RoutedConnector};
use crate::schema::Table;

#[derive(Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    pub fn render(&self, diagram: &Diagram) -> String {
        let mut svg = String::new();
        let width = diagram.bounds.min_x + diagram.bounds.width;
        let height = diagram.bounds.min_y + diagram.bounds.height;

        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            width, height, width, height
        )
        .unwrap();

        writeln!(
            &mut svg,
            r#"<style>
  .table-bg {{ fill: #fff; }}
  .table-header {{ fill: #e8e8e8; }}
  .table-border {{ fill: none; stroke: #333; stroke-width: 1.5; }}
  .table-name {{ font-family: monospace; font-size: 14px; font-weight: bold; }}
  .field-name {{ font-family: monospace; font-size: 12px; }}
  .field-type {{ font-family: monospace; font-size: 12px; fill: #888; }}
  .pk {{ font-weight: bold; }}
  .connector {{ stroke: #666; stroke-width: 1.5; fill: none; }}
  .marker {{ stroke: #666; stroke-width: 1.5; fill: none; }}
</style>"#
        )
        .unwrap();

        // Connectors first so tables draw over them.
        for connector in diagram.connectors() {
            self.render_connector(&mut svg, &connector);
        }

        for table in diagram.tables.values() {
            self.render_table(&mut svg, diagram, table);
        }

        writeln!(&mut svg, "</svg>").unwrap();
        svg
    }

    fn render_table(&self, svg: &mut String, diagram: &Diagram, table: &Table) {
        let m = &diagram.metrics;
        let x = table.position.x;
        let y = table.position.y;
        let w = m.render_width(&table.name, &table.fields);
        let h = m.table_height(table.fields.len());

        writeln!(
            svg,
            r#"<rect class="table-bg" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            x, y, w, h
        )
        .unwrap();
        writeln!(
            svg,
            r#"<rect class="table-header" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            x, y, w, m.header_height
        )
        .unwrap();

        writeln!(
            svg,
            r#"<text class="table-name" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            x + w / 2.0,
            y + m.header_height / 2.0 + 5.0,
            escape_xml(&table.name)
        )
        .unwrap();

        for (i, field) in table.fields.iter().enumerate() {
            let row_y = y + m.header_height + i as f64 * m.field_row_height;
            let text_y = row_y + m.field_row_height / 2.0 + 4.0;

            let class = if field.is_primary {
                "field-name pk"
            } else {
                "field-name"
            };
            let name = if field.is_primary {
                format!("\u{1f511} {}", field.name)
            } else {
                field.name.clone()
            };
            writeln!(
                svg,
                r#"<text class="{}" x="{}" y="{}">{}</text>"#,
                class,
                x + 10.0,
                text_y,
                escape_xml(&name)
            )
            .unwrap();
            writeln!(
                svg,
                r#"<text class="field-type" x="{}" y="{}" text-anchor="end">{}</text>"#,
                x + w - 10.0,
                text_y,
                escape_xml(&field.typ)
            )
            .unwrap();
        }

        writeln!(
            svg,
            r#"<rect class="table-border" x="{}" y="{}" width="{}" height="{}" rx="4" />"#,
            x, y, w, h
        )
        .unwrap();
    }

    fn render_connector(&self, svg: &mut String, connector: &RoutedConnector) {
        let mut d = String::new();
        for op in &connector.path {
            match *op {
                PathOp::Move(p) => write!(&mut d, "M {} {} ", p.x, p.y).unwrap(),
                PathOp::Line(p) => write!(&mut d, "L {} {} ", p.x, p.y).unwrap(),
                PathOp::Quad { ctrl, to } => {
                    write!(&mut d, "Q {} {} {} {} ", ctrl.x, ctrl.y, to.x, to.y).unwrap()
                }
            }
        }

        writeln!(svg, r#"<path class="connector" d="{}" />"#, d.trim_end()).unwrap();

        self.render_marker(svg, connector.from_marker, connector.from_anchor, connector.from_rotation);
        self.render_marker(svg, connector.to_marker, connector.to_anchor, connector.to_rotation);
    }

    /// Cardinality glyphs are drawn in a local frame at the anchor, with
    /// positive x pointing away from the table; `rotation` flips the frame
    /// for left-facing endpoints.
    fn render_marker(&self, svg: &mut String, kind: MarkerKind, anchor: Point, rotation: f64) {
        writeln!(
            svg,
            r#"<g class="marker" transform="translate({} {}) rotate({})">"#,
            anchor.x, anchor.y, rotation
        )
        .unwrap();

        match kind {
            MarkerKind::One => {
                writeln!(svg, r#"<line x1="3" y1="-6" x2="3" y2="6" />"#).unwrap();
            }
            MarkerKind::Many => {
                writeln!(svg, r#"<path d="M -1 0 L 7 -6 L 7 6 Z" />"#).unwrap();
            }
            MarkerKind::OneCircle => {
                writeln!(svg, r#"<line x1="3" y1="-6" x2="3" y2="6" />"#).unwrap();
                writeln!(svg, r#"<circle cx="9" cy="0" r="3" />"#).unwrap();
            }
        }

        writeln!(svg, "</g>").unwrap();
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
