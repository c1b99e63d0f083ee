pub mod diagram;
pub mod error;
pub mod geom;
pub mod layout;
pub mod lexer;
pub mod measure;
pub mod parser;
pub mod schema;
pub mod svg;

use wasm_bindgen::prelude::*;

pub use diagram::{Diagram, PositionMap};
pub use error::Error;
pub use geom::{CanvasBounds, Point, GRID_UNIT};
pub use layout::{
    allocate_position, route_connector, would_overlap, MarkerKind, PathOp, RoutedConnector,
};
pub use measure::TableMetrics;
pub use parser::{parse_relationships, parse_schema};
pub use schema::{
    Field, FieldRef, RefDirection, RelationKind, Relationship, Table, TableMap,
};
pub use svg::SvgRenderer;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render DBML source to SVG. Saved positions in TOML form, if given,
/// carry a previous layout forward.
#[wasm_bindgen(js_name = "dbmlToSvg")]
pub fn render_dbml(source: &str, positions: Option<String>) -> Result<String, String> {
    let prior = match positions.as_deref() {
        Some(text) => PositionMap::from_toml(text).map_err(|e| e.to_string())?,
        None => PositionMap::default(),
    };

    let diagram = Diagram::build(
        source,
        &prior,
        TableMetrics::default(),
        CanvasBounds::default(),
    );
    Ok(SvgRenderer::default().render(&diagram))
}
