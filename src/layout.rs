//! Canvas layout: overlap testing, position allocation, and connector
//! routing. Everything in here is a pure function over the table mapping;
//! callers own any mutation of table state.

pub mod overlap;
pub mod placement;
pub mod routing;

pub use overlap::would_overlap;
pub use placement::allocate_position;
pub use routing::{route_connector, MarkerKind, PathOp, RoutedConnector};
