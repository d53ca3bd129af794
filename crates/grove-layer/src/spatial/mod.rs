//! Spatial key encoding: coordinates folded into sortable z-values.

mod handler;
mod space;

pub use handler::SpatialIndexHandler;
pub use space::Space;
