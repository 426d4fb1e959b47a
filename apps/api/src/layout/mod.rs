// Article layout: footprint sizing, award selection, grid packing, gap backfill.
// Everything except `handlers` is synchronous and I/O-free; handlers run the
// optimizer inside tokio::task::spawn_blocking.

pub mod awards;
pub mod gaps;
pub mod geometry;
pub mod grid;
pub mod handlers;
pub mod optimizer;
pub mod sizing;

// Re-export the public API consumed by other modules (config, handlers).
pub use geometry::{default_grid_geometry, GridGeometry};
pub use optimizer::{optimize_layout, LayoutStats};
