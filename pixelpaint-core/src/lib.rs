//! # Pixelpaint core
//!
//! The drawing engine of a pixel-art editor: integer rasterizers for lines, Bézier curves, ellipses and
//! flood fill, brush stamps, layers, and a replayable action timeline for undo and redo.
//!
//! Nothing in here is anti-aliased. Every rasterizer is a pure function from integer geometry to an ordered
//! sequence of [`geometry::Point`]s, which is what makes whole-history [replay](queue::replay) deterministic.

pub mod brush;
pub mod color;
pub mod commands;
pub mod geometry;
pub mod id;
pub mod io;
pub mod queue;
pub mod raster;
pub mod state;
pub mod util;

pub use color::Color;
pub use geometry::Point;
pub use id::ArenaID;
