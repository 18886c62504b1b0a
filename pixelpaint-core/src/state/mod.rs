//! Document state: layers, the timeline that produces their pixels, and the drawing context.

pub mod context;
pub mod document;
pub mod layers;

pub use document::{Document, DocumentInfo};
