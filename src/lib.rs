pub mod document;
pub mod error;
pub mod geometry;
pub mod io;
pub mod math;
pub mod operations;
pub mod topology;

pub use document::{Document, EditSettings};
pub use error::{PatchMeshError, Result};
