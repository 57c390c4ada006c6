pub mod surface;

pub use surface::{BezierPatch, Surface, SurfaceDomain};
