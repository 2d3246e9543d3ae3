pub mod backend;

/// Rendering backends.
pub mod backends {
    /// PNG backend drawing onto a reused raster surface
    pub mod raster;
    /// SVG markup backend
    pub mod vector;
}

pub mod image;
pub mod projector;
pub mod stroke;
pub mod surface;

mod renderer;
pub use renderer::*;

pub use backend::{RenderBackend, RgbaImage, SurfaceSize};
pub use image::{OutputFormat, RenderedImage};
pub use projector::{pixel_center, project};
pub use stroke::StrokeStyle;
