use crate::errors::RenderError;
use crate::render::image::RenderedImage;
use crate::render::stroke::ProjectedPath;

/// Size of a surface in pixels. It's a simple struct to hold width and height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SurfaceSize { pub width: u32, pub height: u32 }

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered by the surface.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Straight (non-premultiplied) RGBA8 pixels.
#[derive(Clone, PartialEq)]
pub struct RgbaImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
}

impl RgbaImage {
    pub fn from_raw(pixels: Vec<u8>, width: u32, height: u32, stride: u32) -> Self {
        assert!(
            pixels.len() >= (height as usize) * (stride as usize),
            "pixel buffer too small for image dimensions"
        );

        Self {
            pixels,
            width,
            height,
            stride,
        }
    }

    /// RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y as usize * self.stride as usize + x as usize * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

impl std::fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.pixels.len())
            .finish()
    }
}

/// Core backend interface. A backend turns already projected paths into one encoded image.
///
/// Paths are drawn in slice order, so later paths end up on top.
pub trait RenderBackend {
    /// Human readable backend name, used in log output.
    fn name(&self) -> &str;

    /// Render `paths` stroked in `color` onto an image of `size` pixels.
    fn render(
        &mut self,
        paths: &[ProjectedPath],
        size: SurfaceSize,
        color: &str,
    ) -> Result<RenderedImage, RenderError>;

    /// An image of `size` with nothing drawn on it. Must not touch any drawing state.
    fn empty(&self, size: SurfaceSize) -> Result<RenderedImage, RenderError>;
}
