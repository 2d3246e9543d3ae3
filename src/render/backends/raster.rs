use crate::config::RenderConfig;
use crate::errors::RenderError;
use crate::render::backend::{RenderBackend, SurfaceSize};
use crate::render::image::{OutputFormat, RenderedImage};
use crate::render::projector::pixel_center;
use crate::render::stroke::{ProjectedPath, StrokeStyle};
use crate::render::surface::{encode_blank_png, parse_color, RasterSurface};

/// Raster backend that strokes paths onto a reused [`RasterSurface`] and encodes it as PNG.
pub struct RasterBackend {
    config: RenderConfig,
    surface: RasterSurface,
}

impl RasterBackend {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            surface: RasterSurface::new(),
        }
    }

    /// The surface the last render drew on.
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    fn check_limit(&self, size: SurfaceSize) -> Result<(), String> {
        let max = self.config.max_surface_dimension;
        if size.width > max || size.height > max {
            return Err(format!(
                "{}x{} exceeds the {max}px surface limit",
                size.width, size.height
            ));
        }
        Ok(())
    }

    /// Makes the surface `size` pixels large, reallocating only on change.
    fn ensure_size(&mut self, size: SurfaceSize) -> Result<(), String> {
        if self.surface.size() == size {
            return Ok(());
        }
        self.check_limit(size)?;
        self.surface.try_resize(size).map_err(|e| e.to_string())?;
        log::debug!("RasterBackend: surface resized to {}x{}", size.width, size.height);
        Ok(())
    }

    fn stroke_path(&mut self, path: &ProjectedPath, color: &str) {
        let Some((first, rest)) = path.points.split_first() else {
            log::trace!("RasterBackend: skipping path without points");
            return;
        };
        let style = StrokeStyle::for_kind(path.kind, color, &self.config);

        self.surface.set_line_dash(&style.dash);
        self.surface.begin_path();
        self.surface.move_to(pixel_center(*first));
        for p in rest {
            self.surface.line_to(pixel_center(*p));
        }
        self.surface.stroke();
    }
}

impl RenderBackend for RasterBackend {
    fn name(&self) -> &str {
        "RasterBackend"
    }

    fn render(
        &mut self,
        paths: &[ProjectedPath],
        size: SurfaceSize,
        color: &str,
    ) -> Result<RenderedImage, RenderError> {
        let rgba = parse_color(color)?;
        if let Err(reason) = self.ensure_size(size) {
            // Hand back whatever the surface currently holds instead of failing the overlay.
            log::warn!("RasterBackend: no surface for this render ({reason}), returning previous content");
            let current = self.surface.size();
            return Ok(RenderedImage::new(OutputFormat::Raster, current, self.surface.encode_png()?));
        }

        self.surface.clear();
        self.surface.set_stroke_color(rgba);

        for path in paths {
            self.stroke_path(path, color);
        }

        let png = self.surface.encode_png()?;
        log::debug!("RasterBackend: {} path(s), {} bytes of png", paths.len(), png.len());
        Ok(RenderedImage::new(OutputFormat::Raster, size, png))
    }

    fn empty(&self, size: SurfaceSize) -> Result<RenderedImage, RenderError> {
        self.check_limit(size).map_err(RenderError::EncodingFailure)?;
        Ok(RenderedImage::new(OutputFormat::Raster, size, encode_blank_png(size)?))
    }
}
