//! Path renderer: validation, projection and backend dispatch.
//!
//! [`PathRenderer`] owns one instance of each backend. The raster backend
//! keeps its drawing surface between calls, which is why every render takes
//! `&mut self`: calls on one renderer are serialized by construction, and
//! callers that want to render in parallel create one renderer per worker.
//!
//! Rendering itself is synchronous. The returned futures are already
//! resolved and exist so that render and decode failures reach the caller
//! through the same asynchronous channel.
//!
//! # Example
//!
//! ```rust
//! use path_overlay::entity::{EntityKind, MapEntity};
//! use path_overlay::render::{Frame, OutputFormat, PathRenderer};
//!
//! let mut renderer = PathRenderer::default();
//! let entity = MapEntity::new(EntityKind::Path, vec![0.0, 0.0, 20.0, 0.0, 20.0, 20.0]);
//! let frame = Frame::new(20, 20, 2.0);
//!
//! let image = pollster::block_on(renderer.render_path(OutputFormat::Vector, &entity, frame, "#ffffff")).unwrap();
//! assert!(image.markup().unwrap().contains("M 0 0 L 10 0 L 10 10 "));
//! ```

use crate::config::RenderConfig;
use crate::entity::{MapEntity, Path};
use crate::errors::RenderError;
use crate::render::backend::{RenderBackend, SurfaceSize};
use crate::render::backends::raster::RasterBackend;
use crate::render::backends::vector::VectorBackend;
use crate::render::image::{OutputFormat, RenderedImage};
use crate::render::projector::{check_scale, project_unchecked};
use crate::render::stroke::ProjectedPath;
use futures::future::{ready, Ready};

/// Target frame of a render: output size in device pixels plus the map's pixel size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Source units per device pixel.
    pub pixel_size: f64,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixel_size: f64) -> Self {
        Self { width, height, pixel_size }
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }
}

pub type RenderFuture = Ready<Result<RenderedImage, RenderError>>;

pub struct PathRenderer {
    vector: VectorBackend,
    raster: RasterBackend,
}

impl Default for PathRenderer {
    fn default() -> Self {
        Self::with_valid_config(RenderConfig::default())
    }
}

impl PathRenderer {
    /// Creates a renderer after validating `config`.
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: RenderConfig) -> Self {
        Self {
            vector: VectorBackend::new(config.clone()),
            raster: RasterBackend::new(config),
        }
    }

    /// The raster backend, e.g. to inspect the surface after a render.
    pub fn raster(&self) -> &RasterBackend {
        &self.raster
    }

    fn backend(&mut self, format: OutputFormat) -> &mut dyn RenderBackend {
        match format {
            OutputFormat::Vector => &mut self.vector,
            OutputFormat::Raster => &mut self.raster,
        }
    }

    /// Renders a single map entity.
    ///
    /// Fails with [`RenderError::UnsupportedEntity`] unless the entity is a
    /// path or predicted path. A path without points resolves to an empty
    /// image of the frame size without touching the backend's drawing state.
    pub fn render_path(
        &mut self,
        format: OutputFormat,
        entity: &MapEntity,
        frame: Frame,
        color: &str,
    ) -> RenderFuture {
        ready(Path::try_from(entity).and_then(|path| {
            self.render_all(format, std::slice::from_ref(&path), frame, color)
        }))
    }

    /// Renders several paths into one image, in order, later paths on top.
    ///
    /// Paths are already typed, so no entity validation happens here. An
    /// empty batch resolves to an empty image of the frame size.
    pub fn render_paths(
        &mut self,
        format: OutputFormat,
        paths: &[Path],
        frame: Frame,
        color: &str,
    ) -> RenderFuture {
        ready(self.render_all(format, paths, frame, color))
    }

    fn render_all(
        &mut self,
        format: OutputFormat,
        paths: &[Path],
        frame: Frame,
        color: &str,
    ) -> Result<RenderedImage, RenderError> {
        check_scale(frame.pixel_size)?;

        let backend = self.backend(format);
        if paths.iter().all(Path::is_empty) {
            log::trace!("{}: nothing to draw, returning empty image", backend.name());
            return backend.empty(frame.size());
        }

        let projected: Vec<ProjectedPath> = paths
            .iter()
            .map(|path| ProjectedPath {
                kind: path.kind(),
                points: path
                    .points()
                    .iter()
                    .map(|p| project_unchecked(*p, frame.pixel_size))
                    .collect(),
            })
            .collect();

        log::debug!(
            "{}: rendering {} path(s) at {}x{} (pixel size {})",
            backend.name(),
            projected.len(),
            frame.width,
            frame.height,
            frame.pixel_size
        );
        backend.render(&projected, frame.size(), color)
    }
}
