use crate::config::RenderConfig;
use crate::decode::{decode, DisplayImage};
use crate::entity::{MapEntity, Path};
use crate::errors::RenderError;
use crate::render::{Frame, OutputFormat, PathRenderer};

/// Render-then-decode pipeline for map overlays.
///
/// Every failure, whether the entity is not a path, the scale is invalid, or
/// the payload does not decode, comes back as the same [`RenderError`], so the
/// caller only needs one place to drop an overlay for this frame.
pub struct PathDrawer {
    renderer: PathRenderer,
}

impl Default for PathDrawer {
    fn default() -> Self {
        Self { renderer: PathRenderer::default() }
    }
}

impl PathDrawer {
    pub fn new(config: RenderConfig) -> Result<Self, RenderError> {
        Ok(Self { renderer: PathRenderer::new(config)? })
    }

    /// Draws one path entity and decodes the result.
    pub async fn draw_path(
        &mut self,
        format: OutputFormat,
        entity: &MapEntity,
        frame: Frame,
        color: &str,
    ) -> Result<DisplayImage, RenderError> {
        let image = self.renderer.render_path(format, entity, frame, color).await?;
        decode(image.data_uri()).await
    }

    /// Draws all paths into one overlay and decodes the result.
    pub async fn draw_paths(
        &mut self,
        format: OutputFormat,
        paths: &[Path],
        frame: Frame,
        color: &str,
    ) -> Result<DisplayImage, RenderError> {
        let image = self.renderer.render_paths(format, paths, frame, color).await?;
        decode(image.data_uri()).await
    }
}
