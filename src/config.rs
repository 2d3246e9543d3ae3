//! Render configuration.
//!
//! `RenderConfig` holds the stroke parameters and surface limits used by both
//! rendering backends. The defaults reproduce the look map overlays have
//! always had: half-unit vector strokes and a `1,1` dash for predicted
//! paths. Raster lines are always one device pixel wide.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use path_overlay::config::RenderConfig;
//! let cfg = RenderConfig::default();
//! assert_eq!(cfg.vector_stroke_width, 0.5);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use path_overlay::config::RenderConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = RenderConfig::builder()
//!     .vector_stroke_width(0.75)
//!     .predicted_dash(vec![2.0, 1.0])
//!     .max_surface_dimension(4096)
//!     .build()?; // returns Result<RenderConfig, ConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `vector_stroke_width`: SVG `stroke-width` in display units (default: 0.5).
//! - `predicted_dash`: on/off dash lengths for predicted paths (default: `[1, 1]`).
//! - `max_surface_dimension`: largest width or height the raster surface may
//!   take (default: 32767).
//!
//! # Errors
//!
//! Builder validation returns [`ConfigError`] for a non-positive width, an
//! empty or non-positive dash pattern, or a zero surface limit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest canvas dimension browsers accept.
pub const DEFAULT_MAX_SURFACE_DIMENSION: u32 = 32767;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub vector_stroke_width: f64,
    pub predicted_dash: Vec<f64>,
    pub max_surface_dimension: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vector_stroke_width: 0.5,
            predicted_dash: vec![1.0, 1.0],
            max_surface_dimension: DEFAULT_MAX_SURFACE_DIMENSION,
        }
    }
}

impl RenderConfig {
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder::default()
    }

    /// Checks a config that did not come through the builder (e.g. one loaded with serde).
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate(self)
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug, Clone, Default)]
pub struct RenderConfigBuilder {
    inner: RenderConfig,
}

impl RenderConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut RenderConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn vector_stroke_width(self, w: f64) -> Self { self.map(|c| c.vector_stroke_width = w) }
    pub fn predicted_dash(self, dash: Vec<f64>) -> Self { self.map(|c| c.predicted_dash = dash) }
    pub fn max_surface_dimension(self, px: u32) -> Self { self.map(|c| c.max_surface_dimension = px) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut RenderConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<RenderConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidStrokeWidth(f64),
    InvalidDash(Vec<f64>),
    ZeroSurfaceDimension,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidStrokeWidth(w) =>
                write!(f, "vector_stroke_width {w} must be finite and > 0"),
            ConfigError::InvalidDash(d) =>
                write!(f, "predicted_dash {d:?} must be non-empty with every entry > 0"),
            ConfigError::ZeroSurfaceDimension =>
                write!(f, "max_surface_dimension must be at least 1"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &RenderConfig) -> Result<(), ConfigError> {
    if !(c.vector_stroke_width.is_finite() && c.vector_stroke_width > 0.0) {
        return Err(ConfigError::InvalidStrokeWidth(c.vector_stroke_width));
    }
    if c.predicted_dash.is_empty() || c.predicted_dash.iter().any(|d| !(d.is_finite() && *d > 0.0)) {
        return Err(ConfigError::InvalidDash(c.predicted_dash.clone()));
    }
    if c.max_surface_dimension == 0 {
        return Err(ConfigError::ZeroSurfaceDimension);
    }
    Ok(())
}
