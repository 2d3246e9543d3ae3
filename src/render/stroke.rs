use crate::config::RenderConfig;
use crate::entity::{PathKind, Point};

/// Stroke parameters for a single path.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Resolved color, as handed in by the caller.
    pub color: String,
    /// On/off lengths; empty means solid.
    pub dash: Vec<f64>,
}

impl StrokeStyle {
    /// Predicted paths are dashed, actual paths are solid.
    pub fn for_kind(kind: PathKind, color: &str, config: &RenderConfig) -> Self {
        let dash = match kind {
            PathKind::Predicted => config.predicted_dash.clone(),
            PathKind::Actual => Vec::new(),
        };
        Self { color: color.to_string(), dash }
    }

    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }
}

/// A path whose points are already in display units.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedPath {
    pub kind: PathKind,
    pub points: Vec<Point>,
}
