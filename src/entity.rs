//! Map entities and the paths extracted from them.
//!
//! Map data arrives as a list of [`MapEntity`] values, each carrying a
//! `type` discriminant and a flat `[x0, y0, x1, y1, ...]` point array in
//! source units. Only `path` and `predicted_path` entities can be turned into
//! a [`Path`] and rendered.

use crate::errors::RenderError;
use serde::{Deserialize, Serialize};

/// Discriminant of a map entity as it appears in the map JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Path,
    PredictedPath,
    VirtualWall,
    ChargerLocation,
    RobotPosition,
    GoToTarget,
    Obstacle,
}

impl EntityKind {
    /// Returns the path kind for path entities, `None` for everything else.
    pub fn path_kind(self) -> Option<PathKind> {
        match self {
            EntityKind::Path => Some(PathKind::Actual),
            EntityKind::PredictedPath => Some(PathKind::Predicted),
            _ => None,
        }
    }
}

/// A raw map entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default)]
    pub points: Vec<f64>,
}

impl MapEntity {
    pub fn new(kind: EntityKind, points: Vec<f64>) -> Self {
        Self { kind, points }
    }
}

/// What a path represents: where the robot went, or where it is expected to go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathKind {
    Actual,
    Predicted,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An ordered sequence of points with a [`PathKind`].
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    kind: PathKind,
    points: Vec<Point>,
}

impl Path {
    pub fn new(kind: PathKind, points: Vec<Point>) -> Self {
        Self { kind, points }
    }

    /// Builds a path from an interleaved coordinate array.
    ///
    /// The array must hold complete `(x, y)` pairs. A trailing lone coordinate
    /// is a caller bug: it trips a debug assertion and is otherwise ignored.
    pub fn from_flat(kind: PathKind, coords: &[f64]) -> Self {
        debug_assert!(coords.len() % 2 == 0, "odd point array length {}", coords.len());
        let points = coords
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect();
        Self { kind, points }
    }

    /// Converts every path entity in `entities`, skipping the rest.
    pub fn from_entities<'a>(entities: impl IntoIterator<Item = &'a MapEntity>) -> Vec<Path> {
        entities
            .into_iter()
            .filter_map(|e| match Path::try_from(e) {
                Ok(path) => Some(path),
                Err(_) => {
                    log::debug!("skipping non-path entity {:?}", e.kind);
                    None
                }
            })
            .collect()
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<&MapEntity> for Path {
    type Error = RenderError;

    fn try_from(entity: &MapEntity) -> Result<Self, Self::Error> {
        let kind = entity
            .kind
            .path_kind()
            .ok_or(RenderError::UnsupportedEntity(entity.kind))?;
        Ok(Path::from_flat(kind, &entity.points))
    }
}
