#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement validation for tower construction requests.

use glam::Vec2;
use realm_defence_core::{BuildError, BuildSpot, Route, TowerInstance};
use tracing::trace;

/// Maximum per-axis offset between a requested position and a build spot.
pub const SPOT_TOLERANCE: f32 = 20.0;
/// Minimum distance between two towers.
pub const MIN_TOWER_SPACING: f32 = 60.0;
/// Half the width of the corridor around every path segment.
pub const PATH_HALF_WIDTH: f32 = 20.0;

/// Accepted placement resolved to a concrete build spot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Index of the build spot within the level.
    pub spot: usize,
    /// Position the tower will occupy.
    pub position: Vec2,
}

/// Configuration parameters required to construct the builder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    spot_tolerance: f32,
    min_spacing: f32,
    path_half_width: f32,
}

impl Config {
    /// Creates a configuration with explicit placement distances.
    #[must_use]
    pub const fn new(spot_tolerance: f32, min_spacing: f32, path_half_width: f32) -> Self {
        Self {
            spot_tolerance,
            min_spacing,
            path_half_width,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(SPOT_TOLERANCE, MIN_TOWER_SPACING, PATH_HALF_WIDTH)
    }
}

/// Validates tower placements against build spots, towers and paths.
#[derive(Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Creates a builder using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Resolves `position` to a build spot and checks that a tower fits there.
    pub fn validate(
        &self,
        position: Vec2,
        spots: &[BuildSpot],
        routes: &[Route],
        towers: &[TowerInstance],
    ) -> Result<Placement, BuildError> {
        let (spot, anchor) = spots
            .iter()
            .enumerate()
            .find(|(_, spot)| {
                let offset = (spot.position - position).abs();
                offset.x <= self.config.spot_tolerance && offset.y <= self.config.spot_tolerance
            })
            .map(|(index, spot)| (index, spot.position))
            .ok_or(BuildError::NotBuildSpot)?;

        let standing = || towers.iter().filter(|tower| !tower.destroyed);
        if standing().any(|tower| tower.spot == spot) {
            return Err(BuildError::SpotOccupied { spot });
        }
        if let Some(tower) =
            standing().find(|tower| tower.position.distance(anchor) < self.config.min_spacing)
        {
            return Err(BuildError::TooCloseToTower { tower: tower.id });
        }
        if routes
            .iter()
            .any(|route| route.distance_to(anchor) < self.config.path_half_width)
        {
            return Err(BuildError::OnPath);
        }

        trace!(spot, "placement accepted");
        Ok(Placement {
            spot,
            position: anchor,
        })
    }

    /// Indices of build spots that would currently accept a tower.
    #[must_use]
    pub fn open_spots(
        &self,
        spots: &[BuildSpot],
        routes: &[Route],
        towers: &[TowerInstance],
    ) -> Vec<usize> {
        spots
            .iter()
            .filter_map(|spot| {
                self.validate(spot.position, spots, routes, towers)
                    .ok()
                    .map(|placement| placement.spot)
            })
            .collect()
    }
}
