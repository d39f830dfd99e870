//! Static level data
//!
//! Levels are configuration, not computed: spawn point, junctions and
//! buildings are author-placed coordinates. Declaration order is part
//! of the data: junction triggers and building arrivals scan in the
//! order declared here, which is what resolves overlapping radii.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::Direction;

/// How the spawner assigns destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationPolicy {
    /// Walk the destination list in order; the session is won once
    /// every listed destination has been delivered at least once
    Cycle,
    /// Uniform-random pick from the list; the session ends only by
    /// running out of lives
    Random,
}

/// A level waypoint that redirects carts passing through it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JunctionSpec {
    pub name: String,
    pub pos: Vec2,
    /// Cyclic list of exit directions, length >= 2
    pub cycle: Vec<Direction>,
    /// Direction at level load and after restart
    pub default_dir: Direction,
}

/// A delivery target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub name: String,
    pub pos: Vec2,
}

/// A complete level definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    /// Where carts enter the world
    pub spawn_point: Vec2,
    /// Initial heading, toward the first junction
    pub spawn_dir: Direction,
    /// Ticks between spawns
    pub spawn_delay: u32,
    /// Life budget for the session
    pub lives: u8,
    pub policy: DestinationPolicy,
    /// Building names carts can be assigned; order matters for Cycle
    pub destinations: Vec<String>,
    pub junctions: Vec<JunctionSpec>,
    pub buildings: Vec<BuildingSpec>,
}

/// Problems a level definition can have. Checked once at load; the
/// per-tick simulation assumes a validated level.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level has no junctions")]
    NoJunctions,
    #[error("level has no buildings")]
    NoBuildings,
    #[error("level has no destinations")]
    NoDestinations,
    #[error("junction {0:?} needs at least two directions in its cycle")]
    ShortCycle(String),
    #[error("junction {0:?} default direction is not in its cycle")]
    DefaultNotInCycle(String),
    #[error("destination {0:?} does not name a building")]
    UnknownDestination(String),
    #[error("lives must be at least 1")]
    NoLives,
    #[error("spawn delay must be at least 1 tick")]
    ZeroSpawnDelay,
}

impl Level {
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.junctions.is_empty() {
            return Err(LevelError::NoJunctions);
        }
        if self.buildings.is_empty() {
            return Err(LevelError::NoBuildings);
        }
        if self.destinations.is_empty() {
            return Err(LevelError::NoDestinations);
        }
        if self.lives == 0 {
            return Err(LevelError::NoLives);
        }
        if self.spawn_delay == 0 {
            return Err(LevelError::ZeroSpawnDelay);
        }
        for junction in &self.junctions {
            if junction.cycle.len() < 2 {
                return Err(LevelError::ShortCycle(junction.name.clone()));
            }
            if !junction.cycle.contains(&junction.default_dir) {
                return Err(LevelError::DefaultNotInCycle(junction.name.clone()));
            }
        }
        for dest in &self.destinations {
            if self.building_index(dest).is_none() {
                return Err(LevelError::UnknownDestination(dest.clone()));
            }
        }
        Ok(())
    }

    /// Index of the building a destination name refers to
    pub fn building_index(&self, name: &str) -> Option<usize> {
        self.buildings.iter().position(|b| b.name == name)
    }

    /// Load a level from its JSON representation and validate it
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let level: Level = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// The early map: one fork, a fixed delivery list, a single life.
    /// Deliver every listed destination once to win.
    pub fn crossroads() -> Self {
        Self {
            name: "crossroads".into(),
            spawn_point: Vec2::new(600.0, 846.0),
            spawn_dir: Direction::Up,
            spawn_delay: 200,
            lives: 1,
            policy: DestinationPolicy::Cycle,
            destinations: vec!["farm".into(), "mine".into(), "dock".into()],
            junctions: vec![JunctionSpec {
                name: "fork".into(),
                pos: Vec2::new(600.0, 450.0),
                cycle: vec![Direction::Up, Direction::Left, Direction::Right],
                default_dir: Direction::Up,
            }],
            buildings: vec![
                BuildingSpec {
                    name: "farm".into(),
                    pos: Vec2::new(600.0, 122.0),
                },
                BuildingSpec {
                    name: "mine".into(),
                    pos: Vec2::new(142.0, 450.0),
                },
                BuildingSpec {
                    name: "dock".into(),
                    pos: Vec2::new(1058.0, 448.0),
                },
            ],
        }
    }

    /// The big map: three junctions, five buildings, random
    /// destinations, three lives, endless play.
    pub fn downtown() -> Self {
        Self {
            name: "downtown".into(),
            spawn_point: Vec2::new(599.0, 846.0),
            spawn_dir: Direction::Up,
            spawn_delay: 200,
            lives: 3,
            policy: DestinationPolicy::Random,
            destinations: vec![
                "depot".into(),
                "mill".into(),
                "harbor".into(),
                "market".into(),
                "foundry".into(),
            ],
            junctions: vec![
                JunctionSpec {
                    name: "south-fork".into(),
                    pos: Vec2::new(604.0, 567.0),
                    cycle: vec![Direction::Up, Direction::Left, Direction::Right],
                    default_dir: Direction::Up,
                },
                JunctionSpec {
                    name: "west-fork".into(),
                    pos: Vec2::new(304.0, 568.0),
                    cycle: vec![Direction::Up, Direction::Down],
                    default_dir: Direction::Up,
                },
                JunctionSpec {
                    name: "east-fork".into(),
                    pos: Vec2::new(902.0, 568.0),
                    cycle: vec![Direction::Up, Direction::Down],
                    default_dir: Direction::Down,
                },
            ],
            buildings: vec![
                BuildingSpec {
                    name: "depot".into(),
                    pos: Vec2::new(600.0, 128.0),
                },
                BuildingSpec {
                    name: "mill".into(),
                    pos: Vec2::new(300.0, 130.0),
                },
                BuildingSpec {
                    name: "harbor".into(),
                    pos: Vec2::new(308.0, 852.0),
                },
                BuildingSpec {
                    name: "market".into(),
                    pos: Vec2::new(904.0, 128.0),
                },
                BuildingSpec {
                    name: "foundry".into(),
                    pos: Vec2::new(898.0, 850.0),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_levels_validate() {
        assert_eq!(Level::crossroads().validate(), Ok(()));
        assert_eq!(Level::downtown().validate(), Ok(()));
    }

    #[test]
    fn rejects_default_direction_outside_cycle() {
        let mut level = Level::crossroads();
        level.junctions[0].default_dir = Direction::Down;
        assert_eq!(
            level.validate(),
            Err(LevelError::DefaultNotInCycle("fork".into()))
        );
    }

    #[test]
    fn rejects_single_entry_cycle() {
        let mut level = Level::crossroads();
        level.junctions[0].cycle = vec![Direction::Up];
        level.junctions[0].default_dir = Direction::Up;
        assert_eq!(level.validate(), Err(LevelError::ShortCycle("fork".into())));
    }

    #[test]
    fn rejects_destination_without_building() {
        let mut level = Level::downtown();
        level.destinations.push("airport".into());
        assert_eq!(
            level.validate(),
            Err(LevelError::UnknownDestination("airport".into()))
        );
    }

    #[test]
    fn rejects_zero_spawn_delay_and_zero_lives() {
        let mut level = Level::crossroads();
        level.spawn_delay = 0;
        assert_eq!(level.validate(), Err(LevelError::ZeroSpawnDelay));

        let mut level = Level::crossroads();
        level.lives = 0;
        assert_eq!(level.validate(), Err(LevelError::NoLives));
    }

    #[test]
    fn survives_a_json_round_trip() {
        let level = Level::downtown();
        let json = serde_json::to_string(&level).unwrap();
        let loaded = Level::from_json(&json).unwrap();
        assert_eq!(loaded.junctions.len(), level.junctions.len());
        assert_eq!(loaded.policy, DestinationPolicy::Random);
    }
}
