#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Read-only enemy, tower and level tables.
//!
//! The catalog is loaded once and shared immutably with every system that
//! needs template data. [`Catalog::builtin`] provides the default tables used
//! by the shipped level; [`Catalog::from_toml_str`] and
//! [`Catalog::from_toml_path`] load replacement tables from TOML.

mod builtin;

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use glam::Vec2;
use realm_defence_core::{BuildSpot, CatalogError, Faction, Route};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Special behaviours an enemy template may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    /// Hits harder when wounded.
    Berserker,
    /// Recovers health over time.
    Regeneration,
    /// Speeds up when allies fall.
    Rage,
}

/// Static description of an enemy type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Health a fresh instance spawns with.
    pub health: u32,
    /// Flat damage reduction.
    #[serde(default)]
    pub armor: u32,
    /// Movement speed before scaling.
    pub speed: f32,
    /// Damage dealt to the defender on breach.
    pub damage: u32,
    /// Coins awarded on kill.
    pub coins: u32,
    /// Experience awarded on hero kill.
    pub experience: u32,
    /// Visual size hint.
    pub size: f32,
    /// Visual colour tag.
    pub color: String,
    /// Ability tags.
    #[serde(default)]
    pub abilities: Vec<Ability>,
    /// Whether the template is a boss.
    #[serde(default)]
    pub is_boss: bool,
}

/// Attack style of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerClass {
    /// Fires physical projectiles.
    Ranged,
    /// Strikes adjacent enemies instantly.
    Melee,
    /// Fires magical projectiles.
    Magic,
}

/// One step of a tower's upgrade ladder. Listed stats replace the current ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeStep {
    /// Coins required to perform the upgrade.
    pub cost: u32,
    /// Replacement damage.
    #[serde(default)]
    pub damage: Option<u32>,
    /// Replacement range.
    #[serde(default)]
    pub range: Option<f32>,
    /// Replacement attack interval in milliseconds.
    #[serde(default)]
    pub attack_interval_ms: Option<u64>,
}

impl UpgradeStep {
    /// Replacement attack interval, if the step lists one.
    #[must_use]
    pub fn attack_interval(&self) -> Option<Duration> {
        self.attack_interval_ms.map(Duration::from_millis)
    }
}

/// Static description of a tower type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerTemplate {
    /// Catalog identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Construction cost.
    pub cost: u32,
    /// Damage per attack.
    pub damage: u32,
    /// Attack range.
    pub range: f32,
    /// Minimum time between attacks in milliseconds.
    pub attack_interval_ms: u64,
    /// Projectile speed; absent for instant-hit towers.
    #[serde(default)]
    pub projectile_speed: Option<f32>,
    /// Visual size hint.
    pub size: f32,
    /// Visual colour tag.
    pub color: String,
    /// Attack style.
    pub class: TowerClass,
    /// Ordered upgrade ladder.
    #[serde(default)]
    pub upgrades: Vec<UpgradeStep>,
}

impl TowerTemplate {
    /// Minimum time between attacks.
    #[must_use]
    pub fn attack_interval(&self) -> Duration {
        Duration::from_millis(self.attack_interval_ms)
    }

    /// Highest level a tower of this type can reach.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        u32::try_from(self.upgrades.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }

    /// Step that takes a tower from `level` to `level + 1`.
    #[must_use]
    pub fn upgrade_step(&self, level: u32) -> Option<&UpgradeStep> {
        let index = usize::try_from(level.checked_sub(1)?).ok()?;
        self.upgrades.get(index)
    }

    /// Coins returned when a tower of this type is sold.
    #[must_use]
    pub const fn sell_refund(&self) -> u32 {
        self.cost / 2
    }
}

/// Batch of identical enemies spawned one after another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Enemy template identifier.
    pub enemy: String,
    /// Number of enemies in the group.
    pub count: u32,
    /// Delay between consecutive members in milliseconds.
    pub inter_delay_ms: u64,
}

impl SpawnGroup {
    /// Delay between consecutive members.
    #[must_use]
    pub fn inter_delay(&self) -> Duration {
        Duration::from_millis(self.inter_delay_ms)
    }
}

/// Ordered spawn groups forming a single wave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Spawn groups in order.
    pub groups: Vec<SpawnGroup>,
    /// Whether the wave is announced as a boss wave.
    #[serde(default)]
    pub is_boss: bool,
}

impl WaveDefinition {
    /// Total number of enemies the wave spawns.
    #[must_use]
    pub fn enemy_count(&self) -> u32 {
        self.groups.iter().map(|group| group.count).sum()
    }
}

/// Complete description of a playable level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Level identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Faction the level is played with.
    #[serde(default)]
    pub faction: Faction,
    /// Routes enemies walk along.
    pub routes: Vec<Route>,
    /// Positions towers may be built on.
    pub build_spots: Vec<BuildSpot>,
    /// Where the hero starts.
    pub hero_start: Vec2,
    /// Coins available at the start.
    pub starting_coins: u32,
    /// Lives available at the start.
    pub starting_lives: u32,
    /// Wave schedule.
    pub waves: Vec<WaveDefinition>,
}

/// Failures raised while loading or validating catalog tables.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The catalog file could not be read.
    #[error("failed to read catalog at {path}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The catalog file is not valid TOML for the expected schema.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    /// Two entries of the same table share an identifier.
    #[error("duplicate {table} entry `{id}`")]
    Duplicate {
        /// Table containing the duplicate.
        table: &'static str,
        /// Duplicated identifier.
        id: String,
    },
    /// A wave references an enemy that is not in the catalog.
    #[error("level {level} references a missing template: {source}")]
    Reference {
        /// Level containing the reference.
        level: u32,
        /// Lookup failure.
        #[source]
        source: CatalogError,
    },
    /// A level has no routes or a route has no segments.
    #[error("level {level} has an empty route set or an empty route")]
    EmptyRoute {
        /// Level containing the route.
        level: u32,
    },
    /// A spawn group would never spawn anything.
    #[error("level {level} wave {wave} contains an empty spawn group")]
    EmptyGroup {
        /// Level containing the wave.
        level: u32,
        /// Zero-based wave index.
        wave: usize,
    },
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    enemies: Vec<EnemyTemplate>,
    #[serde(default)]
    towers: Vec<TowerTemplate>,
    #[serde(default)]
    levels: Vec<LevelDefinition>,
}

/// Immutable collection of enemy, tower and level templates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    enemies: BTreeMap<String, EnemyTemplate>,
    towers: BTreeMap<String, TowerTemplate>,
    levels: BTreeMap<u32, LevelDefinition>,
}

impl Catalog {
    /// Default tables shipped with the game.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for enemy in builtin::enemies() {
            let _ = catalog.enemies.insert(enemy.id.clone(), enemy);
        }
        for tower in builtin::towers() {
            let _ = catalog.towers.insert(tower.id.clone(), tower);
        }
        let level = builtin::first_defence();
        let _ = catalog.levels.insert(level.id, level);
        catalog
    }

    /// Parses and validates catalog tables from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogLoadError> {
        let file: CatalogFile = toml::from_str(contents)?;
        let mut catalog = Self::default();

        for enemy in file.enemies {
            let id = enemy.id.clone();
            if catalog.enemies.insert(id.clone(), enemy).is_some() {
                return Err(CatalogLoadError::Duplicate { table: "enemy", id });
            }
        }
        for tower in file.towers {
            let id = tower.id.clone();
            if catalog.towers.insert(id.clone(), tower).is_some() {
                return Err(CatalogLoadError::Duplicate { table: "tower", id });
            }
        }
        for level in file.levels {
            let id = level.id;
            if catalog.levels.insert(id, level).is_some() {
                return Err(CatalogLoadError::Duplicate {
                    table: "level",
                    id: id.to_string(),
                });
            }
        }

        catalog.validate()?;
        debug!(
            enemies = catalog.enemies.len(),
            towers = catalog.towers.len(),
            levels = catalog.levels.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Reads, parses and validates catalog tables from a TOML file.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks that every level is playable with the loaded templates.
    pub fn validate(&self) -> Result<(), CatalogLoadError> {
        for level in self.levels.values() {
            if level.routes.is_empty() || level.routes.iter().any(Route::is_empty) {
                return Err(CatalogLoadError::EmptyRoute { level: level.id });
            }
            for (wave_index, wave) in level.waves.iter().enumerate() {
                for group in &wave.groups {
                    if group.count == 0 {
                        return Err(CatalogLoadError::EmptyGroup {
                            level: level.id,
                            wave: wave_index,
                        });
                    }
                    let _ = self
                        .enemy(&group.enemy)
                        .map_err(|source| CatalogLoadError::Reference {
                            level: level.id,
                            source,
                        })?;
                }
            }
        }
        Ok(())
    }

    /// Looks up an enemy template.
    pub fn enemy(&self, id: &str) -> Result<&EnemyTemplate, CatalogError> {
        self.enemies
            .get(id)
            .ok_or_else(|| CatalogError::UnknownEnemy(id.to_owned()))
    }

    /// Looks up a tower template.
    pub fn tower(&self, id: &str) -> Result<&TowerTemplate, CatalogError> {
        self.towers
            .get(id)
            .ok_or_else(|| CatalogError::UnknownTower(id.to_owned()))
    }

    /// Returns a copy of the level stamped with the requested faction.
    pub fn level(&self, id: u32, faction: Faction) -> Result<LevelDefinition, CatalogError> {
        let mut level = self
            .levels
            .get(&id)
            .cloned()
            .ok_or(CatalogError::UnknownLevel(id))?;
        level.faction = faction;
        Ok(level)
    }

    /// Enemy templates tagged as bosses.
    pub fn boss_enemies(&self) -> impl Iterator<Item = &EnemyTemplate> {
        self.enemies.values().filter(|enemy| enemy.is_boss)
    }

    /// Every enemy template ordered by identifier.
    pub fn enemies(&self) -> impl Iterator<Item = &EnemyTemplate> {
        self.enemies.values()
    }

    /// Every tower template ordered by identifier.
    pub fn towers(&self) -> impl Iterator<Item = &TowerTemplate> {
        self.towers.values()
    }

    /// Identifiers of every level.
    pub fn level_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.keys().copied()
    }
}
