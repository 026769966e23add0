#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Realm Defence simulation.
//!
//! This crate defines the vocabulary that connects the catalog, the pure
//! systems, the authoritative world and its adapters. Adapters submit
//! [`Command`] values describing player intent, the world executes those
//! commands via its `apply` entry point and reports every observable change as
//! an [`Event`] appended to a caller-owned buffer. Entity instances live here
//! so that every system can mutate the rosters handed to it by the world.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Distance below which a moving body counts as having reached its target.
pub const ARRIVAL_THRESHOLD: f32 = 5.0;

/// Uniform tuning constant converting `speed * milliseconds` into world units.
pub const MOVEMENT_SCALE: f32 = 0.1;

/// Number of straight pieces used to approximate a curved path segment.
const CURVE_SAMPLES: u32 = 16;

/// Damage added to the hero for every level gained.
pub const HERO_DAMAGE_PER_LEVEL: u32 = 5;
/// Range added to the hero for every level gained.
pub const HERO_RANGE_PER_LEVEL: f32 = 10.0;
/// Attack interval removed from the hero for every level gained.
pub const HERO_INTERVAL_STEP: Duration = Duration::from_millis(100);
/// Lower bound for the hero attack interval.
pub const HERO_MIN_ATTACK_INTERVAL: Duration = Duration::from_millis(500);
/// Lives lost when the hero dies.
pub const HERO_DEATH_LIVES: u32 = 5;

/// Commands that express every permissible session mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests construction of a tower at the provided position.
    BuildTower {
        /// Position the player clicked; must be close to a build spot.
        position: Vec2,
        /// Catalog identifier of the tower type.
        tower: String,
    },
    /// Requests that an existing tower be sold for a partial refund.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Requests that an existing tower climb one step of its upgrade ladder.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Orders the hero to walk toward the provided position.
    MoveHero {
        /// Destination of the walk.
        position: Vec2,
    },
    /// Applies damage to the hero from an external hazard.
    DamageHero {
        /// Amount of health removed from the hero.
        amount: u32,
    },
    /// Starts the next wave of the schedule.
    StartNextWave,
    /// Toggles between the running and paused session states.
    TogglePause,
}

/// Notifications emitted by the simulation after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces a transition of the session state machine.
    SessionStateChanged {
        /// State that became active.
        state: SessionState,
    },
    /// Reports a change of the coin balance.
    CoinsChanged {
        /// Balance after the change.
        total: u32,
        /// Signed amount added (positive) or spent (negative).
        delta: i64,
        /// Tag describing why the balance changed.
        reason: String,
    },
    /// Reports that experience was gained.
    ExperienceChanged {
        /// Experience after the change.
        total: u32,
        /// Amount gained.
        delta: u32,
        /// Tag describing where the experience came from.
        source: String,
    },
    /// Reports that the player reached a new level.
    LevelUp {
        /// Level after the promotion.
        level: u32,
        /// Threshold that was crossed.
        previous_threshold: u32,
        /// Threshold required for the following level.
        next_threshold: u32,
    },
    /// Announces that a wave began spawning.
    WaveStarted {
        /// Zero-based index of the wave.
        wave: usize,
        /// Whether the wave is authored as a boss wave.
        boss: bool,
    },
    /// Announces that every enemy of a wave has been spawned and removed.
    WaveCompleted {
        /// Zero-based index of the completed wave.
        wave: usize,
    },
    /// Confirms that an enemy entered the roster.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Template the enemy was created from.
        template: String,
        /// Position the enemy spawned at.
        position: Vec2,
    },
    /// Confirms that a boss enemy entered the roster.
    BossSpawned {
        /// Identifier assigned to the boss.
        enemy: EnemyId,
        /// Template the boss was created from.
        template: String,
    },
    /// Reports that a scheduled spawn could not be performed.
    SpawnAborted {
        /// Zero-based index of the wave owning the spawn.
        wave: usize,
        /// Template requested by the spawn.
        template: String,
        /// Reason the spawn was dropped.
        reason: SpawnAbortReason,
    },
    /// Reports that an enemy was killed.
    EnemyKilled {
        /// Identifier of the killed enemy.
        enemy: EnemyId,
        /// Template of the killed enemy.
        template: String,
        /// Attacker credited with the kill.
        killer: Attacker,
    },
    /// Reports that a boss enemy was killed.
    BossDefeated {
        /// Identifier of the defeated boss.
        enemy: EnemyId,
        /// Template of the defeated boss.
        template: String,
    },
    /// Reports that an enemy reached the end of its route.
    DefenderDamaged {
        /// Identifier of the breaching enemy.
        enemy: EnemyId,
        /// Lives removed by the breach.
        amount: u32,
    },
    /// Reports the remaining defender lives after a loss.
    LivesChanged {
        /// Lives left.
        remaining: u32,
    },
    /// Reports that an attacker launched a projectile.
    ProjectileLaunched {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Attacker that fired it.
        origin: Attacker,
        /// Impact point the projectile travels toward.
        target: Vec2,
    },
    /// Reports that a projectile was consumed without hitting anything.
    ProjectileMissed {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Attacker that fired it.
        origin: Attacker,
    },
    /// Confirms that a tower was constructed.
    TowerBuilt {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Template the tower was built from.
        template: String,
        /// Position the tower occupies.
        position: Vec2,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Identifier of the sold tower.
        tower: TowerId,
        /// Coins returned to the player.
        refund: u32,
    },
    /// Confirms that a tower was upgraded.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached by the tower.
        level: u32,
    },
    /// Reports that the hero reached a new level.
    HeroLevelUp {
        /// Level reached by the hero.
        level: u32,
    },
    /// Reports that the hero died.
    HeroDied,
}

impl Event {
    /// Returns the discriminant used to route the event to subscribers.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::TimeAdvanced { .. } => EventKind::TimeAdvanced,
            Self::SessionStateChanged { .. } => EventKind::SessionStateChanged,
            Self::CoinsChanged { .. } => EventKind::CoinsChanged,
            Self::ExperienceChanged { .. } => EventKind::ExperienceChanged,
            Self::LevelUp { .. } => EventKind::LevelUp,
            Self::WaveStarted { .. } => EventKind::WaveStarted,
            Self::WaveCompleted { .. } => EventKind::WaveCompleted,
            Self::EnemySpawned { .. } => EventKind::EnemySpawned,
            Self::BossSpawned { .. } => EventKind::BossSpawned,
            Self::SpawnAborted { .. } => EventKind::SpawnAborted,
            Self::EnemyKilled { .. } => EventKind::EnemyKilled,
            Self::BossDefeated { .. } => EventKind::BossDefeated,
            Self::DefenderDamaged { .. } => EventKind::DefenderDamaged,
            Self::LivesChanged { .. } => EventKind::LivesChanged,
            Self::ProjectileLaunched { .. } => EventKind::ProjectileLaunched,
            Self::ProjectileMissed { .. } => EventKind::ProjectileMissed,
            Self::TowerBuilt { .. } => EventKind::TowerBuilt,
            Self::TowerSold { .. } => EventKind::TowerSold,
            Self::TowerUpgraded { .. } => EventKind::TowerUpgraded,
            Self::HeroLevelUp { .. } => EventKind::HeroLevelUp,
            Self::HeroDied => EventKind::HeroDied,
        }
    }
}

/// Payload-free discriminant of [`Event`].
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    TimeAdvanced,
    SessionStateChanged,
    CoinsChanged,
    ExperienceChanged,
    LevelUp,
    WaveStarted,
    WaveCompleted,
    EnemySpawned,
    BossSpawned,
    SpawnAborted,
    EnemyKilled,
    BossDefeated,
    DefenderDamaged,
    LivesChanged,
    ProjectileLaunched,
    ProjectileMissed,
    TowerBuilt,
    TowerSold,
    TowerUpgraded,
    HeroLevelUp,
    HeroDied,
}

/// Reasons a scheduled spawn may be dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnAbortReason {
    /// The wave referenced an enemy type missing from the catalog.
    UnknownTemplate,
    /// No spawn point was configured.
    NoSpawnPoint,
}

/// States of the overall session state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// The simulation advances on every tick.
    Running,
    /// The simulation is frozen; frames are still produced.
    Paused,
    /// The defender ran out of lives.
    GameOver,
    /// Every wave was cleared.
    Victory,
}

impl SessionState {
    /// Reports whether the state can never be left.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}

/// Playable sides a level can be entered with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// Elven defenders.
    #[default]
    Light,
    /// Orcish defenders.
    Dark,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a route within a level definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteId(u32);

impl RouteId {
    /// Creates a new route identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the route within the level's route list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Entity credited with an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attacker {
    /// A tower fired the attack.
    Tower(TowerId),
    /// The hero fired the attack.
    Hero,
}

/// Single piece of a route, optionally bent by a quadratic control point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    /// First point of the segment.
    pub start: Vec2,
    /// Last point of the segment.
    pub end: Vec2,
    /// Optional quadratic Bézier control point.
    #[serde(default)]
    pub control: Option<Vec2>,
}

impl PathSegment {
    /// Creates a straight segment.
    #[must_use]
    pub const fn straight(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            control: None,
        }
    }

    /// Creates a segment bent toward the provided control point.
    #[must_use]
    pub const fn curved(start: Vec2, end: Vec2, control: Vec2) -> Self {
        Self {
            start,
            end,
            control: Some(control),
        }
    }

    /// Evaluates the segment at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        match self.control {
            Some(control) => {
                let inverse = 1.0 - t;
                self.start * (inverse * inverse)
                    + control * (2.0 * inverse * t)
                    + self.end * (t * t)
            }
            None => self.start.lerp(self.end, t),
        }
    }

    /// Shortest distance between `point` and the segment.
    ///
    /// Curved segments are approximated by a polyline of evenly spaced samples.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        if self.control.is_none() {
            return distance_to_line(point, self.start, self.end);
        }

        let mut previous = self.start;
        let mut best = f32::INFINITY;
        for sample in 1..=CURVE_SAMPLES {
            let current = self.point_at(sample as f32 / CURVE_SAMPLES as f32);
            best = best.min(distance_to_line(point, previous, current));
            previous = current;
        }
        best
    }
}

/// Ordered list of segments an enemy follows from its spawn point to the defense point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    segments: Vec<PathSegment>,
}

impl Route {
    /// Creates a route from the provided segments.
    #[must_use]
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Segments composing the route in travel order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Segment at the provided index, if it exists.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&PathSegment> {
        self.segments.get(index)
    }

    /// Number of segments in the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Reports whether the route has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Position enemies enter the route at.
    #[must_use]
    pub fn spawn_point(&self) -> Option<Vec2> {
        self.segments.first().map(|segment| segment.start)
    }

    /// Position enemies breach at.
    #[must_use]
    pub fn defense_point(&self) -> Option<Vec2> {
        self.segments.last().map(|segment| segment.end)
    }

    /// Shortest distance between `point` and any segment of the route.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.segments
            .iter()
            .map(|segment| segment.distance_to(point))
            .fold(f32::INFINITY, f32::min)
    }
}

/// Pre-authorised coordinate where a tower may be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildSpot {
    /// Centre of the spot.
    pub position: Vec2,
}

impl BuildSpot {
    /// Creates a build spot centred on the provided position.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self { position }
    }
}

/// Live enemy tracked in the wave roster.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyInstance {
    /// Identifier assigned at spawn time.
    pub id: EnemyId,
    /// Catalog identifier of the template.
    pub template: String,
    /// Display name copied from the template.
    pub name: String,
    /// Remaining health, never below zero.
    pub health: u32,
    /// Health the enemy spawned with.
    pub max_health: u32,
    /// Flat damage reduction applied to every hit.
    pub armor: u32,
    /// Movement speed before scaling.
    pub speed: f32,
    /// Damage dealt to the defender on breach.
    pub damage: u32,
    /// Coins awarded when the enemy is killed.
    pub coins: u32,
    /// Experience awarded when the hero kills the enemy.
    pub experience: u32,
    /// Current position.
    pub position: Vec2,
    /// Route the enemy follows.
    pub route: RouteId,
    /// Index of the segment currently being travelled.
    pub path_index: usize,
    /// Point the enemy is walking toward.
    pub target: Vec2,
    /// Whether the enemy is still in play.
    pub alive: bool,
    /// Whether the enemy left play by reaching the defense point.
    pub breached: bool,
    /// Whether the template is tagged as a boss.
    pub is_boss: bool,
    /// Zero-based index of the wave that spawned the enemy.
    pub wave: usize,
}

impl EnemyInstance {
    /// Reports whether the enemy may still be moved or targeted.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }
}

/// Tower constructed on a build spot.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerInstance {
    /// Identifier allocated by the world.
    pub id: TowerId,
    /// Catalog identifier of the template.
    pub template: String,
    /// Index of the build spot the tower occupies.
    pub spot: usize,
    /// Position of the tower.
    pub position: Vec2,
    /// Current upgrade level, starting at 1.
    pub level: u32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Attack range.
    pub range: f32,
    /// Minimum time between attacks.
    pub attack_interval: Duration,
    /// Projectile speed; `None` for instant-hit towers.
    pub projectile_speed: Option<f32>,
    /// Base construction cost.
    pub cost: u32,
    /// Coins spent on construction and upgrades.
    pub invested: u32,
    /// Simulation time of the last attack.
    pub last_attack: Option<Duration>,
    /// Whether the tower was removed from play.
    pub destroyed: bool,
}

/// Shot travelling toward a fixed impact point.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Identifier allocated at launch.
    pub id: ProjectileId,
    /// Attacker credited with damage dealt by the projectile.
    pub origin: Attacker,
    /// Current position.
    pub position: Vec2,
    /// Impact point captured at launch.
    pub target: Vec2,
    /// Travel speed before scaling.
    pub speed: f32,
    /// Raw damage applied on impact.
    pub damage: u32,
    /// Radius searched for a victim on impact.
    pub hit_radius: f32,
    /// Time spent in flight.
    pub flight_time: Duration,
    /// Whether the projectile was consumed.
    pub spent: bool,
}

/// Player-controlled hero.
#[derive(Clone, Debug, PartialEq)]
pub struct HeroState {
    /// Current position.
    pub position: Vec2,
    /// Destination of an ongoing walk.
    pub move_target: Option<Vec2>,
    /// Walking speed before scaling.
    pub walk_speed: f32,
    /// Remaining health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Current level.
    pub level: u32,
    /// Accumulated experience.
    pub experience: u32,
    /// Damage dealt per attack.
    pub damage: u32,
    /// Attack range.
    pub range: f32,
    /// Minimum time between attacks.
    pub attack_interval: Duration,
    /// Speed of the hero's projectiles.
    pub projectile_speed: f32,
    /// Simulation time of the last attack.
    pub last_attack: Option<Duration>,
    /// Whether the hero is alive.
    pub alive: bool,
}

impl HeroState {
    /// Creates a level 1 hero standing at `position`.
    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            move_target: None,
            walk_speed: 1.25,
            health: 100,
            max_health: 100,
            level: 1,
            experience: 0,
            damage: 20,
            range: 100.0,
            attack_interval: Duration::from_millis(1_500),
            projectile_speed: 400.0,
            last_attack: None,
            alive: true,
        }
    }

    /// Applies the stat growth granted by a single level.
    pub fn grow(&mut self) {
        self.level = self.level.saturating_add(1);
        self.damage = self.damage.saturating_add(HERO_DAMAGE_PER_LEVEL);
        self.range += HERO_RANGE_PER_LEVEL;
        self.attack_interval = self
            .attack_interval
            .saturating_sub(HERO_INTERVAL_STEP)
            .max(HERO_MIN_ATTACK_INTERVAL);
    }

    /// Removes health from the hero, returning `true` when this call killed it.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.alive = false;
            self.move_target = None;
            return true;
        }
        false
    }
}

/// Moves `position` toward `target` without overshooting.
///
/// The step length is `speed * dt_ms * MOVEMENT_SCALE`.
pub fn travel_toward(position: &mut Vec2, target: Vec2, speed: f32, dt: Duration) {
    let offset = target - *position;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return;
    }

    let step = speed * dt.as_secs_f32() * 1_000.0 * MOVEMENT_SCALE;
    if step >= distance {
        *position = target;
    } else {
        *position += offset / distance * step;
    }
}

/// Unknown identifiers reported by catalog lookups.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No enemy template uses the identifier.
    #[error("unknown enemy type `{0}`")]
    UnknownEnemy(String),
    /// No tower template uses the identifier.
    #[error("unknown tower type `{0}`")]
    UnknownTower(String),
    /// No level uses the identifier.
    #[error("unknown level {0}")]
    UnknownLevel(u32),
}

/// Reasons a tower construction request may be rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The requested tower type is not in the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The position is not close to any build spot.
    #[error("position is not on a build spot")]
    NotBuildSpot,
    /// The build spot already holds a tower.
    #[error("build spot {spot} is already occupied")]
    SpotOccupied {
        /// Index of the occupied spot.
        spot: usize,
    },
    /// Another tower stands too close to the position.
    #[error("position is too close to tower {tower:?}")]
    TooCloseToTower {
        /// Tower blocking the placement.
        tower: TowerId,
    },
    /// The position overlaps the path corridor.
    #[error("position overlaps the enemy path")]
    OnPath,
    /// The player cannot afford the tower.
    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientCoins {
        /// Cost of the tower.
        needed: u32,
        /// Coins currently held.
        available: u32,
    },
}

/// Reasons a tower upgrade request may be rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UpgradeError {
    /// No tower with the identifier exists.
    #[error("tower {0:?} does not exist")]
    MissingTower(TowerId),
    /// The tower's template is not in the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The tower already sits at the top of its ladder.
    #[error("tower is already at its maximum level {level}")]
    MaxLevel {
        /// Level of the tower.
        level: u32,
    },
    /// The player cannot afford the upgrade.
    #[error("not enough coins: need {needed}, have {available}")]
    InsufficientCoins {
        /// Cost of the upgrade step.
        needed: u32,
        /// Coins currently held.
        available: u32,
    },
}

/// Reasons a tower sale may be rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SellError {
    /// No tower with the identifier exists.
    #[error("tower {0:?} does not exist")]
    MissingTower(TowerId),
    /// The tower's template is not in the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Failures reported synchronously by the world's command entry point.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Tower construction was rejected.
    #[error("build rejected: {0}")]
    Build(#[from] BuildError),
    /// Tower upgrade was rejected.
    #[error("upgrade rejected: {0}")]
    Upgrade(#[from] UpgradeError),
    /// Tower sale was rejected.
    #[error("sale rejected: {0}")]
    Sell(#[from] SellError),
    /// A wave is already running or the schedule is exhausted.
    #[error("no wave can be started right now")]
    WaveUnavailable,
    /// The hero is dead and cannot be ordered around.
    #[error("the hero is not alive")]
    HeroUnavailable,
    /// The session reached a terminal state.
    #[error("the session is over")]
    SessionOver,
}

fn distance_to_line(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let along = end - start;
    let length_sq = along.length_squared();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(along) / length_sq).clamp(0.0, 1.0);
    point.distance(start + along * t)
}
