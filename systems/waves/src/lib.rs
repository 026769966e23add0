#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system that owns the live enemy roster.
//!
//! Starting a wave expands its spawn groups into a timeline of due times.
//! Every update advances the wave clock by the tick delta and spawns each
//! entry whose due time has been reached, so spawn order is fixed relative
//! to motion and combat within the same tick.

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use realm_defence_catalog::{Catalog, EnemyTemplate, WaveDefinition};
use realm_defence_core::{EnemyId, EnemyInstance, Event, Route, RouteId, SpawnAbortReason};
use tracing::{debug, error, info, trace};

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn point seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Entry point enemies may appear at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    position: Vec2,
    route: RouteId,
    heading: Vec2,
}

impl SpawnPoint {
    /// Creates a spawn point at `position` whose enemies first walk toward `heading`.
    #[must_use]
    pub const fn new(position: Vec2, route: RouteId, heading: Vec2) -> Self {
        Self {
            position,
            route,
            heading,
        }
    }

    /// Builds the spawn point located at the start of `definition`.
    #[must_use]
    pub fn for_route(route: RouteId, definition: &Route) -> Option<Self> {
        let first = definition.segment(0)?;
        Some(Self::new(first.start, route, first.end))
    }

    /// Position enemies appear at.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Route enemies spawned here follow.
    #[must_use]
    pub const fn route(&self) -> RouteId {
        self.route
    }
}

/// Spawn counters of the active wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveProgress {
    /// Spawn events already fired.
    pub spawned: u32,
    /// Spawn events in the wave.
    pub total: u32,
}

#[derive(Clone, Debug)]
struct PendingSpawn {
    due: Duration,
    enemy: String,
}

/// Sequences waves, spawns their enemies and tracks completion.
#[derive(Debug)]
pub struct WaveDirector {
    schedule: Vec<WaveDefinition>,
    spawn_points: Vec<SpawnPoint>,
    wave_index: usize,
    active: bool,
    paused: bool,
    wave_clock: Duration,
    pending: VecDeque<PendingSpawn>,
    spawned: u32,
    total: u32,
    roster: Vec<EnemyInstance>,
    next_enemy_id: u32,
    rng: ChaCha8Rng,
}

impl WaveDirector {
    /// Creates a director with an empty schedule.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            schedule: Vec::new(),
            spawn_points: Vec::new(),
            wave_index: 0,
            active: false,
            paused: false,
            wave_clock: Duration::ZERO,
            pending: VecDeque::new(),
            spawned: 0,
            total: 0,
            roster: Vec::new(),
            next_enemy_id: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Replaces the schedule and forgets any progress through the previous one.
    pub fn set_schedule(&mut self, waves: Vec<WaveDefinition>) {
        self.schedule = waves;
        self.wave_index = 0;
        self.active = false;
        self.wave_clock = Duration::ZERO;
        self.pending.clear();
        self.spawned = 0;
        self.total = 0;
        self.roster.clear();
    }

    /// Replaces the spawn points used for future spawns.
    pub fn set_spawn_points(&mut self, points: Vec<SpawnPoint>) {
        self.spawn_points = points;
    }

    /// Starts the next wave of the schedule.
    ///
    /// Returns `false` without changing state when a wave is already active or
    /// every wave has been played.
    pub fn start_next_wave(&mut self, out: &mut Vec<Event>) -> bool {
        if self.active {
            debug!(wave = self.wave_index, "wave start refused: wave in progress");
            return false;
        }
        let Some(wave) = self.schedule.get(self.wave_index) else {
            debug!("wave start refused: schedule exhausted");
            return false;
        };

        self.pending = build_timeline(wave);
        self.total = wave.enemy_count();
        self.spawned = 0;
        self.wave_clock = Duration::ZERO;
        self.active = true;

        info!(
            wave = self.wave_index,
            enemies = self.total,
            boss = wave.is_boss,
            "wave started"
        );
        out.push(Event::WaveStarted {
            wave: self.wave_index,
            boss: wave.is_boss,
        });
        true
    }

    /// Advances the wave clock and fires every spawn that became due.
    pub fn update(&mut self, dt: Duration, catalog: &Catalog, out: &mut Vec<Event>) {
        if !self.active || self.paused {
            return;
        }

        self.wave_clock = self.wave_clock.saturating_add(dt);
        while self
            .pending
            .front()
            .is_some_and(|spawn| spawn.due <= self.wave_clock)
        {
            let Some(spawn) = self.pending.pop_front() else {
                break;
            };
            self.spawned = self.spawned.saturating_add(1);
            self.spawn(&spawn.enemy, catalog, out);
        }

        self.check_completion(out);
    }

    /// Completes the active wave when every spawn fired and none of its enemies
    /// remain alive.
    pub fn check_completion(&mut self, out: &mut Vec<Event>) {
        if !self.active || !self.pending.is_empty() {
            return;
        }
        let wave = self.wave_index;
        if self
            .roster
            .iter()
            .any(|enemy| enemy.alive && enemy.wave == wave)
        {
            return;
        }

        self.active = false;
        self.wave_index += 1;
        self.prune_dead();
        info!(wave, "wave completed");
        out.push(Event::WaveCompleted { wave });
    }

    /// Removes dead and breached enemies from the roster.
    pub fn prune_dead(&mut self) {
        self.roster.retain(EnemyInstance::is_alive);
    }

    /// Aborts the active wave and clears the roster.
    pub fn stop(&mut self) {
        if self.active {
            info!(wave = self.wave_index, "wave stopped");
        }
        self.active = false;
        self.pending.clear();
        self.spawned = 0;
        self.total = 0;
        self.wave_clock = Duration::ZERO;
        self.roster.clear();
    }

    /// Suspends the wave clock.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes the wave clock from where it was suspended.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Reports whether the wave clock is suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reports whether a wave is spawning or still has live enemies.
    #[must_use]
    pub const fn is_wave_active(&self) -> bool {
        self.active
    }

    /// Number of waves completed so far, which is also the index of the next
    /// or active wave.
    #[must_use]
    pub const fn wave_index(&self) -> usize {
        self.wave_index
    }

    /// Number of waves in the schedule.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.schedule.len()
    }

    /// Reports whether every wave of the schedule has been completed.
    #[must_use]
    pub fn all_waves_complete(&self) -> bool {
        !self.active && self.wave_index >= self.schedule.len()
    }

    /// Spawn counters of the active wave.
    #[must_use]
    pub const fn wave_progress(&self) -> Option<WaveProgress> {
        if !self.active {
            return None;
        }
        Some(WaveProgress {
            spawned: self.spawned,
            total: self.total,
        })
    }

    /// Alive enemies in spawn order.
    pub fn live_enemies(&self) -> impl Iterator<Item = &EnemyInstance> {
        self.roster.iter().filter(|enemy| enemy.alive)
    }

    /// Every roster entry, including enemies that died since the last prune.
    #[must_use]
    pub fn enemies(&self) -> &[EnemyInstance] {
        &self.roster
    }

    /// Mutable access to the roster for motion and combat.
    pub fn enemies_mut(&mut self) -> &mut [EnemyInstance] {
        &mut self.roster
    }

    fn spawn(&mut self, template_id: &str, catalog: &Catalog, out: &mut Vec<Event>) {
        let wave = self.wave_index;
        let template = match catalog.enemy(template_id) {
            Ok(template) => template,
            Err(lookup) => {
                error!(wave, %lookup, "spawn aborted");
                out.push(Event::SpawnAborted {
                    wave,
                    template: template_id.to_owned(),
                    reason: SpawnAbortReason::UnknownTemplate,
                });
                return;
            }
        };
        let Some(point) = self.select_spawn_point() else {
            error!(wave, template = template_id, "spawn aborted: no spawn point");
            out.push(Event::SpawnAborted {
                wave,
                template: template_id.to_owned(),
                reason: SpawnAbortReason::NoSpawnPoint,
            });
            return;
        };

        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        let enemy = instantiate(id, template, point, wave);
        debug!(
            enemy = id.get(),
            template = template_id,
            route = point.route.get(),
            "enemy spawned"
        );
        out.push(Event::EnemySpawned {
            enemy: id,
            template: enemy.template.clone(),
            position: enemy.position,
        });
        if enemy.is_boss {
            out.push(Event::BossSpawned {
                enemy: id,
                template: enemy.template.clone(),
            });
        }
        self.roster.push(enemy);
    }

    fn select_spawn_point(&mut self) -> Option<SpawnPoint> {
        match self.spawn_points.len() {
            0 => None,
            1 => self.spawn_points.first().copied(),
            len => {
                let index = self.rng.gen_range(0..len);
                trace!(index, "spawn point selected");
                self.spawn_points.get(index).copied()
            }
        }
    }
}

fn build_timeline(wave: &WaveDefinition) -> VecDeque<PendingSpawn> {
    let mut pending = VecDeque::new();
    let mut group_start = Duration::ZERO;
    for group in &wave.groups {
        let delay = group.inter_delay();
        for member in 0..group.count {
            pending.push_back(PendingSpawn {
                due: group_start + delay * member,
                enemy: group.enemy.clone(),
            });
        }
        group_start += delay * group.count.saturating_sub(1);
    }
    pending
}

fn instantiate(
    id: EnemyId,
    template: &EnemyTemplate,
    point: SpawnPoint,
    wave: usize,
) -> EnemyInstance {
    EnemyInstance {
        id,
        template: template.id.clone(),
        name: template.name.clone(),
        health: template.health,
        max_health: template.health,
        armor: template.armor,
        speed: template.speed,
        damage: template.damage,
        coins: template.coins,
        experience: template.experience,
        position: point.position,
        route: point.route,
        path_index: 0,
        target: point.heading,
        alive: true,
        breached: false,
        is_boss: template.is_boss,
        wave,
    }
}
