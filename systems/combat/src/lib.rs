#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system resolving tower and hero attacks against the enemy roster.
//!
//! Attackers pick the nearest alive enemy within range and fire once their
//! attack interval has elapsed. Instant-hit attackers damage the target
//! immediately; ranged attackers launch a [`Projectile`] toward the position
//! the target occupied at launch. Kills pay coins into the ledger, and kills
//! credited to the hero also pay experience.

use std::time::Duration;

use glam::Vec2;
use realm_defence_core::{
    travel_toward, Attacker, EnemyInstance, Event, HeroState, Projectile, ProjectileId,
    TowerInstance, ARRIVAL_THRESHOLD,
};
use realm_defence_system_economy::EconomyLedger;
use tracing::{debug, trace};

/// Radius around the impact point searched by tower projectiles.
pub const TOWER_HIT_RADIUS: f32 = 50.0;
/// Radius around the impact point searched by hero projectiles.
pub const HERO_HIT_RADIUS: f32 = 30.0;
/// Flight time after which a projectile is consumed as a miss.
pub const MAX_FLIGHT_TIME: Duration = Duration::from_secs(5);
/// Score awarded per point of experience carried by a killed enemy.
pub const SCORE_PER_EXPERIENCE: u32 = 10;

/// Shared interface of everything that can attack enemies.
pub trait Combatant {
    /// Identity credited with damage dealt by this attacker.
    fn attacker(&self) -> Attacker;
    /// Position attacks originate from.
    fn position(&self) -> Vec2;
    /// Maximum distance to a valid target.
    fn range(&self) -> f32;
    /// Raw damage per attack.
    fn damage(&self) -> u32;
    /// Minimum time between attacks.
    fn attack_interval(&self) -> Duration;
    /// Speed of launched projectiles; `None` for instant hits.
    fn projectile_speed(&self) -> Option<f32>;
    /// Radius searched by launched projectiles on impact.
    fn hit_radius(&self) -> f32;
    /// Simulation time of the last attack.
    fn last_attack(&self) -> Option<Duration>;
    /// Records that an attack happened at `now`.
    fn record_attack(&mut self, now: Duration);
}

impl Combatant for TowerInstance {
    fn attacker(&self) -> Attacker {
        Attacker::Tower(self.id)
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn range(&self) -> f32 {
        self.range
    }

    fn damage(&self) -> u32 {
        self.damage
    }

    fn attack_interval(&self) -> Duration {
        self.attack_interval
    }

    fn projectile_speed(&self) -> Option<f32> {
        self.projectile_speed
    }

    fn hit_radius(&self) -> f32 {
        TOWER_HIT_RADIUS
    }

    fn last_attack(&self) -> Option<Duration> {
        self.last_attack
    }

    fn record_attack(&mut self, now: Duration) {
        self.last_attack = Some(now);
    }
}

impl Combatant for HeroState {
    fn attacker(&self) -> Attacker {
        Attacker::Hero
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn range(&self) -> f32 {
        self.range
    }

    fn damage(&self) -> u32 {
        self.damage
    }

    fn attack_interval(&self) -> Duration {
        self.attack_interval
    }

    fn projectile_speed(&self) -> Option<f32> {
        Some(self.projectile_speed)
    }

    fn hit_radius(&self) -> f32 {
        HERO_HIT_RADIUS
    }

    fn last_attack(&self) -> Option<Duration> {
        self.last_attack
    }

    fn record_attack(&mut self, now: Duration) {
        self.last_attack = Some(now);
    }
}

/// Mutable collaborators touched when attacks resolve.
#[derive(Debug)]
pub struct CombatContext<'a> {
    /// Ledger credited with kill rewards.
    pub ledger: &'a mut EconomyLedger,
    /// Buffer receiving combat events.
    pub out: &'a mut Vec<Event>,
}

/// Outcome of an attacker firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shot {
    /// Damage was applied immediately.
    Instant {
        /// Damage actually removed from the target.
        damage: u32,
        /// Whether the hit killed the target.
        killed: bool,
    },
    /// A projectile was launched.
    Launched(ProjectileId),
}

/// Index of the nearest alive enemy within `range` of `origin`.
///
/// Equal distances keep the earlier roster entry.
#[must_use]
pub fn nearest_target(origin: Vec2, range: f32, enemies: &[EnemyInstance]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, enemy) in enemies.iter().enumerate() {
        if !enemy.alive {
            continue;
        }
        let distance = origin.distance(enemy.position);
        if distance > range {
            continue;
        }
        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

/// Reports whether an attacker last firing at `last_attack` may fire at `now`.
#[must_use]
pub fn is_ready(last_attack: Option<Duration>, interval: Duration, now: Duration) -> bool {
    match last_attack {
        None => true,
        Some(last) => now.saturating_sub(last) >= interval,
    }
}

/// Applies `raw` damage reduced by armor, never less than one point.
///
/// Returns the damage actually dealt. Dead enemies are left untouched.
pub fn apply_damage(enemy: &mut EnemyInstance, raw: u32) -> u32 {
    if !enemy.alive {
        trace!(enemy = enemy.id.get(), "ignoring damage to dead enemy");
        return 0;
    }
    let actual = raw.saturating_sub(enemy.armor).max(1);
    enemy.health = enemy.health.saturating_sub(actual);
    actual
}

/// Resolves attacks and owns every projectile in flight.
#[derive(Debug, Default)]
pub struct CombatResolver {
    projectiles: Vec<Projectile>,
    next_projectile_id: u32,
    score: u32,
}

impl CombatResolver {
    /// Creates a resolver with no projectiles and a zero score.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets every standing tower attack once if it has a target and is ready.
    pub fn resolve_tower_attacks(
        &mut self,
        towers: &mut [TowerInstance],
        enemies: &mut [EnemyInstance],
        now: Duration,
        ctx: &mut CombatContext<'_>,
    ) {
        for tower in towers.iter_mut().filter(|tower| !tower.destroyed) {
            let _ = self.attack(tower, enemies, now, ctx);
        }
    }

    /// Lets the hero attack once if it is alive, has a target and is ready.
    pub fn resolve_hero_attack(
        &mut self,
        hero: &mut HeroState,
        enemies: &mut [EnemyInstance],
        now: Duration,
        ctx: &mut CombatContext<'_>,
    ) -> Option<Shot> {
        if !hero.alive {
            return None;
        }
        let shot = self.attack(hero, enemies, now, ctx)?;
        if let Shot::Instant { killed: true, .. } = shot {
            sync_hero(hero, ctx);
        }
        Some(shot)
    }

    /// Lets a single attacker fire at the nearest target.
    ///
    /// Readiness is only evaluated when a target exists.
    pub fn attack<C: Combatant>(
        &mut self,
        attacker: &mut C,
        enemies: &mut [EnemyInstance],
        now: Duration,
        ctx: &mut CombatContext<'_>,
    ) -> Option<Shot> {
        let index = nearest_target(attacker.position(), attacker.range(), enemies)?;
        if !is_ready(attacker.last_attack(), attacker.attack_interval(), now) {
            return None;
        }
        attacker.record_attack(now);
        let target = enemies.get_mut(index)?;

        match attacker.projectile_speed() {
            None => {
                let damage = apply_damage(target, attacker.damage());
                let killed = target.health == 0;
                if killed {
                    settle_kill(target, attacker.attacker(), &mut self.score, ctx);
                }
                Some(Shot::Instant { damage, killed })
            }
            Some(speed) => {
                let id = ProjectileId::new(self.next_projectile_id);
                self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
                self.projectiles.push(Projectile {
                    id,
                    origin: attacker.attacker(),
                    position: attacker.position(),
                    target: target.position,
                    speed,
                    damage: attacker.damage(),
                    hit_radius: attacker.hit_radius(),
                    flight_time: Duration::ZERO,
                    spent: false,
                });
                ctx.out.push(Event::ProjectileLaunched {
                    projectile: id,
                    origin: attacker.attacker(),
                    target: target.position,
                });
                Some(Shot::Launched(id))
            }
        }
    }

    /// Moves projectiles toward their impact points and resolves arrivals.
    pub fn update_projectiles(
        &mut self,
        dt: Duration,
        enemies: &mut [EnemyInstance],
        hero: &mut HeroState,
        ctx: &mut CombatContext<'_>,
    ) {
        let mut hero_killed = false;
        for projectile in self.projectiles.iter_mut().filter(|p| !p.spent) {
            projectile.flight_time = projectile.flight_time.saturating_add(dt);
            travel_toward(
                &mut projectile.position,
                projectile.target,
                projectile.speed,
                dt,
            );

            if projectile.position.distance(projectile.target) < ARRIVAL_THRESHOLD {
                projectile.spent = true;
                let victim =
                    match nearest_target(projectile.target, projectile.hit_radius, enemies) {
                        Some(index) => enemies.get_mut(index),
                        None => None,
                    };
                match victim {
                    Some(enemy) => {
                        let _ = apply_damage(enemy, projectile.damage);
                        if enemy.health == 0 {
                            settle_kill(enemy, projectile.origin, &mut self.score, ctx);
                            hero_killed |= projectile.origin == Attacker::Hero;
                        }
                    }
                    None => report_miss(projectile, ctx.out),
                }
            } else if projectile.flight_time >= MAX_FLIGHT_TIME {
                projectile.spent = true;
                report_miss(projectile, ctx.out);
            }
        }

        if hero_killed {
            sync_hero(hero, ctx);
        }
    }

    /// Drops consumed projectiles.
    pub fn prune_spent(&mut self) {
        self.projectiles.retain(|projectile| !projectile.spent);
    }

    /// Projectiles currently tracked, including ones spent since the last prune.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }
}

fn settle_kill(
    enemy: &mut EnemyInstance,
    killer: Attacker,
    score: &mut u32,
    ctx: &mut CombatContext<'_>,
) {
    enemy.alive = false;
    debug!(enemy = enemy.id.get(), ?killer, "enemy killed");

    ctx.ledger.add_coins(enemy.coins, "kill", ctx.out);
    if killer == Attacker::Hero {
        let _ = ctx.ledger.add_experience(enemy.experience, "hero_kill", ctx.out);
    }
    *score = score.saturating_add(enemy.experience.saturating_mul(SCORE_PER_EXPERIENCE));

    ctx.out.push(Event::EnemyKilled {
        enemy: enemy.id,
        template: enemy.template.clone(),
        killer,
    });
    if enemy.is_boss {
        ctx.out.push(Event::BossDefeated {
            enemy: enemy.id,
            template: enemy.template.clone(),
        });
    }
}

fn sync_hero(hero: &mut HeroState, ctx: &mut CombatContext<'_>) {
    hero.experience = ctx.ledger.experience();
    while hero.level < ctx.ledger.level() {
        hero.grow();
        debug!(level = hero.level, "hero level up");
        ctx.out.push(Event::HeroLevelUp { level: hero.level });
    }
}

fn report_miss(projectile: &Projectile, out: &mut Vec<Event>) {
    trace!(projectile = projectile.id.get(), "projectile missed");
    out.push(Event::ProjectileMissed {
        projectile: projectile.id,
        origin: projectile.origin,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_defence_core::{EnemyId, RouteId};

    fn enemy_at(id: u32, position: Vec2) -> EnemyInstance {
        EnemyInstance {
            id: EnemyId::new(id),
            template: "goblin".to_owned(),
            name: "Goblin".to_owned(),
            health: 50,
            max_health: 50,
            armor: 0,
            speed: 1.5,
            damage: 1,
            coins: 5,
            experience: 2,
            position,
            route: RouteId::new(0),
            path_index: 0,
            target: position,
            alive: true,
            breached: false,
            is_boss: false,
            wave: 0,
        }
    }

    #[test]
    fn ties_keep_the_earlier_roster_entry() {
        let enemies = vec![
            enemy_at(0, Vec2::new(10.0, 0.0)),
            enemy_at(1, Vec2::new(-10.0, 0.0)),
        ];
        assert_eq!(nearest_target(Vec2::ZERO, 50.0, &enemies), Some(0));
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let enemies = vec![enemy_at(0, Vec2::new(50.0, 0.0))];
        assert_eq!(nearest_target(Vec2::ZERO, 50.0, &enemies), Some(0));
        assert_eq!(nearest_target(Vec2::ZERO, 49.9, &enemies), None);
    }

    #[test]
    fn dead_enemies_are_never_targeted() {
        let mut enemies = vec![
            enemy_at(0, Vec2::new(1.0, 0.0)),
            enemy_at(1, Vec2::new(30.0, 0.0)),
        ];
        enemies[0].alive = false;
        assert_eq!(nearest_target(Vec2::ZERO, 50.0, &enemies), Some(1));
    }

    #[test]
    fn readiness_requires_full_interval() {
        let interval = Duration::from_millis(1_500);
        assert!(is_ready(None, interval, Duration::ZERO));
        assert!(!is_ready(Some(Duration::ZERO), interval, Duration::from_millis(1_499)));
        assert!(is_ready(Some(Duration::ZERO), interval, Duration::from_millis(1_500)));
    }

    #[test]
    fn dead_enemy_takes_no_damage() {
        let mut enemy = enemy_at(0, Vec2::ZERO);
        enemy.alive = false;
        assert_eq!(apply_damage(&mut enemy, 30), 0);
        assert_eq!(enemy.health, 50);
    }
}
