#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks enemies along their routes.

use std::time::Duration;

use realm_defence_core::{
    travel_toward, EnemyInstance, Event, HeroState, Route, ARRIVAL_THRESHOLD,
};
use tracing::{debug, trace, warn};

/// Lives removed when an enemy breaches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreachDamage {
    /// Every breach removes the same number of lives.
    Fixed(u32),
    /// A breach removes the breaching enemy's damage value.
    EnemyDamage,
}

impl Default for BreachDamage {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

/// Configuration parameters required to construct the motion system.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    breach_damage: BreachDamage,
}

impl Config {
    /// Creates a new configuration using the provided breach policy.
    #[must_use]
    pub const fn new(breach_damage: BreachDamage) -> Self {
        Self { breach_damage }
    }
}

/// Result of advancing a single enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionOutcome {
    /// The enemy was not in play and did not move.
    Skipped,
    /// The enemy moved and remains on its route.
    Moved,
    /// The enemy reached the defense point and left play.
    Breached {
        /// Lives removed by the breach.
        damage: u32,
    },
}

/// Pure system advancing enemies and the hero.
#[derive(Debug, Default)]
pub struct EnemyMotion {
    breach_damage: BreachDamage,
}

impl EnemyMotion {
    /// Creates a motion system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            breach_damage: config.breach_damage,
        }
    }

    /// Moves `enemy` one step along `route`.
    pub fn advance(
        &self,
        enemy: &mut EnemyInstance,
        route: &Route,
        dt: Duration,
        out: &mut Vec<Event>,
    ) -> MotionOutcome {
        if !enemy.alive {
            trace!(enemy = enemy.id.get(), "skipping motion for dead enemy");
            return MotionOutcome::Skipped;
        }

        if route.segment(enemy.path_index).is_none() {
            return self.breach(enemy, out);
        }

        travel_toward(&mut enemy.position, enemy.target, enemy.speed, dt);
        if enemy.position.distance(enemy.target) >= ARRIVAL_THRESHOLD {
            return MotionOutcome::Moved;
        }

        enemy.path_index += 1;
        match route.segment(enemy.path_index) {
            Some(segment) => {
                enemy.target = segment.end;
                MotionOutcome::Moved
            }
            None => self.breach(enemy, out),
        }
    }

    /// Moves every enemy along its own route and returns the total lives lost.
    pub fn advance_all(
        &self,
        enemies: &mut [EnemyInstance],
        routes: &[Route],
        dt: Duration,
        out: &mut Vec<Event>,
    ) -> u32 {
        let mut lost = 0_u32;
        for enemy in enemies.iter_mut() {
            let Some(route) = routes.get(enemy.route.index()) else {
                if enemy.alive {
                    warn!(
                        enemy = enemy.id.get(),
                        route = enemy.route.get(),
                        "enemy references a missing route"
                    );
                }
                continue;
            };
            if let MotionOutcome::Breached { damage } = self.advance(enemy, route, dt, out) {
                lost = lost.saturating_add(damage);
            }
        }
        lost
    }

    /// Walks the hero toward its move target, returning `true` on arrival.
    pub fn walk_hero(&self, hero: &mut HeroState, dt: Duration) -> bool {
        if !hero.alive {
            return false;
        }
        let Some(target) = hero.move_target else {
            return false;
        };

        travel_toward(&mut hero.position, target, hero.walk_speed, dt);
        if hero.position.distance(target) < ARRIVAL_THRESHOLD {
            hero.position = target;
            hero.move_target = None;
            return true;
        }
        false
    }

    fn breach(&self, enemy: &mut EnemyInstance, out: &mut Vec<Event>) -> MotionOutcome {
        enemy.alive = false;
        enemy.breached = true;
        let damage = match self.breach_damage {
            BreachDamage::Fixed(amount) => amount,
            BreachDamage::EnemyDamage => enemy.damage,
        };
        debug!(enemy = enemy.id.get(), damage, "enemy breached");
        out.push(Event::DefenderDamaged {
            enemy: enemy.id,
            amount: damage,
        });
        MotionOutcome::Breached { damage }
    }
}
