use std::time::Duration;

use glam::Vec2;
use realm_defence_core::{EnemyId, EnemyInstance, Event, PathSegment, Route, RouteId};
use realm_defence_system_movement::{BreachDamage, Config, EnemyMotion, MotionOutcome};

fn two_leg_route() -> Route {
    Route::new(vec![
        PathSegment::straight(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)),
        PathSegment::straight(Vec2::new(100.0, 0.0), Vec2::new(100.0, 50.0)),
    ])
}

fn walker(speed: f32) -> EnemyInstance {
    EnemyInstance {
        id: EnemyId::new(1),
        template: "goblin".to_owned(),
        name: "Goblin".to_owned(),
        health: 50,
        max_health: 50,
        armor: 0,
        speed,
        damage: 4,
        coins: 5,
        experience: 2,
        position: Vec2::ZERO,
        route: RouteId::new(0),
        path_index: 0,
        target: Vec2::new(100.0, 0.0),
        alive: true,
        breached: false,
        is_boss: false,
        wave: 0,
    }
}

#[test]
fn step_length_scales_with_speed_and_elapsed_milliseconds() {
    let motion = EnemyMotion::default();
    let route = two_leg_route();
    let mut enemy = walker(1.5);
    let mut events = Vec::new();

    let outcome = motion.advance(&mut enemy, &route, Duration::from_millis(100), &mut events);
    assert_eq!(outcome, MotionOutcome::Moved);
    assert!((enemy.position.x - 15.0).abs() < 1e-3, "1.5 * 100ms * 0.1");
    assert!(events.is_empty());
}

#[test]
fn reaching_a_segment_end_retargets_to_the_next_segment() {
    let motion = EnemyMotion::default();
    let route = two_leg_route();
    let mut enemy = walker(1.0);
    let mut events = Vec::new();

    let _ = motion.advance(&mut enemy, &route, Duration::from_millis(996), &mut events);
    assert_eq!(enemy.path_index, 1, "within the arrival threshold of the corner");
    assert_eq!(enemy.target, Vec2::new(100.0, 50.0));
}

#[test]
fn breach_happens_exactly_once() {
    let motion = EnemyMotion::new(Config::new(BreachDamage::EnemyDamage));
    let route = two_leg_route();
    let mut enemy = walker(10.0);
    let mut events = Vec::new();

    let mut outcomes = Vec::new();
    for _ in 0..10 {
        outcomes.push(motion.advance(&mut enemy, &route, Duration::from_millis(100), &mut events));
    }

    let breaches = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, MotionOutcome::Breached { .. }))
        .count();
    assert_eq!(breaches, 1, "breach must be reported once: {outcomes:?}");
    assert!(outcomes.contains(&MotionOutcome::Breached { damage: 4 }));
    assert_eq!(outcomes.last(), Some(&MotionOutcome::Skipped));
    assert!(!enemy.alive);
    assert!(enemy.breached);
    assert_eq!(
        events,
        vec![Event::DefenderDamaged {
            enemy: EnemyId::new(1),
            amount: 4,
        }]
    );
}

#[test]
fn advance_all_sums_breach_damage_and_skips_missing_routes() {
    let motion = EnemyMotion::default();
    let routes = vec![two_leg_route()];
    let mut near_end = walker(1.0);
    near_end.path_index = 1;
    near_end.position = Vec2::new(100.0, 48.0);
    near_end.target = Vec2::new(100.0, 50.0);
    let mut lost = walker(1.0);
    lost.id = EnemyId::new(2);
    lost.route = RouteId::new(5);
    let mut enemies = vec![near_end, lost];
    let mut events = Vec::new();

    let damage = motion.advance_all(&mut enemies, &routes, Duration::from_millis(16), &mut events);
    assert_eq!(damage, 1);
    assert!(enemies[0].breached);
    assert_eq!(enemies[1].position, Vec2::ZERO, "enemy without a route stays put");
}
