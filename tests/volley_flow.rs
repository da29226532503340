//! Fire intake, fan-out and delayed release, driven through a headless app.

mod common;

use std::collections::HashSet;

use bevy::prelude::*;
use bevy_volley_dynamics::prelude::*;
use common::*;

#[test]
fn fire_with_no_targets_retires_root_without_children() {
    for archetype in Archetype::ALL {
        let mut app = app_headless();

        fire(&mut app, FireEvent::new(archetype, Vec2::ZERO, 5, 3));
        tick(&mut app, 1);

        assert!(projectiles(&mut app).is_empty(), "{archetype} left projectiles");
        let ledger = ledger(&app);
        assert_eq!(ledger.causes_for(archetype), vec![Termination::NoTargets]);
        assert!(ledger.damage.is_empty());
    }
}

#[test]
fn misconfigured_profile_retires_root_without_firing() {
    let mut app = app_headless();
    spawn_target(&mut app, 0.0, 3.0);
    presets_mut(&mut app).get_mut(Archetype::InventorDagger).shots = ShotFormula::new(1, 1, 6, 2);

    fire(&mut app, FireEvent::new(Archetype::InventorDagger, Vec2::ZERO, 5, 1));
    tick(&mut app, 1);

    assert!(projectiles(&mut app).is_empty());
    let ledger = ledger(&app);
    assert_eq!(
        ledger.causes_for(Archetype::InventorDagger),
        vec![Termination::Misconfigured]
    );
    assert!(ledger.damage.is_empty());
    assert!(ledger.cues.is_empty());
}

#[test]
fn two_dagger_volley_launches_side_by_side() {
    let mut app = app_headless();
    spawn_target(&mut app, 0.0, 5.0);
    spawn_target(&mut app, 0.0, 6.0);

    fire(&mut app, FireEvent::new(Archetype::InventorDagger, Vec2::ZERO, 4, 1));
    tick(&mut app, 1);

    let shots = projectiles(&mut app);
    assert_eq!(shots.len(), 2);
    for (entity, _) in &shots {
        assert!(app.world().get::<Dormant>(*entity).is_none());
        assert!(matches!(app.world().get::<Flight>(*entity), Some(Flight::Dagger { .. })));
    }

    let launches: Vec<Vec2> = ledger(&app)
        .cues
        .iter()
        .filter(|cue| cue.kind == VfxKind::Launch)
        .map(|cue| cue.position)
        .collect();
    assert_eq!(launches.len(), 2);
    assert!(launches[0].x.abs() > 1e-3);
    assert!((launches[0].x + launches[1].x).abs() < 1e-5, "mirrored across the heading");
    assert!(launches.iter().all(|p| p.y.abs() < 1e-5));
}

#[test]
fn dagger_volley_releases_back_row_after_delay() {
    let mut app = app_headless();
    for (x, y) in [(0.0, 3.0), (1.0, 3.0), (-1.0, 3.0), (0.0, 4.0)] {
        spawn_target(&mut app, x, y);
    }

    fire(&mut app, FireEvent::new(Archetype::InventorDagger, Vec2::ZERO, 7, 3));
    tick(&mut app, 1);
    let fired_at = fixed_elapsed(&app);

    let shots = projectiles(&mut app);
    assert_eq!(shots.len(), 4, "power 3 daggers fan out into four shots");
    assert_eq!(
        ledger(&app).causes_for(Archetype::InventorDagger),
        vec![Termination::FannedOut]
    );

    let world = app.world();
    let flying: Vec<Entity> = shots
        .iter()
        .filter(|(entity, _)| world.get::<Flight>(*entity).is_some())
        .map(|(entity, _)| *entity)
        .collect();
    let sleeping: Vec<(Entity, Dormant)> = shots
        .iter()
        .filter_map(|(entity, _)| world.get::<Dormant>(*entity).map(|d| (*entity, *d)))
        .collect();
    assert_eq!(flying.len(), 2);
    assert_eq!(sleeping.len(), 2);
    for (_, sleeper) in &sleeping {
        assert!((sleeper.resume_at - fired_at - 0.08).abs() < 1e-5);
    }

    let parked: Vec<Vec2> = sleeping.iter().map(|(e, _)| position(&app, *e)).collect();

    // 6/64 s is still short of the 0.08 s delay past the first tick.
    tick(&mut app, 5);
    for ((entity, _), before) in sleeping.iter().zip(&parked) {
        assert!(app.world().get::<Flight>(*entity).is_none());
        assert_eq!(position(&app, *entity), *before);
    }

    tick(&mut app, 1);
    for (entity, _) in &sleeping {
        assert!(app.world().get::<Dormant>(*entity).is_none());
        assert!(app.world().get::<Flight>(*entity).is_some());
    }
}

#[test]
fn every_dagger_strikes_its_own_target() {
    let mut app = app_headless();
    let targets: Vec<Entity> = [(0.0, 3.0), (1.0, 3.0), (-1.0, 3.0), (0.0, 4.0)]
        .into_iter()
        .map(|(x, y)| spawn_target(&mut app, x, y))
        .collect();

    fire(&mut app, FireEvent::new(Archetype::WizardDagger, Vec2::ZERO, 7, 3));
    tick(&mut app, 200);

    let ledger = ledger(&app);
    assert_eq!(ledger.damage.len(), 4);
    let struck: HashSet<Entity> = ledger.damage.iter().map(|d| d.target).collect();
    assert_eq!(struck, targets.into_iter().collect());
    assert!(ledger.damage.iter().all(|d| d.amount == 7));

    let hits = ledger
        .causes_for(Archetype::WizardDagger)
        .into_iter()
        .filter(|cause| *cause == Termination::Hit)
        .count();
    assert_eq!(hits, 4);
    assert!(projectiles(&mut app).is_empty());
}

#[test]
fn single_shot_volley_is_flown_by_the_root() {
    let mut app = app_headless();
    spawn_target(&mut app, 0.0, 5.0);
    presets_mut(&mut app).get_mut(Archetype::InventorDagger).shots = ShotFormula::new(1, 0, 1, 1);

    fire(&mut app, FireEvent::new(Archetype::InventorDagger, Vec2::ZERO, 3, 1));
    tick(&mut app, 1);

    let shots = projectiles(&mut app);
    assert_eq!(shots.len(), 1);
    let (root, projectile) = &shots[0];
    assert_eq!(projectile.serial, 0);
    assert!(app.world().get::<Staged>(*root).is_none());
    assert!(matches!(app.world().get::<Flight>(*root), Some(Flight::Dagger { .. })));
    assert!(ledger(&app).terminated.is_empty());
}

#[test]
fn despawned_dormant_shot_never_resumes() {
    let mut app = app_headless();
    for (x, y) in [(0.0, 6.0), (1.0, 6.0), (-1.0, 6.0), (0.0, 7.0)] {
        spawn_target(&mut app, x, y);
    }

    fire(&mut app, FireEvent::new(Archetype::InventorDagger, Vec2::ZERO, 1, 3));
    tick(&mut app, 1);

    let sleeping: Vec<Entity> = projectiles(&mut app)
        .into_iter()
        .map(|(entity, _)| entity)
        .filter(|entity| app.world().get::<Dormant>(*entity).is_some())
        .collect();
    assert_eq!(sleeping.len(), 2);
    app.world_mut().despawn(sleeping[0]);

    tick(&mut app, 20);

    assert_eq!(projectiles(&mut app).len(), 3);
    assert!(ledger(&app).terminated.iter().all(|t| t.projectile != sleeping[0]));
}

#[test]
fn identical_runs_produce_identical_outcomes() {
    fn run() -> (Vec<(u64, Vec2)>, Vec<(Entity, Entity)>) {
        let mut app = app_headless();
        for (x, y) in [(0.0, 4.0), (2.0, 5.0), (-1.5, 3.5)] {
            spawn_target(&mut app, x, y);
        }
        fire(&mut app, FireEvent::new(Archetype::InventorDrone, Vec2::ZERO, 2, 2));
        fire(&mut app, FireEvent::new(Archetype::WizardStone, Vec2::new(1.0, 0.0), 4, 2));
        tick(&mut app, 150);

        let positions = projectiles(&mut app)
            .into_iter()
            .map(|(entity, projectile)| (projectile.serial, position(&app, entity)))
            .collect();
        let damage = ledger(&app).damage.iter().map(|d| (d.source, d.target)).collect();
        (positions, damage)
    }

    assert_eq!(run(), run());
}

#[test]
fn dagger_shots_take_targets_by_ascending_distance() {
    let mut app = app_headless();
    // Spawned far-first so pool order differs from distance order.
    let mut by_distance: Vec<Entity> = [(0.0, 4.0), (-3.0, 0.0), (0.0, 2.0), (1.0, 0.0)]
        .into_iter()
        .map(|(x, y)| spawn_target(&mut app, x, y))
        .collect();
    by_distance.reverse();

    fire(&mut app, FireEvent::new(Archetype::InventorDagger, Vec2::ZERO, 10, 3));
    tick(&mut app, 1);

    let assigned: Vec<Option<Entity>> = projectiles(&mut app)
        .into_iter()
        .map(|(entity, _)| {
            app.world()
                .get::<Flight>(entity)
                .and_then(Flight::target)
                .or_else(|| app.world().get::<Dormant>(entity).and_then(|d| d.order.target))
        })
        .collect();

    let expected: Vec<Option<Entity>> = by_distance.into_iter().map(Some).collect();
    assert_eq!(assigned, expected);
}
