//! End-to-end behavior of the individual attack routines.

mod common;

use std::collections::HashSet;

use bevy::prelude::*;
use bevy_volley_dynamics::prelude::*;
use common::*;

#[test]
fn cogs_pierce_each_target_once() {
    let mut app = app_headless();
    let targets: Vec<Entity> = [(0.0, 3.0), (0.0, 4.0), (0.0, 5.0)]
        .into_iter()
        .map(|(x, y)| spawn_target(&mut app, x, y))
        .collect();

    // Straight column of cogs so every one crosses every target.
    presets_mut(&mut app).get_mut(Archetype::InventorPiercingCogs).routine = Routine::Volley {
        layout: VolleyLayout::Fan {
            spread_deg: 0.0,
            forward_spacing: 0.35,
            side_spacing: 0.0,
            stagger: 0.4,
        },
        motion: MotionTuning::Cog(CogTuning::default()),
    };

    fire(&mut app, FireEvent::new(Archetype::InventorPiercingCogs, Vec2::ZERO, 2, 1));
    tick(&mut app, 200);

    let ledger = ledger(&app);
    assert_eq!(ledger.damage.len(), 6 * 3);

    let pairs: HashSet<(Entity, Entity)> =
        ledger.damage.iter().map(|d| (d.source, d.target)).collect();
    assert_eq!(pairs.len(), ledger.damage.len(), "no cog strikes a target twice");
    for target in targets {
        assert_eq!(ledger.damage_to(target).len(), 6);
    }
}

#[test]
fn fire_bomb_detonates_once_over_the_pair() {
    let mut app = app_headless();
    let near = spawn_target(&mut app, 0.0, 4.0);
    let beside = spawn_target(&mut app, 0.5, 4.0);
    let far = spawn_target(&mut app, 6.0, 10.0);

    fire(&mut app, FireEvent::new(Archetype::InventorFireBomb, Vec2::ZERO, 12, 1));
    tick(&mut app, 400);

    let ledger = ledger(&app);
    assert_eq!(ledger.damage_to(near).len(), 1);
    assert_eq!(ledger.damage_to(beside).len(), 1);
    assert!(ledger.damage_to(far).is_empty());
    assert_eq!(ledger.damage[0].source, ledger.damage[1].source);
    assert!(ledger.cues.iter().any(|cue| cue.kind == VfxKind::Detonation));

    let mut causes = ledger.causes_for(Archetype::InventorFireBomb);
    causes.sort_by_key(|cause| format!("{cause:?}"));
    assert_eq!(
        causes,
        vec![Termination::FannedOut, Termination::Hit, Termination::Landed]
    );
}

#[test]
fn wind_push_lifts_live_targets_by_offset() {
    let mut app = app_headless();
    let a = spawn_target(&mut app, 1.0, 1.0);
    let b = spawn_target(&mut app, 2.0, 3.0);
    let dead = app
        .world_mut()
        .spawn((Target { alive: false }, Transform::from_xyz(0.0, 0.0, 0.0)))
        .id();

    fire(&mut app, FireEvent::new(Archetype::WizardWindPush, Vec2::ZERO, 0, 1));

    tick(&mut app, 128);
    let halfway = position(&app, a);
    assert!((halfway.y - 2.0).abs() < 1e-4, "smoothstep is half done at half time");

    tick(&mut app, 142);
    assert_eq!(position(&app, a), Vec2::new(1.0, 3.0));
    assert_eq!(position(&app, b), Vec2::new(2.0, 5.0));
    assert_eq!(position(&app, dead), Vec2::ZERO);

    let ledger = ledger(&app);
    assert!(ledger.damage.is_empty());
    assert_eq!(
        ledger.causes_for(Archetype::WizardWindPush),
        vec![Termination::Completed]
    );
}

#[test]
fn drone_swarm_launches_one_bee_and_parks_the_rest() {
    let mut app = app_headless();
    spawn_target(&mut app, 0.0, 5.0);
    spawn_target(&mut app, 2.0, 6.0);

    fire(&mut app, FireEvent::new(Archetype::InventorDrone, Vec2::ZERO, 1, 1));
    tick(&mut app, 1);

    let shots = projectiles(&mut app);
    assert_eq!(shots.len(), 3);

    let world = app.world();
    let (first, _) = &shots[0];
    match world.get::<Flight>(*first) {
        Some(Flight::Bee { stings_left, .. }) => assert_eq!(*stings_left, 2),
        other => panic!("expected a bee flight, got {other:?}"),
    }
    for (entity, _) in &shots[1..] {
        let sleeper = world.get::<Dormant>(*entity).copied();
        assert_eq!(sleeper.map(|s| s.order.stings), Some(2));
    }
}

#[test]
fn single_bee_stings_then_bursts() {
    let mut app = app_headless();
    let target = spawn_target(&mut app, 0.0, 2.0);
    presets_mut(&mut app).get_mut(Archetype::InventorDrone).shots = ShotFormula::new(1, 0, 1, 1);

    fire(&mut app, FireEvent::new(Archetype::InventorDrone, Vec2::ZERO, 5, 1));
    tick(&mut app, 760);

    let ledger = ledger(&app);
    let stings = ledger.damage_to(target);
    assert_eq!(stings.len(), 2, "power 1 gives two stings");
    assert!(stings.iter().all(|d| d.amount == 5));

    let bee = stings[0].source;
    assert!(ledger
        .cues
        .iter()
        .any(|cue| cue.kind == VfxKind::Burst && cue.source == bee));
    assert_eq!(
        ledger.causes_for(Archetype::InventorDrone),
        vec![Termination::Completed]
    );
    assert!(projectiles(&mut app).is_empty());
}

#[test]
fn magic_ball_seeks_a_target_that_arrives_later() {
    let mut app = app_headless();
    let first = spawn_target(&mut app, 0.0, 8.0);

    fire(&mut app, FireEvent::new(Archetype::WizardMagicBall, Vec2::ZERO, 3, 1));
    tick(&mut app, 1);
    assert_eq!(projectiles(&mut app).len(), 2);

    app.world_mut().despawn(first);
    tick(&mut app, 20);

    let shots = projectiles(&mut app);
    assert_eq!(shots.len(), 2, "orbs keep flying without targets");
    for (entity, _) in &shots {
        match app.world().get::<Flight>(*entity) {
            Some(Flight::Orb { target, .. }) => assert_eq!(*target, None),
            other => panic!("expected an orb, got {other:?}"),
        }
    }

    let second = spawn_target(&mut app, 0.0, 3.0);
    tick(&mut app, 180);

    let ledger = ledger(&app);
    assert_eq!(ledger.damage_to(second).len(), 2);
    let causes = ledger.causes_for(Archetype::WizardMagicBall);
    assert_eq!(causes.iter().filter(|c| **c == Termination::Hit).count(), 2);
    assert!(!causes.contains(&Termination::TargetLost));
}

#[test]
fn drifting_dagger_cruises_until_it_expires() {
    let mut app = app_headless();
    let target = spawn_target(&mut app, 0.0, 8.0);
    {
        let mut presets = presets_mut(&mut app);
        let dagger = presets.get_mut(Archetype::InventorDagger);
        dagger.shots = ShotFormula::new(1, 0, 1, 1);
        dagger.on_target_loss = LossPolicy::Drift;
    }

    fire(&mut app, FireEvent::new(Archetype::InventorDagger, Vec2::ZERO, 3, 1));
    tick(&mut app, 1);
    app.world_mut().despawn(target);
    tick(&mut app, 2);

    let shots = projectiles(&mut app);
    assert_eq!(shots.len(), 1);
    assert!(matches!(
        app.world().get::<Flight>(shots[0].0),
        Some(Flight::Cruise { .. })
    ));

    tick(&mut app, 240);
    assert_eq!(
        ledger(&app).causes_for(Archetype::InventorDagger),
        vec![Termination::Expired]
    );
    assert!(projectiles(&mut app).is_empty());
}

#[test]
fn arrows_strike_from_the_rain() {
    let mut app = app_headless();
    let target = spawn_target(&mut app, 0.0, 4.0);

    fire(&mut app, FireEvent::new(Archetype::SamuraiArrowRain, Vec2::ZERO, 4, 1));
    tick(&mut app, 150);

    let ledger = ledger(&app);
    assert_eq!(ledger.damage_to(target).len(), 3);
    assert!(ledger
        .damage
        .iter()
        .all(|d| d.archetype == Archetype::SamuraiArrowRain && d.amount == 4));
}
