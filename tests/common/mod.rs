//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the core ECS runtime and clocks.
//! - time advances by exactly one fixed step per `app.update()`.
//! - a recorder in `FixedPostUpdate` keeps every message the engine writes.
#![allow(dead_code)]

use std::time::Duration;

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_volley_dynamics::prelude::*;

/// Default fixed timestep (64 Hz).
pub const TICK: Duration = Duration::from_micros(15_625);

pub const TICK_SECS: f32 = 1.0 / 64.0;

/// Everything the engine reported, in write order.
#[derive(Resource, Default)]
pub struct Ledger {
    pub damage: Vec<DamageEvent>,
    pub terminated: Vec<ProjectileTerminated>,
    pub cues: Vec<VfxCue>,
}

impl Ledger {
    pub fn causes_for(&self, archetype: Archetype) -> Vec<Termination> {
        self.terminated
            .iter()
            .filter(|t| t.archetype == archetype)
            .map(|t| t.cause)
            .collect()
    }

    pub fn damage_to(&self, target: Entity) -> Vec<&DamageEvent> {
        self.damage.iter().filter(|d| d.target == target).collect()
    }
}

fn record(
    mut ledger: ResMut<Ledger>,
    mut damage: MessageReader<DamageEvent>,
    mut terminated: MessageReader<ProjectileTerminated>,
    mut cues: MessageReader<VfxCue>,
) {
    ledger.damage.extend(damage.read().copied());
    ledger.terminated.extend(terminated.read().copied());
    ledger.cues.extend(cues.read().copied());
}

pub fn app_headless() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(TICK))
        .add_plugins(VolleyCorePlugin)
        .init_resource::<Ledger>()
        .add_systems(FixedPostUpdate, record);

    // The first update only starts the clocks; no fixed tick runs.
    app.update();
    app
}

pub fn spawn_target(app: &mut App, x: f32, y: f32) -> Entity {
    app.world_mut()
        .spawn((Target::default(), Transform::from_xyz(x, y, 0.0)))
        .id()
}

pub fn fire(app: &mut App, fire: FireEvent) {
    app.world_mut().write_message(fire);
}

/// Runs `n` fixed ticks.
pub fn tick(app: &mut App, n: usize) {
    for _ in 0..n {
        app.update();
    }
}

pub fn fixed_elapsed(app: &App) -> f32 {
    app.world().resource::<Time<Fixed>>().elapsed_secs()
}

pub fn projectiles(app: &mut App) -> Vec<(Entity, Projectile)> {
    let mut query = app.world_mut().query::<(Entity, &Projectile)>();
    let mut found: Vec<(Entity, Projectile)> = query
        .iter(app.world())
        .map(|(entity, projectile)| (entity, projectile.clone()))
        .collect();
    found.sort_by_key(|(_, projectile)| projectile.serial);
    found
}

pub fn ledger(app: &App) -> &Ledger {
    app.world().resource::<Ledger>()
}

pub fn presets_mut(app: &mut App) -> Mut<'_, ArchetypePresets> {
    app.world_mut().resource_mut::<ArchetypePresets>()
}

pub fn position(app: &App, entity: Entity) -> Vec2 {
    app.world()
        .get::<Transform>(entity)
        .map(|t| t.translation.truncate())
        .unwrap_or(Vec2::NAN)
}
