use bevy::app::ScheduleRunnerPlugin;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy_volley_dynamics::prelude::*;
use std::time::Duration;

fn main() {
    println!("Starting Headless Volley Simulation...");
    println!("Every card fires once, one per half second, then the run stops at 12 s...");

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f64(1.0 / 64.0),
        )))
        .add_plugins(VolleyCorePlugin)
        // Skip the debug plugin (headless)
        .add_systems(Startup, setup_wave)
        .add_systems(FixedUpdate, play_cards)
        .add_systems(FixedPostUpdate, (apply_damage, report_terminations))
        .add_systems(Update, print_progress)
        .run();
}

/// Host-side hit points. The volley engine never touches this.
#[derive(Component)]
struct Health(i32);

fn setup_wave(mut commands: Commands) {
    println!("\n[SETUP] Spawning a wave of 12 enemies...");

    for row in 0..3 {
        for column in 0..4 {
            let position = Vec3::new(column as f32 * 1.2 - 1.8, 4.0 + row as f32 * 1.5, 0.0);
            commands.spawn((
                Target::default(),
                Health(60),
                Transform::from_translation(position),
                Name::new(format!("Enemy r{row}c{column}")),
            ));
        }
    }
}

fn play_cards(
    time: Res<Time<Fixed>>,
    mut fires: MessageWriter<FireEvent>,
    mut played: Local<usize>,
) {
    let Some(archetype) = Archetype::ALL.get(*played) else {
        return;
    };
    if time.elapsed_secs() < *played as f32 * 0.5 {
        return;
    }

    println!("[CARD] {} at {:.2}s", archetype, time.elapsed_secs());
    fires.write(FireEvent::new(*archetype, Vec2::ZERO, 8, 2));
    *played += 1;
}

fn apply_damage(
    mut commands: Commands,
    mut damage: MessageReader<DamageEvent>,
    mut enemies: Query<(&mut Health, &mut Target, &Name)>,
) {
    for hit in damage.read() {
        let Ok((mut health, mut target, name)) = enemies.get_mut(hit.target) else {
            continue;
        };
        if !target.alive {
            continue;
        }
        health.0 -= hit.amount as i32;
        if health.0 <= 0 {
            println!("[KILL] {} by {}", name, hit.archetype);
            target.alive = false;
            commands.entity(hit.target).despawn();
        }
    }
}

fn report_terminations(mut terminated: MessageReader<ProjectileTerminated>) {
    for ended in terminated.read() {
        if ended.cause != Termination::FannedOut {
            println!("[END] {} {:?}: {:?}", ended.archetype, ended.projectile, ended.cause);
        }
    }
}

fn print_progress(
    time: Res<Time>,
    mut timer: Local<f32>,
    projectiles: Query<(), With<Projectile>>,
    targets: Query<(), With<Target>>,
    mut exit: MessageWriter<AppExit>,
) {
    *timer += time.delta_secs();
    if *timer > 1.0 {
        *timer = 0.0;
        println!(
            "[INFO] {:.1}s: {} projectiles in flight, {} enemies standing",
            time.elapsed_secs(),
            projectiles.iter().count(),
            targets.iter().count()
        );
    }

    if time.elapsed_secs() > 12.0 {
        println!("[FINISHED] Simulation complete.");
        exit.write(AppExit::Success);
    }
}
