//! Attack choreography - fire intake, volley fan-out, delayed release and the
//! wind-push lift.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use rand::Rng;

use crate::components::{Dormant, Flight, Projectile, ShotOrder, Spinner, Staged, Target, WindLift};
use crate::events::{FireEvent, ProjectileTerminated, VfxCue, VfxKind};
use crate::resources::{ArchetypePresets, ArsenalConfig, ArsenalRng, SpawnSerials};
use crate::systems::flight::{self, Body};
use crate::systems::motion::{facing, lift_height};
use crate::systems::pattern::plan_volley;
use crate::systems::targeting::LiveTargets;
use crate::types::{Archetype, LossPolicy, MotionTuning, Routine, Termination};

/// Despawns a projectile and reports why.
pub fn retire(
    commands: &mut Commands,
    terminated: &mut MessageWriter<ProjectileTerminated>,
    projectile: Entity,
    archetype: Archetype,
    cause: Termination,
) {
    debug!("{} {:?} terminated: {:?}", archetype, projectile, cause);
    commands.entity(projectile).despawn();
    terminated.write(ProjectileTerminated {
        projectile,
        archetype,
        cause,
    });
}

/// Result of trying to start a shot's flight.
enum Launch {
    Fly(Flight, Option<Spinner>),
    Retire(Termination),
}

fn start_flight<R: Rng>(
    motion: &MotionTuning,
    on_target_loss: LossPolicy,
    order: &ShotOrder,
    body: &mut Body,
    live: &LiveTargets,
    rng: &mut R,
) -> Launch {
    match flight::launch(motion, order, body, live, rng) {
        Ok(flight) => {
            let spinner = flight::spin_rate(motion).map(|rate| Spinner { rate, angle: 0.0 });
            Launch::Fly(flight, spinner)
        }
        Err(Termination::TargetLost) if on_target_loss == LossPolicy::Drift => {
            Launch::Fly(flight::drift(), None)
        }
        Err(cause) => Launch::Retire(cause),
    }
}

fn shot_name(archetype: Archetype, serial: u64) -> Name {
    Name::new(format!("{}#{}", archetype.label(), serial))
}

/// Turns each [`FireEvent`] into a staged root projectile aimed at the
/// nearest live target.
///
/// # Arguments
/// * `commands` - Spawns the roots
/// * `fires` - Incoming fire requests
/// * `config` - Default speed, fallback heading and range limit
/// * `presets` - Default area radius per archetype
/// * `serials` - Spawn counter
/// * `targets` - Live enemies
pub fn spawn_fired_projectiles(
    mut commands: Commands,
    mut fires: MessageReader<FireEvent>,
    config: Res<ArsenalConfig>,
    presets: Res<ArchetypePresets>,
    mut serials: ResMut<SpawnSerials>,
    targets: Query<(Entity, &Transform, &Target)>,
) {
    if fires.is_empty() {
        return;
    }
    let live = LiveTargets::gather(targets.iter(), config.max_target_range_sq);

    for fire in fires.read() {
        let fallback = config.fallback_direction.normalize_or(Vec2::Y);
        let direction = live
            .nearest(fire.origin)
            .map(|target| (target.position - fire.origin).normalize_or(fallback))
            .unwrap_or(fallback);
        let profile = presets.get(fire.archetype);
        let serial = serials.issue();

        let projectile = Projectile::new(fire.archetype, fire.damage, fire.power_level, serial)
            .with_direction(direction)
            .with_speed(fire.speed.unwrap_or(config.default_speed))
            .with_area_radius(fire.area_radius.unwrap_or(profile.area_radius))
            .with_previous_position(fire.origin);

        let root = commands
            .spawn((
                shot_name(fire.archetype, serial),
                projectile,
                Staged,
                Transform::from_translation(fire.origin.extend(0.0))
                    .with_rotation(facing(direction)),
            ))
            .id();
        debug!(
            "fired {} at {:?} (power {}) as {:?}",
            fire.archetype, fire.origin, fire.power_level, root
        );
    }
}

/// Releases delayed volley shots once the fixed clock reaches their time.
pub fn wake_dormant_shots(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    config: Res<ArsenalConfig>,
    presets: Res<ArchetypePresets>,
    mut rng: ResMut<ArsenalRng>,
    targets: Query<(Entity, &Transform, &Target)>,
    mut dormant: Query<(Entity, &mut Transform, &mut Projectile, &Dormant), Without<Target>>,
    mut cues: MessageWriter<VfxCue>,
    mut terminated: MessageWriter<ProjectileTerminated>,
) {
    let now = time.elapsed_secs();
    let mut due: Vec<(u64, Entity)> = dormant
        .iter()
        .filter(|(_, _, _, sleeper)| sleeper.is_due(now))
        .map(|(entity, _, projectile, _)| (projectile.serial, entity))
        .collect();
    if due.is_empty() {
        return;
    }
    due.sort_unstable();
    let live = LiveTargets::gather(targets.iter(), config.max_target_range_sq);

    for (_, entity) in due {
        let Ok((entity, mut transform, mut projectile, sleeper)) = dormant.get_mut(entity) else {
            continue;
        };
        let archetype = projectile.archetype();
        let profile = presets.get(archetype);
        // Presets may have changed since the volley was planned.
        let motion = match (profile.validate(archetype), profile.motion()) {
            (Ok(()), Some(motion)) => motion,
            (result, _) => {
                match result {
                    Err(error) => error!("{} {:?} not released: {}", archetype, entity, error),
                    Ok(()) => error!("{} {:?} not released: not a volley", archetype, entity),
                }
                let cause = Termination::Misconfigured;
                retire(&mut commands, &mut terminated, entity, archetype, cause);
                continue;
            }
        };
        let on_loss = profile.on_target_loss;
        let order = sleeper.order;
        let mut body = Body::capture(&projectile, &transform);

        match start_flight(motion, on_loss, &order, &mut body, &live, &mut rng.0) {
            Launch::Fly(flight, spinner) => {
                body.apply(&mut projectile, &mut transform, spinner.is_some());
                let mut shot = commands.entity(entity);
                shot.remove::<Dormant>().insert(flight);
                if let Some(spinner) = spinner {
                    shot.insert(spinner);
                }
                cues.write(VfxCue {
                    kind: VfxKind::Launch,
                    position: body.position,
                    source: entity,
                });
            }
            Launch::Retire(cause) => {
                retire(&mut commands, &mut terminated, entity, archetype, cause);
            }
        }
    }
}

/// Picks the routine for every staged root and spawns its volley.
///
/// The root always leaves the staged state this tick. It retires with
/// `NoTargets` when nothing is alive and with `Misconfigured` when its profile
/// fails validation. Otherwise it spawns children and retires with
/// `FannedOut`, or becomes the only shot when the volley resolves to one.
pub fn fan_out_volleys(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    config: Res<ArsenalConfig>,
    presets: Res<ArchetypePresets>,
    mut rng: ResMut<ArsenalRng>,
    mut serials: ResMut<SpawnSerials>,
    targets: Query<(Entity, &Transform, &Target)>,
    mut roots: Query<(Entity, &mut Transform, &mut Projectile), (With<Staged>, Without<Target>)>,
    mut cues: MessageWriter<VfxCue>,
    mut terminated: MessageWriter<ProjectileTerminated>,
) {
    let mut staged: Vec<(u64, Entity)> = roots
        .iter()
        .map(|(entity, _, projectile)| (projectile.serial, entity))
        .collect();
    if staged.is_empty() {
        return;
    }
    staged.sort_unstable();

    let now = time.elapsed_secs();
    let live = LiveTargets::gather(targets.iter(), config.max_target_range_sq);

    for (_, root) in staged {
        let Ok((root, mut transform, mut projectile)) = roots.get_mut(root) else {
            continue;
        };
        let archetype = projectile.archetype();
        let profile = presets.get(archetype);

        if live.is_empty() {
            retire(&mut commands, &mut terminated, root, archetype, Termination::NoTargets);
            continue;
        }
        if let Err(error) = profile.validate(archetype) {
            error!("{} {:?} not fired: {}", archetype, root, error);
            let cause = Termination::Misconfigured;
            retire(&mut commands, &mut terminated, root, archetype, cause);
            continue;
        }
        commands.entity(root).remove::<Staged>();

        let origin = transform.translation.truncate();
        let power = projectile.power_level();

        let (layout, motion) = match &profile.routine {
            Routine::Lift(lift) => {
                debug!("{} {:?} lifting {} targets", archetype, root, live.len());
                commands.entity(root).insert(WindLift {
                    lifted: live.iter().map(|t| (t.entity, t.position.y)).collect(),
                    offset: lift.offset,
                    duration: lift.duration,
                    progress: 0.0,
                });
                cues.write(VfxCue {
                    kind: VfxKind::Launch,
                    position: origin,
                    source: root,
                });
                continue;
            }
            Routine::Volley { layout, motion } => (layout, motion),
        };

        let stings = match motion {
            MotionTuning::Bee(tuning) => tuning.stings.shot_count(power),
            _ => 0,
        };
        let count = profile.shots.shot_count(power) as usize;
        let on_loss = profile.on_target_loss;

        if count <= 1 {
            // One shot: the root flies it itself.
            let order = ShotOrder {
                target: live.nearest(origin).map(|t| t.entity),
                phase: 0.0,
                primary: true,
                stings,
            };
            let mut body = Body::capture(&projectile, &transform);
            match start_flight(motion, on_loss, &order, &mut body, &live, &mut rng.0) {
                Launch::Fly(flight, spinner) => {
                    body.apply(&mut projectile, &mut transform, spinner.is_some());
                    let mut shot = commands.entity(root);
                    shot.insert(flight);
                    if let Some(spinner) = spinner {
                        shot.insert(spinner);
                    }
                    cues.write(VfxCue {
                        kind: VfxKind::Launch,
                        position: origin,
                        source: root,
                    });
                }
                Launch::Retire(cause) => {
                    retire(&mut commands, &mut terminated, root, archetype, cause);
                }
            }
            continue;
        }

        let picks = live.nearest_n(origin, count);
        let plan = plan_volley(layout, origin, projectile.direction, &picks, count);
        debug!(
            "{} {:?} fanning out {} shots (power {})",
            archetype,
            root,
            plan.shots.len(),
            power
        );

        for shot in &plan.shots {
            let serial = serials.issue();
            let mut child = projectile.child(serial, shot.heading, shot.position);
            let mut child_transform =
                Transform::from_translation(shot.position.extend(transform.translation.z))
                    .with_rotation(facing(child.direction));
            let order = ShotOrder {
                target: shot.target,
                phase: shot.phase,
                primary: shot.primary,
                stings,
            };

            if shot.delay > 0.0 {
                commands.spawn((
                    shot_name(archetype, serial),
                    child,
                    child_transform,
                    Dormant {
                        resume_at: now + shot.delay,
                        order,
                    },
                ));
                continue;
            }

            let mut body = Body::capture(&child, &child_transform);
            match start_flight(motion, on_loss, &order, &mut body, &live, &mut rng.0) {
                Launch::Fly(flight, spinner) => {
                    body.apply(&mut child, &mut child_transform, spinner.is_some());
                    let mut spawned = commands.spawn((
                        shot_name(archetype, serial),
                        child,
                        child_transform,
                        flight,
                    ));
                    if let Some(spinner) = spinner {
                        spawned.insert(spinner);
                    }
                    cues.write(VfxCue {
                        kind: VfxKind::Launch,
                        position: shot.position,
                        source: spawned.id(),
                    });
                }
                Launch::Retire(cause) => {
                    trace!("{} shot #{} never launched: {:?}", archetype, serial, cause);
                }
            }
        }

        retire(&mut commands, &mut terminated, root, archetype, Termination::FannedOut);
    }
}

/// Raises every target caught by a wind push and retires the push once the
/// lift completes.
pub fn lift_targets(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut lifts: Query<(Entity, &Projectile, &mut WindLift)>,
    mut targets: Query<(&mut Transform, &Target)>,
    mut terminated: MessageWriter<ProjectileTerminated>,
) {
    let dt = time.delta_secs();

    for (entity, projectile, mut lift) in lifts.iter_mut() {
        lift.progress = (lift.progress + dt / lift.duration).min(1.0);

        for (target, start_y) in &lift.lifted {
            if let Ok((mut transform, state)) = targets.get_mut(*target) {
                if state.alive {
                    transform.translation.y = lift_height(*start_y, lift.offset, lift.progress);
                }
            }
        }

        if lift.progress >= 1.0 {
            retire(
                &mut commands,
                &mut terminated,
                entity,
                projectile.archetype(),
                Termination::Completed,
            );
        }
    }
}

/// Advances the visual spin of spinning shots.
pub fn spin_visuals(time: Res<Time<Fixed>>, mut spinners: Query<(&mut Transform, &mut Spinner)>) {
    let dt = time.delta_secs();
    for (mut transform, mut spinner) in spinners.iter_mut() {
        spinner.angle = (spinner.angle + spinner.rate * dt) % 360.0;
        transform.rotation = Quat::from_rotation_z(spinner.angle.to_radians());
    }
}

/// Logs every invalid archetype profile once at startup.
pub fn report_invalid_presets(presets: Res<ArchetypePresets>) {
    match presets.validate() {
        Ok(()) => debug!("all {} archetype profiles valid", Archetype::ALL.len()),
        Err(errors) => {
            for error in errors {
                error!("invalid archetype tuning: {}", error);
            }
        }
    }
}
