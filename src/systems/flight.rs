//! Flight routines - per-tick motion, hit tests and damage for active shots.
//!
//! Each routine is a state machine stored in the [`Flight`] component. A step
//! only reads the live-target snapshot and reports strikes; damage messages,
//! despawning and loss handling happen in [`advance_flights`].

use std::collections::HashSet;

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use rand::Rng;

use crate::components::{BeeStage, Flight, LobStage, Projectile, ShotOrder, Spinner, Target};
use crate::events::{DamageEvent, ProjectileTerminated, VfxCue, VfxKind};
use crate::resources::{ArchetypePresets, ArsenalConfig, ArsenalRng};
use crate::systems::choreographer::retire;
use crate::systems::collision::{radius_hit, swept_hit};
use crate::systems::motion::{
    bezier_point, bezier_tangent, facing, lob_control, lob_scale, move_towards, rotate_towards,
    smoothstep, steer_limited, wiggle_velocity, zigzag_velocity,
};
use crate::systems::targeting::LiveTargets;
use crate::types::{BeeTuning, CruiseTuning, LiveTarget, LossPolicy, MotionTuning, Termination};

/// Kinematic state of one projectile while it is being stepped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub previous: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub age: f32,
    pub scale: f32,
    pub area_radius: f32,
}

impl Body {
    pub fn capture(projectile: &Projectile, transform: &Transform) -> Self {
        Self {
            position: transform.translation.truncate(),
            previous: projectile.previous_position,
            direction: projectile.direction,
            speed: projectile.speed,
            age: projectile.age,
            scale: transform.scale.x,
            area_radius: projectile.area_radius,
        }
    }

    /// Writes the body back. Rotation is left alone for spinning shots.
    pub fn apply(&self, projectile: &mut Projectile, transform: &mut Transform, spinning: bool) {
        transform.translation = self.position.extend(transform.translation.z);
        transform.scale = Vec3::new(self.scale, self.scale, transform.scale.z);
        if !spinning {
            transform.rotation = facing(self.direction);
        }
        projectile.previous_position = self.previous;
        projectile.direction = self.direction;
        projectile.speed = self.speed;
        projectile.age = self.age;
    }
}

/// What happened during one step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepOutcome {
    /// Targets to damage, each exactly once
    pub strikes: Vec<Entity>,
    pub cue: Option<VfxKind>,
    /// Set when the projectile should leave the simulation
    pub end: Option<Termination>,
}

impl StepOutcome {
    fn lost() -> Self {
        Self {
            end: Some(Termination::TargetLost),
            ..default()
        }
    }

    fn strike(&mut self, target: Entity, cue: VfxKind) {
        self.strikes.push(target);
        self.cue = Some(cue);
    }
}

/// Visual spin rate for routines that spin their sprite.
pub fn spin_rate(motion: &MotionTuning) -> Option<f32> {
    match motion {
        MotionTuning::SpinSeek(t) => Some(t.spin_rate),
        MotionTuning::Cog(t) => Some(t.spin_rate),
        MotionTuning::Orb(t) => Some(t.spin_rate),
        MotionTuning::Dagger(_)
        | MotionTuning::Zigzag(_)
        | MotionTuning::Arrow(_)
        | MotionTuning::Lob(_)
        | MotionTuning::Bee(_) => None,
    }
}

/// Starts the flight for a shot that just became active.
///
/// Homing shots re-check their assigned target and fall back to the nearest
/// live one. Fails with [`Termination::TargetLost`] when no target exists,
/// except for orbs, which set off straight and pick a target up later.
pub fn launch<R: Rng>(
    motion: &MotionTuning,
    order: &ShotOrder,
    body: &mut Body,
    targets: &LiveTargets,
    rng: &mut R,
) -> Result<Flight, Termination> {
    let acquire = |from: Vec2| -> Result<LiveTarget, Termination> {
        let found = match order.target {
            Some(entity) => targets.resolve(entity, from),
            None => targets.nearest(from),
        };
        found.ok_or(Termination::TargetLost)
    };

    let flight = match *motion {
        MotionTuning::Dagger(tuning) => Flight::Dagger {
            tuning,
            target: acquire(body.position)?.entity,
        },
        MotionTuning::SpinSeek(tuning) => Flight::SpinSeek {
            tuning,
            target: acquire(body.position)?.entity,
        },
        MotionTuning::Zigzag(tuning) => Flight::Zigzag {
            tuning,
            target: acquire(body.position)?.entity,
            phase: order.phase,
        },
        MotionTuning::Arrow(tuning) => {
            let target = acquire(body.position)?;
            let heading = (target.position - body.position).normalize_or(Vec2::Y);
            body.direction = heading;
            body.scale = tuning.scale;
            Flight::Arrow {
                tuning,
                target: target.entity,
                heading,
                speed: tuning.speed,
            }
        }
        MotionTuning::Lob(tuning) => {
            let base = targets
                .strike_point(body.position)
                .unwrap_or(body.position + Vec2::Y * tuning.default_rise);
            let jitter = Vec2::new(
                rng.random_range(-tuning.jitter_x..=tuning.jitter_x),
                rng.random_range(-tuning.jitter_y..=tuning.jitter_y),
            );
            let end = base + jitter;
            Flight::Lob {
                tuning,
                start: body.position,
                control: lob_control(body.position, end, tuning.arc_height),
                end,
                progress: 0.0,
                primary: order.primary,
                stage: LobStage::InFlight,
            }
        }
        MotionTuning::Cog(tuning) => Flight::Cog {
            tuning,
            hit_set: HashSet::new(),
        },
        MotionTuning::Bee(tuning) => {
            let target = acquire(body.position)?;
            Flight::Bee {
                tuning,
                target: target.entity,
                stings_left: order.stings.max(1),
                stage: BeeStage::Approach,
                waypoint: hover_point(target.position, body.area_radius, &tuning, rng),
                wiggle_clock: 0.0,
                scale_blend: 0.0,
            }
        }
        MotionTuning::Orb(tuning) => {
            let target = acquire(body.position).ok().map(|t| t.entity);
            let orb_speed = body.speed * tuning.speed_factor;
            let launch_speed = (tuning.launch_factor * orb_speed).max(tuning.min_launch_speed);
            body.speed = orb_speed;
            Flight::Orb {
                tuning,
                target,
                velocity: body.direction * launch_speed,
                max_speed: (tuning.cap_factor * orb_speed).max(tuning.min_cap_speed),
            }
        }
    };
    Ok(flight)
}

/// Flight used once a drifting shot has lost its target.
pub fn drift() -> Flight {
    Flight::Cruise {
        tuning: CruiseTuning::default(),
    }
}

fn hover_point<R: Rng>(center: Vec2, area: f32, tuning: &BeeTuning, rng: &mut R) -> Vec2 {
    let spread = area.abs();
    center
        + Vec2::new(
            rng.random_range(-spread..=spread),
            rng.random_range(tuning.hover_min..=tuning.hover_max),
        )
}

fn retreat_point<R: Rng>(position: Vec2, to_target: Vec2, tuning: &BeeTuning, rng: &mut R) -> Vec2 {
    position - to_target * rng.random_range(tuning.retreat_min..=tuning.retreat_max)
        + to_target.perp() * rng.random_range(-tuning.retreat_side..=tuning.retreat_side)
}

/// Advances one flight by `dt` seconds.
pub fn step<R: Rng>(
    flight: &mut Flight,
    body: &mut Body,
    targets: &LiveTargets,
    dt: f32,
    rng: &mut R,
) -> StepOutcome {
    body.previous = body.position;
    let mut outcome = StepOutcome::default();
    let mut next = None;

    match flight {
        Flight::Cruise { tuning } => {
            match targets.nearest(body.position) {
                Some(target) => {
                    let to_target = (target.position - body.position).normalize_or(body.direction);
                    body.direction = steer_limited(body.direction, to_target, tuning, dt);
                    body.position += body.direction * body.speed * dt;
                    if radius_hit(body.position, target.position, tuning.hit_radius) {
                        outcome.strike(target.entity, VfxKind::Hit);
                        outcome.end = Some(Termination::Hit);
                    }
                }
                None => body.position += body.direction * body.speed * dt,
            }
        }
        Flight::Dagger { tuning, target } => {
            let Some(live) = targets.resolve(*target, body.position) else {
                return StepOutcome::lost();
            };
            *target = live.entity;
            let to_target = (live.position - body.position).normalize_or(body.direction);
            body.direction = to_target;
            body.position += to_target * (tuning.start_speed + tuning.acceleration * body.age) * dt;
            if radius_hit(body.position, live.position, tuning.hit_radius) {
                outcome.strike(live.entity, VfxKind::Hit);
                outcome.end = Some(Termination::Hit);
            }
        }
        Flight::SpinSeek { tuning, target } => {
            let Some(live) = targets.resolve(*target, body.position) else {
                return StepOutcome::lost();
            };
            *target = live.entity;
            let to_target = (live.position - body.position).normalize_or(body.direction);
            body.direction = to_target;
            body.position += to_target * tuning.speed * dt;
            if radius_hit(body.position, live.position, tuning.hit_radius) {
                outcome.strike(live.entity, VfxKind::Hit);
                next = linger(tuning.linger, Termination::Hit, &mut outcome);
            }
        }
        Flight::Zigzag {
            tuning,
            target,
            phase,
        } => {
            let Some(live) = targets.resolve(*target, body.position) else {
                return StepOutcome::lost();
            };
            *target = live.entity;
            let to_target = (live.position - body.position).normalize_or(body.direction);
            body.position += zigzag_velocity(tuning, to_target, body.age, *phase) * dt;
            body.direction = to_target;
            if radius_hit(body.position, live.position, tuning.hit_radius) {
                outcome.strike(live.entity, VfxKind::Hit);
                outcome.end = Some(Termination::Hit);
            }
        }
        Flight::Arrow {
            tuning,
            target,
            heading,
            speed,
        } => {
            let Some(live) = targets.resolve(*target, body.position) else {
                return StepOutcome::lost();
            };
            *target = live.entity;
            let to_target = (live.position - body.position).normalize_or(*heading);
            *heading = rotate_towards(*heading, to_target, tuning.turn_rate.to_radians() * dt);
            *speed = (*speed + tuning.acceleration * dt).min(tuning.max_speed);

            let sway = (body.age * tuning.sway_frequency).sin() * tuning.sway_amplitude;
            let moved = (*heading * *speed + heading.perp() * sway) * dt;
            body.position += moved;
            if moved.length_squared() > 1e-8 {
                body.direction = moved.normalize();
            }

            // Any live target the arrow crosses counts, not just its own.
            if let Some(hit) = targets
                .iter()
                .find(|t| swept_hit(body.previous, body.position, t.position, tuning.hit_radius))
            {
                outcome.strike(hit.entity, VfxKind::Hit);
                next = linger(tuning.linger, Termination::Hit, &mut outcome);
            }
        }
        Flight::Lob {
            tuning,
            start,
            control,
            end,
            progress,
            primary,
            stage,
        } => match *stage {
            LobStage::InFlight => {
                *progress += dt / tuning.flight_time;
                let eased = smoothstep(*progress);
                body.position = bezier_point(*start, *control, *end, eased);
                body.scale = lob_scale(eased, tuning.peak_scale);
                let tangent = bezier_tangent(*start, *control, *end, eased);
                if tangent.length_squared() > 1e-4 {
                    body.direction = tangent.normalize();
                }
                if *progress >= 1.0 {
                    body.speed = 0.0;
                    if *primary {
                        *stage = LobStage::Fuse {
                            remaining: tuning.fuse,
                        };
                    } else {
                        outcome.end = Some(Termination::Landed);
                    }
                }
            }
            LobStage::Fuse { ref mut remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    outcome.strikes = targets
                        .within_radius(body.position, body.area_radius)
                        .into_iter()
                        .map(|t| t.entity)
                        .collect();
                    outcome.cue = Some(VfxKind::Detonation);
                    next = linger(tuning.linger, Termination::Hit, &mut outcome);
                }
            }
        },
        Flight::Cog { tuning, hit_set } => {
            body.position += body.direction * tuning.speed * dt;
            for target in targets.iter() {
                if !hit_set.contains(&target.entity)
                    && swept_hit(body.previous, body.position, target.position, tuning.hit_radius)
                {
                    hit_set.insert(target.entity);
                    outcome.strike(target.entity, VfxKind::Hit);
                }
            }
        }
        Flight::Bee {
            tuning,
            target,
            stings_left,
            stage,
            waypoint,
            wiggle_clock,
            scale_blend,
        } => {
            let cruise_speed = body.speed;
            match *stage {
                BeeStage::Dive => {
                    let Some(live) = targets.resolve(*target, body.position) else {
                        return StepOutcome::lost();
                    };
                    *target = live.entity;
                    let to_target = (live.position - body.position).normalize_or_zero();

                    if radius_hit(body.position, live.position, tuning.hit_radius) {
                        outcome.strike(live.entity, VfxKind::Hit);
                        *stings_left = stings_left.saturating_sub(1);
                        *waypoint = retreat_point(body.position, to_target, tuning, rng);
                        *stage = BeeStage::Retreat;
                        *scale_blend = 0.0;
                    } else {
                        let dive_speed = cruise_speed * tuning.dive_speed_factor;
                        body.position += wiggle_velocity(
                            to_target,
                            *wiggle_clock,
                            tuning.wiggle_frequency,
                            tuning.dive_amplitude,
                            dive_speed,
                        ) * dt;
                        *wiggle_clock += dt;
                        *scale_blend = move_towards(*scale_blend, 1.0, 4.0 * dt);
                        body.scale = blend(tuning.cruise_scale, tuning.dive_scale, *scale_blend);
                        body.direction = to_target.normalize_or(body.direction);
                    }
                }
                BeeStage::Approach | BeeStage::Retreat | BeeStage::Hover => {
                    let to_waypoint = (*waypoint - body.position).normalize_or_zero();
                    body.position += wiggle_velocity(
                        to_waypoint,
                        *wiggle_clock,
                        tuning.wiggle_frequency,
                        tuning.cruise_amplitude,
                        cruise_speed,
                    ) * dt;
                    *wiggle_clock += dt;
                    body.direction = to_waypoint.normalize_or(body.direction);

                    let (from, rate) = match *stage {
                        BeeStage::Approach => (1.0, 1.2),
                        BeeStage::Retreat => (tuning.dive_scale, 2.0),
                        _ => (tuning.dive_scale, 1.5),
                    };
                    *scale_blend = move_towards(*scale_blend, 1.0, rate * dt);
                    body.scale = blend(from, tuning.cruise_scale, *scale_blend);

                    if body.position.distance(*waypoint) <= tuning.waypoint_threshold {
                        *scale_blend = 0.0;
                        match *stage {
                            BeeStage::Retreat => {
                                let center = targets.position_of(*target).unwrap_or(body.position);
                                *waypoint = hover_point(center, body.area_radius, tuning, rng);
                                *stage = BeeStage::Hover;
                            }
                            _ if *stings_left == 0 => {
                                outcome.cue = Some(VfxKind::Burst);
                                next = linger(tuning.burst, Termination::Completed, &mut outcome);
                            }
                            _ => *stage = BeeStage::Dive,
                        }
                    }
                }
            }
        }
        Flight::Orb {
            tuning,
            target,
            velocity,
            max_speed,
        } => {
            let live = match *target {
                Some(entity) => targets.resolve(entity, body.position),
                None => targets.nearest(body.position),
            };
            *target = live.map(|t| t.entity);

            // Without a target the orb keeps its heading but still speeds up.
            let current = velocity.normalize_or(body.direction);
            let desired = live
                .map(|t| (t.position - body.position).normalize_or(current))
                .unwrap_or(current);
            let heading = rotate_towards(current, desired, tuning.steer_rate.to_radians() * dt);
            let speed = (velocity.length() + tuning.acceleration * dt).min(*max_speed);
            *velocity = heading * speed;
            body.position += *velocity * dt;
            body.direction = heading;
            body.speed = speed;

            if let Some(live) = live {
                if radius_hit(body.position, live.position, tuning.hit_radius) {
                    outcome.strike(live.entity, VfxKind::Hit);
                    next = linger(tuning.linger, Termination::Hit, &mut outcome);
                }
            }
        }
        Flight::Linger { remaining, cause } => {
            *remaining -= dt;
            if *remaining <= 0.0 {
                outcome.end = Some(*cause);
            }
        }
    }

    if let Some(next) = next {
        *flight = next;
    }
    outcome
}

/// Switches to a linger of `seconds`, or ends right away when there is none.
fn linger(seconds: f32, cause: Termination, outcome: &mut StepOutcome) -> Option<Flight> {
    if seconds > 0.0 {
        Some(Flight::Linger {
            remaining: seconds,
            cause,
        })
    } else {
        outcome.end = Some(cause);
        None
    }
}

fn blend(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Advances every active shot by one fixed tick, in spawn order.
///
/// # Arguments
/// * `commands` - Used to despawn finished shots
/// * `time` - Fixed clock
/// * `config` - Range limit for target queries
/// * `presets` - Life ceilings and loss policies
/// * `rng` - Hover and retreat jitter
/// * `targets` - Live enemies
/// * `projectiles` - Shots with an active flight
pub fn advance_flights(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    config: Res<ArsenalConfig>,
    presets: Res<ArchetypePresets>,
    mut rng: ResMut<ArsenalRng>,
    targets: Query<(Entity, &Transform, &Target)>,
    mut projectiles: Query<
        (Entity, &mut Transform, &mut Projectile, &mut Flight, Has<Spinner>),
        Without<Target>,
    >,
    mut damage: MessageWriter<DamageEvent>,
    mut cues: MessageWriter<VfxCue>,
    mut terminated: MessageWriter<ProjectileTerminated>,
) {
    let dt = time.delta_secs();
    let live = LiveTargets::gather(targets.iter(), config.max_target_range_sq);

    let mut order: Vec<(u64, Entity)> = projectiles
        .iter()
        .map(|(entity, _, projectile, ..)| (projectile.serial, entity))
        .collect();
    order.sort_unstable();

    for (_, entity) in order {
        let Ok((entity, mut transform, mut projectile, mut flight, spinning)) =
            projectiles.get_mut(entity)
        else {
            continue;
        };
        let archetype = projectile.archetype();
        let profile = presets.get(archetype);

        if !flight.is_lingering() && profile.life.is_some_and(|life| projectile.age >= life) {
            retire(&mut commands, &mut terminated, entity, archetype, Termination::Expired);
            continue;
        }

        let mut body = Body::capture(&projectile, &transform);
        let outcome = step(&mut flight, &mut body, &live, dt, &mut rng.0);
        body.age += dt;
        body.apply(&mut projectile, &mut transform, spinning);

        for target in &outcome.strikes {
            trace!("{} {:?} ({}) struck {:?}", archetype, entity, flight.name(), target);
            damage.write(DamageEvent {
                target: *target,
                amount: projectile.damage(),
                source: entity,
                archetype,
            });
        }
        if let Some(kind) = outcome.cue {
            cues.write(VfxCue {
                kind,
                position: body.position,
                source: entity,
            });
        }

        match outcome.end {
            Some(Termination::TargetLost) if profile.on_target_loss == LossPolicy::Drift => {
                debug!("{} {:?} lost its {} target, drifting", archetype, entity, flight.name());
                *flight = drift();
            }
            Some(cause) => retire(&mut commands, &mut terminated, entity, archetype, cause),
            None => {}
        }
    }
}
