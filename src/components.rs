//! Core components for the volley system.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::types::{
    Archetype, ArrowTuning, BeeTuning, CogTuning, CruiseTuning, DaggerTuning, LobTuning,
    OrbTuning, SpinSeekTuning, Termination, ZigzagTuning,
};

/// Main projectile component.
///
/// Archetype, damage and power level are fixed when the projectile is
/// created and only readable afterwards. Position and orientation live in the
/// entity's `Transform`.
///
/// # Fields
/// * `direction` - Unit heading, used for facing and as the fan-out forward fallback
/// * `speed` - Base speed handed down to children
/// * `area_radius` - Radius used by area damage and bee hover spread
/// * `age` - Seconds since the flight started
/// * `previous_position` - Position at the start of the last step, for swept tests
/// * `serial` - Spawn order, projectiles advance in ascending serial
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_volley_dynamics::components::Projectile;
/// use bevy_volley_dynamics::types::Archetype;
///
/// let projectile = Projectile::new(Archetype::WizardStone, 12, 2, 0)
///     .with_direction(Vec2::X)
///     .with_area_radius(1.5);
/// assert_eq!(projectile.damage(), 12);
/// ```
#[derive(Component, Reflect, Clone, Debug)]
#[reflect(Component)]
pub struct Projectile {
    archetype: Archetype,
    damage: u32,
    power_level: u32,
    /// Unit heading
    pub direction: Vec2,
    /// Base speed (units per second)
    pub speed: f32,
    /// Area damage radius
    pub area_radius: f32,
    /// Life clock (seconds)
    pub age: f32,
    /// Position before the last step
    pub previous_position: Vec2,
    /// Global spawn counter
    pub serial: u64,
}

impl Projectile {
    /// Creates a projectile heading up the screen at the default speed.
    ///
    /// Power levels below 1 are raised to 1.
    pub fn new(archetype: Archetype, damage: u32, power_level: u32, serial: u64) -> Self {
        Self {
            archetype,
            damage,
            power_level: power_level.max(1),
            direction: Vec2::Y,
            speed: 3.0,
            area_radius: 0.0,
            age: 0.0,
            previous_position: Vec2::ZERO,
            serial,
        }
    }

    /// Builder pattern: set heading. Zero vectors keep the current heading.
    pub fn with_direction(mut self, direction: Vec2) -> Self {
        self.direction = direction.normalize_or(self.direction);
        self
    }

    /// Builder pattern: set speed
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Builder pattern: set area radius
    pub fn with_area_radius(mut self, area_radius: f32) -> Self {
        self.area_radius = area_radius;
        self
    }

    /// Builder pattern: set the previous position, normally the spawn point
    pub fn with_previous_position(mut self, position: Vec2) -> Self {
        self.previous_position = position;
        self
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn power_level(&self) -> u32 {
        self.power_level
    }

    /// Copy of this projectile for a volley child with its own serial and heading.
    pub fn child(&self, serial: u64, direction: Vec2, position: Vec2) -> Self {
        Self {
            serial,
            age: 0.0,
            previous_position: position,
            ..self.clone()
        }
        .with_direction(direction)
    }
}

/// Enemy marker read by the targeting queries.
///
/// Only targets with `alive == true` are considered. The engine never spawns,
/// despawns or flips this flag.
#[derive(Component, Reflect, Clone, Copy, Debug)]
#[reflect(Component)]
pub struct Target {
    pub alive: bool,
}

impl Default for Target {
    fn default() -> Self {
        Self { alive: true }
    }
}

/// Root projectile that has not picked its routine yet.
#[derive(Component, Reflect, Default, Clone, Copy, Debug)]
#[reflect(Component)]
pub struct Staged;

/// Per-shot data decided at fan-out and consumed when the flight starts.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ShotOrder {
    /// Assigned target, re-validated at launch
    pub target: Option<Entity>,
    /// Weave phase (radians)
    pub phase: f32,
    /// The lobbed shot that carries the area damage
    pub primary: bool,
    /// Dives a bee performs before bursting
    pub stings: u32,
}

/// Volley child waiting for its release time.
///
/// # Example
/// ```
/// use bevy_volley_dynamics::components::{Dormant, ShotOrder};
///
/// let dormant = Dormant { resume_at: 1.25, order: ShotOrder::default() };
/// assert!(!dormant.is_due(1.0));
/// assert!(dormant.is_due(1.25));
/// ```
#[derive(Component, Clone, Copy, Debug)]
pub struct Dormant {
    /// Fixed-clock timestamp (seconds) at which the flight starts
    pub resume_at: f32,
    pub order: ShotOrder,
}

impl Dormant {
    pub fn is_due(&self, now: f32) -> bool {
        now >= self.resume_at
    }
}

/// Visual spin carried separately from the heading.
#[derive(Component, Reflect, Clone, Copy, Debug, Default)]
#[reflect(Component)]
pub struct Spinner {
    /// Degrees per second
    pub rate: f32,
    /// Accumulated angle (degrees)
    pub angle: f32,
}

/// Wind push in progress: every lifted target and its starting height.
#[derive(Component, Clone, Debug)]
pub struct WindLift {
    pub lifted: Vec<(Entity, f32)>,
    pub offset: f32,
    pub duration: f32,
    /// Normalized progress in `0..=1`
    pub progress: f32,
}

/// Stages of a lobbed shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LobStage {
    InFlight,
    /// Landed primary waiting to detonate
    Fuse { remaining: f32 },
}

/// Stages of a drone bee.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeeStage {
    /// Flying to the first hover point
    Approach,
    Dive,
    Retreat,
    /// Flying to the hover point before the next dive
    Hover,
}

/// Active flight routine and its running state.
///
/// Every variant carries a copy of its tuning so a flight keeps working even
/// if the presets resource changes mid-flight.
#[derive(Component, Clone, Debug)]
pub enum Flight {
    /// Steer-limited drift toward the nearest target
    Cruise { tuning: CruiseTuning },
    /// Direct homing with linear acceleration
    Dagger { tuning: DaggerTuning, target: Entity },
    /// Constant-speed homing with a spinning visual
    SpinSeek { tuning: SpinSeekTuning, target: Entity },
    /// Homing with a decaying sideways weave
    Zigzag {
        tuning: ZigzagTuning,
        target: Entity,
        phase: f32,
    },
    /// Turn-capped homing with a speed ramp and swept hits
    Arrow {
        tuning: ArrowTuning,
        target: Entity,
        heading: Vec2,
        speed: f32,
    },
    /// Quadratic Bézier arc toward a strike point
    Lob {
        tuning: LobTuning,
        start: Vec2,
        control: Vec2,
        end: Vec2,
        progress: f32,
        primary: bool,
        stage: LobStage,
    },
    /// Straight flight that damages every target it passes once
    Cog {
        tuning: CogTuning,
        hit_set: HashSet<Entity>,
    },
    /// Dive-and-retreat cycles around one target
    Bee {
        tuning: BeeTuning,
        target: Entity,
        stings_left: u32,
        stage: BeeStage,
        waypoint: Vec2,
        wiggle_clock: f32,
        scale_blend: f32,
    },
    /// Accelerating steer-limited homing; flies straight while no target is alive
    Orb {
        tuning: OrbTuning,
        target: Option<Entity>,
        velocity: Vec2,
        max_speed: f32,
    },
    /// Finished, waiting out a visual delay before terminating
    Linger { remaining: f32, cause: Termination },
}

impl Flight {
    /// Lingering shots no longer move and ignore the life ceiling.
    pub fn is_lingering(&self) -> bool {
        matches!(self, Flight::Linger { .. })
    }

    /// Target the flight is currently homing on, if any.
    pub fn target(&self) -> Option<Entity> {
        match self {
            Flight::Dagger { target, .. }
            | Flight::SpinSeek { target, .. }
            | Flight::Zigzag { target, .. }
            | Flight::Arrow { target, .. }
            | Flight::Bee { target, .. } => Some(*target),
            Flight::Orb { target, .. } => *target,
            Flight::Cruise { .. }
            | Flight::Lob { .. }
            | Flight::Cog { .. }
            | Flight::Linger { .. } => None,
        }
    }

    /// Short routine name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Flight::Cruise { .. } => "cruise",
            Flight::Dagger { .. } => "dagger",
            Flight::SpinSeek { .. } => "spin_seek",
            Flight::Zigzag { .. } => "zigzag",
            Flight::Arrow { .. } => "arrow",
            Flight::Lob { .. } => "lob",
            Flight::Cog { .. } => "cog",
            Flight::Bee { .. } => "bee",
            Flight::Orb { .. } => "orb",
            Flight::Linger { .. } => "linger",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projectile_clamps_power_level() {
        let projectile = Projectile::new(Archetype::InventorDagger, 5, 0, 1);
        assert_eq!(projectile.power_level(), 1);
    }

    #[test]
    fn test_child_keeps_fixed_attributes() {
        let root = Projectile::new(Archetype::SamuraiHammer, 9, 3, 1)
            .with_speed(4.0)
            .with_area_radius(0.5);
        let child = root.child(7, Vec2::new(3.0, 4.0), Vec2::new(1.0, 1.0));

        assert_eq!(child.archetype(), Archetype::SamuraiHammer);
        assert_eq!(child.damage(), 9);
        assert_eq!(child.power_level(), 3);
        assert_eq!(child.serial, 7);
        assert_eq!(child.speed, 4.0);
        assert!((child.direction - Vec2::new(0.6, 0.8)).length() < 1e-6);
        assert_eq!(child.previous_position, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_zero_direction_is_ignored() {
        let projectile =
            Projectile::new(Archetype::WizardDagger, 1, 1, 0).with_direction(Vec2::ZERO);
        assert_eq!(projectile.direction, Vec2::Y);
    }
}
