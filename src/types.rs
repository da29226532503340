//! Common types and enums for the volley system.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// The closed set of attack kinds a card can fire.
///
/// Every projectile carries exactly one archetype for its whole life. Routine
/// selection is an exhaustive match on this enum, so there is no "unknown
/// attack" branch anywhere in the engine.
///
/// # Example
/// ```
/// use bevy_volley_dynamics::types::Archetype;
///
/// assert_eq!(Archetype::ALL.len(), 12);
/// assert_eq!(Archetype::InventorDagger.label(), "inventor_dagger");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum Archetype {
    /// Spinning hammers fanned toward the nearest enemies
    SamuraiHammer,
    /// Weaving blades in a row formation
    SamuraiBlades,
    /// Large fan of homing shuriken
    SamuraiShuriken,
    /// Staggered arrows with swept hits
    SamuraiArrowRain,
    /// Lobbed bombs, the lead bomb detonates
    InventorFireBomb,
    /// Piercing cogs on fixed headings
    InventorPiercingCogs,
    /// Drone swarm releasing diving bees
    InventorDrone,
    /// Accelerating dagger volley
    InventorDagger,
    /// Same flight as the inventor dagger
    WizardDagger,
    /// Lifts every live enemy
    WizardWindPush,
    /// Orbs released around a ring
    WizardMagicBall,
    /// Lobbed stones, the lead stone detonates
    WizardStone,
}

impl Archetype {
    /// All archetypes, in declaration order.
    pub const ALL: [Archetype; 12] = [
        Archetype::SamuraiHammer,
        Archetype::SamuraiBlades,
        Archetype::SamuraiShuriken,
        Archetype::SamuraiArrowRain,
        Archetype::InventorFireBomb,
        Archetype::InventorPiercingCogs,
        Archetype::InventorDrone,
        Archetype::InventorDagger,
        Archetype::WizardDagger,
        Archetype::WizardWindPush,
        Archetype::WizardMagicBall,
        Archetype::WizardStone,
    ];

    /// Position of this archetype in [`Archetype::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Archetype::SamuraiHammer => 0,
            Archetype::SamuraiBlades => 1,
            Archetype::SamuraiShuriken => 2,
            Archetype::SamuraiArrowRain => 3,
            Archetype::InventorFireBomb => 4,
            Archetype::InventorPiercingCogs => 5,
            Archetype::InventorDrone => 6,
            Archetype::InventorDagger => 7,
            Archetype::WizardDagger => 8,
            Archetype::WizardWindPush => 9,
            Archetype::WizardMagicBall => 10,
            Archetype::WizardStone => 11,
        }
    }

    /// Stable snake_case name, used for entity names and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Archetype::SamuraiHammer => "samurai_hammer",
            Archetype::SamuraiBlades => "samurai_blades",
            Archetype::SamuraiShuriken => "samurai_shuriken",
            Archetype::SamuraiArrowRain => "samurai_arrow_rain",
            Archetype::InventorFireBomb => "inventor_fire_bomb",
            Archetype::InventorPiercingCogs => "inventor_piercing_cogs",
            Archetype::InventorDrone => "inventor_drone",
            Archetype::InventorDagger => "inventor_dagger",
            Archetype::WizardDagger => "wizard_dagger",
            Archetype::WizardWindPush => "wizard_wind_push",
            Archetype::WizardMagicBall => "wizard_magic_ball",
            Archetype::WizardStone => "wizard_stone",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shot count formula: `clamp(base + per_level * power, min, max)`.
///
/// `per_level` is unsigned, so the count never decreases as power grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotFormula {
    pub base: u32,
    pub per_level: u32,
    pub min: u32,
    pub max: u32,
}

impl ShotFormula {
    pub const fn new(base: u32, per_level: u32, min: u32, max: u32) -> Self {
        Self {
            base,
            per_level,
            min,
            max,
        }
    }

    /// Number of shots for a power level. Power below 1 counts as 1.
    ///
    /// An inverted clamp (`min > max`) resolves to `max` instead of panicking;
    /// [`crate::resources::ArchetypeProfile::validate`] reports it.
    pub fn shot_count(&self, power_level: u32) -> u32 {
        let power = power_level.max(1);
        self.base
            .saturating_add(self.per_level.saturating_mul(power))
            .max(self.min)
            .min(self.max)
    }
}

/// Spacing constants shared by the row and lob-row layouts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowSpacing {
    pub lateral: f32,
    pub forward: f32,
    pub back: f32,
    pub small_lateral: f32,
    pub big_lateral: f32,
    pub back_delay: f32,
}

impl Default for RowSpacing {
    fn default() -> Self {
        Self {
            lateral: 0.35,
            forward: 0.25,
            back: 0.35,
            small_lateral: 0.20,
            big_lateral: 0.35,
            back_delay: 0.08,
        }
    }
}

/// Spatial layout of a volley.
///
/// Layouts only depend on the forward vector, the origin and the shot count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum VolleyLayout {
    /// Front pair, rear pair, then extra rear shots.
    Row(RowSpacing),
    /// Row variant used by lobbed shots; index 0 is the primary.
    LobRow(RowSpacing),
    /// Angular fan around forward with staggered depth.
    Fan {
        spread_deg: f32,
        forward_spacing: f32,
        side_spacing: f32,
        stagger: f32,
    },
    /// Even spacing around a circle centered on the caster.
    Ring { radius: f32, stagger: f32 },
    /// Alternating lateral offsets growing from `min_lateral` to `max_lateral`.
    Rain {
        min_lateral: f32,
        max_lateral: f32,
        stagger: f32,
    },
    /// All shots at the origin, released one after the other.
    Swarm { stagger: f32 },
}

/// Steer-limited cruise: bounded turn rate plus a cone around a reference axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CruiseTuning {
    /// Degrees per second
    pub steer_speed: f32,
    /// Maximum angle (degrees) between heading and the reference axis
    pub max_steer_angle: f32,
    pub hit_radius: f32,
}

impl Default for CruiseTuning {
    fn default() -> Self {
        Self {
            steer_speed: 90.0,
            max_steer_angle: 45.0,
            hit_radius: 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaggerTuning {
    pub start_speed: f32,
    pub acceleration: f32,
    pub hit_radius: f32,
}

impl Default for DaggerTuning {
    fn default() -> Self {
        Self {
            start_speed: 1.0,
            acceleration: 5.0,
            hit_radius: 0.2,
        }
    }
}

/// Constant-speed homing with a spinning visual (hammers, shuriken).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinSeekTuning {
    pub speed: f32,
    /// Degrees per second, negative spins clockwise
    pub spin_rate: f32,
    pub hit_radius: f32,
    /// Seconds the shot stays after a hit
    pub linger: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrowTuning {
    pub speed: f32,
    pub acceleration: f32,
    pub max_speed: f32,
    /// Degrees per second
    pub turn_rate: f32,
    pub sway_frequency: f32,
    pub sway_amplitude: f32,
    pub hit_radius: f32,
    pub linger: f32,
    pub scale: f32,
}

impl Default for ArrowTuning {
    fn default() -> Self {
        Self {
            speed: 5.0,
            acceleration: 18.0,
            max_speed: 8.0,
            turn_rate: 540.0,
            sway_frequency: 7.0,
            sway_amplitude: 0.10,
            hit_radius: 0.28,
            linger: 0.08,
            scale: 0.85,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LobTuning {
    pub arc_height: f32,
    pub flight_time: f32,
    /// Strike offset when no target is alive
    pub default_rise: f32,
    pub jitter_x: f32,
    pub jitter_y: f32,
    /// Delay between landing and the area damage
    pub fuse: f32,
    /// Seconds the primary shot stays after detonating
    pub linger: f32,
    pub peak_scale: f32,
}

impl Default for LobTuning {
    fn default() -> Self {
        Self {
            arc_height: 2.2,
            flight_time: 1.4,
            default_rise: 2.0,
            jitter_x: 0.25,
            jitter_y: 0.15,
            fuse: 0.25,
            linger: 2.0,
            peak_scale: 1.10,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZigzagTuning {
    pub speed: f32,
    pub amplitude: f32,
    pub min_amplitude: f32,
    /// Fraction of the amplitude range lost per second
    pub decay: f32,
    /// Radians per second
    pub frequency: f32,
    pub hit_radius: f32,
}

impl Default for ZigzagTuning {
    fn default() -> Self {
        Self {
            speed: 4.0,
            amplitude: 2.0,
            min_amplitude: 0.2,
            decay: 0.4,
            frequency: 4.0,
            hit_radius: 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeeTuning {
    pub stings: ShotFormula,
    /// Cycles per second
    pub wiggle_frequency: f32,
    pub cruise_amplitude: f32,
    pub dive_amplitude: f32,
    pub dive_speed_factor: f32,
    pub waypoint_threshold: f32,
    pub hit_radius: f32,
    pub hover_min: f32,
    pub hover_max: f32,
    pub retreat_min: f32,
    pub retreat_max: f32,
    pub retreat_side: f32,
    pub cruise_scale: f32,
    pub dive_scale: f32,
    pub burst: f32,
}

impl Default for BeeTuning {
    fn default() -> Self {
        Self {
            stings: ShotFormula::new(1, 1, 2, 6),
            wiggle_frequency: 1.2,
            cruise_amplitude: 5.0,
            dive_amplitude: 0.45,
            dive_speed_factor: 3.0,
            waypoint_threshold: 0.12,
            hit_radius: 0.12,
            hover_min: 0.6,
            hover_max: 1.2,
            retreat_min: 0.8,
            retreat_max: 1.2,
            retreat_side: 0.6,
            cruise_scale: 1.15,
            dive_scale: 0.88,
            burst: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbTuning {
    /// Orb speed relative to the caster's shot speed
    pub speed_factor: f32,
    pub launch_factor: f32,
    pub min_launch_speed: f32,
    pub cap_factor: f32,
    pub min_cap_speed: f32,
    pub acceleration: f32,
    /// Degrees per second
    pub steer_rate: f32,
    pub hit_radius: f32,
    pub spin_rate: f32,
    pub linger: f32,
}

impl Default for OrbTuning {
    fn default() -> Self {
        Self {
            speed_factor: 0.9,
            launch_factor: 0.6,
            min_launch_speed: 1.5,
            cap_factor: 1.4,
            min_cap_speed: 4.0,
            acceleration: 2.5,
            steer_rate: 240.0,
            hit_radius: 0.22,
            spin_rate: 450.0,
            linger: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CogTuning {
    pub speed: f32,
    pub spin_rate: f32,
    pub hit_radius: f32,
}

impl Default for CogTuning {
    fn default() -> Self {
        Self {
            speed: 6.0,
            spin_rate: -720.0,
            hit_radius: 0.35,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiftTuning {
    pub offset: f32,
    pub duration: f32,
}

impl Default for LiftTuning {
    fn default() -> Self {
        Self {
            offset: 2.0,
            duration: 4.0,
        }
    }
}

/// Per-archetype motion constants, carried by value into each shot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MotionTuning {
    Dagger(DaggerTuning),
    SpinSeek(SpinSeekTuning),
    Zigzag(ZigzagTuning),
    Arrow(ArrowTuning),
    Lob(LobTuning),
    Cog(CogTuning),
    Bee(BeeTuning),
    Orb(OrbTuning),
}

/// What a fired card does once its root projectile is staged.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Routine {
    /// Fan out into a volley whose shots all fly `motion`.
    Volley {
        layout: VolleyLayout,
        motion: MotionTuning,
    },
    /// No children: the root lifts every live target, then retires.
    Lift(LiftTuning),
}

/// What a shot does when its target is gone and no replacement exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LossPolicy {
    /// Terminate right away
    #[default]
    Expire,
    /// Keep flying on the last heading under steer-limited cruise
    Drift,
}

/// Why a projectile left the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum Termination {
    /// Spawned its volley and retired
    FannedOut,
    /// No live target existed when the routine started
    NoTargets,
    /// Delivered its damage
    Hit,
    /// Life clock ran past the ceiling
    Expired,
    /// Target vanished and re-query found nothing
    TargetLost,
    /// Secondary lobbed shot reached the ground
    Landed,
    /// Routine ran to its natural end (lift finished, stings spent)
    Completed,
    /// Archetype tuning failed validation, nothing was launched
    Misconfigured,
}

/// One live enemy as seen by the targeting queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveTarget {
    pub entity: Entity,
    pub position: Vec2,
}

/// Source of live targets.
///
/// The engine never caches what this returns beyond a single tick.
pub trait TargetPool {
    /// Every live target, in a stable iteration order.
    fn live_targets(&self) -> Vec<LiveTarget>;
}

impl TargetPool for [LiveTarget] {
    fn live_targets(&self) -> Vec<LiveTarget> {
        self.to_vec()
    }
}

impl TargetPool for Vec<LiveTarget> {
    fn live_targets(&self) -> Vec<LiveTarget> {
        self.clone()
    }
}

/// Rejected archetype tuning.
#[derive(Clone, Debug, PartialEq)]
pub enum TuningError {
    /// `min > max` in a shot formula
    InvertedClamp {
        archetype: Archetype,
        min: u32,
        max: u32,
    },
    /// A formula that can produce zero shots
    ZeroShots { archetype: Archetype },
    /// Negative or non-finite value where a positive one is required
    NonPositive {
        archetype: Archetype,
        field: &'static str,
        value: f32,
    },
    /// A random range whose lower bound is above its upper bound
    InvertedRange {
        archetype: Archetype,
        field: &'static str,
        min: f32,
        max: f32,
    },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::InvertedClamp {
                archetype,
                min,
                max,
            } => write!(f, "{archetype}: shot clamp min {min} is above max {max}"),
            TuningError::ZeroShots { archetype } => {
                write!(f, "{archetype}: shot formula can resolve to zero shots")
            }
            TuningError::NonPositive {
                archetype,
                field,
                value,
            } => write!(f, "{archetype}: {field} must be positive, got {value}"),
            TuningError::InvertedRange {
                archetype,
                field,
                min,
                max,
            } => write!(f, "{archetype}: {field} range {min}..={max} is empty"),
        }
    }
}

impl std::error::Error for TuningError {}
