//! Global resources for the volley system.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::types::{
    Archetype, ArrowTuning, BeeTuning, CogTuning, DaggerTuning, LiftTuning, LobTuning,
    LossPolicy, MotionTuning, OrbTuning, Routine, RowSpacing, ShotFormula, SpinSeekTuning,
    TuningError, VolleyLayout, ZigzagTuning,
};

/// Global configuration for the volley system.
///
/// # Fields
/// * `max_target_range_sq` - Squared distance a target must be strictly under to count as nearest
/// * `default_speed` - Base speed for fire requests without an override
/// * `fallback_direction` - Heading used when no target exists
/// * `rng_seed` - Seed for hover, retreat and strike jitter
/// * `debug_draw` - Draw gizmos for live projectiles
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_volley_dynamics::resources::ArsenalConfig;
///
/// let config = ArsenalConfig {
///     max_target_range_sq: 64.0,
///     ..Default::default()
/// };
/// assert_eq!(config.fallback_direction, Vec2::Y);
/// ```
#[derive(Resource, Reflect, Clone, Debug)]
#[reflect(Resource)]
pub struct ArsenalConfig {
    pub max_target_range_sq: f32,
    /// Units per second
    pub default_speed: f32,
    pub fallback_direction: Vec2,
    pub rng_seed: u64,
    pub debug_draw: bool,
}

impl Default for ArsenalConfig {
    fn default() -> Self {
        Self {
            max_target_range_sq: 1.0e6,
            default_speed: 3.0,
            fallback_direction: Vec2::Y,
            rng_seed: 0x5eed,
            debug_draw: false,
        }
    }
}

/// Constants for one archetype.
///
/// # Fields
/// * `shots` - Volley size formula
/// * `routine` - Volley layout and flight, or the wind lift
/// * `life` - Ceiling on the life clock, `None` when the flight ends on its own
/// * `area_radius` - Default area radius
/// * `on_target_loss` - What a homing shot does when re-query fails
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeProfile {
    pub shots: ShotFormula,
    pub routine: Routine,
    pub life: Option<f32>,
    pub area_radius: f32,
    pub on_target_loss: LossPolicy,
}

impl ArchetypeProfile {
    /// Flight of every shot, `None` for the lift.
    pub fn motion(&self) -> Option<&MotionTuning> {
        match &self.routine {
            Routine::Volley { motion, .. } => Some(motion),
            Routine::Lift(_) => None,
        }
    }

    /// Checks the profile for values the engine cannot run with.
    pub fn validate(&self, archetype: Archetype) -> Result<(), TuningError> {
        formula(archetype, &self.shots)?;

        if let Some(life) = self.life {
            positive(archetype, "life", life)?;
        }
        if self.area_radius < 0.0 || !self.area_radius.is_finite() {
            return Err(TuningError::NonPositive {
                archetype,
                field: "area_radius",
                value: self.area_radius,
            });
        }

        let motion = match self.routine {
            Routine::Lift(t) => return positive(archetype, "duration", t.duration),
            Routine::Volley { motion, .. } => motion,
        };
        match motion {
            MotionTuning::Dagger(t) => positive(archetype, "hit_radius", t.hit_radius),
            MotionTuning::SpinSeek(t) => {
                positive(archetype, "speed", t.speed)?;
                positive(archetype, "hit_radius", t.hit_radius)
            }
            MotionTuning::Zigzag(t) => {
                positive(archetype, "speed", t.speed)?;
                positive(archetype, "hit_radius", t.hit_radius)
            }
            MotionTuning::Arrow(t) => {
                positive(archetype, "max_speed", t.max_speed)?;
                positive(archetype, "hit_radius", t.hit_radius)
            }
            MotionTuning::Lob(t) => {
                positive(archetype, "flight_time", t.flight_time)?;
                range(archetype, "jitter_x", -t.jitter_x, t.jitter_x)?;
                range(archetype, "jitter_y", -t.jitter_y, t.jitter_y)
            }
            MotionTuning::Cog(t) => {
                positive(archetype, "speed", t.speed)?;
                positive(archetype, "hit_radius", t.hit_radius)
            }
            MotionTuning::Bee(t) => {
                formula(archetype, &t.stings)?;
                positive(archetype, "waypoint_threshold", t.waypoint_threshold)?;
                positive(archetype, "hit_radius", t.hit_radius)?;
                range(archetype, "hover", t.hover_min, t.hover_max)?;
                range(archetype, "retreat", t.retreat_min, t.retreat_max)?;
                range(archetype, "retreat_side", -t.retreat_side, t.retreat_side)
            }
            MotionTuning::Orb(t) => positive(archetype, "hit_radius", t.hit_radius),
        }
    }
}

fn formula(archetype: Archetype, shots: &ShotFormula) -> Result<(), TuningError> {
    if shots.min > shots.max {
        return Err(TuningError::InvertedClamp {
            archetype,
            min: shots.min,
            max: shots.max,
        });
    }
    if shots.max == 0 || shots.shot_count(1) == 0 {
        return Err(TuningError::ZeroShots { archetype });
    }
    Ok(())
}

fn positive(archetype: Archetype, field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::NonPositive {
            archetype,
            field,
            value,
        })
    }
}

/// `min..=max` must be a non-empty finite range to sample from.
fn range(archetype: Archetype, field: &'static str, min: f32, max: f32) -> Result<(), TuningError> {
    if min <= max && min.is_finite() && max.is_finite() {
        Ok(())
    } else {
        Err(TuningError::InvertedRange {
            archetype,
            field,
            min,
            max,
        })
    }
}

/// Archetype profile table, indexed by [`Archetype::index`].
///
/// # Example
/// ```
/// use bevy_volley_dynamics::resources::ArchetypePresets;
/// use bevy_volley_dynamics::types::Archetype;
///
/// let presets = ArchetypePresets::with_defaults();
/// let hammer = presets.get(Archetype::SamuraiHammer);
/// assert_eq!(hammer.shots.shot_count(1), 4);
/// assert!(presets.validate().is_ok());
/// ```
#[derive(Resource, Clone, Debug)]
pub struct ArchetypePresets {
    profiles: [ArchetypeProfile; 12],
}

impl Default for ArchetypePresets {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ArchetypePresets {
    /// Creates the table with the shipped tuning for every archetype.
    pub fn with_defaults() -> Self {
        Self {
            profiles: Archetype::ALL.map(default_profile),
        }
    }

    pub fn get(&self, archetype: Archetype) -> &ArchetypeProfile {
        &self.profiles[archetype.index()]
    }

    pub fn get_mut(&mut self, archetype: Archetype) -> &mut ArchetypeProfile {
        &mut self.profiles[archetype.index()]
    }

    /// Validates every profile, collecting all failures.
    pub fn validate(&self) -> Result<(), Vec<TuningError>> {
        let errors: Vec<TuningError> = Archetype::ALL
            .iter()
            .filter_map(|archetype| self.get(*archetype).validate(*archetype).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn volley(layout: VolleyLayout, motion: MotionTuning) -> Routine {
    Routine::Volley { layout, motion }
}

fn default_profile(archetype: Archetype) -> ArchetypeProfile {
    let row = RowSpacing::default();
    let dagger = ArchetypeProfile {
        shots: ShotFormula::new(1, 1, 2, 6),
        routine: volley(
            VolleyLayout::Row(row),
            MotionTuning::Dagger(DaggerTuning::default()),
        ),
        life: Some(3.5),
        area_radius: 0.0,
        on_target_loss: LossPolicy::Expire,
    };
    let lob = ArchetypeProfile {
        shots: ShotFormula::new(1, 1, 2, 5),
        routine: volley(
            VolleyLayout::LobRow(row),
            MotionTuning::Lob(LobTuning::default()),
        ),
        life: None,
        area_radius: 1.5,
        on_target_loss: LossPolicy::Expire,
    };

    match archetype {
        Archetype::SamuraiHammer => ArchetypeProfile {
            shots: ShotFormula::new(3, 1, 4, 8),
            routine: volley(
                VolleyLayout::Fan {
                    spread_deg: 16.0,
                    forward_spacing: 0.30,
                    side_spacing: 0.18,
                    stagger: 0.06,
                },
                MotionTuning::SpinSeek(SpinSeekTuning {
                    speed: 3.25,
                    spin_rate: -800.0,
                    hit_radius: 0.3,
                    linger: 0.10,
                }),
            ),
            life: Some(2.5),
            ..dagger
        },
        Archetype::SamuraiBlades => ArchetypeProfile {
            shots: ShotFormula::new(2, 1, 3, 6),
            routine: volley(
                VolleyLayout::Row(row),
                MotionTuning::Zigzag(ZigzagTuning::default()),
            ),
            ..dagger
        },
        Archetype::SamuraiShuriken => ArchetypeProfile {
            shots: ShotFormula::new(0, 4, 4, 24),
            routine: volley(
                VolleyLayout::Fan {
                    spread_deg: 18.0,
                    forward_spacing: 0.25,
                    side_spacing: 0.12,
                    stagger: 0.08,
                },
                MotionTuning::SpinSeek(SpinSeekTuning {
                    speed: 8.0,
                    spin_rate: 1080.0,
                    hit_radius: 0.25,
                    linger: 0.0,
                }),
            ),
            life: Some(3.0),
            ..dagger
        },
        Archetype::SamuraiArrowRain => ArchetypeProfile {
            shots: ShotFormula::new(2, 1, 3, 8),
            routine: volley(
                VolleyLayout::Rain {
                    min_lateral: 0.05,
                    max_lateral: 0.6,
                    stagger: 0.05,
                },
                MotionTuning::Arrow(ArrowTuning::default()),
            ),
            life: Some(2.0),
            ..dagger
        },
        Archetype::InventorFireBomb | Archetype::WizardStone => lob,
        Archetype::InventorPiercingCogs => ArchetypeProfile {
            shots: ShotFormula::new(4, 2, 6, 18),
            routine: volley(
                VolleyLayout::Fan {
                    spread_deg: 18.0,
                    forward_spacing: 0.35,
                    side_spacing: 0.12,
                    stagger: 0.4,
                },
                MotionTuning::Cog(CogTuning::default()),
            ),
            life: Some(3.0),
            ..dagger
        },
        Archetype::InventorDrone => ArchetypeProfile {
            shots: ShotFormula::new(0, 3, 3, 24),
            routine: volley(
                VolleyLayout::Swarm { stagger: 0.12 },
                MotionTuning::Bee(BeeTuning::default()),
            ),
            life: Some(12.0),
            area_radius: 0.5,
            ..dagger
        },
        Archetype::InventorDagger | Archetype::WizardDagger => dagger,
        Archetype::WizardWindPush => ArchetypeProfile {
            shots: ShotFormula::new(1, 0, 1, 1),
            routine: Routine::Lift(LiftTuning::default()),
            life: None,
            ..dagger
        },
        Archetype::WizardMagicBall => ArchetypeProfile {
            shots: ShotFormula::new(1, 1, 2, 8),
            routine: volley(
                VolleyLayout::Ring {
                    radius: 0.25,
                    stagger: 0.08,
                },
                MotionTuning::Orb(OrbTuning::default()),
            ),
            life: Some(3.5),
            ..dagger
        },
    }
}

/// Seeded random source for hover points, retreats and strike jitter.
#[derive(Resource)]
pub struct ArsenalRng(pub StdRng);

impl ArsenalRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl FromWorld for ArsenalRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world
            .get_resource::<ArsenalConfig>()
            .map(|config| config.rng_seed)
            .unwrap_or_else(|| ArsenalConfig::default().rng_seed);
        Self::seeded(seed)
    }
}

/// Monotonic spawn counter shared by roots and children.
#[derive(Resource, Default, Debug)]
pub struct SpawnSerials {
    next: u64,
}

impl SpawnSerials {
    /// Returns the next serial.
    pub fn issue(&mut self) -> u64 {
        let serial = self.next;
        self.next += 1;
        serial
    }
}
