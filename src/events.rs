//! Messages for the volley system.
//!
//! Note: In Bevy 0.18, buffered events use the `Message` trait instead of `Event`.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::types::{Archetype, Termination};

/// Request to fire one card's attack.
///
/// This is the only way projectiles enter the simulation. The intake system
/// turns each message into a root projectile aimed at the nearest live target.
///
/// # Fields
/// * `archetype` - Which attack to run
/// * `origin` - World-space position of the caster
/// * `damage` - Damage applied per hit
/// * `power_level` - Card level, scales shot counts (values below 1 become 1)
/// * `speed` - Optional override of the configured base speed
/// * `area_radius` - Optional override of the archetype's area radius
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_volley_dynamics::events::FireEvent;
/// use bevy_volley_dynamics::types::Archetype;
///
/// let fire = FireEvent::new(Archetype::InventorFireBomb, Vec2::ZERO, 20, 3)
///     .with_area_radius(2.0);
/// assert_eq!(fire.area_radius, Some(2.0));
/// ```
#[derive(Message, Clone, Debug)]
pub struct FireEvent {
    pub archetype: Archetype,
    pub origin: Vec2,
    pub damage: u32,
    pub power_level: u32,
    pub speed: Option<f32>,
    pub area_radius: Option<f32>,
}

impl FireEvent {
    /// Creates a fire request. Power levels below 1 are raised to 1.
    pub fn new(archetype: Archetype, origin: Vec2, damage: u32, power_level: u32) -> Self {
        Self {
            archetype,
            origin,
            damage,
            power_level: power_level.max(1),
            speed: None,
            area_radius: None,
        }
    }

    /// Sets the base speed handed to the root projectile.
    ///
    /// # Arguments
    /// * `speed` - Units per second
    ///
    /// # Returns
    /// The modified FireEvent instance for method chaining
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Sets the area radius used by area damage and bee hover spread.
    ///
    /// # Arguments
    /// * `radius` - Radius in world units
    ///
    /// # Returns
    /// The modified FireEvent instance for method chaining
    pub fn with_area_radius(mut self, radius: f32) -> Self {
        self.area_radius = Some(radius);
        self
    }
}

/// One damage application, written for the host game to apply.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct DamageEvent {
    pub target: Entity,
    pub amount: u32,
    /// Projectile that dealt the damage
    pub source: Entity,
    pub archetype: Archetype,
}

/// What kind of audio/visual cue to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum VfxKind {
    /// A flight started
    Launch,
    /// A shot struck a target
    Hit,
    /// A lobbed primary went off
    Detonation,
    /// A bee finished its stings
    Burst,
}

/// Fire-and-forget cue for the presentation layer.
#[derive(Message, Clone, Copy, Debug)]
pub struct VfxCue {
    pub kind: VfxKind,
    pub position: Vec2,
    pub source: Entity,
}

/// Written once for every projectile that leaves the simulation.
#[derive(Message, Clone, Copy, Debug)]
pub struct ProjectileTerminated {
    pub projectile: Entity,
    pub archetype: Archetype,
    pub cause: Termination,
}
