//! # Bevy Volley Dynamics
//!
//! Card-driven projectile choreography for 2D tower defense on Bevy 0.18.
//!
//! ## Features
//! - Twelve attack archetypes, each a closed set of tuned constants
//! - Volley layouts: rows, lobbed rows, fans, rings, rain and swarms
//! - Homing, weaving, ballistic, piercing and dive-and-retreat flights
//! - Swept collision so fast shots never tunnel through targets
//! - Deterministic fixed-step simulation with seeded jitter
//!
//! ## Quick Start
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_volley_dynamics::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(VolleyPluginGroup)
//!         .run();
//! }
//! ```
//!
//! Enemies carry a [`components::Target`]; attacks start by writing a
//! [`events::FireEvent`] and land as [`events::DamageEvent`]s.

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;
pub mod types;

pub mod prelude {
    pub use crate::components::*;
    pub use crate::events::*;
    pub use crate::resources::*;
    pub use crate::types::*;
    pub use crate::VolleyPluginGroup;
    pub use crate::{VolleyCorePlugin, VolleyDebugPlugin};
}

use bevy::prelude::*;

/// Main plugin group that includes all volley subsystems.
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use bevy_volley_dynamics::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(DefaultPlugins)
///         .add_plugins(VolleyPluginGroup)
///         .run();
/// }
/// ```
#[derive(Default)]
pub struct VolleyPluginGroup;

impl PluginGroup for VolleyPluginGroup {
    fn build(self) -> bevy::app::PluginGroupBuilder {
        bevy::app::PluginGroupBuilder::start::<Self>()
            .add(VolleyCorePlugin)
            .add(VolleyDebugPlugin)
    }
}

/// Core simulation plugin.
///
/// Registers the components, resources and messages, and runs the
/// choreography in `FixedUpdate` as one chain so every tick sees the same
/// order.
///
/// # Systems
/// - `spawn_fired_projectiles` - Turns fire requests into staged roots
/// - `wake_dormant_shots` - Releases delayed volley shots
/// - `fan_out_volleys` - Spawns each root's volley
/// - `advance_flights` - Moves shots, tests hits and writes damage
/// - `lift_targets` - Runs wind pushes
/// - `spin_visuals` - Spins sprites of spinning shots
pub struct VolleyCorePlugin;

impl Plugin for VolleyCorePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<components::Projectile>()
            .register_type::<components::Target>()
            .register_type::<components::Staged>()
            .register_type::<components::Spinner>()
            .register_type::<resources::ArsenalConfig>()
            .init_resource::<resources::ArsenalConfig>()
            .init_resource::<resources::ArchetypePresets>()
            .init_resource::<resources::ArsenalRng>()
            .init_resource::<resources::SpawnSerials>()
            .add_message::<events::FireEvent>()
            .add_message::<events::DamageEvent>()
            .add_message::<events::VfxCue>()
            .add_message::<events::ProjectileTerminated>()
            .add_systems(Startup, systems::choreographer::report_invalid_presets)
            .add_systems(
                FixedUpdate,
                (
                    systems::choreographer::spawn_fired_projectiles,
                    systems::choreographer::wake_dormant_shots,
                    systems::choreographer::fan_out_volleys,
                    systems::flight::advance_flights,
                    systems::choreographer::lift_targets,
                    systems::choreographer::spin_visuals,
                )
                    .chain(),
            );
    }
}

/// Debug plugin for volley visualization.
pub struct VolleyDebugPlugin;

impl Plugin for VolleyDebugPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, systems::debug::draw_volley_debug);
    }
}
