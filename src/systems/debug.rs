use bevy::prelude::*;

use crate::components::{Flight, Projectile, Target};
use crate::resources::ArsenalConfig;

/// Draw debug gizmos for projectiles and targets.
///
/// Draws each shot's heading, a line to its current target, and a ring for
/// every live target.
pub fn draw_volley_debug(
    mut gizmos: Gizmos,
    config: Res<ArsenalConfig>,
    projectiles: Query<(&Transform, &Projectile, Option<&Flight>), Without<Target>>,
    targets: Query<(&Transform, &Target)>,
) {
    if !config.debug_draw {
        return;
    }

    for (transform, target) in targets.iter() {
        if target.alive {
            gizmos.circle_2d(transform.translation.truncate(), 0.25, Color::srgb(1.0, 0.3, 0.3));
        }
    }

    for (transform, projectile, flight) in projectiles.iter() {
        let position = transform.translation.truncate();
        gizmos.circle_2d(position, 0.05, Color::srgb(1.0, 1.0, 0.0));

        // Heading, scaled down for visibility
        let end = position + projectile.direction * projectile.speed * 0.1;
        gizmos.line_2d(position, end, Color::srgb(0.0, 1.0, 0.0));

        let Some(target) = flight.and_then(Flight::target) else {
            continue;
        };
        if let Ok((target_transform, _)) = targets.get(target) {
            gizmos.line_2d(
                position,
                target_transform.translation.truncate(),
                Color::srgba(0.4, 0.6, 1.0, 0.4),
            );
        }
    }
}
