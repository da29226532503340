//! Target queries over a per-tick snapshot of live enemies.

use bevy::prelude::*;

use crate::components::Target;
use crate::types::{LiveTarget, TargetPool};

/// Snapshot of live targets for one tick.
///
/// Built fresh every tick, so a despawned or dead target is gone from every
/// query the moment the host game removes it.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_volley_dynamics::systems::targeting::LiveTargets;
/// use bevy_volley_dynamics::types::LiveTarget;
///
/// let mut world = World::new();
/// let pool = vec![
///     LiveTarget { entity: world.spawn_empty().id(), position: Vec2::new(0.0, 3.0) },
///     LiveTarget { entity: world.spawn_empty().id(), position: Vec2::new(0.0, 1.0) },
/// ];
/// let targets = LiveTargets::from_pool(&pool, 1.0e6);
/// assert_eq!(targets.nearest(Vec2::ZERO).map(|t| t.position), Some(Vec2::new(0.0, 1.0)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LiveTargets {
    targets: Vec<LiveTarget>,
    max_range_sq: f32,
}

impl LiveTargets {
    pub fn from_pool<P: TargetPool + ?Sized>(pool: &P, max_range_sq: f32) -> Self {
        Self {
            targets: pool.live_targets(),
            max_range_sq,
        }
    }

    /// Gathers live targets from the ECS, ordered by entity so ties resolve
    /// the same way every run.
    pub fn gather<'a>(
        query: impl Iterator<Item = (Entity, &'a Transform, &'a Target)>,
        max_range_sq: f32,
    ) -> Self {
        let mut targets: Vec<LiveTarget> = query
            .filter(|(_, _, target)| target.alive)
            .map(|(entity, transform, _)| LiveTarget {
                entity,
                position: transform.translation.truncate(),
            })
            .collect();
        targets.sort_by_key(|target| target.entity);
        Self {
            targets,
            max_range_sq,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LiveTarget> {
        self.targets.iter()
    }

    /// Closest target strictly inside the range limit. The first in pool
    /// order wins ties.
    pub fn nearest(&self, origin: Vec2) -> Option<LiveTarget> {
        let mut best: Option<LiveTarget> = None;
        let mut best_sq = self.max_range_sq;
        for target in &self.targets {
            let d = target.position.distance_squared(origin);
            if d < best_sq {
                best_sq = d;
                best = Some(*target);
            }
        }
        best
    }

    /// Exactly `n` targets in ascending distance, repeating from the closest
    /// when fewer exist. Empty when no target is alive. Range is not applied.
    pub fn nearest_n(&self, origin: Vec2, n: usize) -> Vec<LiveTarget> {
        if self.targets.is_empty() || n == 0 {
            return Vec::new();
        }

        let mut sorted = self.targets.clone();
        sorted.sort_by(|a, b| {
            a.position
                .distance_squared(origin)
                .total_cmp(&b.position.distance_squared(origin))
        });

        sorted.iter().cycle().take(n).copied().collect()
    }

    /// Current position of a target, `None` once it is dead or gone.
    pub fn position_of(&self, entity: Entity) -> Option<Vec2> {
        self.targets
            .iter()
            .find(|target| target.entity == entity)
            .map(|target| target.position)
    }

    /// Every target within `radius` of `center`, boundary included.
    pub fn within_radius(&self, center: Vec2, radius: f32) -> Vec<LiveTarget> {
        let r2 = radius * radius;
        self.targets
            .iter()
            .filter(|target| target.position.distance_squared(center) <= r2)
            .copied()
            .collect()
    }

    /// Where a lobbed shot should land: the only target, or the midpoint of
    /// the two closest.
    pub fn strike_point(&self, from: Vec2) -> Option<Vec2> {
        match self.targets.len() {
            0 => None,
            1 => Some(self.targets[0].position),
            _ => {
                let closest = self.nearest_n(from, 2);
                Some((closest[0].position + closest[1].position) * 0.5)
            }
        }
    }

    /// Follows `entity` while it lives, otherwise falls back to the nearest.
    pub fn resolve(&self, entity: Entity, from: Vec2) -> Option<LiveTarget> {
        match self.position_of(entity) {
            Some(position) => Some(LiveTarget { entity, position }),
            None => self.nearest(from),
        }
    }
}

impl TargetPool for LiveTargets {
    fn live_targets(&self) -> Vec<LiveTarget> {
        self.targets.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pool of targets at the given positions, in spawn order.
    fn pool(positions: &[(f32, f32)]) -> Vec<LiveTarget> {
        let mut world = World::new();
        positions
            .iter()
            .map(|(x, y)| LiveTarget {
                entity: world.spawn_empty().id(),
                position: Vec2::new(*x, *y),
            })
            .collect()
    }

    fn snapshot(positions: &[(f32, f32)]) -> LiveTargets {
        LiveTargets::from_pool(&pool(positions), 1.0e6)
    }

    #[test]
    fn test_nearest_prefers_first_on_ties() {
        let pool = pool(&[(1.0, 0.0), (-1.0, 0.0)]);
        let targets = LiveTargets::from_pool(&pool, 1.0e6);
        assert_eq!(targets.nearest(Vec2::ZERO).map(|t| t.entity), Some(pool[0].entity));
    }

    #[test]
    fn test_nearest_respects_range() {
        let pool = pool(&[(10.0, 0.0)]);
        let targets = LiveTargets::from_pool(&pool, 100.0);
        assert!(targets.nearest(Vec2::ZERO).is_none());

        let targets = LiveTargets::from_pool(&pool, 100.5);
        assert!(targets.nearest(Vec2::ZERO).is_some());
    }

    #[test]
    fn test_nearest_is_idempotent() {
        let targets = snapshot(&[(2.0, 2.0), (0.5, 3.0), (-4.0, 1.0)]);
        let first = targets.nearest(Vec2::new(0.3, 0.3));
        let second = targets.nearest(Vec2::new(0.3, 0.3));
        assert_eq!(first, second);
    }

    #[test]
    fn test_nearest_n_pads_by_cycling() {
        let targets = snapshot(&[(3.0, 0.0), (1.0, 0.0)]);
        let picked: Vec<f32> = targets
            .nearest_n(Vec2::ZERO, 5)
            .iter()
            .map(|t| t.position.x)
            .collect();
        assert_eq!(picked, vec![1.0, 3.0, 1.0, 3.0, 1.0]);
    }

    #[test]
    fn test_nearest_n_empty_without_targets() {
        let targets = snapshot(&[]);
        assert!(targets.nearest_n(Vec2::ZERO, 4).is_empty());
    }

    #[test]
    fn test_nearest_n_ignores_range() {
        let targets = LiveTargets::from_pool(&pool(&[(50.0, 0.0)]), 1.0);
        assert_eq!(targets.nearest_n(Vec2::ZERO, 2).len(), 2);
    }

    #[test]
    fn test_strike_point_midpoint_of_two_closest() {
        let targets = snapshot(&[(0.0, 4.0), (2.0, 2.0), (9.0, 9.0)]);
        assert_eq!(targets.strike_point(Vec2::ZERO), Some(Vec2::new(1.0, 3.0)));
        assert_eq!(snapshot(&[]).strike_point(Vec2::ZERO), None);
    }

    #[test]
    fn test_within_radius_includes_boundary() {
        let targets = snapshot(&[(1.5, 0.0), (1.6, 0.0)]);
        let hits = targets.within_radius(Vec2::ZERO, 1.5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].position.x, 1.5);
    }

    #[test]
    fn test_resolve_falls_back_to_nearest() {
        let pool = pool(&[(0.0, 2.0), (0.0, 5.0)]);
        let stale = pool[1].entity;
        let targets = LiveTargets::from_pool(&pool[..1], 1.0e6);
        assert_eq!(
            targets.resolve(stale, Vec2::ZERO).map(|t| t.position),
            Some(Vec2::new(0.0, 2.0))
        );
    }
}
