//! Volley layouts.
//!
//! A layout turns a shot count and a forward vector into per-shot offsets,
//! release delays, headings and weave phases. Offsets never depend on where
//! the targets are, only on `forward`.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

use crate::types::{LiveTarget, RowSpacing, VolleyLayout};

/// One slot of a layout, relative to the volley origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotSlot {
    pub offset: Vec2,
    /// Seconds after the fan-out before the shot starts
    pub delay: f32,
    /// Weave phase (radians)
    pub phase: f32,
    /// Fixed heading, `None` to aim at the assigned target
    pub heading: Option<Vec2>,
}

impl ShotSlot {
    fn at(offset: Vec2, delay: f32) -> Self {
        Self {
            offset,
            delay,
            phase: 0.0,
            heading: None,
        }
    }

    fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }
}

/// A shot ready to spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannedShot {
    pub position: Vec2,
    pub offset: Vec2,
    pub delay: f32,
    pub heading: Vec2,
    pub phase: f32,
    pub target: Option<Entity>,
    /// Carries the lob's area damage
    pub primary: bool,
}

/// Ordered shots of one fan-out, consumed right after it is built.
#[derive(Clone, Debug, PartialEq)]
pub struct VolleyPlan {
    pub forward: Vec2,
    pub shots: Vec<PlannedShot>,
}

/// Front pair, rear pair, then a trailing column.
pub fn row_slots(n: usize, forward: Vec2, spacing: &RowSpacing) -> Vec<ShotSlot> {
    let perp = forward.perp();
    let front = forward * spacing.forward;
    let back = -forward * spacing.back;

    match n {
        0 => Vec::new(),
        1 => vec![ShotSlot::at(Vec2::ZERO, 0.0)],
        2 => {
            let side = perp * spacing.lateral * 0.5;
            vec![
                ShotSlot::at(side, 0.0),
                ShotSlot::at(-side, 0.0).with_phase(PI),
            ]
        }
        3 => {
            let side = perp * spacing.lateral * 0.6;
            vec![
                ShotSlot::at(front, 0.0),
                ShotSlot::at(back + side, spacing.back_delay),
                ShotSlot::at(back - side, spacing.back_delay).with_phase(PI),
            ]
        }
        _ => {
            let small = perp * spacing.small_lateral;
            let big = perp * spacing.big_lateral;
            let mut slots = vec![
                ShotSlot::at(front + small, 0.0),
                ShotSlot::at(front - small, 0.0).with_phase(PI),
                ShotSlot::at(back + big, spacing.back_delay),
                ShotSlot::at(back - big, spacing.back_delay).with_phase(PI),
            ];
            for i in 4..n {
                let depth = spacing.back + 0.1 * i as f32;
                let delay = spacing.back_delay + 0.02 * (i - 3) as f32;
                let phase = if i % 2 == 0 { 0.0 } else { PI };
                slots.push(ShotSlot::at(-forward * depth, delay).with_phase(phase));
            }
            slots
        }
    }
}

/// Row variant for lobbed shots. Slot 0 is the primary.
pub fn lob_row_slots(n: usize, forward: Vec2, spacing: &RowSpacing) -> Vec<ShotSlot> {
    let perp = forward.perp();
    if n == 0 {
        return Vec::new();
    }
    if n == 2 {
        let side = perp * spacing.lateral * 0.5;
        return vec![ShotSlot::at(side, 0.0), ShotSlot::at(-side, 0.0)];
    }

    let back = -forward * spacing.back;
    let side = perp * spacing.lateral * 0.6;
    let mut slots = vec![ShotSlot::at(forward * spacing.forward, 0.0)];
    if n >= 3 {
        slots.push(ShotSlot::at(back + side, spacing.back_delay));
        slots.push(ShotSlot::at(back - side, spacing.back_delay));
    }
    if n >= 4 {
        slots.push(ShotSlot::at(forward * (spacing.forward * 1.6), 0.0));
    }
    if n >= 5 {
        slots.push(ShotSlot::at(
            -forward * (spacing.back * 1.4),
            spacing.back_delay + 0.04,
        ));
    }
    slots
}

/// Angular fan centered on `forward`, each shot with its own fixed heading.
pub fn fan_slots(
    n: usize,
    forward: Vec2,
    spread_deg: f32,
    forward_spacing: f32,
    side_spacing: f32,
    stagger: f32,
) -> Vec<ShotSlot> {
    let perp = forward.perp();
    let center = (n as f32 - 1.0) / 2.0;
    (0..n)
        .map(|i| {
            let k = i as f32 - center;
            let heading = forward.rotate(Vec2::from_angle((k * spread_deg).to_radians()));
            ShotSlot {
                offset: heading * (i as f32 * forward_spacing) + perp * (k * side_spacing),
                delay: i as f32 * stagger,
                phase: 0.0,
                heading: Some(heading),
            }
        })
        .collect()
}

/// Evenly spaced around a circle, starting on the caster's right.
pub fn ring_slots(n: usize, forward: Vec2, radius: f32, stagger: f32) -> Vec<ShotSlot> {
    let right = -forward.perp();
    (0..n)
        .map(|i| {
            let angle = TAU * i as f32 / n as f32;
            let radial = (angle.cos() * right + angle.sin() * forward).normalize_or_zero();
            ShotSlot::at(radial * radius, i as f32 * stagger)
        })
        .collect()
}

/// Alternating sideways offsets that widen along the volley.
pub fn rain_slots(
    n: usize,
    forward: Vec2,
    min_lateral: f32,
    max_lateral: f32,
    stagger: f32,
) -> Vec<ShotSlot> {
    let perp = forward.perp();
    let last = n.saturating_sub(1).max(1) as f32;
    (0..n)
        .map(|i| {
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let lateral = sign * (min_lateral + (max_lateral - min_lateral) * (i as f32 / last));
            ShotSlot::at(perp * lateral, i as f32 * stagger)
        })
        .collect()
}

/// Every shot from the origin, one after another.
pub fn swarm_slots(n: usize, stagger: f32) -> Vec<ShotSlot> {
    (0..n)
        .map(|i| ShotSlot::at(Vec2::ZERO, i as f32 * stagger))
        .collect()
}

/// Slots for any layout.
pub fn layout_slots(layout: &VolleyLayout, n: usize, forward: Vec2) -> Vec<ShotSlot> {
    match *layout {
        VolleyLayout::Row(spacing) => row_slots(n, forward, &spacing),
        VolleyLayout::LobRow(spacing) => lob_row_slots(n, forward, &spacing),
        VolleyLayout::Fan {
            spread_deg,
            forward_spacing,
            side_spacing,
            stagger,
        } => fan_slots(n, forward, spread_deg, forward_spacing, side_spacing, stagger),
        VolleyLayout::Ring { radius, stagger } => ring_slots(n, forward, radius, stagger),
        VolleyLayout::Rain {
            min_lateral,
            max_lateral,
            stagger,
        } => rain_slots(n, forward, min_lateral, max_lateral, stagger),
        VolleyLayout::Swarm { stagger } => swarm_slots(n, stagger),
    }
}

/// Builds the full volley for `n` shots.
///
/// `targets` is the result of a nearest-n query; shot `i` takes target `i`
/// (or the last one if the list is shorter). Forward points at the first
/// target, or along `fallback` when there is none.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_volley_dynamics::systems::pattern::plan_volley;
/// use bevy_volley_dynamics::types::{RowSpacing, VolleyLayout};
///
/// let plan = plan_volley(&VolleyLayout::Row(RowSpacing::default()), Vec2::ZERO, Vec2::Y, &[], 2);
/// assert_eq!(plan.shots.len(), 2);
/// assert_eq!(plan.shots[0].position, -plan.shots[1].position);
/// ```
pub fn plan_volley(
    layout: &VolleyLayout,
    origin: Vec2,
    fallback: Vec2,
    targets: &[LiveTarget],
    n: usize,
) -> VolleyPlan {
    let fallback = fallback.normalize_or(Vec2::Y);
    let forward = targets
        .first()
        .map(|primary| (primary.position - origin).normalize_or(fallback))
        .unwrap_or(fallback);
    let lobbed = matches!(layout, VolleyLayout::LobRow(_));

    let shots = layout_slots(layout, n, forward)
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            let position = origin + slot.offset;
            let target = targets.get(i.min(targets.len().saturating_sub(1)));
            let heading = slot.heading.unwrap_or_else(|| {
                target
                    .map(|t| (t.position - position).normalize_or(forward))
                    .unwrap_or(forward)
            });
            PlannedShot {
                position,
                offset: slot.offset,
                delay: slot.delay,
                heading,
                phase: slot.phase,
                target: target.map(|t| t.entity),
                primary: lobbed && i == 0,
            }
        })
        .collect();

    VolleyPlan { forward, shots }
}
