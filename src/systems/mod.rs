//! Systems module - all ECS systems and routines for the volley simulation.

pub mod choreographer;
pub mod collision;
pub mod debug;
pub mod flight;
pub mod motion;
pub mod pattern;
pub mod targeting;
