pub mod ripple;
pub mod wander;

pub use ripple::{Ring, Ripple, RippleEngine, step_ripple};
pub use wander::{WanderItem, WanderParams, WanderScheduler, step_wander};
