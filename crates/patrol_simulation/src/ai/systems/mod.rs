//! AI systems: setup validation, detection reactions, FSM ticks.

mod police;
mod robber;
mod setup;

// Re-export all systems
pub use police::*;
pub use robber::*;
pub use setup::*;
