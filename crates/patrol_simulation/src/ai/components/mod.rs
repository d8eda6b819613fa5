//! AI components (police / robber FSM)

mod police;
mod robber;


// Re-export all components
pub use police::*;
pub use robber::*;
