//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: категории, tags, физические слои, укрытия
//! - movement: навигационный агент (NavAgent)

pub mod actor;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
