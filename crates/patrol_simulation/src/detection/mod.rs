//! Detection domain — trigger volumes, которые сообщают владельцу кто вошёл/вышел
//!
//! Flow:
//! physics backend (sphere poll / Rapier sensors) → ZoneOverlaps → DetectionEvent
//! → реакции FSM (ai::police, ai::robber)
//!
//! Классификация: tag ИЛИ слой (`ZoneFilter::classify`), одна на все зоны.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

#[cfg(test)]
mod detection_tests;

pub use components::*;
pub use events::*;
pub use systems::*;

/// Откуда берутся пересечения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionBackend {
    /// Сферические проверки по Transform каждый тик (без физики)
    #[default]
    Headless,
    /// Rapier sensor colliders (host добавляет RapierPhysicsPlugin)
    Rapier,
}

/// Detection Plugin
#[derive(Default)]
pub struct DetectionPlugin {
    pub backend: DetectionBackend,
}

impl Plugin for DetectionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DetectionEvent>();

        match self.backend {
            DetectionBackend::Headless => {
                app.add_systems(
                    FixedUpdate,
                    poll_detection_zones.in_set(crate::SimulationSet::Detection),
                );
            }
            DetectionBackend::Rapier => {
                app.add_systems(
                    FixedUpdate,
                    collect_sensor_contacts.in_set(crate::SimulationSet::Detection),
                );
            }
        }
    }
}
