//! Detection события (zone → владелец зоны)

use bevy::prelude::*;
use crate::components::ActorCategory;

/// Enter/exit события detection zone
///
/// Гарантии:
/// - Entered ровно один раз на непрерывное пересечение актора с зоной
/// - Exited ровно один раз при потере пересечения (в том числе при despawn актора)
/// - Событий без живого владельца не бывает
#[derive(Event, Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    Entered {
        /// Владелец зоны (полицейский / грабитель)
        owner: Entity,
        /// Кто вошёл
        actor: Entity,
        category: ActorCategory,
    },

    Exited {
        owner: Entity,
        actor: Entity,
        category: ActorCategory,
    },
}

impl DetectionEvent {
    pub fn owner(&self) -> Entity {
        match self {
            DetectionEvent::Entered { owner, .. } | DetectionEvent::Exited { owner, .. } => *owner,
        }
    }

    pub fn category(&self) -> ActorCategory {
        match self {
            DetectionEvent::Entered { category, .. } | DetectionEvent::Exited { category, .. } => *category,
        }
    }
}
