//! Базовые компоненты акторов: Actor, ActorTag, PhysicsLayer, CoverPoint

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Категория актора, которую распознают detection zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum ActorCategory {
    Police,
    Robber,
}

impl ActorCategory {
    /// Tag по умолчанию для категории
    pub fn default_tag(&self) -> &'static str {
        match self {
            ActorCategory::Police => "Police",
            ActorCategory::Robber => "Robber",
        }
    }
}

/// Актор симуляции (полицейский, грабитель)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Actor {
    pub category: ActorCategory,
}

/// Строковый tag актора (как tag в сцене)
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ActorTag(pub String);

impl ActorTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Физический слой объекта (индекс 0..32, см. `crate::layers`)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct PhysicsLayer(pub u8);

/// Укрытие: статичный объект, к которому грабитель может убежать и спрятаться
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct CoverPoint;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tags() {
        assert_eq!(ActorCategory::Police.default_tag(), "Police");
        assert_eq!(ActorCategory::Robber.default_tag(), "Robber");
    }

    #[test]
    fn test_actor_tag_as_str() {
        let tag = ActorTag::new("Robber");
        assert_eq!(tag.as_str(), "Robber");
    }
}
