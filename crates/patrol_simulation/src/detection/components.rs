//! Detection zone компоненты: фильтр, зона, отслеживаемые пересечения

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::components::{ActorCategory, ActorTag, PhysicsLayer};
use crate::layers::LayerMask;

/// Кого распознаёт зона: tag ИЛИ слой (tag проверяется первым)
///
/// Одна реализация classify для зон полиции и грабителей.
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ZoneFilter {
    /// Категория, которую зона сообщает владельцу
    pub category: ActorCategory,
    pub tag: String,
    pub layer_mask: LayerMask,
}

impl ZoneFilter {
    pub fn new(category: ActorCategory, tag: impl Into<String>, layer_mask: LayerMask) -> Self {
        Self {
            category,
            tag: tag.into(),
            layer_mask,
        }
    }

    /// Фильтр по tag категории + её слою
    pub fn for_category(category: ActorCategory) -> Self {
        let layer = match category {
            ActorCategory::Police => crate::layers::LAYER_POLICE,
            ActorCategory::Robber => crate::layers::LAYER_ROBBER,
        };
        Self::new(category, category.default_tag(), LayerMask::from_layer(layer))
    }

    pub fn classify(&self, tag: Option<&ActorTag>, layer: Option<&PhysicsLayer>) -> Option<ActorCategory> {
        if tag.is_some_and(|tag| tag.as_str() == self.tag) {
            return Some(self.category);
        }

        if layer.is_some_and(|layer| self.layer_mask.contains(layer.0)) {
            return Some(self.category);
        }

        None
    }
}

/// Trigger volume (сфера) с владельцем, которому уходят enter/exit события
///
/// Если `owner` не задан или уже despawned — события молча отбрасываются.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(ZoneOverlaps)]
pub struct DetectionZone {
    pub filter: ZoneFilter,
    /// Радиус сферы (метры)
    pub radius: f32,
    /// Смещение центра относительно владельца
    pub offset: Vec3,
    pub owner: Option<Entity>,
}

impl DetectionZone {
    pub fn new(filter: ZoneFilter, radius: f32, owner: Option<Entity>) -> Self {
        Self {
            filter,
            radius,
            offset: Vec3::ZERO,
            owner,
        }
    }
}

/// Акторы, которые сейчас внутри зоны (и прошли classify)
///
/// Нужен только для exactly-once семантики enter/exit.
/// Vec, а не HashSet — порядок exit событий детерминирован.
#[derive(Component, Debug, Clone, Default)]
pub struct ZoneOverlaps {
    actors: Vec<(Entity, ActorCategory)>,
}

impl ZoneOverlaps {
    pub fn contains(&self, actor: Entity) -> bool {
        self.actors.iter().any(|(tracked, _)| *tracked == actor)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Entity, ActorCategory)> {
        self.actors.iter()
    }

    /// not-overlapping → overlapping; false если актор уже внутри
    pub fn begin(&mut self, actor: Entity, category: ActorCategory) -> bool {
        if self.contains(actor) {
            return false;
        }
        self.actors.push((actor, category));
        true
    }

    /// overlapping → not-overlapping; категория для exit события
    pub fn end(&mut self, actor: Entity) -> Option<ActorCategory> {
        let index = self.actors.iter().position(|(tracked, _)| *tracked == actor)?;
        Some(self.actors.remove(index).1)
    }
}
