//! Detection systems: headless polling и Rapier sensor bridge
//!
//! Оба backend'а сводятся к `ZoneOverlaps::begin/end` → `DetectionEvent`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::CollisionEvent;
use bevy_rapier3d::rapier::prelude::CollisionEventFlags;
use crate::components::{Actor, ActorCategory, ActorTag, PhysicsLayer};
use super::{DetectionEvent, DetectionZone, ZoneOverlaps};

/// Собрать событие для владельца зоны
///
/// Владелец не задан или уже despawned → `None` (событие молча отбрасывается).
pub fn zone_event(
    zone: &DetectionZone,
    owner_alive: impl Fn(Entity) -> bool,
    actor: Entity,
    category: ActorCategory,
    entered: bool,
) -> Option<DetectionEvent> {
    let owner = zone.owner.filter(|owner| owner_alive(*owner))?;

    Some(if entered {
        DetectionEvent::Entered { owner, actor, category }
    } else {
        DetectionEvent::Exited { owner, actor, category }
    })
}

/// Система: poll сферических зон (headless backend)
///
/// Каждый тик: считаем кто сейчас внутри → сравниваем с ZoneOverlaps → events.
/// Despawned актор просто пропадает из текущего набора → Exited.
pub fn poll_detection_zones(
    mut zones: Query<(Entity, &DetectionZone, &mut ZoneOverlaps)>,
    actors: Query<(Entity, &Transform, Option<&ActorTag>, Option<&PhysicsLayer>), With<Actor>>,
    transforms: Query<&Transform>,
    entities: Query<Entity>,
    mut events: EventWriter<DetectionEvent>,
) {
    let owner_alive = |owner: Entity| entities.contains(owner);

    for (zone_entity, zone, mut overlaps) in zones.iter_mut() {
        // Центр зоны: позиция владельца (Actor не обязателен), иначе своя.
        // У ChildOf зоны свой Transform локальный, поэтому владелец приоритетнее.
        let Some(center) = zone
            .owner
            .and_then(|owner| transforms.get(owner).ok())
            .or_else(|| transforms.get(zone_entity).ok())
            .map(|transform| transform.translation + zone.offset)
        else {
            continue;
        };

        let radius_sq = zone.radius * zone.radius;

        let current: Vec<(Entity, ActorCategory)> = actors
            .iter()
            .filter(|(actor, ..)| Some(*actor) != zone.owner && *actor != zone_entity)
            .filter(|(_, transform, ..)| transform.translation.distance_squared(center) <= radius_sq)
            .filter_map(|(actor, _, tag, layer)| zone.filter.classify(tag, layer).map(|category| (actor, category)))
            .collect();

        // Exited: были внутри, сейчас нет
        let lost: Vec<Entity> = overlaps
            .iter()
            .filter(|(tracked, _)| !current.iter().any(|(actor, _)| actor == tracked))
            .map(|(tracked, _)| *tracked)
            .collect();

        for actor in lost {
            if let Some(category) = overlaps.end(actor) {
                if let Some(event) = zone_event(zone, owner_alive, actor, category, false) {
                    events.write(event);
                }
            }
        }

        // Entered: новые
        for (actor, category) in current {
            if overlaps.begin(actor, category) {
                if let Some(event) = zone_event(zone, owner_alive, actor, category, true) {
                    events.write(event);
                }
            }
        }
    }
}

/// Система: Rapier sensor contacts → DetectionEvent (Rapier backend)
///
/// Требует RapierPhysicsPlugin у host (иначе CollisionEvent не зарегистрирован).
/// Повторные Started/Stopped для той же пары — no-op через ZoneOverlaps.
pub fn collect_sensor_contacts(
    mut collisions: EventReader<CollisionEvent>,
    mut zones: Query<(&DetectionZone, &mut ZoneOverlaps)>,
    actors: Query<(Option<&ActorTag>, Option<&PhysicsLayer>), With<Actor>>,
    entities: Query<Entity>,
    mut events: EventWriter<DetectionEvent>,
) {
    let owner_alive = |owner: Entity| entities.contains(owner);

    for collision in collisions.read() {
        let (first, second, flags, started) = match collision {
            CollisionEvent::Started(first, second, flags) => (*first, *second, *flags, true),
            CollisionEvent::Stopped(first, second, flags) => (*first, *second, *flags, false),
        };

        if !flags.contains(CollisionEventFlags::SENSOR) {
            continue;
        }

        // Зоной может быть любая из сторон контакта
        for (zone_entity, actor) in [(first, second), (second, first)] {
            let Ok((zone, mut overlaps)) = zones.get_mut(zone_entity) else {
                continue;
            };

            if zone.owner == Some(actor) {
                continue;
            }

            if started {
                let Ok((tag, layer)) = actors.get(actor) else {
                    continue;
                };
                let Some(category) = zone.filter.classify(tag, layer) else {
                    continue;
                };
                if overlaps.begin(actor, category) {
                    if let Some(event) = zone_event(zone, owner_alive, actor, category, true) {
                        events.write(event);
                    }
                }
            } else if let Some(category) = overlaps.end(actor) {
                if let Some(event) = zone_event(zone, owner_alive, actor, category, false) {
                    events.write(event);
                }
            }
        }
    }
}
