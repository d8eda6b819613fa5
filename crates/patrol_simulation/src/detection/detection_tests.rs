//! Tests for detection zones (classification, overlap tracking, polling).

use bevy::ecs::event::Events;
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy_rapier3d::prelude::CollisionEvent;
use bevy_rapier3d::rapier::prelude::CollisionEventFlags;

use super::*;
use crate::components::{Actor, ActorCategory, ActorTag, PhysicsLayer};
use crate::layers::{LayerMask, LAYER_POLICE, LAYER_ROBBER};

fn robber_filter() -> ZoneFilter {
    ZoneFilter::for_category(ActorCategory::Robber)
}

fn spawn_actor(world: &mut World, category: ActorCategory, tag: &str, layer: u8, position: Vec3) -> Entity {
    world
        .spawn((
            Actor { category },
            ActorTag::new(tag),
            PhysicsLayer(layer),
            Transform::from_translation(position),
        ))
        .id()
}

/// Прогнать poll один раз и забрать события
fn poll(world: &mut World) -> Vec<DetectionEvent> {
    world.run_system_once(poll_detection_zones).unwrap();
    let mut events = world.resource_mut::<Events<DetectionEvent>>();
    let collected: Vec<DetectionEvent> = events.iter_current_update_events().cloned().collect();
    events.clear();
    collected
}

fn setup_world() -> (World, Entity, Entity) {
    let mut world = World::new();
    world.init_resource::<Events<DetectionEvent>>();

    let police = spawn_actor(&mut world, ActorCategory::Police, "Police", LAYER_POLICE, Vec3::ZERO);
    let zone = world
        .spawn((DetectionZone::new(robber_filter(), 5.0, Some(police)), Transform::default()))
        .id();

    (world, police, zone)
}

#[test]
fn test_classify_matches_tag() {
    let filter = robber_filter();
    let tag = ActorTag::new("Robber");

    assert_eq!(filter.classify(Some(&tag), None), Some(ActorCategory::Robber));
}

#[test]
fn test_classify_matches_layer_without_tag() {
    let filter = robber_filter();
    let untagged = ActorTag::new("Untagged");

    assert_eq!(
        filter.classify(Some(&untagged), Some(&PhysicsLayer(LAYER_ROBBER))),
        Some(ActorCategory::Robber)
    );
    assert_eq!(filter.classify(None, Some(&PhysicsLayer(LAYER_POLICE))), None);
}

#[test]
fn test_classify_empty_mask_uses_tag_only() {
    let filter = ZoneFilter::new(ActorCategory::Police, "Police", LayerMask::NONE);

    assert_eq!(filter.classify(None, Some(&PhysicsLayer(LAYER_POLICE))), None);
    assert_eq!(
        filter.classify(Some(&ActorTag::new("Police")), None),
        Some(ActorCategory::Police)
    );
}

#[test]
fn test_overlaps_begin_end_idempotent() {
    let mut overlaps = ZoneOverlaps::default();
    let actor = Entity::from_raw(7);

    assert!(overlaps.begin(actor, ActorCategory::Robber));
    assert!(!overlaps.begin(actor, ActorCategory::Robber));
    assert_eq!(overlaps.len(), 1);

    assert_eq!(overlaps.end(actor), Some(ActorCategory::Robber));
    assert_eq!(overlaps.end(actor), None);
    assert!(overlaps.is_empty());
}

#[test]
fn test_zone_event_dropped_without_owner() {
    let zone = DetectionZone::new(robber_filter(), 5.0, None);

    let event = zone_event(&zone, |_| true, Entity::from_raw(1), ActorCategory::Robber, true);

    assert!(event.is_none());
}

#[test]
fn test_zone_event_dropped_for_despawned_owner() {
    let zone = DetectionZone::new(robber_filter(), 5.0, Some(Entity::from_raw(3)));

    let event = zone_event(&zone, |_| false, Entity::from_raw(1), ActorCategory::Robber, false);

    assert!(event.is_none());
}

#[test]
fn test_poll_enter_once_then_exit_once() {
    let (mut world, police, _zone) = setup_world();
    let robber = spawn_actor(&mut world, ActorCategory::Robber, "Robber", LAYER_ROBBER, Vec3::new(3.0, 0.0, 0.0));

    let events = poll(&mut world);
    assert_eq!(
        events,
        vec![DetectionEvent::Entered { owner: police, actor: robber, category: ActorCategory::Robber }]
    );

    // Непрерывное пересечение — повторных Entered нет
    assert!(poll(&mut world).is_empty());

    world.entity_mut(robber).insert(Transform::from_xyz(20.0, 0.0, 0.0));
    let events = poll(&mut world);
    assert_eq!(
        events,
        vec![DetectionEvent::Exited { owner: police, actor: robber, category: ActorCategory::Robber }]
    );
    assert!(poll(&mut world).is_empty());
}

#[test]
fn test_poll_despawned_actor_exits() {
    let (mut world, police, _zone) = setup_world();
    let robber = spawn_actor(&mut world, ActorCategory::Robber, "Robber", LAYER_ROBBER, Vec3::new(1.0, 0.0, 0.0));
    poll(&mut world);

    world.despawn(robber);

    let events = poll(&mut world);
    assert_eq!(
        events,
        vec![DetectionEvent::Exited { owner: police, actor: robber, category: ActorCategory::Robber }]
    );
}

#[test]
fn test_poll_ignores_unmatched_actors() {
    let (mut world, _police, _zone) = setup_world();
    spawn_actor(&mut world, ActorCategory::Police, "Police", LAYER_POLICE, Vec3::new(1.0, 0.0, 0.0));

    assert!(poll(&mut world).is_empty());
}

#[test]
fn test_poll_never_detects_owner() {
    let mut world = World::new();
    world.init_resource::<Events<DetectionEvent>>();

    let robber = spawn_actor(&mut world, ActorCategory::Robber, "Robber", LAYER_ROBBER, Vec3::ZERO);
    world.spawn((DetectionZone::new(robber_filter(), 5.0, Some(robber)), Transform::default()));

    assert!(poll(&mut world).is_empty());
}

#[test]
fn test_poll_zone_without_owner_is_silent() {
    let mut world = World::new();
    world.init_resource::<Events<DetectionEvent>>();

    let zone = world
        .spawn((DetectionZone::new(robber_filter(), 5.0, None), Transform::default()))
        .id();
    spawn_actor(&mut world, ActorCategory::Robber, "Robber", LAYER_ROBBER, Vec3::new(1.0, 0.0, 0.0));

    assert!(poll(&mut world).is_empty());
    // Пересечение всё равно отслеживается, только события не уходят
    assert_eq!(world.get::<ZoneOverlaps>(zone).map(|o| o.len()), Some(1));
}

#[test]
fn test_poll_zone_follows_owner() {
    let (mut world, police, _zone) = setup_world();
    let robber = spawn_actor(&mut world, ActorCategory::Robber, "Robber", LAYER_ROBBER, Vec3::new(30.0, 0.0, 0.0));
    assert!(poll(&mut world).is_empty());

    world.entity_mut(police).insert(Transform::from_xyz(28.0, 0.0, 0.0));

    let events = poll(&mut world);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], DetectionEvent::Entered { actor, .. } if actor == robber));
}

#[test]
fn test_poll_zone_uses_owner_without_actor() {
    let mut world = World::new();
    world.init_resource::<Events<DetectionEvent>>();

    // Владелец — просто точка на карте (камера, триггер), без Actor
    let owner = world.spawn(Transform::from_xyz(20.0, 0.0, 0.0)).id();
    world.spawn((
        DetectionZone::new(robber_filter(), 5.0, Some(owner)),
        Transform::default(),
        ChildOf(owner),
    ));
    spawn_actor(&mut world, ActorCategory::Robber, "Robber", LAYER_ROBBER, Vec3::ZERO);
    let near = spawn_actor(&mut world, ActorCategory::Robber, "Robber", LAYER_ROBBER, Vec3::new(21.0, 0.0, 0.0));

    let events = poll(&mut world);
    assert_eq!(
        events,
        vec![DetectionEvent::Entered { owner, actor: near, category: ActorCategory::Robber }]
    );
}

/// Отправить Rapier события и прогнать bridge один раз
fn sensor_contacts(world: &mut World, collisions: Vec<CollisionEvent>) -> Vec<DetectionEvent> {
    world.resource_mut::<Events<CollisionEvent>>().send_batch(collisions);
    world.run_system_once(collect_sensor_contacts).unwrap();

    let mut events = world.resource_mut::<Events<DetectionEvent>>();
    let collected: Vec<DetectionEvent> = events.iter_current_update_events().cloned().collect();
    events.clear();
    collected
}

#[test]
fn test_sensor_contacts_enter_and_exit_once() {
    let (mut world, police, zone) = setup_world();
    world.init_resource::<Events<CollisionEvent>>();
    let robber = spawn_actor(&mut world, ActorCategory::Robber, "Robber", LAYER_ROBBER, Vec3::new(3.0, 0.0, 0.0));

    let sensor = CollisionEventFlags::SENSOR;
    let removed = CollisionEventFlags::SENSOR | CollisionEventFlags::REMOVED;

    // Зона с любой стороны контакта, дубликат и владелец — одно Entered
    let events = sensor_contacts(
        &mut world,
        vec![
            CollisionEvent::Started(robber, zone, sensor),
            CollisionEvent::Started(zone, robber, sensor),
            CollisionEvent::Started(zone, police, sensor),
        ],
    );
    assert_eq!(
        events,
        vec![DetectionEvent::Entered { owner: police, actor: robber, category: ActorCategory::Robber }]
    );

    // Коллайдер удалён (REMOVED) + повторный Stopped — одно Exited
    let events = sensor_contacts(
        &mut world,
        vec![
            CollisionEvent::Stopped(zone, robber, removed),
            CollisionEvent::Stopped(robber, zone, sensor),
        ],
    );
    assert_eq!(
        events,
        vec![DetectionEvent::Exited { owner: police, actor: robber, category: ActorCategory::Robber }]
    );
    assert_eq!(world.get::<ZoneOverlaps>(zone).map(|o| o.len()), Some(0));
}

#[test]
fn test_sensor_contacts_ignore_solid_contacts() {
    let (mut world, _police, zone) = setup_world();
    world.init_resource::<Events<CollisionEvent>>();
    let robber = spawn_actor(&mut world, ActorCategory::Robber, "Robber", LAYER_ROBBER, Vec3::new(3.0, 0.0, 0.0));

    let events = sensor_contacts(
        &mut world,
        vec![CollisionEvent::Started(robber, zone, CollisionEventFlags::empty())],
    );

    assert!(events.is_empty());
    assert_eq!(world.get::<ZoneOverlaps>(zone).map(|o| o.len()), Some(0));
}
