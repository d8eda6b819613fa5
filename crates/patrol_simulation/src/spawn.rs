//! Spawn helpers: сборка агентов из компонентов
//!
//! Полицейский / грабитель = Actor + NavAgent + PathFollower + brain + config,
//! detection zone — отдельная child entity (owner = агент).
//! Rapier backend дополнительно получает kinematic body и sensor collider.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ActiveCollisionTypes, ActiveEvents, Collider, RigidBody, Sensor};
use crate::ai::{PoliceBrain, PoliceConfig, RobberBrain, RobberConfig};
use crate::components::{Actor, ActorCategory, ActorTag, CoverPoint, NavAgent, PhysicsLayer};
use crate::detection::{DetectionBackend, DetectionZone, ZoneFilter};
use crate::layers::{self, LayerMask, LAYER_COVER, LAYER_POLICE, LAYER_ROBBER};
use crate::traffic::{SpawnerConfig, VehicleSpawner};
use crate::waypoint::{PathFollower, WaypointPath};
use crate::wildlife::{WanderConfig, Wanderer};

pub fn spawn_path(world: &mut World, path: WaypointPath) -> Entity {
    world.spawn(path).id()
}

/// Полицейский на маршруте `path`; зона видит грабителей в `detection_radius`
pub fn spawn_police(
    world: &mut World,
    position: Vec3,
    path: Entity,
    config: PoliceConfig,
    backend: DetectionBackend,
) -> Entity {
    let radius = config.detection_radius;
    let nav = NavAgent::with_speed(config.patrol_speed);

    let police = world
        .spawn((
            Actor { category: ActorCategory::Police },
            ActorTag::new(ActorCategory::Police.default_tag()),
            PhysicsLayer(LAYER_POLICE),
            Transform::from_translation(position),
            nav,
            PathFollower::new(path),
            config,
            PoliceBrain::default(),
        ))
        .id();

    attach_zone(world, police, ActorCategory::Robber, LAYER_POLICE, radius, backend);
    police
}

/// Грабитель на маршруте `path`; зона видит полицию в `detection_radius`
pub fn spawn_robber(
    world: &mut World,
    position: Vec3,
    path: Entity,
    config: RobberConfig,
    backend: DetectionBackend,
) -> Entity {
    let radius = config.detection_radius;
    let nav = NavAgent::with_speed(config.walk_speed);

    let robber = world
        .spawn((
            Actor { category: ActorCategory::Robber },
            ActorTag::new(ActorCategory::Robber.default_tag()),
            PhysicsLayer(LAYER_ROBBER),
            Transform::from_translation(position),
            nav,
            PathFollower::new(path),
            config,
            RobberBrain::default(),
        ))
        .id();

    attach_zone(world, robber, ActorCategory::Police, LAYER_ROBBER, radius, backend);
    robber
}

pub fn spawn_cover(world: &mut World, position: Vec3, backend: DetectionBackend) -> Entity {
    let cover = world
        .spawn((CoverPoint, PhysicsLayer(LAYER_COVER), Transform::from_translation(position)))
        .id();

    if backend == DetectionBackend::Rapier {
        world.entity_mut(cover).insert((
            RigidBody::Fixed,
            Collider::cuboid(1.0, 1.0, 1.0),
            layers::collision_groups(LAYER_COVER, LayerMask::ALL),
        ));
    }

    cover
}

pub fn spawn_vehicle_spawner(world: &mut World, config: SpawnerConfig, paths: Vec<Entity>) -> Entity {
    world.spawn(VehicleSpawner::new(config, paths)).id()
}

pub fn spawn_wanderer(world: &mut World, home: Vec3, config: WanderConfig) -> Entity {
    let nav = NavAgent::with_speed(config.speed);
    world
        .spawn((
            Wanderer::new(home, config),
            nav,
            PhysicsLayer(layers::LAYER_WILDLIFE),
            Transform::from_translation(home),
        ))
        .id()
}

fn attach_zone(
    world: &mut World,
    owner: Entity,
    detects: ActorCategory,
    owner_layer: u8,
    radius: f32,
    backend: DetectionBackend,
) -> Entity {
    let filter = ZoneFilter::for_category(detects);
    let mask = filter.layer_mask;

    let zone = world
        .spawn((
            DetectionZone::new(filter, radius, Some(owner)),
            Transform::default(),
            ChildOf(owner),
        ))
        .id();

    if backend == DetectionBackend::Rapier {
        world.entity_mut(owner).insert((
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(0.5, 0.4),
            layers::collision_groups(owner_layer, LayerMask::ALL),
        ));
        world.entity_mut(zone).insert((
            Collider::ball(radius),
            Sensor,
            ActiveEvents::COLLISION_EVENTS,
            ActiveCollisionTypes::default() | ActiveCollisionTypes::KINEMATIC_KINEMATIC,
            layers::collision_groups(owner_layer, mask),
        ));
    }

    zone
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_police_gets_robber_zone() {
        let mut world = World::new();
        let path = spawn_path(&mut world, WaypointPath::from_positions([Vec3::ZERO], true));

        let police = spawn_police(&mut world, Vec3::ZERO, path, PoliceConfig::default(), DetectionBackend::Headless);

        let zones: Vec<&DetectionZone> = world.query::<&DetectionZone>().iter(&world).collect();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].owner, Some(police));
        assert_eq!(zones[0].filter.category, ActorCategory::Robber);
        assert_eq!(zones[0].radius, PoliceConfig::default().detection_radius);
    }

    #[test]
    fn test_headless_spawn_has_no_colliders() {
        let mut world = World::new();
        let path = spawn_path(&mut world, WaypointPath::from_positions([Vec3::ZERO], true));

        let robber = spawn_robber(&mut world, Vec3::ZERO, path, RobberConfig::default(), DetectionBackend::Headless);

        assert!(world.get::<Collider>(robber).is_none());
        assert_eq!(world.get::<PhysicsLayer>(robber), Some(&PhysicsLayer(LAYER_ROBBER)));
    }
}
