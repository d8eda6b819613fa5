//! Tests for vehicle spawner and driving.

use std::time::Duration;

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::components::NavAgent;
use crate::error::{AgentDisabled, SetupError};
use crate::waypoint::{PathFollower, PathPoint, WaypointPath};
use crate::DeterministicRng;

fn world_with_time(delta: f32) -> World {
    let mut world = World::new();
    let mut time = Time::<Fixed>::from_seconds(delta as f64);
    time.advance_by(Duration::from_secs_f32(delta));
    world.insert_resource(time);
    world.insert_resource(DeterministicRng::new(7));
    world
}

fn vehicle_count(world: &mut World) -> usize {
    world.query::<&Vehicle>().iter(world).count()
}

#[test]
fn test_round_robin_skips_unusable_paths() {
    let paths = vec![Entity::from_raw(1), Entity::from_raw(2), Entity::from_raw(3)];
    let mut spawner = VehicleSpawner::new(SpawnerConfig::default(), paths.clone());
    let usable = |path: Entity| path != paths[1];

    assert_eq!(spawner.next_usable_path(usable), Some(paths[0]));
    assert_eq!(spawner.next_usable_path(usable), Some(paths[2]));
    assert_eq!(spawner.next_usable_path(usable), Some(paths[0]));
}

#[test]
fn test_no_usable_path() {
    let mut spawner = VehicleSpawner::new(SpawnerConfig::default(), vec![Entity::from_raw(1)]);
    assert_eq!(spawner.next_usable_path(|_| false), None);

    let mut empty = VehicleSpawner::new(SpawnerConfig::default(), Vec::new());
    assert_eq!(empty.next_usable_path(|_| true), None);
}

#[test]
fn test_restart_timer_within_jitter() {
    let config = SpawnerConfig {
        spawn_interval: 4.0,
        interval_jitter: 1.0,
        ..default()
    };
    let mut spawner = VehicleSpawner::new(config, Vec::new());
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    for _ in 0..100 {
        spawner.restart_timer(&mut rng);
        assert!((3.0..=5.0).contains(&spawner.timer()), "timer = {}", spawner.timer());
    }
}

#[test]
fn test_restart_timer_without_jitter_is_exact() {
    let config = SpawnerConfig {
        spawn_interval: 2.5,
        interval_jitter: 0.0,
        ..default()
    };
    let mut spawner = VehicleSpawner::new(config, Vec::new());
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    spawner.restart_timer(&mut rng);
    assert_eq!(spawner.timer(), 2.5);
}

#[test]
fn test_vehicle_speed_respects_limits() {
    let vehicle = Vehicle::from_spawner(Entity::PLACEHOLDER, &SpawnerConfig::default());

    let open_road = PathPoint::new(Vec3::ZERO).with_speed_limit(20.0);
    let limited = PathPoint::new(Vec3::ZERO).with_speed_limit(5.0);
    let school_zone = PathPoint::new(Vec3::ZERO).with_speed_limit(5.0).slow_down_zone();

    assert_eq!(vehicle.speed_towards(&open_road), 8.0);
    assert_eq!(vehicle.speed_towards(&limited), 5.0);
    assert_eq!(vehicle.speed_towards(&school_zone), 2.5);
}

#[test]
fn test_spawner_respects_max_vehicles() {
    let mut world = world_with_time(1.0);
    let path = world
        .spawn(WaypointPath::from_positions([Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0)], true))
        .id();
    let config = SpawnerConfig {
        spawn_interval: 0.5,
        interval_jitter: 0.0,
        max_vehicles: 2,
        ..default()
    };
    world.spawn(VehicleSpawner::new(config, vec![path]));

    for _ in 0..5 {
        world.run_system_once(spawn_vehicles).unwrap();
    }

    assert_eq!(vehicle_count(&mut world), 2);
}

#[test]
fn test_spawner_without_usable_path_is_disabled() {
    let mut world = world_with_time(1.0);
    let empty_path = world.spawn(WaypointPath::new(Vec::new(), false)).id();
    let spawner = world.spawn(VehicleSpawner::new(SpawnerConfig::default(), vec![empty_path])).id();

    world.run_system_once(spawn_vehicles).unwrap();

    let reason = world.get::<AgentDisabled>(spawner).map(|d| d.reason.clone());
    assert_eq!(reason, Some(SetupError::NoUsablePath(spawner)));
    assert_eq!(vehicle_count(&mut world), 0);
}

#[test]
fn test_vehicle_waits_at_stop_point() {
    let mut world = world_with_time(0.5);
    let path = world
        .spawn(WaypointPath::new(
            vec![
                PathPoint::new(Vec3::ZERO).stop_point(1.0),
                PathPoint::new(Vec3::new(20.0, 0.0, 0.0)),
            ],
            true,
        ))
        .id();
    let vehicle = world
        .spawn((
            Vehicle::from_spawner(Entity::PLACEHOLDER, &SpawnerConfig::default()),
            PathFollower::new(path),
            NavAgent::default(),
            Transform::default(),
        ))
        .id();

    world.run_system_once(drive_vehicles).unwrap();
    assert!(world.get::<NavAgent>(vehicle).is_some_and(|nav| nav.is_stopped));

    world.run_system_once(drive_vehicles).unwrap();
    world.run_system_once(drive_vehicles).unwrap();

    let nav = world.get::<NavAgent>(vehicle).unwrap();
    assert!(!nav.is_stopped);
    assert_eq!(nav.destination(), Some(Vec3::new(20.0, 0.0, 0.0)));
}

#[test]
fn test_vehicle_despawns_at_end_of_open_path() {
    let mut world = world_with_time(0.1);
    let path = world
        .spawn(WaypointPath::from_positions([Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)], false))
        .id();
    let mut follower = PathFollower::new(path);
    follower.index = 1;
    let vehicle = world
        .spawn((
            Vehicle::from_spawner(Entity::PLACEHOLDER, &SpawnerConfig::default()),
            follower,
            NavAgent::default(),
            Transform::from_xyz(10.0, 0.0, 0.0),
        ))
        .id();

    world.run_system_once(drive_vehicles).unwrap();

    assert!(world.get_entity(vehicle).is_err());
}
