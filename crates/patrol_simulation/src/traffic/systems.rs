//! Traffic systems: спавн машин по таймеру и движение по маршруту

use bevy::prelude::*;
use crate::components::{NavAgent, PhysicsLayer};
use crate::error::{AgentDisabled, SetupError};
use crate::layers::LAYER_VEHICLE;
use crate::waypoint::{FollowStep, PathFollower, WaypointPath};
use crate::DeterministicRng;
use super::{Vehicle, VehicleSpawner};

/// Система: спавн машин
///
/// Лимит `max_vehicles` считается по живым машинам спавнера. Таймер на паузе
/// пока лимит достигнут (машина появится сразу как освободится место).
pub fn spawn_vehicles(
    mut commands: Commands,
    mut spawners: Query<(Entity, &mut VehicleSpawner), Without<AgentDisabled>>,
    vehicles: Query<&Vehicle>,
    paths: Query<&WaypointPath>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (spawner_entity, mut spawner) in spawners.iter_mut() {
        let alive = vehicles.iter().filter(|vehicle| vehicle.spawner == spawner_entity).count();
        if alive >= spawner.config.max_vehicles {
            continue;
        }

        if !spawner.tick_timer(delta) {
            continue;
        }

        let usable = |path: Entity| paths.get(path).is_ok_and(|path| !path.is_empty());
        let Some(path_entity) = spawner.next_usable_path(usable) else {
            let reason = SetupError::NoUsablePath(spawner_entity);
            crate::log_error(&format!("❌ Vehicle spawner disabled: {}", reason));
            commands.entity(spawner_entity).insert(AgentDisabled { reason });
            continue;
        };

        let Some(start) = paths.get(path_entity).ok().and_then(|path| path.point_at(0)) else {
            continue;
        };

        let vehicle = Vehicle::from_spawner(spawner_entity, &spawner.config);
        let speed = vehicle.speed_towards(start);

        let id = commands
            .spawn((
                vehicle,
                PathFollower::new(path_entity),
                NavAgent::with_speed(speed),
                PhysicsLayer(LAYER_VEHICLE),
                Transform::from_translation(start.position),
            ))
            .id();

        spawner.restart_timer(&mut rng.rng);

        crate::log_info(&format!(
            "🚗 Vehicle {:?} spawned on path {:?} ({}/{} alive), next in {:.2}s",
            id,
            path_entity,
            alive + 1,
            spawner.config.max_vehicles,
            spawner.timer()
        ));
    }
}

/// Система: машины едут по маршруту
///
/// Stop point → стоим `stop_duration`; конец не закольцованного маршрута → despawn.
pub fn drive_vehicles(
    mut commands: Commands,
    mut vehicles: Query<(Entity, &Vehicle, &mut PathFollower, &mut NavAgent, &Transform)>,
    paths: Query<&WaypointPath>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, vehicle, mut follower, mut nav, transform) in vehicles.iter_mut() {
        let Ok(path) = paths.get(follower.path) else {
            // Маршрут удалён — машине некуда ехать
            commands.entity(entity).despawn();
            continue;
        };

        let step = follower.step(path, transform.translation, vehicle.reach_distance, delta);

        match step {
            FollowStep::Heading(target) => {
                if let Some(point) = path.point_at(follower.index) {
                    nav.speed = vehicle.speed_towards(point);
                }
                nav.is_stopped = false;
                nav.set_destination(target);
            }
            FollowStep::Waiting(_) => {
                nav.is_stopped = true;
            }
            FollowStep::Holding(_) if follower.finished && !path.is_looping => {
                crate::log_info(&format!("🏁 Vehicle {:?} reached end of path, despawning", entity));
                commands.entity(entity).despawn();
            }
            FollowStep::Holding(_) | FollowStep::NoPath => {
                nav.is_stopped = true;
            }
        }
    }
}
