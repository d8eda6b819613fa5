//! Navigation domain — headless backend для `NavAgent`
//!
//! Прямолинейный steering вместо navmesh pathfinding:
//! 1. Pending путь досчитывается в фазе Navigation (после FSM), так что в тике
//!    смены destination FSM видит `path_pending` (асинхронность как у pathfinder)
//! 2. Агент двигается к destination со скоростью `speed`
//! 3. `remaining_distance` обновляется после движения
//!
//! Host с настоящим pathfinder не добавляет NavigationPlugin и сам пишет
//! `NavAgent::report_progress` + Transform.

use bevy::prelude::*;
use crate::components::NavAgent;

/// Navigation Plugin (headless steering)
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            steer_nav_agents.in_set(crate::SimulationSet::Navigation),
        );
    }
}

/// Система: движение NavAgent → Transform
pub fn steer_nav_agents(mut agents: Query<(&mut NavAgent, &mut Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut agent, mut transform) in agents.iter_mut() {
        if !agent.on_mesh {
            continue;
        }

        let Some(destination) = agent.destination() else {
            continue;
        };

        if !agent.is_stopped {
            transform.translation = step_towards(transform.translation, destination, agent.speed * delta);
        }

        let remaining = transform.translation.distance(destination);
        agent.report_progress(remaining);
    }
}

/// Сдвиг к цели не больше чем на `max_step` (без перелёта)
pub fn step_towards(from: Vec3, to: Vec3, max_step: f32) -> Vec3 {
    let offset = to - from;
    let distance = offset.length();

    if distance <= max_step || distance <= f32::EPSILON {
        to
    } else {
        from + offset / distance * max_step
    }
}
