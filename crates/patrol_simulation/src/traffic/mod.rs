//! Traffic domain — фоновые машины на маршрутах
//!
//! VehicleSpawner спавнит машины (round-robin по маршрутам, интервал ± jitter
//! из DeterministicRng), машины едут через тот же PathFollower что и патруль.

use bevy::prelude::*;

pub mod components;
pub mod systems;

#[cfg(test)]
mod traffic_tests;

pub use components::*;
pub use systems::*;

/// Traffic Plugin
pub struct TrafficPlugin;

impl Plugin for TrafficPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Vehicle>().add_systems(
            FixedUpdate,
            (spawn_vehicles, drive_vehicles)
                .chain()
                .in_set(crate::SimulationSet::Traffic),
        );
    }
}
