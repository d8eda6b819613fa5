//! Traffic компоненты: спавнер машин и сама машина

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::waypoint::PathPoint;

/// Параметры спавнера (author-time)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct SpawnerConfig {
    /// Базовый интервал между машинами (секунды)
    pub spawn_interval: f32,
    /// Случайный разброс интервала: ± jitter (секунды)
    pub interval_jitter: f32,
    /// Лимит одновременно живых машин этого спавнера
    pub max_vehicles: usize,
    /// Крейсерская скорость машины (m/s)
    pub vehicle_speed: f32,
    /// Множитель скорости в slow-down зонах
    pub slow_down_factor: f32,
    /// Дистанция "доехал до точки" (метры)
    pub reach_distance: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 4.0,
            interval_jitter: 1.0,
            max_vehicles: 6,
            vehicle_speed: 8.0,
            slow_down_factor: 0.5,
            reach_distance: 1.5,
        }
    }
}

/// Спавнер машин: round-robin по своим маршрутам
#[derive(Component, Debug, Clone)]
pub struct VehicleSpawner {
    pub config: SpawnerConfig,
    /// Entities с `WaypointPath`
    pub paths: Vec<Entity>,
    /// Сколько осталось до следующего спавна (секунды)
    timer: f32,
    next_path: usize,
}

impl VehicleSpawner {
    /// Первая машина появляется на первом же тике
    pub fn new(config: SpawnerConfig, paths: Vec<Entity>) -> Self {
        Self {
            config,
            paths,
            timer: 0.0,
            next_path: 0,
        }
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Тикнуть таймер; true когда пора спавнить
    pub fn tick_timer(&mut self, delta: f32) -> bool {
        self.timer -= delta;
        self.timer <= 0.0
    }

    /// Следующий интервал: `spawn_interval ± jitter`, не меньше нуля
    pub fn restart_timer(&mut self, rng: &mut impl Rng) {
        let jitter = self.config.interval_jitter.abs();
        let offset = if jitter > 0.0 { rng.gen_range(-jitter..=jitter) } else { 0.0 };
        self.timer = (self.config.spawn_interval + offset).max(0.0);
    }

    /// Следующий пригодный маршрут по кругу (непригодные пропускаются)
    pub fn next_usable_path(&mut self, usable: impl Fn(Entity) -> bool) -> Option<Entity> {
        let count = self.paths.len();

        for offset in 0..count {
            let index = (self.next_path + offset) % count;
            let path = self.paths[index];
            if usable(path) {
                self.next_path = (index + 1) % count;
                return Some(path);
            }
        }

        None
    }
}

/// Машина, едущая по маршруту (PathFollower + NavAgent на той же entity)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Vehicle {
    /// Кто заспавнил (для лимита max_vehicles)
    pub spawner: Entity,
    pub cruise_speed: f32,
    pub slow_down_factor: f32,
    pub reach_distance: f32,
}

impl Vehicle {
    pub fn from_spawner(spawner: Entity, config: &SpawnerConfig) -> Self {
        Self {
            spawner,
            cruise_speed: config.vehicle_speed,
            slow_down_factor: config.slow_down_factor,
            reach_distance: config.reach_distance,
        }
    }

    /// Скорость на участке к точке `point`
    ///
    /// min(крейсерская, лимит точки), в slow-down зоне ещё × slow_down_factor.
    pub fn speed_towards(&self, point: &PathPoint) -> f32 {
        let speed = self.cruise_speed.min(point.speed_limit);
        if point.is_slow_down_zone {
            speed * self.slow_down_factor
        } else {
            speed
        }
    }
}
