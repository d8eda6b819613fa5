//! Movement компоненты: навигационный агент

use bevy::prelude::*;

/// Смена destination меньше этого порога не перезапускает расчёт пути
const DESTINATION_EPSILON: f32 = 0.01;

/// Навигационный агент (pathfinding + steering)
///
/// Архитектура:
/// - FSM системы пишут destination / speed / is_stopped (high-level intent)
/// - Backend (headless steering или host pathfinder) считает путь и двигает актора
/// - Расчёт пути асинхронный: `path_pending` поллится, никогда не блокирует тик
///
/// Новый destination помечает путь pending до следующего тика backend'а.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    destination: Option<Vec3>,
    remaining_distance: f32,
    path_pending: bool,
    /// Скорость движения (m/s)
    pub speed: f32,
    pub is_stopped: bool,
    /// Агент стоит на navmesh; иначе FSM не работает в этом тике
    pub on_mesh: bool,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            remaining_distance: f32::INFINITY,
            path_pending: false,
            speed: 3.5,
            is_stopped: false,
            on_mesh: true,
        }
    }
}

impl NavAgent {
    pub fn with_speed(speed: f32) -> Self {
        Self {
            speed,
            ..Default::default()
        }
    }

    pub fn set_destination(&mut self, destination: Vec3) {
        let changed = self
            .destination
            .map_or(true, |current| current.distance(destination) > DESTINATION_EPSILON);

        if changed {
            self.path_pending = true;
        }
        self.destination = Some(destination);
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }

    pub fn path_pending(&self) -> bool {
        self.path_pending
    }

    /// Путь посчитан и до цели меньше `threshold`
    pub fn has_arrived(&self, threshold: f32) -> bool {
        self.destination.is_some() && !self.path_pending && self.remaining_distance < threshold
    }

    /// Backend закончил расчёт пути: фиксируем оставшуюся дистанцию
    pub fn report_progress(&mut self, remaining_distance: f32) {
        self.path_pending = false;
        self.remaining_distance = remaining_distance;
    }
}
