//! Waypoint paths — маршруты патруля, прогулки и трафика
//!
//! Путь создаётся один раз (authored), в runtime только читается.
//! `PathFollower` — общий "шагатель" по точкам для Patrol, Walk и машин.

use bevy::prelude::*;


/// Точка маршрута с метаданными
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct PathPoint {
    pub position: Vec3,
    /// Ширина дороги/тропы (метры)
    pub path_width: f32,
    /// Ограничение скорости на участке (m/s)
    pub speed_limit: f32,
    pub is_slow_down_zone: bool,
    pub is_stop_point: bool,
    /// Сколько стоять в stop point (секунды)
    pub stop_duration: f32,
}

impl PathPoint {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            path_width: 4.0,
            speed_limit: 10.0,
            is_slow_down_zone: false,
            is_stop_point: false,
            stop_duration: 0.0,
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.path_width = width;
        self
    }

    pub fn with_speed_limit(mut self, speed_limit: f32) -> Self {
        self.speed_limit = speed_limit;
        self
    }

    pub fn slow_down_zone(mut self) -> Self {
        self.is_slow_down_zone = true;
        self
    }

    pub fn stop_point(mut self, duration: f32) -> Self {
        self.is_stop_point = true;
        self.stop_duration = duration.max(0.0);
        self
    }
}

/// Маршрут: упорядоченные точки, опционально закольцованный
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct WaypointPath {
    points: Vec<PathPoint>,
    pub is_looping: bool,
}

impl WaypointPath {
    pub fn new(points: Vec<PathPoint>, is_looping: bool) -> Self {
        Self { points, is_looping }
    }

    pub fn from_positions(positions: impl IntoIterator<Item = Vec3>, is_looping: bool) -> Self {
        Self::new(positions.into_iter().map(PathPoint::new).collect(), is_looping)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point_at(&self, index: usize) -> Option<&PathPoint> {
        self.points.get(index)
    }

    /// Индекс следующей точки
    ///
    /// Looping: по модулю длины. Не looping: `None` после последней точки.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        let count = self.points.len();
        if count == 0 {
            return None;
        }

        if self.is_looping {
            Some((index + 1) % count)
        } else if index + 1 < count {
            Some(index + 1)
        } else {
            None
        }
    }

    pub fn next_point(&self, index: usize) -> Option<&PathPoint> {
        self.next_index(index).and_then(|next| self.point_at(next))
    }

    /// Ближайшая точка по прямой (при равенстве — первая)
    pub fn closest_index_to(&self, position: Vec3) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;

        for (index, point) in self.points.iter().enumerate() {
            let distance = point.position.distance_squared(position);
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }

        best.map(|(index, _)| index)
    }
}

/// Результат одного шага по маршруту
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowStep {
    /// Идём к точке
    Heading(Vec3),
    /// Стоим в stop point
    Waiting(Vec3),
    /// Конец не закольцованного маршрута — держим последнюю точку
    Holding(Vec3),
    /// Маршрут пустой
    NoPath,
}

impl FollowStep {
    pub fn target(&self) -> Option<Vec3> {
        match self {
            FollowStep::Heading(target) | FollowStep::Waiting(target) | FollowStep::Holding(target) => {
                Some(*target)
            }
            FollowStep::NoPath => None,
        }
    }
}

/// Позиция агента на маршруте
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PathFollower {
    /// Entity с `WaypointPath`
    pub path: Entity,
    pub index: usize,
    /// Сколько уже простояли в текущем stop point
    pub stop_timer: f32,
    /// Дошли до конца не закольцованного маршрута
    pub finished: bool,
}

impl PathFollower {
    pub fn new(path: Entity) -> Self {
        Self {
            path,
            index: 0,
            stop_timer: 0.0,
            finished: false,
        }
    }

    pub fn current_target(&self, path: &WaypointPath) -> Option<Vec3> {
        path.point_at(self.index).map(|point| point.position)
    }

    /// Переключиться на ближайшую точку (возврат на маршрут после погони/укрытия)
    pub fn snap_to_closest(&mut self, path: &WaypointPath, position: Vec3) {
        if let Some(index) = path.closest_index_to(position) {
            self.index = index;
            self.stop_timer = 0.0;
            self.finished = false;
        }
    }

    /// Один тик движения по маршруту
    pub fn step(&mut self, path: &WaypointPath, position: Vec3, reach_distance: f32, delta: f32) -> FollowStep {
        let Some(point) = path.point_at(self.index) else {
            return FollowStep::NoPath;
        };

        if position.distance(point.position) >= reach_distance {
            return FollowStep::Heading(point.position);
        }

        if point.is_stop_point && self.stop_timer < point.stop_duration {
            self.stop_timer += delta;
            return FollowStep::Waiting(point.position);
        }
        self.stop_timer = 0.0;

        match path.next_index(self.index) {
            Some(next) => {
                self.index = next;
                path.point_at(next)
                    .map(|next_point| FollowStep::Heading(next_point.position))
                    .unwrap_or(FollowStep::NoPath)
            }
            None => {
                self.finished = true;
                FollowStep::Holding(point.position)
            }
        }
    }
}
