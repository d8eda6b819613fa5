//! Robber FSM: Walk → Flee → Hide → Walk
//!
//! Единственный источник "полиция рядом" — набор пересечений из detection
//! callbacks, периодического пересканирования нет.

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::NavAgent;
use crate::layers::{LayerMask, LAYER_COVER};
use crate::waypoint::{PathFollower, WaypointPath};

/// Состояния грабителя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum RobberState {
    /// Прогулка по маршруту (начальное состояние)
    #[default]
    Walk,
    /// Бегство к укрытию (или прочь от полиции)
    Flee,
    /// Спрятался, ждёт пока полиция уйдёт
    Hide,
}

/// Capability "спрятан ли" — полиция читает её у цели погони
pub trait Concealment {
    fn is_hidden(&self) -> bool;
}

/// Параметры грабителя (author-time)
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct RobberConfig {
    pub walk_speed: f32,
    pub flee_speed: f32,
    pub waypoint_reach_distance: f32,
    /// Радиус поиска укрытия (метры)
    pub cover_search_radius: f32,
    /// Слои, на которых лежат укрытия
    pub cover_layer_mask: LayerMask,
    /// Ближе этого к укрытию = спрятался
    pub hide_reach_distance: f32,
    /// Fallback: на сколько отбегать от полиции без укрытия
    pub flee_distance: f32,
    /// Радиус detection zone (метры)
    pub detection_radius: f32,
}

impl Default for RobberConfig {
    fn default() -> Self {
        Self {
            walk_speed: 3.0,
            flee_speed: 6.5,
            waypoint_reach_distance: 1.0,
            cover_search_radius: 20.0,
            cover_layer_mask: LayerMask::from_layer(LAYER_COVER),
            hide_reach_distance: 1.5,
            flee_distance: 10.0,
            detection_radius: 8.0,
        }
    }
}

/// Укрытие-кандидат (снимок сцены на этот тик)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverCandidate {
    pub entity: Entity,
    pub position: Vec3,
    pub layer: u8,
}

/// Выбранное укрытие
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChosenCover {
    pub entity: Entity,
    pub position: Vec3,
}

/// Входные данные одного тика
pub struct RobberTick<'a> {
    pub position: Vec3,
    pub delta: f32,
    pub path: &'a WaypointPath,
    /// Все живые укрытия сцены
    pub covers: &'a [CoverCandidate],
    /// Позиции полицейских из набора пересечений (despawned пропущены)
    pub police_positions: &'a [Vec3],
}

/// Ближайшее укрытие в радиусе на нужных слоях
///
/// Строгое `<`: при равных дистанциях побеждает первое найденное.
pub fn nearest_cover<'a>(
    origin: Vec3,
    radius: f32,
    layer_mask: LayerMask,
    candidates: &'a [CoverCandidate],
) -> Option<&'a CoverCandidate> {
    let mut best: Option<(&CoverCandidate, f32)> = None;

    for candidate in candidates {
        if !layer_mask.contains(candidate.layer) {
            continue;
        }

        let distance = origin.distance(candidate.position);
        if distance > radius {
            continue;
        }

        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((candidate, distance));
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Fallback без укрытия: точка на `distance` прочь от центра полиции
///
/// Нет полицейских — `None` (направление не определено).
/// Стоим ровно в центре — вектор нулевой, остаёмся на месте.
pub fn flee_destination(position: Vec3, police_positions: &[Vec3], distance: f32) -> Option<Vec3> {
    if police_positions.is_empty() {
        return None;
    }

    let centroid = police_positions.iter().copied().sum::<Vec3>() / police_positions.len() as f32;
    let away = (position - centroid).normalize_or_zero();

    Some(position + away * distance)
}

/// Robber FSM компонент
#[derive(Component, Debug, Clone, Default)]
pub struct RobberBrain {
    state: RobberState,
    police_nearby: HashSet<Entity>,
    cover: Option<ChosenCover>,
    /// Hide → Walk: на следующем тике вернуться на ближайший waypoint
    resume_path: bool,
}

impl Concealment for RobberBrain {
    fn is_hidden(&self) -> bool {
        self.state == RobberState::Hide
    }
}

impl RobberBrain {
    pub fn state(&self) -> RobberState {
        self.state
    }

    pub fn cover(&self) -> Option<ChosenCover> {
        self.cover
    }

    pub fn police_nearby_count(&self) -> usize {
        self.police_nearby.len()
    }

    pub fn is_police_nearby(&self, police: Entity) -> bool {
        self.police_nearby.contains(&police)
    }

    /// Стабильный порядок (для детерминированного centroid)
    pub fn police_nearby_sorted(&self) -> Vec<Entity> {
        let mut police: Vec<Entity> = self.police_nearby.iter().copied().collect();
        police.sort();
        police
    }

    /// Detection: полицейский вошёл в зону
    ///
    /// Дубликат — no-op. Переход в Flee только из Walk.
    pub fn on_police_enter(&mut self, police: Entity, nav: &mut NavAgent, config: &RobberConfig) -> bool {
        self.police_nearby.insert(police);

        if self.state == RobberState::Walk && !self.police_nearby.is_empty() {
            self.start_flee(nav, config);
            return true;
        }
        false
    }

    /// Detection: полицейский вышел из зоны
    ///
    /// Отсутствующий — no-op. Hide → Walk когда набор опустел.
    pub fn on_police_exit(&mut self, police: Entity, nav: &mut NavAgent, config: &RobberConfig) -> bool {
        self.police_nearby.remove(&police);

        if self.state == RobberState::Hide && self.police_nearby.is_empty() {
            self.start_walk(nav, config);
            return true;
        }
        false
    }

    pub fn tick(&mut self, input: RobberTick, nav: &mut NavAgent, follower: &mut PathFollower, config: &RobberConfig) {
        match self.state {
            RobberState::Walk => {
                if !self.police_nearby.is_empty() {
                    self.start_flee(nav, config);
                    return;
                }

                if self.resume_path {
                    follower.snap_to_closest(input.path, input.position);
                    self.resume_path = false;
                }

                let step = follower.step(input.path, input.position, config.waypoint_reach_distance, input.delta);
                if let Some(target) = step.target() {
                    nav.set_destination(target);
                }
            }

            RobberState::Flee => self.flee(&input, nav, config),

            RobberState::Hide => {
                if self.police_nearby.is_empty() {
                    self.start_walk(nav, config);
                } else {
                    nav.is_stopped = true;
                }
            }
        }
    }

    fn flee(&mut self, input: &RobberTick, nav: &mut NavAgent, config: &RobberConfig) {
        // Укрытие исчезло со сцены — ищем заново
        if let Some(cover) = self.cover {
            if !input.covers.iter().any(|candidate| candidate.entity == cover.entity) {
                self.cover = None;
            }
        }

        if self.cover.is_none() {
            match nearest_cover(input.position, config.cover_search_radius, config.cover_layer_mask, input.covers) {
                Some(found) => {
                    self.cover = Some(ChosenCover {
                        entity: found.entity,
                        position: found.position,
                    });
                }
                None => {
                    if let Some(destination) = flee_destination(input.position, input.police_positions, config.flee_distance) {
                        nav.set_destination(destination);
                    }
                }
            }
        }

        if let Some(cover) = self.cover {
            nav.set_destination(cover.position);

            if input.position.distance(cover.position) < config.hide_reach_distance {
                self.state = RobberState::Hide;
                nav.is_stopped = true;
            }
        }
    }

    fn start_flee(&mut self, nav: &mut NavAgent, config: &RobberConfig) {
        self.state = RobberState::Flee;
        self.cover = None;
        nav.speed = config.flee_speed;
        nav.is_stopped = false;
    }

    fn start_walk(&mut self, nav: &mut NavAgent, config: &RobberConfig) {
        self.state = RobberState::Walk;
        self.cover = None;
        self.resume_path = true;
        nav.speed = config.walk_speed;
        nav.is_stopped = false;
    }
}
