//! Police FSM: Patrol → Chase → Search → Patrol
//!
//! Логика без ECS зависимостей (кроме типов): системы в `ai::systems::police`
//! резолвят robber по Entity и вызывают методы `PoliceBrain`.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::NavAgent;
use crate::waypoint::{PathFollower, WaypointPath};

/// Состояния полицейского
///
/// Отслеживаемый грабитель живёт только внутри `Chase`, поэтому
/// "есть цель ⇔ Chase" выполняется по построению.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum PoliceState {
    /// Патруль по маршруту (начальное состояние)
    #[default]
    Patrol,

    /// Погоня за обнаруженным грабителем
    Chase { robber: Entity },

    /// Осмотр последней известной позиции грабителя
    Search {
        /// Сколько уже простояли на месте (секунды)
        waited: f32,
    },
}

/// Параметры полицейского (author-time)
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct PoliceConfig {
    pub patrol_speed: f32,
    pub chase_speed: f32,
    /// Дистанция "дошёл до waypoint" (метры)
    pub waypoint_reach_distance: f32,
    /// Search: remaining_distance ниже этого = стоим на месте
    pub search_arrival_distance: f32,
    /// Search: сколько ждать на последней известной позиции (секунды)
    pub search_wait_time: f32,
    /// Сколько игнорировать грабителя после потери контакта (секунды)
    pub ignore_robber_duration: f32,
    /// Радиус detection zone (метры)
    pub detection_radius: f32,
}

impl Default for PoliceConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 3.5,
            chase_speed: 6.0,
            waypoint_reach_distance: 1.0,
            search_arrival_distance: 0.5,
            search_wait_time: 3.0,
            ignore_robber_duration: 2.0,
            detection_radius: 10.0,
        }
    }
}

/// Ignore windows: robber → deadline (секунды `Time<Fixed>::elapsed`)
///
/// Записи выселяются при проверке после истечения и в `prune` каждый тик,
/// поэтому map содержит только живые дедлайны.
#[derive(Debug, Clone, Default)]
pub struct IgnoreWindows {
    deadlines: HashMap<Entity, f64>,
}

impl IgnoreWindows {
    pub fn stamp(&mut self, robber: Entity, deadline: f64) {
        self.deadlines.insert(robber, deadline);
    }

    /// Игнорируем ли robber в момент `now` (истёкшая запись удаляется)
    pub fn is_ignored(&mut self, robber: Entity, now: f64) -> bool {
        match self.deadlines.get(&robber) {
            Some(deadline) if now < *deadline => true,
            Some(_) => {
                self.deadlines.remove(&robber);
                false
            }
            None => false,
        }
    }

    pub fn prune(&mut self, now: f64) {
        self.deadlines.retain(|_, deadline| now < *deadline);
    }

    pub fn deadline(&self, robber: Entity) -> Option<f64> {
        self.deadlines.get(&robber).copied()
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

/// Что полицейский видит о своей цели в этом тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobberSighting {
    pub position: Vec3,
    pub hidden: bool,
}

/// Входные данные одного тика
pub struct PoliceTick<'a> {
    pub position: Vec3,
    /// `Time<Fixed>::elapsed_secs_f64`
    pub now: f64,
    pub delta: f32,
    /// Отслеживаемый грабитель (None — despawned или нет цели)
    pub robber: Option<RobberSighting>,
    pub path: &'a WaypointPath,
}

/// Police FSM компонент
#[derive(Component, Debug, Clone, Default)]
pub struct PoliceBrain {
    state: PoliceState,
    last_known_position: Option<Vec3>,
    ignore: IgnoreWindows,
}

impl PoliceBrain {
    pub fn state(&self) -> PoliceState {
        self.state
    }

    pub fn tracked_robber(&self) -> Option<Entity> {
        match self.state {
            PoliceState::Chase { robber } => Some(robber),
            _ => None,
        }
    }

    pub fn last_known_position(&self) -> Option<Vec3> {
        self.last_known_position
    }

    pub fn ignore_windows(&self) -> &IgnoreWindows {
        &self.ignore
    }

    /// Detection: грабитель вошёл в зону
    ///
    /// Patrol/Search → Chase, если robber не в ignore window.
    /// Уже в Chase — вторая цель игнорируется. Возвращает true при переходе.
    pub fn on_robber_enter(
        &mut self,
        robber: Entity,
        robber_position: Vec3,
        now: f64,
        nav: &mut NavAgent,
        config: &PoliceConfig,
    ) -> bool {
        if matches!(self.state, PoliceState::Chase { .. }) {
            return false;
        }

        if self.ignore.is_ignored(robber, now) {
            return false;
        }

        self.state = PoliceState::Chase { robber };
        self.last_known_position = Some(robber_position);
        nav.speed = config.chase_speed;
        nav.is_stopped = false;
        nav.set_destination(robber_position);
        true
    }

    /// Detection: грабитель вышел из зоны
    ///
    /// Только отслеживаемый грабитель переводит в Search; остальные — no-op.
    pub fn on_robber_exit(&mut self, robber: Entity, now: f64, nav: &mut NavAgent, config: &PoliceConfig) -> bool {
        if self.tracked_robber() != Some(robber) {
            return false;
        }

        self.lose_contact(robber, now, nav, config);
        true
    }

    pub fn tick(&mut self, input: PoliceTick, nav: &mut NavAgent, follower: &mut PathFollower, config: &PoliceConfig) {
        self.ignore.prune(input.now);

        match self.state {
            PoliceState::Patrol => {
                let step = follower.step(input.path, input.position, config.waypoint_reach_distance, input.delta);
                if let Some(target) = step.target() {
                    nav.set_destination(target);
                }
            }

            PoliceState::Chase { robber } => match input.robber {
                // Цель пропала (despawned) — то же самое что потеря контакта
                None => self.lose_contact(robber, input.now, nav, config),
                Some(sighting) if sighting.hidden => {
                    self.resume_patrol(input.path, input.position, nav, follower, config);
                }
                Some(sighting) => {
                    self.last_known_position = Some(sighting.position);
                    nav.set_destination(sighting.position);
                }
            },

            PoliceState::Search { waited } => {
                let Some(target) = self.last_known_position else {
                    self.resume_patrol(input.path, input.position, nav, follower, config);
                    return;
                };

                nav.set_destination(target);

                if nav.has_arrived(config.search_arrival_distance) {
                    let waited = waited + input.delta;
                    if waited >= config.search_wait_time {
                        self.resume_patrol(input.path, input.position, nav, follower, config);
                    } else {
                        self.state = PoliceState::Search { waited };
                    }
                }
            }
        }
    }

    /// Chase → Search: ignore window + едем к последней известной позиции
    fn lose_contact(&mut self, robber: Entity, now: f64, nav: &mut NavAgent, config: &PoliceConfig) {
        self.ignore.stamp(robber, now + config.ignore_robber_duration as f64);
        self.state = PoliceState::Search { waited: 0.0 };

        if let Some(target) = self.last_known_position {
            nav.is_stopped = false;
            nav.set_destination(target);
        }
    }

    fn resume_patrol(
        &mut self,
        path: &WaypointPath,
        position: Vec3,
        nav: &mut NavAgent,
        follower: &mut PathFollower,
        config: &PoliceConfig,
    ) {
        self.state = PoliceState::Patrol;
        nav.speed = config.patrol_speed;
        nav.is_stopped = false;

        follower.snap_to_closest(path, position);
        if let Some(target) = follower.current_target(path) {
            nav.set_destination(target);
        }
    }
}
