//! Wildlife domain — животные, бродящие вокруг "дома"
//!
//! Idle (пауза) → Moving (случайная точка в радиусе home) → Idle.
//! Застрял (прогресс за интервал меньше порога) → новая точка.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::components::NavAgent;
use crate::DeterministicRng;

/// Параметры блуждания (author-time)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct WanderConfig {
    /// Радиус блуждания вокруг home (метры)
    pub radius: f32,
    pub arrive_distance: f32,
    pub idle_min: f32,
    pub idle_max: f32,
    /// Как часто проверять "застрял ли" (секунды)
    pub stuck_check_interval: f32,
    /// Минимальный прогресс за интервал (метры)
    pub stuck_min_progress: f32,
    pub speed: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            radius: 15.0,
            arrive_distance: 1.0,
            idle_min: 1.0,
            idle_max: 4.0,
            stuck_check_interval: 2.0,
            stuck_min_progress: 0.5,
            speed: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum WanderPhase {
    Idle { remaining: f32 },
    Moving { target: Vec3 },
}

/// Что произошло в тике (для логов и тестов)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WanderOutcome {
    None,
    Departed,
    Arrived,
    Unstuck,
}

/// Случайная точка в круге радиуса `radius` вокруг `home` (плоскость XZ)
///
/// sqrt по радиусу — равномерно по площади, без сгущения к центру.
pub fn pick_wander_target(home: Vec3, radius: f32, rng: &mut impl Rng) -> Vec3 {
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let distance = radius.max(0.0) * rng.gen_range(0.0f32..=1.0).sqrt();
    home + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance)
}

/// Блуждающий агент
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(NavAgent)]
pub struct Wanderer {
    pub config: WanderConfig,
    pub home: Vec3,
    pub phase: WanderPhase,
    last_check_position: Vec3,
    check_timer: f32,
}

impl Wanderer {
    /// Стартуем в Idle без паузы: первая цель выбирается на первом тике
    pub fn new(home: Vec3, config: WanderConfig) -> Self {
        Self {
            config,
            home,
            phase: WanderPhase::Idle { remaining: 0.0 },
            last_check_position: home,
            check_timer: 0.0,
        }
    }

    pub fn tick(&mut self, position: Vec3, delta: f32, nav: &mut NavAgent, rng: &mut impl Rng) -> WanderOutcome {
        match self.phase {
            WanderPhase::Idle { remaining } => {
                let remaining = remaining - delta;
                if remaining > 0.0 {
                    self.phase = WanderPhase::Idle { remaining };
                    return WanderOutcome::None;
                }

                self.depart(position, nav, rng);
                WanderOutcome::Departed
            }

            WanderPhase::Moving { target } => {
                if position.distance(target) < self.config.arrive_distance {
                    let (low, high) = if self.config.idle_min <= self.config.idle_max {
                        (self.config.idle_min, self.config.idle_max)
                    } else {
                        (self.config.idle_max, self.config.idle_min)
                    };
                    self.phase = WanderPhase::Idle {
                        remaining: rng.gen_range(low..=high),
                    };
                    nav.is_stopped = true;
                    return WanderOutcome::Arrived;
                }

                self.check_timer += delta;
                if self.check_timer < self.config.stuck_check_interval {
                    return WanderOutcome::None;
                }

                let progress = self.last_check_position.distance(position);
                self.check_timer = 0.0;
                self.last_check_position = position;

                if progress < self.config.stuck_min_progress {
                    self.depart(position, nav, rng);
                    return WanderOutcome::Unstuck;
                }
                WanderOutcome::None
            }
        }
    }

    fn depart(&mut self, position: Vec3, nav: &mut NavAgent, rng: &mut impl Rng) {
        let target = pick_wander_target(self.home, self.config.radius, rng);
        self.phase = WanderPhase::Moving { target };
        self.last_check_position = position;
        self.check_timer = 0.0;

        nav.speed = self.config.speed;
        nav.is_stopped = false;
        nav.set_destination(target);
    }
}

/// Система: тик блуждающих агентов
pub fn wander(
    mut wanderers: Query<(Entity, &mut Wanderer, &mut NavAgent, &Transform)>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut wanderer, mut nav, transform) in wanderers.iter_mut() {
        if !nav.on_mesh {
            continue;
        }

        if wanderer.tick(transform.translation, delta, &mut nav, &mut rng.rng) == WanderOutcome::Unstuck {
            crate::log(&format!("🦌 Wanderer {:?} stuck, picking new destination", entity));
        }
    }
}

/// Wildlife Plugin
pub struct WildlifePlugin;

impl Plugin for WildlifePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Wanderer>()
            .add_systems(FixedUpdate, wander.in_set(crate::SimulationSet::Wildlife));
    }
}
