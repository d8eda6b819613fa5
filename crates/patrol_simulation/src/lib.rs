//! Patrol Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: полиция патрулирует, грабители убегают и прячутся,
//! фоном ездят машины и бродят животные.
//!
//! Порядок внутри FixedUpdate (60Hz), строго последовательный:
//! Setup → Detection → Reactions → Brains → Traffic → Wildlife → Navigation

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod components;
pub mod detection;
pub mod error;
pub mod layers;
pub mod logger;
pub mod navigation;
pub mod spawn;
pub mod traffic;
pub mod waypoint;
pub mod wildlife;

// Re-export базовых компонентов для удобства
pub use ai::{
    AIPlugin, Concealment, PoliceBrain, PoliceConfig, PoliceState, RobberBrain, RobberConfig, RobberState,
};
pub use components::*;
pub use detection::{DetectionBackend, DetectionEvent, DetectionPlugin, DetectionZone, ZoneFilter};
pub use error::{AgentDisabled, SetupError};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel};
pub use navigation::NavigationPlugin;
pub use traffic::{SpawnerConfig, TrafficPlugin, Vehicle, VehicleSpawner};
pub use waypoint::{PathFollower, PathPoint, WaypointPath};
pub use wildlife::{WanderConfig, Wanderer, WildlifePlugin};

/// Частота simulation tick (Hz)
pub const TICK_HZ: f64 = 60.0;

/// Фазы одного тика симуляции (FixedUpdate, chained)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Валидация новых агентов
    Setup,
    /// Zones → DetectionEvent
    Detection,
    /// DetectionEvent → FSM (enter/exit)
    Reactions,
    /// FSM тики: police, потом robber
    Brains,
    Traffic,
    Wildlife,
    /// Headless steering (NavAgent → Transform)
    Navigation,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin {
    pub seed: u64,
    pub detection: DetectionBackend,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            seed: 42,
            detection: DetectionBackend::Headless,
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            // Детерминистичный RNG (seeded)
            .insert_resource(DeterministicRng::new(self.seed))
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Setup,
                    SimulationSet::Detection,
                    SimulationSet::Reactions,
                    SimulationSet::Brains,
                    SimulationSet::Traffic,
                    SimulationSet::Wildlife,
                    SimulationSet::Navigation,
                )
                    .chain(),
            )
            // Подсистемы
            .add_plugins((
                DetectionPlugin { backend: self.detection },
                AIPlugin,
                TrafficPlugin,
                WildlifePlugin,
                NavigationPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время двигается вручную: каждый `app.update()` = ровно один FixedUpdate тик
/// (первый update только инициализирует часы).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();

    let tick = Duration::from_secs_f64(1.0 / TICK_HZ);
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin {
            seed,
            detection: DetectionBackend::Headless,
        })
        .insert_resource(TimeUpdateStrategy::ManualDuration(tick))
        .insert_resource(Time::<Fixed>::from_duration(tick));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
