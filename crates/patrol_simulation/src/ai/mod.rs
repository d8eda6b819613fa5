//! AI decision-making module
//!
//! Police FSM (Patrol → Chase → Search) и Robber FSM (Walk → Flee → Hide).
//! Логика переходов живёт в компонентах (`components`), системы только
//! резолвят entities и логируют переходы (`systems`).

use bevy::prelude::*;
use crate::SimulationSet;

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use systems::*;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. validate_agent_setup — отключение агентов с битой конфигурацией
/// 2. police/robber_detection_reactions — enter/exit события зон
/// 3. police_fsm_tick → robber_fsm_tick — полиция читает `is_hidden` до тика грабителя
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PoliceConfig>()
            .register_type::<RobberConfig>()
            .add_systems(FixedUpdate, validate_agent_setup.in_set(SimulationSet::Setup))
            .add_systems(
                FixedUpdate,
                (police_detection_reactions, robber_detection_reactions)
                    .chain()
                    .in_set(SimulationSet::Reactions),
            )
            .add_systems(
                FixedUpdate,
                (police_fsm_tick, robber_fsm_tick)
                    .chain() // Последовательное выполнение для детерминизма
                    .in_set(SimulationSet::Brains),
            );
    }
}
