//! Ошибки конфигурации агентов
//!
//! Фатальны только для одного агента: он получает `AgentDisabled` и пишет в лог,
//! симуляция продолжает работать.

use bevy::prelude::*;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("agent {0:?} has no NavAgent")]
    MissingNavAgent(Entity),

    #[error("agent {0:?} has no waypoint path")]
    MissingPath(Entity),

    #[error("waypoint path {path:?} of agent {agent:?} has no points")]
    EmptyPath { agent: Entity, path: Entity },

    #[error("agent {0:?} has no detection zone")]
    MissingDetectionZone(Entity),

    #[error("vehicle spawner {0:?} has no usable path")]
    NoUsablePath(Entity),
}

/// Маркер: агент отключён из-за ошибки конфигурации (FSM системы его пропускают)
#[derive(Component, Debug, Clone)]
pub struct AgentDisabled {
    pub reason: SetupError,
}
