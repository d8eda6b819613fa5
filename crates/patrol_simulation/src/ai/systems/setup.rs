//! Setup validation: агент без NavAgent / маршрута / зоны отключается, а не паникует.

use bevy::prelude::*;
use crate::ai::{PoliceBrain, RobberBrain};
use crate::components::NavAgent;
use crate::detection::DetectionZone;
use crate::error::{AgentDisabled, SetupError};
use crate::waypoint::{PathFollower, WaypointPath};

/// Проверка конфигурации одного агента (без ECS)
///
/// Порядок проверок фиксирован: NavAgent → маршрут → точки маршрута → зона.
pub fn check_agent_setup(
    agent: Entity,
    has_nav_agent: bool,
    follower: Option<&PathFollower>,
    path: Option<&WaypointPath>,
    has_detection_zone: bool,
) -> Result<(), SetupError> {
    if !has_nav_agent {
        return Err(SetupError::MissingNavAgent(agent));
    }

    let Some(follower) = follower else {
        return Err(SetupError::MissingPath(agent));
    };

    let Some(path) = path else {
        return Err(SetupError::MissingPath(agent));
    };

    if path.is_empty() {
        return Err(SetupError::EmptyPath {
            agent,
            path: follower.path,
        });
    }

    if !has_detection_zone {
        return Err(SetupError::MissingDetectionZone(agent));
    }

    Ok(())
}

/// Система: валидация только что добавленных полицейских и грабителей
///
/// Ошибка → log_error + `AgentDisabled`; FSM системы такого агента пропускают.
pub fn validate_agent_setup(
    mut commands: Commands,
    agents: Query<
        (Entity, Has<NavAgent>, Option<&PathFollower>),
        (Or<(Added<PoliceBrain>, Added<RobberBrain>)>, Without<AgentDisabled>),
    >,
    paths: Query<&WaypointPath>,
    zones: Query<&DetectionZone>,
) {
    for (agent, has_nav_agent, follower) in agents.iter() {
        let path = follower.and_then(|follower| paths.get(follower.path).ok());
        let has_zone = zones.iter().any(|zone| zone.owner == Some(agent));

        if let Err(reason) = check_agent_setup(agent, has_nav_agent, follower, path, has_zone) {
            crate::log_error(&format!("❌ Agent setup failed, disabling: {}", reason));
            commands.entity(agent).insert(AgentDisabled { reason });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use crate::components::ActorCategory;
    use crate::detection::ZoneFilter;

    fn path() -> WaypointPath {
        WaypointPath::from_positions([Vec3::ZERO, Vec3::X], true)
    }

    #[test]
    fn test_check_valid_agent() {
        let agent = Entity::from_raw(1);
        let follower = PathFollower::new(Entity::from_raw(2));

        assert_eq!(check_agent_setup(agent, true, Some(&follower), Some(&path()), true), Ok(()));
    }

    #[test]
    fn test_check_reports_first_problem() {
        let agent = Entity::from_raw(1);
        let path_entity = Entity::from_raw(2);
        let follower = PathFollower::new(path_entity);
        let empty = WaypointPath::new(Vec::new(), false);

        assert_eq!(
            check_agent_setup(agent, false, None, None, false),
            Err(SetupError::MissingNavAgent(agent))
        );
        assert_eq!(
            check_agent_setup(agent, true, None, None, true),
            Err(SetupError::MissingPath(agent))
        );
        assert_eq!(
            check_agent_setup(agent, true, Some(&follower), None, true),
            Err(SetupError::MissingPath(agent))
        );
        assert_eq!(
            check_agent_setup(agent, true, Some(&follower), Some(&empty), true),
            Err(SetupError::EmptyPath { agent, path: path_entity })
        );
        assert_eq!(
            check_agent_setup(agent, true, Some(&follower), Some(&path()), false),
            Err(SetupError::MissingDetectionZone(agent))
        );
    }

    #[test]
    fn test_validate_disables_broken_agent_only() {
        let mut world = World::new();
        let path_entity = world.spawn(path()).id();

        let healthy = world
            .spawn((PoliceBrain::default(), NavAgent::default(), PathFollower::new(path_entity)))
            .id();
        world.spawn(DetectionZone::new(
            ZoneFilter::for_category(ActorCategory::Robber),
            10.0,
            Some(healthy),
        ));

        // Нет NavAgent
        let broken = world.spawn((RobberBrain::default(), PathFollower::new(path_entity))).id();

        world.run_system_once(validate_agent_setup).unwrap();

        assert!(world.get::<AgentDisabled>(healthy).is_none());
        let disabled = world.get::<AgentDisabled>(broken).map(|d| d.reason.clone());
        assert_eq!(disabled, Some(SetupError::MissingNavAgent(broken)));
    }
}
