//! Robber systems: набор полиции рядом + FSM тик (укрытия, бегство).

use bevy::prelude::*;
use crate::ai::{CoverCandidate, PoliceBrain, RobberBrain, RobberConfig, RobberState, RobberTick};
use crate::components::{ActorCategory, CoverPoint, NavAgent, PhysicsLayer};
use crate::detection::DetectionEvent;
use crate::error::AgentDisabled;
use crate::waypoint::{PathFollower, WaypointPath};

fn state_label(state: RobberState) -> &'static str {
    match state {
        RobberState::Walk => "Walk",
        RobberState::Flee => "Flee",
        RobberState::Hide => "Hide",
    }
}

/// Система: DetectionEvent (категория Police) → набор police_nearby
pub fn robber_detection_reactions(
    mut events: EventReader<DetectionEvent>,
    mut robbers: Query<(&mut RobberBrain, &mut NavAgent, &RobberConfig), Without<AgentDisabled>>,
) {
    for event in events.read() {
        if event.category() != ActorCategory::Police {
            continue;
        }

        let Ok((mut brain, mut nav, config)) = robbers.get_mut(event.owner()) else {
            continue;
        };

        match *event {
            DetectionEvent::Entered { owner, actor, .. } => {
                if brain.on_police_enter(actor, &mut nav, config) {
                    crate::log(&format!("🏃 Robber {:?} saw police {:?} → Flee", owner, actor));
                }
            }
            DetectionEvent::Exited { owner, actor, .. } => {
                if brain.on_police_exit(actor, &mut nav, config) {
                    crate::log(&format!("😮‍💨 Robber {:?}: police {:?} gone → Walk", owner, actor));
                }
            }
        }
    }
}

/// Система: тик Robber FSM
pub fn robber_fsm_tick(
    mut robbers: Query<
        (Entity, &mut RobberBrain, &mut NavAgent, &mut PathFollower, &RobberConfig, &Transform),
        Without<AgentDisabled>,
    >,
    covers: Query<(Entity, &Transform, &PhysicsLayer), With<CoverPoint>>,
    police: Query<&Transform, With<PoliceBrain>>,
    paths: Query<&WaypointPath>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    // Снимок укрытий один раз на тик, в стабильном порядке
    let mut cover_candidates: Vec<CoverCandidate> = covers
        .iter()
        .map(|(entity, transform, layer)| CoverCandidate {
            entity,
            position: transform.translation,
            layer: layer.0,
        })
        .collect();
    cover_candidates.sort_by_key(|candidate| candidate.entity);

    for (entity, mut brain, mut nav, mut follower, config, transform) in robbers.iter_mut() {
        if !nav.on_mesh {
            continue;
        }

        let Ok(path) = paths.get(follower.path) else {
            continue;
        };

        // Despawned полицейские просто пропускаются (exit придёт от зоны)
        let police_positions: Vec<Vec3> = brain
            .police_nearby_sorted()
            .into_iter()
            .filter_map(|officer| police.get(officer).ok())
            .map(|officer_transform| officer_transform.translation)
            .collect();

        let before = brain.state();
        let input = RobberTick {
            position: transform.translation,
            delta,
            path,
            covers: &cover_candidates,
            police_positions: &police_positions,
        };
        brain.tick(input, &mut nav, &mut follower, config);

        let after = brain.state();
        if before != after {
            let cover = brain.cover().map(|cover| cover.entity);
            crate::log(&format!(
                "🦹 Robber {:?}: {} → {} (cover: {:?})",
                entity,
                state_label(before),
                state_label(after),
                cover
            ));
        }
    }
}
