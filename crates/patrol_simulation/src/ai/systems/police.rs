//! Police systems: реакции на detection события + FSM тик.

use bevy::prelude::*;
use crate::ai::{Concealment, PoliceBrain, PoliceConfig, PoliceState, PoliceTick, RobberBrain, RobberSighting};
use crate::components::{ActorCategory, NavAgent};
use crate::detection::DetectionEvent;
use crate::error::AgentDisabled;
use crate::waypoint::{PathFollower, WaypointPath};

fn state_label(state: PoliceState) -> &'static str {
    match state {
        PoliceState::Patrol => "Patrol",
        PoliceState::Chase { .. } => "Chase",
        PoliceState::Search { .. } => "Search",
    }
}

/// Система: DetectionEvent (категория Robber) → PoliceBrain
///
/// Entered → Chase (если не в ignore window), Exited отслеживаемого → Search.
pub fn police_detection_reactions(
    mut events: EventReader<DetectionEvent>,
    mut police: Query<(&mut PoliceBrain, &mut NavAgent, &PoliceConfig), Without<AgentDisabled>>,
    transforms: Query<&Transform>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs_f64();

    for event in events.read() {
        if event.category() != ActorCategory::Robber {
            continue;
        }

        let Ok((mut brain, mut nav, config)) = police.get_mut(event.owner()) else {
            continue;
        };

        match *event {
            DetectionEvent::Entered { owner, actor, .. } => {
                let Ok(robber_transform) = transforms.get(actor) else {
                    continue;
                };

                if brain.on_robber_enter(actor, robber_transform.translation, now, &mut nav, config) {
                    crate::log(&format!("🚨 Police {:?} spotted robber {:?} → Chase", owner, actor));
                } else if let Some(deadline) = brain.ignore_windows().deadline(actor) {
                    crate::log(&format!(
                        "Police {:?} ignores robber {:?} until {:.2}s",
                        owner, actor, deadline
                    ));
                }
            }
            DetectionEvent::Exited { owner, actor, .. } => {
                if brain.on_robber_exit(actor, now, &mut nav, config) {
                    crate::log(&format!("👻 Police {:?} lost robber {:?} → Search", owner, actor));
                }
            }
        }
    }
}

/// Система: тик Police FSM
///
/// Цель погони резолвится по Entity каждый тик; despawned → потеря контакта.
pub fn police_fsm_tick(
    mut police: Query<
        (Entity, &mut PoliceBrain, &mut NavAgent, &mut PathFollower, &PoliceConfig, &Transform),
        Without<AgentDisabled>,
    >,
    robbers: Query<(&Transform, &RobberBrain)>,
    paths: Query<&WaypointPath>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs_f64();
    let delta = time.delta_secs();

    for (entity, mut brain, mut nav, mut follower, config, transform) in police.iter_mut() {
        if !nav.on_mesh {
            continue;
        }

        let Ok(path) = paths.get(follower.path) else {
            continue;
        };

        let robber = brain.tracked_robber().and_then(|robber| {
            robbers.get(robber).ok().map(|(robber_transform, concealment)| RobberSighting {
                position: robber_transform.translation,
                hidden: concealment.is_hidden(),
            })
        });

        let before = brain.state();
        let input = PoliceTick {
            position: transform.translation,
            now,
            delta,
            robber,
            path,
        };
        brain.tick(input, &mut nav, &mut follower, config);

        let after = brain.state();
        if state_label(before) != state_label(after) {
            crate::log(&format!(
                "👮 Police {:?}: {} → {} (t={:.2}s)",
                entity,
                state_label(before),
                state_label(after),
                now
            ));
        }
    }
}
