//! Gameplay collision rules
//!
//! Physics reports raw contacts; this module decides what they mean. Every
//! contact is first classified against the current state without mutating
//! anything, then the resulting [`Outcome`] is applied. The two halves stay
//! separate so rules can be tested on a hand-built contact.

use serde::{Deserialize, Serialize};

use super::physics::{ContactEvent, PhysicsAdapter, Sides};
use super::state::{DefeatCause, EntityId, EntityRef, GameState, Payload};

/// What a contact means for the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Player landed on an enemy's head
    Stomp { enemy: EntityId },
    /// Player touched an enemy any other way
    PlayerDefeated { enemy: EntityId },
    /// Player hit an armed question block from below
    BlockStruck { block: EntityId, payload: Payload },
    PowerUpCollected { power_up: EntityId },
    /// Two enemies walked into each other
    EnemiesBounced { a: EntityId, b: EntityId },
}

/// Sides of the player and of the other body, if the player is involved
fn split_player(event: &ContactEvent, player: EntityId) -> Option<(EntityId, Sides, Sides)> {
    if event.a == player {
        Some((event.b, event.a_sides, event.b_sides))
    } else if event.b == player {
        Some((event.a, event.b_sides, event.a_sides))
    } else {
        None
    }
}

/// Decide what a contact means. Returns `None` for contacts with no gameplay
/// effect (walking on ground, touching a spent block, stale ids).
pub fn classify(state: &GameState, event: &ContactEvent) -> Option<Outcome> {
    let Some((other, player_sides, other_sides)) = split_player(event, state.player.id) else {
        let both_alive = [event.a, event.b]
            .iter()
            .all(|id| state.goomba(*id).is_some_and(|g| g.alive));
        return (both_alive && !event.overlap_only).then_some(Outcome::EnemiesBounced {
            a: event.a,
            b: event.b,
        });
    };

    match state.lookup(other)? {
        EntityRef::Goomba(i) => {
            if !state.goombas[i].alive {
                return None;
            }
            // Stomp wins even when the same step also grazed a side
            if player_sides.down && other_sides.up {
                Some(Outcome::Stomp { enemy: other })
            } else {
                Some(Outcome::PlayerDefeated { enemy: other })
            }
        }
        EntityRef::Block(i) => {
            let block = &state.blocks[i];
            (block.is_armed() && player_sides.up && other_sides.down).then_some(
                Outcome::BlockStruck {
                    block: other,
                    payload: block.payload,
                },
            )
        }
        EntityRef::PowerUp(i) => state.effects.power_ups[i]
            .alive
            .then_some(Outcome::PowerUpCollected { power_up: other }),
        EntityRef::Player => None,
    }
}

/// Carry out an outcome. Returns false when the state had already moved on
/// (target dead, block spent) and nothing happened.
pub fn apply(state: &mut GameState, physics: &mut dyn PhysicsAdapter, outcome: Outcome) -> bool {
    match outcome {
        Outcome::Stomp { enemy } => {
            if !state.kill_goomba(enemy, physics) {
                return false;
            }
            state.player.vel.y = state.tuning.bounce_impulse;
            physics.set_velocity(state.player.id, state.player.vel);
            log::debug!("Stomped goomba {:?}", enemy);
            true
        }
        Outcome::PlayerDefeated { .. } => {
            state.end_session(physics, DefeatCause::EnemyContact);
            true
        }
        Outcome::BlockStruck { block, .. } => {
            let Some(i) = state.blocks.iter().position(|b| b.id == block) else {
                return false;
            };
            let Some(payload) = state.blocks[i].activate() else {
                return false;
            };
            let anchor = state.blocks[i].spawn_anchor();
            let now = state.time_ticks;
            match payload {
                Payload::Coin => {
                    let id = state.next_entity_id();
                    state.effects.spawn_coin(id, anchor, now, &state.tuning);
                    state.session.add_score(state.tuning.coin_score);
                    log::info!("Coin block {:?} struck, score {}", block, state.session.score);
                }
                Payload::PowerUp => {
                    let id = state.next_entity_id();
                    state
                        .effects
                        .spawn_power_up(id, anchor, now, &state.tuning, physics);
                    log::info!("Power-up block {:?} struck", block);
                }
                Payload::Empty => {}
            }
            true
        }
        Outcome::PowerUpCollected { power_up } => {
            let now = state.time_ticks;
            state
                .effects
                .collect_power_up(power_up, now, &state.tuning, physics)
        }
        Outcome::EnemiesBounced { a, b } => {
            let mut bounced = false;
            for goomba in state
                .goombas
                .iter_mut()
                .filter(|g| g.alive && (g.id == a || g.id == b))
            {
                goomba.bounce_off_enemy();
                physics.set_velocity(goomba.id, goomba.vel);
                bounced = true;
            }
            bounced
        }
    }
}

/// Classify and apply every contact of the step in order. Stops at the first
/// contact that ends the session.
pub fn resolve(
    state: &mut GameState,
    physics: &mut dyn PhysicsAdapter,
    events: &[ContactEvent],
) -> Vec<Outcome> {
    let mut applied = Vec::new();
    for event in events {
        if state.session.game_over {
            break;
        }
        let Some(outcome) = classify(state, event) else {
            continue;
        };
        if apply(state, physics, outcome) {
            applied.push(outcome);
        }
    }
    applied
}
