//! End-to-end gameplay scenarios driven through `tick`.

mod common;

use common::{ScriptedPhysics, flat_level, start_arcade};
use glam::Vec2;
use plumber::consts::SIM_DT;
use plumber::sim::{
    ContactEvent, DefeatCause, EntityId, GameState, GoombaSpawn, LevelLayout, Patrol, Payload,
    PhysicsAdapter, QuestionBlockSpec, Sides, TickInput, Tint, tick,
};
use plumber::{RenderFrame, Tuning};

fn run(state: &mut GameState, physics: &mut dyn PhysicsAdapter, input: TickInput, ticks: u32) {
    for _ in 0..ticks {
        tick(state, physics, &input, SIM_DT);
    }
}

fn question_block(state: &GameState) -> EntityId {
    state
        .blocks
        .iter()
        .find(|b| b.is_question())
        .map(|b| b.id)
        .expect("level has a question block")
}

#[test]
fn stomp_kills_enemy_and_bounces_player() {
    let mut layout = flat_level();
    layout.player_start = Vec2::new(300.0, 400.0);
    layout.goombas = vec![GoombaSpawn {
        position: Vec2::new(318.0, 552.0),
        direction: Patrol::MovingLeft,
    }];
    let (mut state, mut physics) = start_arcade(&layout);
    let enemy = state.goombas[0].id;

    let mut stomped_at = None;
    for _ in 0..40 {
        tick(&mut state, &mut physics, &TickInput::default(), SIM_DT);
        if state.goombas.is_empty() {
            stomped_at = Some(state.time_ticks);
            break;
        }
    }

    assert!(stomped_at.is_some(), "player never landed on the goomba");
    assert_eq!(state.player.vel.y, state.tuning.bounce_impulse);
    assert!(physics.body(enemy).is_none());
    assert!(!state.session.game_over);
    assert_eq!(state.session.score, 0);

    // The bounce carries the player back up
    tick(&mut state, &mut physics, &TickInput::default(), SIM_DT);
    assert!(state.player.vel.y < 0.0);
}

#[test]
fn landing_on_the_edge_of_a_walking_enemy_is_a_stomp() {
    // Goomba walks right under a player dropped from feet height 300. Near the
    // trailing edge the horizontal overlap at landing is shallower than the
    // vertical one; it must still count as landing on top.
    for step in 0..=68 {
        let x = 320.0 + step as f32 * 0.5;
        let mut layout = flat_level();
        layout.player_start = Vec2::new(x, 300.0);
        layout.goombas = vec![GoombaSpawn {
            position: Vec2::new(318.0, 552.0),
            direction: Patrol::MovingRight,
        }];
        let (mut state, mut physics) = start_arcade(&layout);

        for _ in 0..45 {
            tick(&mut state, &mut physics, &TickInput::default(), SIM_DT);
            if state.goombas.is_empty() || state.session.game_over {
                break;
            }
        }

        assert!(!state.session.game_over, "x = {x}: landing counted as a side hit");
        assert!(state.goombas.is_empty(), "x = {x}: goomba survived");
        assert_eq!(state.player.vel.y, state.tuning.bounce_impulse, "x = {x}");
    }
}

#[test]
fn side_hit_ends_the_run() {
    let mut layout = flat_level();
    layout.player_start = Vec2::new(100.0, 568.0);
    layout.goombas = vec![GoombaSpawn {
        position: Vec2::new(200.0, 552.0),
        direction: Patrol::MovingLeft,
    }];
    let (mut state, mut physics) = start_arcade(&layout);
    let right = TickInput {
        right: true,
        ..Default::default()
    };

    for _ in 0..60 {
        tick(&mut state, &mut physics, &right, SIM_DT);
        if state.session.game_over {
            break;
        }
    }

    assert!(state.session.game_over);
    assert_eq!(state.session.cause, Some(DefeatCause::EnemyContact));
    assert!(physics.is_paused());
    assert_eq!(state.session.score, 0);
    assert_eq!(state.goombas.len(), 1);
    assert_eq!(RenderFrame::capture(&state).sprites.last().unwrap().tint, Tint::Defeated);
}

#[test]
fn coin_block_scores_once_and_coin_expires() {
    let mut layout = flat_level();
    layout.question_blocks = vec![QuestionBlockSpec {
        grid_x: 6,
        grid_y: 5,
        payload: Payload::Coin,
    }];
    layout.player_start = Vec2::new(208.0, 568.0);
    let (mut state, mut physics) = start_arcade(&layout);
    let block = question_block(&state);
    let jump = TickInput {
        up: true,
        ..Default::default()
    };

    for _ in 0..60 {
        tick(&mut state, &mut physics, &jump, SIM_DT);
        if state.block(block).unwrap().activated {
            break;
        }
    }
    assert!(state.block(block).unwrap().activated);
    assert_eq!(state.session.score, 10);
    assert_eq!(state.effects.coins.len(), 1);
    assert_eq!(state.effects.coins[0].origin, Vec2::new(208.0, 408.0));

    // Keep jumping into the spent block while the coin plays out
    run(&mut state, &mut physics, jump, 47);
    assert_eq!(state.effects.coins.len(), 1);
    run(&mut state, &mut physics, jump, 1);
    assert!(state.effects.coins.is_empty());
    assert_eq!(state.effects.pending(), 0);

    run(&mut state, &mut physics, jump, 120);
    assert_eq!(state.session.score, 10);
    assert!(state.effects.coins.is_empty());
}

#[test]
fn power_up_pickup_grows_player_once() {
    let layout = LevelLayout {
        question_blocks: vec![QuestionBlockSpec {
            grid_x: 5,
            grid_y: 5,
            payload: Payload::PowerUp,
        }],
        player_start: Vec2::new(176.0, 568.0),
        ..flat_level()
    };
    let mut physics = ScriptedPhysics::default();
    let mut state = GameState::new(&layout, Tuning::default(), &mut physics);
    let player = state.player.id;
    let block = question_block(&state);

    physics.queue(ContactEvent {
        a: player,
        b: block,
        a_sides: Sides::UP,
        b_sides: Sides::DOWN,
        overlap_only: false,
    });
    tick(&mut state, &mut physics, &TickInput::default(), SIM_DT);
    assert_eq!(state.effects.power_ups.len(), 1);
    let pickup = state.effects.power_ups[0].id;
    assert_eq!(physics.gravity_of(pickup), Some(false));

    // Floats, then gravity takes over
    run(&mut state, &mut physics, TickInput::default(), 30);
    assert_eq!(physics.gravity_of(pickup), Some(true));

    let touch = ContactEvent {
        a: player,
        b: pickup,
        a_sides: Sides::NONE,
        b_sides: Sides::NONE,
        overlap_only: true,
    };
    physics.queue(touch.clone());
    physics.queue(touch);
    tick(&mut state, &mut physics, &TickInput::default(), SIM_DT);
    assert!(state.effects.power_ups.is_empty());
    assert!(physics.body(pickup).is_none());

    run(&mut state, &mut physics, TickInput::default(), 35);
    assert_eq!(state.player.scale, 1.0);
    assert_eq!(state.player.move_speed, 220.0);

    run(&mut state, &mut physics, TickInput::default(), 1);
    assert_eq!(state.player.scale, 1.5);
    assert_eq!(state.player.move_speed, 330.0);
    assert_eq!(physics.resized, vec![(player, Vec2::new(15.0, 37.5))]);

    run(&mut state, &mut physics, TickInput::default(), 120);
    assert_eq!(state.player.scale, 1.5);
    assert_eq!(state.player.move_speed, 330.0);
    assert_eq!(physics.resized.len(), 1);
}

#[test]
fn falling_into_a_hole_ends_the_run() {
    let (mut state, mut physics) = start_arcade(&LevelLayout::classic());
    let right = TickInput {
        right: true,
        ..Default::default()
    };

    for _ in 0..240 {
        tick(&mut state, &mut physics, &right, SIM_DT);
        if state.session.game_over {
            break;
        }
    }

    assert!(state.session.game_over);
    assert_eq!(state.session.cause, Some(DefeatCause::FellOffWorld));
    assert!(physics.is_paused());
    assert_eq!(state.player.tint, Tint::Defeated);
    // Went down the first hole, columns 10 (x 320..352)
    assert!(state.player.pos.x > 320.0 && state.player.pos.x < 352.0);
}
