//! Plumber entry point
//!
//! Headless demo: plays a scripted run through the classic level and logs
//! the HUD. Pass a tuning JSON path as the first argument to rebalance.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use plumber::RenderFrame;
    use plumber::Tuning;
    use plumber::consts::SIM_DT;
    use plumber::sim::{ArcadePhysics, FixedStep, GameState, LevelLayout, TickInput};

    env_logger::init();
    log::info!("Plumber (native) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => Tuning::load(&path).unwrap_or_else(|e| {
            log::error!("Failed to load tuning: {e}; using defaults");
            Tuning::default()
        }),
        None => Tuning::default(),
    };

    let layout = LevelLayout::classic();
    let mut physics = ArcadePhysics::new(tuning.gravity, layout.world_bounds());
    let mut state = GameState::new(&layout, tuning, &mut physics);
    let mut stepper = FixedStep::new(state.tuning.dt());

    'script: for (frames, input) in demo_script() {
        for _ in 0..frames {
            let ran = stepper.advance(SIM_DT, &mut state, &mut physics, &input);
            if ran > 0 && state.time_ticks % 60 == 0 {
                let frame = RenderFrame::capture(&state);
                log::info!(
                    "t={:>4} {} player=({:.0}, {:.0}) camera.x={:.0}",
                    state.time_ticks,
                    frame.hud_text,
                    frame.follow_target.x,
                    frame.follow_target.y,
                    frame.camera.x
                );
            }
            if state.session.game_over {
                break 'script;
            }
        }
    }

    // Let pending effects play out
    for _ in 0..60 {
        stepper.advance(SIM_DT, &mut state, &mut physics, &TickInput::default());
    }

    let frame = RenderFrame::capture(&state);
    println!("ticks:     {}", state.time_ticks);
    println!("{}", frame.hud_text);
    println!("goombas:   {}", state.goombas.len());
    println!("scale:     {:.2}", state.player.scale);
    match state.session.cause {
        Some(cause) => println!("game over: {cause:?}"),
        None => println!("still running"),
    }
}

/// (frames to hold, input) pairs
#[cfg(not(target_arch = "wasm32"))]
fn demo_script() -> Vec<(u32, plumber::sim::TickInput)> {
    use plumber::sim::TickInput;

    let idle = TickInput::default();
    let right = TickInput {
        right: true,
        ..idle
    };
    let jump_right = TickInput {
        right: true,
        up: true,
        ..idle
    };
    let left = TickInput { left: true, ..idle };

    vec![
        (30, idle),
        // Under the first question block
        (29, right),
        (1, jump_right),
        (50, idle),
        (40, right),
        (1, jump_right),
        (60, right),
        (20, left),
        (1, jump_right),
        (240, right),
    ]
}

#[cfg(target_arch = "wasm32")]
fn main() {}
