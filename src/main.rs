//! Meteor Fall entry point
//!
//! The browser build is driven from JS through `meteor_fall::web`. Natively
//! this runs one headless session with a stationary player and prints how
//! long it lasted.
//!
//! Usage: meteor-fall [seed] [max_seconds]

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use meteor_fall::GameConfig;
    use meteor_fall::sim::{GameEvent, GameFlow, GamePhase};

    env_logger::init();
    log::info!("Meteor Fall (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345u64);
    let max_seconds: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120);

    let mut flow = GameFlow::new(GameConfig::default());
    if let Err(e) = flow.play(seed) {
        eprintln!("Could not start: {e}");
        std::process::exit(1);
    }

    const FRAME_MS: f64 = 1000.0 / 60.0;
    let max_frames = max_seconds * 60;
    let mut frames = 0;
    while flow.phase() == GamePhase::Game && frames < max_frames {
        for event in flow.frame(FRAME_MS) {
            match event {
                GameEvent::TileStruck(c) => log::info!("Tile ({}, {}) destroyed", c.x, c.z),
                GameEvent::TileRecovered(c) => log::info!("Tile ({}, {}) recovered", c.x, c.z),
                GameEvent::PlayerHit(id) => log::info!("Meteor {} hit the player", id.0),
                _ => {}
            }
        }
        frames += 1;
    }

    match flow.last_run() {
        Some(run) => println!(
            "Run over ({:?}): survived {:.1} s, {} meteors, {} tiles destroyed",
            run.cause,
            run.survived_ms as f64 / 1000.0,
            run.hazards_spawned,
            run.tiles_struck
        ),
        None => {
            if let Err(e) = flow.forfeit() {
                log::warn!("Could not end the run cleanly: {e}");
            }
            println!("Survived the full {max_seconds} s");
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is meteor_fall::web::start, this is just to satisfy the compiler
}
