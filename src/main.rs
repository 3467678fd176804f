//! Arcade engine entry point
//!
//! The browser build is driven through `platform::web`. Natively this runs a
//! headless session of each game with a simple autopilot and logs the result.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use arcade_engine::host::{LocalHost, TokenWallet};
    use arcade_engine::sim::{Direction, GameKind, GamePhase, Intent, Ruleset};
    use arcade_engine::{Arcade, ArcadeSettings};

    /// Frames simulated per game before giving up
    const MAX_FRAMES: u32 = 20_000;
    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Next intent: head for the nearest collectible (grid) or run right (platformer)
    fn autopilot(arcade: &Arcade<LocalHost>, frame: u32) -> Option<Intent> {
        let state = arcade.state()?;
        match state.ruleset {
            Ruleset::Grid(_) => {
                let grid = state.level.grid()?;
                let head = state.player.cell();
                state
                    .level
                    .collectibles
                    .iter()
                    .filter(|c| !c.is_collected())
                    .filter_map(|c| grid.path(head, c.cell()))
                    .min_by_key(|path| path.len())
                    .and_then(|path| path.first().copied())
                    .map(Intent::Move)
            }
            Ruleset::Physics(_) => {
                if frame % 40 == 0 {
                    Some(Intent::Jump)
                } else {
                    Some(Intent::Move(Direction::Right))
                }
            }
        }
    }

    fn play(kind: GameKind, seed: u64) {
        let host = LocalHost::new(Some("robot".into()), TokenWallet::free_play());
        let mut arcade = Arcade::new(kind, ArcadeSettings::default(), host, seed);
        let token = match arcade.start() {
            Ok(token) => token,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        let mut frame = 0;
        while frame < MAX_FRAMES && arcade.phase() == GamePhase::Playing {
            if let Some(intent) = autopilot(&arcade, frame) {
                arcade.submit_input(intent);
            }
            for event in arcade.advance(token, FRAME_DT) {
                log::debug!("{:?}", event);
            }
            frame += 1;
        }

        let snapshot = arcade.snapshot();
        println!(
            "{:<10} {:?} score={} lives={} frames={}",
            kind.as_str(),
            snapshot.phase,
            snapshot.score,
            snapshot.lives,
            frame
        );
    }

    pub fn run() {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        log::info!("Headless arcade run (seed {})", seed);

        for kind in [GameKind::Snake, GameKind::Maze, GameKind::Platformer] {
            play(kind, seed);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arcade engine (native) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::init, this is just to satisfy the compiler
}
