//! Pinbound headless driver
//!
//! Plays a scripted attempt on one level through the fixed-timestep loop and
//! logs every event. Run with `RUST_LOG=info`.
//!
//! Environment:
//! - `PINBOUND_TUNING`: path to a JSON tuning file (optional)
//! - `PINBOUND_LEVEL`: level to play (default 1)

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;

    use pinbound::consts::*;
    use pinbound::sim::{DragEvent, GameEvent, Outcome, TickInput};
    use pinbound::{
        CueMixer, GameSession, KeyValueStore, MemoryStore, Playfield, ProgressStore, ShotTuning,
    };

    /// Host frame rate of the simulated display
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up after this many frames
    const MAX_FRAMES: u32 = 60 * 60;

    /// Pull-back drags, one per shot (drag start minus drag end)
    const SCRIPT: &[Vec2] = &[
        Vec2::new(70.0, 55.0),
        Vec2::new(90.0, 40.0),
        Vec2::new(100.0, 20.0),
        Vec2::new(60.0, 80.0),
        Vec2::new(85.0, 30.0),
        Vec2::new(95.0, 60.0),
    ];

    /// Session plus the frame accumulator
    struct Driver<S> {
        session: GameSession<S>,
        mixer: CueMixer,
        accumulator: f32,
        input: TickInput,
        next_shot: usize,
    }

    impl<S: KeyValueStore> Driver<S> {
        fn new(session: GameSession<S>) -> Self {
            Self {
                session,
                mixer: CueMixer::default(),
                accumulator: 0.0,
                input: TickInput::default(),
                next_shot: 0,
            }
        }

        /// Queue the next scripted shot when the ball is at rest
        fn script_input(&mut self) {
            let level = self.session.level();
            if level.is_resolved() || level.is_ball_moving() || self.input.drag.is_some() {
                return;
            }
            let Some(&drag) = SCRIPT.get(self.next_shot) else { return };
            self.next_shot += 1;

            // Touch near the ball and pull back
            let start = level.ball.pos + Vec2::new(0.0, 40.0);
            if self.session.drag_begin(start) {
                self.session.drag_move(start - drag * 0.5);
                self.input.drag = Some(DragEvent::End(start - drag));
            }
        }

        /// Run simulation ticks for one host frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                let events = self.session.step(&input);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input = TickInput::default();

                for event in events {
                    self.report(event);
                }
            }
        }

        fn report(&self, event: GameEvent) {
            let cue = event.sound_cue();
            let gain = cue.and_then(|cue| self.mixer.gain(cue));
            match (cue, gain) {
                (Some(cue), Some(gain)) => {
                    log::info!("{:?} (cue {:?} at {:.2})", event, cue, gain)
                }
                _ => log::info!("{:?}", event),
            }
        }
    }

    fn load_tuning() -> ShotTuning {
        let Ok(path) = std::env::var("PINBOUND_TUNING") else {
            return ShotTuning::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => ShotTuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Could not read tuning file {} ({}), using defaults", path, e);
                ShotTuning::default()
            }
        }
    }

    fn requested_level() -> u32 {
        match std::env::var("PINBOUND_LEVEL") {
            Ok(value) => match value.trim().parse::<u32>() {
                Ok(level) if level > 0 => level,
                _ => {
                    log::warn!("Invalid PINBOUND_LEVEL {:?}, playing level 1", value);
                    1
                }
            },
            Err(_) => 1,
        }
    }

    pub fn run() {
        let tuning = load_tuning();
        let level = requested_level();

        // Fresh in-memory progress with the requested level unlocked
        let mut progress = ProgressStore::new(MemoryStore::new());
        progress.load_progress();
        progress.unlock_level(level);
        progress.set_current_level(level);

        let session = GameSession::new(progress.into_inner(), tuning, Playfield::default());
        let mut driver = Driver::new(session);

        let mut frames = 0;
        while frames < MAX_FRAMES && !driver.session.level().is_resolved() {
            driver.script_input();
            driver.update(FRAME_DT);
            frames += 1;
        }

        let level = driver.session.level();
        match level.outcome() {
            Some(Outcome::LevelComplete { stars, coins }) => log::info!(
                "Level {} complete after {} frames: {} stars, {} coins",
                level.level_id(),
                frames,
                stars,
                coins
            ),
            Some(Outcome::GameOver) => {
                log::info!("Level {} failed after {} frames", level.level_id(), frames)
            }
            None => log::info!(
                "Level {} unresolved after {} frames, {} shots left",
                level.level_id(),
                frames,
                level.shots.shots_remaining
            ),
        }
        log::info!(
            "Best stars: {}, total coins: {}",
            driver.session.progress().best_stars(level.level_id()),
            driver.session.coins()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pinbound (native) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives the library directly, this is just to satisfy the compiler
}
