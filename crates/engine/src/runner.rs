//! Runner module - the async fixed-tick game loop
//!
//! One loop iteration: read the pause/step/stop flags, snapshot input, run
//! one tick, present, then wait for the next frame deadline. The instrumented
//! mode additionally times every phase and hands a [`PerfReport`] to the
//! presenter.

use std::time::Instant;

use anyhow::Result;
use log::{debug, info};
use tokio::time::Duration;

use crate::clock::FrameClock;
use crate::config::EngineConfig;
use crate::control::LoopControl;
use crate::core::render::RenderSink;
use crate::core::{Game, GameSummary, InputFeed};
use crate::perf::{PerfProbe, PerfReport};
use crate::types::PAUSE_POLL_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Normal,
    /// Time each phase and report averages.
    Instrumented,
}

/// Why [`GameLoop::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    Ended(GameSummary),
    Stopped,
    Restart,
}

/// Presentation side of the loop.
pub trait Presenter {
    /// Sink receiving scene changes during a tick.
    fn sink(&mut self) -> &mut dyn RenderSink;

    /// Show the current state. Called once per frame, and while paused.
    fn present(&mut self, game: &Game, perf: Option<&PerfReport>) -> Result<()>;
}

pub struct GameLoop {
    config: EngineConfig,
    control: LoopControl,
    mode: RunMode,
}

impl GameLoop {
    pub fn new(config: EngineConfig, control: LoopControl) -> Self {
        let mode = if config.debug.fps {
            RunMode::Instrumented
        } else {
            RunMode::Normal
        };
        Self {
            config,
            control,
            mode,
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn control(&self) -> &LoopControl {
        &self.control
    }

    /// Drive `game` until it ends or the loop is stopped or restarted.
    pub async fn run<P, F>(
        &mut self,
        game: &mut Game,
        presenter: &mut P,
        input: &F,
    ) -> Result<LoopExit>
    where
        P: Presenter + ?Sized,
        F: InputFeed + ?Sized,
    {
        game.start();
        let mut clock = FrameClock::new(self.config.frame_interval());
        let mut probe = PerfProbe::new();
        let mut last_frame = Instant::now();
        info!(
            "loop started: {} fps, {:?} mode",
            self.config.target_fps, self.mode
        );

        loop {
            if self.control.should_stop() {
                info!("loop stopped after {} frames", clock.frames());
                return Ok(LoopExit::Stopped);
            }
            if self.control.take_restart() {
                return Ok(LoopExit::Restart);
            }
            self.sync_pause(game, &mut clock);

            if game.is_paused() {
                if self.control.take_step() {
                    let keys = input.snapshot();
                    game.step(&keys, presenter.sink());
                } else {
                    presenter.present(game, None)?;
                    self.control
                        .idle(Duration::from_millis(PAUSE_POLL_MS))
                        .await;
                    continue;
                }
            } else {
                let keys = input.snapshot();
                match self.mode {
                    RunMode::Normal => {
                        game.tick(&keys, presenter.sink());
                    }
                    RunMode::Instrumented => {
                        let mut mark = Instant::now();
                        game.tick_observed(&keys, presenter.sink(), |phase| {
                            let now = Instant::now();
                            probe.record(phase, now - mark);
                            mark = now;
                        });
                    }
                }
            }

            let now = Instant::now();
            probe.record_frame(now - last_frame);
            last_frame = now;

            let report = match self.mode {
                RunMode::Instrumented => Some(probe.report()),
                RunMode::Normal => None,
            };
            presenter.present(game, report.as_ref())?;

            if let Some(summary) = game.summary() {
                info!("loop finished: {summary}");
                return Ok(LoopExit::Ended(summary.clone()));
            }
            clock.tick().await;
        }
    }

    fn sync_pause(&self, game: &mut Game, clock: &mut FrameClock) {
        let want_paused = self.control.is_paused();
        if want_paused && game.is_running() {
            game.pause();
            debug!("paused");
        } else if !want_paused && game.is_paused() {
            game.resume();
            clock.rebase();
            debug!("resumed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::map::{create_empty_map, MapData, MapDescriptor, ObjectRecord};
    use crate::core::render::NullSink;
    use crate::core::PressedKeys;
    use crate::types::Offset;

    struct CountingPresenter {
        sink: NullSink,
        frames: u32,
        stop_after: Option<(u32, LoopControl)>,
    }

    impl CountingPresenter {
        fn new() -> Self {
            Self {
                sink: NullSink,
                frames: 0,
                stop_after: None,
            }
        }
    }

    impl Presenter for CountingPresenter {
        fn sink(&mut self) -> &mut dyn RenderSink {
            &mut self.sink
        }

        fn present(&mut self, _game: &Game, _perf: Option<&PerfReport>) -> Result<()> {
            self.frames += 1;
            if let Some((limit, control)) = &self.stop_after {
                if self.frames >= *limit {
                    control.stop();
                }
            }
            Ok(())
        }
    }

    fn loaded(desc: &MapDescriptor) -> Game {
        let map = MapData::from_descriptor(desc, "test").unwrap();
        let mut game = Game::new(1);
        game.load(map, &mut NullSink).unwrap();
        game
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_honoured_at_frame_boundary() {
        let control = LoopControl::new();
        let config = EngineConfig::default();
        let interval = config.frame_interval();
        let mut game = loaded(&create_empty_map("idle", &[]));
        let mut presenter = CountingPresenter {
            stop_after: Some((5, control.clone())),
            ..CountingPresenter::new()
        };

        let start = tokio::time::Instant::now();
        let exit = GameLoop::new(config, control)
            .run(&mut game, &mut presenter, &PressedKeys::new())
            .await
            .unwrap();

        assert_eq!(exit, LoopExit::Stopped);
        assert_eq!(presenter.frames, 5);
        assert_eq!(game.scoreboard().timer.ticks(), 5);
        // The paused clock advances in whole milliseconds.
        let target = interval * 5;
        let slack = Duration::from_millis(5);
        let elapsed = start.elapsed();
        assert!(
            elapsed + slack >= target && elapsed <= target + slack,
            "{elapsed:?} vs {target:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn collecting_the_only_star_ends_the_loop() {
        let mut desc = create_empty_map("one star", &[]);
        desc.objects.push(ObjectRecord::new("Star", Offset::new(10, 9)));
        let mut game = loaded(&desc);
        let mut presenter = CountingPresenter::new();

        let exit = GameLoop::new(EngineConfig::default(), LoopControl::new())
            .with_mode(RunMode::Instrumented)
            .run(&mut game, &mut presenter, &PressedKeys::new())
            .await
            .unwrap();

        match exit {
            LoopExit::Ended(summary) => {
                assert!(summary.won);
                assert_eq!(summary.points, 1);
            }
            other => panic!("unexpected exit {other:?}"),
        }
        assert_eq!(presenter.frames, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_loop_only_advances_on_step() {
        let control = LoopControl::new();
        control.set_paused(true);
        control.request_step();
        control.request_step();
        let mut game = loaded(&create_empty_map("paused", &[]));
        let mut presenter = CountingPresenter {
            stop_after: Some((6, control.clone())),
            ..CountingPresenter::new()
        };

        let exit = GameLoop::new(EngineConfig::default(), control)
            .run(&mut game, &mut presenter, &PressedKeys::new())
            .await
            .unwrap();

        assert_eq!(exit, LoopExit::Stopped);
        assert!(game.is_paused());
        assert_eq!(game.scoreboard().timer.ticks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_request_exits_before_ticking() {
        let control = LoopControl::new();
        control.request_restart();
        let mut game = loaded(&create_empty_map("again", &[]));
        let mut presenter = CountingPresenter::new();
        let exit = GameLoop::new(EngineConfig::default(), control)
            .run(&mut game, &mut presenter, &PressedKeys::new())
            .await
            .unwrap();
        assert_eq!(exit, LoopExit::Restart);
        assert_eq!(presenter.frames, 0);
    }
}
