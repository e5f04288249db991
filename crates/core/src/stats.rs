//! Stats module - points, life points and play time
//!
//! The scoreboard is the consumer of [`GameEvent`]s. It decides when the
//! game is over; the scene never does.

use std::fmt;
use std::time::Duration;

use crate::map::MapConfig;
use crate::types::{GameEvent, TARGET_FPS};

/// A bounded counter, e.g. stars collected out of stars on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointSystem {
    val: i32,
    max_val: i32,
}

impl PointSystem {
    pub fn val(&self) -> i32 {
        self.val
    }

    pub fn max_val(&self) -> i32 {
        self.max_val
    }

    pub fn add(&mut self, delta: i32) {
        self.val += delta;
    }

    pub fn clear(&mut self) {
        self.val = 0;
    }

    pub fn set_max(&mut self, max_val: i32) {
        self.max_val = max_val;
    }

    pub fn is_finished(&self) -> bool {
        self.max_val <= self.val
    }

    /// Life points start full.
    pub fn full(max_val: i32) -> Self {
        Self {
            val: max_val,
            max_val,
        }
    }
}

/// Simulated play time, counted in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayTimer {
    ticks: u64,
}

impl PlayTimer {
    pub fn step(&mut self) {
        self.ticks += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.ticks * 1_000_000 / TARGET_FPS as u64)
    }
}

impl fmt::Display for PlayTimer {
    /// `MM:SS.ss`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let centis = self.elapsed().as_millis() / 10;
        let minutes = centis / 6000;
        let seconds = (centis / 100) % 60;
        let hundredths = centis % 100;
        write!(f, "{minutes:02}:{seconds:02}.{hundredths:02}")
    }
}

/// How the scoreboard reacts to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    None,
    /// A follow-up event to process in the same tick.
    Emit(GameEvent),
    End { won: bool },
    /// A life was lost but some remain.
    Respawn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub points: PointSystem,
    pub hp: PointSystem,
    pub timer: PlayTimer,
    end_ball_to_win: bool,
}

impl Scoreboard {
    pub fn new(config: &MapConfig) -> Self {
        let mut points = PointSystem::default();
        points.set_max(config.points);
        Self {
            points,
            hp: PointSystem::full(config.hp),
            timer: PlayTimer::default(),
            end_ball_to_win: config.winning_ball,
        }
    }

    pub fn end_ball_to_win(&self) -> bool {
        self.end_ball_to_win
    }

    pub fn apply(&mut self, event: &GameEvent) -> Reaction {
        match *event {
            GameEvent::PointCollected(delta) => {
                self.points.add(delta);
                if self.points.is_finished() && !self.end_ball_to_win {
                    Reaction::Emit(GameEvent::EndGame { won: true })
                } else {
                    Reaction::None
                }
            }
            GameEvent::EndBallCollected => Reaction::None,
            GameEvent::HpChange(delta) => {
                self.hp.add(delta);
                Reaction::None
            }
            GameEvent::EndGame { won: true } => Reaction::End { won: true },
            GameEvent::EndGame { won: false } => {
                if self.hp.val() <= 0 {
                    Reaction::End { won: false }
                } else {
                    Reaction::Respawn
                }
            }
        }
    }
}
