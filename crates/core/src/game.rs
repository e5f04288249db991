//! Game module - lifecycle, scoreboard wiring and the fixed tick
//!
//! [`Game`] owns one loaded map at a time. It runs the scene pipeline and
//! fills the `Stats` phase itself: the timer steps, scene events are folded
//! into the [`Scoreboard`], and the scoreboard decides when play ends.

use std::fmt;

use log::{debug, info, warn};

use crate::input::{InputSource, KeyBindings};
use crate::map::{MapData, MapError};
use crate::render::RenderSink;
use crate::scene::{Scene, TickPhase};
use crate::stats::{Reaction, Scoreboard};
use crate::types::GameEvent;

/// Final result of one map run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub won: bool,
    pub map_name: String,
    pub points: i32,
    pub max_points: i32,
    pub hp: i32,
    pub ticks: u64,
    /// Play time as `MM:SS.ss`.
    pub time: String,
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} `{}` in {} ({}/{} stars, {} hp)",
            if self.won { "won" } else { "lost" },
            self.map_name,
            self.time,
            self.points,
            self.max_points,
            self.hp
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Loaded,
    Running,
    Paused,
    Ended(GameSummary),
}

pub struct Game {
    seed: u32,
    bindings: KeyBindings,
    map: Option<MapData>,
    scene: Option<Scene>,
    scoreboard: Scoreboard,
    lifecycle: Lifecycle,
    /// Events processed during the current tick, returned to the caller.
    tick_events: Vec<GameEvent>,
}

impl Game {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            bindings: KeyBindings::default(),
            map: None,
            scene: None,
            scoreboard: Scoreboard::default(),
            lifecycle: Lifecycle::Uninitialized,
            tick_events: Vec::new(),
        }
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Replace the current map. Any previous scene is unmounted first.
    pub fn load(&mut self, map: MapData, sink: &mut dyn RenderSink) -> Result<(), MapError> {
        if let Some(old) = self.scene.take() {
            old.unmount_all(sink);
        }
        let scene = Scene::load(&map, self.seed, false, sink)?.with_bindings(self.bindings);
        self.scoreboard = Scoreboard::new(&map.config);
        self.scene = Some(scene);
        self.map = Some(map);
        self.lifecycle = Lifecycle::Loaded;
        Ok(())
    }

    /// Reload the current map from scratch and start it.
    pub fn restart(&mut self, sink: &mut dyn RenderSink) -> Result<(), MapError> {
        let Some(map) = self.map.take() else {
            warn!("restart requested with no map loaded");
            return Ok(());
        };
        info!("restarting `{}`", map.metadata.name);
        self.load(map, sink)?;
        self.start();
        Ok(())
    }

    /// Loaded -> Running. Returns false from any other state.
    pub fn start(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Loaded {
            return false;
        }
        self.lifecycle = Lifecycle::Running;
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Running {
            return false;
        }
        self.lifecycle = Lifecycle::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Paused {
            return false;
        }
        self.lifecycle = Lifecycle::Running;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.lifecycle {
            Lifecycle::Running => self.pause(),
            Lifecycle::Paused => self.resume(),
            _ => false,
        }
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn is_paused(&self) -> bool {
        self.lifecycle == Lifecycle::Paused
    }

    pub fn summary(&self) -> Option<&GameSummary> {
        match &self.lifecycle {
            Lifecycle::Ended(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn map(&self) -> Option<&MapData> {
        self.map.as_ref()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// One tick while running. Returns the events processed this tick.
    pub fn tick(&mut self, input: &dyn InputSource, sink: &mut dyn RenderSink) -> Vec<GameEvent> {
        self.tick_observed(input, sink, |_| {})
    }

    /// Like [`Game::tick`], calling `after_phase` once each phase finishes.
    pub fn tick_observed(
        &mut self,
        input: &dyn InputSource,
        sink: &mut dyn RenderSink,
        mut after_phase: impl FnMut(TickPhase),
    ) -> Vec<GameEvent> {
        if !self.is_running() {
            return Vec::new();
        }
        for phase in TickPhase::ALL {
            self.run_phase(phase, input, sink);
            after_phase(phase);
        }
        std::mem::take(&mut self.tick_events)
    }

    /// One tick while paused.
    pub fn step(&mut self, input: &dyn InputSource, sink: &mut dyn RenderSink) -> Vec<GameEvent> {
        if !self.is_paused() {
            return Vec::new();
        }
        debug!("single step at tick {}", self.scoreboard.timer.ticks());
        self.advance(input, sink)
    }

    fn advance(&mut self, input: &dyn InputSource, sink: &mut dyn RenderSink) -> Vec<GameEvent> {
        for phase in TickPhase::ALL {
            self.run_phase(phase, input, sink);
        }
        std::mem::take(&mut self.tick_events)
    }

    /// Run a single phase. Exposed so callers can time phases individually.
    pub fn run_phase(
        &mut self,
        phase: TickPhase,
        input: &dyn InputSource,
        sink: &mut dyn RenderSink,
    ) {
        match phase {
            TickPhase::Stats => self.mediator_update(sink),
            _ => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.run_phase(phase, input, sink);
                }
            }
        }
    }

    fn mediator_update(&mut self, sink: &mut dyn RenderSink) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        self.scoreboard.timer.step();

        let mut queue = scene.take_events();
        let mut i = 0;
        while i < queue.len() {
            let event = queue[i];
            i += 1;
            debug!("event {:?}", event);
            match self.scoreboard.apply(&event) {
                Reaction::None => {}
                Reaction::Emit(next) => queue.push(next),
                Reaction::Respawn => scene.respawn_player(sink),
                Reaction::End { won } => {
                    if !matches!(self.lifecycle, Lifecycle::Ended(_)) {
                        let summary = summarize(won, &scene.metadata().name, &self.scoreboard);
                        info!("game over: {summary}");
                        self.lifecycle = Lifecycle::Ended(summary);
                    }
                }
            }
        }
        self.tick_events.extend(queue);
    }
}

fn summarize(won: bool, map_name: &str, board: &Scoreboard) -> GameSummary {
    GameSummary {
        won,
        map_name: map_name.to_owned(),
        points: board.points.val(),
        max_points: board.points.max_val(),
        hp: board.hp.val(),
        ticks: board.timer.ticks(),
        time: board.timer.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, ObjectSpec};
    use crate::map::{create_empty_map, MapConfig, MapMetadata, Spawn};
    use crate::render::NullSink;
    use crate::types::{DirectionSet, Offset, Size};

    fn star_map() -> MapData {
        MapData {
            metadata: MapMetadata {
                name: "stars".into(),
                game_version: "0".into(),
                authors: vec![],
            },
            config: MapConfig {
                hp: 1,
                points: 1,
                winning_ball: false,
            },
            spawns: vec![
                Spawn::Player {
                    pos: Offset::new(2, 2),
                    layer_number: 1,
                },
                Spawn::Object(ObjectSpec {
                    kind: EntityKind::Floor,
                    pos: Offset::new(0, 3),
                    size: Size::new(8, 1),
                    layer_number: 1,
                }),
                Spawn::Object(ObjectSpec::with_defaults(EntityKind::Star, Offset::new(2, 1))),
            ],
            extras: Vec::new(),
        }
    }

    #[test]
    fn lifecycle_transitions() {
        let mut game = Game::new(7);
        assert_eq!(*game.lifecycle(), Lifecycle::Uninitialized);
        assert!(!game.start());
        game.load(star_map(), &mut NullSink).unwrap();
        assert_eq!(*game.lifecycle(), Lifecycle::Loaded);
        assert!(!game.pause());
        assert!(game.start());
        assert!(game.toggle_pause());
        assert!(game.is_paused());
        assert!(game.resume());
        assert!(game.is_running());
    }

    #[test]
    fn tick_only_advances_while_running() {
        // Nothing to collect, so the game never ends on its own.
        let empty = MapData::from_descriptor(&create_empty_map("idle", &[]), "idle").unwrap();
        let mut game = Game::new(7);
        game.load(empty, &mut NullSink).unwrap();
        let input = DirectionSet::empty();
        game.tick(&input, &mut NullSink);
        assert_eq!(game.scoreboard().timer.ticks(), 0);
        game.start();
        game.tick(&input, &mut NullSink);
        assert_eq!(game.scoreboard().timer.ticks(), 1);
        assert!(game.step(&input, &mut NullSink).is_empty());
        assert_eq!(game.scoreboard().timer.ticks(), 1);
        assert!(game.pause());
        game.tick(&input, &mut NullSink);
        assert_eq!(game.scoreboard().timer.ticks(), 1);
        game.step(&input, &mut NullSink);
        assert_eq!(game.scoreboard().timer.ticks(), 2);
    }

    #[test]
    fn star_above_player_is_collected_on_first_tick() {
        // Idle player probes the tile above every tick, so the star is
        // picked up immediately and it was the only one.
        let mut game = Game::new(7);
        game.load(star_map(), &mut NullSink).unwrap();
        game.start();
        let events = game.tick(&DirectionSet::empty(), &mut NullSink);
        assert_eq!(
            events,
            vec![GameEvent::PointCollected(1), GameEvent::EndGame { won: true }]
        );
        let summary = game.summary().unwrap();
        assert!(summary.won);
        assert_eq!(summary.points, 1);
        assert_eq!(summary.map_name, "stars");
        assert_eq!(game.scene().unwrap().object_count(), 1);
    }

    #[test]
    fn restart_resets_score_and_scene() {
        let mut game = Game::new(7);
        game.load(star_map(), &mut NullSink).unwrap();
        game.start();
        game.tick(&DirectionSet::empty(), &mut NullSink);
        game.restart(&mut NullSink).unwrap();
        assert!(game.is_running());
        assert_eq!(game.scoreboard().points.val(), 0);
        assert_eq!(game.scoreboard().timer.ticks(), 0);
        assert_eq!(game.scene().unwrap().object_count(), 2);
    }
}
