//! Player state machine.
//!
//! A [`State`] is a tag ([`StateKind`], with payload for the roof states) plus
//! the animation it plays and the drift it applies every tick. Transitions are
//! computed by [`State::handle_input`] and [`State::update`], which return the
//! replacement state instead of mutating a back-reference to the player; the
//! player swaps it in wholesale.

use crate::faze::Faze;
use crate::types::{Direction, DirectionSet, GameEvent, Offset};

const EDIT_FRAMES: &[&str] = &["▄", "▃"];
const START_FRAMES: &[&str] = &[
    "🬞", "🬏", "🬖", "🬢", "🬗", "🬤", "🬗", "🬤", "🬧", "🬔", "▐", "🬷", "🬻", "█", "🬎", "▀", "🮃", "🮂",
];
const BLANK_FRAMES: &[&str] = &[" "];
const WIN_FRAMES: &[&str] = &["▀"];
const DYING_FRAMES: &[&str] = &["▙", "▟", "▜", "▀", "▘", "▖"];
const STAY_FRAMES: &[&str] = &["▂", "▃", "▄", "▃"];
const CRUNCH_FRAMES: &[&str] = &["▁", "▁", "▁", "▁", "▁", "▁", "▁", "▁", "▂", "▂", "▂", "▂"];
const MOVE_FRAMES: &[&str] = &["▂", "▄"];
const POST_FALL_FRAMES: &[&str] = &["╻", "▂"];
const FALL_FRAMES: &[&str] = &["┃"];
const PRE_JUMP_FRAMES: &[&str] = &["▂", "╻", "┃"];
const JUMP_FRAMES: &[&str] = &["┃"];
const TOP_FRAMES: &[&str] = &["┃", "╹", "🮂", "🮂", "╹"];
const ROOF_FRAMES: &[&str] = &["🮃", "▀"];
const ROOF_COYOTE_FRAMES: &[&str] = &["🮃", "🮂"];

/// Grace ticks granted by pressing up while hanging on a roof.
pub const ROOF_JUMP_GRACE: u8 = 2;
/// Base length of the coyote window after leaving a roof.
pub const ROOF_COYOTE_FRAMES_BASE: u32 = 4;

/// Fieldless state identifier, handy for assertions and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    Edit,
    Start,
    NoState,
    Dead,
    Win,
    Dying,
    Stay,
    Crunch,
    Move,
    PostFall,
    Fall,
    PreJump,
    Jump,
    Top,
    Roof,
    RoofCoyote,
}

/// State tag plus per-kind data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Edit,
    Start,
    NoState,
    Dead,
    Win,
    Dying,
    Stay,
    Crunch,
    Move,
    PostFall,
    Fall,
    PreJump,
    Jump,
    Top,
    Roof {
        /// Remaining ticks in which losing the roof still allows a re-jump.
        can_roof_jump: u8,
        should_fall_down: bool,
    },
    RoofCoyote {
        /// Grace carried over from the roof; extends the window.
        grace: u8,
        can_roof_jump: bool,
        should_fall_down: bool,
    },
}

impl StateKind {
    pub fn id(&self) -> StateId {
        match self {
            StateKind::Edit => StateId::Edit,
            StateKind::Start => StateId::Start,
            StateKind::NoState => StateId::NoState,
            StateKind::Dead => StateId::Dead,
            StateKind::Win => StateId::Win,
            StateKind::Dying => StateId::Dying,
            StateKind::Stay => StateId::Stay,
            StateKind::Crunch => StateId::Crunch,
            StateKind::Move => StateId::Move,
            StateKind::PostFall => StateId::PostFall,
            StateKind::Fall => StateId::Fall,
            StateKind::PreJump => StateId::PreJump,
            StateKind::Jump => StateId::Jump,
            StateKind::Top => StateId::Top,
            StateKind::Roof { .. } => StateId::Roof,
            StateKind::RoofCoyote { .. } => StateId::RoofCoyote,
        }
    }
}

/// Physical data a state reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Body {
    pub offset: Offset,
    pub velocity: Offset,
    pub is_on_ground: bool,
    pub is_on_roof: bool,
}

/// The active behavior of a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    kind: StateKind,
    faze: Faze,
    direction: Offset,
}

impl State {
    pub fn new(kind: StateKind) -> Self {
        let (max_frame, animation, direction): (u32, &'static [&'static str], Offset) = match kind
        {
            StateKind::Edit => (27, EDIT_FRAMES, Offset::new(0, 1)),
            StateKind::Start => (START_FRAMES.len() as u32 * 2, START_FRAMES, Offset::ZERO),
            StateKind::NoState | StateKind::Dead => (1, BLANK_FRAMES, Offset::ZERO),
            StateKind::Win => (1, WIN_FRAMES, Offset::ZERO),
            StateKind::Dying => (15, DYING_FRAMES, Offset::ZERO),
            StateKind::Stay => (18, STAY_FRAMES, Offset::new(0, 1)),
            StateKind::Crunch => (12, CRUNCH_FRAMES, Offset::new(0, 1)),
            StateKind::Move => (15, MOVE_FRAMES, Offset::new(0, 1)),
            StateKind::PostFall => (2, POST_FALL_FRAMES, Offset::new(0, 1)),
            StateKind::Fall => (1, FALL_FRAMES, Offset::new(0, 1)),
            StateKind::PreJump => (6, PRE_JUMP_FRAMES, Offset::ZERO),
            StateKind::Jump => (4, JUMP_FRAMES, Offset::new(0, -1)),
            StateKind::Top => (5, TOP_FRAMES, Offset::ZERO),
            StateKind::Roof { .. } => (9, ROOF_FRAMES, Offset::ZERO),
            StateKind::RoofCoyote { grace, .. } => (
                ROOF_COYOTE_FRAMES_BASE + grace as u32,
                ROOF_COYOTE_FRAMES,
                Offset::ZERO,
            ),
        };
        Self {
            kind,
            faze: Faze::new(max_frame, animation),
            direction,
        }
    }

    pub fn roof() -> Self {
        Self::new(StateKind::Roof {
            can_roof_jump: 0,
            should_fall_down: false,
        })
    }

    /// Coyote window after leaving a roof with `grace` ticks of jump credit.
    pub fn roof_coyote(grace: u8) -> Self {
        let grace = grace.min(ROOF_JUMP_GRACE);
        Self::new(StateKind::RoofCoyote {
            grace,
            can_roof_jump: grace > 1,
            should_fall_down: false,
        })
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn id(&self) -> StateId {
        self.kind.id()
    }

    /// Per-tick drift applied to the velocity at the start of every tick.
    pub fn direction(&self) -> Offset {
        self.direction
    }

    pub fn faze(&self) -> &Faze {
        &self.faze
    }

    pub fn max_frame(&self) -> u32 {
        self.faze.max_frame()
    }

    /// Damage is ignored while this is true.
    pub fn immortal(&self) -> bool {
        matches!(
            self.kind,
            StateKind::Edit
                | StateKind::Start
                | StateKind::NoState
                | StateKind::Dead
                | StateKind::Win
                | StateKind::Dying
        )
    }

    /// Hook run when this state becomes active.
    pub fn enter(&mut self) {}

    /// Hook run when this state is replaced.
    pub fn exit(&mut self) {}

    /// Glyph for this tick; advances the animation.
    pub fn get_frame(&mut self) -> &'static str {
        self.faze.get_frame()
    }

    fn complete(&self) -> bool {
        self.faze.is_complete()
    }

    /// React to the logical input of this tick.
    pub fn handle_input(&mut self, body: &mut Body, dirs: DirectionSet) -> Option<State> {
        let dx = dirs.horizontal();
        if dx != 0 {
            body.velocity = Offset::new(dx, body.velocity.y);
        }

        let up = dirs.contains(Direction::Up);
        let down = dirs.contains(Direction::Down);
        let sideways = dirs.contains(Direction::Left) || dirs.contains(Direction::Right);

        match &mut self.kind {
            StateKind::Stay => {
                if up {
                    return Some(State::new(StateKind::PreJump));
                }
                // Crouching wins over walking.
                if down {
                    Some(State::new(StateKind::Crunch))
                } else if sideways {
                    Some(State::new(StateKind::Move))
                } else {
                    None
                }
            }
            StateKind::Crunch | StateKind::PostFall => {
                if up {
                    Some(State::new(StateKind::PreJump))
                } else if sideways {
                    Some(State::new(StateKind::Move))
                } else {
                    None
                }
            }
            StateKind::Move => {
                if dirs.is_empty() {
                    Some(State::new(StateKind::Stay))
                } else if up {
                    Some(State::new(StateKind::PreJump))
                } else {
                    None
                }
            }
            StateKind::Roof {
                can_roof_jump,
                should_fall_down,
            } => {
                *can_roof_jump = can_roof_jump.saturating_sub(1);
                if up {
                    *can_roof_jump = ROOF_JUMP_GRACE;
                }
                if down {
                    *should_fall_down = true;
                }
                None
            }
            StateKind::RoofCoyote {
                can_roof_jump,
                should_fall_down,
                ..
            } => {
                if up {
                    *can_roof_jump = true;
                }
                if down {
                    *should_fall_down = true;
                }
                None
            }
            _ => None,
        }
    }

    /// Advance one tick. Emits end-of-life events into `events`.
    pub fn update(&mut self, body: &mut Body, events: &mut Vec<GameEvent>) -> Option<State> {
        match self.kind {
            StateKind::Start => self.complete().then(|| State::new(StateKind::Fall)),
            StateKind::NoState => None,
            StateKind::Dead => {
                events.push(GameEvent::EndGame { won: false });
                Some(State::new(StateKind::NoState))
            }
            StateKind::Win => {
                events.push(GameEvent::EndGame { won: true });
                Some(State::new(StateKind::NoState))
            }
            StateKind::Dying => self.complete().then(|| State::new(StateKind::Dead)),
            StateKind::Edit => {
                displace(body);
                None
            }
            StateKind::Stay => {
                displace(body);
                (!body.is_on_ground).then(|| State::new(StateKind::Fall))
            }
            StateKind::Crunch | StateKind::PostFall => {
                displace(body);
                if !body.is_on_ground {
                    Some(State::new(StateKind::Fall))
                } else if self.complete() {
                    Some(State::new(StateKind::Stay))
                } else {
                    None
                }
            }
            StateKind::Move => {
                displace(body);
                if !body.is_on_ground {
                    Some(State::new(StateKind::Fall))
                } else if body.velocity.x == 0 {
                    Some(State::new(StateKind::Stay))
                } else {
                    None
                }
            }
            StateKind::Fall => {
                displace(body);
                body.is_on_ground.then(|| State::new(StateKind::PostFall))
            }
            StateKind::PreJump => {
                displace(body);
                self.complete().then(|| State::new(StateKind::Jump))
            }
            StateKind::Jump => {
                displace(body);
                if body.is_on_roof {
                    Some(State::roof())
                } else if self.complete() {
                    Some(State::new(StateKind::Top))
                } else {
                    None
                }
            }
            StateKind::Top => {
                displace(body);
                if body.is_on_roof {
                    Some(State::roof())
                } else if self.complete() {
                    Some(State::new(StateKind::Fall))
                } else {
                    None
                }
            }
            StateKind::Roof {
                can_roof_jump,
                should_fall_down,
            } => {
                displace(body);
                if should_fall_down {
                    Some(State::new(StateKind::Fall))
                } else if !body.is_on_roof {
                    Some(State::roof_coyote(can_roof_jump))
                } else {
                    None
                }
            }
            StateKind::RoofCoyote {
                can_roof_jump,
                should_fall_down,
                ..
            } => {
                displace(body);
                if should_fall_down {
                    return Some(State::new(StateKind::Fall));
                }
                if !self.complete() {
                    return None;
                }
                if body.is_on_roof {
                    Some(State::roof())
                } else if can_roof_jump {
                    Some(State::new(StateKind::Jump))
                } else {
                    Some(State::new(StateKind::Fall))
                }
            }
        }
    }
}

fn displace(body: &mut Body) {
    body.offset += body.velocity;
}
