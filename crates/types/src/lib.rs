//! Core types module - shared value types and constants
//!
//! Everything here is plain data with no external dependencies, so the
//! simulation core, the terminal front end and the input layer can all speak
//! the same vocabulary.
//!
//! # Coordinates
//!
//! Positions, velocities and sizes are integer tile units. `x` grows to the
//! right and `y` grows downwards, so "falling" is `+y` and a jump is `-y`.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TARGET_FPS` | 30 | Fixed simulation rate |
//! | `FRAME_BUDGET_US` | 33333 | Wall-clock budget of one tick |
//! | `PAUSE_POLL_MS` | 100 | Poll interval of a paused loop |
//! | `DEFAULT_KEY_RELEASE_TIMEOUT_MS` | 150 | Auto-release on terminals without release events |

use std::ops::{Add, AddAssign, Neg, Sub};

/// Simulation ticks per second.
pub const TARGET_FPS: u32 = 30;
/// Wall-clock budget of one tick in microseconds.
pub const FRAME_BUDGET_US: u64 = 1_000_000 / TARGET_FPS as u64;
/// How often a paused loop re-checks its control flags.
pub const PAUSE_POLL_MS: u64 = 100;
/// A key with no repeat/press seen for this long counts as released.
pub const DEFAULT_KEY_RELEASE_TIMEOUT_MS: u32 = 150;

/// Version written into map files.
pub const GAME_VERSION: &str = "0.1.0";
/// Default author of freshly created maps.
pub const APP_AUTHOR: &str = "Cvaniak";
/// Layer used when a map object does not specify one.
pub const DEFAULT_LAYER_NUMBER: i32 = 1;

/// Play area size in tiles.
pub const DISPLAY_WIDTH: i32 = 66;
pub const DISPLAY_HEIGHT: i32 = 34;

/// Where the player of an empty map starts.
pub const EMPTY_MAP_PLAYER_POS: Offset = Offset::new(10, 10);

/// Integer position or displacement in tile units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const ZERO: Offset = Offset::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component only.
    pub const fn only_x(self) -> Self {
        Self { x: self.x, y: 0 }
    }

    /// Vertical component only.
    pub const fn only_y(self) -> Self {
        Self { x: 0, y: self.y }
    }

    pub const fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Offset) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.x, -self.y)
    }
}

impl From<(i32, i32)> for Offset {
    fn from((x, y): (i32, i32)) -> Self {
        Offset::new(x, y)
    }
}

/// Width and height in tiles.
///
/// A negative component in a size *limit* means "unbounded".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const UNBOUNDED: Size = Size::new(-1, -1);

    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Grow (or shrink) by a delta.
    pub const fn resize(self, delta: Offset) -> Self {
        Self::new(self.width + delta.x, self.height + delta.y)
    }

    /// Clamp into `[min, max]` per axis; a negative bound is ignored.
    pub fn clamp(self, min: Size, max: Size) -> Self {
        Self::new(
            clamp_axis(self.width, min.width, max.width),
            clamp_axis(self.height, min.height, max.height),
        )
    }
}

fn clamp_axis(v: i32, min: i32, max: i32) -> i32 {
    let mut v = v;
    if min >= 0 {
        v = v.max(min);
    }
    if max >= 0 {
        v = v.min(max);
    }
    v
}

/// Axis-aligned rectangle anchored at its top-left tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub pos: Offset,
    pub size: Size,
}

impl Rect {
    pub const fn new(pos: Offset, size: Size) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn contains(&self, p: Offset) -> bool {
        self.pos.x <= p.x
            && p.x < self.pos.x + self.size.width
            && self.pos.y <= p.y
            && p.y < self.pos.y + self.size.height
    }
}

/// Logical input direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    const fn bit(self) -> u8 {
        match self {
            Direction::Left => 1,
            Direction::Right => 1 << 1,
            Direction::Up => 1 << 2,
            Direction::Down => 1 << 3,
        }
    }
}

/// Unordered set of logical directions pressed during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DirectionSet(u8);

impl DirectionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= dir.bit();
    }

    pub fn with(mut self, dir: Direction) -> Self {
        self.insert(dir);
        self
    }

    pub const fn contains(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Net horizontal intent: -1, 0 or +1.
    ///
    /// Left and right held together cancel out.
    pub fn horizontal(self) -> i32 {
        let mut dx = 0;
        if self.contains(Direction::Left) {
            dx -= 1;
        }
        if self.contains(Direction::Right) {
            dx += 1;
        }
        dx
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::empty();
        for d in iter {
            set.insert(d);
        }
        set
    }
}

/// Face of an obstacle the player is approaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    /// Side hit by moving along `v`. The dominant axis wins; ties go vertical.
    pub fn from_vector(v: Offset) -> Side {
        if v.x.abs() > v.y.abs() {
            if v.x > 0 {
                Side::Right
            } else {
                Side::Left
            }
        } else if v.y > 0 {
            Side::Bottom
        } else {
            Side::Top
        }
    }
}

/// Gameplay notifications produced by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEvent {
    HpChange(i32),
    PointCollected(i32),
    EndBallCollected,
    EndGame { won: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_from_vector_prefers_dominant_axis() {
        assert_eq!(Side::from_vector(Offset::new(1, 0)), Side::Right);
        assert_eq!(Side::from_vector(Offset::new(-1, 0)), Side::Left);
        assert_eq!(Side::from_vector(Offset::new(0, 1)), Side::Bottom);
        assert_eq!(Side::from_vector(Offset::new(0, -1)), Side::Top);
        assert_eq!(Side::from_vector(Offset::new(2, -1)), Side::Right);
    }

    #[test]
    fn side_from_vector_ties_go_vertical() {
        assert_eq!(Side::from_vector(Offset::new(1, 1)), Side::Bottom);
        assert_eq!(Side::from_vector(Offset::new(-1, -1)), Side::Top);
        assert_eq!(Side::from_vector(Offset::ZERO), Side::Top);
    }

    #[test]
    fn conflicting_horizontal_directions_cancel() {
        let set: DirectionSet = [Direction::Left, Direction::Right].into_iter().collect();
        assert_eq!(set.horizontal(), 0);
        assert_eq!(DirectionSet::empty().with(Direction::Left).horizontal(), -1);
    }

    #[test]
    fn size_clamp_ignores_unbounded_limits() {
        let s = Size::new(0, 5).clamp(Size::new(1, 1), Size::new(-1, 1));
        assert_eq!(s, Size::new(1, 1));
        let s = Size::new(40, 3).clamp(Size::new(1, 1), Size::UNBOUNDED);
        assert_eq!(s, Size::new(40, 3));
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(Offset::new(2, 3), Size::new(2, 1));
        assert!(r.contains(Offset::new(2, 3)));
        assert!(r.contains(Offset::new(3, 3)));
        assert!(!r.contains(Offset::new(4, 3)));
        assert!(!r.contains(Offset::new(2, 4)));
    }
}
