#![forbid(unsafe_code)]

//! Placement arithmetic.
//!
//! Every slot is absolutely positioned. Its offset is derived from the slot
//! next to it in the direction of placement:
//!
//! ```text
//! Down:  offset = anchor_offset + (anchor_height + margin)
//! Up:    offset = anchor_offset - (placed_height + margin)
//! ```
//!
//! In both cases the height is that of the slot lying *between* the two
//! offsets, which is why [`next_offset`] takes a single `span_height`. Heights
//! are read from the rendered element at call time, so variable height content
//! chains correctly as long as each element is measured after its content was
//! written.

use std::fmt;

/// Direction of a window transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Reveal items above the window (top sentinel visible).
    Up,
    /// Reveal items below the window (bottom sentinel visible).
    Down,
}

impl Direction {
    /// Lowercase name used in logs and traces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// The sentinel whose visibility triggers this direction.
    #[must_use]
    pub const fn edge(self) -> Edge {
        match self {
            Self::Up => Edge::Top,
            Self::Down => Edge::Bottom,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two boundary sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Pinned to the first slot.
    Top,
    /// Pinned to the last slot.
    Bottom,
}

impl Edge {
    /// Both edges, top first.
    pub const ALL: [Edge; 2] = [Edge::Top, Edge::Bottom];

    /// The transition this sentinel triggers.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Top => Direction::Up,
            Self::Bottom => Direction::Down,
        }
    }

    /// Index into two-element per-edge arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Top => 0,
            Self::Bottom => 1,
        }
    }
}

impl From<Edge> for Direction {
    fn from(edge: Edge) -> Self {
        edge.direction()
    }
}

/// Offset of a slot placed next to an already positioned anchor.
///
/// `span_height` is the height of the slot between the two offsets: the
/// anchor's own height when placing below it, the placed slot's height when
/// placing above it.
#[inline]
#[must_use]
pub fn next_offset(anchor_offset: f64, span_height: f64, margin: f64, direction: Direction) -> f64 {
    let step = span_height + margin;
    match direction {
        Direction::Down => anchor_offset + step,
        Direction::Up => anchor_offset - step,
    }
}
