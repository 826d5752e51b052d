//! Transition rules: (before_state, input) → (after_state, output, move)

use super::{StateId, Symbol};

/// Single transition rule
///
/// Forward reading: in `before_state` with `input_symbol` under the head, the
/// machine writes `output_symbol`, moves per `movement` and enters
/// `after_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct Rule {
    /// State the rule fires from
    pub before_state: StateId,

    /// Symbol read under the head before the rule fires
    pub input_symbol: Symbol,

    /// State entered after the rule fires
    pub after_state: StateId,

    /// Symbol left under the head
    pub output_symbol: Symbol,

    /// Head movement after the write
    pub movement: Move,
}

impl Rule {
    /// Construct a rule in forward order
    pub fn new(
        before_state: StateId,
        input_symbol: Symbol,
        after_state: StateId,
        output_symbol: Symbol,
        movement: Move,
    ) -> Self {
        Self {
            before_state,
            input_symbol,
            after_state,
            output_symbol,
            movement,
        }
    }

    /// Whether the rule halts the machine without moving
    pub fn is_terminal(&self) -> bool {
        self.movement == Move::Terminal
    }
}

/// Head movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub enum Move {
    /// Move left (decrement position)
    Left,

    /// Move right (increment position)
    Right,

    /// Halting transition, no movement
    Terminal,
}

impl Move {
    /// Signed offset of the forward move
    pub fn to_i8(&self) -> i8 {
        match self {
            Move::Left => -1,
            Move::Right => 1,
            Move::Terminal => 0,
        }
    }

    /// Apply the forward move to a window position
    ///
    /// Returns `None` when the move would leave the addressable range.
    pub fn apply(&self, position: usize) -> Option<usize> {
        match self {
            Move::Left => position.checked_sub(1),
            Move::Right => position.checked_add(1),
            Move::Terminal => Some(position),
        }
    }

    /// Undo the forward move: where the head was before the rule fired
    pub fn retreat(&self, position: usize) -> Option<usize> {
        match self {
            Move::Left => position.checked_add(1),
            Move::Right => position.checked_sub(1),
            Move::Terminal => Some(position),
        }
    }

    /// Direction marker used by the text format
    pub fn marker(&self) -> char {
        match self {
            Move::Left => 'L',
            Move::Right => 'R',
            Move::Terminal => '-',
        }
    }

    /// Decode a direction marker; anything but `L`/`R` is terminal
    pub fn from_marker(marker: char) -> Self {
        match marker {
            'L' => Move::Left,
            'R' => Move::Right,
            _ => Move::Terminal,
        }
    }
}
