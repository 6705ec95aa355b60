//! Turtle state and operations for skeleton interpretation.

use crate::skeleton::NodeId;
use crate::token::Symbol;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A local axis of the turtle frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// The cursor register of the grape turtle.
///
/// Cloned wholesale on `[` and restored on `]`, so sibling branches never
/// share state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleState {
    /// Current world-space position of the cursor.
    pub position: Vec3,

    /// Current world-space orientation. Always composed, never split into angles.
    pub rotation: Quat,

    /// Width applied to nodes created from here on (set by `!`).
    pub width: f32,

    /// The skeleton node the cursor is standing on. New segments grow from it.
    pub node: NodeId,
}

impl Default for TurtleState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            width: 0.1,
            node: 0,
        }
    }
}

impl TurtleState {
    /// Returns the turtle's growth direction (local Y-axis) in world space.
    pub fn heading(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Rotates the turtle around one of its own axes by `angle` radians.
    pub fn rotate_local(&mut self, axis: Axis, angle: f32) {
        self.rotation *= Quat::from_axis_angle(axis.unit(), angle);
    }

    /// Moves the cursor `length` units along its heading.
    pub fn advance(&mut self, length: f32) {
        self.position += self.heading() * length;
    }
}

/// Operations that can be performed by the grape turtle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurtleOp {
    /// Grow a segment forward (`F`).
    Draw,
    /// Attach a berry to the current node (`S`).
    MarkBerry,
    /// Rotate around the bend axis (`+`/`-`).
    Bend(f32),
    /// Rotate around the pitch axis (`&`/`^`).
    Pitch(f32),
    /// Rotate around the roll axis (`/`/`_`).
    Roll(f32),
    /// Set the width for subsequent nodes (`!`).
    SetWidth,
    /// Save the cursor onto the stack (`[`).
    Push,
    /// Restore the most recently pushed cursor (`]`).
    Pop,
    /// Swallow the next token (`%`).
    SkipNext,
}

impl TurtleOp {
    /// The operation a terminal symbol performs. `None` for non-terminals.
    pub fn for_symbol(symbol: Symbol) -> Option<Self> {
        Some(match symbol {
            Symbol::Forward => TurtleOp::Draw,
            Symbol::Berry => TurtleOp::MarkBerry,
            Symbol::BendLeft => TurtleOp::Bend(1.0),
            Symbol::BendRight => TurtleOp::Bend(-1.0),
            Symbol::PitchDown => TurtleOp::Pitch(1.0),
            Symbol::PitchUp => TurtleOp::Pitch(-1.0),
            Symbol::RollLeft => TurtleOp::Roll(1.0),
            Symbol::RollRight => TurtleOp::Roll(-1.0),
            Symbol::Width => TurtleOp::SetWidth,
            Symbol::Push => TurtleOp::Push,
            Symbol::Pop => TurtleOp::Pop,
            Symbol::Skip => TurtleOp::SkipNext,
            Symbol::Module(_) | Symbol::Segment => return None,
        })
    }
}
