//! Interpreter that converts a fully reduced symbol sequence into a [`GrapeSkeleton`].
//!
//! The entry point is [`TurtleInterpreter`]. Configure it with a
//! [`TurtleConfig`], then call [`TurtleInterpreter::interpret`] with the
//! output of [`GrammarEngine::iterate`](crate::GrammarEngine::iterate).

use crate::error::{GrapeError, GrapeResult};
use crate::skeleton::{GrapeSkeleton, NodeId, SkeletonNode};
use crate::token::{Token, parse_tokens};
use crate::turtle::{Axis, TurtleOp, TurtleState};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Configuration for turtle interpretation.
///
/// Angle conventions differ between grammars, so axes and the roll step are
/// part of the configuration rather than fixed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleConfig {
    /// Length for a bare `F`.
    pub default_length: f32,
    /// Width of the root node and of everything drawn before the first `!`.
    pub default_width: f32,
    /// Angle in degrees for a bare `+`, `-`, `&` or `^`.
    pub default_angle: f32,
    /// Angle in degrees for a bare `/` or `_`.
    pub roll_step: f32,
    /// Size for a bare `S`.
    pub default_berry_size: f32,
    /// Local axis turned by `+`/`-`.
    pub bend_axis: Axis,
    /// Local axis turned by `&`/`^`.
    pub pitch_axis: Axis,
    /// Local axis turned by `/`/`_`.
    pub roll_axis: Axis,
    /// Root position.
    pub origin: Vec3,
    /// Root orientation. The default points the heading straight down.
    pub initial_rotation: Quat,
    /// Maximum nesting of `[`.
    pub max_stack_depth: usize,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            default_length: 1.0,
            default_width: 0.1,
            default_angle: 45.0,
            roll_step: 60.0,
            default_berry_size: 1.0,
            bend_axis: Axis::Z,
            pitch_axis: Axis::X,
            roll_axis: Axis::Y,
            origin: Vec3::ZERO,
            initial_rotation: Quat::from_rotation_x(PI),
            max_stack_depth: 1024,
        }
    }
}

impl TurtleConfig {
    pub fn with_roll_step(mut self, degrees: f32) -> Self {
        self.roll_step = degrees;
        self
    }

    pub fn with_initial_rotation(mut self, rotation: Quat) -> Self {
        self.initial_rotation = rotation;
        self
    }
}

/// One observable step of the interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TurtleEvent {
    /// A segment was drawn from node `from` to the new node `to`.
    Move {
        from: NodeId,
        to: NodeId,
        position: Vec3,
        width: f32,
    },
    /// The cursor was saved; `depth` is the stack depth after the push.
    BranchOpen { depth: usize },
    /// The cursor was restored; `depth` is the stack depth after the pop.
    BranchClose { depth: usize },
    Rotate { axis: Axis, degrees: f32 },
    /// `node` carries a berry of `size`.
    MarkTerminal { node: NodeId, size: f32 },
}

/// Result of one interpretation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub events: Vec<TurtleEvent>,
    pub skeleton: GrapeSkeleton,
    /// Token indices of `]` that found an empty stack and were skipped.
    pub unmatched_pops: Vec<usize>,
    /// Branches still open when the input ended.
    pub open_branches: usize,
}

impl Interpretation {
    /// True when every bracket was matched.
    pub fn is_balanced(&self) -> bool {
        self.unmatched_pops.is_empty() && self.open_branches == 0
    }
}

/// Walks a token sequence once and grows a skeleton from it.
#[derive(Clone, Debug, Default)]
pub struct TurtleInterpreter {
    config: TurtleConfig,
}

impl TurtleInterpreter {
    pub fn new(config: TurtleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Interprets a textual symbol string.
    pub fn interpret_str(&self, text: &str) -> GrapeResult<Interpretation> {
        let tokens = parse_tokens(text)?;
        self.interpret(&tokens)
    }

    /// Interprets `tokens` left to right.
    ///
    /// The turtle starts at `origin` with `initial_rotation` on root node 0.
    ///
    /// # Errors
    ///
    /// Any non-terminal (`A<tag>`, `E`) is a hard error: the grammar did not
    /// fully reduce. Exceeding `max_stack_depth` is also fatal. An unmatched
    /// `]` is not: it is logged, recorded in
    /// [`Interpretation::unmatched_pops`], and skipped.
    pub fn interpret(&self, tokens: &[Token]) -> GrapeResult<Interpretation> {
        let cfg = &self.config;
        let mut out = Interpretation {
            skeleton: GrapeSkeleton::with_root(cfg.origin, cfg.initial_rotation, cfg.default_width),
            ..Default::default()
        };
        let mut turtle = TurtleState {
            position: cfg.origin,
            rotation: cfg.initial_rotation,
            width: cfg.default_width,
            node: 0,
        };
        let mut stack: Vec<TurtleState> = Vec::new();
        let mut skip_next = false;

        for (index, token) in tokens.iter().enumerate() {
            let op = TurtleOp::for_symbol(token.symbol).ok_or_else(|| GrapeError::Unreduced {
                index,
                token: token.clone(),
            })?;

            if skip_next {
                skip_next = false;
                continue;
            }

            match op {
                TurtleOp::Draw => {
                    let len = token.param_or(0, cfg.default_length);
                    turtle.advance(len);
                    let from = turtle.node;
                    let to = out.skeleton.add_node(SkeletonNode {
                        position: turtle.position,
                        rotation: turtle.rotation,
                        width: turtle.width,
                        parent: Some(from),
                    });
                    turtle.node = to;
                    out.events.push(TurtleEvent::Move {
                        from,
                        to,
                        position: turtle.position,
                        width: turtle.width,
                    });
                }
                TurtleOp::MarkBerry => {
                    let size = token.param_or(0, cfg.default_berry_size);
                    out.skeleton.add_attachment(turtle.node, size);
                    out.events.push(TurtleEvent::MarkTerminal {
                        node: turtle.node,
                        size,
                    });
                }
                TurtleOp::Bend(s) => {
                    let deg = token.param_or(0, cfg.default_angle) * s;
                    rotate(&mut turtle, &mut out.events, cfg.bend_axis, deg);
                }
                TurtleOp::Pitch(s) => {
                    let deg = token.param_or(0, cfg.default_angle) * s;
                    rotate(&mut turtle, &mut out.events, cfg.pitch_axis, deg);
                }
                TurtleOp::Roll(s) => {
                    let deg = token.param_or(0, cfg.roll_step) * s;
                    rotate(&mut turtle, &mut out.events, cfg.roll_axis, deg);
                }
                TurtleOp::SetWidth => turtle.width = token.param_or(0, turtle.width),
                TurtleOp::Push => {
                    if stack.len() >= cfg.max_stack_depth {
                        return Err(GrapeError::StackOverflow {
                            index,
                            limit: cfg.max_stack_depth,
                        });
                    }
                    stack.push(turtle.clone());
                    out.events.push(TurtleEvent::BranchOpen { depth: stack.len() });
                }
                TurtleOp::Pop => match stack.pop() {
                    Some(saved) => {
                        turtle = saved;
                        out.events.push(TurtleEvent::BranchClose { depth: stack.len() });
                    }
                    None => {
                        tracing::warn!(index, "unmatched ']' with empty stack, skipping");
                        out.unmatched_pops.push(index);
                    }
                },
                TurtleOp::SkipNext => skip_next = true,
            }
        }

        out.open_branches = stack.len();
        if out.open_branches > 0 {
            tracing::warn!(open = out.open_branches, "input ended with unclosed branches");
        }
        tracing::debug!(
            nodes = out.skeleton.node_count(),
            berries = out.skeleton.attachments.len(),
            "interpretation finished"
        );

        Ok(out)
    }
}

fn rotate(turtle: &mut TurtleState, events: &mut Vec<TurtleEvent>, axis: Axis, degrees: f32) {
    turtle.rotate_local(axis, degrees.to_radians());
    events.push(TurtleEvent::Rotate { axis, degrees });
}
