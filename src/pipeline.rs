//! One-call generation: grammar expansion followed by interpretation.

use crate::error::GrapeResult;
use crate::grammar::{GrammarConfig, GrammarEngine};
use crate::interpreter::{Interpretation, TurtleConfig, TurtleInterpreter};
use crate::skeleton::{WireframeMesh, WireframeSink};
use crate::token::{Token, tokens_to_string};
use serde::{Deserialize, Serialize};

/// Everything needed for one generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrapeConfig {
    pub grammar: GrammarConfig,
    pub turtle: TurtleConfig,
    /// Number of rewriting passes. Must be enough to fully reduce the axiom.
    pub generations: usize,
}

impl Default for GrapeConfig {
    fn default() -> Self {
        Self::planar()
    }
}

impl GrapeConfig {
    /// Planar grammar, rolled by a quarter turn per bare `/`.
    pub fn planar() -> Self {
        Self {
            grammar: GrammarConfig::planar(),
            turtle: TurtleConfig::default().with_roll_step(90.0),
            generations: 10,
        }
    }

    /// Phyllotactic grammar, 60° roll step.
    pub fn phyllotactic() -> Self {
        Self {
            grammar: GrammarConfig::phyllotactic(),
            turtle: TurtleConfig::default().with_roll_step(60.0),
            generations: 15,
        }
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.grammar.seed = seed;
        self
    }
}

/// Output of [`grow`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Growth {
    /// The fully reduced symbol sequence.
    pub instructions: Vec<Token>,
    pub interpretation: Interpretation,
}

impl Growth {
    pub fn instruction_string(&self) -> String {
        tokens_to_string(&self.instructions)
    }

    /// Hands the skeleton to the built-in wireframe sink.
    pub fn wireframe(&self) -> WireframeMesh {
        self.interpretation
            .skeleton
            .build_with(WireframeSink::new())
    }
}

/// Expands the configured axiom and interprets the result.
pub fn grow(config: &GrapeConfig) -> GrapeResult<Growth> {
    let engine = GrammarEngine::new(config.grammar.clone())?;
    let instructions = engine.iterate(config.generations)?;
    tracing::debug!(tokens = instructions.len(), "grammar fully reduced");

    let interpretation = TurtleInterpreter::new(config.turtle.clone()).interpret(&instructions)?;
    Ok(Growth {
        instructions,
        interpretation,
    })
}
