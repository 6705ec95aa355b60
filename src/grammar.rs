//! Parallel rewriting engine for parametric grape grammars.
//!
//! The entry point is [`GrammarEngine`]. Build it from a [`GrammarConfig`]
//! (which selects one of the standard grammars) or supply a custom
//! [`Grammar`] via [`GrammarEngine::with_grammar`], then call
//! [`GrammarEngine::iterate`] or [`GrammarEngine::expand`].

use crate::error::{GrapeError, GrapeResult};
use crate::rules;
use crate::token::{Symbol, Tag, Token, parse_tokens, tokens_to_string};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Which family of productions to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrammarVariant {
    /// `r, f, e, p` productions. Every lateral sits on the same side of its
    /// parent, rolled by a fixed `//`.
    Planar,
    /// `c, v, b, n` face cycle plus the `E` segment expansion. Successive
    /// internodes rotate their lateral through four azimuth slots.
    Phyllotactic,
}

/// Rule constants. Fixed for the lifetime of a [`GrammarEngine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrammarConfig {
    pub variant: GrammarVariant,
    /// Whole-plant recursion depth (`m`).
    pub depth: u32,
    /// Child depth of the secondary axis spawned at each main-axis depth,
    /// indexed by `depth - 2` (`ns`). Planar grammar only.
    pub child_counts: Vec<u32>,
    /// Base internode length (`l`).
    pub base_length: f32,
    /// Length decay per generation (`rl`). Planar grammar only.
    pub length_ratio: f32,
    /// Berry size as a fraction of `base_length` (`rr`). Planar grammar only.
    pub berry_ratio: f32,
    /// Lateral branch angle in degrees (`alpha`). Planar grammar only.
    pub branch_angle: f32,

    /// Initial width of the main axis (`wi`).
    pub base_width: f32,
    /// Depth of every secondary axis (`ni`). Phyllotactic grammar only.
    pub secondary_depth: u32,
    /// Lateral angle in degrees (`alpha_y`).
    pub lateral_angle: f32,
    /// Roll applied to the two outer pedicels, in degrees (`alpha_r`).
    pub pedicel_roll: f32,
    /// Length ratio when an axis collapses into a tip (`re`).
    pub tip_ratio: f32,
    /// Main-axis continuation ratio (`r_rr`).
    pub axis_ratio: f32,
    /// Main-axis to secondary ratio (`r_rf`).
    pub lateral_ratio: f32,
    /// Secondary continuation ratio (`r_ff`).
    pub secondary_ratio: f32,
    /// Secondary to tip ratio (`r_e`).
    pub secondary_tip_ratio: f32,
    /// Tip to pedicel ratio (`r_p`).
    pub pedicel_ratio: f32,
    /// Width taper applied by every segment (`r_w`).
    pub width_ratio: f32,
    /// Pedicels of exactly this length get their berry suppressed (`lw`).
    pub suppress_length: f32,
    /// Half-open range berry sizes are drawn from.
    pub berry_size_range: (f32, f32),

    /// Seed for berry-size jitter. Each expansion reseeds from it.
    pub seed: u64,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self::planar()
    }
}

impl GrammarConfig {
    /// The flat cluster: `m = 3`, `ns = [1, 2]`, `l = 40`, 45° laterals.
    pub fn planar() -> Self {
        Self {
            variant: GrammarVariant::Planar,
            depth: 3,
            child_counts: vec![1, 2],
            base_length: 40.0,
            length_ratio: 1.0,
            berry_ratio: 0.75,
            branch_angle: 45.0,

            base_width: 1.5,
            secondary_depth: 3,
            lateral_angle: 60.0,
            pedicel_roll: 120.0,
            tip_ratio: 0.6,
            axis_ratio: 0.99,
            lateral_ratio: 0.89,
            secondary_ratio: 0.99,
            secondary_tip_ratio: 0.6,
            pedicel_ratio: 1.5,
            width_ratio: 0.98,
            suppress_length: 3.0,
            berry_size_range: (2.0, 3.0),

            seed: 0,
        }
    }

    /// The full 3D cluster: `m = 7`, `l = 0.3`, `wi = 3`, `ni = 1`.
    pub fn phyllotactic() -> Self {
        Self {
            variant: GrammarVariant::Phyllotactic,
            depth: 7,
            child_counts: Vec::new(),
            base_length: 0.3,
            base_width: 3.0,
            secondary_depth: 1,
            ..Self::planar()
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_child_counts(mut self, child_counts: Vec<u32>) -> Self {
        self.child_counts = child_counts;
        self
    }

    /// Depth of the laterals spawned by each main-axis internode.
    pub fn with_secondary_depth(mut self, depth: u32) -> Self {
        self.secondary_depth = depth;
        self
    }

    pub fn with_base_length(mut self, base_length: f32) -> Self {
        self.base_length = base_length;
        self
    }

    pub fn with_branch_angle(mut self, degrees: f32) -> Self {
        self.branch_angle = degrees;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The starting non-terminal: `Ar(m, l)` or `Ac(m, l, wi)`.
    pub fn axiom(&self) -> Token {
        let m = self.depth as f32;
        match self.variant {
            GrammarVariant::Planar => Token::module(Tag::Root, &[m, self.base_length]),
            GrammarVariant::Phyllotactic => {
                Token::module(Tag::FaceC, &[m, self.base_length, self.base_width])
            }
        }
    }

    /// Checks the constants before any rewriting happens.
    pub fn validate(&self) -> GrapeResult<()> {
        if self.depth == 0 {
            return Err(GrapeError::config("depth must be at least 1"));
        }
        if self.variant == GrammarVariant::Planar {
            let needed = self.depth.saturating_sub(1) as usize;
            if self.child_counts.len() < needed {
                return Err(GrapeError::config(format!(
                    "child-count table has {} entries but depth {} needs {}",
                    self.child_counts.len(),
                    self.depth,
                    needed
                )));
            }
        }
        let (lo, hi) = self.berry_size_range;
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Err(GrapeError::config(format!(
                "invalid berry size range ({lo}, {hi})"
            )));
        }
        if !self.base_length.is_finite() || !self.base_width.is_finite() {
            return Err(GrapeError::config("base length and width must be finite"));
        }
        Ok(())
    }
}

/// Everything a production may read while computing its replacement.
pub struct RuleContext<'a> {
    pub config: &'a GrammarConfig,
    rng: &'a mut StdRng,
}

impl RuleContext<'_> {
    /// Draws a berry size from the configured range.
    pub fn berry_size(&mut self) -> f32 {
        let (lo, hi) = self.config.berry_size_range;
        if hi > lo { self.rng.gen_range(lo..hi) } else { lo }
    }

    /// Looks up the secondary depth for a main-axis internode at `depth`.
    pub fn child_count(&self, depth: i64) -> GrapeResult<u32> {
        let idx = (depth - 2).max(0) as usize;
        self.config.child_counts.get(idx).copied().ok_or_else(|| {
            GrapeError::config(format!(
                "child-count table has {} entries, depth {depth} needs index {idx}",
                self.config.child_counts.len()
            ))
        })
    }
}

/// A production: maps one non-terminal to its replacement.
pub type Production = fn(&mut RuleContext<'_>, &Token) -> GrapeResult<Vec<Token>>;

/// Dispatch table from non-terminal to production.
#[derive(Clone, Debug, Default)]
pub struct Grammar {
    modules: Vec<Option<Production>>,
    segment: Option<Production>,
}

impl Grammar {
    /// An empty grammar. Every non-terminal is unknown until registered.
    pub fn new() -> Self {
        Self {
            modules: vec![None; Tag::ALL.len()],
            segment: None,
        }
    }

    /// The standard productions for `variant`.
    pub fn standard(variant: GrammarVariant) -> Self {
        let mut grammar = Self::new();
        match variant {
            GrammarVariant::Planar => {
                grammar.set_rule(Tag::Root, rules::planar_root);
                grammar.set_rule(Tag::Secondary, rules::planar_secondary);
                grammar.set_rule(Tag::Tip, rules::planar_tip);
                grammar.set_rule(Tag::Pedicel, rules::planar_pedicel);
            }
            GrammarVariant::Phyllotactic => {
                grammar.set_rule(Tag::Root, rules::face_axis);
                grammar.set_rule(Tag::FaceC, rules::face_axis);
                grammar.set_rule(Tag::FaceV, rules::face_axis);
                grammar.set_rule(Tag::FaceB, rules::face_axis);
                grammar.set_rule(Tag::FaceN, rules::face_axis);
                grammar.set_rule(Tag::Secondary, rules::tapered_secondary);
                grammar.set_rule(Tag::Tip, rules::tapered_tip);
                grammar.set_rule(Tag::Pedicel, rules::tapered_pedicel);
                grammar.set_segment_rule(rules::segment);
            }
        }
        grammar
    }

    /// Registers (or replaces) the production for `A<tag>`.
    pub fn set_rule(&mut self, tag: Tag, rule: Production) {
        let idx = tag.index();
        if idx >= self.modules.len() {
            self.modules.resize(idx + 1, None);
        }
        self.modules[idx] = Some(rule);
    }

    /// Registers the production for the `E` segment token.
    pub fn set_segment_rule(&mut self, rule: Production) {
        self.segment = Some(rule);
    }

    pub fn with_rule(mut self, tag: Tag, rule: Production) -> Self {
        self.set_rule(tag, rule);
        self
    }

    pub fn rule_for(&self, symbol: Symbol) -> Option<Production> {
        match symbol {
            Symbol::Module(tag) => self.modules.get(tag.index()).copied().flatten(),
            Symbol::Segment => self.segment,
            _ => None,
        }
    }

    /// Tags with a registered production, in table order.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        Tag::ALL
            .into_iter()
            .filter(|tag| self.rule_for(Symbol::Module(*tag)).is_some())
    }
}

/// Rewrites an axiom for a number of generations.
#[derive(Clone, Debug)]
pub struct GrammarEngine {
    grammar: Grammar,
    config: GrammarConfig,
}

impl GrammarEngine {
    /// Validates `config` and installs the standard grammar for its variant.
    pub fn new(config: GrammarConfig) -> GrapeResult<Self> {
        let grammar = Grammar::standard(config.variant);
        Self::with_grammar(config, grammar)
    }

    pub fn with_grammar(config: GrammarConfig, grammar: Grammar) -> GrapeResult<Self> {
        config.validate()?;
        Ok(Self { grammar, config })
    }

    pub fn config(&self) -> &GrammarConfig {
        &self.config
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Applies `generations` parallel rewriting passes to `axiom`.
    ///
    /// Every pass reads the previous sequence and writes a fresh one, so a
    /// replacement never sees output produced earlier in the same pass.
    /// Stops early once nothing is left to rewrite. The result may still
    /// contain non-terminals if `generations` was too small; use
    /// [`iterate`](Self::iterate) when a fully reduced string is required.
    pub fn expand(&self, axiom: &[Token], generations: usize) -> GrapeResult<Vec<Token>> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut current = axiom.to_vec();

        for generation in 0..generations {
            let mut ctx = RuleContext {
                config: &self.config,
                rng: &mut rng,
            };
            let (next, rewritten) = self.rewrite_pass(&current, &mut ctx)?;
            tracing::debug!(generation, rewritten, tokens = next.len(), "rewrite pass");
            current = next;
            if rewritten == 0 {
                break;
            }
        }

        Ok(current)
    }

    /// Textual form of [`expand`](Self::expand).
    pub fn expand_str(&self, axiom: &str, generations: usize) -> GrapeResult<String> {
        let axiom = parse_tokens(axiom)?;
        let tokens = self.expand(&axiom, generations)?;
        Ok(tokens_to_string(&tokens))
    }

    /// Expands the configured axiom and requires the result to be fully reduced.
    pub fn iterate(&self, generations: usize) -> GrapeResult<Vec<Token>> {
        let tokens = self.expand(&[self.config.axiom()], generations)?;
        ensure_reduced(&tokens)?;
        Ok(tokens)
    }

    fn rewrite_pass(
        &self,
        current: &[Token],
        ctx: &mut RuleContext<'_>,
    ) -> GrapeResult<(Vec<Token>, usize)> {
        let mut next = Vec::with_capacity(current.len() * 2);
        let mut rewritten = 0;

        for token in current {
            if !token.is_nonterminal() {
                next.push(token.clone());
                continue;
            }
            let rule = self
                .grammar
                .rule_for(token.symbol)
                .ok_or_else(|| GrapeError::UnknownRule(token.symbol.to_string()))?;
            next.extend(rule(ctx, token)?);
            rewritten += 1;
        }

        Ok((next, rewritten))
    }
}

/// Fails on the first non-terminal left in `tokens`.
pub fn ensure_reduced(tokens: &[Token]) -> GrapeResult<()> {
    match tokens.iter().position(Token::is_nonterminal) {
        Some(index) => Err(GrapeError::Unreduced {
            index,
            token: tokens[index].clone(),
        }),
        None => Ok(()),
    }
}
