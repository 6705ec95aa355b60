//! Standard grape productions.
//!
//! Planar rules take `(depth, length)` for axes and `(length)` for tips and
//! pedicels. Tapered rules carry a width as well: `(depth, length, width)` and
//! `(length, width)`. Depths are truncated toward zero; a depth of 1 or less
//! always collapses into a tip so rewriting terminates.

use crate::error::{GrapeError, GrapeResult};
use crate::grammar::RuleContext;
use crate::token::{Symbol, Tag, Token};

fn expect_params<'a>(token: &'a Token, expected: usize) -> GrapeResult<&'a [f32]> {
    if token.params.len() != expected {
        return Err(GrapeError::arity(
            token.symbol.to_string(),
            expected,
            token.params.len(),
        ));
    }
    Ok(token.params.as_slice())
}

fn depth_of(value: f32) -> i64 {
    value.trunc() as i64
}

fn push() -> Token {
    Token::bare(Symbol::Push)
}

fn pop() -> Token {
    Token::bare(Symbol::Pop)
}

/// `Ar(i, j)`
pub fn planar_root(ctx: &mut RuleContext<'_>, token: &Token) -> GrapeResult<Vec<Token>> {
    let p = expect_params(token, 2)?;
    let (depth, len) = (depth_of(p[0]), p[1]);
    let cfg = ctx.config;
    let next_len = len * cfg.length_ratio;

    if depth <= 1 {
        return Ok(vec![Token::module(Tag::Tip, &[next_len])]);
    }

    let children = ctx.child_count(depth)? as f32;
    Ok(vec![
        Token::new(Symbol::Forward, &[len]),
        push(),
        Token::bare(Symbol::RollLeft),
        Token::bare(Symbol::RollLeft),
        Token::module(Tag::Root, &[(depth - 1) as f32, next_len]),
        pop(),
        push(),
        Token::new(Symbol::BendLeft, &[cfg.branch_angle]),
        Token::module(Tag::Secondary, &[children, next_len]),
        pop(),
    ])
}

/// `Af(i, j)`
pub fn planar_secondary(ctx: &mut RuleContext<'_>, token: &Token) -> GrapeResult<Vec<Token>> {
    let p = expect_params(token, 2)?;
    let (depth, len) = (depth_of(p[0]), p[1]);
    let cfg = ctx.config;
    let next_len = len * cfg.length_ratio;

    if depth <= 1 {
        return Ok(vec![Token::module(Tag::Tip, &[next_len])]);
    }

    Ok(vec![
        Token::new(Symbol::Forward, &[len]),
        push(),
        Token::bare(Symbol::RollLeft),
        Token::bare(Symbol::RollLeft),
        Token::module(Tag::Secondary, &[(depth - 1) as f32, next_len]),
        pop(),
        push(),
        Token::new(Symbol::BendLeft, &[cfg.branch_angle]),
        Token::module(Tag::Tip, &[next_len]),
        pop(),
    ])
}

/// `Ae(j)`: one internode fanning into three pedicels.
pub fn planar_tip(ctx: &mut RuleContext<'_>, token: &Token) -> GrapeResult<Vec<Token>> {
    let p = expect_params(token, 1)?;
    let len = p[0];
    let cfg = ctx.config;
    let pedicel = Token::module(Tag::Pedicel, &[len * cfg.length_ratio]);

    Ok(vec![
        Token::new(Symbol::Forward, &[len]),
        push(),
        pedicel.clone(),
        pop(),
        push(),
        Token::new(Symbol::BendLeft, &[cfg.branch_angle]),
        pedicel.clone(),
        pop(),
        push(),
        Token::new(Symbol::BendRight, &[cfg.branch_angle]),
        pedicel,
        pop(),
    ])
}

/// `Ap(j)`: the stalk and its berry.
pub fn planar_pedicel(ctx: &mut RuleContext<'_>, token: &Token) -> GrapeResult<Vec<Token>> {
    let p = expect_params(token, 1)?;
    let cfg = ctx.config;
    Ok(vec![
        Token::new(Symbol::Forward, &[p[0]]),
        Token::new(Symbol::Berry, &[cfg.base_length * cfg.berry_ratio]),
    ])
}

/// Next face in the c → v → b → n cycle.
fn next_face(tag: Tag) -> Tag {
    match tag {
        Tag::FaceC | Tag::Root => Tag::FaceV,
        Tag::FaceV => Tag::FaceB,
        Tag::FaceB => Tag::FaceN,
        _ => Tag::FaceC,
    }
}

/// Roll applied before the continuing axis on each face.
fn face_roll(tag: Tag) -> &'static [Symbol] {
    match tag {
        Tag::FaceV => &[Symbol::RollLeft],
        Tag::FaceN => &[Symbol::RollRight],
        _ => &[Symbol::RollLeft, Symbol::RollLeft],
    }
}

fn straight_segment(len: f32, width: f32) -> Token {
    Token::new(Symbol::Segment, &[0.0, 0.0, 0.0, len, width])
}

/// `Ac|Av|Ab|An(i, l, w)`: main axis internode, advancing the face cycle.
pub fn face_axis(ctx: &mut RuleContext<'_>, token: &Token) -> GrapeResult<Vec<Token>> {
    let Symbol::Module(face) = token.symbol else {
        return Err(GrapeError::UnknownRule(token.symbol.to_string()));
    };
    let p = expect_params(token, 3)?;
    let (depth, len, width) = (depth_of(p[0]), p[1], p[2]);
    let cfg = ctx.config;

    if depth <= 1 {
        return Ok(vec![Token::module(Tag::Tip, &[len * cfg.tip_ratio, width])]);
    }

    let mut out = vec![straight_segment(len, width), push()];
    out.extend(face_roll(face).iter().map(|s| Token::bare(*s)));
    out.extend([
        Token::module(
            next_face(face),
            &[(depth - 1) as f32, len * cfg.axis_ratio, width],
        ),
        pop(),
        push(),
        Token::new(Symbol::BendLeft, &[cfg.lateral_angle]),
        Token::module(
            Tag::Secondary,
            &[cfg.secondary_depth as f32, len * cfg.lateral_ratio, width],
        ),
        pop(),
    ]);
    Ok(out)
}

/// `Af(i, l, w)`
pub fn tapered_secondary(ctx: &mut RuleContext<'_>, token: &Token) -> GrapeResult<Vec<Token>> {
    let p = expect_params(token, 3)?;
    let (depth, len, width) = (depth_of(p[0]), p[1], p[2]);
    let cfg = ctx.config;

    if depth <= 1 {
        return Ok(vec![Token::module(Tag::Tip, &[len * cfg.tip_ratio, width])]);
    }

    Ok(vec![
        straight_segment(len, width),
        push(),
        Token::bare(Symbol::RollRight),
        Token::module(
            Tag::Secondary,
            &[(depth - 1) as f32, len * cfg.secondary_ratio, width],
        ),
        pop(),
        push(),
        Token::new(Symbol::BendLeft, &[cfg.lateral_angle]),
        Token::module(Tag::Tip, &[len * cfg.secondary_tip_ratio, width]),
        pop(),
    ])
}

/// `Ae(l, w)`: three pedicels, the outer two rolled apart.
pub fn tapered_tip(ctx: &mut RuleContext<'_>, token: &Token) -> GrapeResult<Vec<Token>> {
    let p = expect_params(token, 2)?;
    let (len, width) = (p[0], p[1]);
    let cfg = ctx.config;
    let pedicel = Token::module(Tag::Pedicel, &[len * cfg.pedicel_ratio, width]);

    Ok(vec![
        straight_segment(len, width),
        push(),
        pedicel.clone(),
        pop(),
        push(),
        Token::new(Symbol::BendLeft, &[cfg.lateral_angle]),
        Token::new(Symbol::RollLeft, &[cfg.pedicel_roll]),
        pedicel.clone(),
        pop(),
        push(),
        Token::new(Symbol::BendRight, &[cfg.lateral_angle]),
        Token::new(Symbol::RollRight, &[cfg.pedicel_roll]),
        pedicel,
        pop(),
    ])
}

/// `Ap(l, w)`: a berry-bearing segment.
pub fn tapered_pedicel(_ctx: &mut RuleContext<'_>, token: &Token) -> GrapeResult<Vec<Token>> {
    let p = expect_params(token, 2)?;
    Ok(vec![Token::new(Symbol::Segment, &[1.0, 0.0, 0.0, p[0], p[1]])])
}

/// `E(type, theta, phi, l, w)`: orient, taper, draw, and for type 1 attach a berry.
///
/// A type 1 segment whose length equals the suppress length still emits its
/// berry, but behind a `%` so the interpreter swallows it.
pub fn segment(ctx: &mut RuleContext<'_>, token: &Token) -> GrapeResult<Vec<Token>> {
    let p = expect_params(token, 5)?;
    let (kind, theta, phi, len, width) = (depth_of(p[0]), p[1], p[2], p[3], p[4]);
    let cfg = ctx.config;

    let mut out = vec![
        Token::new(Symbol::BendLeft, &[theta]),
        Token::new(Symbol::PitchDown, &[phi]),
        Token::new(Symbol::Width, &[width * cfg.width_ratio]),
        Token::new(Symbol::Forward, &[len]),
    ];

    match kind {
        0 => {}
        1 => {
            let tolerance = f32::EPSILON * cfg.suppress_length.abs().max(1.0);
            let suppressed = (len - cfg.suppress_length).abs() <= tolerance;
            let size = ctx.berry_size();
            if suppressed {
                out.push(Token::bare(Symbol::Skip));
            }
            out.push(Token::new(Symbol::Berry, &[size]));
        }
        other => {
            return Err(GrapeError::config(format!(
                "segment type must be 0 or 1, got {other}"
            )));
        }
    }
    Ok(out)
}
