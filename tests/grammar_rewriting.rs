// tests/grammar_rewriting.rs
use grape_lsystem::{
    Grammar, GrammarConfig, GrammarEngine, GrammarVariant, GrapeError, GrapeResult, RuleContext,
    Symbol, Tag, Token, parse_tokens,
};

fn planar() -> GrammarEngine {
    GrammarEngine::new(GrammarConfig::planar()).unwrap()
}

fn phyllotactic() -> GrammarEngine {
    GrammarEngine::new(GrammarConfig::phyllotactic()).unwrap()
}

fn count(tokens: &[Token], symbol: Symbol) -> usize {
    tokens.iter().filter(|t| t.symbol == symbol).count()
}

#[test]
fn test_depth_one_collapses_into_tip() {
    assert_eq!(planar().expand_str("Ar(1,10)", 1).unwrap(), "Ae(10)");
}

#[test]
fn test_single_pass_rewrites_only_the_axiom() {
    assert_eq!(
        planar().expand_str("Ar(2,10)", 1).unwrap(),
        "F(10)[//Ar(1,10)][+(45)Af(1,10)]"
    );
}

#[test]
fn test_pass_uses_pre_pass_snapshot() {
    // Both tokens rewrite from their own params; neither sees the other's output.
    assert_eq!(
        planar().expand_str("Ar(2,10)Ar(1,5)", 1).unwrap(),
        "F(10)[//Ar(1,10)][+(45)Af(1,10)]Ae(5)"
    );
}

#[test]
fn test_reduced_string_is_stable() {
    let engine = planar();
    let three = engine.expand_str("Ar(1,10)", 3).unwrap();
    assert_eq!(
        three,
        "F(10)[F(10)S(30)][+(45)F(10)S(30)][-(45)F(10)S(30)]"
    );
    assert_eq!(engine.expand_str("Ar(1,10)", 12).unwrap(), three);
}

#[test]
fn test_non_positive_depth_terminates() {
    assert_eq!(planar().expand_str("Ar(0,10)", 1).unwrap(), "Ae(10)");
    assert_eq!(planar().expand_str("Af(-3,10)", 1).unwrap(), "Ae(10)");
}

#[test]
fn test_wrong_arity_fails_fast() {
    match planar().expand_str("F(1)Ar(2)", 1) {
        Err(GrapeError::Arity {
            symbol,
            expected,
            found,
        }) => {
            assert_eq!(symbol, "Ar");
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("expected arity error, got {other:?}"),
    }
}

#[test]
fn test_unregistered_tag_is_an_error() {
    assert_eq!(
        planar().expand_str("Ac(1,1,1)", 1),
        Err(GrapeError::UnknownRule("Ac".to_string()))
    );
}

#[test]
fn test_short_child_count_table_is_rejected_up_front() {
    let config = GrammarConfig::planar().with_depth(4);
    assert!(matches!(
        GrammarEngine::new(config),
        Err(GrapeError::Config(_))
    ));
}

#[test]
fn test_child_count_miss_at_rule_time() {
    assert!(matches!(
        planar().expand_str("Ar(5,10)", 1),
        Err(GrapeError::Config(_))
    ));
}

#[test]
fn test_iterate_requires_full_reduction() {
    let engine = planar();
    assert!(matches!(
        engine.iterate(4),
        Err(GrapeError::Unreduced { .. })
    ));
    assert!(engine.iterate(5).is_ok());
}

#[test]
fn test_terminates_for_every_depth() {
    let table = vec![1, 2, 1, 3];
    for depth in 1..=5 {
        let config = GrammarConfig::planar()
            .with_depth(depth)
            .with_child_counts(table.clone());
        let engine = GrammarEngine::new(config).unwrap();
        let tokens = engine.iterate(depth as usize + 4).unwrap();
        assert!(tokens.iter().all(|t| !t.is_nonterminal()));
        assert_eq!(count(&tokens, Symbol::Push), count(&tokens, Symbol::Pop));
    }
}

#[test]
fn test_face_cycle_rotates_laterals() {
    let engine = phyllotactic();
    assert_eq!(
        engine.expand_str("Ac(2,1,1)", 1).unwrap(),
        "E(0,0,0,1,1)[//Av(1,0.99,1)][+(60)Af(1,0.89,1)]"
    );
    assert_eq!(
        engine.expand_str("Av(2,1,1)", 1).unwrap(),
        "E(0,0,0,1,1)[/Ab(1,0.99,1)][+(60)Af(1,0.89,1)]"
    );
    assert_eq!(
        engine.expand_str("Ab(2,1,1)", 1).unwrap(),
        "E(0,0,0,1,1)[//An(1,0.99,1)][+(60)Af(1,0.89,1)]"
    );
    assert_eq!(
        engine.expand_str("An(2,1,1)", 1).unwrap(),
        "E(0,0,0,1,1)[_Ac(1,0.99,1)][+(60)Af(1,0.89,1)]"
    );
}

#[test]
fn test_root_acts_as_first_face() {
    assert_eq!(
        phyllotactic().expand_str("Ar(2,1,1)", 1).unwrap(),
        "E(0,0,0,1,1)[//Av(1,0.99,1)][+(60)Af(1,0.89,1)]"
    );
}

#[test]
fn test_deep_secondary_keeps_its_axis() {
    // The continuing lateral rolls right and tapers by r_ff; the side shoot is a tip.
    assert_eq!(
        phyllotactic().expand_str("Af(2,1,1)", 1).unwrap(),
        "E(0,0,0,1,1)[_Af(1,0.99,1)][+(60)Ae(0.6,1)]"
    );
}

#[test]
fn test_tapered_tip_rolls_outer_pedicels() {
    assert_eq!(
        phyllotactic().expand_str("Ae(1,1)", 1).unwrap(),
        "E(0,0,0,1,1)[Ap(1.5,1)][+(60)/(120)Ap(1.5,1)][-(60)_(120)Ap(1.5,1)]"
    );
}

#[test]
fn test_phyllotactic_deep_laterals_terminate() {
    for secondary_depth in 2..=4 {
        let config = GrammarConfig::phyllotactic().with_secondary_depth(secondary_depth);
        let engine = GrammarEngine::new(config).unwrap();
        // Last lateral spawns at pass 6 and needs k + 3 more passes.
        let tokens = engine.iterate(9 + secondary_depth as usize).unwrap();
        assert!(tokens.iter().all(|t| !t.is_nonterminal()));
        assert_eq!(count(&tokens, Symbol::Push), count(&tokens, Symbol::Pop));
        assert!(count(&tokens, Symbol::Berry) > 0);
    }
}

#[test]
fn test_segment_expands_to_oriented_forward() {
    assert_eq!(
        phyllotactic().expand_str("E(0,10,20,2,1)", 1).unwrap(),
        "+(10)&(20)!(0.98)F(2)"
    );
}

#[test]
fn test_berry_segment_draws_bounded_size() {
    let tokens = phyllotactic().expand(&parse_tokens("E(1,0,0,2,1)").unwrap(), 1).unwrap();
    let berry = tokens.last().unwrap();
    assert_eq!(berry.symbol, Symbol::Berry);
    assert!((2.0..3.0).contains(&berry.params[0]));
    assert_eq!(count(&tokens, Symbol::Skip), 0);
}

#[test]
fn test_berry_at_suppress_length_is_swallowed() {
    let tokens = phyllotactic().expand(&parse_tokens("E(1,0,0,3,1)").unwrap(), 1).unwrap();
    let n = tokens.len();
    assert_eq!(tokens[n - 2].symbol, Symbol::Skip);
    assert_eq!(tokens[n - 1].symbol, Symbol::Berry);
}

#[test]
fn test_unknown_segment_type_is_rejected() {
    assert!(matches!(
        phyllotactic().expand_str("E(2,0,0,1,1)", 1),
        Err(GrapeError::Config(_))
    ));
}

#[test]
fn test_phyllotactic_default_fully_reduces() {
    let tokens = phyllotactic().iterate(15).unwrap();
    assert!(count(&tokens, Symbol::Berry) > 0);
    assert_eq!(count(&tokens, Symbol::Push), count(&tokens, Symbol::Pop));
}

#[test]
fn test_same_seed_same_string() {
    let config = GrammarConfig::phyllotactic().with_seed(7);
    let a = GrammarEngine::new(config.clone()).unwrap().iterate(15).unwrap();
    let b = GrammarEngine::new(config).unwrap().iterate(15).unwrap();
    assert_eq!(a, b);

    let c = GrammarEngine::new(GrammarConfig::phyllotactic().with_seed(8))
        .unwrap()
        .iterate(15)
        .unwrap();
    assert_ne!(a, c);
}

#[test]
fn test_standard_grammar_is_inspectable() {
    let tags: Vec<Tag> = Grammar::standard(GrammarVariant::Planar).tags().collect();
    assert_eq!(tags, vec![Tag::Root, Tag::Secondary, Tag::Tip, Tag::Pedicel]);
    assert!(
        Grammar::standard(GrammarVariant::Phyllotactic)
            .rule_for(Symbol::Segment)
            .is_some()
    );
}

fn stub_root(_ctx: &mut RuleContext<'_>, token: &Token) -> GrapeResult<Vec<Token>> {
    Ok(vec![Token::new(Symbol::Forward, &[token.params[1]])])
}

#[test]
fn test_custom_rule_replaces_standard_one() {
    let grammar = Grammar::standard(GrammarVariant::Planar).with_rule(Tag::Root, stub_root);
    let engine = GrammarEngine::with_grammar(GrammarConfig::planar(), grammar).unwrap();
    assert_eq!(engine.iterate(1).unwrap(), vec![Token::new(Symbol::Forward, &[40.0])]);
}
