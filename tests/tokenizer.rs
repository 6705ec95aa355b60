// tests/tokenizer.rs
use grape_lsystem::{GrapeError, Symbol, Tag, Token, parse_tokens, tokens_to_string};

#[test]
fn test_parses_bracketed_production() {
    let tokens = parse_tokens("F(10)[//Ar(2, 10)][+(45)Af(1,10)]").unwrap();

    let symbols: Vec<Symbol> = tokens.iter().map(|t| t.symbol).collect();
    assert_eq!(
        symbols,
        vec![
            Symbol::Forward,
            Symbol::Push,
            Symbol::RollLeft,
            Symbol::RollLeft,
            Symbol::Module(Tag::Root),
            Symbol::Pop,
            Symbol::Push,
            Symbol::BendLeft,
            Symbol::Module(Tag::Secondary),
            Symbol::Pop,
        ]
    );
    assert_eq!(tokens[0].params, vec![10.0]);
    assert_eq!(tokens[4].params, vec![2.0, 10.0]);
    assert!(tokens[2].params.is_empty());
}

#[test]
fn test_serializes_without_spaces() {
    let tokens = parse_tokens("F(10) [ //Ar(2, 10) ] S(7.5) %").unwrap();
    assert_eq!(tokens_to_string(&tokens), "F(10)[//Ar(2,10)]S(7.5)%");
}

#[test]
fn test_every_symbol_is_recognised() {
    let tokens = parse_tokens("FSE(0,0,0,1,1)+-/_&^[]%!(2)AeApAcAvAbAn").unwrap();
    assert_eq!(tokens.len(), 19);
    assert!(tokens[2].is_nonterminal());
    assert!(!tokens[0].is_nonterminal());
    assert_eq!(tokens[12].symbol, Symbol::Width);
    assert_eq!(tokens[12].params, vec![2.0]);
    assert_eq!(tokens[18], Token::bare(Symbol::Module(Tag::FaceN)));
}

#[test]
fn test_unknown_tag_is_rejected() {
    let err = parse_tokens("F(1)Ax(1)").unwrap_err();
    assert!(matches!(err, GrapeError::Parse { offset: 4, .. }));
}

#[test]
fn test_dangling_module_is_rejected() {
    assert!(matches!(
        parse_tokens("F(1)A"),
        Err(GrapeError::Parse { .. })
    ));
}

#[test]
fn test_unknown_symbol_is_rejected() {
    assert!(matches!(parse_tokens("F(1)Q"), Err(GrapeError::Parse { .. })));
}

#[test]
fn test_unterminated_params_are_rejected() {
    assert!(matches!(parse_tokens("F(1"), Err(GrapeError::Parse { .. })));
}

#[test]
fn test_non_numeric_params_are_rejected() {
    match parse_tokens("F(1)Ar(2,x)") {
        Err(GrapeError::InvalidNumber { text, .. }) => assert_eq!(text, "x"),
        other => panic!("expected InvalidNumber, got {other:?}"),
    }
    assert!(matches!(
        parse_tokens("F()"),
        Err(GrapeError::InvalidNumber { .. })
    ));
}

#[test]
fn test_non_finite_params_are_rejected() {
    match parse_tokens("F(NaN)") {
        Err(GrapeError::InvalidNumber { offset, text }) => {
            assert_eq!(offset, 2);
            assert_eq!(text, "NaN");
        }
        other => panic!("expected InvalidNumber, got {other:?}"),
    }
    match parse_tokens("Ac(inf,1,1)") {
        Err(GrapeError::InvalidNumber { offset, text }) => {
            assert_eq!(offset, 3);
            assert_eq!(text, "inf");
        }
        other => panic!("expected InvalidNumber, got {other:?}"),
    }
    assert!(matches!(
        parse_tokens("F(1)S(-inf)"),
        Err(GrapeError::InvalidNumber { .. })
    ));
}
