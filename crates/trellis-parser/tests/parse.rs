//! Integration tests for the front-end pipeline: tokenize, parse,
//! validate, elaborate.

use proptest::prelude::*;

use trellis_core::{
    document::{Direction, EdgeKind, ProfileKind},
    identifier::Id,
};
use trellis_parser::{ErrorCode, ParseOptions, parse};

fn parse_ok(source: &str) -> trellis_core::document::Document {
    parse(source, &ParseOptions::default()).expect("source should parse")
}

fn parse_codes(source: &str) -> Vec<ErrorCode> {
    parse(source, &ParseOptions::default())
        .expect_err("source should fail")
        .diagnostics()
        .iter()
        .filter_map(|d| d.code())
        .collect()
}

#[test]
fn parses_multi_profile_document() {
    let document = parse_ok(
        r#"
        profile flowchart intake {
            direction: LR;
            node a; node b;
            a -> b;
        }
        profile sequence checkout {
            node customer; node gateway;
            customer -> gateway: "pay";
        }
        "#,
    );

    assert_eq!(document.profiles.len(), 2);
    assert_eq!(document.profiles[0].kind, ProfileKind::Flowchart);
    assert_eq!(document.profiles[0].direction, Direction::LeftToRight);
    assert_eq!(document.profiles[1].kind, ProfileKind::Sequence);
    assert_eq!(document.profiles[1].title.as_deref(), Some("checkout"));
}

#[test]
fn parses_full_feature_profile() {
    let document = parse_ok(
        r##"
        // a schematic with everything on it
        profile schematic power_stage {
            direction: LR;
            style bold [stroke_width: 2.5, stroke: "#222"];

            node v1: battery [label: "9V", data: { pins: { pos: vcc, neg: gnd } }];
            node r1: resistor [style: bold, data: { pins: { a: vcc, b: out } }];
            node c1: capacitor [data: { pins: { a: out, b: gnd } }];

            v1.pos -> r1.a;
            r1.b -> c1.a [route: orthogonal];

            container filter [label: "Output filter"] {
                c1;
            }
        }
        "##,
    );

    let profile = &document.profiles[0];
    assert_eq!(profile.nodes.len(), 3);
    assert_eq!(profile.edges.len(), 2);
    assert_eq!(profile.containers.len(), 1);

    let edge = &profile.edges[0];
    assert_eq!(edge.source.port, Some(Id::new("pos")));
    assert_eq!(edge.target.port, Some(Id::new("a")));
    assert_eq!(edge.kind, EdgeKind::Directed);

    let c1 = profile.node(Id::new("c1")).unwrap();
    assert_eq!(c1.parent, Some(Id::new("filter")));
}

#[test]
fn reports_syntax_and_semantic_errors_separately() {
    // Pure syntax problem
    assert!(parse_codes("profile flowchart { node ; }").contains(&ErrorCode::E100));

    // Pure reference problem
    assert_eq!(
        parse_codes("profile flowchart { node a; a -> ghost; }"),
        vec![ErrorCode::E201]
    );
}

#[test]
fn collects_every_error_in_one_call() {
    let codes = parse_codes(
        r#"
        profile flowchart {
            node dup;
            node dup;
            dup -> nowhere;
            container c { c; }
        }
        "#,
    );
    assert!(codes.contains(&ErrorCode::E200));
    assert!(codes.contains(&ErrorCode::E201));
    assert!(codes.contains(&ErrorCode::E202));
    assert_eq!(codes.len(), 3);
}

#[test]
fn container_cycle_blocks_elaboration() {
    let codes = parse_codes(
        r#"
        profile flowchart {
            container a { b; }
            container b { a; }
        }
        "#,
    );
    assert_eq!(codes, vec![ErrorCode::E202]);
}

#[test]
fn empty_source_is_an_empty_document() {
    let document = parse_ok("");
    assert!(document.profiles.is_empty());

    let document = parse_ok("// nothing but a comment\n");
    assert!(document.profiles.is_empty());
}

#[test]
fn empty_profile_is_valid() {
    let document = parse_ok("profile timeline { }");
    assert!(document.profiles[0].nodes.is_empty());
}

#[test]
fn bad_lexeme_reports_position() {
    let err = parse("profile flowchart {\n  node @a;\n}", &ParseOptions::default()).unwrap_err();
    let diag = &err.diagnostics()[0];
    assert_eq!(diag.code(), Some(ErrorCode::E002));
    let span = diag.primary_span().unwrap();
    // `@` is at byte 27: line 2, column 8
    assert_eq!(span.line_col("profile flowchart {\n  node @a;\n}"), (2, 8));
}

#[test]
fn parse_is_deterministic() {
    let source = r#"
    profile wardley map {
        node kettle [data: { evolution: 0.6, visibility: 0.8 }];
        node power [data: { evolution: 0.9, visibility: 0.3 }];
        kettle -> power;
    }
    "#;
    let first = parse_ok(source);
    let second = parse_ok(source);
    assert_eq!(first, second);
}

proptest! {
    /// Any set of distinct ids parses cleanly; forcing one collision
    /// always produces exactly one duplicate-id diagnostic.
    #[test]
    fn prop_duplicate_ids_always_detected(
        ids in proptest::collection::hash_set("[a-z][a-z0-9_]{0,8}", 2..8)
            .prop_map(|set| set.into_iter().map(|id| format!("id_{id}")).collect::<Vec<_>>()),
        dup_index in 0usize..8,
    ) {
        let mut source = String::from("profile flowchart {\n");
        for id in &ids {
            source.push_str(&format!("node {id};\n"));
        }
        source.push('}');

        prop_assert!(parse(&source, &ParseOptions::default()).is_ok());

        // Duplicate one declaration and expect exactly one E200.
        let dup = &ids[dup_index % ids.len()];
        let mut collided = String::from("profile flowchart {\n");
        for id in &ids {
            collided.push_str(&format!("node {id};\n"));
        }
        collided.push_str(&format!("node {dup};\n"));
        collided.push('}');

        let err = parse(&collided, &ParseOptions::default()).unwrap_err();
        let duplicates: Vec<_> = err
            .diagnostics()
            .iter()
            .filter(|d| d.code() == Some(ErrorCode::E200))
            .collect();
        prop_assert_eq!(duplicates.len(), 1);
        prop_assert!(duplicates[0].message().contains(dup.as_str()));
    }

    /// Round-trip determinism: parsing the same generated source twice
    /// yields structurally equal documents.
    #[test]
    fn prop_parse_deterministic(
        ids in proptest::collection::hash_set("[a-z][a-z0-9_]{0,8}", 1..6)
            .prop_map(|set| set.into_iter().map(|id| format!("id_{id}")).collect::<Vec<_>>()),
    ) {
        let mut source = String::from("profile flowchart {\n");
        for id in &ids {
            source.push_str(&format!("node {id};\n"));
        }
        for pair in ids.windows(2) {
            source.push_str(&format!("{} -> {};\n", pair[0], pair[1]));
        }
        source.push('}');

        let first = parse(&source, &ParseOptions::default()).unwrap();
        let second = parse(&source, &ParseOptions::default()).unwrap();
        prop_assert_eq!(first, second);
    }
}
