//! The round-trip law: decompiled text recompiles to byte-identical sources.

use rain_lang::{compile, decompile, document_body};

use crate::decompile::{HASH, seeded_store};
use crate::opmeta_hex;

/// Compile, decompile, re-compile, and compare.
fn assert_round_trip(source: &str) {
    let config = compile(source, &opmeta_hex())
        .unwrap_or_else(|e| panic!("compile of {source:?} failed: {e}"));
    let doc = decompile(&config, HASH, &mut seeded_store())
        .unwrap_or_else(|e| panic!("decompile of {source:?} failed: {e}"));

    let body = document_body(doc.get_text());
    let recompiled = compile(&body, &opmeta_hex())
        .unwrap_or_else(|e| panic!("recompile of {body:?} failed: {e}"));

    assert_eq!(recompiled.sources, config.sources, "sources for {source:?}");
    assert_eq!(
        recompiled.constants, config.constants,
        "constants for {source:?}"
    );
}

#[test]
fn round_trip_simple() {
    assert_round_trip("_: add(10 20);");
}

#[test]
fn round_trip_empty_sources() {
    assert_round_trip("_:;");
    assert_round_trip("_:;_:;_:;");
    assert_round_trip(":;");
}

#[test]
fn round_trip_multiple_clauses() {
    assert_round_trip("_: add(10 20), _: block-timestamp();");
}

#[test]
fn round_trip_nested_calls() {
    assert_round_trip("_: add(sub(5 3) add(1 2));");
}

#[test]
fn round_trip_operand_args() {
    assert_round_trip("_: fold<3>(1 2);");
    assert_round_trip("_: fold<0>(1 2 3);");
}

#[test]
fn round_trip_multi_output() {
    assert_round_trip("_ _: split(9);");
}

#[test]
fn round_trip_zero_output() {
    assert_round_trip(": set(1 2);");
}

#[test]
fn round_trip_aliases() {
    assert_round_trip("a: add(10 20), _: sub(a 5);");
    assert_round_trip("a: add(1 2), b: add(a 3), _: sub(b a);");
}

#[test]
fn round_trip_constants_dedup() {
    assert_round_trip("_: add(7 7), _: add(7 8);");
}

#[test]
fn round_trip_max_uint256() {
    assert_round_trip("_: add(max-uint256 max-uint256);");
}

#[test]
fn round_trip_multiple_sources() {
    assert_round_trip("_: add(10 20); _ _: split(3); _:;");
}

#[test]
fn round_trip_opcode_alias_normalizes_to_name() {
    // `sum` compiles to the same opcode as `add`; the decompiled text spells
    // the canonical name but the bytecode is identical.
    let config = compile("_: sum(1 2);", &opmeta_hex()).unwrap();
    let doc = decompile(&config, HASH, &mut seeded_store()).unwrap();
    assert!(doc.get_text().contains("_: add(1 2);"));

    let recompiled = compile(&document_body(doc.get_text()), &opmeta_hex()).unwrap();
    assert_eq!(recompiled.sources, config.sources);
}
