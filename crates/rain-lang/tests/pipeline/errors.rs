//! Diagnostic wording and positions for every structural error case.

use rain_lang::compile;
use rain_meta::OPMETA_MAGIC;

use crate::{opmeta_bytes, opmeta_hex};

/// First diagnostic message for a failing compile.
fn first_error(text: &str) -> String {
    compile(text, &opmeta_hex())
        .expect_err(&format!("expected failure for {text:?}"))
        .problems[0]
        .message()
        .to_string()
}

#[test]
fn empty_document_needs_semi() {
    assert_eq!(first_error(""), "source item expressions must end with semi");
}

#[test]
fn missing_terminal_semi() {
    assert_eq!(
        first_error("_: add(10 20)"),
        "source item expressions must end with semi"
    );
}

#[test]
fn content_after_last_semi() {
    assert_eq!(
        first_error("_: add(10 20); _: add(1 2)"),
        "source item expressions must end with semi"
    );
}

#[test]
fn rhs_without_lhs_slot() {
    assert_eq!(
        first_error(":add(10 20);"),
        "no LHS item exists to match this RHS item"
    );
}

#[test]
fn excess_rhs_in_mixed_clause() {
    assert_eq!(
        first_error("_: add(10 20) block-timestamp();"),
        "no LHS item exists to match this RHS item"
    );
}

#[test]
fn lhs_without_rhs_value() {
    assert_eq!(
        first_error("_: add(10 20), _:;"),
        "no RHS item exists to match this LHS item: _"
    );
}

#[test]
fn named_lhs_without_rhs_value() {
    assert_eq!(
        first_error("a:;"),
        "no RHS item exists to match this LHS item: a"
    );
}

#[test]
fn excess_lhs_items() {
    assert_eq!(
        first_error("_ _: add(10 20);"),
        "no RHS item exists to match this LHS item: _"
    );
}

#[test]
fn bare_separators_are_invalid() {
    assert_eq!(first_error(";"), "invalid rain expression");
    assert_eq!(first_error("add(1 2);"), "invalid rain expression");
}

#[test]
fn invalid_lhs_alias_pattern() {
    assert_eq!(first_error("2x: add(1 2);"), "invalid LHS alias: 2x");
    assert_eq!(first_error("/foo: add(1 2);"), "invalid LHS alias: /foo");
}

#[test]
fn line_comment_in_lhs_position() {
    assert_eq!(
        first_error("// note\n_: add(1 2);"),
        "invalid LHS alias: // note"
    );
}

#[test]
fn unterminated_block_comment() {
    assert_eq!(first_error("_: add(1 2); /* open"), "unterminated comment");
}

#[test]
fn unknown_opcode() {
    assert_eq!(first_error("_: mul(1 2);"), "unknown opcode: mul");
}

#[test]
fn undefined_alias() {
    assert_eq!(first_error("_: add(b 2);"), "undefined alias: b");
}

#[test]
fn alias_not_visible_within_same_clause() {
    // Bindings only become visible to later clauses.
    assert_eq!(
        first_error("a b: add(1 2) sub(a 3);"),
        "undefined alias: a"
    );
}

#[test]
fn wrong_input_count() {
    assert_eq!(
        first_error("_: add(1);"),
        "invalid number of inputs for opcode add: expected 2, got 1"
    );
}

#[test]
fn wrong_operand_arg_count() {
    assert_eq!(
        first_error("_: fold<1 2>(1 2);"),
        "invalid operand args for opcode fold: expected 1, got 2"
    );
}

#[test]
fn unexpected_operand_args() {
    assert_eq!(
        first_error("_: add<1>(1 2);"),
        "unexpected operand args for opcode add"
    );
}

#[test]
fn out_of_range_operand_arg() {
    // width stores doubled, so 200 needs 400 in an 8-bit field
    assert_eq!(
        first_error("_: fold<200>(1 2);"),
        "out-of-range operand arg for opcode fold: value 200 does not fit \"width\""
    );
}

#[test]
fn oversized_literal() {
    let too_big = "1".repeat(80);
    assert_eq!(
        first_error(&format!("_: add({too_big} 1);")),
        format!("value greater than 32 bytes in size: {too_big}")
    );
}

#[test]
fn diagnostics_accumulate() {
    let err = compile("_: mul(1 2); _: div(3 4);", &opmeta_hex()).unwrap_err();
    let messages: Vec<_> = err.problems.iter().map(|p| p.message()).collect();
    assert_eq!(messages, vec!["unknown opcode: mul", "unknown opcode: div"]);
}

#[test]
fn positions_point_at_offending_token() {
    let text = "_: mul(1 2);";
    let err = compile(text, &opmeta_hex()).unwrap_err();
    let span = err.problems[0].span();
    assert_eq!(
        &text[span.start().offset() as usize..span.end().offset() as usize],
        "mul"
    );
}

// ============================================================================
// Op meta errors
// ============================================================================

#[test]
fn empty_opmeta() {
    let err = compile("_:;", "").unwrap_err();
    assert_eq!(err.problems[0].message(), "expected op meta");
}

#[test]
fn opmeta_not_bytes() {
    let err = compile("_:;", "0xnothex").unwrap_err();
    assert_eq!(
        err.problems[0].message(),
        "Op Meta Error: op meta must be in valid bytes form"
    );
}

#[test]
fn opmeta_bad_header() {
    let mut bytes = opmeta_bytes();
    bytes[0] = 0x00;
    let err = compile("_:;", &format!("0x{}", hex::encode(bytes))).unwrap_err();
    assert_eq!(err.problems[0].message(), "incorrect header check");
}

#[test]
fn opmeta_trailing_garbage() {
    let mut bytes = opmeta_bytes();
    bytes.extend_from_slice(b"garbage");
    let err = compile("_:;", &format!("0x{}", hex::encode(bytes))).unwrap_err();
    assert_eq!(err.problems[0].message(), "invalid op meta");
}

#[test]
fn opmeta_bad_operand_args_order() {
    // Two args in ascending bit order: inconsistent declaration.
    let ops = serde_json::json!([{
        "name": "bad",
        "desc": "",
        "inputs": 0,
        "outputs": 1,
        "operand": [
            {"name": "a", "bits": [0, 3]},
            {"name": "b", "bits": [4, 7]}
        ]
    }]);
    let mut bytes = OPMETA_MAGIC.to_vec();
    bytes.extend_from_slice(&serde_json::to_vec(&ops).unwrap());
    let err = compile("_:;", &format!("0x{}", hex::encode(bytes))).unwrap_err();
    assert_eq!(
        err.problems[0].message(),
        "Op Meta Error: invalid meta for call, reason: bad operand args order"
    );
}
