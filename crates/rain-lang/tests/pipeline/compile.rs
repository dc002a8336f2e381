//! Compilation happy paths: sources, constants, operand packing.

use rain_lang::compile;

use crate::{
    OP_ADD, OP_BLOCK_TIMESTAMP, OP_FOLD, OP_READ_MEMORY, OP_SET, OP_SPLIT, OP_SUB, const_ref,
    instrs, opmeta_hex, stack_ref,
};

#[test]
fn empty_expression_single_source() {
    let config = compile("_:;", &opmeta_hex()).unwrap();
    assert_eq!(config.sources.len(), 1);
    assert!(config.sources[0].is_empty());
    assert!(config.constants.is_empty());
}

#[test]
fn empty_expression_variants() {
    for text in [":;", "_:;", "_ _:;", "_:,_:;", "_: , _ :;"] {
        let config = compile(text, &opmeta_hex()).unwrap_or_else(|e| panic!("{text}: {e}"));
        assert_eq!(config.sources.len(), 1, "{text}");
        assert!(config.constants.is_empty(), "{text}");
    }
}

#[test]
fn empty_expression_source_per_semi() {
    let config = compile("_:;_:;_:;", &opmeta_hex()).unwrap();
    assert_eq!(config.sources.len(), 3);
    assert!(config.constants.is_empty());
}

#[test]
fn add_interns_literals_left_to_right() {
    let config = compile("_:add(10 20);", &opmeta_hex()).unwrap();
    assert_eq!(config.constants, vec!["10", "20"]);
    assert_eq!(config.sources.len(), 1);
    assert_eq!(
        config.sources[0],
        instrs(&[
            (OP_READ_MEMORY, const_ref(0)),
            (OP_READ_MEMORY, const_ref(1)),
            (OP_ADD, 0),
        ])
    );
}

#[test]
fn clauses_share_one_source() {
    let config = compile("_: add(10 20), _: block-timestamp();", &opmeta_hex()).unwrap();
    assert_eq!(config.constants, vec!["10", "20"]);
    assert_eq!(config.sources.len(), 1);
    assert_eq!(
        config.sources[0],
        instrs(&[
            (OP_READ_MEMORY, const_ref(0)),
            (OP_READ_MEMORY, const_ref(1)),
            (OP_ADD, 0),
            (OP_BLOCK_TIMESTAMP, 0),
        ])
    );
}

#[test]
fn constants_dedup_by_value() {
    let config = compile("_: add(10 10);", &opmeta_hex()).unwrap();
    assert_eq!(config.constants, vec!["10"]);

    // Hex and decimal spellings of the same value share one slot.
    let config = compile("_: add(0x0a 10);", &opmeta_hex()).unwrap();
    assert_eq!(config.constants, vec!["10"]);
}

#[test]
fn max_uint256_literal() {
    let config = compile("_: add(max-uint256 1);", &opmeta_hex()).unwrap();
    assert_eq!(
        config.constants[0],
        alloy_primitives::U256::MAX.to_string()
    );
    assert_eq!(config.constants[1], "1");
}

#[test]
fn opcode_alias_resolves_to_same_index() {
    let by_name = compile("_: add(1 2);", &opmeta_hex()).unwrap();
    let by_alias = compile("_: sum(1 2);", &opmeta_hex()).unwrap();
    assert_eq!(by_name.sources, by_alias.sources);
}

#[test]
fn nested_calls_emit_postorder() {
    let config = compile("_: add(sub(5 3) 2);", &opmeta_hex()).unwrap();
    assert_eq!(config.constants, vec!["5", "3", "2"]);
    assert_eq!(
        config.sources[0],
        instrs(&[
            (OP_READ_MEMORY, const_ref(0)),
            (OP_READ_MEMORY, const_ref(1)),
            (OP_SUB, 0),
            (OP_READ_MEMORY, const_ref(2)),
            (OP_ADD, 0),
        ])
    );
}

#[test]
fn alias_reference_reads_stack_slot() {
    let config = compile("a: add(10 20), _: sub(a 5);", &opmeta_hex()).unwrap();
    assert_eq!(config.constants, vec!["10", "20", "5"]);
    assert_eq!(
        config.sources[0],
        instrs(&[
            (OP_READ_MEMORY, const_ref(0)),
            (OP_READ_MEMORY, const_ref(1)),
            (OP_ADD, 0),
            (OP_READ_MEMORY, stack_ref(0)),
            (OP_READ_MEMORY, const_ref(2)),
            (OP_SUB, 0),
        ])
    );
}

#[test]
fn alias_shadowing_uses_latest_binding() {
    let config = compile("a: add(1 2), a: add(3 4), _: sub(a 5);", &opmeta_hex()).unwrap();
    // The reference resolves to the second `a`, at slot 1. It is the
    // seventh instruction: two literals and an add per binding clause.
    let last_ref = &config.sources[0][6 * 4..7 * 4];
    assert_eq!(last_ref, instrs(&[(OP_READ_MEMORY, stack_ref(1))]));
}

#[test]
fn computed_operand_packs_inputs_and_args() {
    let config = compile("_: fold<3>(1 2);", &opmeta_hex()).unwrap();
    // inputs=2 in bits [8,11]; width=3 stored as 3*2=6 in bits [0,7]
    let operand = (2 << 8) | 6;
    assert_eq!(
        config.sources[0],
        instrs(&[
            (OP_READ_MEMORY, const_ref(0)),
            (OP_READ_MEMORY, const_ref(1)),
            (OP_FOLD, operand),
        ])
    );
}

#[test]
fn multi_output_op_fills_two_lhs_items() {
    let config = compile("_ _: split(5);", &opmeta_hex()).unwrap();
    assert_eq!(
        config.sources[0],
        instrs(&[(OP_READ_MEMORY, const_ref(0)), (OP_SPLIT, 0)])
    );
}

#[test]
fn zero_output_op_needs_no_lhs() {
    let config = compile(": set(1 2);", &opmeta_hex()).unwrap();
    assert_eq!(
        config.sources[0],
        instrs(&[
            (OP_READ_MEMORY, const_ref(0)),
            (OP_READ_MEMORY, const_ref(1)),
            (OP_SET, 0),
        ])
    );
}

#[test]
fn sources_follow_semi_order() {
    let config = compile("_: add(1 2); _: block-timestamp();", &opmeta_hex()).unwrap();
    assert_eq!(config.sources.len(), 2);
    assert_eq!(
        config.sources[1],
        instrs(&[(OP_BLOCK_TIMESTAMP, 0)])
    );
}

#[test]
fn comments_are_trivia_outside_lhs() {
    let config = compile("_: add(10 /* twenty */ 20);", &opmeta_hex()).unwrap();
    assert_eq!(config.constants, vec!["10", "20"]);

    let config = compile("/** doc */ _: add(10 20);", &opmeta_hex()).unwrap();
    assert_eq!(config.constants, vec!["10", "20"]);
}
