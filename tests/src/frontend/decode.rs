use dbt_frontend::arc::decode::{cc, decode, insn_length, ArcOp, BrCmpCond, Operand};

use super::{
    alu, alu_cc_u6, alu_s12, alu_u6, b_cond, b_uncond, bl_uncond, brcc_u6, ld32, st32, trap_s,
    with_f, zop, BRK_S,
};

fn d32(w: u32) -> Option<dbt_frontend::arc::decode::DecodedInsn> {
    decode(w, 4)
}

fn d16(hw: u16) -> Option<dbt_frontend::arc::decode::DecodedInsn> {
    decode(hw as u32, 2)
}

#[test]
fn length_comes_from_the_major_opcode() {
    // Majors 0x00-0x07 are 32-bit, the rest 16-bit.
    assert_eq!(insn_length(0x0000), 4);
    assert_eq!(insn_length((0x07 << 11) as u16), 4);
    assert_eq!(insn_length((0x08 << 11) as u16), 2);
    assert_eq!(insn_length(0xffff), 2);
}

#[test]
fn alu_reg_reg_operands() {
    let di = d32(alu(4, 0x00, 3, 12, 20)).unwrap();
    assert_eq!(di.op, ArcOp::Add);
    assert_eq!(di.cc, cc::AL);
    assert!(!di.f);
    assert_eq!(
        di.operands,
        [Operand::Reg(3), Operand::Reg(12), Operand::Reg(20)]
    );
    assert_eq!(di.len, 4);
    assert_eq!(di.total_len(), 4);
}

#[test]
fn alu_f_bit() {
    let di = d32(with_f(alu(4, 0x02, 0, 1, 2))).unwrap();
    assert_eq!(di.op, ArcOp::Sub);
    assert!(di.f);
}

#[test]
fn alu_u6_operand() {
    let di = d32(alu_u6(4, 0x07, 0, 1, 63)).unwrap();
    assert_eq!(di.op, ArcOp::Xor);
    assert_eq!(di.operands[2], Operand::Imm(63));
}

#[test]
fn alu_s12_folds_dest_onto_b() {
    let di = d32(alu_s12(4, 0x00, 5, -7)).unwrap();
    assert_eq!(di.op, ArcOp::Add);
    assert_eq!(
        di.operands,
        [Operand::Reg(5), Operand::Reg(5), Operand::Imm(-7)]
    );
}

#[test]
fn alu_predicated_form() {
    let di = d32(alu_cc_u6(4, 0x00, 2, 7, cc::NE as u32)).unwrap();
    assert_eq!(di.op, ArcOp::Add);
    assert_eq!(di.cc, cc::NE);
    assert_eq!(
        di.operands,
        [Operand::Reg(2), Operand::Reg(2), Operand::Imm(7)]
    );
}

#[test]
fn alu_predicated_bad_condition() {
    assert!(d32(alu_cc_u6(4, 0x00, 2, 7, 0x10)).is_none());
}

#[test]
fn limm_operand_is_recognised() {
    let di = d32(alu(4, 0x00, 0, 1, 62)).unwrap();
    assert_eq!(di.operands[2], Operand::Limm);
    assert!(di.needs_limm());
    assert_eq!(di.total_len(), 8);
}

#[test]
fn mov_and_compare_drop_the_dest_field() {
    let di = d32(alu(4, 0x0a, 9, 1, 2)).unwrap();
    assert_eq!(di.op, ArcOp::Mov);
    assert_eq!(di.operands[..2], [Operand::Reg(9), Operand::Reg(2)]);

    let di = d32(alu_u6(4, 0x0c, 0, 1, 5)).unwrap();
    assert_eq!(di.op, ArcOp::Cmp);
    assert_eq!(di.operands[..2], [Operand::Reg(1), Operand::Imm(5)]);

    // BTST likewise has no destination; the a field is ignored.
    let di = d32(alu_u6(4, 0x11, 3, 1, 5)).unwrap();
    assert_eq!(di.op, ArcOp::Btst);
    assert_eq!(
        di.operands,
        [Operand::Reg(1), Operand::Imm(5), Operand::None]
    );
}

#[test]
fn division_family_decodes_from_major_5() {
    assert_eq!(d32(alu(5, 0x04, 0, 1, 2)).unwrap().op, ArcOp::Div);
    assert_eq!(d32(alu(5, 0x05, 0, 1, 2)).unwrap().op, ArcOp::Divu);
    assert_eq!(d32(alu(5, 0x06, 0, 1, 2)).unwrap().op, ArcOp::Rem);
    assert_eq!(d32(alu(5, 0x07, 0, 1, 2)).unwrap().op, ArcOp::Remu);
}

#[test]
fn vector_family_decodes_from_major_5() {
    assert_eq!(d32(alu(5, 0x28, 0, 2, 4)).unwrap().op, ArcOp::Vadd2);
    assert_eq!(d32(alu(5, 0x2a, 0, 2, 4)).unwrap().op, ArcOp::Vadd4h);
    assert_eq!(d32(alu(5, 0x2b, 0, 2, 4)).unwrap().op, ArcOp::Vsub2);
    assert_eq!(d32(alu(5, 0x29, 0, 2, 4)).unwrap().op, ArcOp::Vadd2h);
}

#[test]
fn sub_opcode_gaps_are_rejected() {
    assert!(d32(alu(4, 0x0d, 0, 1, 2)).is_none());
    assert!(d32(alu(4, 0x3e, 0, 1, 2)).is_none());
    assert!(d32(alu(5, 0x10, 0, 1, 2)).is_none());
    // Majors 6 and 7 are not decoded at all.
    assert!(d32(6 << 27).is_none());
    assert!(d32(7 << 27).is_none());
}

#[test]
fn branch_displacement_and_delay_bit() {
    let di = d32(b_uncond(0x40, true)).unwrap();
    assert_eq!(di.op, ArcOp::B);
    assert!(di.d);
    assert_eq!(di.cc, cc::AL);
    assert_eq!(di.operands[0], Operand::Imm(0x40));

    let di = d32(b_uncond(-0x40, false)).unwrap();
    assert_eq!(di.operands[0], Operand::Imm(-0x40));
}

#[test]
fn conditional_branch_carries_the_cc_field() {
    let di = d32(b_cond(0x100, cc::GT as u32, false)).unwrap();
    assert_eq!(di.op, ArcOp::B);
    assert_eq!(di.cc, cc::GT);
    assert_eq!(di.operands[0], Operand::Imm(0x100));
}

#[test]
fn branch_and_link_target_is_word_aligned() {
    let di = d32(bl_uncond(0x84, true)).unwrap();
    assert_eq!(di.op, ArcOp::Bl);
    assert!(di.d);
    assert_eq!(di.operands[0], Operand::Imm(0x84));
}

#[test]
fn compare_branch_conditions() {
    let di = d32(brcc_u6(2, 1, 5, -8)).unwrap();
    assert_eq!(di.op, ArcOp::BrCmp(BrCmpCond::Lt));
    assert_eq!(
        di.operands,
        [Operand::Reg(1), Operand::Imm(5), Operand::Imm(-8)]
    );
    // Bit-test branch sub-conditions are not decoded.
    assert!(d32(brcc_u6(8, 1, 5, -8)).is_none());
}

#[test]
fn load_decodes_size_extend_and_mode() {
    let di = d32(ld32(3, 1, -4, 2, true, 1)).unwrap();
    assert_eq!(di.op, ArcOp::Ld { zz: 2, x: true, aa: 1 });
    assert_eq!(
        di.operands,
        [Operand::Reg(3), Operand::Reg(1), Operand::Imm(-4)]
    );
    // Reserved size class, and sign-extension of a full word.
    assert!(d32(ld32(3, 1, 0, 3, false, 0)).is_none());
    assert!(d32(ld32(3, 1, 0, 0, true, 0)).is_none());
}

#[test]
fn store_decodes_and_rejects_the_reserved_bit() {
    let di = d32(st32(0, 1, 16, 0, 0)).unwrap();
    assert_eq!(di.op, ArcOp::St { zz: 0, aa: 0 });
    assert_eq!(
        di.operands,
        [Operand::Reg(0), Operand::Reg(1), Operand::Imm(16)]
    );
    assert!(d32(st32(0, 1, 16, 0, 0) | 1).is_none());
    assert!(d32(st32(0, 1, 16, 3, 0)).is_none());
}

#[test]
fn single_operand_group() {
    // sub2 selects the operation; the b field is the destination.
    let w = 4 << 27 | 0x2f << 16 | super::fb(1) | 2 << 6 | 0x09;
    let di = d32(w).unwrap();
    assert_eq!(di.op, ArcOp::Abs);
    assert_eq!(di.operands[..2], [Operand::Reg(1), Operand::Reg(2)]);
    // Formats 2 and 3 are reserved here.
    assert!(d32(w | 2 << 22).is_none());
}

#[test]
fn zero_operand_group() {
    assert_eq!(d32(zop(1)).unwrap().op, ArcOp::Sleep);
    assert_eq!(d32(zop(2)).unwrap().op, ArcOp::Swi);
    assert_eq!(d32(zop(5)).unwrap().op, ArcOp::Brk);
    assert!(d32(zop(3)).is_none());
}

#[test]
fn aux_and_system_ops() {
    assert_eq!(d32(alu_s12(4, 0x2a, 2, 0x412)).unwrap().op, ArcOp::Lr);
    assert_eq!(d32(alu_s12(4, 0x2b, 1, 0x412)).unwrap().op, ArcOp::Sr);
    assert_eq!(d32(alu_u6(4, 0x29, 0, 0, 1)).unwrap().op, ArcOp::Flag);
    let di = d32(alu_u6(4, 0x29, 0, 0, 1)).unwrap();
    assert_eq!(di.operands[0], Operand::Imm(1));
}

#[test]
fn jumps_take_the_source_operand() {
    let di = d32(alu(4, 0x21, 0, 0, 31)).unwrap();
    assert_eq!(di.op, ArcOp::J { link: false });
    assert!(di.d);
    assert_eq!(di.operands[0], Operand::Reg(31));

    let di = d32(alu_u6(4, 0x22, 0, 0, 0)).unwrap();
    assert_eq!(di.op, ArcOp::J { link: true });
    assert!(!di.d);
}

// ── 16-bit forms ────────────────────────────────────────────

#[test]
fn compact_register_fields_map_to_r0_r3_and_r12_r15() {
    // ld_s a, [b, c]: major 0x0c sub 0.
    let hw = (0x0c << 11 | 5 << 8 | 6 << 5 | 7) as u16;
    let di = d16(hw).unwrap();
    assert_eq!(di.op, ArcOp::Ld { zz: 0, x: false, aa: 0 });
    assert_eq!(
        di.operands,
        [Operand::Reg(15), Operand::Reg(13), Operand::Reg(14)]
    );
}

#[test]
fn compact_mov_immediate() {
    let di = d16(super::mov_s(1, 0xbb)).unwrap();
    assert_eq!(di.op, ArcOp::Mov);
    assert_eq!(di.operands[..2], [Operand::Reg(1), Operand::Imm(0xbb)]);
}

#[test]
fn compact_add_with_u3() {
    let di = d16(super::add_s_u3(2, 0, 1)).unwrap();
    assert_eq!(di.op, ArcOp::Add);
    assert_eq!(
        di.operands,
        [Operand::Reg(2), Operand::Reg(0), Operand::Imm(1)]
    );
}

#[test]
fn compact_shift_group() {
    // asl_s b, b, u5: major 0x17 sub 0.
    let hw = (0x17 << 11 | 1 << 8 | 0 << 5 | 9) as u16;
    let di = d16(hw).unwrap();
    assert_eq!(di.op, ArcOp::Asl);
    assert_eq!(
        di.operands,
        [Operand::Reg(1), Operand::Reg(1), Operand::Imm(9)]
    );
}

#[test]
fn compact_branches() {
    // b_s with a 10-bit displacement.
    let hw = (0x1e << 11 | (0x20 >> 1)) as u16;
    let di = d16(hw).unwrap();
    assert_eq!(di.op, ArcOp::B);
    assert_eq!(di.cc, cc::AL);
    assert_eq!(di.operands[0], Operand::Imm(0x20));

    // beq_s.
    let hw = (0x1e << 11 | 1 << 9 | (0x10 >> 1)) as u16;
    let di = d16(hw).unwrap();
    assert_eq!(di.cc, cc::EQ);

    // brne_s b, 0, disp.
    let hw = (0x1d << 11 | 2 << 8 | 0x80 | (0x18 >> 1)) as u16;
    let di = d16(hw).unwrap();
    assert_eq!(di.op, ArcOp::BrCmp(BrCmpCond::Ne));
    assert_eq!(
        di.operands,
        [Operand::Reg(2), Operand::Imm(0), Operand::Imm(0x18)]
    );
}

#[test]
fn compact_jump_group() {
    // j_s.d [b]
    let hw = (0x0f << 11 | 1 << 8 | 1 << 5) as u16;
    let di = d16(hw).unwrap();
    assert_eq!(di.op, ArcOp::J { link: false });
    assert!(di.d);
    assert_eq!(di.operands[0], Operand::Reg(1));

    // j_s [blink]
    let hw = (0x0f << 11 | 6 << 8 | 7 << 5) as u16;
    let di = d16(hw).unwrap();
    assert_eq!(di.op, ArcOp::J { link: false });
    assert_eq!(di.operands[0], Operand::Reg(31));

    // nop_s
    let hw = (0x0f << 11 | 7 << 5) as u16;
    assert_eq!(d16(hw).unwrap().op, ArcOp::Nop);
}

#[test]
fn compact_trap_and_break() {
    let di = d16(trap_s(3)).unwrap();
    assert_eq!(di.op, ArcOp::Trap);
    assert_eq!(di.operands[0], Operand::Imm(3));

    assert_eq!(d16(BRK_S).unwrap().op, ArcOp::Brk);
    // Only the all-ones form of the break slot decodes.
    assert!(d16((0x0f << 11 | 1 << 5 | 0x1f) as u16).is_none());
}

#[test]
fn sp_and_gp_relative_majors_are_gaps() {
    assert!(d16((0x18 << 11) as u16).is_none());
    assert!(d16((0x19 << 11) as u16).is_none());
}
