//! Frontend tests: decoder coverage and unit-level translation.

mod decode;

use dbt_core::context::Context;
use dbt_core::opcode::Opcode;
use dbt_core::unit::{cflags, unit_flags, ExitKind};
use dbt_frontend::arc::translate_unit;
use dbt_frontend::UnitSummary;

// ── ARC instruction encoding helpers ────────────────────────
//
// 32-bit words are built with the first half-word in bits 31:16, the
// way the decoder sees them; `put32` then stores them middle-endian
// (little-endian half-words, most significant half-word first).

pub(crate) fn put16(buf: &mut Vec<u8>, hw: u16) {
    buf.extend_from_slice(&hw.to_le_bytes());
}

pub(crate) fn put32(buf: &mut Vec<u8>, w: u32) {
    put16(buf, (w >> 16) as u16);
    put16(buf, w as u16);
}

/// The split b-register field of 32-bit encodings.
pub(crate) fn fb(r: u32) -> u32 {
    ((r >> 3) & 7) << 12 | (r & 7) << 24
}

/// ALU format 00: `op a, b, c` (all registers).
pub(crate) fn alu(major: u32, sub: u32, a: u32, b: u32, c: u32) -> u32 {
    major << 27 | sub << 16 | fb(b) | c << 6 | a
}

/// ALU format 01: `op a, b, u6`.
pub(crate) fn alu_u6(major: u32, sub: u32, a: u32, b: u32, u6: u32) -> u32 {
    alu(major, sub, a, b, u6) | 1 << 22
}

/// ALU format 10: `op b, b, s12`.
pub(crate) fn alu_s12(major: u32, sub: u32, b: u32, s12: i32) -> u32 {
    let s = s12 as u32;
    major << 27 | sub << 16 | 2 << 22 | fb(b) | (s >> 6 & 0x3f) | (s & 0x3f) << 6
}

/// ALU format 11 with an immediate: `op.cc b, b, u6`.
pub(crate) fn alu_cc_u6(major: u32, sub: u32, b: u32, u6: u32, cond: u32) -> u32 {
    major << 27 | sub << 16 | 3 << 22 | fb(b) | 1 << 5 | u6 << 6 | cond
}

/// Set the F (flag-update) bit on a 32-bit ALU word.
pub(crate) fn with_f(w: u32) -> u32 {
    w | 1 << 15
}

/// Unconditional B, optionally with a delay slot.
pub(crate) fn b_uncond(disp: i32, delay: bool) -> u32 {
    let d = disp as u32;
    (d >> 1 & 0x3ff) << 17
        | (d >> 11 & 0x3ff) << 6
        | (d >> 21 & 0xf)
        | 1 << 16
        | (delay as u32) << 5
}

/// Conditional Bcc (21-bit displacement form).
pub(crate) fn b_cond(disp: i32, cond: u32, delay: bool) -> u32 {
    let d = disp as u32;
    (d >> 1 & 0x3ff) << 17 | (d >> 11 & 0x3ff) << 6 | cond | (delay as u32) << 5
}

/// Unconditional BL, optionally with a delay slot.
pub(crate) fn bl_uncond(disp: i32, delay: bool) -> u32 {
    let d = disp as u32;
    1 << 27
        | (d >> 2 & 0x1ff) << 18
        | (d >> 11 & 0x3ff) << 6
        | (d >> 21 & 0xf)
        | 1 << 17
        | (delay as u32) << 5
}

/// Conditional BLcc (21-bit displacement form).
pub(crate) fn bl_cond(disp: i32, cond: u32, delay: bool) -> u32 {
    let d = disp as u32;
    1 << 27 | (d >> 2 & 0x1ff) << 18 | (d >> 11 & 0x3ff) << 6 | cond | (delay as u32) << 5
}

/// BRcc with a u6 second operand.
pub(crate) fn brcc_u6(raw_cond: u32, b: u32, u6: u32, disp: i32) -> u32 {
    let d = disp as u32;
    1 << 27
        | 1 << 16
        | raw_cond
        | fb(b)
        | 1 << 4
        | u6 << 6
        | (d >> 1 & 0x7f) << 17
        | (d >> 8 & 1) << 15
}

/// LD with a 9-bit signed offset.
pub(crate) fn ld32(dst: u32, base: u32, s9: i32, zz: u32, x: bool, aa: u32) -> u32 {
    let s = s9 as u32;
    2 << 27
        | (s & 0xff) << 16
        | (s >> 8 & 1) << 15
        | fb(base)
        | aa << 9
        | zz << 7
        | (x as u32) << 6
        | dst
}

/// ST with a 9-bit signed offset.
pub(crate) fn st32(val: u32, base: u32, s9: i32, zz: u32, aa: u32) -> u32 {
    let s = s9 as u32;
    3 << 27 | (s & 0xff) << 16 | (s >> 8 & 1) << 15 | fb(base) | val << 6 | aa << 3 | zz << 1
}

/// Zero-operand group of major 0x04 sub 0x2F (SLEEP=1, SWI=2, BRK=5).
pub(crate) fn zop(sel: u32) -> u32 {
    4 << 27 | 0x2f << 16 | fb(sel) | 0x3f
}

// 16-bit forms. Compact register fields take the 3-bit field value
// (0-3 = r0-r3, 4-7 = r12-r15), not the architectural number.

pub(crate) fn mov_s(b: u32, u8v: u32) -> u16 {
    (0x1b << 11 | b << 8 | u8v) as u16
}

pub(crate) fn add_s_u3(c: u32, b: u32, u3: u32) -> u16 {
    (0x0d << 11 | b << 8 | c << 5 | u3) as u16
}

pub(crate) fn trap_s(u6: u32) -> u16 {
    (0x0f << 11 | u6 << 5 | 0x1e) as u16
}

pub(crate) const BRK_S: u16 = 0x7fff;

// ── translation ─────────────────────────────────────────────

fn tr(img: &[u8], pc: u32, cf: u32) -> (Context, UnitSummary) {
    let mut ir = Context::new();
    let summary = translate_unit(&mut ir, img, 0, pc, 0, cf);
    (ir, summary)
}

fn has_op(ir: &Context, opc: Opcode) -> bool {
    ir.ops().iter().any(|op| op.opc == opc)
}

#[test]
fn unit_stops_at_the_instruction_budget() {
    let mut img = Vec::new();
    put16(&mut img, mov_s(0, 1));
    put16(&mut img, mov_s(1, 2));
    put16(&mut img, mov_s(2, 3));
    let (ir, s) = tr(&img, 0, 2);
    assert_eq!(s.icount, 2);
    assert_eq!(s.size, 4);
    assert_eq!(s.exit, ExitKind::Fallthrough);
    assert_eq!(ir.ops()[0].opc, Opcode::InsnStart);
    // Fall-through epilogue stages the pc and leaves.
    assert!(has_op(&ir, Opcode::ExitTb));
}

#[test]
fn single_step_closes_after_one_insn() {
    let mut img = Vec::new();
    put16(&mut img, mov_s(0, 1));
    put16(&mut img, mov_s(1, 2));
    let (_, s) = tr(&img, 0, cflags::CF_SINGLE_STEP);
    assert_eq!(s.icount, 1);
    assert_eq!(s.size, 2);
    assert_eq!(s.exit, ExitKind::DebugStop);
}

#[test]
fn unconditional_branch_ends_the_unit() {
    let mut img = Vec::new();
    put32(&mut img, b_uncond(0x40, false));
    let (ir, s) = tr(&img, 0, 0);
    assert_eq!(s.icount, 1);
    assert_eq!(s.size, 4);
    assert_eq!(s.exit, ExitKind::Branch);
    assert!(has_op(&ir, Opcode::ExitTb));
}

#[test]
fn compare_branch_has_two_exits() {
    let mut img = Vec::new();
    put32(&mut img, brcc_u6(0, 1, 5, 0x20));
    let (ir, s) = tr(&img, 0, 0);
    assert_eq!(s.exit, ExitKind::Branch);
    assert!(has_op(&ir, Opcode::BrCond));
    assert!(has_op(&ir, Opcode::SetLabel));
    let exits = ir.ops().iter().filter(|o| o.opc == Opcode::ExitTb).count();
    assert_eq!(exits, 2);
}

#[test]
fn static_branch_exits_are_chaining_candidates() {
    let mut img = Vec::new();
    put32(&mut img, b_cond(0x20, 1, false));
    let (ir, _) = tr(&img, 0, 0);
    // Both successors of a translation-time target carry a slot.
    let slots: Vec<_> = ir
        .ops()
        .iter()
        .filter(|o| o.opc == Opcode::GotoTb)
        .map(|o| o.cargs()[0].0)
        .collect();
    assert_eq!(slots, vec![0, 1]);

    // Register-indirect jumps are not chainable.
    let mut img = Vec::new();
    put32(&mut img, alu(4, 0x20, 0, 0, 1));
    let (ir, _) = tr(&img, 0, 0);
    assert!(!has_op(&ir, Opcode::GotoTb));
    assert!(has_op(&ir, Opcode::ExitTb));
}

#[test]
fn delay_slot_on_the_same_page_joins_the_unit() {
    let mut img = Vec::new();
    put32(&mut img, b_uncond(0x40, true));
    put16(&mut img, add_s_u3(0, 0, 1));
    let (ir, s) = tr(&img, 0, 0);
    // Branch plus its slot: two instructions, two boundary markers.
    assert_eq!(s.icount, 2);
    assert_eq!(s.size, 6);
    assert_eq!(s.exit, ExitKind::BranchDelaySlot);
    let markers = ir
        .ops()
        .iter()
        .filter(|o| o.opc == Opcode::InsnStart)
        .count();
    assert_eq!(markers, 2);
}

#[test]
fn delay_slot_across_a_page_splits_the_unit() {
    let mut img = vec![0u8; 0x1000];
    let mut tail = Vec::new();
    put32(&mut tail, b_uncond(0x84, true));
    img.splice(0xffc.., tail);
    put16(&mut img, mov_s(0, 9));
    let (_, s) = tr(&img, 0xffc, 0);
    // The unit ends at the branch; the slot restarts on its own.
    assert_eq!(s.size, 4);
    assert_eq!(s.exit, ExitKind::BranchDelaySlot);
}

#[test]
fn slot_unit_clears_the_restart_flag_first() {
    let mut img = Vec::new();
    put16(&mut img, mov_s(0, 9));
    let mut ir = Context::new();
    let s = translate_unit(&mut ir, &img, 0, 0, unit_flags::UF_DELAY_SLOT, 0);
    assert_eq!(s.icount, 1);
    assert_eq!(s.exit, ExitKind::Branch);
    // The in-delay-slot global is cleared before the slot insn runs.
    assert_eq!(ir.ops()[0].opc, Opcode::Mov);
    assert_eq!(ir.ops()[1].opc, Opcode::InsnStart);
}

#[test]
fn invalid_encoding_raises_at_runtime() {
    let mut img = Vec::new();
    put16(&mut img, 0xc000);
    let (ir, s) = tr(&img, 0, 0);
    assert_eq!(s.exit, ExitKind::Exception);
    assert_eq!(s.icount, 1);
    assert!(has_op(&ir, Opcode::Call));
}

#[test]
fn fetch_past_the_image_raises() {
    let img = vec![0u8; 4];
    let (_, s) = tr(&img, 0x100, 0);
    assert_eq!(s.exit, ExitKind::Exception);
}

#[test]
fn long_immediate_extends_the_insn() {
    let mut img = Vec::new();
    put32(&mut img, alu(4, 0x00, 0, 0, 62));
    put32(&mut img, 0x1234_5678);
    let (ir, s) = tr(&img, 0, 1);
    assert_eq!(s.icount, 1);
    assert_eq!(s.size, 8);
    // The limm value shows up as a const temp.
    assert!(ir
        .temps()
        .iter()
        .any(|t| t.kind == dbt_core::temp::TempKind::Const && t.val == 0x1234_5678));
}

#[test]
fn predicated_insn_gets_a_guard() {
    let mut img = Vec::new();
    put32(&mut img, alu_cc_u6(4, 0x00, 2, 7, 0x01));
    let (ir, s) = tr(&img, 0, 1);
    assert_eq!(s.exit, ExitKind::Fallthrough);
    assert!(has_op(&ir, Opcode::BrCond));
    assert!(has_op(&ir, Opcode::SetLabel));
}
