use dbt_backend::bytecode::{encode, pack, unpack, BcOp, X_V32, X_W64};
use dbt_backend::{InterpBackend, LoweringBackend};
use dbt_core::context::Context;
use dbt_core::types::{Cond, MemOp, Type};

const I32: Type = Type::I32;

#[test]
fn pack_unpack_roundtrip() {
    let w = pack(BcOp::MovCond, 0x1234, 1, 0xffff, X_W64 | Cond::Gt as u8);
    let (op, r0, r1, r2, x) = unpack(w);
    assert_eq!(op, BcOp::MovCond);
    assert_eq!((r0, r1, r2), (0x1234, 1, 0xffff));
    assert_eq!(x, X_W64 | Cond::Gt as u8);
}

#[test]
fn consts_get_a_movi_prologue() {
    let mut ir = Context::new();
    let g = ir.new_global(I32, 16, "f");
    let c = ir.new_const_i32(0xabcd);
    let t = ir.new_temp(I32);
    ir.gen_add(I32, t, g, c);
    ir.gen_exit_tb(0);

    let art = encode(&ir);
    assert_eq!(art.nb_vregs, 3);
    assert_eq!(art.globals.len(), 1);
    assert_eq!(art.globals[0].vreg, 0);
    assert_eq!(art.globals[0].offset, 16);

    // The const is materialized before any op.
    let (op, r0, _, _, _) = unpack(art.code[0]);
    assert_eq!(op, BcOp::Movi);
    assert_eq!(r0, 1);
    assert_eq!(art.code[1], 0xabcd);

    let (op, r0, r1, r2, x) = unpack(art.code[2]);
    assert_eq!((op, r0, r1, r2, x), (BcOp::Add, 2, 0, 1, 0));
}

#[test]
fn labels_backpatch_to_word_offsets() {
    let mut ir = Context::new();
    let l = ir.new_label();
    ir.gen_br(l);
    ir.gen_exit_tb(1);
    ir.gen_set_label(l);
    ir.gen_exit_tb(0);

    let art = encode(&ir);
    // [Br, target][Exit, 1][Exit, 0] — the label lands on word 4.
    assert_eq!(unpack(art.code[0]).0, BcOp::Br);
    assert_eq!(art.code[1], 4);
    assert_eq!(unpack(art.code[4]).0, BcOp::Exit);
    assert_eq!(art.code[5], 0);
}

#[test]
fn brcond_carries_the_condition_in_x() {
    let mut ir = Context::new();
    let t = ir.new_temp(I32);
    let l = ir.new_label();
    ir.gen_brcondi(I32, t, 0, Cond::Ne, l);
    ir.gen_set_label(l);
    ir.gen_exit_tb(0);

    let art = encode(&ir);
    // Const prologue for the 0, then the branch.
    let (op, r0, r1, _, x) = unpack(art.code[2]);
    assert_eq!(op, BcOp::BrCond);
    assert_eq!((r0, r1), (0, 1));
    assert_eq!(x, Cond::Ne as u8);
    assert_eq!(art.code[3], 4);
}

#[test]
fn call_packs_args_and_counts() {
    let mut ir = Context::new();
    let d = ir.new_temp(I32);
    let a = ir.new_temp(I32);
    let b = ir.new_temp(I32);
    let c = ir.new_temp(I32);
    ir.gen_call(I32, d, 7, &[a, b, c]);
    ir.gen_exit_tb(0);

    let art = encode(&ir);
    let (op, r0, r1, r2, _) = unpack(art.code[0]);
    assert_eq!(op, BcOp::Call);
    assert_eq!((r0, r1, r2), (0, 7, 3));
    assert_eq!(art.code[1], 1 | 2 << 16 | 3 << 32);
}

#[test]
fn movcond_takes_a_second_word() {
    let mut ir = Context::new();
    let d = ir.new_temp(I32);
    let c1 = ir.new_temp(I32);
    let c2 = ir.new_temp(I32);
    let v1 = ir.new_temp(I32);
    let v2 = ir.new_temp(I32);
    ir.gen_movcond(I32, d, c1, c2, v1, v2, Cond::Ltu);
    ir.gen_exit_tb(0);

    let art = encode(&ir);
    let (op, r0, r1, r2, x) = unpack(art.code[0]);
    assert_eq!(op, BcOp::MovCond);
    assert_eq!((r0, r1, r2), (0, 1, 2));
    assert_eq!(x, Cond::Ltu as u8);
    assert_eq!(art.code[1], 3 | 4 << 16);
}

#[test]
fn guest_access_carries_the_descriptor() {
    let mut ir = Context::new();
    let d = ir.new_temp(I32);
    let addr = ir.new_temp(I32);
    ir.gen_qemu_ld(I32, d, addr, MemOp::sw());
    ir.gen_qemu_st(I32, d, addr, MemOp::ul());
    ir.gen_exit_tb(0);

    let art = encode(&ir);
    let (op, _, _, r2, _) = unpack(art.code[0]);
    assert_eq!(op, BcOp::GuestLd);
    assert_eq!(r2 as u16, MemOp::sw().0);
    let (op, _, _, r2, _) = unpack(art.code[1]);
    assert_eq!(op, BcOp::GuestSt);
    assert_eq!(r2 as u16, MemOp::ul().0);
}

#[test]
fn x_field_encodes_width_and_vector_shape() {
    let mut ir = Context::new();
    let d = ir.new_temp(Type::I64);
    let a = ir.new_temp(Type::I64);
    ir.gen_add(Type::I64, d, a, a);
    let vd = ir.new_temp(Type::V32);
    let va = ir.new_temp(Type::V32);
    ir.gen_add_vec(Type::V32, 1, vd, va, va);
    let wd = ir.new_temp(Type::V64);
    let wa = ir.new_temp(Type::V64);
    ir.gen_sub_vec(Type::V64, 2, wd, wa, wa);
    ir.gen_exit_tb(0);

    let art = encode(&ir);
    assert_eq!(unpack(art.code[0]).4, X_W64);
    assert_eq!(unpack(art.code[1]).4, X_V32 | 1);
    assert_eq!(unpack(art.code[2]).4, 2);
}

#[test]
fn interpreter_supports_multi_lane_vector_shapes() {
    let be = InterpBackend;
    assert!(be.supports_vece(Type::V64, 0));
    assert!(be.supports_vece(Type::V64, 2));
    assert!(be.supports_vece(Type::V32, 1));
    // A single lane is not a vector shape.
    assert!(!be.supports_vece(Type::V32, 2));
    assert!(!be.supports_vece(Type::I32, 0));
}

#[test]
fn insn_start_and_exit_take_payload_words() {
    let mut ir = Context::new();
    ir.gen_insn_start(0x4010);
    ir.gen_exit_tb(1);

    let art = encode(&ir);
    assert_eq!(unpack(art.code[0]).0, BcOp::InsnStart);
    assert_eq!(art.code[1], 0x4010);
    assert_eq!(unpack(art.code[2]).0, BcOp::Exit);
    assert_eq!(art.code[3], 1);
}
