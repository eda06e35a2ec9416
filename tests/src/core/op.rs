use dbt_core::context::Context;
use dbt_core::op::Op;
use dbt_core::opcode::Opcode;
use dbt_core::temp::TempIdx;
use dbt_core::types::{Cond, Type};

#[test]
fn op_arg_slices_binary() {
    // Add: 1 oarg, 2 iargs, 0 cargs.
    let args = [TempIdx(10), TempIdx(20), TempIdx(30)];
    let op = Op::with_args(Opcode::Add, Type::I32, 0, &args);
    assert_eq!(op.oargs(), &[TempIdx(10)]);
    assert_eq!(op.iargs(), &[TempIdx(20), TempIdx(30)]);
    assert!(op.cargs().is_empty());
}

#[test]
fn op_arg_slices_brcond() {
    // BrCond: 0 oargs, 2 iargs, 2 cargs (cond, label).
    let args = [TempIdx(1), TempIdx(2), TempIdx(8), TempIdx(0)];
    let op = Op::with_args(Opcode::BrCond, Type::I32, 0, &args);
    assert!(op.oargs().is_empty());
    assert_eq!(op.iargs(), &[TempIdx(1), TempIdx(2)]);
    assert_eq!(op.cargs(), &[TempIdx(8), TempIdx(0)]);
}

#[test]
fn op_arg_slices_movcond() {
    let mut ir = Context::new();
    let d = ir.new_temp(Type::I32);
    let c1 = ir.new_temp(Type::I32);
    let c2 = ir.new_temp(Type::I32);
    let v1 = ir.new_temp(Type::I32);
    let v2 = ir.new_temp(Type::I32);
    ir.gen_movcond(Type::I32, d, c1, c2, v1, v2, Cond::Ltu);

    let op = &ir.ops()[0];
    assert_eq!(op.opc, Opcode::MovCond);
    assert_eq!(op.oargs(), &[d]);
    assert_eq!(op.iargs(), &[c1, c2, v1, v2]);
    assert_eq!(op.cargs(), &[TempIdx(Cond::Ltu as u32)]);
}

#[test]
fn call_arg_counts_come_from_the_op() {
    let mut ir = Context::new();
    let d = ir.new_temp(Type::I32);
    let a = ir.new_temp(Type::I32);
    let b = ir.new_temp(Type::I32);
    let c = ir.new_temp(Type::I32);
    ir.gen_call(Type::I32, d, 7, &[a, b, c]);

    let op = &ir.ops()[0];
    assert_eq!(op.opc, Opcode::Call);
    assert_eq!(op.nargs, 6);
    assert_eq!(op.oargs(), &[d]);
    assert_eq!(op.iargs(), &[a, b, c]);
    // helper id, input count
    assert_eq!(op.cargs(), &[TempIdx(7), TempIdx(3)]);
}

#[test]
fn call_with_no_args() {
    let mut ir = Context::new();
    let d = ir.new_temp(Type::I32);
    ir.gen_call(Type::I32, d, 9, &[]);

    let op = &ir.ops()[0];
    assert_eq!(op.oargs(), &[d]);
    assert!(op.iargs().is_empty());
    assert_eq!(op.cargs(), &[TempIdx(9), TempIdx(0)]);
}

#[test]
fn opcode_def_names() {
    assert_eq!(Opcode::Add.def().name, "add");
    assert_eq!(Opcode::GuestLd.def().name, "qemu_ld");
    assert_eq!(Opcode::SmaxVec.def().name, "smax_vec");
    assert!(Opcode::AddVec.is_vector());
    assert!(!Opcode::Add.is_vector());
}

#[test]
fn int_polymorphic_classification() {
    assert!(Opcode::Add.is_int_polymorphic());
    assert!(Opcode::SetCond.is_int_polymorphic());
    assert!(!Opcode::Br.is_int_polymorphic());
    assert!(!Opcode::Call.is_int_polymorphic());
    assert!(!Opcode::AddVec.is_int_polymorphic());
}
