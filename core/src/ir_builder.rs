//! IR emission methods on `Context`.
//!
//! Constant args ride in `TempIdx` slots via `carg`; the opcode
//! definition table says which slots are constants.

use crate::op::Op;
use crate::opcode::Opcode;
use crate::temp::TempIdx;
use crate::types::{Cond, MemOp, Type};

use crate::context::Context;

/// Encode a raw constant arg in a temp slot.
pub fn carg(val: u32) -> TempIdx {
    TempIdx(val)
}

impl Context {
    fn emit_op(&mut self, opc: Opcode, ty: Type, args: &[TempIdx]) {
        self.emit(Op::with_args(opc, ty, 0, args));
    }

    fn emit_vec(&mut self, opc: Opcode, ty: Type, vece: u8, args: &[TempIdx]) {
        debug_assert!(ty.is_vector(), "{} needs a vector type", opc.def().name);
        debug_assert!(vece <= 2 && ty.lanes(vece) >= 2);
        self.emit(Op::with_args(opc, ty, vece, args));
    }

    pub fn gen_nop(&mut self) {
        self.emit_op(Opcode::Nop, Type::I32, &[]);
    }

    pub fn gen_discard(&mut self, ty: Type, t: TempIdx) {
        self.emit_op(Opcode::Discard, ty, &[t]);
    }

    pub fn gen_insn_start(&mut self, pc: u32) {
        self.emit_op(Opcode::InsnStart, Type::I32, &[carg(pc)]);
    }

    pub fn gen_mov(&mut self, ty: Type, d: TempIdx, s: TempIdx) {
        self.emit_op(Opcode::Mov, ty, &[d, s]);
    }

    pub fn gen_movi(&mut self, ty: Type, d: TempIdx, val: u64) {
        let c = self.new_const(ty, val);
        self.gen_mov(ty, d, c);
    }

    fn gen_binary(&mut self, opc: Opcode, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.emit_op(opc, ty, &[d, a, b]);
    }

    fn gen_unary(&mut self, opc: Opcode, ty: Type, d: TempIdx, a: TempIdx) {
        self.emit_op(opc, ty, &[d, a]);
    }

    pub fn gen_add(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::Add, ty, d, a, b);
    }

    pub fn gen_addi(&mut self, ty: Type, d: TempIdx, a: TempIdx, imm: u64) {
        let b = self.new_const(ty, imm);
        self.gen_add(ty, d, a, b);
    }

    pub fn gen_sub(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::Sub, ty, d, a, b);
    }

    pub fn gen_mul(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::Mul, ty, d, a, b);
    }

    pub fn gen_mulsh(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::MulSH, ty, d, a, b);
    }

    pub fn gen_muluh(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::MulUH, ty, d, a, b);
    }

    pub fn gen_neg(&mut self, ty: Type, d: TempIdx, a: TempIdx) {
        self.gen_unary(Opcode::Neg, ty, d, a);
    }

    pub fn gen_and(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::And, ty, d, a, b);
    }

    pub fn gen_andi(&mut self, ty: Type, d: TempIdx, a: TempIdx, imm: u64) {
        let b = self.new_const(ty, imm);
        self.gen_and(ty, d, a, b);
    }

    pub fn gen_or(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::Or, ty, d, a, b);
    }

    pub fn gen_xor(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::Xor, ty, d, a, b);
    }

    pub fn gen_not(&mut self, ty: Type, d: TempIdx, a: TempIdx) {
        self.gen_unary(Opcode::Not, ty, d, a);
    }

    pub fn gen_andc(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::AndC, ty, d, a, b);
    }

    pub fn gen_orc(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::OrC, ty, d, a, b);
    }

    pub fn gen_shl(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::Shl, ty, d, a, b);
    }

    pub fn gen_shli(&mut self, ty: Type, d: TempIdx, a: TempIdx, imm: u32) {
        let b = self.new_const(ty, imm as u64);
        self.gen_shl(ty, d, a, b);
    }

    pub fn gen_shr(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::Shr, ty, d, a, b);
    }

    pub fn gen_shri(&mut self, ty: Type, d: TempIdx, a: TempIdx, imm: u32) {
        let b = self.new_const(ty, imm as u64);
        self.gen_shr(ty, d, a, b);
    }

    pub fn gen_sar(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::Sar, ty, d, a, b);
    }

    pub fn gen_sari(&mut self, ty: Type, d: TempIdx, a: TempIdx, imm: u32) {
        let b = self.new_const(ty, imm as u64);
        self.gen_sar(ty, d, a, b);
    }

    pub fn gen_rotl(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::RotL, ty, d, a, b);
    }

    pub fn gen_rotr(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.gen_binary(Opcode::RotR, ty, d, a, b);
    }

    pub fn gen_setcond(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx, cond: Cond) {
        self.emit_op(Opcode::SetCond, ty, &[d, a, b, carg(cond as u32)]);
    }

    pub fn gen_setcondi(&mut self, ty: Type, d: TempIdx, a: TempIdx, imm: u64, cond: Cond) {
        let b = self.new_const(ty, imm);
        self.gen_setcond(ty, d, a, b, cond);
    }

    /// d = (c1 cond c2) ? v1 : v2
    pub fn gen_movcond(
        &mut self,
        ty: Type,
        d: TempIdx,
        c1: TempIdx,
        c2: TempIdx,
        v1: TempIdx,
        v2: TempIdx,
        cond: Cond,
    ) {
        self.emit_op(Opcode::MovCond, ty, &[d, c1, c2, v1, v2, carg(cond as u32)]);
    }

    pub fn gen_extract(&mut self, ty: Type, d: TempIdx, a: TempIdx, ofs: u32, len: u32) {
        debug_assert!(len > 0 && ofs + len <= ty.size_bits());
        self.emit_op(Opcode::Extract, ty, &[d, a, carg(ofs), carg(len)]);
    }

    pub fn gen_sextract(&mut self, ty: Type, d: TempIdx, a: TempIdx, ofs: u32, len: u32) {
        debug_assert!(len > 0 && ofs + len <= ty.size_bits());
        self.emit_op(Opcode::SExtract, ty, &[d, a, carg(ofs), carg(len)]);
    }

    /// d = a with bits [ofs, ofs+len) replaced by the low bits of b.
    pub fn gen_deposit(
        &mut self,
        ty: Type,
        d: TempIdx,
        a: TempIdx,
        b: TempIdx,
        ofs: u32,
        len: u32,
    ) {
        debug_assert!(len > 0 && ofs + len <= ty.size_bits());
        self.emit_op(Opcode::Deposit, ty, &[d, a, b, carg(ofs), carg(len)]);
    }

    /// d = a != 0 ? count-leading-zeros(a) : fallback
    pub fn gen_clz(&mut self, ty: Type, d: TempIdx, a: TempIdx, fallback: TempIdx) {
        self.gen_binary(Opcode::Clz, ty, d, a, fallback);
    }

    pub fn gen_ctz(&mut self, ty: Type, d: TempIdx, a: TempIdx, fallback: TempIdx) {
        self.gen_binary(Opcode::Ctz, ty, d, a, fallback);
    }

    pub fn gen_ctpop(&mut self, ty: Type, d: TempIdx, a: TempIdx) {
        self.gen_unary(Opcode::CtPop, ty, d, a);
    }

    pub fn gen_qemu_ld(&mut self, ty: Type, d: TempIdx, addr: TempIdx, mop: MemOp) {
        self.emit_op(Opcode::GuestLd, ty, &[d, addr, carg(mop.0 as u32)]);
    }

    pub fn gen_qemu_st(&mut self, ty: Type, val: TempIdx, addr: TempIdx, mop: MemOp) {
        self.emit_op(Opcode::GuestSt, ty, &[val, addr, carg(mop.0 as u32)]);
    }

    pub fn gen_br(&mut self, label: u32) {
        self.emit_op(Opcode::Br, Type::I32, &[carg(label)]);
    }

    pub fn gen_brcond(&mut self, ty: Type, a: TempIdx, b: TempIdx, cond: Cond, label: u32) {
        self.emit_op(Opcode::BrCond, ty, &[a, b, carg(cond as u32), carg(label)]);
    }

    pub fn gen_brcondi(&mut self, ty: Type, a: TempIdx, imm: u64, cond: Cond, label: u32) {
        let b = self.new_const(ty, imm);
        self.gen_brcond(ty, a, b, cond, label);
    }

    pub fn gen_set_label(&mut self, label: u32) {
        self.label_mut(label).present = true;
        self.emit_op(Opcode::SetLabel, Type::I32, &[carg(label)]);
    }

    /// Exit through a chainable slot (0 or 1). The exit value is the
    /// slot index, as the dispatch loop expects.
    pub fn gen_goto_tb(&mut self, slot: u32) {
        debug_assert!(slot <= 1);
        self.emit_op(Opcode::GotoTb, Type::I32, &[carg(slot)]);
    }

    pub fn gen_exit_tb(&mut self, val: u32) {
        self.emit_op(Opcode::ExitTb, Type::I32, &[carg(val)]);
    }

    /// Helper call. `d` receives the helper's return value (pass a
    /// scratch temp when the helper is void).
    pub fn gen_call(&mut self, ty: Type, d: TempIdx, helper_id: u16, args: &[TempIdx]) {
        debug_assert!(args.len() <= 4);
        let mut packed = Vec::with_capacity(args.len() + 3);
        packed.push(d);
        packed.extend_from_slice(args);
        packed.push(carg(helper_id as u32));
        packed.push(carg(args.len() as u32));
        self.emit(Op::with_args(Opcode::Call, ty, 0, &packed));
    }

    // Vector emission. Lane width is `8 << vece` bits; lane count is
    // implied by the vector type.

    /// Splat the low lane-width bits of scalar `s` into every lane.
    pub fn gen_dup_vec(&mut self, ty: Type, vece: u8, d: TempIdx, s: TempIdx) {
        self.emit_vec(Opcode::DupVec, ty, vece, &[d, s]);
    }

    /// d = hi:lo — concatenate two I32 temps into a V64.
    pub fn gen_pack2_vec(&mut self, d: TempIdx, lo: TempIdx, hi: TempIdx) {
        self.emit_vec(Opcode::Pack2Vec, Type::V64, 2, &[d, lo, hi]);
    }

    /// Low 32 bits of a V64 into an I32 temp.
    pub fn gen_extrl_vec(&mut self, d: TempIdx, v: TempIdx) {
        self.emit_vec(Opcode::ExtrlVec, Type::V64, 2, &[d, v]);
    }

    /// High 32 bits of a V64 into an I32 temp.
    pub fn gen_extrh_vec(&mut self, d: TempIdx, v: TempIdx) {
        self.emit_vec(Opcode::ExtrhVec, Type::V64, 2, &[d, v]);
    }

    pub fn gen_add_vec(&mut self, ty: Type, vece: u8, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.emit_vec(Opcode::AddVec, ty, vece, &[d, a, b]);
    }

    pub fn gen_sub_vec(&mut self, ty: Type, vece: u8, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.emit_vec(Opcode::SubVec, ty, vece, &[d, a, b]);
    }

    pub fn gen_neg_vec(&mut self, ty: Type, vece: u8, d: TempIdx, a: TempIdx) {
        self.emit_vec(Opcode::NegVec, ty, vece, &[d, a]);
    }

    pub fn gen_abs_vec(&mut self, ty: Type, vece: u8, d: TempIdx, a: TempIdx) {
        self.emit_vec(Opcode::AbsVec, ty, vece, &[d, a]);
    }

    pub fn gen_smin_vec(&mut self, ty: Type, vece: u8, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.emit_vec(Opcode::SminVec, ty, vece, &[d, a, b]);
    }

    pub fn gen_umin_vec(&mut self, ty: Type, vece: u8, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.emit_vec(Opcode::UminVec, ty, vece, &[d, a, b]);
    }

    pub fn gen_smax_vec(&mut self, ty: Type, vece: u8, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.emit_vec(Opcode::SmaxVec, ty, vece, &[d, a, b]);
    }

    pub fn gen_umax_vec(&mut self, ty: Type, vece: u8, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.emit_vec(Opcode::UmaxVec, ty, vece, &[d, a, b]);
    }

    pub fn gen_and_vec(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.emit_vec(Opcode::AndVec, ty, 0, &[d, a, b]);
    }

    pub fn gen_or_vec(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.emit_vec(Opcode::OrVec, ty, 0, &[d, a, b]);
    }

    pub fn gen_xor_vec(&mut self, ty: Type, d: TempIdx, a: TempIdx, b: TempIdx) {
        self.emit_vec(Opcode::XorVec, ty, 0, &[d, a, b]);
    }

    pub fn gen_not_vec(&mut self, ty: Type, d: TempIdx, a: TempIdx) {
        self.emit_vec(Opcode::NotVec, ty, 0, &[d, a]);
    }
}
