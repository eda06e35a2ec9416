//! Semantic emitters: one `gen_*` per decoded operation class.

use dbt_core::context::Context;
use dbt_core::temp::TempIdx;
use dbt_core::types::{Cond, MemOp, Type};
use dbt_core::unit::ExitKind;

use crate::DisasJumpType;

use super::cpu::*;
use super::decode::{cc, ArcOp, BrCmpCond, Operand};
use super::helper::Helper;
use super::ArcDisasContext;

const I32: Type = Type::I32;

/// Exhaustive dispatch over the decoded operation.
pub(crate) fn dispatch(ctx: &mut ArcDisasContext, ir: &mut Context) {
    match ctx.insn.op {
        ArcOp::Nop => {}

        ArcOp::B => gen_b(ctx, ir, false),
        ArcOp::Bl => gen_b(ctx, ir, true),
        ArcOp::BrCmp(cond) => gen_brcmp(ctx, ir, cond),
        ArcOp::J { link } => gen_j(ctx, ir, link),

        ArcOp::Ld { zz, x, aa } => gen_ld(ctx, ir, zz, x, aa),
        ArcOp::St { zz, aa } => gen_st(ctx, ir, zz, aa),

        ArcOp::Add => alu3(ctx, ir, FlagMode::Add, |ir, d, a, b| {
            ir.gen_add(I32, d, a, b)
        }),
        ArcOp::Adc => gen_adc(ctx, ir, false),
        ArcOp::Sub => alu3(ctx, ir, FlagMode::Sub, |ir, d, a, b| {
            ir.gen_sub(I32, d, a, b)
        }),
        ArcOp::Sbc => gen_adc(ctx, ir, true),
        ArcOp::Rsub => alu3(ctx, ir, FlagMode::RSub, |ir, d, a, b| {
            ir.gen_sub(I32, d, b, a)
        }),
        ArcOp::Cmp => gen_cmp(ctx, ir),
        ArcOp::Tst => gen_tst(ctx, ir, false),
        ArcOp::Btst => gen_tst(ctx, ir, true),

        ArcOp::And => alu3(ctx, ir, FlagMode::Logic, |ir, d, a, b| {
            ir.gen_and(I32, d, a, b)
        }),
        ArcOp::Or => alu3(ctx, ir, FlagMode::Logic, |ir, d, a, b| {
            ir.gen_or(I32, d, a, b)
        }),
        ArcOp::Bic => alu3(ctx, ir, FlagMode::Logic, |ir, d, a, b| {
            ir.gen_andc(I32, d, a, b)
        }),
        ArcOp::Xor => alu3(ctx, ir, FlagMode::Logic, |ir, d, a, b| {
            ir.gen_xor(I32, d, a, b)
        }),
        ArcOp::Max => alu3(ctx, ir, FlagMode::Logic, |ir, d, a, b| {
            ir.gen_movcond(I32, d, a, b, a, b, Cond::Ge)
        }),
        ArcOp::Min => alu3(ctx, ir, FlagMode::Logic, |ir, d, a, b| {
            ir.gen_movcond(I32, d, a, b, a, b, Cond::Le)
        }),
        ArcOp::Mov => alu2(ctx, ir, true, |ir, d, s| ir.gen_mov(I32, d, s)),

        ArcOp::Bset => gen_bitop(ctx, ir, BitOp::Set),
        ArcOp::Bclr => gen_bitop(ctx, ir, BitOp::Clr),
        ArcOp::Bxor => gen_bitop(ctx, ir, BitOp::Xor),
        ArcOp::Bmsk => gen_bitop(ctx, ir, BitOp::Msk),

        ArcOp::Add1 => gen_addsub_scaled(ctx, ir, false, 1),
        ArcOp::Add2 => gen_addsub_scaled(ctx, ir, false, 2),
        ArcOp::Add3 => gen_addsub_scaled(ctx, ir, false, 3),
        ArcOp::Sub1 => gen_addsub_scaled(ctx, ir, true, 1),
        ArcOp::Sub2 => gen_addsub_scaled(ctx, ir, true, 2),
        ArcOp::Sub3 => gen_addsub_scaled(ctx, ir, true, 3),

        ArcOp::Mpy | ArcOp::Mpyu => alu3(ctx, ir, FlagMode::Logic, |ir, d, a, b| {
            ir.gen_mul(I32, d, a, b)
        }),
        ArcOp::Mpyh => alu3(ctx, ir, FlagMode::Logic, |ir, d, a, b| {
            ir.gen_mulsh(I32, d, a, b)
        }),
        ArcOp::Mpyhu => alu3(ctx, ir, FlagMode::Logic, |ir, d, a, b| {
            ir.gen_muluh(I32, d, a, b)
        }),

        ArcOp::Asl => gen_shift(ctx, ir, |ir, d, a, b| ir.gen_shl(I32, d, a, b)),
        ArcOp::Lsr => gen_shift(ctx, ir, |ir, d, a, b| ir.gen_shr(I32, d, a, b)),
        ArcOp::Asr => gen_shift(ctx, ir, |ir, d, a, b| ir.gen_sar(I32, d, a, b)),
        ArcOp::Ror => gen_shift(ctx, ir, |ir, d, a, b| ir.gen_rotr(I32, d, a, b)),

        ArcOp::Sexb => alu2(ctx, ir, true, |ir, d, s| ir.gen_sextract(I32, d, s, 0, 8)),
        ArcOp::Sexw => alu2(ctx, ir, true, |ir, d, s| ir.gen_sextract(I32, d, s, 0, 16)),
        ArcOp::Extb => alu2(ctx, ir, true, |ir, d, s| ir.gen_extract(I32, d, s, 0, 8)),
        ArcOp::Extw => alu2(ctx, ir, true, |ir, d, s| ir.gen_extract(I32, d, s, 0, 16)),
        ArcOp::Abs => gen_abs(ctx, ir),
        ArcOp::Not => alu2(ctx, ir, true, |ir, d, s| ir.gen_not(I32, d, s)),

        ArcOp::Div => gen_div(ctx, ir, Helper::Div),
        ArcOp::Divu => gen_div(ctx, ir, Helper::Divu),
        ArcOp::Rem => gen_div(ctx, ir, Helper::Rem),
        ArcOp::Remu => gen_div(ctx, ir, Helper::Remu),

        ArcOp::Flag => gen_flag(ctx, ir),
        ArcOp::Lr => gen_lr(ctx, ir),
        ArcOp::Sr => gen_sr(ctx, ir),
        ArcOp::Swi => {
            let eret = ctx.cpc;
            ctx.gen_excp(ir, EXCP_SWI, 0, 0, eret);
        }
        ArcOp::Trap => gen_trap(ctx, ir),
        ArcOp::Sleep => gen_sleep(ctx, ir),
        ArcOp::Brk => gen_brk(ctx, ir),

        ArcOp::Vadd2 => gen_vpair(ctx, ir, false, 2),
        ArcOp::Vsub2 => gen_vpair(ctx, ir, true, 2),
        ArcOp::Vadd4h => gen_vpair(ctx, ir, false, 1),
        ArcOp::Vsub4h => gen_vpair(ctx, ir, true, 1),
        ArcOp::Vadd2h => gen_vhalf(ctx, ir, false),
        ArcOp::Vsub2h => gen_vhalf(ctx, ir, true),
    }
}

// ---- operand access ----

/// Read an operand into a temp-or-const.
fn src(ctx: &mut ArcDisasContext, ir: &mut Context, i: usize) -> TempIdx {
    match ctx.insn.operands[i] {
        Operand::Reg(63) => ir.new_const_i32(ctx.pcl()),
        Operand::Reg(r) => ctx.r[r as usize],
        Operand::Limm => ir.new_const_i32(ctx.limm),
        Operand::Imm(v) => ir.new_const_i32(v as u32),
        Operand::None => panic!("missing operand {i} for {:?}", ctx.insn.op),
    }
}

/// Commit a result to a destination operand. Writes to r62/r63 (and
/// long-immediate destinations) are architectural no-ops.
fn write_dst(ctx: &mut ArcDisasContext, ir: &mut Context, i: usize, val: TempIdx) {
    match ctx.insn.operands[i] {
        Operand::Reg(r) if (r as usize) < REG_LIMM => {
            ir.gen_mov(I32, ctx.r[r as usize], val);
        }
        _ => {}
    }
}

// ---- condition evaluation ----

/// Evaluate a condition-code field against the flag globals into a
/// 0/1 temp. Flag globals are invariantly 0 or 1.
pub(crate) fn gen_cc_test(ctx: &mut ArcDisasContext, ir: &mut Context, cond: u8) -> TempIdx {
    if cond == cc::AL {
        return ir.new_const_i32(1);
    }
    let t = ir.new_temp(I32);
    match cond {
        cc::EQ => ir.gen_mov(I32, t, ctx.g_zf),
        cc::NE => ir.gen_setcondi(I32, t, ctx.g_zf, 0, Cond::Eq),
        cc::PL => ir.gen_setcondi(I32, t, ctx.g_nf, 0, Cond::Eq),
        cc::MI => ir.gen_mov(I32, t, ctx.g_nf),
        cc::CS => ir.gen_mov(I32, t, ctx.g_cf),
        cc::CC => ir.gen_setcondi(I32, t, ctx.g_cf, 0, Cond::Eq),
        cc::VS => ir.gen_mov(I32, t, ctx.g_vf),
        cc::VC => ir.gen_setcondi(I32, t, ctx.g_vf, 0, Cond::Eq),
        cc::GT => {
            let ge = ir.new_temp(I32);
            ir.gen_setcond(I32, ge, ctx.g_nf, ctx.g_vf, Cond::Eq);
            let nz = ir.new_temp(I32);
            ir.gen_setcondi(I32, nz, ctx.g_zf, 0, Cond::Eq);
            ir.gen_and(I32, t, ge, nz);
        }
        cc::GE => ir.gen_setcond(I32, t, ctx.g_nf, ctx.g_vf, Cond::Eq),
        cc::LT => ir.gen_setcond(I32, t, ctx.g_nf, ctx.g_vf, Cond::Ne),
        cc::LE => {
            let lt = ir.new_temp(I32);
            ir.gen_setcond(I32, lt, ctx.g_nf, ctx.g_vf, Cond::Ne);
            ir.gen_or(I32, t, lt, ctx.g_zf);
        }
        cc::HI => {
            let nc = ir.new_temp(I32);
            ir.gen_setcondi(I32, nc, ctx.g_cf, 0, Cond::Eq);
            let nz = ir.new_temp(I32);
            ir.gen_setcondi(I32, nz, ctx.g_zf, 0, Cond::Eq);
            ir.gen_and(I32, t, nc, nz);
        }
        cc::LS => ir.gen_or(I32, t, ctx.g_cf, ctx.g_zf),
        cc::PNZ => {
            let nn = ir.new_temp(I32);
            ir.gen_setcondi(I32, nn, ctx.g_nf, 0, Cond::Eq);
            let nz = ir.new_temp(I32);
            ir.gen_setcondi(I32, nz, ctx.g_zf, 0, Cond::Eq);
            ir.gen_and(I32, t, nn, nz);
        }
        _ => panic!("condition field {cond:#x} escaped decode"),
    }
    t
}

// ---- flag recipes ----

#[derive(Clone, Copy, PartialEq, Eq)]
enum FlagMode {
    /// Z and N from the result only.
    Logic,
    /// Z/N plus carry-out and signed overflow of a + b.
    Add,
    /// Z/N plus borrow and signed overflow of a - b.
    Sub,
    /// Z/N plus borrow and signed overflow of b - a.
    RSub,
}

fn set_zn(ctx: &mut ArcDisasContext, ir: &mut Context, res: TempIdx) {
    ir.gen_setcondi(I32, ctx.g_zf, res, 0, Cond::Eq);
    ir.gen_shri(I32, ctx.g_nf, res, 31);
}

fn set_flags(
    ctx: &mut ArcDisasContext,
    ir: &mut Context,
    mode: FlagMode,
    res: TempIdx,
    a: TempIdx,
    b: TempIdx,
) {
    let (a, b) = if mode == FlagMode::RSub { (b, a) } else { (a, b) };
    set_zn(ctx, ir, res);
    match mode {
        FlagMode::Logic => {}
        FlagMode::Add => {
            ir.gen_setcond(I32, ctx.g_cf, res, a, Cond::Ltu);
            let same = ir.new_temp(I32);
            ir.gen_xor(I32, same, a, b);
            let diff = ir.new_temp(I32);
            ir.gen_xor(I32, diff, a, res);
            let ovf = ir.new_temp(I32);
            ir.gen_andc(I32, ovf, diff, same);
            ir.gen_shri(I32, ctx.g_vf, ovf, 31);
        }
        FlagMode::Sub | FlagMode::RSub => {
            ir.gen_setcond(I32, ctx.g_cf, a, b, Cond::Ltu);
            let inp = ir.new_temp(I32);
            ir.gen_xor(I32, inp, a, b);
            let out = ir.new_temp(I32);
            ir.gen_xor(I32, out, a, res);
            let ovf = ir.new_temp(I32);
            ir.gen_and(I32, ovf, inp, out);
            ir.gen_shri(I32, ctx.g_vf, ovf, 31);
        }
    }
}

// ---- generic ALU skeletons ----

fn alu3(
    ctx: &mut ArcDisasContext,
    ir: &mut Context,
    fmode: FlagMode,
    emit: impl FnOnce(&mut Context, TempIdx, TempIdx, TempIdx),
) {
    ctx.guard(ir);
    let a = src(ctx, ir, 1);
    let b = src(ctx, ir, 2);
    let res = ir.new_temp(I32);
    emit(ir, res, a, b);
    if ctx.insn.f {
        set_flags(ctx, ir, fmode, res, a, b);
    }
    write_dst(ctx, ir, 0, res);
    ctx.unguard(ir);
}

fn alu2(
    ctx: &mut ArcDisasContext,
    ir: &mut Context,
    zn_flags: bool,
    emit: impl FnOnce(&mut Context, TempIdx, TempIdx),
) {
    ctx.guard(ir);
    let s = src(ctx, ir, 1);
    let res = ir.new_temp(I32);
    emit(ir, res, s);
    if zn_flags && ctx.insn.f {
        set_zn(ctx, ir, res);
    }
    write_dst(ctx, ir, 0, res);
    ctx.unguard(ir);
}

/// ADC / SBC: add/subtract with the carry flag folded in.
fn gen_adc(ctx: &mut ArcDisasContext, ir: &mut Context, sub: bool) {
    ctx.guard(ir);
    let a = src(ctx, ir, 1);
    let b = src(ctx, ir, 2);
    let partial = ir.new_temp(I32);
    let res = ir.new_temp(I32);
    if sub {
        ir.gen_sub(I32, partial, a, b);
        ir.gen_sub(I32, res, partial, ctx.g_cf);
    } else {
        ir.gen_add(I32, partial, a, b);
        ir.gen_add(I32, res, partial, ctx.g_cf);
    }
    if ctx.insn.f {
        set_zn(ctx, ir, res);
        // Carry out considering the carry in: with cin=1 the boundary
        // case shifts from `<` to `<=`.
        let strict = ir.new_temp(I32);
        let lax = ir.new_temp(I32);
        if sub {
            ir.gen_setcond(I32, strict, a, b, Cond::Ltu);
            ir.gen_setcond(I32, lax, a, b, Cond::Leu);
        } else {
            ir.gen_setcond(I32, strict, res, a, Cond::Ltu);
            ir.gen_setcond(I32, lax, res, a, Cond::Leu);
        }
        let zero = ir.new_const_i32(0);
        let carry = ir.new_temp(I32);
        ir.gen_movcond(I32, carry, ctx.g_cf, zero, strict, lax, Cond::Eq);
        let inp = ir.new_temp(I32);
        ir.gen_xor(I32, inp, a, b);
        let out = ir.new_temp(I32);
        ir.gen_xor(I32, out, a, res);
        let ovf = ir.new_temp(I32);
        if sub {
            ir.gen_and(I32, ovf, inp, out);
        } else {
            ir.gen_andc(I32, ovf, out, inp);
        }
        ir.gen_shri(I32, ctx.g_vf, ovf, 31);
        ir.gen_mov(I32, ctx.g_cf, carry);
    }
    write_dst(ctx, ir, 0, res);
    ctx.unguard(ir);
}

/// CMP: subtract for flags only.
fn gen_cmp(ctx: &mut ArcDisasContext, ir: &mut Context) {
    ctx.guard(ir);
    let a = src(ctx, ir, 0);
    let b = src(ctx, ir, 1);
    let res = ir.new_temp(I32);
    ir.gen_sub(I32, res, a, b);
    set_flags(ctx, ir, FlagMode::Sub, res, a, b);
    ctx.unguard(ir);
}

/// TST (a & b) and BTST (a & 1<<b): flags only.
fn gen_tst(ctx: &mut ArcDisasContext, ir: &mut Context, single_bit: bool) {
    ctx.guard(ir);
    let a = src(ctx, ir, 0);
    let b = src(ctx, ir, 1);
    let res = ir.new_temp(I32);
    if single_bit {
        let sh = ir.new_temp(I32);
        ir.gen_andi(I32, sh, b, 31);
        let one = ir.new_const_i32(1);
        let bit = ir.new_temp(I32);
        ir.gen_shl(I32, bit, one, sh);
        ir.gen_and(I32, res, a, bit);
    } else {
        ir.gen_and(I32, res, a, b);
    }
    set_zn(ctx, ir, res);
    ctx.unguard(ir);
}

enum BitOp {
    Set,
    Clr,
    Xor,
    Msk,
}

/// BSET/BCLR/BXOR (single bit) and BMSK (mask up to bit).
fn gen_bitop(ctx: &mut ArcDisasContext, ir: &mut Context, op: BitOp) {
    ctx.guard(ir);
    let a = src(ctx, ir, 1);
    let b = src(ctx, ir, 2);
    let sh = ir.new_temp(I32);
    ir.gen_andi(I32, sh, b, 31);
    let res = ir.new_temp(I32);
    match op {
        BitOp::Msk => {
            // mask = (2 << n) - 1; n = 31 wraps the shift to zero and
            // the decrement yields all-ones, as architected.
            let two = ir.new_const_i32(2);
            let m = ir.new_temp(I32);
            ir.gen_shl(I32, m, two, sh);
            let mask = ir.new_temp(I32);
            ir.gen_addi(I32, mask, m, 0xffff_ffff);
            ir.gen_and(I32, res, a, mask);
        }
        _ => {
            let one = ir.new_const_i32(1);
            let bit = ir.new_temp(I32);
            ir.gen_shl(I32, bit, one, sh);
            match op {
                BitOp::Set => ir.gen_or(I32, res, a, bit),
                BitOp::Clr => ir.gen_andc(I32, res, a, bit),
                BitOp::Xor => ir.gen_xor(I32, res, a, bit),
                BitOp::Msk => unreachable!(),
            }
        }
    }
    if ctx.insn.f {
        set_zn(ctx, ir, res);
    }
    write_dst(ctx, ir, 0, res);
    ctx.unguard(ir);
}

/// ADD1/2/3, SUB1/2/3: second operand pre-shifted.
fn gen_addsub_scaled(ctx: &mut ArcDisasContext, ir: &mut Context, sub: bool, shift: u32) {
    ctx.guard(ir);
    let a = src(ctx, ir, 1);
    let b = src(ctx, ir, 2);
    let shifted = ir.new_temp(I32);
    ir.gen_shli(I32, shifted, b, shift);
    let res = ir.new_temp(I32);
    if sub {
        ir.gen_sub(I32, res, a, shifted);
    } else {
        ir.gen_add(I32, res, a, shifted);
    }
    if ctx.insn.f {
        let mode = if sub { FlagMode::Sub } else { FlagMode::Add };
        set_flags(ctx, ir, mode, res, a, shifted);
    }
    write_dst(ctx, ir, 0, res);
    ctx.unguard(ir);
}

/// Shift/rotate: the amount is taken modulo 32.
fn gen_shift(
    ctx: &mut ArcDisasContext,
    ir: &mut Context,
    emit: impl FnOnce(&mut Context, TempIdx, TempIdx, TempIdx),
) {
    ctx.guard(ir);
    let a = src(ctx, ir, 1);
    let b = src(ctx, ir, 2);
    let amount = ir.new_temp(I32);
    ir.gen_andi(I32, amount, b, 31);
    let res = ir.new_temp(I32);
    emit(ir, res, a, amount);
    if ctx.insn.f {
        set_zn(ctx, ir, res);
    }
    write_dst(ctx, ir, 0, res);
    ctx.unguard(ir);
}

fn gen_abs(ctx: &mut ArcDisasContext, ir: &mut Context) {
    ctx.guard(ir);
    let s = src(ctx, ir, 1);
    let neg = ir.new_temp(I32);
    ir.gen_neg(I32, neg, s);
    let zero = ir.new_const_i32(0);
    let res = ir.new_temp(I32);
    ir.gen_movcond(I32, res, s, zero, neg, s, Cond::Lt);
    if ctx.insn.f {
        set_zn(ctx, ir, res);
    }
    write_dst(ctx, ir, 0, res);
    ctx.unguard(ir);
}

// ---- branches ----

/// Shared branch tail. `take` is None for an unconditional branch,
/// otherwise a 0/1 temp. `target` must stay valid across the delay
/// slot (a const or a fresh temp). `use_goto_tb` marks exits whose
/// destination is known at translation time as chaining candidates.
fn gen_branch(
    ctx: &mut ArcDisasContext,
    ir: &mut Context,
    target: TempIdx,
    take: Option<TempIdx>,
    link: bool,
    use_goto_tb: bool,
) {
    if ctx.in_delay_slot {
        let eret = ctx.cpc;
        ctx.gen_excp(ir, EXCP_INST_ERROR, CAUSE_ILLEGAL_SEQUENCE, 0, eret);
        return;
    }

    if ctx.insn.d {
        if link {
            let ret = ctx.npc.wrapping_add(ctx.peek_total_len(ctx.npc));
            match take {
                // BLINK is written only on the taken path.
                None => ir.gen_movi(I32, ctx.r[REG_BLINK], ret as u64),
                Some(t) => {
                    let retc = ir.new_const_i32(ret);
                    let zero = ir.new_const_i32(0);
                    let blink = ctx.r[REG_BLINK];
                    ir.gen_movcond(I32, blink, t, zero, blink, retc, Cond::Eq);
                }
            }
        }
        let take = match take {
            Some(t) => t,
            None => ir.new_const_i32(1),
        };
        ctx.execute_delay_slot(ir, target, take);
        if ctx.base.is_jmp != DisasJumpType::Next {
            // Slot split onto its own unit, or it raised.
            return;
        }
        ctx.gen_delay_commit(ir);
        ir.gen_movi(I32, ctx.g_pc, ctx.npc as u64);
        ir.gen_exit_tb(0);
        ctx.base.is_jmp = DisasJumpType::NoReturn;
        ctx.base.exit = ExitKind::BranchDelaySlot;
        return;
    }

    match take {
        None => {
            if link {
                ir.gen_movi(I32, ctx.r[REG_BLINK], ctx.npc as u64);
            }
            ir.gen_mov(I32, ctx.g_pc, target);
            if use_goto_tb {
                ir.gen_goto_tb(0);
            }
            ir.gen_exit_tb(0);
        }
        Some(t) => {
            let l = ir.new_label();
            ir.gen_brcondi(I32, t, 1, Cond::Ne, l);
            if link {
                ir.gen_movi(I32, ctx.r[REG_BLINK], ctx.npc as u64);
            }
            ir.gen_mov(I32, ctx.g_pc, target);
            if use_goto_tb {
                ir.gen_goto_tb(0);
            }
            ir.gen_exit_tb(0);
            ir.gen_set_label(l);
            ir.gen_movi(I32, ctx.g_pc, ctx.npc as u64);
            if use_goto_tb {
                ir.gen_goto_tb(1);
            }
            ir.gen_exit_tb(1);
        }
    }
    ctx.base.is_jmp = DisasJumpType::NoReturn;
    ctx.base.exit = ExitKind::Branch;
}

/// B / BL: PCL-relative target known at translation time.
fn gen_b(ctx: &mut ArcDisasContext, ir: &mut Context, link: bool) {
    let disp = match ctx.insn.operands[0] {
        Operand::Imm(d) => d,
        _ => panic!("branch without displacement"),
    };
    let target = ir.new_const_i32(ctx.pcl().wrapping_add(disp as u32));
    let take = if ctx.insn.cc == cc::AL {
        None
    } else {
        Some(gen_cc_test(ctx, ir, ctx.insn.cc))
    };
    gen_branch(ctx, ir, target, take, link, true);
}

/// BRcc: compare two operands, branch on the outcome.
fn gen_brcmp(ctx: &mut ArcDisasContext, ir: &mut Context, cond: BrCmpCond) {
    let a = src(ctx, ir, 0);
    let b = src(ctx, ir, 1);
    let disp = match ctx.insn.operands[2] {
        Operand::Imm(d) => d,
        _ => panic!("compare-branch without displacement"),
    };
    let cond = match cond {
        BrCmpCond::Eq => Cond::Eq,
        BrCmpCond::Ne => Cond::Ne,
        BrCmpCond::Lt => Cond::Lt,
        BrCmpCond::Ge => Cond::Ge,
        BrCmpCond::Lo => Cond::Ltu,
        BrCmpCond::Hs => Cond::Geu,
    };
    let take = ir.new_temp(I32);
    ir.gen_setcond(I32, take, a, b, cond);
    let target = ir.new_const_i32(ctx.pcl().wrapping_add(disp as u32));
    gen_branch(ctx, ir, target, Some(take), false, true);
}

/// J / JL: register-indirect jump. The target is copied out first so
/// a link write (or the delay slot) cannot clobber it.
fn gen_j(ctx: &mut ArcDisasContext, ir: &mut Context, link: bool) {
    let s = src(ctx, ir, 0);
    let target = ir.new_temp_tb(I32);
    ir.gen_mov(I32, target, s);
    let take = if ctx.insn.cc == cc::AL {
        None
    } else {
        Some(gen_cc_test(ctx, ir, ctx.insn.cc))
    };
    // Register-indirect: the destination is not known here, so the
    // exits are not chaining candidates.
    gen_branch(ctx, ir, target, take, link, false);
}

// ---- memory ----

fn mem_op(zz: u8, sign_extend: bool) -> MemOp {
    match (zz, sign_extend) {
        (0, _) => MemOp::ul(),
        (1, false) => MemOp::ub(),
        (1, true) => MemOp::sb(),
        (2, false) => MemOp::uw(),
        (2, true) => MemOp::sw(),
        _ => panic!("reserved size class {zz} escaped decode"),
    }
}

/// Effective address plus optional base-register writeback.
///
/// Address modes: 0 = base+offset, 1 = pre-increment writeback,
/// 2 = post-increment writeback, 3 = offset scaled by the size class.
fn gen_addr(
    ctx: &mut ArcDisasContext,
    ir: &mut Context,
    zz: u8,
    aa: u8,
    base_opnd: usize,
    off_opnd: usize,
) -> TempIdx {
    let base = src(ctx, ir, base_opnd);
    let off = src(ctx, ir, off_opnd);
    let addr = ir.new_temp(I32);
    match aa {
        0 | 1 => ir.gen_add(I32, addr, base, off),
        2 => ir.gen_mov(I32, addr, base),
        _ => {
            let scale = match zz {
                0 => 2,
                2 => 1,
                _ => 0,
            };
            let scaled = ir.new_temp(I32);
            ir.gen_shli(I32, scaled, off, scale);
            ir.gen_add(I32, addr, base, scaled);
        }
    }
    addr
}

fn gen_writeback(
    ctx: &mut ArcDisasContext,
    ir: &mut Context,
    aa: u8,
    base_opnd: usize,
    off_opnd: usize,
    addr: TempIdx,
) {
    let Operand::Reg(r) = ctx.insn.operands[base_opnd] else {
        return;
    };
    if r as usize >= REG_LIMM {
        return;
    }
    match aa {
        1 => ir.gen_mov(I32, ctx.r[r as usize], addr),
        2 => {
            let off = src(ctx, ir, off_opnd);
            let nb = ir.new_temp(I32);
            ir.gen_add(I32, nb, ctx.r[r as usize], off);
            ir.gen_mov(I32, ctx.r[r as usize], nb);
        }
        _ => {}
    }
}

fn gen_ld(ctx: &mut ArcDisasContext, ir: &mut Context, zz: u8, x: bool, aa: u8) {
    ctx.guard(ir);
    let addr = gen_addr(ctx, ir, zz, aa, 1, 2);
    let val = ir.new_temp(I32);
    ir.gen_qemu_ld(I32, val, addr, mem_op(zz, x));
    gen_writeback(ctx, ir, aa, 1, 2, addr);
    write_dst(ctx, ir, 0, val);
    ctx.unguard(ir);
}

fn gen_st(ctx: &mut ArcDisasContext, ir: &mut Context, zz: u8, aa: u8) {
    ctx.guard(ir);
    let val = src(ctx, ir, 0);
    let addr = gen_addr(ctx, ir, zz, aa, 1, 2);
    ir.gen_qemu_st(I32, val, addr, mem_op(zz, false));
    gen_writeback(ctx, ir, aa, 1, 2, addr);
    ctx.unguard(ir);
}

// ---- helper-backed operations ----

/// Seed the fault context so a Stop raised inside the helper unwinds
/// with architected pc/eret/erbta.
fn gen_fault_context(ctx: &mut ArcDisasContext, ir: &mut Context) {
    ir.gen_movi(I32, ctx.g_pc, ctx.cpc as u64);
    ir.gen_movi(I32, ctx.g_eret, ctx.cpc as u64);
    ir.gen_movi(I32, ctx.g_erbta, ctx.npc as u64);
}

fn gen_div(ctx: &mut ArcDisasContext, ir: &mut Context, h: Helper) {
    ctx.guard(ir);
    gen_fault_context(ctx, ir);
    let a = src(ctx, ir, 1);
    let b = src(ctx, ir, 2);
    let res = ir.new_temp(I32);
    ir.gen_call(I32, res, h as u16, &[a, b]);
    if ctx.insn.f {
        set_zn(ctx, ir, res);
    }
    write_dst(ctx, ir, 0, res);
    ctx.unguard(ir);
}

/// FLAG: load the status register from an operand. Setting the H bit
/// halts, so this goes through a helper that can stop the loop.
fn gen_flag(ctx: &mut ArcDisasContext, ir: &mut Context) {
    ctx.guard(ir);
    ir.gen_movi(I32, ctx.g_pc, ctx.npc as u64);
    let v = src(ctx, ir, 0);
    let scratch = ir.new_temp(I32);
    ir.gen_call(I32, scratch, Helper::Flag as u16, &[v]);
    ctx.unguard(ir);
}

fn gen_lr(ctx: &mut ArcDisasContext, ir: &mut Context) {
    ctx.guard(ir);
    gen_fault_context(ctx, ir);
    let addr = src(ctx, ir, 1);
    let val = ir.new_temp(I32);
    ir.gen_call(I32, val, Helper::AuxGet as u16, &[addr]);
    write_dst(ctx, ir, 0, val);
    ctx.unguard(ir);
}

fn gen_sr(ctx: &mut ArcDisasContext, ir: &mut Context) {
    ctx.guard(ir);
    gen_fault_context(ctx, ir);
    let val = src(ctx, ir, 0);
    let addr = src(ctx, ir, 1);
    let scratch = ir.new_temp(I32);
    ir.gen_call(I32, scratch, Helper::AuxSet as u16, &[addr, val]);
    ctx.unguard(ir);
}

fn gen_trap(ctx: &mut ArcDisasContext, ir: &mut Context) {
    let param = match ctx.insn.operands[0] {
        Operand::Imm(v) => v as u32,
        _ => 0,
    };
    // Traps return past the trapping instruction.
    let eret = ctx.npc;
    ctx.gen_excp(ir, EXCP_TRAP, 0, param, eret);
}

fn gen_sleep(ctx: &mut ArcDisasContext, ir: &mut Context) {
    ir.gen_movi(I32, ctx.g_pc, ctx.npc as u64);
    let scratch = ir.new_temp(I32);
    ir.gen_call(I32, scratch, Helper::Sleep as u16, &[]);
    ir.gen_exit_tb(0);
    ctx.base.is_jmp = DisasJumpType::NoReturn;
    ctx.base.exit = ExitKind::Exception;
}

fn gen_brk(ctx: &mut ArcDisasContext, ir: &mut Context) {
    ir.gen_movi(I32, ctx.g_pc, ctx.cpc as u64);
    let scratch = ir.new_temp(I32);
    ir.gen_call(I32, scratch, Helper::Brk as u16, &[]);
    ir.gen_exit_tb(0);
    ctx.base.is_jmp = DisasJumpType::NoReturn;
    ctx.base.exit = ExitKind::DebugStop;
}

// ---- packed SIMD ----

/// Source of a pair-register vector operand. A long immediate (or
/// plain immediate) is splat across the lanes.
fn pair_src(ctx: &mut ArcDisasContext, ir: &mut Context, i: usize, vece: u8) -> TempIdx {
    let v = ir.new_temp(Type::V64);
    match ctx.insn.operands[i] {
        Operand::Reg(r) if (r as usize) < REG_LIMM - 1 => {
            ir.gen_pack2_vec(v, ctx.r[r as usize], ctx.r[r as usize + 1]);
        }
        _ => {
            let s = src(ctx, ir, i);
            ir.gen_dup_vec(Type::V64, vece.max(2), v, s);
        }
    }
    v
}

/// VADD2/VSUB2 (2×32 lanes) and VADD4H/VSUB4H (4×16 lanes) over
/// register pairs.
fn gen_vpair(ctx: &mut ArcDisasContext, ir: &mut Context, sub: bool, vece: u8) {
    ctx.guard(ir);
    let va = pair_src(ctx, ir, 1, vece);
    let vb = pair_src(ctx, ir, 2, vece);
    let res = ir.new_temp(Type::V64);
    if sub {
        ir.gen_sub_vec(Type::V64, vece, res, va, vb);
    } else {
        ir.gen_add_vec(Type::V64, vece, res, va, vb);
    }
    if let Operand::Reg(r) = ctx.insn.operands[0] {
        let r = r as usize;
        if r < REG_LIMM - 1 {
            let lo = ir.new_temp(I32);
            let hi = ir.new_temp(I32);
            ir.gen_extrl_vec(lo, res);
            ir.gen_extrh_vec(hi, res);
            ir.gen_mov(I32, ctx.r[r], lo);
            ir.gen_mov(I32, ctx.r[r + 1], hi);
        }
    }
    ctx.unguard(ir);
}

/// VADD2H/VSUB2H: 2×16 lanes in a single register.
fn gen_vhalf(ctx: &mut ArcDisasContext, ir: &mut Context, sub: bool) {
    ctx.guard(ir);
    let a = src(ctx, ir, 1);
    let b = src(ctx, ir, 2);
    let va = ir.new_temp(Type::V32);
    let vb = ir.new_temp(Type::V32);
    ir.gen_mov(Type::V32, va, a);
    ir.gen_mov(Type::V32, vb, b);
    let res = ir.new_temp(Type::V32);
    if sub {
        ir.gen_sub_vec(Type::V32, 1, res, va, vb);
    } else {
        ir.gen_add_vec(Type::V32, 1, res, va, vb);
    }
    let out = ir.new_temp(I32);
    ir.gen_mov(I32, out, res);
    write_dst(ctx, ir, 0, out);
    ctx.unguard(ir);
}
