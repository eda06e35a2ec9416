//! ARC guest frontend.
//!
//! Wires the decoder and the semantic emitters into the generic
//! translation loop, and owns the conditional-execution guard and the
//! branch-delay-slot model.

pub mod cpu;
pub mod decode;
pub mod helper;
mod trans;

use std::marker::PhantomData;

use dbt_core::context::Context;
use dbt_core::temp::TempIdx;
use dbt_core::types::{Cond, Type};
use dbt_core::unit::{cflags, unit_flags, ExitKind, TranslationUnit};

use crate::{translator_loop, DisasContextBase, DisasJumpType, TranslatorOps, UnitSummary};
use cpu::*;
use decode::{cc, ArcOp, DecodedInsn};

/// Guest page granule. Translation never lets a unit span a page
/// boundary, and delay slots on the far side of one are split off.
pub const PAGE_BITS: u32 = 12;

const NB_GLOBALS: u32 = NUM_REGS as u32 + 14;

/// Per-instruction decode state, snapshotted and restored around the
/// delay-slot recursion (the child runs on a copy, by value).
#[derive(Clone, Copy)]
struct InsnState {
    insn: DecodedInsn,
    cpc: u32,
    npc: u32,
    limm: u32,
    guard_label: Option<u32>,
}

pub struct ArcDisasContext<'a> {
    pub base: DisasContextBase,
    code: &'a [u8],
    code_base: u32,
    pub cflags: u32,
    pub unit_flags: u32,

    // Global temps, bound once per IR context.
    pub r: [TempIdx; NUM_REGS],
    pub g_pc: TempIdx,
    pub g_bta: TempIdx,
    pub g_zf: TempIdx,
    pub g_nf: TempIdx,
    pub g_cf: TempIdx,
    pub g_vf: TempIdx,
    pub g_lf: TempIdx,
    pub g_def: TempIdx,
    pub g_ef: TempIdx,
    pub g_aef: TempIdx,
    pub g_hf: TempIdx,
    pub g_in_delay_slot: TempIdx,
    pub g_eret: TempIdx,
    pub g_erbta: TempIdx,

    // Current instruction.
    pub(crate) insn: DecodedInsn,
    /// Address of the current instruction.
    pub cpc: u32,
    /// Address of the next instruction (past any long immediate).
    pub npc: u32,
    /// Long-immediate value, when `insn.needs_limm()`.
    pub limm: u32,
    guard_label: Option<u32>,
    /// Translating a delay-slot instruction (recursion or slot unit).
    pub(crate) in_delay_slot: bool,
    /// This unit anchors a lone delay-slot instruction.
    slot_unit: bool,
}

impl<'a> ArcDisasContext<'a> {
    pub fn new(
        code: &'a [u8],
        code_base: u32,
        pc: u32,
        unit_flags: u32,
        cflags: u32,
    ) -> ArcDisasContext<'a> {
        let max_insns = if unit_flags & unit_flags::UF_DELAY_SLOT != 0 {
            1
        } else {
            TranslationUnit::<()>::max_insns(cflags)
        };
        ArcDisasContext {
            base: DisasContextBase {
                pc_first: pc,
                pc_next: pc,
                is_jmp: DisasJumpType::Next,
                num_insns: 0,
                max_insns,
                exit: ExitKind::Fallthrough,
            },
            code,
            code_base,
            cflags,
            unit_flags,
            r: [TempIdx(0); NUM_REGS],
            g_pc: TempIdx(0),
            g_bta: TempIdx(0),
            g_zf: TempIdx(0),
            g_nf: TempIdx(0),
            g_cf: TempIdx(0),
            g_vf: TempIdx(0),
            g_lf: TempIdx(0),
            g_def: TempIdx(0),
            g_ef: TempIdx(0),
            g_aef: TempIdx(0),
            g_hf: TempIdx(0),
            g_in_delay_slot: TempIdx(0),
            g_eret: TempIdx(0),
            g_erbta: TempIdx(0),
            insn: DecodedInsn::new(ArcOp::Nop, 2),
            cpc: pc,
            npc: pc,
            limm: 0,
            guard_label: None,
            in_delay_slot: false,
            slot_unit: unit_flags & unit_flags::UF_DELAY_SLOT != 0,
        }
    }

    /// Aligned PC the hardware exposes as r63 and uses as the branch
    /// base.
    pub fn pcl(&self) -> u32 {
        self.cpc & !3
    }

    // ---- fetch ----

    fn fetch16(&self, addr: u32) -> Option<u16> {
        let off = addr.wrapping_sub(self.code_base) as usize;
        let b = self.code.get(off..off + 2)?;
        Some(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Instruction words are stored middle-endian: little-endian
    /// half-words, most significant half-word first.
    fn fetch32(&self, addr: u32) -> Option<u32> {
        let hi = self.fetch16(addr)? as u32;
        let lo = self.fetch16(addr.wrapping_add(2))? as u32;
        Some(hi << 16 | lo)
    }

    /// Decode the instruction at `addr` without emitting anything.
    /// Used to size a delay slot before it is translated.
    fn peek_total_len(&self, addr: u32) -> u32 {
        let Some(hw) = self.fetch16(addr) else { return 2 };
        let len = decode::insn_length(hw);
        let word = if len == 4 {
            match self.fetch32(addr) {
                Some(w) => w,
                None => return len,
            }
        } else {
            hw as u32
        };
        match decode::decode(word, len) {
            Some(di) => di.total_len(),
            None => len,
        }
    }

    // ---- per-instruction state ----

    fn save_insn_state(&self) -> InsnState {
        InsnState {
            insn: self.insn,
            cpc: self.cpc,
            npc: self.npc,
            limm: self.limm,
            guard_label: self.guard_label,
        }
    }

    fn restore_insn_state(&mut self, s: InsnState) {
        self.insn = s.insn;
        self.cpc = s.cpc;
        self.npc = s.npc;
        self.limm = s.limm;
        self.guard_label = s.guard_label;
    }

    // ---- guard/unguard ----

    /// Open the predication guard for the current instruction: skip
    /// everything up to `unguard()` unless the condition holds.
    /// Write-once per instruction.
    pub(crate) fn guard(&mut self, ir: &mut Context) {
        if self.insn.cc == cc::AL {
            return;
        }
        assert!(
            self.guard_label.is_none(),
            "guard opened twice for the instruction at {:#x}",
            self.cpc
        );
        let t = trans::gen_cc_test(self, ir, self.insn.cc);
        let l = ir.new_label();
        ir.gen_brcondi(Type::I32, t, 1, Cond::Ne, l);
        self.guard_label = Some(l);
    }

    /// Close the guard opened by `guard()`.
    pub(crate) fn unguard(&mut self, ir: &mut Context) {
        if let Some(l) = self.guard_label.take() {
            ir.gen_set_label(l);
        }
    }

    // ---- exceptions ----

    /// Emit IR that raises a guest exception at run time. `eret` is
    /// the architected return address for the fault class.
    pub(crate) fn gen_excp(
        &mut self,
        ir: &mut Context,
        index: u32,
        cause: u32,
        param: u32,
        eret: u32,
    ) {
        ir.gen_movi(Type::I32, self.g_pc, self.cpc as u64);
        ir.gen_movi(Type::I32, self.g_eret, eret as u64);
        ir.gen_movi(Type::I32, self.g_erbta, self.npc as u64);
        let scratch = ir.new_temp(Type::I32);
        let args = [
            ir.new_const_i32(index),
            ir.new_const_i32(cause),
            ir.new_const_i32(param),
        ];
        ir.gen_call(Type::I32, scratch, helper::Helper::Raise as u16, &args);
        // Not reached at run time; keeps the op stream terminated.
        ir.gen_exit_tb(0);
        self.base.is_jmp = DisasJumpType::NoReturn;
        self.base.exit = ExitKind::Exception;
    }

    fn gen_invalid_insn(&mut self, ir: &mut Context) {
        log::debug!("invalid instruction at {:#010x}", self.cpc);
        let cause = if self.in_delay_slot {
            CAUSE_ILLEGAL_SEQUENCE
        } else {
            CAUSE_ILLEGAL_INSN
        };
        self.gen_excp(ir, EXCP_INST_ERROR, cause, 0, self.cpc);
    }

    fn gen_fetch_fault(&mut self, ir: &mut Context, addr: u32) {
        log::debug!("fetch outside guest code at {:#010x}", addr);
        self.gen_excp(ir, EXCP_MEMORY_ERROR, CAUSE_FETCH, addr, self.cpc);
    }

    // ---- delay slot ----

    /// Translate the delay slot of a branch.
    ///
    /// Stores the runtime branch state (`DEf` ← take, `bta` ← target)
    /// first, then translates the next instruction with the decode
    /// state snapshotted around it. The caller emits the post-slot
    /// commit with `gen_delay_commit` unless this returns having
    /// closed the unit (slot on another page → synthetic restart).
    pub(crate) fn execute_delay_slot(
        &mut self,
        ir: &mut Context,
        target: TempIdx,
        take_branch: TempIdx,
    ) {
        assert!(
            !self.in_delay_slot,
            "delay slot inside a delay slot at {:#x}",
            self.cpc
        );

        ir.gen_mov(Type::I32, self.g_def, take_branch);
        ir.gen_mov(Type::I32, self.g_bta, target);

        let slot_pc = self.npc;
        if slot_pc >> PAGE_BITS != self.base.pc_first >> PAGE_BITS {
            // The slot lives on another page. End the unit here with
            // the runtime delay-slot flag set; dispatch retranslates
            // the slot as its own unit keyed with UF_DELAY_SLOT.
            log::debug!(
                "delay slot at {:#010x} crosses a page, splitting",
                slot_pc
            );
            ir.gen_movi(Type::I32, self.g_in_delay_slot, 1);
            ir.gen_movi(Type::I32, self.g_pc, slot_pc as u64);
            ir.gen_exit_tb(0);
            self.base.pc_next = slot_pc;
            self.base.is_jmp = DisasJumpType::NoReturn;
            self.base.exit = ExitKind::BranchDelaySlot;
            return;
        }

        let saved = self.save_insn_state();
        self.in_delay_slot = true;
        // The slot is a guest instruction of its own: marker and count
        // exactly as the outer loop does for the branch.
        ir.gen_insn_start(slot_pc);
        self.base.num_insns += 1;
        self.translate_one(ir, slot_pc);
        self.in_delay_slot = false;
        let slot_end = self.npc;
        self.restore_insn_state(saved);

        if self.base.is_jmp == DisasJumpType::Next {
            // The branch emitter continues from past the slot.
            self.npc = slot_end;
        }
    }

    /// Post-slot commit: if the branch was taken, clear `DEf` and
    /// leave through `bta`.
    pub(crate) fn gen_delay_commit(&mut self, ir: &mut Context) {
        let l = ir.new_label();
        ir.gen_brcondi(Type::I32, self.g_def, 1, Cond::Ne, l);
        ir.gen_movi(Type::I32, self.g_def, 0);
        ir.gen_mov(Type::I32, self.g_pc, self.g_bta);
        ir.gen_exit_tb(0);
        ir.gen_set_label(l);
        ir.gen_movi(Type::I32, self.g_def, 0);
    }

    // ---- main per-instruction step ----

    /// Fetch, decode and emit the instruction at `pc`. Sets `is_jmp`
    /// when it closes the unit.
    fn translate_one(&mut self, ir: &mut Context, pc: u32) {
        self.cpc = pc;
        self.npc = pc;

        let Some(hw0) = self.fetch16(pc) else {
            self.gen_fetch_fault(ir, pc);
            return;
        };
        let len = decode::insn_length(hw0);
        let word = if len == 4 {
            match self.fetch32(pc) {
                Some(w) => w,
                None => {
                    self.gen_fetch_fault(ir, pc);
                    return;
                }
            }
        } else {
            hw0 as u32
        };

        let Some(insn) = decode::decode(word, len) else {
            self.npc = pc.wrapping_add(len);
            self.base.pc_next = self.npc;
            self.gen_invalid_insn(ir);
            return;
        };

        if insn.needs_limm() {
            match self.fetch32(pc.wrapping_add(len)) {
                Some(v) => self.limm = v,
                None => {
                    self.gen_fetch_fault(ir, pc.wrapping_add(len));
                    return;
                }
            }
        }

        self.insn = insn;
        self.npc = pc.wrapping_add(insn.total_len());
        if !self.in_delay_slot {
            self.base.pc_next = self.npc;
        }

        trans::dispatch(self, ir);

        if !self.in_delay_slot {
            self.base.pc_next = self.npc;
        }
        assert!(
            self.guard_label.is_none(),
            "guard left open by the instruction at {:#x}",
            self.cpc
        );
    }
}

/// Marker type carrying the `TranslatorOps` implementation.
pub struct ArcTranslator<'a>(PhantomData<&'a ()>);

impl<'a> TranslatorOps for ArcTranslator<'a> {
    type DisasContext = ArcDisasContext<'a>;

    fn init_disas_context(ctx: &mut Self::DisasContext, ir: &mut Context) {
        if ir.nb_globals() == 0 {
            register_globals(ir);
        }
        debug_assert_eq!(ir.nb_globals(), NB_GLOBALS);
        // Globals are registered in a fixed order; indices are stable
        // across context reuse.
        for i in 0..NUM_REGS {
            ctx.r[i] = TempIdx(i as u32);
        }
        let base = NUM_REGS as u32;
        ctx.g_pc = TempIdx(base);
        ctx.g_bta = TempIdx(base + 1);
        ctx.g_zf = TempIdx(base + 2);
        ctx.g_nf = TempIdx(base + 3);
        ctx.g_cf = TempIdx(base + 4);
        ctx.g_vf = TempIdx(base + 5);
        ctx.g_lf = TempIdx(base + 6);
        ctx.g_def = TempIdx(base + 7);
        ctx.g_ef = TempIdx(base + 8);
        ctx.g_aef = TempIdx(base + 9);
        ctx.g_hf = TempIdx(base + 10);
        ctx.g_in_delay_slot = TempIdx(base + 11);
        ctx.g_eret = TempIdx(base + 12);
        ctx.g_erbta = TempIdx(base + 13);
    }

    fn tb_start(ctx: &mut Self::DisasContext, ir: &mut Context) {
        if ctx.slot_unit {
            // Entered with the runtime delay-slot flag set; clear it
            // before the slot instruction runs.
            ir.gen_movi(Type::I32, ctx.g_in_delay_slot, 0);
        }
    }

    fn insn_start(ctx: &mut Self::DisasContext, ir: &mut Context) {
        ir.gen_insn_start(ctx.base.pc_next);
    }

    fn translate_insn(ctx: &mut Self::DisasContext, ir: &mut Context) {
        let pc = ctx.base.pc_next;

        if ctx.slot_unit {
            ctx.in_delay_slot = true;
            ctx.translate_one(ir, pc);
            ctx.in_delay_slot = false;
            ctx.base.pc_next = ctx.npc;
            ctx.base.num_insns += 1;
            if ctx.base.is_jmp == DisasJumpType::Next {
                ctx.gen_delay_commit(ir);
                ir.gen_movi(Type::I32, ctx.g_pc, ctx.npc as u64);
                ir.gen_exit_tb(0);
                ctx.base.is_jmp = DisasJumpType::NoReturn;
                ctx.base.exit = ExitKind::Branch;
            }
            return;
        }

        ctx.translate_one(ir, pc);
        ctx.base.num_insns += 1;

        if ctx.base.is_jmp == DisasJumpType::Next
            && ctx.base.pc_next >> PAGE_BITS != ctx.base.pc_first >> PAGE_BITS
        {
            ctx.base.is_jmp = DisasJumpType::TooMany;
        }
    }

    fn tb_stop(ctx: &mut Self::DisasContext, ir: &mut Context) {
        match ctx.base.is_jmp {
            DisasJumpType::TooMany => {
                ir.gen_movi(Type::I32, ctx.g_pc, ctx.base.pc_next as u64);
                ir.gen_exit_tb(0);
            }
            DisasJumpType::NoReturn => {}
            DisasJumpType::Next => unreachable!("unit closed while still decoding"),
        }
        if ctx.cflags & cflags::CF_SINGLE_STEP != 0 && ctx.base.exit != ExitKind::Exception {
            ctx.base.exit = ExitKind::DebugStop;
        }
    }

    fn base(ctx: &Self::DisasContext) -> &DisasContextBase {
        &ctx.base
    }

    fn base_mut(ctx: &mut Self::DisasContext) -> &mut DisasContextBase {
        &mut ctx.base
    }
}

fn register_globals(ir: &mut Context) {
    static REG_NAMES: [&str; NUM_REGS] = [
        "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "r13",
        "r14", "r15", "r16", "r17", "r18", "r19", "r20", "r21", "r22", "r23", "r24", "r25", "gp",
        "fp", "sp", "ilink1", "ilink2", "blink", "r32", "r33", "r34", "r35", "r36", "r37", "r38",
        "r39", "r40", "r41", "r42", "r43", "r44", "r45", "r46", "r47", "r48", "r49", "r50", "r51",
        "r52", "r53", "r54", "r55", "r56", "r57", "accl", "acch", "lp_count", "r61", "limm", "pcl",
    ];
    for (i, name) in REG_NAMES.iter().enumerate() {
        ir.new_global(Type::I32, reg_offset(i), name);
    }
    ir.new_global(Type::I32, PC_OFFSET, "pc");
    ir.new_global(Type::I32, BTA_OFFSET, "bta");
    ir.new_global(Type::I32, ZF_OFFSET, "zf");
    ir.new_global(Type::I32, NF_OFFSET, "nf");
    ir.new_global(Type::I32, CF_OFFSET, "cf");
    ir.new_global(Type::I32, VF_OFFSET, "vf");
    ir.new_global(Type::I32, LF_OFFSET, "lf");
    ir.new_global(Type::I32, DEF_OFFSET, "def");
    ir.new_global(Type::I32, EF_OFFSET, "ef");
    ir.new_global(Type::I32, AEF_OFFSET, "aef");
    ir.new_global(Type::I32, HF_OFFSET, "hf");
    ir.new_global(Type::I32, IN_DELAY_SLOT_OFFSET, "ids");
    ir.new_global(Type::I32, ERET_OFFSET, "eret");
    ir.new_global(Type::I32, ERBTA_OFFSET, "erbta");
}

/// Translate one unit's worth of guest code starting at `pc`.
///
/// `code` holds the guest code bytes mapped at `code_base`.
pub fn translate_unit(
    ir: &mut Context,
    code: &[u8],
    code_base: u32,
    pc: u32,
    flags: u32,
    cflags: u32,
) -> UnitSummary {
    ir.reset();
    let mut ctx = ArcDisasContext::new(code, code_base, pc, flags, cflags);
    translator_loop::<ArcTranslator>(&mut ctx, ir)
}
