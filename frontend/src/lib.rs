//! Guest frontend — instruction decoding and IR generation.
//!
//! Provides the generic translation framework (`TranslatorOps` trait
//! and `translator_loop`) plus the ARC guest implementation.

pub mod arc;

use dbt_core::context::Context;
use dbt_core::unit::ExitKind;

// ---------------------------------------------------------------
// Generic translation framework
// ---------------------------------------------------------------

/// Unit termination reason set by `translate_insn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisasJumpType {
    /// Continue to the next sequential instruction.
    Next,
    /// Reached the instruction budget or a page boundary.
    TooMany,
    /// Unconditional transfer / exception — no fall-through.
    NoReturn,
}

/// Base context shared by all guest architectures.
pub struct DisasContextBase {
    /// PC of the first instruction in this unit.
    pub pc_first: u32,
    /// PC of the *next* instruction to decode.
    pub pc_next: u32,
    /// How the current instruction terminates.
    pub is_jmp: DisasJumpType,
    /// Number of guest instructions translated so far.
    pub num_insns: u32,
    /// Maximum instructions allowed in one unit.
    pub max_insns: u32,
    /// Exit disposition recorded for the finished unit.
    pub exit: ExitKind,
}

/// Per-architecture translation operations.
pub trait TranslatorOps {
    /// Architecture-specific disassembly context.
    type DisasContext;

    /// One-time setup before the translation loop.
    fn init_disas_context(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Called once at the start of the unit (after init).
    fn tb_start(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Emit the `insn_start` marker for the current guest PC.
    fn insn_start(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Decode and translate one guest instruction.
    ///
    /// Must advance `base().pc_next` and set `base().is_jmp` when the
    /// instruction terminates the unit.
    fn translate_insn(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Emit the unit epilogue (exit for fall-through).
    fn tb_stop(ctx: &mut Self::DisasContext, ir: &mut Context);

    /// Access the base context embedded in the arch context.
    fn base(ctx: &Self::DisasContext) -> &DisasContextBase;

    /// Mutable access to the base context.
    fn base_mut(ctx: &mut Self::DisasContext) -> &mut DisasContextBase;
}

/// Summary of a finished translation, copied onto the unit.
#[derive(Debug, Clone, Copy)]
pub struct UnitSummary {
    pub size: u32,
    pub icount: u16,
    pub exit: ExitKind,
}

/// Generic translation loop — drives the decode → translate cycle and
/// returns the unit extent and exit disposition.
pub fn translator_loop<T: TranslatorOps>(
    ctx: &mut T::DisasContext,
    ir: &mut Context,
) -> UnitSummary {
    T::init_disas_context(ctx, ir);
    T::tb_start(ctx, ir);

    loop {
        T::insn_start(ctx, ir);
        T::translate_insn(ctx, ir);

        let base = T::base(ctx);
        if base.is_jmp != DisasJumpType::Next {
            break;
        }
        if base.num_insns >= base.max_insns {
            T::base_mut(ctx).is_jmp = DisasJumpType::TooMany;
            break;
        }
    }

    T::tb_stop(ctx, ir);
    ir.check_labels();

    let base = T::base(ctx);
    UnitSummary {
        size: base.pc_next.wrapping_sub(base.pc_first),
        icount: base.num_insns as u16,
        exit: base.exit,
    }
}
