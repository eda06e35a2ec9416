//! Translation-unit metadata.

use std::sync::atomic::{AtomicBool, Ordering};

/// Compile flags on a unit (instruction budget, stepping).
pub mod cflags {
    /// Low bits: maximum guest instructions for this unit (0 = default).
    pub const CF_COUNT_MASK: u32 = 0x0000_01ff;
    /// Translate exactly one instruction and stop for the debugger.
    pub const CF_SINGLE_STEP: u32 = 0x0800_0000;
}

/// Mode-flag bits in the cache key alongside the entry pc.
pub mod unit_flags {
    /// The unit anchors a lone delay-slot instruction; entry runs with
    /// the runtime delay-slot flag set.
    pub const UF_DELAY_SLOT: u32 = 1 << 0;
}

/// How the unit leaves: its exit disposition, recorded at translation
/// time for the dispatch loop and the debugger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Fell off the end (instruction budget, page boundary).
    Fallthrough,
    /// Ends in a branch with a translation-time target.
    Branch,
    /// Ends in a branch whose delay slot closed the unit.
    BranchDelaySlot,
    /// Ends by raising a guest exception.
    Exception,
    /// Ends at a debug boundary (single-step).
    DebugStop,
}

/// One translated unit: key, extent, disposition and the lowered
/// artifact `A` produced by the backend.
#[derive(Debug)]
pub struct TranslationUnit<A> {
    /// Guest entry address.
    pub pc: u32,
    /// Mode flags, part of the cache key (see `unit_flags`).
    pub flags: u32,
    /// Compile flags this unit was built with.
    pub cflags: u32,
    /// Guest bytes covered, starting at `pc`.
    pub size: u32,
    /// Guest instructions translated.
    pub icount: u16,
    pub exit: ExitKind,
    pub artifact: A,
    /// Set when the unit is removed from the cache; jump-cache hits
    /// must re-verify.
    invalid: AtomicBool,
}

impl<A> TranslationUnit<A> {
    pub fn new(pc: u32, flags: u32, cflags: u32, artifact: A) -> TranslationUnit<A> {
        TranslationUnit {
            pc,
            flags,
            cflags,
            size: 0,
            icount: 0,
            exit: ExitKind::Fallthrough,
            artifact,
            invalid: AtomicBool::new(false),
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid.load(Ordering::Acquire)
    }

    pub fn set_invalid(&self) {
        self.invalid.store(true, Ordering::Release);
    }

    /// Address range covered by this unit's guest code.
    pub fn range(&self) -> (u32, u32) {
        (self.pc, self.pc.wrapping_add(self.size))
    }

    /// Effective instruction budget for a set of compile flags.
    pub fn max_insns(cflags: u32) -> u32 {
        if cflags & cflags::CF_SINGLE_STEP != 0 {
            return 1;
        }
        match cflags & cflags::CF_COUNT_MASK {
            0 => 512,
            n => n,
        }
    }
}
