//! The non-local exit type for guest execution.
//!
//! Helpers and the interpreter return `Err(Stop)` and the error is
//! propagated with `?` up to the single catch point in the dispatch
//! loop. There is exactly one catch site; everything in between only
//! forwards.

use thiserror::Error;

/// Guest exception vector indices and cause codes.
///
/// These number the entries of the guest's exception vector table;
/// the memory object and the frontend both raise in these terms.
pub mod excp {
    pub const RESET: u32 = 0;
    pub const MEMORY_ERROR: u32 = 1;
    pub const INST_ERROR: u32 = 2;
    pub const MACHINE_CHECK: u32 = 3;
    pub const TLB_MISS_I: u32 = 4;
    pub const TLB_MISS_D: u32 = 5;
    pub const PROTV: u32 = 6;
    pub const PRIVILEGEV: u32 = 7;
    pub const SWI: u32 = 8;
    pub const TRAP: u32 = 9;
    pub const EXTENSION: u32 = 10;
    pub const DIVZERO: u32 = 11;
    pub const DCERROR: u32 = 12;
    pub const MISALIGNED: u32 = 13;

    pub mod cause {
        pub const ILLEGAL_INSN: u32 = 0;
        pub const ILLEGAL_SEQUENCE: u32 = 1;
        pub const FETCH: u32 = 0;
        pub const LOAD: u32 = 1;
        pub const STORE: u32 = 2;
    }
}

/// Reason execution of a translation unit stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Stop {
    /// A guest exception was raised; delivery happens in dispatch.
    #[error("guest exception {index} (cause {cause:#x}, param {param:#x})")]
    Exception { index: u32, cause: u32, param: u32 },
    /// The CPU halted (sleep/wait-for-interrupt).
    #[error("cpu halted")]
    Halt,
    /// A debug event (breakpoint, single-step boundary).
    #[error("debug stop")]
    Debug,
    /// The dispatch loop was asked to yield (interrupt window).
    #[error("interrupt window")]
    Interrupt,
}

impl Stop {
    pub fn exception(index: u32, cause: u32, param: u32) -> Stop {
        Stop::Exception {
            index,
            cause,
            param,
        }
    }
}
