//! Per-CPU execution state.

/// Exception recorded between the catch point and its delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingException {
    pub index: u32,
    pub cause: u32,
    pub param: u32,
}

/// Bookkeeping for one virtual CPU's trips through the dispatch loop.
pub struct CpuExecState {
    /// Device/IO access is permitted only between units; cleared while
    /// an artifact is running.
    pub io_safe: bool,
    /// Instrumentation hooks fire on instruction boundaries. Disabled
    /// while an early stop unwinds.
    pub instr_enabled: bool,
    /// Exception caught but not yet delivered.
    pub pending_excp: Option<PendingException>,
    /// This CPU holds the global exclusive section.
    pub exclusive_held: bool,
}

impl CpuExecState {
    pub fn new() -> CpuExecState {
        CpuExecState {
            io_safe: true,
            instr_enabled: true,
            pending_excp: None,
            exclusive_held: false,
        }
    }

    /// Early-stop bookkeeping: IO becomes safe again and hooks stay
    /// quiet until the loop re-dispatches.
    pub fn loop_exit(&mut self) {
        self.io_safe = true;
        self.instr_enabled = false;
    }

    /// `loop_exit` with a precise restart pc supplied by the caller
    /// (emitters update the pc global before raising, so the guest pc
    /// is already exact on the normal path).
    pub fn loop_exit_restore(&mut self, pc: u32, set_pc: impl FnOnce(u32)) {
        self.loop_exit();
        set_pc(pc);
    }

    /// Early stop from inside an exclusive section is not a state the
    /// loop can unwind.
    pub fn loop_exit_atomic(&mut self) {
        assert!(
            !self.exclusive_held,
            "loop exit requested while holding the exclusive section"
        );
        self.loop_exit();
    }
}

impl Default for CpuExecState {
    fn default() -> Self {
        CpuExecState::new()
    }
}
