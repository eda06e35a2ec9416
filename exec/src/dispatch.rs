//! Dispatch loop: lookup → translate → execute, one catch point.
//!
//! The interpreter and helpers stop execution by returning
//! `Err(Stop)`; everything between them and `run` only forwards with
//! `?`. `run` is the single place the error is caught: exceptions are
//! delivered to the guest and the loop re-dispatches, the sentinel
//! stops are returned to the caller.

use std::sync::Arc;

use dbt_backend::bytecode::Artifact;
use dbt_backend::interp;
use dbt_backend::mem::GuestMemory;
use dbt_backend::{ExecObserver, InterpBackend, LoweringBackend, NullObserver};
use dbt_core::context::Context;
use dbt_core::stop::{excp, Stop};
use dbt_core::unit::{ExitKind, TranslationUnit};
use dbt_frontend::arc::cpu::ArcCpu;
use dbt_frontend::arc::translate_unit;

use crate::state::{CpuExecState, PendingException};
use crate::unit_cache::{CachedUnit, JumpCache, UnitCache};

/// Why the dispatch loop returned to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchExit {
    /// The CPU halted (sleep, FLAG with the H bit).
    Halt,
    /// A debug event: breakpoint instruction or single-step boundary.
    Debug,
    /// The loop yielded for interrupt servicing.
    Interrupt,
}

/// Debugger-facing instrumentation points.
pub trait DebugHooks {
    fn on_unit_start(&mut self, _pc: u32, _icount: u16) {}
    fn on_insn_start(&mut self, _pc: u32) {}
    fn on_insn_end(&mut self, _pc: u32) {}
}

/// Default hooks: observe nothing.
pub struct NoHooks;

impl DebugHooks for NoHooks {}

struct HookObserver<'a> {
    hooks: &'a mut dyn DebugHooks,
}

impl ExecObserver for HookObserver<'_> {
    fn insn_start(&mut self, pc: u32) {
        self.hooks.on_insn_start(pc);
    }

    fn insn_end(&mut self, pc: u32) {
        self.hooks.on_insn_end(pc);
    }
}

/// Exception-delivery collaborator: turns a caught guest exception
/// into architectural state.
pub trait ExcpSink {
    fn deliver(&mut self, cpu: &mut ArcCpu, index: u32, cause: u32, param: u32);
}

/// Architected vectored delivery: pack ECR, record the fault address
/// for memory-class exceptions, enter the exception state and jump
/// through the vector table.
pub struct VectoredDelivery;

fn is_memory_excp(index: u32) -> bool {
    matches!(
        index,
        excp::MEMORY_ERROR | excp::MISALIGNED | excp::TLB_MISS_I | excp::TLB_MISS_D
    )
}

impl ExcpSink for VectoredDelivery {
    fn deliver(&mut self, cpu: &mut ArcCpu, index: u32, cause: u32, param: u32) {
        // eret/erbta were staged by the raising emitter; memory faults
        // additionally record the offending address.
        cpu.ecr = (index & 0xff) << 16 | (cause & 0xff) << 8 | (param & 0xff);
        if is_memory_excp(index) {
            cpu.efa = param;
        }
        cpu.aef = 1;
        cpu.ef = 0;
        cpu.def_ = 0;
        cpu.in_delay_slot = 0;
        cpu.pc = cpu.int_vector_base.wrapping_add(index * 4);
    }
}

/// One virtual CPU's translation engine: shared unit cache, private
/// jump cache, the reusable IR context and the lowering backend.
pub struct Engine {
    cache: Arc<UnitCache>,
    jump_cache: JumpCache,
    ir: Context,
    backend: InterpBackend,
    pub state: CpuExecState,
    /// Compile flags applied to new translations (single-step etc.).
    pub cflags: u32,
}

impl Engine {
    pub fn new() -> Engine {
        Engine::with_cache(Arc::new(UnitCache::new()))
    }

    /// Build an engine sharing an existing unit cache (one cache,
    /// many CPUs).
    pub fn with_cache(cache: Arc<UnitCache>) -> Engine {
        Engine {
            cache,
            jump_cache: JumpCache::new(),
            ir: Context::new(),
            backend: InterpBackend,
            state: CpuExecState::new(),
            cflags: 0,
        }
    }

    pub fn cache(&self) -> &Arc<UnitCache> {
        &self.cache
    }

    /// Translate guest code at `pc` into a new cached unit.
    pub fn translate(&mut self, mem: &GuestMemory, pc: u32, flags: u32) -> CachedUnit {
        let summary = translate_unit(&mut self.ir, mem.bytes(), mem.base(), pc, flags, self.cflags);
        let artifact = self.backend.lower(&self.ir);
        let mut unit = TranslationUnit::new(pc, flags, self.cflags, artifact);
        unit.size = summary.size;
        unit.icount = summary.icount;
        unit.exit = summary.exit;
        log::debug!(
            "translated unit at {:#010x} flags {:#x}: {} insns, {} bytes, {:?}",
            pc,
            flags,
            unit.icount,
            unit.size,
            unit.exit
        );
        let unit = self.cache.insert(Arc::new(unit));
        self.jump_cache.insert(unit.clone());
        unit
    }

    fn find_or_translate(&mut self, mem: &GuestMemory, pc: u32, flags: u32) -> CachedUnit {
        if let Some(u) = self.jump_cache.lookup(pc, flags) {
            return u;
        }
        if let Some(u) = self.cache.lookup(pc, flags) {
            self.jump_cache.insert(u.clone());
            return u;
        }
        self.translate(mem, pc, flags)
    }

    /// Drop every cached unit overlapping [lo, hi); called on guest
    /// writes that may alias code.
    pub fn invalidate_range(&mut self, lo: u32, hi: u32) {
        self.cache.invalidate_range(lo, hi);
        self.jump_cache.clear();
    }

    pub fn flush_cache(&mut self) {
        self.cache.flush();
        self.jump_cache.clear();
    }

    /// Run one artifact. Forwards the interpreter's stop unchanged;
    /// the caller owns the catch.
    fn exec_unit(
        &mut self,
        unit: &TranslationUnit<Artifact>,
        cpu: &mut ArcCpu,
        mem: &mut GuestMemory,
        hooks: &mut dyn DebugHooks,
    ) -> Result<u64, Stop> {
        if self.state.instr_enabled {
            hooks.on_unit_start(unit.pc, unit.icount);
        }
        self.state.io_safe = false;
        let mut null = NullObserver;
        let mut adapter = HookObserver { hooks };
        let obs: &mut dyn ExecObserver = if self.state.instr_enabled {
            &mut adapter
        } else {
            &mut null
        };
        let res = interp::execute(&unit.artifact, cpu, mem, obs);
        self.state.io_safe = true;
        res
    }

    /// The dispatch loop. Returns only on a sentinel stop or a debug
    /// unit boundary; guest exceptions are delivered in-loop.
    pub fn run(
        &mut self,
        cpu: &mut ArcCpu,
        mem: &mut GuestMemory,
        hooks: &mut dyn DebugHooks,
        sink: &mut dyn ExcpSink,
    ) -> DispatchExit {
        loop {
            if cpu.hf != 0 {
                return DispatchExit::Halt;
            }

            let pc = cpu.pc;
            let flags = cpu.unit_flags();
            let unit = self.find_or_translate(mem, pc, flags);

            match self.exec_unit(&unit, cpu, mem, hooks) {
                Ok(_) => {
                    if unit.exit == ExitKind::DebugStop {
                        return DispatchExit::Debug;
                    }
                }
                Err(stop) => {
                    self.state.loop_exit_atomic();
                    let exit = match stop {
                        Stop::Exception {
                            index,
                            cause,
                            param,
                        } => {
                            log::debug!(
                                "guest exception {index} (cause {cause:#x}, param {param:#x}) at pc {:#010x}",
                                cpu.pc
                            );
                            self.state.pending_excp = Some(PendingException {
                                index,
                                cause,
                                param,
                            });
                            sink.deliver(cpu, index, cause, param);
                            self.state.pending_excp = None;
                            None
                        }
                        Stop::Halt => Some(DispatchExit::Halt),
                        Stop::Debug => Some(DispatchExit::Debug),
                        Stop::Interrupt => Some(DispatchExit::Interrupt),
                    };
                    // Unwind is over; hooks fire again from here on.
                    self.state.instr_enabled = true;
                    if let Some(exit) = exit {
                        return exit;
                    }
                }
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

/// Dispatch with the default hooks and delivery.
pub fn dispatch(engine: &mut Engine, cpu: &mut ArcCpu, mem: &mut GuestMemory) -> DispatchExit {
    engine.run(cpu, mem, &mut NoHooks, &mut VectoredDelivery)
}
