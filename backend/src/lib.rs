//! Lowering backend: IR → executable artifact.
//!
//! The only shipped backend encodes IR into a flat bytecode word
//! stream and interprets it. The seam stays pluggable: anything that
//! can lower a finished IR context to something executable fits
//! behind `LoweringBackend`.

pub mod bytecode;
pub mod interp;
pub mod mem;

use dbt_core::context::Context;
use dbt_core::types::Type;

/// A code generator for finished translation-unit IR.
pub trait LoweringBackend {
    type Artifact;

    /// Lower the context's op stream. Called once per unit; the IR is
    /// complete and label-checked.
    fn lower(&self, ctx: &Context) -> Self::Artifact;

    /// Whether the backend executes this vector shape natively.
    /// The frontend only emits supported shapes; this documents the
    /// contract and lets tests probe it.
    fn supports_vece(&self, ty: Type, vece: u8) -> bool;
}

/// Observer for per-instruction execution boundaries.
pub trait ExecObserver {
    fn insn_start(&mut self, _pc: u32) {}
    fn insn_end(&mut self, _pc: u32) {}
}

/// No-op observer for undisturbed execution.
pub struct NullObserver;

impl ExecObserver for NullObserver {}

/// The bytecode-interpreter backend.
pub struct InterpBackend;

impl LoweringBackend for InterpBackend {
    type Artifact = bytecode::Artifact;

    fn lower(&self, ctx: &Context) -> bytecode::Artifact {
        bytecode::encode(ctx)
    }

    fn supports_vece(&self, ty: Type, vece: u8) -> bool {
        ty.is_vector() && vece <= 2 && ty.lanes(vece) >= 2
    }
}
