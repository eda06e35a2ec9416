//! Execution engine — unit cache and CPU dispatch loop.
//!
//! Drives the lookup → translate → execute cycle over cached
//! translation units, catches the `Stop` non-local exit at exactly one
//! point, and delivers guest exceptions between runs.

pub mod dispatch;
pub mod state;
pub mod unit_cache;

pub use dispatch::{dispatch, DebugHooks, DispatchExit, Engine, ExcpSink, NoHooks, VectoredDelivery};
pub use state::{CpuExecState, PendingException};
pub use unit_cache::{CachedUnit, JumpCache, UnitCache};
