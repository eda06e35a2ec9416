//! Guest CPU environment seam.
//!
//! The backend executes against this trait so it stays independent of
//! any particular guest: global temps bind CPU fields by byte offset,
//! and helper calls dispatch on a small id carried in the IR.

use crate::stop::Stop;

pub trait CpuEnv {
    /// Read a CPU field by byte offset, zero-extended to a host word.
    fn read_field(&self, offset: u32) -> u64;

    /// Write a CPU field by byte offset (truncating to field width).
    fn write_field(&mut self, offset: u32, val: u64);

    /// Invoke a helper. Globals have been synced back to the CPU
    /// before the call and are re-read after it returns.
    fn call_helper(&mut self, id: u16, args: &[u64]) -> Result<u64, Stop>;
}
