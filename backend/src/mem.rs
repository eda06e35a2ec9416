//! Flat guest memory.
//!
//! A single contiguous region at a fixed guest base address. Accesses
//! outside the region or violating required alignment stop execution
//! with a guest exception; the dispatch loop owns delivery.

use dbt_core::stop::{excp, Stop};
use dbt_core::types::MemOp;

pub struct GuestMemory {
    base: u32,
    bytes: Vec<u8>,
}

impl GuestMemory {
    pub fn new(base: u32, size: usize) -> GuestMemory {
        GuestMemory {
            base,
            bytes: vec![0u8; size],
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Copy `data` into guest memory at `addr` (loader path, not a
    /// guest access: panics on out-of-range).
    pub fn write_slice(&mut self, addr: u32, data: &[u8]) {
        let off = (addr - self.base) as usize;
        self.bytes[off..off + data.len()].copy_from_slice(data);
    }

    fn offset(&self, addr: u32, size: u32, cause: u32) -> Result<usize, Stop> {
        let off = addr.wrapping_sub(self.base) as usize;
        if off + size as usize > self.bytes.len() {
            log::debug!("guest access outside memory: {addr:#010x} ({size} bytes)");
            return Err(Stop::exception(excp::MEMORY_ERROR, cause, addr));
        }
        Ok(off)
    }

    fn check_align(&self, addr: u32, mop: MemOp, cause: u32) -> Result<(), Stop> {
        if mop.aligned() && addr & (mop.size_bytes() - 1) != 0 {
            return Err(Stop::exception(excp::MISALIGNED, cause, addr));
        }
        Ok(())
    }

    /// Guest load. Sign-extends to 64 bits when the descriptor asks.
    pub fn load(&self, addr: u32, mop: MemOp) -> Result<u64, Stop> {
        self.check_align(addr, mop, excp::cause::LOAD)?;
        let size = mop.size_bytes();
        let off = self.offset(addr, size, excp::cause::LOAD)?;
        let mut v = 0u64;
        for i in 0..size as usize {
            v |= (self.bytes[off + i] as u64) << (8 * i);
        }
        if mop.sign_extend() {
            let shift = 64 - 8 * size;
            v = ((v << shift) as i64 >> shift) as u64;
        }
        Ok(v)
    }

    /// Guest store.
    pub fn store(&mut self, addr: u32, val: u64, mop: MemOp) -> Result<(), Stop> {
        self.check_align(addr, mop, excp::cause::STORE)?;
        let size = mop.size_bytes();
        let off = self.offset(addr, size, excp::cause::STORE)?;
        for i in 0..size as usize {
            self.bytes[off + i] = (val >> (8 * i)) as u8;
        }
        Ok(())
    }
}
