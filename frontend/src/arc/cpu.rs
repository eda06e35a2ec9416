//! ARC CPU architectural state.

use dbt_core::env::CpuEnv;
use dbt_core::stop::{excp, Stop};
use dbt_core::unit::unit_flags;

use super::helper;

/// Number of core registers (r0-r63, including the encodings that are
/// not real storage: r62 is the long-immediate slot, r63 reads PCL).
pub const NUM_REGS: usize = 64;

pub const REG_GP: usize = 26;
pub const REG_FP: usize = 27;
pub const REG_SP: usize = 28;
pub const REG_ILINK1: usize = 29;
pub const REG_ILINK2: usize = 30;
pub const REG_BLINK: usize = 31;
pub const REG_LIMM: usize = 62;
pub const REG_PCL: usize = 63;

// Exception vector indices (numbering shared with dbt-core).
pub const EXCP_RESET: u32 = excp::RESET;
pub const EXCP_MEMORY_ERROR: u32 = excp::MEMORY_ERROR;
pub const EXCP_INST_ERROR: u32 = excp::INST_ERROR;
pub const EXCP_MACHINE_CHECK: u32 = excp::MACHINE_CHECK;
pub const EXCP_TLB_MISS_I: u32 = excp::TLB_MISS_I;
pub const EXCP_TLB_MISS_D: u32 = excp::TLB_MISS_D;
pub const EXCP_PROTV: u32 = excp::PROTV;
pub const EXCP_PRIVILEGEV: u32 = excp::PRIVILEGEV;
pub const EXCP_SWI: u32 = excp::SWI;
pub const EXCP_TRAP: u32 = excp::TRAP;
pub const EXCP_EXTENSION: u32 = excp::EXTENSION;
pub const EXCP_DIVZERO: u32 = excp::DIVZERO;
pub const EXCP_DCERROR: u32 = excp::DCERROR;
pub const EXCP_MISALIGNED: u32 = excp::MISALIGNED;

// Cause codes used with the exceptions above.
pub const CAUSE_ILLEGAL_INSN: u32 = excp::cause::ILLEGAL_INSN;
pub const CAUSE_ILLEGAL_SEQUENCE: u32 = excp::cause::ILLEGAL_SEQUENCE;
pub const CAUSE_FETCH: u32 = excp::cause::FETCH;
pub const CAUSE_LOAD: u32 = excp::cause::LOAD;
pub const CAUSE_STORE: u32 = excp::cause::STORE;

/// ARC CPU architectural state.
///
/// Layout must be `#[repr(C)]` with word-sized fields so that IR
/// global temps can reference fields at fixed byte offsets. Status
/// flags are unpacked into one word each; `status32()` repacks them.
#[repr(C)]
pub struct ArcCpu {
    /// Core registers r0-r63.
    pub r: [u32; NUM_REGS],
    /// Program counter (address of the next instruction to execute).
    pub pc: u32,
    /// Branch target, held across a delay slot.
    pub bta: u32,
    /// Zero flag.
    pub zf: u32,
    /// Negative flag.
    pub nf: u32,
    /// Carry flag.
    pub cf: u32,
    /// Overflow flag.
    pub vf: u32,
    /// Loop-disable flag.
    pub lf: u32,
    /// Delay-slot branch pending: when set, control transfers to
    /// `bta` after the next instruction.
    pub def_: u32,
    /// Interrupts enabled.
    pub ef: u32,
    /// In exception (active exception) flag.
    pub aef: u32,
    /// Halted flag.
    pub hf: u32,
    /// The next instruction to execute is a delay slot that was split
    /// off into its own unit (restart path).
    pub in_delay_slot: u32,
    /// Exception return address.
    pub eret: u32,
    /// Exception return branch target.
    pub erbta: u32,
    /// Exception cause register (vector/cause/param packed).
    pub ecr: u32,
    /// Exception fault address.
    pub efa: u32,
    /// Exception vector table base.
    pub int_vector_base: u32,
}

// Field offsets (bytes) from the start of ArcCpu, used to bind IR
// global temps.

/// Byte offset of `r[i]`: `i * 4`.
pub const fn reg_offset(i: usize) -> u32 {
    (i * 4) as u32
}

pub const PC_OFFSET: u32 = (NUM_REGS * 4) as u32; // 256
pub const BTA_OFFSET: u32 = PC_OFFSET + 4;
pub const ZF_OFFSET: u32 = BTA_OFFSET + 4;
pub const NF_OFFSET: u32 = ZF_OFFSET + 4;
pub const CF_OFFSET: u32 = NF_OFFSET + 4;
pub const VF_OFFSET: u32 = CF_OFFSET + 4;
pub const LF_OFFSET: u32 = VF_OFFSET + 4;
pub const DEF_OFFSET: u32 = LF_OFFSET + 4;
pub const EF_OFFSET: u32 = DEF_OFFSET + 4;
pub const AEF_OFFSET: u32 = EF_OFFSET + 4;
pub const HF_OFFSET: u32 = AEF_OFFSET + 4;
pub const IN_DELAY_SLOT_OFFSET: u32 = HF_OFFSET + 4;
pub const ERET_OFFSET: u32 = IN_DELAY_SLOT_OFFSET + 4;
pub const ERBTA_OFFSET: u32 = ERET_OFFSET + 4;
pub const ECR_OFFSET: u32 = ERBTA_OFFSET + 4;
pub const EFA_OFFSET: u32 = ECR_OFFSET + 4;
pub const INT_VECTOR_BASE_OFFSET: u32 = EFA_OFFSET + 4;

const CPU_SIZE: u32 = INT_VECTOR_BASE_OFFSET + 4;

// STATUS32 bit positions (for FLAG / LR / SR).
pub const STATUS32_H: u32 = 1 << 0;
pub const STATUS32_E: u32 = 1 << 1;
pub const STATUS32_AE: u32 = 1 << 5;
pub const STATUS32_DE: u32 = 1 << 6;
pub const STATUS32_V: u32 = 1 << 8;
pub const STATUS32_C: u32 = 1 << 9;
pub const STATUS32_N: u32 = 1 << 10;
pub const STATUS32_Z: u32 = 1 << 11;
pub const STATUS32_L: u32 = 1 << 12;

impl ArcCpu {
    pub fn new() -> Self {
        Self {
            r: [0u32; NUM_REGS],
            pc: 0,
            bta: 0,
            zf: 0,
            nf: 0,
            cf: 0,
            vf: 0,
            lf: 1,
            def_: 0,
            ef: 0,
            aef: 0,
            hf: 0,
            in_delay_slot: 0,
            eret: 0,
            erbta: 0,
            ecr: 0,
            efa: 0,
            int_vector_base: 0,
        }
    }

    /// Mode flags for the unit-cache key at the current state.
    pub fn unit_flags(&self) -> u32 {
        if self.in_delay_slot != 0 {
            unit_flags::UF_DELAY_SLOT
        } else {
            0
        }
    }

    /// Pack the unpacked flag fields into STATUS32 form.
    pub fn status32(&self) -> u32 {
        let mut v = 0;
        if self.hf != 0 {
            v |= STATUS32_H;
        }
        if self.ef != 0 {
            v |= STATUS32_E;
        }
        if self.aef != 0 {
            v |= STATUS32_AE;
        }
        if self.def_ != 0 {
            v |= STATUS32_DE;
        }
        if self.vf != 0 {
            v |= STATUS32_V;
        }
        if self.cf != 0 {
            v |= STATUS32_C;
        }
        if self.nf != 0 {
            v |= STATUS32_N;
        }
        if self.zf != 0 {
            v |= STATUS32_Z;
        }
        if self.lf != 0 {
            v |= STATUS32_L;
        }
        v
    }

    /// Unpack STATUS32 into the flag fields.
    pub fn set_status32(&mut self, v: u32) {
        self.hf = (v & STATUS32_H != 0) as u32;
        self.ef = (v & STATUS32_E != 0) as u32;
        self.aef = (v & STATUS32_AE != 0) as u32;
        self.def_ = (v & STATUS32_DE != 0) as u32;
        self.vf = (v & STATUS32_V != 0) as u32;
        self.cf = (v & STATUS32_C != 0) as u32;
        self.nf = (v & STATUS32_N != 0) as u32;
        self.zf = (v & STATUS32_Z != 0) as u32;
        self.lf = (v & STATUS32_L != 0) as u32;
    }
}

impl Default for ArcCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuEnv for ArcCpu {
    fn read_field(&self, offset: u32) -> u64 {
        debug_assert!(offset % 4 == 0 && offset < CPU_SIZE);
        // Every field is a u32 in a #[repr(C)] all-u32 struct.
        let p = self as *const ArcCpu as *const u8;
        unsafe { *(p.add(offset as usize) as *const u32) as u64 }
    }

    fn write_field(&mut self, offset: u32, val: u64) {
        debug_assert!(offset % 4 == 0 && offset < CPU_SIZE);
        let p = self as *mut ArcCpu as *mut u8;
        unsafe { *(p.add(offset as usize) as *mut u32) = val as u32 };
    }

    fn call_helper(&mut self, id: u16, args: &[u64]) -> Result<u64, Stop> {
        helper::call(self, id, args)
    }
}
