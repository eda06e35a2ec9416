//! Helper catalogue: the out-of-line operations generated code can
//! call. Each helper gets the CPU with globals synced and may stop
//! the execution loop by returning `Err(Stop)`.

use dbt_core::stop::Stop;

use super::cpu::*;

// Aux register numbers served by AuxGet/AuxSet.
pub const AUX_STATUS32: u32 = 0x0a;
pub const AUX_INT_VECTOR_BASE: u32 = 0x25;
pub const AUX_ERET: u32 = 0x400;
pub const AUX_ERBTA: u32 = 0x401;
pub const AUX_ECR: u32 = 0x403;
pub const AUX_EFA: u32 = 0x404;
pub const AUX_BTA: u32 = 0x412;

/// Closed helper id set. The frontend only emits these ids, so an
/// unknown id at run time is an internal inconsistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Helper {
    /// raise(index, cause, param): always stops with an exception.
    Raise = 0,
    Div,
    Divu,
    Rem,
    Remu,
    /// flag(val): load the status flags; the H bit halts.
    Flag,
    /// aux_get(addr) -> value
    AuxGet,
    /// aux_set(addr, value)
    AuxSet,
    Sleep,
    Brk,
}

impl Helper {
    fn from_raw(id: u16) -> Option<Helper> {
        Some(match id {
            0 => Helper::Raise,
            1 => Helper::Div,
            2 => Helper::Divu,
            3 => Helper::Rem,
            4 => Helper::Remu,
            5 => Helper::Flag,
            6 => Helper::AuxGet,
            7 => Helper::AuxSet,
            8 => Helper::Sleep,
            9 => Helper::Brk,
            _ => return None,
        })
    }
}

fn div_zero() -> Stop {
    Stop::exception(EXCP_DIVZERO, 0, 0)
}

fn bad_aux(addr: u32) -> Stop {
    log::debug!("access to unimplemented aux register {addr:#x}");
    Stop::exception(EXCP_INST_ERROR, CAUSE_ILLEGAL_INSN, 0)
}

fn aux_get(cpu: &ArcCpu, addr: u32) -> Result<u64, Stop> {
    let v = match addr {
        AUX_STATUS32 => cpu.status32(),
        AUX_INT_VECTOR_BASE => cpu.int_vector_base,
        AUX_ERET => cpu.eret,
        AUX_ERBTA => cpu.erbta,
        AUX_ECR => cpu.ecr,
        AUX_EFA => cpu.efa,
        AUX_BTA => cpu.bta,
        _ => return Err(bad_aux(addr)),
    };
    Ok(v as u64)
}

fn aux_set(cpu: &mut ArcCpu, addr: u32, val: u32) -> Result<u64, Stop> {
    match addr {
        AUX_STATUS32 => cpu.set_status32(val),
        AUX_INT_VECTOR_BASE => cpu.int_vector_base = val & !0x3ff,
        AUX_ERET => cpu.eret = val,
        AUX_ERBTA => cpu.erbta = val,
        AUX_ECR => cpu.ecr = val,
        AUX_EFA => cpu.efa = val,
        AUX_BTA => cpu.bta = val,
        _ => return Err(bad_aux(addr)),
    }
    Ok(0)
}

/// Dispatch a helper call from generated code.
pub(crate) fn call(cpu: &mut ArcCpu, id: u16, args: &[u64]) -> Result<u64, Stop> {
    let h = match Helper::from_raw(id) {
        Some(h) => h,
        None => panic!("unknown helper id {id}"),
    };
    let arg = |i: usize| args[i] as u32;
    match h {
        Helper::Raise => Err(Stop::exception(arg(0), arg(1), arg(2))),

        Helper::Div => {
            let (a, b) = (arg(0) as i32, arg(1) as i32);
            if b == 0 {
                return Err(div_zero());
            }
            Ok(a.wrapping_div(b) as u32 as u64)
        }
        Helper::Divu => {
            let (a, b) = (arg(0), arg(1));
            if b == 0 {
                return Err(div_zero());
            }
            Ok((a / b) as u64)
        }
        Helper::Rem => {
            let (a, b) = (arg(0) as i32, arg(1) as i32);
            if b == 0 {
                return Err(div_zero());
            }
            Ok(a.wrapping_rem(b) as u32 as u64)
        }
        Helper::Remu => {
            let (a, b) = (arg(0), arg(1));
            if b == 0 {
                return Err(div_zero());
            }
            Ok((a % b) as u64)
        }

        Helper::Flag => {
            let v = arg(0);
            // Only the flag bits are writable this way; the delay
            // and loop bits are not.
            cpu.zf = (v & STATUS32_Z != 0) as u32;
            cpu.nf = (v & STATUS32_N != 0) as u32;
            cpu.cf = (v & STATUS32_C != 0) as u32;
            cpu.vf = (v & STATUS32_V != 0) as u32;
            cpu.ef = (v & STATUS32_E != 0) as u32;
            if v & STATUS32_H != 0 {
                cpu.hf = 1;
                return Err(Stop::Halt);
            }
            Ok(0)
        }

        Helper::AuxGet => aux_get(cpu, arg(0)),
        Helper::AuxSet => aux_set(cpu, arg(0), arg(1)),

        Helper::Sleep => {
            cpu.hf = 1;
            Err(Stop::Halt)
        }
        Helper::Brk => Err(Stop::Debug),
    }
}
