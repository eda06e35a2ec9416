//! Bytecode interpreter.
//!
//! Executes one artifact against a CPU environment and guest memory.
//! Global virtual registers are loaded from the CPU at entry and
//! written back at every point the CPU state becomes observable: exit,
//! helper calls and guest memory faults. After a helper stops
//! execution the helper's own state mutations must survive, so no
//! write-back happens on that path.

use dbt_core::env::CpuEnv;
use dbt_core::stop::Stop;
use dbt_core::types::{Cond, MemOp};

use crate::bytecode::{unpack, Artifact, BcOp, X_V32, X_VECE, X_W64};
use crate::mem::GuestMemory;
use crate::ExecObserver;

fn width_mask(x: u8) -> u64 {
    if x & X_W64 != 0 {
        u64::MAX
    } else {
        0xffff_ffff
    }
}

fn sext(v: u64, x: u8) -> i64 {
    if x & X_W64 != 0 {
        v as i64
    } else {
        v as u32 as i32 as i64
    }
}

fn cond_true(x: u8, a: u64, b: u64) -> bool {
    let cond = match Cond::from_raw((x & !X_W64) as u32) {
        Some(c) => c,
        None => panic!("corrupt condition code {:#x}", x & !X_W64),
    };
    let m = width_mask(x);
    let (ua, ub) = (a & m, b & m);
    let (sa, sb) = (sext(a, x), sext(b, x));
    match cond {
        Cond::Never => false,
        Cond::Always => true,
        Cond::Eq => ua == ub,
        Cond::Ne => ua != ub,
        Cond::Lt => sa < sb,
        Cond::Ge => sa >= sb,
        Cond::Le => sa <= sb,
        Cond::Gt => sa > sb,
        Cond::Ltu => ua < ub,
        Cond::Geu => ua >= ub,
        Cond::Leu => ua <= ub,
        Cond::Gtu => ua > ub,
        Cond::TstEq => ua & ub == 0,
        Cond::TstNe => ua & ub != 0,
    }
}

fn shift_amount(b: u64, x: u8) -> u32 {
    (b as u32) & (if x & X_W64 != 0 { 63 } else { 31 })
}

// Vector shape from the x field: (lane bits, lane count, lane mask).
fn vec_shape(x: u8) -> (u32, u32, u64) {
    let lane_bits = 8u32 << (x & X_VECE);
    let total = if x & X_V32 != 0 { 32 } else { 64 };
    let lanes = total / lane_bits;
    let lane_mask = if lane_bits == 64 {
        u64::MAX
    } else {
        (1u64 << lane_bits) - 1
    };
    (lane_bits, lanes, lane_mask)
}

fn lanewise2(a: u64, b: u64, x: u8, f: impl Fn(u64, u64, u32) -> u64) -> u64 {
    let (lane_bits, lanes, lm) = vec_shape(x);
    let mut res = 0u64;
    for i in 0..lanes {
        let sh = i * lane_bits;
        let la = (a >> sh) & lm;
        let lb = (b >> sh) & lm;
        res |= (f(la, lb, lane_bits) & lm) << sh;
    }
    res
}

fn lanewise1(a: u64, x: u8, f: impl Fn(u64, u32) -> u64) -> u64 {
    lanewise2(a, 0, x, |la, _, bits| f(la, bits))
}

// Sign-extend one lane value to i64.
fn lane_sext(v: u64, bits: u32) -> i64 {
    let sh = 64 - bits;
    ((v << sh) as i64) >> sh
}

/// Run one artifact to its exit. The return value is the `Exit` op's
/// argument (goto-tb slot or exit code).
pub fn execute<E: CpuEnv>(
    art: &Artifact,
    env: &mut E,
    mem: &mut GuestMemory,
    obs: &mut dyn ExecObserver,
) -> Result<u64, Stop> {
    let mut vregs = vec![0u64; art.nb_vregs as usize];
    for g in &art.globals {
        vregs[g.vreg as usize] = env.read_field(g.offset);
    }

    let code = &art.code;
    let mut pc = 0usize;
    let mut cur_insn: Option<u32> = None;

    macro_rules! sync_out {
        () => {
            for g in &art.globals {
                env.write_field(g.offset, vregs[g.vreg as usize]);
            }
        };
    }

    loop {
        debug_assert!(pc < code.len(), "ran off the end of the bytecode");
        let w = code[pc];
        let (op, r0, r1, r2, x) = unpack(w);
        let m = width_mask(x);
        pc += 1;

        match op {
            BcOp::Nop => {}
            BcOp::Movi => {
                vregs[r0] = code[pc] & m;
                pc += 1;
            }
            BcOp::Mov => vregs[r0] = vregs[r1] & m,
            BcOp::SetCond => {
                vregs[r0] = cond_true(x, vregs[r1], vregs[r2]) as u64;
            }
            BcOp::MovCond => {
                let w1 = code[pc];
                pc += 1;
                let v1 = (w1 & 0xffff) as usize;
                let v2 = (w1 >> 16 & 0xffff) as usize;
                let src = if cond_true(x, vregs[r1], vregs[r2]) {
                    v1
                } else {
                    v2
                };
                vregs[r0] = vregs[src] & m;
            }

            BcOp::Add => vregs[r0] = vregs[r1].wrapping_add(vregs[r2]) & m,
            BcOp::Sub => vregs[r0] = vregs[r1].wrapping_sub(vregs[r2]) & m,
            BcOp::Mul => vregs[r0] = vregs[r1].wrapping_mul(vregs[r2]) & m,
            BcOp::MulSH => {
                vregs[r0] = if x & X_W64 != 0 {
                    let p = vregs[r1] as i64 as i128 * vregs[r2] as i64 as i128;
                    (p >> 64) as u64
                } else {
                    let p = vregs[r1] as u32 as i32 as i64 * vregs[r2] as u32 as i32 as i64;
                    (p >> 32) as u64 & m
                };
            }
            BcOp::MulUH => {
                vregs[r0] = if x & X_W64 != 0 {
                    let p = vregs[r1] as u128 * vregs[r2] as u128;
                    (p >> 64) as u64
                } else {
                    let p = (vregs[r1] & m) * (vregs[r2] & m);
                    (p >> 32) & m
                };
            }
            BcOp::Neg => vregs[r0] = vregs[r1].wrapping_neg() & m,
            BcOp::And => vregs[r0] = vregs[r1] & vregs[r2] & m,
            BcOp::Or => vregs[r0] = (vregs[r1] | vregs[r2]) & m,
            BcOp::Xor => vregs[r0] = (vregs[r1] ^ vregs[r2]) & m,
            BcOp::Not => vregs[r0] = !vregs[r1] & m,
            BcOp::AndC => vregs[r0] = vregs[r1] & !vregs[r2] & m,
            BcOp::OrC => vregs[r0] = (vregs[r1] | !vregs[r2]) & m,

            BcOp::Shl => vregs[r0] = (vregs[r1] << shift_amount(vregs[r2], x)) & m,
            BcOp::Shr => vregs[r0] = (vregs[r1] & m) >> shift_amount(vregs[r2], x),
            BcOp::Sar => {
                let sh = shift_amount(vregs[r2], x);
                vregs[r0] = (sext(vregs[r1], x) >> sh) as u64 & m;
            }
            BcOp::RotL => {
                vregs[r0] = if x & X_W64 != 0 {
                    vregs[r1].rotate_left(vregs[r2] as u32 & 63)
                } else {
                    (vregs[r1] as u32).rotate_left(vregs[r2] as u32 & 31) as u64
                };
            }
            BcOp::RotR => {
                vregs[r0] = if x & X_W64 != 0 {
                    vregs[r1].rotate_right(vregs[r2] as u32 & 63)
                } else {
                    (vregs[r1] as u32).rotate_right(vregs[r2] as u32 & 31) as u64
                };
            }

            BcOp::Extract | BcOp::SExtract => {
                let w1 = code[pc];
                pc += 1;
                let ofs = (w1 & 0xff) as u32;
                let len = (w1 >> 8 & 0xff) as u32;
                let fm = if len >= 64 {
                    u64::MAX
                } else {
                    (1u64 << len) - 1
                };
                let mut v = (vregs[r1] >> ofs) & fm;
                if op == BcOp::SExtract {
                    let sh = 64 - len;
                    v = ((v << sh) as i64 >> sh) as u64;
                }
                vregs[r0] = v & m;
            }
            BcOp::Deposit => {
                let w1 = code[pc];
                pc += 1;
                let ofs = (w1 & 0xff) as u32;
                let len = (w1 >> 8 & 0xff) as u32;
                let fm = if len >= 64 {
                    u64::MAX
                } else {
                    (1u64 << len) - 1
                };
                vregs[r0] =
                    ((vregs[r1] & !(fm << ofs)) | ((vregs[r2] & fm) << ofs)) & m;
            }

            BcOp::Clz => {
                let v = vregs[r1] & m;
                vregs[r0] = if v == 0 {
                    vregs[r2] & m
                } else if x & X_W64 != 0 {
                    v.leading_zeros() as u64
                } else {
                    (v as u32).leading_zeros() as u64
                };
            }
            BcOp::Ctz => {
                let v = vregs[r1] & m;
                vregs[r0] = if v == 0 {
                    vregs[r2] & m
                } else {
                    v.trailing_zeros() as u64
                };
            }
            BcOp::CtPop => vregs[r0] = (vregs[r1] & m).count_ones() as u64,

            BcOp::GuestLd => {
                let mop = MemOp(r2 as u16);
                match mem.load(vregs[r1] as u32, mop) {
                    Ok(v) => vregs[r0] = v & m,
                    Err(e) => {
                        sync_out!();
                        return Err(e);
                    }
                }
            }
            BcOp::GuestSt => {
                let mop = MemOp(r2 as u16);
                if let Err(e) = mem.store(vregs[r1] as u32, vregs[r0], mop) {
                    sync_out!();
                    return Err(e);
                }
            }

            BcOp::Br => pc = code[pc] as usize,
            BcOp::BrCond => {
                if cond_true(x, vregs[r0], vregs[r1]) {
                    pc = code[pc] as usize;
                } else {
                    pc += 1;
                }
            }
            BcOp::Exit => {
                sync_out!();
                if let Some(p) = cur_insn {
                    obs.insn_end(p);
                }
                return Ok(code[pc]);
            }

            BcOp::Call => {
                let w1 = code[pc];
                pc += 1;
                let mut args = [0u64; 4];
                for (i, slot) in args.iter_mut().take(r2).enumerate() {
                    *slot = vregs[(w1 >> (16 * i) & 0xffff) as usize];
                }
                sync_out!();
                let ret = env.call_helper(r1 as u16, &args[..r2])?;
                for g in &art.globals {
                    vregs[g.vreg as usize] = env.read_field(g.offset);
                }
                vregs[r0] = ret & m;
            }

            BcOp::InsnStart => {
                let guest_pc = code[pc] as u32;
                pc += 1;
                if let Some(p) = cur_insn {
                    obs.insn_end(p);
                }
                obs.insn_start(guest_pc);
                cur_insn = Some(guest_pc);
            }

            BcOp::DupVec => {
                let (lane_bits, lanes, lm) = vec_shape(x);
                let lane = vregs[r1] & lm;
                let mut res = 0u64;
                for i in 0..lanes {
                    res |= lane << (i * lane_bits);
                }
                vregs[r0] = res;
            }
            BcOp::Pack2Vec => {
                vregs[r0] = (vregs[r1] & 0xffff_ffff) | (vregs[r2] << 32);
            }
            BcOp::ExtrlVec => vregs[r0] = vregs[r1] & 0xffff_ffff,
            BcOp::ExtrhVec => vregs[r0] = vregs[r1] >> 32,

            BcOp::AddVec => {
                vregs[r0] = lanewise2(vregs[r1], vregs[r2], x, |a, b, _| a.wrapping_add(b));
            }
            BcOp::SubVec => {
                vregs[r0] = lanewise2(vregs[r1], vregs[r2], x, |a, b, _| a.wrapping_sub(b));
            }
            BcOp::NegVec => {
                vregs[r0] = lanewise1(vregs[r1], x, |a, _| a.wrapping_neg());
            }
            BcOp::AbsVec => {
                vregs[r0] = lanewise1(vregs[r1], x, |a, bits| {
                    lane_sext(a, bits).unsigned_abs()
                });
            }
            BcOp::SminVec => {
                vregs[r0] = lanewise2(vregs[r1], vregs[r2], x, |a, b, bits| {
                    lane_sext(a, bits).min(lane_sext(b, bits)) as u64
                });
            }
            BcOp::UminVec => {
                vregs[r0] = lanewise2(vregs[r1], vregs[r2], x, |a, b, _| a.min(b));
            }
            BcOp::SmaxVec => {
                vregs[r0] = lanewise2(vregs[r1], vregs[r2], x, |a, b, bits| {
                    lane_sext(a, bits).max(lane_sext(b, bits)) as u64
                });
            }
            BcOp::UmaxVec => {
                vregs[r0] = lanewise2(vregs[r1], vregs[r2], x, |a, b, _| a.max(b));
            }
        }
    }
}
