//! Bytecode encoding.
//!
//! One or two `u64` words per op. Word 0 packs an 8-bit opcode, three
//! 16-bit virtual-register indices (r0/r1/r2) and an 8-bit extra
//! field `x` (condition code or vector shape, plus the width bit).
//! Word 1, when the op takes one, is a 64-bit immediate, a packed
//! field descriptor, or an absolute word target for branches.
//!
//! Temps map 1:1 onto virtual registers (vreg index = temp index).
//! Constants are materialized by a prologue of `Movi` words so that a
//! first use under a false predication guard can never skip them.

use dbt_core::context::Context;
use dbt_core::label::{Label, RelocKind};
use dbt_core::opcode::Opcode;
use dbt_core::temp::TempKind;
use dbt_core::types::Type;

/// Scalar width bit in `x`: set = 64-bit, clear = 32-bit.
pub const X_W64: u8 = 0x80;
/// Vector total-width bit in `x`: set = 32-bit vector, clear = 64.
pub const X_V32: u8 = 0x10;
/// Vector element-width mask in `x`.
pub const X_VECE: u8 = 0x03;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BcOp {
    Nop = 0,
    Movi,
    Mov,
    SetCond,
    MovCond,
    Add,
    Sub,
    Mul,
    MulSH,
    MulUH,
    Neg,
    And,
    Or,
    Xor,
    Not,
    AndC,
    OrC,
    Shl,
    Shr,
    Sar,
    RotL,
    RotR,
    Extract,
    SExtract,
    Deposit,
    Clz,
    Ctz,
    CtPop,
    GuestLd,
    GuestSt,
    Br,
    BrCond,
    Exit,
    Call,
    InsnStart,
    DupVec,
    Pack2Vec,
    ExtrlVec,
    ExtrhVec,
    AddVec,
    SubVec,
    NegVec,
    AbsVec,
    SminVec,
    UminVec,
    SmaxVec,
    UmaxVec,
}

impl BcOp {
    pub fn from_u8(v: u8) -> BcOp {
        match v {
            0 => BcOp::Nop,
            1 => BcOp::Movi,
            2 => BcOp::Mov,
            3 => BcOp::SetCond,
            4 => BcOp::MovCond,
            5 => BcOp::Add,
            6 => BcOp::Sub,
            7 => BcOp::Mul,
            8 => BcOp::MulSH,
            9 => BcOp::MulUH,
            10 => BcOp::Neg,
            11 => BcOp::And,
            12 => BcOp::Or,
            13 => BcOp::Xor,
            14 => BcOp::Not,
            15 => BcOp::AndC,
            16 => BcOp::OrC,
            17 => BcOp::Shl,
            18 => BcOp::Shr,
            19 => BcOp::Sar,
            20 => BcOp::RotL,
            21 => BcOp::RotR,
            22 => BcOp::Extract,
            23 => BcOp::SExtract,
            24 => BcOp::Deposit,
            25 => BcOp::Clz,
            26 => BcOp::Ctz,
            27 => BcOp::CtPop,
            28 => BcOp::GuestLd,
            29 => BcOp::GuestSt,
            30 => BcOp::Br,
            31 => BcOp::BrCond,
            32 => BcOp::Exit,
            33 => BcOp::Call,
            34 => BcOp::InsnStart,
            35 => BcOp::DupVec,
            36 => BcOp::Pack2Vec,
            37 => BcOp::ExtrlVec,
            38 => BcOp::ExtrhVec,
            39 => BcOp::AddVec,
            40 => BcOp::SubVec,
            41 => BcOp::NegVec,
            42 => BcOp::AbsVec,
            43 => BcOp::SminVec,
            44 => BcOp::UminVec,
            45 => BcOp::SmaxVec,
            46 => BcOp::UmaxVec,
            _ => panic!("corrupt bytecode opcode {v}"),
        }
    }
}

pub fn pack(op: BcOp, r0: u32, r1: u32, r2: u32, x: u8) -> u64 {
    debug_assert!(r0 <= 0xffff && r1 <= 0xffff && r2 <= 0xffff);
    op as u64 | (r0 as u64) << 8 | (r1 as u64) << 24 | (r2 as u64) << 40 | (x as u64) << 56
}

/// (op, r0, r1, r2, x)
pub fn unpack(w: u64) -> (BcOp, usize, usize, usize, u8) {
    (
        BcOp::from_u8((w & 0xff) as u8),
        (w >> 8 & 0xffff) as usize,
        (w >> 24 & 0xffff) as usize,
        (w >> 40 & 0xffff) as usize,
        (w >> 56) as u8,
    )
}

/// One global-temp binding: virtual register ↔ CPU field offset.
#[derive(Debug, Clone, Copy)]
pub struct GlobalBind {
    pub vreg: u16,
    pub offset: u32,
}

/// The executable form of a translation unit.
#[derive(Debug)]
pub struct Artifact {
    pub code: Vec<u64>,
    pub nb_vregs: u32,
    /// Synced env→vreg at entry, vreg→env at exit and around calls.
    pub globals: Vec<GlobalBind>,
}

fn scalar_x(ty: Type) -> u8 {
    match ty {
        Type::I64 | Type::V64 => X_W64,
        Type::I32 | Type::V32 => 0,
    }
}

fn vec_x(ty: Type, vece: u8) -> u8 {
    let size = if ty == Type::V32 { X_V32 } else { 0 };
    size | (vece & X_VECE)
}

/// Encode a finished IR context.
pub fn encode(ctx: &Context) -> Artifact {
    let mut code: Vec<u64> = Vec::with_capacity(ctx.ops().len() * 2);
    let mut labels: Vec<Label> = ctx.labels().to_vec();
    let mut globals = Vec::new();

    // Constant prologue + global sync table.
    for t in ctx.temps() {
        match t.kind {
            TempKind::Const => {
                code.push(pack(BcOp::Movi, t.idx.0, 0, 0, scalar_x(t.ty)));
                code.push(t.val);
            }
            TempKind::Global => globals.push(GlobalBind {
                vreg: t.idx.0 as u16,
                offset: t.mem_offset,
            }),
            TempKind::Ebb | TempKind::Tb => {}
        }
    }

    for op in ctx.ops() {
        let a = op.args;
        let sx = scalar_x(op.ty);
        match op.opc {
            Opcode::Nop => {}
            Opcode::Discard => {
                code.push(pack(BcOp::Movi, a[0].0, 0, 0, sx));
                code.push(0);
            }
            Opcode::InsnStart => {
                code.push(pack(BcOp::InsnStart, 0, 0, 0, 0));
                code.push(op.cargs()[0].0 as u64);
            }
            Opcode::SetLabel => {
                labels[op.cargs()[0].0 as usize].set_value(code.len());
            }
            Opcode::Br => {
                let l = op.cargs()[0].0 as usize;
                code.push(pack(BcOp::Br, 0, 0, 0, 0));
                labels[l].add_use(code.len(), RelocKind::Word);
                code.push(0);
            }
            Opcode::BrCond => {
                let cond = op.cargs()[0].0 as u8;
                let l = op.cargs()[1].0 as usize;
                code.push(pack(BcOp::BrCond, a[0].0, a[1].0, 0, sx | cond));
                labels[l].add_use(code.len(), RelocKind::Word);
                code.push(0);
            }
            Opcode::GotoTb | Opcode::ExitTb => {
                code.push(pack(BcOp::Exit, 0, 0, 0, 0));
                code.push(op.cargs()[0].0 as u64);
            }
            Opcode::Call => {
                let helper = op.cargs()[0].0;
                let nargs = op.cargs()[1].0;
                code.push(pack(BcOp::Call, a[0].0, helper, nargs, sx));
                let mut packed = 0u64;
                for (i, arg) in op.iargs().iter().enumerate() {
                    debug_assert!(arg.0 <= 0xffff);
                    packed |= (arg.0 as u64) << (16 * i);
                }
                code.push(packed);
            }
            Opcode::Mov => code.push(pack(BcOp::Mov, a[0].0, a[1].0, 0, sx)),
            Opcode::SetCond => {
                let cond = op.cargs()[0].0 as u8;
                code.push(pack(BcOp::SetCond, a[0].0, a[1].0, a[2].0, sx | cond));
            }
            Opcode::MovCond => {
                let cond = op.cargs()[0].0 as u8;
                code.push(pack(BcOp::MovCond, a[0].0, a[1].0, a[2].0, sx | cond));
                code.push(a[3].0 as u64 | (a[4].0 as u64) << 16);
            }
            Opcode::Add => code.push(pack(BcOp::Add, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Sub => code.push(pack(BcOp::Sub, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Mul => code.push(pack(BcOp::Mul, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::MulSH => code.push(pack(BcOp::MulSH, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::MulUH => code.push(pack(BcOp::MulUH, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Neg => code.push(pack(BcOp::Neg, a[0].0, a[1].0, 0, sx)),
            Opcode::And => code.push(pack(BcOp::And, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Or => code.push(pack(BcOp::Or, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Xor => code.push(pack(BcOp::Xor, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Not => code.push(pack(BcOp::Not, a[0].0, a[1].0, 0, sx)),
            Opcode::AndC => code.push(pack(BcOp::AndC, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::OrC => code.push(pack(BcOp::OrC, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Shl => code.push(pack(BcOp::Shl, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Shr => code.push(pack(BcOp::Shr, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Sar => code.push(pack(BcOp::Sar, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::RotL => code.push(pack(BcOp::RotL, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::RotR => code.push(pack(BcOp::RotR, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Extract | Opcode::SExtract => {
                let bc = if op.opc == Opcode::Extract {
                    BcOp::Extract
                } else {
                    BcOp::SExtract
                };
                code.push(pack(bc, a[0].0, a[1].0, 0, sx));
                code.push(op.cargs()[0].0 as u64 | (op.cargs()[1].0 as u64) << 8);
            }
            Opcode::Deposit => {
                code.push(pack(BcOp::Deposit, a[0].0, a[1].0, a[2].0, sx));
                code.push(op.cargs()[0].0 as u64 | (op.cargs()[1].0 as u64) << 8);
            }
            Opcode::Clz => code.push(pack(BcOp::Clz, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::Ctz => code.push(pack(BcOp::Ctz, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::CtPop => code.push(pack(BcOp::CtPop, a[0].0, a[1].0, 0, sx)),
            Opcode::GuestLd => {
                let mop = op.cargs()[0].0;
                code.push(pack(BcOp::GuestLd, a[0].0, a[1].0, mop, sx));
            }
            Opcode::GuestSt => {
                let mop = op.cargs()[0].0;
                code.push(pack(BcOp::GuestSt, a[0].0, a[1].0, mop, sx));
            }
            // Lanewise logicals are width-agnostic; reuse the scalar
            // bitwise words at the vector's full width.
            Opcode::AndVec => code.push(pack(BcOp::And, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::OrVec => code.push(pack(BcOp::Or, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::XorVec => code.push(pack(BcOp::Xor, a[0].0, a[1].0, a[2].0, sx)),
            Opcode::NotVec => code.push(pack(BcOp::Not, a[0].0, a[1].0, 0, sx)),
            Opcode::DupVec => {
                code.push(pack(BcOp::DupVec, a[0].0, a[1].0, 0, vec_x(op.ty, op.vece)));
            }
            Opcode::Pack2Vec => {
                code.push(pack(BcOp::Pack2Vec, a[0].0, a[1].0, a[2].0, 0));
            }
            Opcode::ExtrlVec => code.push(pack(BcOp::ExtrlVec, a[0].0, a[1].0, 0, 0)),
            Opcode::ExtrhVec => code.push(pack(BcOp::ExtrhVec, a[0].0, a[1].0, 0, 0)),
            Opcode::AddVec => {
                code.push(pack(BcOp::AddVec, a[0].0, a[1].0, a[2].0, vec_x(op.ty, op.vece)));
            }
            Opcode::SubVec => {
                code.push(pack(BcOp::SubVec, a[0].0, a[1].0, a[2].0, vec_x(op.ty, op.vece)));
            }
            Opcode::NegVec => {
                code.push(pack(BcOp::NegVec, a[0].0, a[1].0, 0, vec_x(op.ty, op.vece)));
            }
            Opcode::AbsVec => {
                code.push(pack(BcOp::AbsVec, a[0].0, a[1].0, 0, vec_x(op.ty, op.vece)));
            }
            Opcode::SminVec => {
                code.push(pack(BcOp::SminVec, a[0].0, a[1].0, a[2].0, vec_x(op.ty, op.vece)));
            }
            Opcode::UminVec => {
                code.push(pack(BcOp::UminVec, a[0].0, a[1].0, a[2].0, vec_x(op.ty, op.vece)));
            }
            Opcode::SmaxVec => {
                code.push(pack(BcOp::SmaxVec, a[0].0, a[1].0, a[2].0, vec_x(op.ty, op.vece)));
            }
            Opcode::UmaxVec => {
                code.push(pack(BcOp::UmaxVec, a[0].0, a[1].0, a[2].0, vec_x(op.ty, op.vece)));
            }
        }
    }

    // Back-patch label uses to absolute word offsets.
    for l in &labels {
        if l.uses.is_empty() {
            continue;
        }
        assert!(l.has_value, "branch to unplaced label L{}", l.id);
        for u in &l.uses {
            match u.kind {
                RelocKind::Word => code[u.offset] = l.value as u64,
            }
        }
    }

    Artifact {
        code,
        nb_vregs: ctx.nb_temps(),
        globals,
    }
}
