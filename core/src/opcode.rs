//! IR opcode set and the static opcode definition table.
//!
//! The opcode set is closed: every variant here has an encoder case in
//! the bytecode backend and an interpreter implementation. Adding an
//! opcode without both is caught by the backend's exhaustive matches.

use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    // Control / meta
    Nop,
    Discard,
    InsnStart,
    SetLabel,
    Br,
    BrCond,
    GotoTb,
    ExitTb,
    Call,

    // Moves and conditionals
    Mov,
    SetCond,
    MovCond,

    // Arithmetic
    Add,
    Sub,
    Mul,
    MulSH,
    MulUH,
    Neg,

    // Logicals
    And,
    Or,
    Xor,
    Not,
    AndC,
    OrC,

    // Shifts and rotates
    Shl,
    Shr,
    Sar,
    RotL,
    RotR,

    // Bit fields and bit counting
    Extract,
    SExtract,
    Deposit,
    Clz,
    Ctz,
    CtPop,

    // Guest memory
    GuestLd,
    GuestSt,

    // Vector (element width per-op via `vece`)
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
    AndVec,
    OrVec,
    XorVec,
    NotVec,
}

/// Opcode attribute flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpFlags(pub u8);

impl OpFlags {
    pub const NONE: OpFlags = OpFlags(0);
    /// Ends an extended basic block (EBB temps die here).
    pub const BB_END: OpFlags = OpFlags(1 << 0);
    /// Leaves the translation unit.
    pub const BB_EXIT: OpFlags = OpFlags(1 << 1);
    /// Has side effects beyond its outputs (never dead-code removable).
    pub const SIDE_EFFECTS: OpFlags = OpFlags(1 << 2);
    /// Helper call; argument counts come from the op, not the def.
    pub const CALL: OpFlags = OpFlags(1 << 3);
    /// Operates on vector types.
    pub const VECTOR: OpFlags = OpFlags(1 << 4);

    pub fn contains(self, other: OpFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: OpFlags) -> OpFlags {
        OpFlags(self.0 | other.0)
    }
}

/// Static definition of one opcode: name and fixed argument counts.
#[derive(Debug, Clone, Copy)]
pub struct OpDef {
    pub name: &'static str,
    pub nb_oargs: u8,
    pub nb_iargs: u8,
    pub nb_cargs: u8,
    pub flags: OpFlags,
}

impl OpDef {
    const fn new(name: &'static str, o: u8, i: u8, c: u8, flags: OpFlags) -> OpDef {
        OpDef {
            name,
            nb_oargs: o,
            nb_iargs: i,
            nb_cargs: c,
            flags,
        }
    }
}

const N: OpFlags = OpFlags::NONE;
const SE: OpFlags = OpFlags::SIDE_EFFECTS;
const V: OpFlags = OpFlags::VECTOR;
const END: OpFlags = OpFlags::BB_END;
const EXIT: OpFlags = OpFlags::BB_END.union(OpFlags::BB_EXIT).union(OpFlags::SIDE_EFFECTS);

static OPCODE_DEFS: &[OpDef] = &[
    OpDef::new("nop", 0, 0, 0, N),
    OpDef::new("discard", 1, 0, 0, N),
    OpDef::new("insn_start", 0, 0, 1, SE),
    OpDef::new("set_label", 0, 0, 1, OpFlags::BB_END.union(SE)),
    OpDef::new("br", 0, 0, 1, END.union(SE)),
    OpDef::new("brcond", 0, 2, 2, END.union(SE)),
    OpDef::new("goto_tb", 0, 0, 1, EXIT),
    OpDef::new("exit_tb", 0, 0, 1, EXIT),
    OpDef::new("call", 1, 0, 2, OpFlags::CALL.union(SE)),
    OpDef::new("mov", 1, 1, 0, N),
    OpDef::new("setcond", 1, 2, 1, N),
    OpDef::new("movcond", 1, 4, 1, N),
    OpDef::new("add", 1, 2, 0, N),
    OpDef::new("sub", 1, 2, 0, N),
    OpDef::new("mul", 1, 2, 0, N),
    OpDef::new("mulsh", 1, 2, 0, N),
    OpDef::new("muluh", 1, 2, 0, N),
    OpDef::new("neg", 1, 1, 0, N),
    OpDef::new("and", 1, 2, 0, N),
    OpDef::new("or", 1, 2, 0, N),
    OpDef::new("xor", 1, 2, 0, N),
    OpDef::new("not", 1, 1, 0, N),
    OpDef::new("andc", 1, 2, 0, N),
    OpDef::new("orc", 1, 2, 0, N),
    OpDef::new("shl", 1, 2, 0, N),
    OpDef::new("shr", 1, 2, 0, N),
    OpDef::new("sar", 1, 2, 0, N),
    OpDef::new("rotl", 1, 2, 0, N),
    OpDef::new("rotr", 1, 2, 0, N),
    OpDef::new("extract", 1, 1, 2, N),
    OpDef::new("sextract", 1, 1, 2, N),
    OpDef::new("deposit", 1, 2, 2, N),
    OpDef::new("clz", 1, 2, 0, N),
    OpDef::new("ctz", 1, 2, 0, N),
    OpDef::new("ctpop", 1, 1, 0, N),
    OpDef::new("qemu_ld", 1, 1, 1, SE),
    OpDef::new("qemu_st", 0, 2, 1, SE),
    OpDef::new("dup_vec", 1, 1, 0, V),
    OpDef::new("pack2_vec", 1, 2, 0, V),
    OpDef::new("extrl_vec", 1, 1, 0, V),
    OpDef::new("extrh_vec", 1, 1, 0, V),
    OpDef::new("add_vec", 1, 2, 0, V),
    OpDef::new("sub_vec", 1, 2, 0, V),
    OpDef::new("neg_vec", 1, 1, 0, V),
    OpDef::new("abs_vec", 1, 1, 0, V),
    OpDef::new("smin_vec", 1, 2, 0, V),
    OpDef::new("umin_vec", 1, 2, 0, V),
    OpDef::new("smax_vec", 1, 2, 0, V),
    OpDef::new("umax_vec", 1, 2, 0, V),
    OpDef::new("and_vec", 1, 2, 0, V),
    OpDef::new("or_vec", 1, 2, 0, V),
    OpDef::new("xor_vec", 1, 2, 0, V),
    OpDef::new("not_vec", 1, 1, 0, V),
];

impl Opcode {
    pub fn def(self) -> &'static OpDef {
        &OPCODE_DEFS[self as usize]
    }

    pub fn is_vector(self) -> bool {
        self.def().flags.contains(OpFlags::VECTOR)
    }

    /// Integer ops that take an `_i32`/`_i64` suffix in dumps.
    pub fn is_int_polymorphic(self) -> bool {
        let f = self.def().flags;
        !f.contains(OpFlags::VECTOR)
            && !matches!(
                self,
                Opcode::Nop
                    | Opcode::Discard
                    | Opcode::InsnStart
                    | Opcode::SetLabel
                    | Opcode::Br
                    | Opcode::GotoTb
                    | Opcode::ExitTb
                    | Opcode::Call
            )
    }

    /// Default value type for ops whose type is implied.
    pub fn fixed_type(self) -> Option<Type> {
        match self {
            Opcode::Nop
            | Opcode::InsnStart
            | Opcode::SetLabel
            | Opcode::Br
            | Opcode::GotoTb
            | Opcode::ExitTb => Some(Type::I32),
            _ => None,
        }
    }
}
