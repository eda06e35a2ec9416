//! IR temporaries.

use crate::types::Type;

/// Index of a temp in the per-unit arena. Doubles as the virtual
/// register number in the lowered bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempIdx(pub u32);

/// Lifetime/storage class of a temp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempKind {
    /// Dies at the end of an extended basic block.
    Ebb,
    /// Live for the whole translation unit.
    Tb,
    /// Backed by a guest CPU field; synced at unit and call boundaries.
    Global,
    /// Immediate value, deduplicated per (type, value).
    Const,
}

#[derive(Debug, Clone)]
pub struct Temp {
    pub idx: TempIdx,
    pub ty: Type,
    pub kind: TempKind,
    /// Value for `Const` temps.
    pub val: u64,
    /// Byte offset of the backing CPU field for `Global` temps.
    pub mem_offset: u32,
    pub name: Option<&'static str>,
}

impl Temp {
    pub fn new(idx: TempIdx, ty: Type, kind: TempKind) -> Temp {
        Temp {
            idx,
            ty,
            kind,
            val: 0,
            mem_offset: 0,
            name: None,
        }
    }
}
