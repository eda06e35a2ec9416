//! Fundamental IR value types, condition codes and memory-op descriptors.

/// IR value type of a temp or op.
///
/// `I32` is the guest word; `I64` exists for widening arithmetic.
/// `V32`/`V64` are the packed-SIMD types (lane width is carried per-op
/// by the `vece` attribute, lane count falls out of the vector size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    I32,
    I64,
    V32,
    V64,
}

/// Number of distinct `Type` values (const-pool table dimension).
pub const TYPE_COUNT: usize = 4;

impl Type {
    pub fn index(self) -> usize {
        match self {
            Type::I32 => 0,
            Type::I64 => 1,
            Type::V32 => 2,
            Type::V64 => 3,
        }
    }

    pub fn size_bits(self) -> u32 {
        match self {
            Type::I32 | Type::V32 => 32,
            Type::I64 | Type::V64 => 64,
        }
    }

    pub fn is_vector(self) -> bool {
        matches!(self, Type::V32 | Type::V64)
    }

    /// Lane count of a vector type for a given element-width log2.
    ///
    /// `vece` 0/1/2 selects 8/16/32-bit lanes.
    pub fn lanes(self, vece: u8) -> u32 {
        debug_assert!(self.is_vector());
        debug_assert!(vece <= 2);
        self.size_bits() / (8 << vece)
    }

    /// Mask covering a value of this type in a host word.
    pub fn mask(self) -> u64 {
        match self.size_bits() {
            32 => 0xffff_ffff,
            _ => u64::MAX,
        }
    }
}

/// Comparison condition for setcond/movcond/brcond.
///
/// The encoding groups signed/unsigned/test variants so that `invert`
/// is a single bit flip, as in the reference engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Cond {
    Never = 0,
    Always = 1,
    Eq = 8,
    Ne = 9,
    Lt = 10,
    Ge = 11,
    Le = 12,
    Gt = 13,
    Ltu = 14,
    Geu = 15,
    Leu = 16,
    Gtu = 17,
    TstEq = 18,
    TstNe = 19,
}

impl Cond {
    pub fn from_raw(v: u32) -> Option<Cond> {
        Some(match v {
            0 => Cond::Never,
            1 => Cond::Always,
            8 => Cond::Eq,
            9 => Cond::Ne,
            10 => Cond::Lt,
            11 => Cond::Ge,
            12 => Cond::Le,
            13 => Cond::Gt,
            14 => Cond::Ltu,
            15 => Cond::Geu,
            16 => Cond::Leu,
            17 => Cond::Gtu,
            18 => Cond::TstEq,
            19 => Cond::TstNe,
            _ => return None,
        })
    }

    /// Logical negation: `invert(lt) == ge`.
    pub fn invert(self) -> Cond {
        // All pairs differ in the low bit; Never/Always included.
        Cond::from_raw(self as u32 ^ 1).unwrap()
    }

    /// Condition after swapping the two operands: `swap(lt) == gt`.
    pub fn swap(self) -> Cond {
        match self {
            Cond::Lt => Cond::Gt,
            Cond::Ge => Cond::Le,
            Cond::Le => Cond::Ge,
            Cond::Gt => Cond::Lt,
            Cond::Ltu => Cond::Gtu,
            Cond::Geu => Cond::Leu,
            Cond::Leu => Cond::Geu,
            Cond::Gtu => Cond::Ltu,
            other => other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Cond::Never => "never",
            Cond::Always => "always",
            Cond::Eq => "eq",
            Cond::Ne => "ne",
            Cond::Lt => "lt",
            Cond::Ge => "ge",
            Cond::Le => "le",
            Cond::Gt => "gt",
            Cond::Ltu => "ltu",
            Cond::Geu => "geu",
            Cond::Leu => "leu",
            Cond::Gtu => "gtu",
            Cond::TstEq => "tsteq",
            Cond::TstNe => "tstne",
        }
    }
}

/// Guest memory operation descriptor, bit-packed into a `u16` carg.
///
/// Bits 0-1: size log2; bit 2: sign-extend; bit 3: require natural
/// alignment. Byte-swapped accesses are not modeled (little-endian
/// guest on little-endian bytecode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemOp(pub u16);

impl MemOp {
    pub const SIZE_8: u16 = 0;
    pub const SIZE_16: u16 = 1;
    pub const SIZE_32: u16 = 2;
    pub const SIZE_64: u16 = 3;
    pub const SIZE_MASK: u16 = 0x3;
    pub const SIGN: u16 = 1 << 2;
    pub const ALIGN: u16 = 1 << 3;

    pub fn ub() -> MemOp {
        MemOp(Self::SIZE_8)
    }
    pub fn sb() -> MemOp {
        MemOp(Self::SIZE_8 | Self::SIGN)
    }
    pub fn uw() -> MemOp {
        MemOp(Self::SIZE_16 | Self::ALIGN)
    }
    pub fn sw() -> MemOp {
        MemOp(Self::SIZE_16 | Self::SIGN | Self::ALIGN)
    }
    pub fn ul() -> MemOp {
        MemOp(Self::SIZE_32 | Self::ALIGN)
    }
    pub fn uq() -> MemOp {
        MemOp(Self::SIZE_64 | Self::ALIGN)
    }

    pub fn size_bytes(self) -> u32 {
        1 << (self.0 & Self::SIZE_MASK)
    }

    pub fn sign_extend(self) -> bool {
        self.0 & Self::SIGN != 0
    }

    pub fn aligned(self) -> bool {
        self.0 & Self::ALIGN != 0
    }
}
