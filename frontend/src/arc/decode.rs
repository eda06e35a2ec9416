//! ARC instruction decoder.
//!
//! Encodings are variable width: the 5-bit major opcode of the first
//! half-word selects 16-bit (major > 0x7) or 32-bit forms, and an
//! operand referencing r62 appends a 32-bit long immediate. Decoding
//! produces a closed `ArcOp` + operand record; any gap in a sub-table
//! yields `None` and the caller raises the guest invalid-instruction
//! exception at run time.

/// Condition-code field values (the `cc` operand of predicated forms).
pub mod cc {
    pub const AL: u8 = 0x00;
    pub const EQ: u8 = 0x01;
    pub const NE: u8 = 0x02;
    pub const PL: u8 = 0x03;
    pub const MI: u8 = 0x04;
    pub const CS: u8 = 0x05;
    pub const CC: u8 = 0x06;
    pub const VS: u8 = 0x07;
    pub const VC: u8 = 0x08;
    pub const GT: u8 = 0x09;
    pub const GE: u8 = 0x0a;
    pub const LT: u8 = 0x0b;
    pub const LE: u8 = 0x0c;
    pub const HI: u8 = 0x0d;
    pub const LS: u8 = 0x0e;
    pub const PNZ: u8 = 0x0f;
    pub const MAX: u8 = 0x0f;
}

/// One decoded operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(u8),
    Imm(i32),
    /// The long-immediate register r62; its value trails the encoding.
    Limm,
    None,
}

impl Operand {
    fn reg(r: u32) -> Operand {
        match r as u8 {
            62 => Operand::Limm,
            r => Operand::Reg(r),
        }
    }
}

/// Comparison of the compare-and-branch family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrCmpCond {
    Eq,
    Ne,
    Lt,
    Ge,
    Lo,
    Hs,
}

/// Closed operation set. Every variant has an emitter; the dispatch
/// match in `trans.rs` is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcOp {
    // Control transfer
    B,
    Bl,
    BrCmp(BrCmpCond),
    J { link: bool },
    // Memory
    Ld { zz: u8, x: bool, aa: u8 },
    St { zz: u8, aa: u8 },
    // ALU
    Add,
    Adc,
    Sub,
    Sbc,
    Rsub,
    Cmp,
    Tst,
    And,
    Or,
    Bic,
    Xor,
    Max,
    Min,
    Mov,
    Bset,
    Bclr,
    Btst,
    Bxor,
    Bmsk,
    Add1,
    Add2,
    Add3,
    Sub1,
    Sub2,
    Sub3,
    Mpy,
    Mpyh,
    Mpyhu,
    Mpyu,
    Asl,
    Lsr,
    Asr,
    Ror,
    Sexb,
    Sexw,
    Extb,
    Extw,
    Abs,
    Not,
    // Division (helper-backed, architected zero-divide fault)
    Div,
    Divu,
    Rem,
    Remu,
    // System
    Flag,
    Lr,
    Sr,
    Swi,
    Trap,
    Sleep,
    Brk,
    Nop,
    // Packed SIMD over register pairs / half-words
    Vadd2,
    Vadd2h,
    Vadd4h,
    Vsub2,
    Vsub2h,
    Vsub4h,
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy)]
pub struct DecodedInsn {
    pub op: ArcOp,
    /// Condition field; `cc::AL` executes unconditionally.
    pub cc: u8,
    /// F bit: update the status flags.
    pub f: bool,
    /// N bit: the following instruction is a delay slot.
    pub d: bool,
    pub operands: [Operand; 3],
    /// Encoding length in bytes (2 or 4), excluding a long immediate.
    pub len: u8,
}

impl DecodedInsn {
    pub(crate) fn new(op: ArcOp, len: u8) -> DecodedInsn {
        DecodedInsn {
            op,
            cc: cc::AL,
            f: false,
            d: false,
            operands: [Operand::None; 3],
            len,
        }
    }

    fn with_ops(mut self, ops: &[Operand]) -> DecodedInsn {
        self.operands[..ops.len()].copy_from_slice(ops);
        self
    }

    /// The encoding references r62 and needs a trailing long immediate.
    pub fn needs_limm(&self) -> bool {
        self.operands.contains(&Operand::Limm)
    }

    /// Total bytes fetched for this instruction.
    pub fn total_len(&self) -> u32 {
        self.len as u32 + if self.needs_limm() { 4 } else { 0 }
    }
}

/// Instruction length in bytes from the first half-word alone (never
/// counts the long immediate; that needs the decoded operands).
pub fn insn_length(halfword: u16) -> u32 {
    let major = halfword >> 11;
    if major > 0x7 {
        2
    } else {
        4
    }
}

fn sext(v: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((v << shift) as i32) >> shift
}

// 32-bit field extractors. Bit numbering follows the manual: the
// first half-word occupies bits 31:16.

fn field_b(w: u32) -> u32 {
    ((w >> 12) & 0x7) << 3 | (w >> 24) & 0x7
}

fn field_c(w: u32) -> u32 {
    (w >> 6) & 0x3f
}

fn field_a(w: u32) -> u32 {
    w & 0x3f
}

fn field_f(w: u32) -> bool {
    (w >> 15) & 1 != 0
}

fn field_u6(w: u32) -> u32 {
    (w >> 6) & 0x3f
}

fn field_s12(w: u32) -> i32 {
    sext((w & 0x3f) << 6 | (w >> 6) & 0x3f, 12)
}

/// Decode one instruction. For 16-bit forms only the low half-word of
/// `word` is meaningful; for 32-bit forms the first half-word is the
/// high half.
pub fn decode(word: u32, len: u32) -> Option<DecodedInsn> {
    if len == 2 {
        decode16(word as u16)
    } else {
        decode32(word)
    }
}

fn decode32(w: u32) -> Option<DecodedInsn> {
    let major = w >> 27;
    match major {
        0x00 => Some(decode_b(w)),
        0x01 => decode_bl_br(w),
        0x02 => decode_ld(w),
        0x03 => decode_st(w),
        0x04 => decode_alu(w, major),
        0x05 => decode_alu(w, major),
        _ => None,
    }
}

fn decode_b(w: u32) -> DecodedInsn {
    let mut di = DecodedInsn::new(ArcOp::B, 4);
    di.d = (w >> 5) & 1 != 0;
    let disp = if (w >> 16) & 1 == 0 {
        di.cc = (w & 0x1f) as u8;
        sext(((w >> 17) & 0x3ff) << 1 | ((w >> 6) & 0x3ff) << 11, 21)
    } else {
        sext(
            ((w >> 17) & 0x3ff) << 1 | ((w >> 6) & 0x3ff) << 11 | (w & 0xf) << 21,
            25,
        )
    };
    di.with_ops(&[Operand::Imm(disp)])
}

fn decode_bl_br(w: u32) -> Option<DecodedInsn> {
    if (w >> 16) & 1 == 0 {
        // BLcc / BL: targets are 32-bit aligned.
        let mut di = DecodedInsn::new(ArcOp::Bl, 4);
        di.d = (w >> 5) & 1 != 0;
        let disp = if (w >> 17) & 1 == 0 {
            di.cc = (w & 0x1f) as u8;
            sext(((w >> 18) & 0x1ff) << 2 | ((w >> 6) & 0x3ff) << 11, 21)
        } else {
            sext(
                ((w >> 18) & 0x1ff) << 2 | ((w >> 6) & 0x3ff) << 11 | (w & 0xf) << 21,
                25,
            )
        };
        Some(di.with_ops(&[Operand::Imm(disp)]))
    } else {
        // BRcc: compare two operands and branch. Sub-conditions 6/7
        // (bit-test branches) are not decoded.
        let raw = w & 0xf;
        if raw >= 8 {
            return None;
        }
        let cond = match raw & 0x7 {
            0 => BrCmpCond::Eq,
            1 => BrCmpCond::Ne,
            2 => BrCmpCond::Lt,
            3 => BrCmpCond::Ge,
            4 => BrCmpCond::Lo,
            5 => BrCmpCond::Hs,
            _ => return None,
        };
        let mut di = DecodedInsn::new(ArcOp::BrCmp(cond), 4);
        di.d = (w >> 5) & 1 != 0;
        let b = Operand::reg(field_b(w));
        let c = if (w >> 4) & 1 != 0 {
            Operand::Imm(field_u6(w) as i32)
        } else {
            Operand::reg(field_c(w))
        };
        let disp = sext(((w >> 17) & 0x7f) << 1 | ((w >> 15) & 1) << 8, 9);
        Some(di.with_ops(&[b, c, Operand::Imm(disp)]))
    }
}

fn decode_ld(w: u32) -> Option<DecodedInsn> {
    let zz = ((w >> 7) & 3) as u8;
    if zz == 3 {
        return None;
    }
    let x = (w >> 6) & 1 != 0;
    if x && zz == 0 {
        return None;
    }
    let aa = ((w >> 9) & 3) as u8;
    let s9 = sext((w >> 16) & 0xff | ((w >> 15) & 1) << 8, 9);
    let di = DecodedInsn::new(ArcOp::Ld { zz, x, aa }, 4);
    Some(di.with_ops(&[
        Operand::reg(field_a(w)),
        Operand::reg(field_b(w)),
        Operand::Imm(s9),
    ]))
}

fn decode_st(w: u32) -> Option<DecodedInsn> {
    if w & 1 != 0 {
        return None;
    }
    let zz = ((w >> 1) & 3) as u8;
    if zz == 3 {
        return None;
    }
    let aa = ((w >> 3) & 3) as u8;
    let s9 = sext((w >> 16) & 0xff | ((w >> 15) & 1) << 8, 9);
    let di = DecodedInsn::new(ArcOp::St { zz, aa }, 4);
    Some(di.with_ops(&[
        Operand::reg(field_c(w)),
        Operand::reg(field_b(w)),
        Operand::Imm(s9),
    ]))
}

/// Majors 0x04 and 0x05 share the operand formats; only the sub-opcode
/// table differs.
fn decode_alu(w: u32, major: u32) -> Option<DecodedInsn> {
    let sub = (w >> 16) & 0x3f;
    let fmt = (w >> 22) & 3;

    let op = if major == 0x04 {
        match sub {
            0x00 => ArcOp::Add,
            0x01 => ArcOp::Adc,
            0x02 => ArcOp::Sub,
            0x03 => ArcOp::Sbc,
            0x04 => ArcOp::And,
            0x05 => ArcOp::Or,
            0x06 => ArcOp::Bic,
            0x07 => ArcOp::Xor,
            0x08 => ArcOp::Max,
            0x09 => ArcOp::Min,
            0x0a => ArcOp::Mov,
            0x0b => ArcOp::Tst,
            0x0c => ArcOp::Cmp,
            0x0e => ArcOp::Rsub,
            0x0f => ArcOp::Bset,
            0x10 => ArcOp::Bclr,
            0x11 => ArcOp::Btst,
            0x12 => ArcOp::Bxor,
            0x13 => ArcOp::Bmsk,
            0x14 => ArcOp::Add1,
            0x15 => ArcOp::Add2,
            0x16 => ArcOp::Add3,
            0x17 => ArcOp::Sub1,
            0x18 => ArcOp::Sub2,
            0x19 => ArcOp::Sub3,
            0x1a => ArcOp::Mpy,
            0x1b => ArcOp::Mpyh,
            0x1c => ArcOp::Mpyhu,
            0x1d => ArcOp::Mpyu,
            0x20 | 0x21 => ArcOp::J { link: false },
            0x22 | 0x23 => ArcOp::J { link: true },
            0x29 => ArcOp::Flag,
            0x2a => ArcOp::Lr,
            0x2b => ArcOp::Sr,
            0x2f => return decode_sop(w),
            _ => return None,
        }
    } else {
        match sub {
            0x00 => ArcOp::Asl,
            0x01 => ArcOp::Lsr,
            0x02 => ArcOp::Asr,
            0x03 => ArcOp::Ror,
            0x04 => ArcOp::Div,
            0x05 => ArcOp::Divu,
            0x06 => ArcOp::Rem,
            0x07 => ArcOp::Remu,
            0x28 => ArcOp::Vadd2,
            0x29 => ArcOp::Vadd2h,
            0x2a => ArcOp::Vadd4h,
            0x2b => ArcOp::Vsub2,
            0x2c => ArcOp::Vsub2h,
            0x2d => ArcOp::Vsub4h,
            _ => return None,
        }
    };

    let mut di = DecodedInsn::new(op, 4);
    di.f = field_f(w);
    if matches!(op, ArcOp::J { .. }) {
        di.d = sub & 1 != 0;
    }
    let b = Operand::reg(field_b(w));

    // Operand layout per format: 00 reg-reg, 01 reg-u6, 10 reg-s12
    // (dest = b), 11 predicated (dest = b, cc in the low bits).
    let (dst, src1, src2) = match fmt {
        0 => (
            Operand::reg(field_a(w)),
            b,
            Operand::reg(field_c(w)),
        ),
        1 => (
            Operand::reg(field_a(w)),
            b,
            Operand::Imm(field_u6(w) as i32),
        ),
        2 => (b, b, Operand::Imm(field_s12(w))),
        _ => {
            let cond = (w & 0x1f) as u8;
            if cond > cc::MAX {
                return None;
            }
            di.cc = cond;
            let src2 = if (w >> 5) & 1 != 0 {
                Operand::Imm(field_u6(w) as i32)
            } else {
                Operand::reg(field_c(w))
            };
            (b, b, src2)
        }
    };

    Some(match op {
        // Two-operand moves/compares: no separate destination field.
        ArcOp::Mov => di.with_ops(&[dst, src2]),
        ArcOp::Tst | ArcOp::Btst | ArcOp::Cmp => di.with_ops(&[src1, src2]),
        ArcOp::Flag => di.with_ops(&[src2]),
        ArcOp::J { .. } => di.with_ops(&[src2]),
        ArcOp::Lr => di.with_ops(&[dst, src2]),
        ArcOp::Sr => di.with_ops(&[src1, src2]),
        _ => di.with_ops(&[dst, src1, src2]),
    })
}

/// Major 0x04 sub 0x2F: single-operand and zero-operand groups.
fn decode_sop(w: u32) -> Option<DecodedInsn> {
    let fmt = (w >> 22) & 3;
    if fmt >= 2 {
        return None;
    }
    let sub2 = field_a(w);
    let b = Operand::reg(field_b(w));
    let src = if fmt == 1 {
        Operand::Imm(field_u6(w) as i32)
    } else {
        Operand::reg(field_c(w))
    };

    if sub2 == 0x3f {
        // Zero-operand group, selected by the b field.
        let op = match field_b(w) {
            0x01 => ArcOp::Sleep,
            0x02 => ArcOp::Swi,
            0x05 => ArcOp::Brk,
            _ => return None,
        };
        return Some(DecodedInsn::new(op, 4));
    }

    let mut di = DecodedInsn::new(ArcOp::Nop, 4);
    di.f = field_f(w);
    let one = Operand::Imm(1);
    Some(match sub2 {
        0x00 => {
            di.op = ArcOp::Asl;
            di.with_ops(&[b, src, one])
        }
        0x01 => {
            di.op = ArcOp::Asr;
            di.with_ops(&[b, src, one])
        }
        0x02 => {
            di.op = ArcOp::Lsr;
            di.with_ops(&[b, src, one])
        }
        0x03 => {
            di.op = ArcOp::Ror;
            di.with_ops(&[b, src, one])
        }
        0x05 => {
            di.op = ArcOp::Sexb;
            di.with_ops(&[b, src])
        }
        0x06 => {
            di.op = ArcOp::Sexw;
            di.with_ops(&[b, src])
        }
        0x07 => {
            di.op = ArcOp::Extb;
            di.with_ops(&[b, src])
        }
        0x08 => {
            di.op = ArcOp::Extw;
            di.with_ops(&[b, src])
        }
        0x09 => {
            di.op = ArcOp::Abs;
            di.with_ops(&[b, src])
        }
        0x0a => {
            di.op = ArcOp::Not;
            di.with_ops(&[b, src])
        }
        _ => return None,
    })
}

// 16-bit compact forms. The 3-bit register fields address r0-r3 and
// r12-r15.

fn reg16(r: u16) -> Operand {
    let r = r & 7;
    Operand::Reg(if r < 4 { r as u8 } else { (r + 8) as u8 })
}

fn regh(hw: u16) -> Operand {
    // High-register field split across bits [2:0] (high) and [7:5].
    Operand::reg((((hw & 7) << 3) | ((hw >> 5) & 7)) as u32)
}

fn decode16(hw: u16) -> Option<DecodedInsn> {
    let major = hw >> 11;
    let b = reg16(hw >> 8);
    let c = reg16(hw >> 5);
    let a = reg16(hw);
    let u5 = (hw & 0x1f) as i32;

    let di = |op: ArcOp| DecodedInsn::new(op, 2);

    match major {
        0x0c => Some(match (hw >> 3) & 3 {
            0 => di(ArcOp::Ld { zz: 0, x: false, aa: 0 }).with_ops(&[a, b, c]),
            1 => di(ArcOp::Ld { zz: 1, x: false, aa: 0 }).with_ops(&[a, b, c]),
            2 => di(ArcOp::Ld { zz: 2, x: false, aa: 0 }).with_ops(&[a, b, c]),
            _ => di(ArcOp::Add).with_ops(&[a, b, c]),
        }),
        0x0d => {
            let u3 = Operand::Imm((hw & 7) as i32);
            Some(match (hw >> 3) & 3 {
                0 => di(ArcOp::Add).with_ops(&[c, b, u3]),
                1 => di(ArcOp::Sub).with_ops(&[c, b, u3]),
                2 => di(ArcOp::Asl).with_ops(&[c, b, u3]),
                _ => di(ArcOp::Asr).with_ops(&[c, b, u3]),
            })
        }
        0x0e => {
            let h = regh(hw);
            Some(match (hw >> 3) & 3 {
                0 => di(ArcOp::Add).with_ops(&[b, b, h]),
                1 => di(ArcOp::Mov).with_ops(&[b, h]),
                2 => di(ArcOp::Cmp).with_ops(&[b, h]),
                _ => di(ArcOp::Mov).with_ops(&[h, b]),
            })
        }
        0x0f => decode16_alu(hw, b, c),
        0x10 => Some(di(ArcOp::Ld { zz: 0, x: false, aa: 0 }).with_ops(&[
            c,
            b,
            Operand::Imm(u5 << 2),
        ])),
        0x11 => Some(di(ArcOp::Ld { zz: 1, x: false, aa: 0 }).with_ops(&[c, b, Operand::Imm(u5)])),
        0x12 => Some(di(ArcOp::Ld { zz: 2, x: false, aa: 0 }).with_ops(&[
            c,
            b,
            Operand::Imm(u5 << 1),
        ])),
        0x13 => Some(di(ArcOp::Ld { zz: 2, x: true, aa: 0 }).with_ops(&[
            c,
            b,
            Operand::Imm(u5 << 1),
        ])),
        0x14 => Some(di(ArcOp::St { zz: 0, aa: 0 }).with_ops(&[c, b, Operand::Imm(u5 << 2)])),
        0x15 => Some(di(ArcOp::St { zz: 1, aa: 0 }).with_ops(&[c, b, Operand::Imm(u5)])),
        0x16 => Some(di(ArcOp::St { zz: 2, aa: 0 }).with_ops(&[c, b, Operand::Imm(u5 << 1)])),
        0x17 => {
            let u = Operand::Imm(u5);
            Some(match (hw >> 5) & 7 {
                0 => di(ArcOp::Asl).with_ops(&[b, b, u]),
                1 => di(ArcOp::Lsr).with_ops(&[b, b, u]),
                2 => di(ArcOp::Asr).with_ops(&[b, b, u]),
                3 => di(ArcOp::Sub).with_ops(&[b, b, u]),
                4 => di(ArcOp::Bset).with_ops(&[b, b, u]),
                5 => di(ArcOp::Bclr).with_ops(&[b, b, u]),
                6 => di(ArcOp::Bmsk).with_ops(&[b, b, u]),
                _ => di(ArcOp::Btst).with_ops(&[b, u]),
            })
        }
        // 0x18/0x19: sp/gp-relative groups, not decoded.
        0x1a => Some(di(ArcOp::Ld { zz: 0, x: false, aa: 0 }).with_ops(&[
            b,
            Operand::Reg(63),
            Operand::Imm(((hw & 0xff) as i32) << 2),
        ])),
        0x1b => Some(di(ArcOp::Mov).with_ops(&[b, Operand::Imm((hw & 0xff) as i32)])),
        0x1c => {
            let u7 = Operand::Imm((hw & 0x7f) as i32);
            Some(if hw & 0x80 == 0 {
                di(ArcOp::Add).with_ops(&[b, b, u7])
            } else {
                di(ArcOp::Cmp).with_ops(&[b, u7])
            })
        }
        0x1d => {
            let cond = if hw & 0x80 == 0 {
                BrCmpCond::Eq
            } else {
                BrCmpCond::Ne
            };
            let disp = sext(((hw & 0x7f) as u32) << 1, 8);
            Some(di(ArcOp::BrCmp(cond)).with_ops(&[b, Operand::Imm(0), Operand::Imm(disp)]))
        }
        0x1e => {
            let mut d = di(ArcOp::B);
            match (hw >> 9) & 3 {
                0 => {
                    let disp = sext(((hw & 0x1ff) as u32) << 1, 10);
                    Some(d.with_ops(&[Operand::Imm(disp)]))
                }
                1 | 2 => {
                    d.cc = if (hw >> 9) & 3 == 1 { cc::EQ } else { cc::NE };
                    let disp = sext(((hw & 0x3f) as u32) << 1, 7);
                    Some(d.with_ops(&[Operand::Imm(disp)]))
                }
                _ => {
                    d.cc = match (hw >> 6) & 7 {
                        0 => cc::GT,
                        1 => cc::GE,
                        2 => cc::LT,
                        3 => cc::LE,
                        4 => cc::HI,
                        5 => cc::CC,
                        6 => cc::CS,
                        _ => return None,
                    };
                    let disp = sext(((hw & 0x3f) as u32) << 1, 7);
                    Some(d.with_ops(&[Operand::Imm(disp)]))
                }
            }
        }
        0x1f => {
            let disp = sext(((hw & 0x7ff) as u32) << 2, 13);
            Some(di(ArcOp::Bl).with_ops(&[Operand::Imm(disp)]))
        }
        _ => None,
    }
}

/// Major 0x0F: the 16-bit general-operations group.
fn decode16_alu(hw: u16, b: Operand, c: Operand) -> Option<DecodedInsn> {
    let di = |op: ArcOp| DecodedInsn::new(op, 2);
    let one = Operand::Imm(1);
    match hw & 0x1f {
        0x00 => {
            // Jump group plus NOP_S, selected by bits [7:5].
            match (hw >> 5) & 7 {
                0 => Some(di(ArcOp::J { link: false }).with_ops(&[b])),
                1 => {
                    let mut d = di(ArcOp::J { link: false });
                    d.d = true;
                    Some(d.with_ops(&[b]))
                }
                2 => Some(di(ArcOp::J { link: true }).with_ops(&[b])),
                3 => {
                    let mut d = di(ArcOp::J { link: true });
                    d.d = true;
                    Some(d.with_ops(&[b]))
                }
                7 => match (hw >> 8) & 7 {
                    0 => Some(di(ArcOp::Nop)),
                    4 => {
                        let mut d = di(ArcOp::J { link: false });
                        d.cc = cc::EQ;
                        Some(d.with_ops(&[Operand::Reg(31)]))
                    }
                    5 => {
                        let mut d = di(ArcOp::J { link: false });
                        d.cc = cc::NE;
                        Some(d.with_ops(&[Operand::Reg(31)]))
                    }
                    6 => Some(di(ArcOp::J { link: false }).with_ops(&[Operand::Reg(31)])),
                    _ => None,
                },
                _ => None,
            }
        }
        0x02 => Some(di(ArcOp::Sub).with_ops(&[b, b, c])),
        0x04 => Some(di(ArcOp::And).with_ops(&[b, b, c])),
        0x05 => Some(di(ArcOp::Or).with_ops(&[b, b, c])),
        0x06 => Some(di(ArcOp::Bic).with_ops(&[b, b, c])),
        0x07 => Some(di(ArcOp::Xor).with_ops(&[b, b, c])),
        0x0b => Some(di(ArcOp::Tst).with_ops(&[b, c])),
        0x0d => Some(di(ArcOp::Sexb).with_ops(&[b, c])),
        0x0e => Some(di(ArcOp::Sexw).with_ops(&[b, c])),
        0x0f => Some(di(ArcOp::Extb).with_ops(&[b, c])),
        0x10 => Some(di(ArcOp::Extw).with_ops(&[b, c])),
        0x11 => Some(di(ArcOp::Abs).with_ops(&[b, c])),
        0x12 => Some(di(ArcOp::Not).with_ops(&[b, c])),
        0x13 => Some(di(ArcOp::Rsub).with_ops(&[b, c, Operand::Imm(0)])),
        0x18 => Some(di(ArcOp::Asl).with_ops(&[b, b, c])),
        0x19 => Some(di(ArcOp::Lsr).with_ops(&[b, b, c])),
        0x1a => Some(di(ArcOp::Asr).with_ops(&[b, b, c])),
        0x1b => Some(di(ArcOp::Asl).with_ops(&[b, c, one])),
        0x1c => Some(di(ArcOp::Asr).with_ops(&[b, c, one])),
        0x1d => Some(di(ArcOp::Lsr).with_ops(&[b, c, one])),
        0x1e => Some(di(ArcOp::Trap).with_ops(&[Operand::Imm(((hw >> 5) & 0x3f) as i32)])),
        0x1f => {
            if (hw >> 5) & 0x3f == 0x3f {
                Some(di(ArcOp::Brk))
            } else {
                None
            }
        }
        _ => None,
    }
}
