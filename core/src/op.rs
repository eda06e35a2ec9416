//! Packed IR op records.

use crate::opcode::{OpFlags, Opcode};
use crate::temp::TempIdx;
use crate::types::Type;

/// Maximum packed args per op: 1 output + 4 call inputs + 2 consts,
/// rounded up for movcond (1 + 4 + 1).
pub const MAX_OP_ARGS: usize = 8;

/// One IR operation. Output, input and constant args share the packed
/// `args` array; slicing is driven by the opcode definition table
/// (calls carry their own input count in `nargs`).
#[derive(Debug, Clone)]
pub struct Op {
    pub opc: Opcode,
    pub ty: Type,
    /// Element-width log2 for vector ops (0 = 8-bit lanes).
    pub vece: u8,
    pub args: [TempIdx; MAX_OP_ARGS],
    pub nargs: u8,
}

impl Op {
    pub fn with_args(opc: Opcode, ty: Type, vece: u8, args: &[TempIdx]) -> Op {
        debug_assert!(args.len() <= MAX_OP_ARGS);
        let mut packed = [TempIdx(0); MAX_OP_ARGS];
        packed[..args.len()].copy_from_slice(args);
        if !opc.def().flags.contains(OpFlags::CALL) {
            let def = opc.def();
            debug_assert_eq!(
                args.len(),
                (def.nb_oargs + def.nb_iargs + def.nb_cargs) as usize,
                "arg count mismatch for {}",
                def.name
            );
        }
        Op {
            opc,
            ty,
            vece,
            args: packed,
            nargs: args.len() as u8,
        }
    }

    fn counts(&self) -> (usize, usize, usize) {
        let def = self.opc.def();
        if def.flags.contains(OpFlags::CALL) {
            // call: dst, inputs..., helper-id, nb-args
            let total = self.nargs as usize;
            (1, total - 3, 2)
        } else {
            (
                def.nb_oargs as usize,
                def.nb_iargs as usize,
                def.nb_cargs as usize,
            )
        }
    }

    pub fn oargs(&self) -> &[TempIdx] {
        let (o, _, _) = self.counts();
        &self.args[..o]
    }

    pub fn iargs(&self) -> &[TempIdx] {
        let (o, i, _) = self.counts();
        &self.args[o..o + i]
    }

    /// Constant args, encoded as raw values in `TempIdx` slots.
    pub fn cargs(&self) -> &[TempIdx] {
        let (o, i, c) = self.counts();
        &self.args[o + i..o + i + c]
    }
}
