//! Per-unit translation context: temp arena, op stream, labels and the
//! constant pool. One context is reset and reused per translation.

use std::collections::HashMap;

use crate::label::Label;
use crate::op::Op;
use crate::temp::{Temp, TempIdx, TempKind};
use crate::types::{Type, TYPE_COUNT};

pub struct Context {
    temps: Vec<Temp>,
    ops: Vec<Op>,
    labels: Vec<Label>,
    nb_globals: u32,
    const_table: [HashMap<u64, TempIdx>; TYPE_COUNT],
}

impl Context {
    pub fn new() -> Context {
        Context {
            temps: Vec::with_capacity(128),
            ops: Vec::with_capacity(256),
            labels: Vec::new(),
            nb_globals: 0,
            const_table: Default::default(),
        }
    }

    pub fn nb_temps(&self) -> u32 {
        self.temps.len() as u32
    }

    pub fn nb_globals(&self) -> u32 {
        self.nb_globals
    }

    pub fn temp(&self, idx: TempIdx) -> &Temp {
        &self.temps[idx.0 as usize]
    }

    fn push_temp(&mut self, ty: Type, kind: TempKind) -> TempIdx {
        let idx = TempIdx(self.temps.len() as u32);
        self.temps.push(Temp::new(idx, ty, kind));
        idx
    }

    /// New temp live to the end of the current extended basic block.
    pub fn new_temp(&mut self, ty: Type) -> TempIdx {
        self.push_temp(ty, TempKind::Ebb)
    }

    /// New temp live for the whole translation unit.
    pub fn new_temp_tb(&mut self, ty: Type) -> TempIdx {
        self.push_temp(ty, TempKind::Tb)
    }

    /// Register a global temp backed by a CPU field.
    ///
    /// Globals must all be created before any other temp so that they
    /// occupy the low indices and survive `reset`.
    pub fn new_global(&mut self, ty: Type, offset: u32, name: &'static str) -> TempIdx {
        assert_eq!(
            self.temps.len() as u32,
            self.nb_globals,
            "globals must be registered before other temps"
        );
        let idx = self.push_temp(ty, TempKind::Global);
        let t = &mut self.temps[idx.0 as usize];
        t.mem_offset = offset;
        t.name = Some(name);
        self.nb_globals += 1;
        idx
    }

    /// Constant temp, deduplicated per (type, value).
    pub fn new_const(&mut self, ty: Type, val: u64) -> TempIdx {
        let val = val & ty.mask();
        if let Some(&idx) = self.const_table[ty.index()].get(&val) {
            return idx;
        }
        let idx = self.push_temp(ty, TempKind::Const);
        self.temps[idx.0 as usize].val = val;
        self.const_table[ty.index()].insert(val, idx);
        idx
    }

    pub fn new_const_i32(&mut self, val: u32) -> TempIdx {
        self.new_const(Type::I32, val as u64)
    }

    pub fn emit(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn new_label(&mut self) -> u32 {
        let id = self.labels.len() as u32;
        self.labels.push(Label::new(id));
        id
    }

    pub fn label(&self, id: u32) -> &Label {
        &self.labels[id as usize]
    }

    pub fn label_mut(&mut self, id: u32) -> &mut Label {
        &mut self.labels[id as usize]
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Reset for the next unit. Globals survive; everything else goes.
    pub fn reset(&mut self) {
        self.temps.truncate(self.nb_globals as usize);
        self.ops.clear();
        self.labels.clear();
        for table in &mut self.const_table {
            table.clear();
        }
    }

    /// Every label that was branched to must have been placed.
    pub fn check_labels(&self) {
        for l in &self.labels {
            assert!(
                l.present || l.uses.is_empty(),
                "label L{} used but never placed",
                l.id
            );
        }
    }

    /// Temps in arena order (globals first).
    pub fn temps(&self) -> &[Temp] {
        &self.temps
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}
