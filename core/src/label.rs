//! Branch labels with forward-use backpatch records.

/// Relocation kind recorded for a forward label use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocKind {
    /// Absolute bytecode word index, patched into the use's second word.
    Word,
}

/// One unresolved use of a label in lowered code.
#[derive(Debug, Clone, Copy)]
pub struct LabelUse {
    /// Offset of the word to patch in the output stream.
    pub offset: usize,
    pub kind: RelocKind,
}

#[derive(Debug, Clone)]
pub struct Label {
    pub id: u32,
    /// A `set_label` op for this label was emitted.
    pub present: bool,
    /// The lowered position is known.
    pub has_value: bool,
    /// Lowered position (bytecode word index).
    pub value: usize,
    pub uses: Vec<LabelUse>,
}

impl Label {
    pub fn new(id: u32) -> Label {
        Label {
            id,
            present: false,
            has_value: false,
            value: 0,
            uses: Vec::new(),
        }
    }

    pub fn add_use(&mut self, offset: usize, kind: RelocKind) {
        self.uses.push(LabelUse { offset, kind });
    }

    pub fn set_value(&mut self, value: usize) {
        debug_assert!(!self.has_value, "label L{} set twice", self.id);
        self.has_value = true;
        self.value = value;
    }
}
