use std::sync::Arc;

use dbt_backend::bytecode::Artifact;
use dbt_core::unit::TranslationUnit;
use dbt_exec::{CpuExecState, ExcpSink, JumpCache, UnitCache, VectoredDelivery};
use dbt_frontend::arc::cpu::ArcCpu;

fn unit(pc: u32, flags: u32, size: u32) -> Arc<TranslationUnit<Artifact>> {
    let mut u = TranslationUnit::new(
        pc,
        flags,
        0,
        Artifact {
            code: vec![],
            nb_vregs: 0,
            globals: vec![],
        },
    );
    u.size = size;
    Arc::new(u)
}

#[test]
fn insert_race_keeps_the_existing_unit() {
    let cache = UnitCache::new();
    let first = cache.insert(unit(0x100, 0, 4));
    let second = cache.insert(unit(0x100, 0, 4));
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}

#[test]
fn lookup_filters_invalidated_units() {
    let cache = UnitCache::new();
    let u = cache.insert(unit(0x100, 0, 4));
    assert!(cache.lookup(0x100, 0).is_some());
    u.set_invalid();
    assert!(cache.lookup(0x100, 0).is_none());
}

#[test]
fn lookup_is_keyed_on_flags_too() {
    let cache = UnitCache::new();
    cache.insert(unit(0x100, 0, 4));
    assert!(cache.lookup(0x100, 1).is_none());
}

#[test]
fn invalidation_uses_half_open_overlap() {
    let cache = UnitCache::new();
    let u = cache.insert(unit(0x100, 0, 8));

    // Touching the exclusive end is not an overlap.
    cache.invalidate_range(0x108, 0x110);
    assert!(!u.is_invalid());
    assert_eq!(cache.len(), 1);
    cache.invalidate_range(0x0, 0x100);
    assert!(!u.is_invalid());

    // One byte inside is.
    cache.invalidate_range(0x106, 0x108);
    assert!(u.is_invalid());
    assert!(cache.is_empty());
}

#[test]
fn invalidated_units_are_retranslated() {
    let mut m = super::Machine::new();
    let a = m.put16(0, crate::frontend::mov_s(0, 1));
    m.put16(a, crate::frontend::BRK_S);

    let old = m.engine.translate(&m.mem, 0, 0);
    m.engine.invalidate_range(0, 2);
    assert!(old.is_invalid());
    assert!(m.engine.cache().lookup(0, 0).is_none());

    // The next request builds a fresh unit, not the marked one.
    let new = m.engine.translate(&m.mem, 0, 0);
    assert!(!Arc::ptr_eq(&old, &new));
    assert!(!new.is_invalid());
    assert_eq!(m.engine.cache().len(), 1);
}

#[test]
fn flush_marks_outstanding_references() {
    let cache = UnitCache::new();
    let held = cache.insert(unit(0x200, 0, 4));
    cache.flush();
    assert!(cache.is_empty());
    // A dispatched unit notices through its own Arc.
    assert!(held.is_invalid());
}

#[test]
fn jump_cache_is_direct_mapped() {
    let mut jc = JumpCache::new();
    jc.insert(unit(0x100, 0, 4));
    assert!(jc.lookup(0x100, 0).is_some());
    assert!(jc.lookup(0x100, 1).is_none());

    // 2048 bytes apart maps to the same slot (half-word granule,
    // 1024 entries) and evicts.
    jc.insert(unit(0x100 + 2048, 0, 4));
    assert!(jc.lookup(0x100, 0).is_none());
    assert!(jc.lookup(0x100 + 2048, 0).is_some());

    jc.clear();
    assert!(jc.lookup(0x100 + 2048, 0).is_none());
}

#[test]
fn jump_cache_rechecks_the_invalid_mark() {
    let mut jc = JumpCache::new();
    let u = unit(0x300, 0, 4);
    jc.insert(u.clone());
    u.set_invalid();
    assert!(jc.lookup(0x300, 0).is_none());
}

#[test]
fn loop_exit_quiesces_hooks_until_redispatch() {
    let mut st = CpuExecState::new();
    assert!(st.io_safe);
    assert!(st.instr_enabled);

    st.io_safe = false;
    st.loop_exit();
    assert!(st.io_safe);
    assert!(!st.instr_enabled);

    let mut restart = 0;
    st.loop_exit_restore(0x44, |pc| restart = pc);
    assert_eq!(restart, 0x44);
}

#[test]
#[should_panic(expected = "exclusive section")]
fn loop_exit_inside_the_exclusive_section_panics() {
    let mut st = CpuExecState::new();
    st.exclusive_held = true;
    st.loop_exit_atomic();
}

#[test]
fn delivery_packs_ecr_and_records_memory_faults() {
    let mut cpu = ArcCpu::new();
    cpu.int_vector_base = 0x2000;
    cpu.ef = 1;
    cpu.def_ = 1;
    cpu.in_delay_slot = 1;

    VectoredDelivery.deliver(&mut cpu, 1, 2, 0x1234_5678);
    assert_eq!(cpu.ecr, 1 << 16 | 2 << 8 | 0x78);
    assert_eq!(cpu.efa, 0x1234_5678);
    assert_eq!(cpu.aef, 1);
    assert_eq!(cpu.ef, 0);
    assert_eq!(cpu.def_, 0);
    assert_eq!(cpu.in_delay_slot, 0);
    assert_eq!(cpu.pc, 0x2004);
}

#[test]
fn delivery_leaves_efa_for_non_memory_exceptions() {
    let mut cpu = ArcCpu::new();
    cpu.int_vector_base = 0x2000;
    cpu.efa = 0xdead;

    VectoredDelivery.deliver(&mut cpu, 9, 0, 3);
    assert_eq!(cpu.ecr, 9 << 16 | 3);
    assert_eq!(cpu.efa, 0xdead);
    assert_eq!(cpu.pc, 0x2024);
}
