use dbt_core::context::Context;
use dbt_core::temp::TempKind;
use dbt_core::types::Type;

#[test]
fn consts_are_deduplicated_per_type_and_value() {
    let mut ir = Context::new();
    let a = ir.new_const(Type::I32, 42);
    let b = ir.new_const(Type::I32, 42);
    let c = ir.new_const(Type::I32, 43);
    let d = ir.new_const(Type::I64, 42);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
}

#[test]
fn consts_are_masked_to_their_type() {
    let mut ir = Context::new();
    let a = ir.new_const(Type::I32, 0x1_ffff_ffff);
    let b = ir.new_const(Type::I32, 0xffff_ffff);
    assert_eq!(a, b);
    assert_eq!(ir.temp(a).val, 0xffff_ffff);
}

#[test]
fn globals_occupy_the_low_indices() {
    let mut ir = Context::new();
    let g0 = ir.new_global(Type::I32, 0, "a");
    let g1 = ir.new_global(Type::I32, 4, "b");
    assert_eq!(g0.0, 0);
    assert_eq!(g1.0, 1);
    assert_eq!(ir.nb_globals(), 2);
    assert_eq!(ir.temp(g1).mem_offset, 4);
    assert_eq!(ir.temp(g1).name, Some("b"));
    assert_eq!(ir.temp(g1).kind, TempKind::Global);
}

#[test]
#[should_panic(expected = "globals must be registered before other temps")]
fn global_after_temp_panics() {
    let mut ir = Context::new();
    ir.new_temp(Type::I32);
    ir.new_global(Type::I32, 0, "late");
}

#[test]
fn reset_keeps_globals_and_drops_the_rest() {
    let mut ir = Context::new();
    let g = ir.new_global(Type::I32, 0, "a");
    let t = ir.new_temp(Type::I32);
    let c = ir.new_const_i32(7);
    ir.gen_add(Type::I32, t, g, c);
    ir.new_label();
    assert_eq!(ir.nb_temps(), 3);

    ir.reset();
    assert_eq!(ir.nb_globals(), 1);
    assert_eq!(ir.nb_temps(), 1);
    assert!(ir.ops().is_empty());
    assert!(ir.labels().is_empty());

    // The const table was cleared: a fresh const gets a fresh slot.
    let c2 = ir.new_const_i32(7);
    assert_eq!(c2.0, 1);
}

#[test]
fn labels_get_sequential_ids() {
    let mut ir = Context::new();
    assert_eq!(ir.new_label(), 0);
    assert_eq!(ir.new_label(), 1);
    assert!(!ir.label(0).present);
}

#[test]
fn placed_labels_pass_the_check() {
    let mut ir = Context::new();
    let t = ir.new_temp(Type::I32);
    let l = ir.new_label();
    ir.gen_brcondi(Type::I32, t, 0, dbt_core::types::Cond::Eq, l);
    ir.gen_set_label(l);
    ir.check_labels();
    assert!(ir.label(l).present);
}

#[test]
#[should_panic(expected = "used but never placed")]
fn unplaced_label_use_panics() {
    let mut ir = Context::new();
    let l = ir.new_label();
    ir.gen_br(l);
    ir.check_labels();
}
