//! Layout tests: field offsets, vtable slots, labels and determinism, observed
//! through the full pipeline.


use decaf::prelude::*;
use test_harness::{compile, with_main};

fn fields(b: &mut AstBuilder, names: &[&str]) -> Vec<ClassMember> {
    names
        .iter()
        .map(|name| ClassMember::Field(b.var(name, Type::INT)))
        .collect()
}

fn method(b: &mut AstBuilder, name: &str) -> ClassMember {
    let body = b.block(vec![], vec![]);
    ClassMember::Method(b.function(name, Type::VOID, vec![], body))
}

/// `class A { int x; int y; }` and `class B extends A { int z; }`.
fn point_hierarchy(b: &mut AstBuilder) -> Program {
    let members = fields(b, &["x", "y"]);
    let a = b.class("A", None, &[], members);
    let members = fields(b, &["z"]);
    let sub = b.class("B", Some("A"), &[], members);
    with_main(b, vec![Decl::Class(a), Decl::Class(sub)], vec![], vec![])
}

// =============================================================================
// Fields
// =============================================================================

#[test]
fn fields_start_at_the_configured_base() {
    let mut b = AstBuilder::new();
    let program = point_hierarchy(&mut b);
    let options = CompilerOptions::new().with_field_base(0);
    let compiled = Compiler::new(options).compile(&program).unwrap();

    let a = compiled.layout.class("A").unwrap();
    assert_eq!(a.field_offset("x"), Some(0));
    assert_eq!(a.field_offset("y"), Some(4));
    let sub = compiled.layout.class("B").unwrap();
    assert_eq!(sub.field_offset("x"), Some(0));
    assert_eq!(sub.field_offset("y"), Some(4));
    assert_eq!(sub.field_offset("z"), Some(8));
}

#[test]
fn default_layout_reserves_the_vtable_word() {
    let mut b = AstBuilder::new();
    let program = point_hierarchy(&mut b);
    let compiled = compile(&program);

    let sub = compiled.layout.class("B").unwrap();
    let offsets: Vec<_> = sub.fields.iter().map(|f| (f.name.as_str(), f.offset)).collect();
    assert_eq!(offsets, [("x", 4), ("y", 8), ("z", 12)]);
    assert_eq!(sub.instance_size, 16);
    assert_eq!(compiled.layout.class("A").unwrap().instance_size, 12);
}

#[test]
fn word_size_scales_offsets() {
    let mut b = AstBuilder::new();
    let g = b.var("g", Type::INT);
    let h = b.var("h", Type::BOOL);
    let members = fields(&mut b, &["x", "y"]);
    let class = b.class("Pair", None, &[], members);
    let program = with_main(
        &mut b,
        vec![Decl::Var(g), Decl::Var(h), Decl::Class(class)],
        vec![],
        vec![],
    );
    let options = CompilerOptions::new().with_word_size(8).with_field_base(8);
    let compiled = Compiler::new(options).compile(&program).unwrap();

    assert_eq!(compiled.layout.globals_size(), 16);
    let pair = compiled.layout.class("Pair").unwrap();
    assert_eq!(pair.field_offset("y"), Some(16));
    assert_eq!(pair.instance_size, 24);
}

// =============================================================================
// Vtables
// =============================================================================

#[test]
fn override_replaces_slot_and_new_methods_append() {
    let mut b = AstBuilder::new();
    let f = method(&mut b, "f");
    let g = method(&mut b, "g");
    let base = b.class("Base", None, &[], vec![f, g]);
    let f = method(&mut b, "f");
    let h = method(&mut b, "h");
    let derived = b.class("Derived", Some("Base"), &[], vec![f, h]);
    let program = with_main(
        &mut b,
        vec![Decl::Class(base), Decl::Class(derived)],
        vec![],
        vec![],
    );
    let compiled = compile(&program);

    assert_eq!(
        compiled.vtables,
        vec![
            VTableDef {
                class: "Base".into(),
                methods: vec!["_Base.f".into(), "_Base.g".into()],
            },
            VTableDef {
                class: "Derived".into(),
                methods: vec!["_Derived.f".into(), "_Base.g".into(), "_Derived.h".into()],
            },
        ]
    );

    // the same tables appear in the stream, each after its class's methods
    let in_stream: Vec<_> = compiled
        .instrs
        .iter()
        .filter_map(|i| match i {
            Instr::VTable { class, methods } => Some((class.as_str(), methods.len())),
            _ => None,
        })
        .collect();
    assert_eq!(in_stream, [("Base", 2), ("Derived", 3)]);
}

#[test]
fn class_without_methods_still_gets_a_vtable() {
    let mut b = AstBuilder::new();
    let members = fields(&mut b, &["v"]);
    let class = b.class("Cell", None, &[], members);
    let program = with_main(&mut b, vec![Decl::Class(class)], vec![], vec![]);
    let compiled = compile(&program);
    assert_eq!(compiled.vtables.len(), 1);
    assert!(compiled.vtables[0].methods.is_empty());
}

// =============================================================================
// Labels
// =============================================================================

#[test]
fn labels_follow_options() {
    let mut b = AstBuilder::new();
    let body = b.block(vec![], vec![]);
    let helper = b.function("helper", Type::VOID, vec![], body);
    let m = method(&mut b, "run");
    let class = b.class("Task", None, &[], vec![m]);
    let program = with_main(
        &mut b,
        vec![Decl::Fn(helper), Decl::Class(class)],
        vec![],
        vec![],
    );

    let labels = |compiled: &CompiledProgram| -> Vec<String> {
        compiled
            .instrs
            .iter()
            .filter_map(|i| match i {
                Instr::Label(l) if !l.starts_with("_L") => Some(l.clone()),
                _ => None,
            })
            .collect()
    };

    let compiled = compile(&program);
    assert_eq!(labels(&compiled), ["_helper", "_Task.run", "main"]);

    let options = CompilerOptions::new().with_label_prefix("fn_");
    let compiled = Compiler::new(options).compile(&program).unwrap();
    assert_eq!(labels(&compiled), ["fn_helper", "fn_Task.run", "main"]);
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn compiling_twice_is_identical() {
    let mut b = AstBuilder::new();
    let mut members = fields(&mut b, &["a", "b"]);
    members.push(method(&mut b, "tick"));
    let base = b.class("Clock", None, &[], members);
    let tock = method(&mut b, "tock");
    let tick = method(&mut b, "tick");
    let derived = b.class("Alarm", Some("Clock"), &[], vec![tock, tick]);
    let n = b.var("n", Type::INT);
    let target = b.var_ref("n");
    let ten = b.int(10);
    let size = b.new_array(ten, Type::INT);
    let arr = b.var("arr", Type::array(Type::INT));
    let arr_ref = b.var_ref("arr");
    let store = b.assign(arr_ref, size);
    let base_ref = b.var_ref("arr");
    let zero = b.int(0);
    let elem = b.index(base_ref, zero);
    let assign = b.assign(target, elem);
    let program = with_main(
        &mut b,
        vec![Decl::Class(base), Decl::Class(derived)],
        vec![n, arr],
        vec![Stmt::Expr(store), Stmt::Expr(assign)],
    );

    let compiler = Compiler::default();
    let first = compiler.compile(&program).unwrap();
    let second = compiler.compile(&program).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.render(), second.render());
    assert_eq!(
        first.layout.class("Alarm").unwrap().vtable_labels(),
        ["_Alarm.tick", "_Alarm.tock"]
    );
}
