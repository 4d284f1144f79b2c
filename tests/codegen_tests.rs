//! Code generation tests.
//!
//! Programs are compiled and run on the harness machine; assertions are on
//! what they print and whether they halted.


use decaf::backend::{ARRAY_SIZE_ERROR, SUBSCRIPT_ERROR};
use decaf::prelude::*;
use test_harness::{Machine, compile, run_output, with_main};

fn method(b: &mut AstBuilder, name: &str, ret: Type, stmts: Vec<Stmt>) -> ClassMember {
    let body = b.block(vec![], stmts);
    ClassMember::Method(b.function(name, ret, vec![], body))
}

/// `name = value;`
fn set(b: &mut AstBuilder, name: &str, value: Expr) -> Stmt {
    let target = b.var_ref(name);
    Stmt::Expr(b.assign(target, value))
}

/// `name + k`
fn plus(b: &mut AstBuilder, name: &str, k: i32) -> Expr {
    let var = b.var_ref(name);
    let k = b.int(k);
    b.binary(BinaryOp::Add, var, k)
}

// =============================================================================
// Straight-line code
// =============================================================================

#[test]
fn prints_each_primitive() {
    let mut b = AstBuilder::new();
    let text = b.string("hello ");
    let n = b.int(42);
    let yes = b.boolean(true);
    let print = b.print(vec![text, n, yes]);
    let program = with_main(&mut b, vec![], vec![], vec![print]);
    assert_eq!(run_output(&program), "hello 42true");
}

#[test]
fn derived_comparisons_and_unary_operators() {
    let mut b = AstBuilder::new();
    let mut args = Vec::new();
    for (op, l, r) in [
        (BinaryOp::LessEqual, 7, 7),
        (BinaryOp::Greater, 3, 5),
        (BinaryOp::GreaterEqual, 5, 6),
        (BinaryOp::NotEqual, 1, 2),
    ] {
        let l = b.int(l);
        let r = b.int(r);
        args.push(b.binary(op, l, r));
    }
    let three = b.int(3);
    args.push(b.unary(UnaryOp::Neg, three));
    let no = b.boolean(false);
    args.push(b.unary(UnaryOp::Not, no));
    let print = b.print(args);
    let program = with_main(&mut b, vec![], vec![], vec![print]);
    assert_eq!(run_output(&program), "truefalsefalsetrue-3true");
}

#[test]
fn arithmetic_precedence_is_the_tree_shape() {
    let mut b = AstBuilder::new();
    // (17 % 5) * (10 / 3) - 1
    let a = b.int(17);
    let m = b.int(5);
    let rem = b.binary(BinaryOp::Mod, a, m);
    let ten = b.int(10);
    let three = b.int(3);
    let quot = b.binary(BinaryOp::Div, ten, three);
    let prod = b.binary(BinaryOp::Mul, rem, quot);
    let one = b.int(1);
    let result = b.binary(BinaryOp::Sub, prod, one);
    let print = b.print(vec![result]);
    let program = with_main(&mut b, vec![], vec![], vec![print]);
    assert_eq!(run_output(&program), "5");
}

#[test]
fn strings_compare_by_content() {
    let mut b = AstBuilder::new();
    let s = b.var("s", Type::STRING);
    let read = b.read_line();
    let store = set(&mut b, "s", read);
    let lhs = b.var_ref("s");
    let yes = b.string("yes");
    let eq = b.binary(BinaryOp::Equal, lhs, yes);
    let lhs = b.var_ref("s");
    let no = b.string("no");
    let ne = b.binary(BinaryOp::NotEqual, lhs, no);
    let print = b.print(vec![eq, ne]);
    let program = with_main(&mut b, vec![], vec![s], vec![store, print]);

    let compiled = compile(&program);
    let run = Machine::new(&compiled).with_input(&["yes"]).run();
    assert_eq!(run.output, "truetrue");
    assert!(!run.halted);
}

#[test]
fn read_integer_feeds_arithmetic() {
    let mut b = AstBuilder::new();
    let read = b.read_integer();
    let one = b.int(1);
    let sum = b.binary(BinaryOp::Add, read, one);
    let print = b.print(vec![sum]);
    let program = with_main(&mut b, vec![], vec![], vec![print]);
    let compiled = compile(&program);
    assert_eq!(Machine::new(&compiled).with_input(&["41"]).run().output, "42");
}

#[test]
fn double_constants_are_emitted() {
    let mut b = AstBuilder::new();
    let d = b.var("d", Type::DOUBLE);
    let x = b.double(1.5);
    let y = b.double(2.0);
    let prod = b.binary(BinaryOp::Mul, x, y);
    let store = set(&mut b, "d", prod);
    let program = with_main(&mut b, vec![], vec![d], vec![store]);
    let compiled = compile(&program);
    let doubles = compiled
        .instrs
        .iter()
        .filter(|i| matches!(i, Instr::LoadDouble { .. }))
        .count();
    assert_eq!(doubles, 2);
}

// =============================================================================
// Control flow
// =============================================================================

#[test]
fn while_true_with_break() {
    let mut b = AstBuilder::new();
    let k = b.var("k", Type::INT);
    let zero = b.int(0);
    let init = set(&mut b, "k", zero);
    let next = plus(&mut b, "k", 1);
    let step = set(&mut b, "k", next);
    let kr = b.var_ref("k");
    let five = b.int(5);
    let done = b.binary(BinaryOp::Equal, kr, five);
    let brk = b.break_stmt();
    let guard = b.if_stmt(done, brk, None);
    let body = b.block(vec![], vec![step, guard]);
    let forever = b.boolean(true);
    let loop_stmt = b.while_loop(forever, Stmt::Block(body));
    let kr = b.var_ref("k");
    let print = b.print(vec![kr]);
    let program = with_main(&mut b, vec![], vec![k], vec![init, loop_stmt, print]);
    assert_eq!(run_output(&program), "5");
}

#[test]
fn if_else_picks_one_branch() {
    let mut b = AstBuilder::new();
    let mut stmts = Vec::new();
    for value in [true, false] {
        let test = b.boolean(value);
        let yes = b.string("then ");
        let then_branch = b.print(vec![yes]);
        let no = b.string("else ");
        let else_branch = b.print(vec![no]);
        stmts.push(b.if_stmt(test, then_branch, Some(else_branch)));
    }
    let program = with_main(&mut b, vec![], vec![], stmts);
    assert_eq!(run_output(&program), "then else ");
}

#[test]
fn switch_falls_through_until_break() {
    let mut b = AstBuilder::new();
    let i = b.var("i", Type::INT);

    let a = b.string("a");
    let print_a = b.print(vec![a]);
    let case0 = b.case(0, vec![print_a]);
    let s = b.string("b");
    let print_b = b.print(vec![s]);
    let brk = b.break_stmt();
    let case1 = b.case(1, vec![print_b, brk]);
    let c = b.string("c");
    let print_c = b.print(vec![c]);
    let brk = b.break_stmt();
    let case2 = b.case(2, vec![print_c, brk]);
    let d = b.string("d");
    let print_d = b.print(vec![d]);
    let scrutinee = b.var_ref("i");
    let switch = b.switch(scrutinee, vec![case0, case1, case2], Some(vec![print_d]));

    let zero = b.int(0);
    let init_target = b.var_ref("i");
    let init = b.assign(init_target, zero);
    let ir = b.var_ref("i");
    let four = b.int(4);
    let test = b.binary(BinaryOp::Less, ir, four);
    let next = plus(&mut b, "i", 1);
    let step_target = b.var_ref("i");
    let step = b.assign(step_target, next);
    let body = b.block(vec![], vec![switch]);
    let for_loop = b.for_loop(Some(init), test, Some(step), Stmt::Block(body));
    let program = with_main(&mut b, vec![], vec![i], vec![for_loop]);
    assert_eq!(run_output(&program), "abbcd");
}

#[test]
fn switch_without_default_skips_unmatched() {
    let mut b = AstBuilder::new();
    let nine = b.int(9);
    let x = b.string("x");
    let print_x = b.print(vec![x]);
    let case1 = b.case(1, vec![print_x]);
    let switch = b.switch(nine, vec![case1], None);
    let end = b.string("end");
    let print_end = b.print(vec![end]);
    let program = with_main(&mut b, vec![], vec![], vec![switch, print_end]);
    assert_eq!(run_output(&program), "end");
}

// =============================================================================
// Functions and globals
// =============================================================================

#[test]
fn recursion_through_parameters() {
    let mut b = AstBuilder::new();
    let n = b.var("n", Type::INT);
    let nr = b.var_ref("n");
    let one = b.int(1);
    let base_case = b.binary(BinaryOp::LessEqual, nr, one);
    let one = b.int(1);
    let ret_one = b.return_stmt(Some(one));
    let guard = b.if_stmt(base_case, ret_one, None);
    let nr = b.var_ref("n");
    let one = b.int(1);
    let smaller = b.binary(BinaryOp::Sub, nr, one);
    let rec = b.call("fact", vec![smaller]);
    let nr = b.var_ref("n");
    let prod = b.binary(BinaryOp::Mul, nr, rec);
    let ret = b.return_stmt(Some(prod));
    let body = b.block(vec![], vec![guard, ret]);
    let fact = b.function("fact", Type::INT, vec![n], body);

    let five = b.int(5);
    let call = b.call("fact", vec![five]);
    let print = b.print(vec![call]);
    let program = with_main(&mut b, vec![Decl::Fn(fact)], vec![], vec![print]);
    assert_eq!(run_output(&program), "120");
}

#[test]
fn multiple_parameters_keep_their_order() {
    let mut b = AstBuilder::new();
    let x = b.var("x", Type::INT);
    let y = b.var("y", Type::INT);
    let xr = b.var_ref("x");
    let yr = b.var_ref("y");
    let diff = b.binary(BinaryOp::Sub, xr, yr);
    let ret = b.return_stmt(Some(diff));
    let body = b.block(vec![], vec![ret]);
    let minus = b.function("minus", Type::INT, vec![x, y], body);
    let ten = b.int(10);
    let three = b.int(3);
    let call = b.call("minus", vec![ten, three]);
    let print = b.print(vec![call]);
    let program = with_main(&mut b, vec![Decl::Fn(minus)], vec![], vec![print]);
    assert_eq!(run_output(&program), "7");
}

#[test]
fn globals_persist_across_calls() {
    let mut b = AstBuilder::new();
    let counter = b.var("counter", Type::INT);
    let next = plus(&mut b, "counter", 1);
    let bump_stmt = set(&mut b, "counter", next);
    let body = b.block(vec![], vec![bump_stmt]);
    let bump = b.function("bump", Type::VOID, vec![], body);
    let first = b.call("bump", vec![]);
    let second = b.call("bump", vec![]);
    let cr = b.var_ref("counter");
    let print = b.print(vec![cr]);
    let program = with_main(
        &mut b,
        vec![Decl::Var(counter), Decl::Fn(bump)],
        vec![],
        vec![Stmt::Expr(first), Stmt::Expr(second), print],
    );
    assert_eq!(run_output(&program), "2");
}

// =============================================================================
// Objects
// =============================================================================

#[test]
fn fields_and_implicit_receiver() {
    let mut b = AstBuilder::new();
    let n = b.var("n", Type::INT);
    let next = plus(&mut b, "n", 1);
    let inc_stmt = set(&mut b, "n", next);
    let inc = method(&mut b, "inc", Type::VOID, vec![inc_stmt]);
    let nr = b.var_ref("n");
    let ret = b.return_stmt(Some(nr));
    let get = method(&mut b, "get", Type::INT, vec![ret]);
    let first = b.call("inc", vec![]);
    let second = b.call("inc", vec![]);
    let twice = method(
        &mut b,
        "twice",
        Type::VOID,
        vec![Stmt::Expr(first), Stmt::Expr(second)],
    );
    let class = b.class(
        "Counter",
        None,
        &[],
        vec![ClassMember::Field(n), inc, get, twice],
    );

    let c = b.var("c", Type::named("Counter"));
    let make = b.new_object("Counter");
    let create = set(&mut b, "c", make);
    let cr = b.var_ref("c");
    let call_twice = b.method_call(cr, "twice", vec![]);
    let cr = b.var_ref("c");
    let call_inc = b.method_call(cr, "inc", vec![]);
    let cr = b.var_ref("c");
    let call_get = b.method_call(cr, "get", vec![]);
    let print = b.print(vec![call_get]);
    let program = with_main(
        &mut b,
        vec![Decl::Class(class)],
        vec![c],
        vec![create, Stmt::Expr(call_twice), Stmt::Expr(call_inc), print],
    );
    assert_eq!(run_output(&program), "3");
}

#[test]
fn dynamic_dispatch_uses_the_runtime_class() {
    let mut b = AstBuilder::new();
    let generic = b.string("...");
    let ret = b.return_stmt(Some(generic));
    let speak = method(&mut b, "speak", Type::STRING, vec![ret]);
    let legs = b.int(4);
    let ret = b.return_stmt(Some(legs));
    let legs = method(&mut b, "legs", Type::INT, vec![ret]);
    let animal = b.class("Animal", None, &[], vec![speak, legs]);
    let meow = b.string("meow");
    let ret = b.return_stmt(Some(meow));
    let speak = method(&mut b, "speak", Type::STRING, vec![ret]);
    let cat = b.class("Cat", Some("Animal"), &[], vec![speak]);

    let pet = b.var("pet", Type::named("Animal"));
    let make = b.new_object("Cat");
    let create = set(&mut b, "pet", make);
    let pr = b.var_ref("pet");
    let says = b.method_call(pr, "speak", vec![]);
    let pr = b.var_ref("pet");
    let count = b.method_call(pr, "legs", vec![]);
    let print = b.print(vec![says, count]);
    let program = with_main(
        &mut b,
        vec![Decl::Class(animal), Decl::Class(cat)],
        vec![pet],
        vec![create, print],
    );
    assert_eq!(run_output(&program), "meow4");
}

#[test]
fn method_arguments_follow_the_receiver() {
    let mut b = AstBuilder::new();
    let base = b.var("base", Type::INT);
    let k = b.var("k", Type::INT);
    let br = b.var_ref("base");
    let kr = b.var_ref("k");
    let sum = b.binary(BinaryOp::Add, br, kr);
    let ret = b.return_stmt(Some(sum));
    let body = b.block(vec![], vec![ret]);
    let add = b.function("add", Type::INT, vec![k], body);
    let class = b.class(
        "Adder",
        None,
        &[],
        vec![ClassMember::Field(base), ClassMember::Method(add)],
    );
    let a = b.var("a", Type::named("Adder"));
    let make = b.new_object("Adder");
    let create = set(&mut b, "a", make);
    let ar = b.var_ref("a");
    let five = b.int(5);
    let call = b.method_call(ar, "add", vec![five]);
    let print = b.print(vec![call]);
    let program = with_main(
        &mut b,
        vec![Decl::Class(class)],
        vec![a],
        vec![create, print],
    );
    // the field is never set, so it reads as zero
    assert_eq!(run_output(&program), "5");
}

// =============================================================================
// Arrays and runtime checks
// =============================================================================

/// `int[] a; a = NewArray(size, int);` followed by `rest`.
fn with_array(b: &mut AstBuilder, size: i32, rest: Vec<Stmt>) -> Program {
    let a = b.var("a", Type::array(Type::INT));
    let size = b.int(size);
    let make = b.new_array(size, Type::INT);
    let mut stmts = vec![set(b, "a", make)];
    stmts.extend(rest);
    with_main(b, vec![], vec![a], stmts)
}

#[test]
fn arrays_store_load_and_report_length() {
    let mut b = AstBuilder::new();
    let i = b.var("i", Type::INT);
    let sum = b.var("sum", Type::INT);

    // for (i = 0; i < a.length(); i = i + 1) a[i] = i * i;
    let zero = b.int(0);
    let init_target = b.var_ref("i");
    let init = b.assign(init_target, zero);
    let ir = b.var_ref("i");
    let ar = b.var_ref("a");
    let len = b.method_call(ar, "length", vec![]);
    let test = b.binary(BinaryOp::Less, ir, len);
    let next = plus(&mut b, "i", 1);
    let step_target = b.var_ref("i");
    let step = b.assign(step_target, next);
    let ar = b.var_ref("a");
    let ir = b.var_ref("i");
    let elem = b.index(ar, ir);
    let i1 = b.var_ref("i");
    let i2 = b.var_ref("i");
    let square = b.binary(BinaryOp::Mul, i1, i2);
    let fill = b.assign(elem, square);
    let fill_loop = b.for_loop(Some(init), test, Some(step), Stmt::Expr(fill));

    // sum = a[0] + a[1] + a[2] + a[3];
    let mut total = b.int(0);
    for k in 0..4 {
        let ar = b.var_ref("a");
        let k = b.int(k);
        let elem = b.index(ar, k);
        total = b.binary(BinaryOp::Add, total, elem);
    }
    let store_sum = set(&mut b, "sum", total);
    let sr = b.var_ref("sum");
    let space = b.string(" ");
    let ar = b.var_ref("a");
    let len = b.method_call(ar, "length", vec![]);
    let print = b.print(vec![sr, space, len]);

    let a = b.var("a", Type::array(Type::INT));
    let four = b.int(4);
    let make = b.new_array(four, Type::INT);
    let create = set(&mut b, "a", make);
    let program = with_main(
        &mut b,
        vec![],
        vec![a, i, sum],
        vec![create, fill_loop, store_sum, print],
    );
    assert_eq!(run_output(&program), "14 4");
}

#[test]
fn subscript_past_the_end_halts() {
    let mut b = AstBuilder::new();
    let before = b.string("before ");
    let print_before = b.print(vec![before]);
    let ar = b.var_ref("a");
    let two = b.int(2);
    let elem = b.index(ar, two);
    let one = b.int(1);
    let store = Stmt::Expr(b.assign(elem, one));
    let after = b.string("after");
    let print_after = b.print(vec![after]);
    let program = with_array(&mut b, 2, vec![print_before, store, print_after]);

    let compiled = compile(&program);
    let run = Machine::new(&compiled).run();
    assert!(run.halted);
    assert_eq!(run.output, format!("before {SUBSCRIPT_ERROR}"));
}

#[test]
fn negative_subscript_halts() {
    let mut b = AstBuilder::new();
    let ar = b.var_ref("a");
    let minus_one = b.int(-1);
    let elem = b.index(ar, minus_one);
    let print = b.print(vec![elem]);
    let program = with_array(&mut b, 3, vec![print]);

    let compiled = compile(&program);
    let run = Machine::new(&compiled).run();
    assert!(run.halted);
    assert_eq!(run.output, SUBSCRIPT_ERROR);
}

#[test]
fn last_element_is_in_bounds() {
    let mut b = AstBuilder::new();
    let ar = b.var_ref("a");
    let two = b.int(2);
    let elem = b.index(ar, two);
    let nine = b.int(9);
    let store = Stmt::Expr(b.assign(elem, nine));
    let ar = b.var_ref("a");
    let two = b.int(2);
    let elem = b.index(ar, two);
    let print = b.print(vec![elem]);
    let program = with_array(&mut b, 3, vec![store, print]);

    let compiled = compile(&program);
    let run = Machine::new(&compiled).run();
    assert!(!run.halted);
    assert_eq!(run.output, "9");
}

#[test]
fn non_positive_array_size_halts() {
    for size in [0, -3] {
        let mut b = AstBuilder::new();
        let unreachable = b.string("unreachable");
        let print = b.print(vec![unreachable]);
        let program = with_array(&mut b, size, vec![print]);

        let compiled = compile(&program);
        let run = Machine::new(&compiled).run();
        assert!(run.halted, "size {size} did not halt");
        assert_eq!(run.output, ARRAY_SIZE_ERROR);
    }
}

// =============================================================================
// Frames and stream shape
// =============================================================================

#[test]
fn frame_estimate_bounds_actual_use() {
    let mut b = AstBuilder::new();
    let x = b.var("x", Type::INT);
    let y = b.var("y", Type::INT);
    let xr = b.var_ref("x");
    let yr = b.var_ref("y");
    let cmp = b.binary(BinaryOp::GreaterEqual, xr, yr);
    let xr = b.var_ref("x");
    let ret_x = b.return_stmt(Some(xr));
    let yr = b.var_ref("y");
    let ret_y = b.return_stmt(Some(yr));
    let pick = b.if_stmt(cmp, ret_x, Some(ret_y));
    let body = b.block(vec![], vec![pick]);
    let max = b.function("max", Type::INT, vec![x, y], body);

    let ar = b.var_ref("a");
    let zero = b.int(0);
    let elem = b.index(ar, zero);
    let seven = b.int(7);
    let call = b.call("max", vec![elem, seven]);
    let print = b.print(vec![call]);
    let a = b.var("a", Type::array(Type::INT));
    let one = b.int(1);
    let make = b.new_array(one, Type::INT);
    let create = set(&mut b, "a", make);
    let program = with_main(&mut b, vec![Decl::Fn(max)], vec![a], vec![create, print]);

    let compiled = compile(&program);
    assert_eq!(compiled.frames.len(), 2);
    for frame in &compiled.frames {
        assert!(
            frame.used <= frame.estimate,
            "{}: used {} exceeds estimate {}",
            frame.label,
            frame.used,
            frame.estimate
        );
    }
    let main = compiled.frame("main").unwrap();
    let begin = compiled
        .instrs
        .iter()
        .find_map(|i| match i {
            Instr::BeginFunc { frame_size } => Some(*frame_size),
            _ => None,
        })
        .unwrap();
    assert_eq!(compiled.frame("_max").unwrap().estimate, begin);
    assert!(main.used > 0);

    // the machine rejects any access outside the declared frame
    assert_eq!(Machine::new(&compiled).run().output, "7");
}

#[test]
fn stream_uses_only_primitive_comparisons() {
    let mut b = AstBuilder::new();
    let one = b.int(1);
    let two = b.int(2);
    let cmp = b.binary(BinaryOp::Greater, one, two);
    let print = b.print(vec![cmp]);
    let program = with_main(&mut b, vec![], vec![], vec![print]);
    let text = compile(&program).render();

    assert!(text.starts_with("main:\n\tBeginFunc "));
    assert!(text.contains(" < "));
    assert!(!text.contains(" > "));
    assert!(text.contains("LCall _PrintBool"));
    assert!(text.trim_end().ends_with("EndFunc"));
}
