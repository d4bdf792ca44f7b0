//! Interpreter behavior on small programs: control flow, traps, and the
//! embedding API's error cases.

use eyre::Result;
use tinyc::{Error, Module, Trap};

fn run(source: &str, func: &str, params: &[i32]) -> tinyc::Result<i32> {
    let module = Module::parse_str(source)?;
    module.get_func(func)?.call(params)
}

#[test]
fn while_loop_counts() -> Result<()> {
    let result = run(
        r"
        int triple(int n) {
            int total = 0;
            int i = 0;
            while (i < n) {
                total = total + 3;
                i = i + 1;
            }
            return total;
        }
        ",
        "triple",
        &[7],
    )?;
    assert_eq!(result, 21);
    Ok(())
}

#[test]
fn break_leaves_the_loop() -> Result<()> {
    let result = run(
        r"
        int f() {
            int i = 0;
            while (1) {
                if (i >= 5) {
                    break;
                }
                i = i + 1;
            }
            return i;
        }
        ",
        "f",
        &[],
    )?;
    assert_eq!(result, 5);
    Ok(())
}

#[test]
fn continue_rechecks_the_condition() -> Result<()> {
    let result = run(
        r"
        int odd_sum(int n) {
            int total = 0;
            int i = 0;
            while (i < n) {
                i = i + 1;
                int rem = i % 2;
                if (rem == 0) {
                    continue;
                }
                total = total + i;
            }
            return total;
        }
        ",
        "odd_sum",
        &[10],
    )?;
    assert_eq!(result, 25);
    Ok(())
}

#[test]
fn shadowing_reads_the_innermost_binding() -> Result<()> {
    let result = run(
        r"
        int f() {
            int x = 1;
            if (x) {
                int x = 2;
                x = x + 1;
            }
            return x;
        }
        ",
        "f",
        &[],
    )?;
    assert_eq!(result, 1);
    Ok(())
}

#[test]
fn uninitialized_variables_read_zero() -> Result<()> {
    assert_eq!(run("int f() { int x; return x; }", "f", &[])?, 0);
    Ok(())
}

#[test]
fn radix_constants_evaluate() -> Result<()> {
    let source = "int f() { int a = 0x1F + 0b101; int b = 0o17; return a + b; }";
    assert_eq!(run(source, "f", &[])?, 31 + 5 + 15);
    Ok(())
}

#[test]
fn arithmetic_wraps() -> Result<()> {
    let source = "int f(int a, int b) { return a * b; }";
    assert_eq!(run(source, "f", &[1 << 30, 4])?, 0);
    Ok(())
}

#[test]
fn division_by_zero_traps() {
    let err = run("int f(int a) { return a / 0; }", "f", &[1]).unwrap_err();
    assert!(matches!(err, Error::Trap(Trap::DivisionByZero)));

    let err = run("int f(int a) { return a % 0; }", "f", &[1]).unwrap_err();
    assert!(matches!(err, Error::Trap(Trap::DivisionByZero)));
}

#[test]
fn division_overflow_traps() {
    let source = "int f(int a, int b) { return a / b; }";
    let err = run(source, "f", &[i32::MIN, -1]).unwrap_err();
    assert!(matches!(err, Error::Trap(Trap::IntegerOverflow)));
}

#[test]
fn runaway_recursion_traps() {
    let source = r"
        int f(int n) {
            return f(n);
        }
        int start() {
            return f(1);
        }
    ";
    let err = run(source, "start", &[]).unwrap_err();
    assert!(matches!(err, Error::Trap(Trap::CallStackOverflow)));
}

#[test]
fn missing_return_is_reported() {
    let source = "int f(int n) { if (n) { return 1; } }";
    assert_eq!(run(source, "f", &[1]).unwrap(), 1);

    let err = run(source, "f", &[0]).unwrap_err();
    assert!(matches!(err, Error::FuncDidNotReturn));
}

#[test]
fn unknown_function_lookup_fails() {
    let module = Module::parse_str("int f() { return 0; }").unwrap();
    let err = module.get_func("missing").unwrap_err();
    assert!(matches!(err, Error::UnknownFunction(name) if name == "missing"));
}

#[test]
fn param_count_is_checked() {
    let module = Module::parse_str("int f(int a, int b) { return a + b; }").unwrap();
    let err = module.get_func("f").unwrap().call(&[1]).unwrap_err();
    assert!(matches!(err, Error::ParamCountMismatch { expected: 2, actual: 1 }));
}

#[test]
fn parse_errors_surface_through_the_module_api() {
    let err = Module::parse_str("int f( { return 0; }").unwrap_err();
    assert!(matches!(err, Error::ParseError(_)));
}

#[test]
fn calls_evaluate_arguments_in_order() -> Result<()> {
    let result = run(
        r"
        int weigh(int a, int b, int c) {
            int scaled = b * c;
            return a + scaled;
        }
        int start() {
            return weigh(1, 2, 3);
        }
        ",
        "start",
        &[],
    )?;
    assert_eq!(result, 7);
    Ok(())
}
