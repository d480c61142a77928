//! Idzey interpreter: evaluates AST nodes with a tree-walking evaluator.
//!
//! The runtime is split into the tagged [`Value`] union (which carries all
//! coercion and operator behavior), the chained [`Environment`] scopes,
//! an internal control-flow enum, and the [`Interpreter`] itself.

pub mod env;
pub mod flow;
pub mod interpreter;
pub mod value;

pub use env::{EnvRef, Environment};
pub use interpreter::{Interpreter, ScopeMode};
pub use value::{Function, NativeCallback, Value};

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    use idzey_lexer::Lexer;
    use idzey_parser::Parser;

    use super::*;

    /// Output sink the tests can read back after interpretation.
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).expect("output is valid UTF-8")
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(source: &str, configure: impl FnOnce(&mut Interpreter)) -> Result<String, String> {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse().map_err(|e| format!("Parse error: {}", e))?;
        let buffer = SharedBuffer::default();
        let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
        configure(&mut interpreter);
        interpreter
            .interpret(&program)
            .map_err(|e| format!("Runtime error: {}", e))?;
        Ok(buffer.contents())
    }

    fn run_program(source: &str) -> Result<String, String> {
        capture(source, |_| {})
    }

    fn expect_output(source: &str, expected: &str) {
        match run_program(source) {
            Ok(actual) => assert_eq!(actual, expected, "Program: {}", source),
            Err(e) => panic!("Program failed: {}\nInput: {}", e, source),
        }
    }

    fn expect_error(source: &str, needle: &str) {
        match run_program(source) {
            Ok(out) => panic!("Expected error containing {:?}, got output {:?}", needle, out),
            Err(e) => assert!(e.contains(needle), "Error {:?} does not contain {:?}", e, needle),
        }
    }

    #[test]
    fn arithmetic_and_printing() {
        expect_output("var a = 2 + 3 * 4; println(a);", "14\n");
    }

    #[test]
    fn fibonacci_via_recursion() {
        expect_output(
            "func fib(n) { if (n < 2) { return n; } return fib(n-1) + fib(n-2); }\nprintln(fib(10));",
            "55\n",
        );
    }

    #[test]
    fn loop_and_break() {
        expect_output(
            "var s = 0; loop (var i = 0; i < 100; i = i + 1) { if (i == 10) { break; } s = s + i; } println(s);",
            "45\n",
        );
    }

    #[test]
    fn array_mutation_and_length() {
        expect_output(
            "var a[] = [1,2,3]; a[5] = 99; println(a.length); println(a[4]);",
            "6\nnull\n",
        );
    }

    #[test]
    fn string_concatenation_with_plus() {
        expect_output("var n = 7; println(\"answer=\" + n);", "answer=7\n");
    }

    #[test]
    fn short_circuit_and_equality_coercion() {
        expect_output("println(0 || \"hi\"); println(\"5\" == 5);", "true\ntrue\n");
    }

    #[test]
    fn integer_results_stay_integers() {
        expect_output("println(8 / 2);", "4\n");
        expect_output("println(7 / 2);", "3.5\n");
        expect_output("println(2.5 + 1.5);", "4\n");
        expect_output("println(1 / 0);", "0\n");
        expect_output("println(7 % 0);", "0\n");
        expect_output("println(-5 + 8);", "3\n");
    }

    #[test]
    fn summing_a_range_in_a_loop() {
        expect_output(
            "var sum = 0; loop (var i = 0; i <= 10; i = i + 1) { sum = sum + i; } println(sum);",
            "55\n",
        );
    }

    #[test]
    fn while_form_and_infinite_form() {
        expect_output("var i = 0; loop (i < 3) { i = i + 1; } println(i);", "3\n");
        expect_output(
            "var i = 0; loop { i = i + 1; if (i == 5) { break; } } println(i);",
            "5\n",
        );
    }

    #[test]
    fn break_exits_only_the_innermost_loop() {
        expect_output(
            "var hits = 0;\n\
             loop (var i = 0; i < 3; i = i + 1) {\n\
                 loop (var j = 0; j < 10; j = j + 1) {\n\
                     if (j == 1) { break; }\n\
                     hits = hits + 1;\n\
                 }\n\
             }\n\
             println(hits);",
            "3\n",
        );
    }

    #[test]
    fn return_unwinds_out_of_nested_blocks() {
        expect_output(
            "func first(items) { loop (var i = 0; i < items.length; i = i + 1) { { return items[i]; } } return null; }\n\
             println(first([7, 8]));",
            "7\n",
        );
    }

    #[test]
    fn statements_after_return_do_not_run() {
        expect_output(
            "func f() { return 1; println(\"unreachable\"); } println(f());",
            "1\n",
        );
    }

    #[test]
    fn block_scoping_shadows_and_restores() {
        expect_output("var x = 1; { var x = 2; println(x); } println(x);", "2\n1\n");
        // assignment without `var` reaches the outer binding
        expect_output("var x = 1; { x = 2; } println(x);", "2\n");
    }

    #[test]
    fn loop_variable_is_scoped_to_the_loop() {
        expect_error(
            "loop (var i = 0; i < 1; i = i + 1) { } println(i);",
            "Undefined variable 'i'",
        );
    }

    #[test]
    fn loop_body_gets_a_fresh_scope_each_iteration() {
        // each iteration's closure captures its own body scope, so the
        // captured `local` values stay distinct
        expect_output(
            "var fns[] = [];\n\
             loop (var i = 0; i < 3; i = i + 1) {\n\
                 var local = i;\n\
                 func get() { return local; }\n\
                 fns[i] = get;\n\
             }\n\
             println(fns[0](), fns[1](), fns[2]());",
            "0 1 2\n",
        );
    }

    #[test]
    fn short_circuit_skips_the_right_operand() {
        expect_output(
            "var hits = 0;\n\
             func bump() { hits = hits + 1; return true; }\n\
             var a = false && bump();\n\
             var b = true || bump();\n\
             println(hits, a, b);",
            "0 false true\n",
        );
    }

    #[test]
    fn print_forms() {
        expect_output("print(1); print(2); println(3);", "123\n");
        expect_output("print(1, 2, 3);", "1 2 3");
        expect_output("println();", "\n");
        expect_output("print \"a=\" + 1;", "a=1");
        expect_output("println \"hi\";", "hi\n");
    }

    #[test]
    fn assignment_is_an_expression() {
        expect_output("var a = 0; var b = 0; a = b = 5; println(a, b);", "5 5\n");
    }

    #[test]
    fn functions_are_first_class() {
        expect_output("func f() { return 41; } var g = f; println(g() + 1);", "42\n");
        expect_output("func f() { } println(f);", "<function f>\n");
        // a body that never returns yields null
        expect_output("func f() { } println(f());", "null\n");
    }

    #[test]
    fn scalar_indexing_behaves_as_singleton() {
        expect_output("var x = 9; println(x[0]); println(x[1]);", "9\nnull\n");
        expect_output("var s = \"abc\"; println(s[0]); println(s[1]); println(s[5]);", "abc\nb\nnull\n");
        expect_output("var s = \"abc\"; println(s.length);", "3\n");
    }

    #[test]
    fn indexed_assignment_promotes_and_caps() {
        expect_output("var x = 5; x[1] = 6; println(x);", "[5, 6]\n");
        // negative and over-cap indices are silent no-ops
        expect_output("var a[] = [1]; a[-1] = 9; println(a);", "[1]\n");
        expect_output("var a[] = [1]; a[1001] = 9; println(a.length);", "1\n");
        expect_output("var a[] = []; a[2] = 3; println(a);", "[null, null, 3]\n");
    }

    #[test]
    fn else_if_chains() {
        expect_output(
            "func grade(n) { if (n > 89) { return \"A\"; } else if (n > 79) { return \"B\"; } else { return \"C\"; } }\n\
             println(grade(95), grade(85), grade(70));",
            "A B C\n",
        );
    }

    #[test]
    fn comparisons_and_equality_fallbacks() {
        expect_output("println(\"abc\" < \"abd\");", "true\n");
        expect_output("println([1] < [1, 2]);", "true\n");
        expect_output("println([1, 2] == [1, 2]);", "true\n");
        expect_output("println(true == 1);", "true\n");
        expect_output("println(null == null); println(null == 0);", "true\nfalse\n");
    }

    #[test]
    fn runtime_errors() {
        expect_error("println(missing);", "Undefined variable 'missing'");
        expect_error("missing = 1;", "Undefined variable 'missing'");
        expect_error("var x = 1; x();", "Can only call functions");
        expect_error("func f(a) { } f(1, 2);", "Expected 1 arguments but got 2");
        expect_error("break;", "'break' outside of loop");
        expect_error("return 1;", "'return' outside of function");
        expect_error("func f() { break; } f();", "'break' outside of loop");
        expect_error("1 = 2;", "Invalid assignment target");
        expect_error("var a[] = [[1]]; a[0][0] = 2;", "non-variable array");
    }

    #[test]
    fn lexical_scope_is_the_default() {
        let source = "var x = 1;\n\
                      func show() { println(x); }\n\
                      func wrapper() { var x = 2; show(); }\n\
                      wrapper();";
        assert_eq!(run_program(source).unwrap(), "1\n");
    }

    #[test]
    fn dynamic_scope_resolves_against_the_call_site() {
        let source = "var x = 1;\n\
                      func show() { println(x); }\n\
                      func wrapper() { var x = 2; show(); }\n\
                      wrapper();";
        let out = capture(source, |interp| interp.set_scope_mode(ScopeMode::Dynamic)).unwrap();
        assert_eq!(out, "2\n");
    }

    #[test]
    fn strict_division_raises() {
        let err = capture("println(1 / 0);", |interp| interp.set_strict_division(true)).unwrap_err();
        assert!(err.contains("Division by zero"));
        let err = capture("println(1 % 0);", |interp| interp.set_strict_division(true)).unwrap_err();
        assert!(err.contains("Division by zero"));
    }

    #[test]
    fn native_functions_are_callable() {
        let mut parser = Parser::new(Lexer::new("println(add(1, 2)); println(add);"));
        let program = parser.parse().unwrap();
        let buffer = SharedBuffer::default();
        let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
        interpreter.define_native(
            "add",
            Rc::new(|_interp: &mut Interpreter, args: &[Value]| {
                Ok(Value::from_number(args[0].as_number() + args[1].as_number()))
            }),
        );
        interpreter.interpret(&program).unwrap();
        assert_eq!(buffer.contents(), "3\n<native function>\n");
    }
}
