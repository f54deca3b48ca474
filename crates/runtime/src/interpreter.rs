mod expr;
mod interp_errors;
mod operators;
mod stmt;

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use frontend::ast::Program;
use tools::errors::{CodeErr, ReportCodeErr};
use tracing::debug;

pub use interp_errors::RuntimeError;

use super::environment::{create_global_env, Env, Environment};
use super::resolver::Annotations;
use super::values::RuntimeVal;

// Outcome of a statement. A return unwinds every enclosing statement until
// the function call that consumes it
#[derive(Debug, PartialEq)]
pub(crate) enum Completion {
    Normal(RuntimeVal),
    Return(RuntimeVal),
}

pub struct Interpreter {
    // Scope of the top level statements, child of the built-ins scope.
    // References the resolver left unannotated are looked up from here
    globals: Env,
    // Merged from every run and never pruned, entries of finished REPL lines stay
    annotations: Annotations,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(std::io::stdout())))
    }

    // 'print' writes into output
    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        let builtins = create_global_env(output);

        Self {
            globals: Environment::new_child(&builtins),
            annotations: Annotations::default(),
        }
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    // Runs the program against the state left by previous runs. Returns one
    // value per top level statement
    pub fn run(
        &mut self,
        program: &Program,
        annotations: Annotations,
    ) -> Result<Vec<RuntimeVal>, RuntimeError> {
        self.run_nodes(program, annotations).map_err(|(e, _)| e)
    }

    // Same as run, errors carry the line of the faulty top level statement
    pub fn execute_program(
        &mut self,
        program: &Program,
        annotations: Annotations,
    ) -> Result<Vec<RuntimeVal>, CodeErr> {
        self.run_nodes(program, annotations)
            .map_err(|(e, line)| e.to_glob_err(line))
    }

    fn run_nodes(
        &mut self,
        program: &Program,
        annotations: Annotations,
    ) -> Result<Vec<RuntimeVal>, (RuntimeError, u64)> {
        debug!(statements = program.nodes.len(), annotations = annotations.len(), "run");
        self.annotations.extend(annotations);

        let globals = self.globals.clone();
        let mut results = Vec::with_capacity(program.nodes.len());

        for node in &program.nodes {
            let value = match self.execute(&node.stmt, &globals).map_err(|e| (e, node.line))? {
                Completion::Normal(v) | Completion::Return(v) => v,
            };

            results.push(value);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{ResolveError, Resolver};
    use frontend::lexer::Lexer;
    use frontend::parser::Parser;
    use pretty_assertions::assert_eq;

    fn parse(code: &str) -> Program {
        let mut lexer: Lexer = Default::default();
        lexer.tokenize(code.to_string()).expect("Should tokenize");

        let mut parser: Parser = Default::default();
        parser.build_ast(lexer.tokens).expect("Should parse")
    }

    struct Session {
        interpreter: Interpreter,
        output: Rc<RefCell<Vec<u8>>>,
    }

    impl Session {
        fn new() -> Self {
            let output = Rc::new(RefCell::new(Vec::new()));

            Self {
                interpreter: Interpreter::with_output(output.clone()),
                output,
            }
        }

        fn run(&mut self, code: &str) -> Result<Vec<RuntimeVal>, RuntimeError> {
            let program = parse(code);
            let annotations = Resolver::new().resolve(&program).expect("Should resolve");

            self.interpreter.run(&program, annotations)
        }

        fn printed(&self) -> String {
            String::from_utf8(self.output.borrow().clone()).expect("utf8 output")
        }
    }

    // Output of a whole program
    fn output_of(code: &str) -> String {
        let mut session = Session::new();
        session.run(code).expect("Should run");
        session.printed()
    }

    fn last_value(code: &str) -> Result<RuntimeVal, RuntimeError> {
        let mut session = Session::new();
        session.run(code).map(|mut values| values.pop().unwrap_or(RuntimeVal::Void))
    }

    #[test]
    fn inner_declaration_shadows() {
        assert_eq!(output_of("x := 1 { x := 2 print(x) } print(x)"), "2\n1\n");
    }

    #[test]
    fn closures_share_their_environment() {
        let code = "
            count := 0
            inc := () => {
                count = count + 1
                return count
            }
            print(inc())
            print(inc())
        ";
        assert_eq!(output_of(code), "1\n2\n");

        let code = "
            func make() {
                n := 0
                return () => {
                    n++
                    return n
                }
            }
            a := make()
            b := make()
            print(a(), a(), b())
        ";
        assert_eq!(output_of(code), "1 2 1\n");
    }

    #[test]
    fn two_closures_see_same_cell() {
        let code = "
            func pair() {
                n := 0
                inc := () => { n = n + 10 }
                inc()
                get := () => { return n }
                inc()
                return get
            }
            print(pair()())
        ";
        assert_eq!(output_of(code), "20\n");
    }

    #[test]
    fn self_reference_never_runs() {
        let program = parse("print(\"side effect\") x := x");

        assert_eq!(
            Resolver::new().resolve(&program),
            Err(ResolveError::SelfReferentialInitializer("x".into()))
        );
    }

    #[test]
    fn return_unwinds_every_level() {
        let code = "
            func f() {
                i := 0
                while true {
                    i++
                    if i == 3 {
                        return i
                        print(\"after return\")
                    }
                    print(i)
                }
                print(\"after loop\")
            }
            print(f())
            print(\"done\")
        ";
        assert_eq!(output_of(code), "1\n2\n3\ndone\n");
    }

    #[test]
    fn bare_return_gives_void() {
        assert_eq!(last_value("func f() { return } f()"), Ok(RuntimeVal::Void));
        assert_eq!(last_value("func f() { x := 1 } f()"), Ok(RuntimeVal::Void));
    }

    #[test]
    fn class_round_trip() {
        assert_eq!(
            last_value("class C { m() { return 1 } } i := C() i.m()"),
            Ok(RuntimeVal::Number(1))
        );
        assert_eq!(
            last_value("class C { m() { return 1 } } i := C() i.missing"),
            Err(RuntimeError::UndefinedProperty("missing".into()))
        );
    }

    #[test]
    fn fields_are_created_on_assignment() {
        assert_eq!(
            last_value("class P {} i := P() i.x = 5 i.x"),
            Ok(RuntimeVal::Number(5))
        );
        assert_eq!(
            last_value("5.x = 1"),
            Err(RuntimeError::NotAnInstance("number".into()))
        );
        assert_eq!(
            last_value("n := 5 n.x"),
            Err(RuntimeError::NotAnInstance("number".into()))
        );
    }

    #[test]
    fn fields_shadow_methods() {
        let code = "
            class A { m() { return 1 } }
            a := A()
            a.m = 2
            a.m
        ";
        assert_eq!(last_value(code), Ok(RuntimeVal::Number(2)));
    }

    #[test]
    fn methods_see_this() {
        let code = "
            class Counter {
                init(start) {
                    this.count = start
                }
                next() {
                    this.count = this.count + 1
                    return this.count
                }
            }
            c := Counter(10)
            c.next()
            print(c.next(), c.count)
        ";
        assert_eq!(output_of(code), "12 12\n");
    }

    #[test]
    fn bound_method_keeps_its_instance() {
        let code = "
            class Box {
                init(v) { this.v = v }
                get() { return this.v }
            }
            getter := Box(7).get
            print(getter())
        ";
        assert_eq!(output_of(code), "7\n");
    }

    #[test]
    fn class_without_init() {
        assert!(matches!(last_value("class A {} A()"), Ok(RuntimeVal::Instance { .. })));
        assert_eq!(
            last_value("class A {} A(1)"),
            Err(RuntimeError::ArityMismatch("A".into(), 0, 1))
        );
    }

    #[test]
    fn class_referenced_from_its_methods() {
        let code = "
            {
                class Node {
                    spawn() { return Node() }
                }
                n := Node()
                print(n.spawn())
            }
        ";
        assert_eq!(output_of(code), "<instance of Node>\n");
    }

    #[test]
    fn arithmetic_type_errors() {
        assert_eq!(
            last_value("1 + true"),
            Err(RuntimeError::InvalidOperands("+".into(), "number".into(), "bool".into()))
        );
        assert!(last_value("\"a\" * 2").is_err());
        assert!(last_value("1 < \"b\"").is_err());
    }

    #[test]
    fn expressions() {
        assert_eq!(last_value("2 + 3 * 4"), Ok(RuntimeVal::Number(14)));
        assert_eq!(last_value("2 ** -1"), Ok(RuntimeVal::Number(0)));
        assert_eq!(last_value("-(3 - 5)"), Ok(RuntimeVal::Number(2)));
        assert_eq!(last_value("!(1 < 2)"), Ok(RuntimeVal::Bool(false)));
        assert_eq!(last_value("\"ab\" + \"c\" == \"abc\""), Ok(RuntimeVal::Bool(true)));
        assert_eq!(last_value("1 == true"), Ok(RuntimeVal::Bool(false)));
        assert_eq!(last_value("1 / 0"), Err(RuntimeError::DivisionByZero));
        assert_eq!(
            last_value("-true"),
            Err(RuntimeError::InvalidUnaryOperand("-".into(), "bool".into()))
        );
        assert_eq!(
            last_value("!1"),
            Err(RuntimeError::InvalidUnaryOperand("!".into(), "number".into()))
        );
    }

    #[test]
    fn logical_operators_short_circuit() {
        // The right side would fail if it was evaluated
        assert_eq!(last_value("false && missing"), Ok(RuntimeVal::Bool(false)));
        assert_eq!(last_value("true || missing"), Ok(RuntimeVal::Bool(true)));
        assert_eq!(last_value("true && false"), Ok(RuntimeVal::Bool(false)));
        assert_eq!(
            last_value("true && 1"),
            Err(RuntimeError::NonBooleanOperand("&&".into(), "number".into()))
        );
        assert_eq!(
            last_value("1 || true"),
            Err(RuntimeError::NonBooleanOperand("||".into(), "number".into()))
        );
    }

    #[test]
    fn conditions_must_be_bool() {
        assert_eq!(
            last_value("if 1 { }"),
            Err(RuntimeError::NonBooleanCondition("number".into()))
        );
        assert_eq!(
            last_value("while \"yes\" { }"),
            Err(RuntimeError::NonBooleanCondition("string".into()))
        );
    }

    #[test]
    fn if_else_chain() {
        let code = "
            func sign(n) {
                if n < 0 {
                    return \"negative\"
                } else if n == 0 {
                    return \"zero\"
                } else {
                    return \"positive\"
                }
            }
            print(sign(-4), sign(0), sign(9))
        ";
        assert_eq!(output_of(code), "negative zero positive\n");
    }

    #[test]
    fn while_loop_and_updates() {
        let code = "
            i := 0
            total := 0
            while i < 5 {
                total = total + i
                i++
            }
            i--
            print(i, total)
        ";
        assert_eq!(output_of(code), "4 10\n");
    }

    #[test]
    fn recursion() {
        let code = "
            func fib(n) {
                if n < 2 { return n }
                return fib(n - 1) + fib(n - 2)
            }
            fib(15)
        ";
        assert_eq!(last_value(code), Ok(RuntimeVal::Number(610)));

        // Arrow functions can call themselves through their variable
        let code = "
            {
                fact := (n) => {
                    if n <= 1 { return 1 }
                    return n * fact(n - 1)
                }
                print(fact(5))
            }
        ";
        assert_eq!(output_of(code), "120\n");
    }

    #[test]
    fn calls_check_arity_and_callee() {
        assert_eq!(
            last_value("func f(a, b) { return a } f(1)"),
            Err(RuntimeError::ArityMismatch("f".into(), 2, 1))
        );
        assert_eq!(
            last_value("x := 3 x()"),
            Err(RuntimeError::NotCallable("number".into()))
        );
    }

    #[test]
    fn undefined_variables_fail_loudly() {
        assert_eq!(
            last_value("print(y)"),
            Err(RuntimeError::UndefinedVariable("y".into()))
        );
        // Assignment never creates a variable
        assert_eq!(
            last_value("y = 1"),
            Err(RuntimeError::UndefinedVariable("y".into()))
        );
    }

    #[test]
    fn first_error_stops_the_run() {
        let mut session = Session::new();

        assert!(session.run("print(1) x := 1 + true print(2)").is_err());
        assert_eq!(session.printed(), "1\n");
    }

    #[test]
    fn one_value_per_statement() {
        let mut session = Session::new();
        let values = session.run("x := 4 x = x + 1 x print(x) func f() {}").unwrap();

        assert_eq!(
            values,
            vec![
                RuntimeVal::Number(4),
                RuntimeVal::Number(5),
                RuntimeVal::Number(5),
                RuntimeVal::Void,
                RuntimeVal::Void,
            ]
        );
    }

    #[test]
    fn builtins() {
        assert_eq!(output_of("print(VERSION)"), "0.0.1\n");
        assert_eq!(output_of("print()"), "\n");
        assert_eq!(output_of("print(print)"), "<native function print>\n");
    }

    #[test]
    fn state_survives_between_runs() {
        let mut session = Session::new();

        session.run("func double(n) { return n * 2 } base := 21").unwrap();
        session.run("{ v := double(base) print(v) }").unwrap();

        assert_eq!(session.printed(), "42\n");
        // Annotations of both runs are kept
        assert_eq!(session.interpreter.annotations().len(), 2);
    }

    #[test]
    fn runs_are_deterministic() {
        let code = "
            class Acc {
                init() { this.items = 0 }
                add(n) { this.items = this.items + n }
            }
            a := Acc()
            i := 0
            while i < 10 { a.add(i * i) i++ }
            print(a.items, i)
        ";

        assert_eq!(output_of(code), output_of(code));
        assert_eq!(output_of(code), "285 10\n");
    }

    #[test]
    fn execute_program_reports_line() {
        let program = parse("a := 1\nb := 2\nc := a + true");
        let annotations = Resolver::new().resolve(&program).unwrap();
        let mut interpreter = Interpreter::with_output(Rc::new(RefCell::new(Vec::new())));

        let err = interpreter.execute_program(&program, annotations).unwrap_err();

        assert_eq!(err.line(), 2);
    }
}
