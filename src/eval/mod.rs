//! A tree-walking evaluator driven through the AST visitor.
//!
//! Definitions are checked and registered as they are visited; every entry
//! function synthesized from a bare expression is evaluated on the spot.

use crate::parser::{
    ast::{BinaryOperator, Expr, Function, Ident, Program, Prototype},
    parse_program,
    visitor::{ExprVisitor, Visitor},
    ENTRY_FUNCTION_NAME,
};
use environment::Environment;
use nom::{combinator::all_consuming, error::Error as NomError, number::complete::double, IResult};
use resolve::Resolver;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, trace};

mod environment;
mod natives;
mod resolve;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("variable {0} not found")]
    UnknownVariable(Ident),

    #[error("function {0} does not exist")]
    UnknownFunction(Ident),

    #[error("function {function_name}: expected {expected} argument(s), got {found}")]
    ArityMismatch {
        function_name: Ident,
        expected: usize,
        found: usize,
    },

    #[error("function {0} cannot be redefined")]
    Redefinition(Ident),

    #[error("function {function_name} was declared with {declared} parameter(s), not {found}")]
    SignatureMismatch {
        function_name: Ident,
        declared: usize,
        found: usize,
    },

    #[error("function {function_name}: parameter {parameter} appears more than once")]
    DuplicateParameter { function_name: Ident, parameter: Ident },

    #[error("invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("extern function {0} has no definition")]
    UnresolvedExtern(Ident),

    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),
}

/// Something a call can land on.
#[derive(Debug, Clone)]
pub enum Callable {
    /// An `extern` with no body to run.
    Declared(Prototype),
    Native(Prototype, NativeFn),
    Defined(Function),
}

impl Callable {
    pub fn prototype(&self) -> &Prototype {
        match self {
            Callable::Declared(prototype) | Callable::Native(prototype, _) => prototype,
            Callable::Defined(function) => &function.prototype,
        }
    }
}

pub type FunctionTable = HashMap<Ident, Callable>;

pub type NativeFn = fn(&[f64]) -> f64;

/// Converts the raw text of a number literal, rejecting things like `1.2.3`.
pub fn parse_number(text: &str) -> Result<f64, EvalError> {
    let parsed: IResult<&str, f64, NomError<&str>> =
        all_consuming(double::<&str, NomError<&str>>)(text);

    parsed
        .map(|(_, value)| value)
        .map_err(|_| EvalError::InvalidNumber(text.to_string()))
}

fn apply(op: BinaryOperator, lhs: f64, rhs: f64) -> f64 {
    match op {
        BinaryOperator::Plus => lhs + rhs,
        BinaryOperator::Minus => lhs - rhs,
        BinaryOperator::Multiply => lhs * rhs,
        // Unordered comparison: NaN on either side counts as less.
        BinaryOperator::LessThan => {
            if lhs < rhs || lhs.is_nan() || rhs.is_nan() {
                1.0
            } else {
                0.0
            }
        }
    }
}

fn check_parameters(prototype: &Prototype) -> Result<(), EvalError> {
    let mut seen = HashSet::new();
    match prototype.params.iter().find(|param| !seen.insert(param.as_str())) {
        Some(parameter) => Err(EvalError::DuplicateParameter {
            function_name: prototype.function_name.clone(),
            parameter: parameter.clone(),
        }),
        None => Ok(()),
    }
}

/// One activation: the functions it may call and the parameters it can see.
struct Frame<'e> {
    functions: &'e FunctionTable,
    scope: Environment,
    depth: usize,
    max_depth: usize,
}

impl<'e> Frame<'e> {
    fn root(functions: &'e FunctionTable, max_depth: usize) -> Self {
        Self {
            functions,
            scope: Environment::new(),
            depth: 0,
            max_depth,
        }
    }

    fn invoke(&self, callable: &'e Callable, args: Vec<f64>) -> Result<f64, EvalError> {
        match callable {
            Callable::Declared(prototype) => {
                Err(EvalError::UnresolvedExtern(prototype.function_name.clone()))
            }
            Callable::Native(_, native) => Ok(native(&args)),
            Callable::Defined(function) => {
                if self.depth >= self.max_depth {
                    return Err(EvalError::CallDepthExceeded(self.max_depth));
                }

                let mut frame = Frame {
                    functions: self.functions,
                    scope: Environment::bind(&function.prototype.params, args),
                    depth: self.depth + 1,
                    max_depth: self.max_depth,
                };

                function.body.accept(&mut frame)
            }
        }
    }
}

impl<'e> ExprVisitor for Frame<'e> {
    type Value = f64;
    type Error = EvalError;

    fn visit_number_literal(&mut self, text: &str) -> Result<f64, EvalError> {
        trace!(text, "visit_number_literal");
        parse_number(text)
    }

    fn visit_variable_ref(&mut self, name: &str) -> Result<f64, EvalError> {
        trace!(name, "visit_variable_ref");
        self.scope
            .get(name)
            .ok_or_else(|| EvalError::UnknownVariable(name.to_string()))
    }

    fn visit_binary_op(
        &mut self,
        op: BinaryOperator,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<f64, EvalError> {
        trace!(%op, "visit_binary_op");
        let lhs = lhs.accept(self)?;
        let rhs = rhs.accept(self)?;
        Ok(apply(op, lhs, rhs))
    }

    fn visit_call(&mut self, function_name: &str, args: &[Expr]) -> Result<f64, EvalError> {
        trace!(function_name, depth = self.depth, "visit_call");

        let functions = self.functions;
        let callable = functions
            .get(function_name)
            .ok_or_else(|| EvalError::UnknownFunction(function_name.to_string()))?;

        let expected = callable.prototype().arity();
        if expected != args.len() {
            return Err(EvalError::ArityMismatch {
                function_name: function_name.to_string(),
                expected,
                found: args.len(),
            });
        }

        let values = args
            .iter()
            .map(|arg| arg.accept(self))
            .collect::<Result<Vec<f64>, EvalError>>()?;

        self.invoke(callable, values)
    }
}

/// Keeps every function defined so far, so successive programs (one per REPL
/// line, say) can build on each other.
pub struct Evaluator {
    functions: FunctionTable,
    max_call_depth: usize,
    results: Vec<f64>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            results: vec![],
        }
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Registers the program's definitions and returns the value of each
    /// top-level expression, in order.
    pub fn feed(&mut self, program: &Program) -> Result<Vec<f64>, EvalError> {
        self.results.clear();
        program.accept(self)?;
        Ok(std::mem::take(&mut self.results))
    }

    /// Parses `source` and feeds it.
    pub fn eval_source(&mut self, source: &str) -> Result<Vec<f64>, crate::Error> {
        let program = parse_program(source)?;
        Ok(self.feed(&program)?)
    }

    /// Runs a registered function by name.
    pub fn call(&self, function_name: &str, args: &[f64]) -> Result<f64, EvalError> {
        let callable = self
            .functions
            .get(function_name)
            .ok_or_else(|| EvalError::UnknownFunction(function_name.to_string()))?;

        let expected = callable.prototype().arity();
        if expected != args.len() {
            return Err(EvalError::ArityMismatch {
                function_name: function_name.to_string(),
                expected,
                found: args.len(),
            });
        }

        self.frame().invoke(callable, args.to_vec())
    }

    pub fn lookup(&self, function_name: &str) -> Option<&Callable> {
        self.functions.get(function_name)
    }

    fn frame(&self) -> Frame<'_> {
        Frame::root(&self.functions, self.max_call_depth)
    }

    fn evaluate_entry(&mut self, function: &Function) -> Result<(), EvalError> {
        Resolver::new(&self.functions, &function.prototype).check(&function.body)?;

        let value = function.body.accept(&mut self.frame())?;
        debug!(value, "evaluated top-level expression");
        self.results.push(value);

        Ok(())
    }
}

/// Top-level expressions see no parameters, just like the entry function.
impl ExprVisitor for Evaluator {
    type Value = f64;
    type Error = EvalError;

    fn visit_number_literal(&mut self, text: &str) -> Result<f64, EvalError> {
        self.frame().visit_number_literal(text)
    }

    fn visit_variable_ref(&mut self, name: &str) -> Result<f64, EvalError> {
        self.frame().visit_variable_ref(name)
    }

    fn visit_binary_op(
        &mut self,
        op: BinaryOperator,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<f64, EvalError> {
        self.frame().visit_binary_op(op, lhs, rhs)
    }

    fn visit_call(&mut self, function_name: &str, args: &[Expr]) -> Result<f64, EvalError> {
        self.frame().visit_call(function_name, args)
    }
}

impl Visitor for Evaluator {
    fn visit_prototype(&mut self, prototype: &Prototype) -> Result<(), EvalError> {
        trace!(%prototype, "visit_prototype");
        check_parameters(prototype)?;

        if let Some(existing) = self.functions.get(&prototype.function_name) {
            let declared = existing.prototype().arity();
            if declared != prototype.arity() {
                return Err(EvalError::SignatureMismatch {
                    function_name: prototype.function_name.clone(),
                    declared,
                    found: prototype.arity(),
                });
            }
            return Ok(());
        }

        let callable = match natives::lookup(&prototype.function_name, prototype.arity()) {
            Some(native) => Callable::Native(prototype.clone(), native),
            None => Callable::Declared(prototype.clone()),
        };
        debug!(%prototype, "declared extern");
        self.functions
            .insert(prototype.function_name.clone(), callable);

        Ok(())
    }

    fn visit_function(&mut self, function: &Function) -> Result<(), EvalError> {
        let prototype = &function.prototype;
        trace!(%prototype, "visit_function");
        check_parameters(prototype)?;

        if prototype.function_name == ENTRY_FUNCTION_NAME {
            return self.evaluate_entry(function);
        }

        match self.functions.get(&prototype.function_name) {
            Some(Callable::Defined(_)) => {
                return Err(EvalError::Redefinition(prototype.function_name.clone()));
            }
            Some(existing) if existing.prototype().arity() != prototype.arity() => {
                return Err(EvalError::SignatureMismatch {
                    function_name: prototype.function_name.clone(),
                    declared: existing.prototype().arity(),
                    found: prototype.arity(),
                });
            }
            _ => {}
        }

        Resolver::new(&self.functions, prototype).check(&function.body)?;

        debug!(%prototype, "defined function");
        self.functions
            .insert(prototype.function_name.clone(), Callable::Defined(function.clone()));

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn eval(evaluator: &mut Evaluator, input: &str) -> Result<Vec<f64>, EvalError> {
        let program = parse_program(input).unwrap();
        evaluator.feed(&program)
    }

    #[test]
    fn top_level_expressions() {
        struct TestData {
            input: &'static str,
            expected: Vec<f64>,
        }

        let test_data = vec![
            TestData {
                input: "1+1",
                expected: vec![2.0],
            },
            TestData {
                input: "2 * 3 + 4",
                expected: vec![10.0],
            },
            TestData {
                input: "2 * (3 + 4)",
                expected: vec![14.0],
            },
            TestData {
                input: "10 - 4 - 3",
                expected: vec![3.0],
            },
            TestData {
                input: "1 < 2; 2 < 1; 1 < 1",
                expected: vec![1.0, 0.0, 0.0],
            },
            TestData {
                input: "1 + 2 < 4",
                expected: vec![1.0],
            },
            TestData {
                input: "0.5 * 4",
                expected: vec![2.0],
            },
            TestData {
                input: "def f(x) x",
                expected: vec![],
            },
        ];

        test_data.into_iter().for_each(|test_datum| {
            let values = Evaluator::new().eval_source(test_datum.input).unwrap();
            assert_eq!(values, test_datum.expected, "input: {}", test_datum.input);
        });
    }

    #[test]
    fn functions_and_calls() {
        let mut evaluator = Evaluator::new();

        let values = evaluator
            .eval_source(
                r#"
                def square(x) x * x
                def sumsquares(a, b) square(a) + square(b)
                sumsquares(3, 4)
            "#,
            )
            .unwrap();

        assert_eq!(values, vec![25.0]);
        assert_eq!(evaluator.call("square", &[1.5]), Ok(2.25));
    }

    #[test]
    fn definitions_persist_between_programs() {
        let mut evaluator = Evaluator::new();

        assert_eq!(evaluator.eval_source("def twice(x) x * 2").unwrap(), vec![]);
        assert_eq!(evaluator.eval_source("twice(21)").unwrap(), vec![42.0]);
        assert_eq!(evaluator.eval_source("twice(1) + twice(2)").unwrap(), vec![6.0]);
    }

    #[test]
    fn each_call_gets_its_own_scope() {
        let mut evaluator = Evaluator::new();

        let values = evaluator
            .eval_source("def f(a) a * 2; def g(a, b) f(b) + a; g(1, 10)")
            .unwrap();
        assert_eq!(values, vec![21.0]);

        let error = evaluator.eval_source("def h(y) f(y) + a").unwrap_err();
        assert!(matches!(
            error,
            crate::Error::Eval(EvalError::UnknownVariable(ref name)) if name == "a"
        ));
    }

    #[test]
    fn externs_bind_to_natives() {
        let mut evaluator = Evaluator::new();

        let values = evaluator
            .eval_source("extern sqrt(x); extern pow(base, exponent); sqrt(16) + pow(2, 3)")
            .unwrap();

        assert_eq!(values, vec![12.0]);
        assert!(matches!(evaluator.lookup("sqrt"), Some(Callable::Native(..))));
    }

    #[test]
    fn extern_can_be_defined_later() {
        let mut evaluator = Evaluator::new();

        evaluator.eval_source("extern offset(x)").unwrap();
        assert!(matches!(evaluator.lookup("offset"), Some(Callable::Declared(_))));
        assert_eq!(
            eval(&mut evaluator, "offset(1)"),
            Err(EvalError::UnresolvedExtern("offset".to_string()))
        );

        evaluator.eval_source("def offset(y) y + 100").unwrap();
        assert_eq!(evaluator.eval_source("offset(1)").unwrap(), vec![101.0]);
    }

    #[test]
    fn evaluation_errors() {
        struct TestData {
            input: &'static str,
            expected: EvalError,
        }

        let test_data = vec![
            TestData {
                input: "def f(x) y",
                expected: EvalError::UnknownVariable("y".to_string()),
            },
            TestData {
                input: "x + 1",
                expected: EvalError::UnknownVariable("x".to_string()),
            },
            TestData {
                input: "nope(1)",
                expected: EvalError::UnknownFunction("nope".to_string()),
            },
            TestData {
                input: "def f(a, b) a; f(1)",
                expected: EvalError::ArityMismatch {
                    function_name: "f".to_string(),
                    expected: 2,
                    found: 1,
                },
            },
            TestData {
                input: "def f(x) x; def f(y) y",
                expected: EvalError::Redefinition("f".to_string()),
            },
            TestData {
                input: "extern f(a); extern f(a, b)",
                expected: EvalError::SignatureMismatch {
                    function_name: "f".to_string(),
                    declared: 1,
                    found: 2,
                },
            },
            TestData {
                input: "extern f(a); def f(a, b) a",
                expected: EvalError::SignatureMismatch {
                    function_name: "f".to_string(),
                    declared: 1,
                    found: 2,
                },
            },
            TestData {
                input: "def f(x, x) x",
                expected: EvalError::DuplicateParameter {
                    function_name: "f".to_string(),
                    parameter: "x".to_string(),
                },
            },
            TestData {
                input: "1.2.3 + 1",
                expected: EvalError::InvalidNumber("1.2.3".to_string()),
            },
            TestData {
                input: "def f(x) x * 1..5",
                expected: EvalError::InvalidNumber("1..5".to_string()),
            },
            TestData {
                input: "extern mystery(x); mystery(1)",
                expected: EvalError::UnresolvedExtern("mystery".to_string()),
            },
        ];

        test_data.into_iter().for_each(|test_datum| {
            let result = eval(&mut Evaluator::new(), test_datum.input);
            assert_eq!(result, Err(test_datum.expected), "input: {}", test_datum.input);
        });
    }

    #[test]
    fn first_definition_wins() {
        let mut evaluator = Evaluator::new();

        evaluator.eval_source("def f(x) x + 1").unwrap();
        assert!(evaluator.eval_source("def f(x) x + 2").is_err());

        assert_eq!(evaluator.eval_source("f(1)").unwrap(), vec![2.0]);
    }

    #[test]
    fn failed_definition_is_not_registered() {
        let mut evaluator = Evaluator::new();

        assert!(evaluator.eval_source("def broken(x) missing").is_err());
        assert!(evaluator.lookup("broken").is_none());

        evaluator.eval_source("def broken(x) x").unwrap();
        assert_eq!(evaluator.eval_source("broken(7)").unwrap(), vec![7.0]);
    }

    #[test]
    fn recursion_is_bounded() {
        let mut evaluator = Evaluator::new().with_max_call_depth(16);

        evaluator.eval_source("def forever(x) forever(x + 1)").unwrap();

        assert_eq!(
            eval(&mut evaluator, "forever(0)"),
            Err(EvalError::CallDepthExceeded(16))
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_number("42"), Ok(42.0));
        assert_eq!(parse_number("12.5"), Ok(12.5));
        assert_eq!(
            parse_number("1.2.3"),
            Err(EvalError::InvalidNumber("1.2.3".to_string()))
        );
    }

    #[test]
    fn less_than_is_unordered() {
        assert_eq!(apply(BinaryOperator::LessThan, f64::NAN, 1.0), 1.0);
        assert_eq!(apply(BinaryOperator::LessThan, 2.0, 1.0), 0.0);
    }

    #[test]
    fn parse_errors_surface_through_eval_source() {
        let error = Evaluator::new().eval_source("def a b c").unwrap_err();

        assert!(matches!(error, crate::Error::Parse(_)));
    }

    #[test]
    fn bare_expressions_can_be_visited_directly() {
        let mut evaluator = Evaluator::new();
        eval(&mut evaluator, "def inc(x) x + 1").unwrap();

        let expr = Expr::binary(
            BinaryOperator::Multiply,
            Expr::call("inc", vec![Expr::number("2")]),
            Expr::number("4"),
        );

        assert_eq!(expr.accept(&mut evaluator), Ok(12.0));
        assert_eq!(
            Expr::variable("x").accept(&mut evaluator),
            Err(EvalError::UnknownVariable("x".to_string()))
        );
    }
}
