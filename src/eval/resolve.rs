use crate::{
    eval::{parse_number, EvalError, FunctionTable},
    parser::{
        ast::{BinaryOperator, Expr, Prototype},
        visitor::ExprVisitor,
    },
};
use tracing::trace;

/// Checks a function body before it is registered: names must resolve, calls
/// must have the right number of arguments and literals must be valid numbers.
///
/// The function being defined counts as known so it can call itself.
pub struct Resolver<'e> {
    functions: &'e FunctionTable,
    current: &'e Prototype,
}

impl<'e> Resolver<'e> {
    pub fn new(functions: &'e FunctionTable, current: &'e Prototype) -> Self {
        Self { functions, current }
    }

    pub fn check(&mut self, body: &Expr) -> Result<(), EvalError> {
        body.accept(self)
    }

    fn arity_of(&self, function_name: &str) -> Option<usize> {
        if function_name == self.current.function_name {
            return Some(self.current.arity());
        }
        self.functions
            .get(function_name)
            .map(|callable| callable.prototype().arity())
    }
}

impl<'e> ExprVisitor for Resolver<'e> {
    type Value = ();
    type Error = EvalError;

    fn visit_number_literal(&mut self, text: &str) -> Result<(), EvalError> {
        parse_number(text).map(|_| ())
    }

    fn visit_variable_ref(&mut self, name: &str) -> Result<(), EvalError> {
        if self.current.params.iter().any(|param| param == name) {
            Ok(())
        } else {
            Err(EvalError::UnknownVariable(name.to_string()))
        }
    }

    fn visit_binary_op(
        &mut self,
        _: BinaryOperator,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<(), EvalError> {
        lhs.accept(self)?;
        rhs.accept(self)
    }

    fn visit_call(&mut self, function_name: &str, args: &[Expr]) -> Result<(), EvalError> {
        trace!(function_name, "resolving call");

        let expected = self
            .arity_of(function_name)
            .ok_or_else(|| EvalError::UnknownFunction(function_name.to_string()))?;

        if expected != args.len() {
            return Err(EvalError::ArityMismatch {
                function_name: function_name.to_string(),
                expected,
                found: args.len(),
            });
        }

        args.iter().try_for_each(|arg| arg.accept(self))
    }
}
