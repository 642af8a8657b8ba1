//! Traversal contract between the AST and whatever consumes it.
//!
//! Expression nodes produce a value, so they live in [`ExprVisitor`].
//! Definitions only register something in the visitor's own state, which is
//! what [`Visitor`] adds. A code generator implements both; helpers that only
//! walk function bodies can stop at [`ExprVisitor`].

use crate::parser::ast::{BinaryOperator, Expr, Function, Prototype};

pub trait ExprVisitor {
    type Value;
    type Error;

    fn visit_number_literal(&mut self, text: &str) -> Result<Self::Value, Self::Error>;

    fn visit_variable_ref(&mut self, name: &str) -> Result<Self::Value, Self::Error>;

    fn visit_binary_op(
        &mut self,
        op: BinaryOperator,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<Self::Value, Self::Error>;

    fn visit_call(
        &mut self,
        function_name: &str,
        args: &[Expr],
    ) -> Result<Self::Value, Self::Error>;
}

pub trait Visitor: ExprVisitor {
    fn visit_prototype(&mut self, prototype: &Prototype) -> Result<(), Self::Error>;

    fn visit_function(&mut self, function: &Function) -> Result<(), Self::Error>;
}
