use crate::parser::visitor::{ExprVisitor, Visitor};
use std::{fmt, fmt::Display};

pub type Ident = String;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Raw numeric text, only checked for well-formedness when converted to a float.
    NumberLiteral(String),
    VariableRef(Ident),
    BinaryOp {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        function_name: Ident,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn number(text: impl Into<String>) -> Self {
        Expr::NumberLiteral(text.into())
    }

    pub fn variable(name: impl Into<Ident>) -> Self {
        Expr::VariableRef(name.into())
    }

    pub fn binary(op: BinaryOperator, lhs: Expr, rhs: Expr) -> Self {
        Expr::BinaryOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn call(function_name: impl Into<Ident>, args: Vec<Expr>) -> Self {
        Expr::Call {
            function_name: function_name.into(),
            args,
        }
    }

    pub fn accept<V>(&self, visitor: &mut V) -> Result<V::Value, V::Error>
    where
        V: ExprVisitor + ?Sized,
    {
        match self {
            Expr::NumberLiteral(text) => visitor.visit_number_literal(text),
            Expr::VariableRef(name) => visitor.visit_variable_ref(name),
            Expr::BinaryOp { op, lhs, rhs } => visitor.visit_binary_op(*op, lhs, rhs),
            Expr::Call {
                function_name,
                args,
            } => visitor.visit_call(function_name, args),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BinaryOperator {
    LessThan,
    Plus,
    Minus,
    Multiply,
}

impl BinaryOperator {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '<' => Some(BinaryOperator::LessThan),
            '+' => Some(BinaryOperator::Plus),
            '-' => Some(BinaryOperator::Minus),
            '*' => Some(BinaryOperator::Multiply),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOperator::LessThan => '<',
            BinaryOperator::Plus => '+',
            BinaryOperator::Minus => '-',
            BinaryOperator::Multiply => '*',
        }
    }

    /// Higher binds tighter. Every operator is left-associative.
    pub fn binding_power(self) -> u8 {
        match self {
            BinaryOperator::LessThan => 10,
            BinaryOperator::Plus | BinaryOperator::Minus => 20,
            BinaryOperator::Multiply => 40,
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub function_name: Ident,
    /// In declaration order; duplicates are left for a later stage to reject.
    pub params: Vec<Ident>,
}

impl Prototype {
    pub fn new(function_name: impl Into<Ident>, params: Vec<Ident>) -> Self {
        Self {
            function_name: function_name.into(),
            params,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn accept<V>(&self, visitor: &mut V) -> Result<(), V::Error>
    where
        V: Visitor + ?Sized,
    {
        visitor.visit_prototype(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub prototype: Prototype,
    pub body: Expr,
}

impl Function {
    pub fn accept<V>(&self, visitor: &mut V) -> Result<(), V::Error>
    where
        V: Visitor + ?Sized,
    {
        visitor.visit_function(self)
    }
}

/// Root of a parsed source: extern declarations and functions, each in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub prototypes: Vec<Prototype>,
    pub functions: Vec<Function>,
}

impl Program {
    /// Visits every prototype, then every function, stopping at the first error.
    pub fn accept<V>(&self, visitor: &mut V) -> Result<(), V::Error>
    where
        V: Visitor + ?Sized,
    {
        for prototype in &self.prototypes {
            prototype.accept(visitor)?;
        }
        for function in &self.functions {
            function.accept(visitor)?;
        }
        Ok(())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::NumberLiteral(text) => write!(f, "{}", text),
            Expr::VariableRef(name) => write!(f, "{}", name),
            Expr::BinaryOp { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            Expr::Call {
                function_name,
                args,
            } => write!(
                f,
                "{}({})",
                function_name,
                args.iter()
                    .map(|arg| arg.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

impl Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function_name, self.params.join(", "))
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def {} {}", self.prototype, self.body)
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for prototype in &self.prototypes {
            writeln!(f, "extern {}", prototype)?;
        }
        for function in &self.functions {
            writeln!(f, "{}", function)?;
        }
        Ok(())
    }
}
