//! Operator descriptors.
//!
//! Tera's parser is closed, so an operator here is a symbol the syntax
//! rewriter replaces with the keyword of an operator Tera already knows.

use std::fmt;

use serde::Serialize;

/// Number of operands an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    Unary,
    Binary,
}

/// Grouping of chained binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Associativity {
    Left,
    Right,
}

/// Expression node an operator symbol maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorNode {
    Not,
    Or,
    And,
}

impl OperatorNode {
    /// The Tera keyword producing this node.
    pub fn keyword(&self) -> &'static str {
        match self {
            OperatorNode::Not => "not",
            OperatorNode::Or => "or",
            OperatorNode::And => "and",
        }
    }
}

impl fmt::Display for OperatorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A named operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorDescriptor {
    pub symbol: String,
    pub arity: Arity,
    pub precedence: u32,
    /// Only meaningful for binary operators.
    pub associativity: Option<Associativity>,
    pub node: OperatorNode,
}

impl OperatorDescriptor {
    pub fn unary(symbol: impl Into<String>, precedence: u32, node: OperatorNode) -> Self {
        Self {
            symbol: symbol.into(),
            arity: Arity::Unary,
            precedence,
            associativity: None,
            node,
        }
    }

    pub fn binary(
        symbol: impl Into<String>,
        precedence: u32,
        associativity: Associativity,
        node: OperatorNode,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            arity: Arity::Binary,
            precedence,
            associativity: Some(associativity),
            node,
        }
    }
}

/// `!`, `||` and `&&`.
pub fn default_operators() -> Vec<OperatorDescriptor> {
    vec![
        OperatorDescriptor::unary("!", 50, OperatorNode::Not),
        OperatorDescriptor::binary("||", 10, Associativity::Left, OperatorNode::Or),
        OperatorDescriptor::binary("&&", 15, Associativity::Left, OperatorNode::And),
    ]
}
