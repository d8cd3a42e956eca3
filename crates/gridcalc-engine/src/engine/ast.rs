//! Formula abstract syntax tree.
//!
//! Operator chains such as `1+1+...+1` nest arbitrarily deep on the left, so
//! nothing that walks a whole tree (drop included) may recurse per node.

use std::mem;

use super::cell_ref::CellKey;

/// Formula expression AST.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Single cell reference
    CellRef(Reference),
    /// Rectangular range; the parser only produces it in function-argument position.
    Range { start: Reference, end: Reference },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function call. `name` is kept as written.
    Function { name: String, args: Vec<Expr> },
}

impl Expr {
    fn is_leaf(&self) -> bool {
        matches!(self, Expr::Number(_) | Expr::CellRef(_) | Expr::Range { .. })
    }

    /// Move compound subexpressions into `out`, leaving leaves in their place.
    fn detach_children(&mut self, out: &mut Vec<Expr>) {
        fn take(slot: &mut Expr, out: &mut Vec<Expr>) {
            if !slot.is_leaf() {
                out.push(mem::replace(slot, Expr::Number(0.0)));
            }
        }
        match self {
            Expr::Unary { operand, .. } => take(operand, out),
            Expr::Binary { left, right, .. } => {
                take(left, out);
                take(right, out);
            }
            Expr::Function { args, .. } => out.extend(args.drain(..).filter(|arg| !arg.is_leaf())),
            Expr::Number(_) | Expr::CellRef(_) | Expr::Range { .. } => {}
        }
    }
}

impl Drop for Expr {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.detach_children(&mut stack);
        while let Some(mut expr) = stack.pop() {
            expr.detach_children(&mut stack);
        }
    }
}

/// A textual cell reference and the key it resolves to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub text: String,
    pub key: Option<CellKey>,
}

impl Reference {
    pub fn new(text: &str) -> Reference {
        Reference {
            text: text.to_string(),
            key: CellKey::parse(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}
