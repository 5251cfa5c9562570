//! Ownership and teardown of parsed expression trees.

use super::parser::Expr;

#[derive(Debug, PartialEq)]
/// An owned expression tree.
///
/// Not `Clone`: a tree is released exactly once, either by
/// [`teardown`] (which consumes it) or when it goes out of scope.
pub struct ExpressionTree {
    root: Expr,
    nodes: usize,
}

impl ExpressionTree {
    pub(crate) fn new(root: Expr, nodes: usize) -> Self {
        Self { root, nodes }
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// Number of nodes (constants and operators) in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes
    }
}

impl From<Expr> for ExpressionTree {
    fn from(root: Expr) -> Self {
        let mut nodes = 0usize;
        let mut pending = vec![&root];
        while let Some(node) = pending.pop() {
            nodes += 1;
            if let Expr::Binary { left, right, .. } = node {
                pending.push(right);
                pending.push(left);
            }
        }
        Self { root, nodes }
    }
}

impl Drop for ExpressionTree {
    fn drop(&mut self) {
        release(std::mem::replace(&mut self.root, Expr::Constant(0.0)));
    }
}

/// Releases every node of `tree` and returns how many were released.
pub fn teardown(mut tree: ExpressionTree) -> usize {
    let root = std::mem::replace(&mut tree.root, Expr::Constant(0.0));
    let released = release(root);
    log::trace!("released {released} expression nodes");
    released
}

// Children are detached before their parent is dropped, so arbitrarily deep
// chains never recurse through `Box` drops.
fn release(root: Expr) -> usize {
    let mut released = 0usize;
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if let Expr::Binary { left, right, .. } = node {
            pending.push(*right);
            pending.push(*left);
        }
        released += 1;
    }
    released
}

#[cfg(test)]
mod tests {
    use super::{teardown, ExpressionTree};
    use crate::expr::parser::{BinaryOp, Expr};

    fn chain(len: usize) -> Expr {
        let mut expr = Expr::Constant(1.0);
        for _ in 0..len {
            expr = Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(expr),
                right: Box::new(Expr::Constant(1.0)),
            };
        }
        expr
    }

    #[test]
    fn from_expr_counts_every_node() {
        let tree = ExpressionTree::from(chain(3));
        assert_eq!(tree.node_count(), 7);
    }

    #[test]
    fn teardown_reports_released_nodes() {
        let tree = ExpressionTree::from(chain(10));
        let expected = tree.node_count();
        assert_eq!(teardown(tree), expected);
    }

    #[test]
    fn deep_tree_drops_without_recursing() {
        let tree = ExpressionTree::from(chain(200_000));
        assert_eq!(tree.node_count(), 400_001);
        drop(tree);
    }
}
