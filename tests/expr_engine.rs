use calc_template::expr::parser::{MAX_EXPRESSION_NODES, MAX_NESTING_DEPTH};
use calc_template::{
    evaluate_expression, free_expression, parse_expression, parse_expression_with, BinaryOp,
    Expr, ExpressionTree, OperatorKind, ParseMode, TemplateError,
};

fn eval(expr_src: &str) -> f64 {
    let tree = parse_expression(expr_src).unwrap();
    let value = evaluate_expression(&tree).unwrap();
    free_expression(tree);
    value
}

fn eval_lenient(expr_src: &str) -> f64 {
    let tree = parse_expression_with(expr_src, ParseMode::Lenient).unwrap();
    evaluate_expression(&tree).unwrap()
}

#[test]
fn evaluates_arithmetic_precedence() {
    assert_eq!(eval("2+3*4"), 14.0);
    assert_eq!(eval("2*3+4"), 10.0);
    assert_eq!(eval("8/4/2"), 1.0);
    assert_eq!(eval("1 + 2 * 3 - 4 / 2"), 5.0);
}

#[test]
fn evaluates_parentheses() {
    assert_eq!(eval("(2+3)*4"), 20.0);
    assert_eq!(eval("((1))"), 1.0);
    assert_eq!(eval("2*(3+(4-1))/3"), 4.0);
}

#[test]
fn same_precedence_chains_fold_left() {
    assert_eq!(eval("10-2-3"), 5.0);
    assert_eq!(eval("100/10/5"), 2.0);
    assert_eq!(eval("10-(2-3)"), 11.0);
}

#[test]
fn division_by_zero_follows_ieee() {
    assert_eq!(eval("1/0"), f64::INFINITY);
    assert_eq!(eval("-1/0"), f64::NEG_INFINITY);
    assert!(eval("0/0").is_nan());
}

#[test]
fn numbers_accept_sign_fraction_and_exponent() {
    assert_eq!(eval("2*-3"), -6.0);
    assert_eq!(eval("1--2"), 3.0);
    assert_eq!(eval(".5+5."), 5.5);
    assert_eq!(eval("1.5e2/3"), 50.0);
    assert_eq!(eval("25E-1*2"), 5.0);
}

#[test]
fn whitespace_is_skipped_between_tokens() {
    assert_eq!(eval("  ( 1 +\t2 ) *\n3  "), 9.0);
}

#[test]
fn parse_builds_strict_binary_tree() {
    let tree = parse_expression("1+2*3").unwrap();
    assert_eq!(tree.node_count(), 5);
    assert_eq!(tree.root().kind(), OperatorKind::Addition);

    match tree.root() {
        Expr::Binary { op, left, right } => {
            assert_eq!(*op, BinaryOp::Add);
            assert_eq!(left.kind(), OperatorKind::Constant);
            assert_eq!(right.kind(), OperatorKind::Multiplication);
        }
        other => panic!("expected binary root, got {other:?}"),
    }
}

#[test]
fn parse_expression_rejects_unmatched_parenthesis() {
    let err = parse_expression("(1+2").unwrap_err();
    assert!(err.to_string().contains("expected ')' to close '(' at 0"));

    let err = parse_expression("1+2)").unwrap_err();
    assert!(err.to_string().contains("unexpected ')' after expression"));
}

#[test]
fn parse_expression_rejects_missing_operand() {
    let err = parse_expression("1+").unwrap_err();
    assert!(err.to_string().contains("reached end of expression"));

    let err = parse_expression("").unwrap_err();
    assert!(err.to_string().contains("reached end of expression"));

    let err = parse_expression("2*()").unwrap_err();
    assert!(err.to_string().contains("found ')'"));
}

#[test]
fn parse_expression_rejects_trailing_and_invalid_characters() {
    let err = parse_expression("1 2").unwrap_err();
    match err {
        TemplateError::SyntaxError { message, pos } => {
            assert!(message.contains("unexpected '2' after expression"));
            assert_eq!(pos, 2);
        }
        other => panic!("expected syntax error, got {other:?}"),
    }

    let err = parse_expression("x+1").unwrap_err();
    assert!(err.to_string().contains("found 'x'"));

    let err = parse_expression("2^3").unwrap_err();
    assert!(err.to_string().contains("unexpected '^'"));
}

#[test]
fn lenient_mode_keeps_best_effort_semantics() {
    assert_eq!(eval_lenient("1+"), 1.0);
    assert_eq!(eval_lenient("(1+2"), 3.0);
    assert_eq!(eval_lenient("(1+2]*2"), 6.0);
    assert_eq!(eval_lenient("4 trailing"), 4.0);
    assert_eq!(eval_lenient("abc"), 0.0);
    assert_eq!(eval_lenient(""), 0.0);
}

#[test]
fn parse_expression_rejects_excessive_nesting() {
    let nested = format!(
        "{}1{}",
        "(".repeat(MAX_NESTING_DEPTH),
        ")".repeat(MAX_NESTING_DEPTH)
    );
    assert_eq!(eval(&nested), 1.0);

    let too_deep = format!(
        "{}1{}",
        "(".repeat(MAX_NESTING_DEPTH + 1),
        ")".repeat(MAX_NESTING_DEPTH + 1)
    );
    let err = parse_expression(&too_deep).unwrap_err();
    assert!(err.to_string().contains("expression nesting exceeds max depth"));

    let err = parse_expression_with(&too_deep, ParseMode::Lenient).unwrap_err();
    assert!(err.to_string().contains("expression nesting exceeds max depth"));
}

#[test]
fn parse_expression_rejects_excessive_node_count() {
    let mut expr = "1".to_string();
    for _ in 0..MAX_EXPRESSION_NODES {
        expr.push_str("+1");
    }
    let err = parse_expression(&expr).unwrap_err();
    assert!(err.to_string().contains("expression exceeds max node count"));
}

#[test]
fn long_chains_within_limits_evaluate() {
    let mut expr = "1".to_string();
    for _ in 0..1500 {
        expr.push_str("+1");
    }
    assert_eq!(eval(&expr), 1501.0);
}

#[test]
fn evaluation_reports_malformed_tree() {
    let tree = ExpressionTree::from(Expr::Binary {
        op: BinaryOp::Add,
        left: Box::new(Expr::Constant(1.0)),
        right: Box::new(Expr::Text("label".to_string())),
    });
    assert_eq!(tree.root().kind(), OperatorKind::Addition);

    let err = evaluate_expression(&tree).unwrap_err();
    match err {
        TemplateError::MalformedTree(message) => assert!(message.contains("\"label\"")),
        other => panic!("expected malformed tree, got {other:?}"),
    }
}

#[test]
fn repeated_parse_evaluate_teardown_cycles_release_every_node() {
    for i in 0..1000 {
        let src = format!("({i} + 1) * 2 - {i} / 4");
        let tree = parse_expression(&src).unwrap();
        let nodes = tree.node_count();
        let value = evaluate_expression(&tree).unwrap();
        let expected = (f64::from(i) + 1.0) * 2.0 - f64::from(i) / 4.0;
        assert_eq!(value, expected);
        assert_eq!(free_expression(tree), nodes);
    }
}
