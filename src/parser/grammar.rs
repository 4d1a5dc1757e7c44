//! Expression parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Helper enum for folding postfix operators onto a primary expression
#[derive(Debug, Clone)]
enum PostfixOp {
    Member(Spanned<Identifier>),
    Index(Spanned<Expr>, Span),
    Call(Vec<Spanned<Expr>>, Span),
}

/// Parse the source of a single `${...}` interpolation
///
/// `offset` is the byte position of `source` inside the enclosing template;
/// every span in the result (and in the errors) is relative to the template.
pub fn parse_expression(
    source: &str,
    offset: usize,
) -> Result<Spanned<Expr>, Vec<crate::ParseError>> {
    let end_of_input = source.len() + offset;

    let token_iter = crate::parser::lexer::lex(source, offset).map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        .map((end_of_input..end_of_input).into(), |(t, s): (_, _)| (t, s));

    expression_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn binary(left: Spanned<Expr>, (op, right): (BinaryOp, Spanned<Expr>)) -> Spanned<Expr> {
    let span = left.span.start..right.span.end;
    Spanned::new(
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

fn postfix(object: Spanned<Expr>, op: PostfixOp) -> Spanned<Expr> {
    let start = object.span.start;
    match op {
        PostfixOp::Member(property) => {
            let span = start..property.span.end;
            Spanned::new(
                Expr::Member {
                    object: Box::new(object),
                    property,
                },
                span,
            )
        }
        PostfixOp::Index(index, op_span) => Spanned::new(
            Expr::Index {
                object: Box::new(object),
                index: Box::new(index),
            },
            start..op_span.end,
        ),
        PostfixOp::Call(args, op_span) => Spanned::new(
            Expr::Call {
                callee: Box::new(object),
                args,
            },
            start..op_span.end,
        ),
    }
}

fn expression_parser<'a, I>(
) -> impl Parser<'a, I, Spanned<Expr>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let literal = select! {
            Token::Number(n) => Literal::Number(n),
            Token::String(s) => Literal::String(s),
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Null => Literal::Null,
            Token::Undefined => Literal::Undefined,
        }
        .map_with(|lit, e| Spanned::new(Expr::Literal(lit), span_range(&e.span())));

        let identifier = select! {
            Token::Ident(s) => Identifier::new(s),
        }
        .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

        let arguments = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>();

        let array = arguments
            .clone()
            .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
            .map_with(|items, e| Spanned::new(Expr::Array(items), span_range(&e.span())));

        let parenthesized = expr
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let primary = choice((
            literal,
            identifier
                .clone()
                .map(|id| Spanned::new(Expr::Ident(id.node), id.span)),
            array,
            parenthesized,
        ))
        .labelled("expression");

        // Member access, indexing and calls, all left-associative
        let postfix_op = choice((
            just(Token::Dot)
                .ignore_then(identifier.labelled("property name"))
                .map(PostfixOp::Member),
            expr.clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .map_with(|index, e| PostfixOp::Index(index, span_range(&e.span()))),
            arguments
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .map_with(|args, e| PostfixOp::Call(args, span_range(&e.span()))),
        ));

        let member = primary.foldl(postfix_op.repeated(), postfix).boxed();

        // Prefix operators, right-associative
        let unary_op = choice((
            just(Token::Bang).to(UnaryOp::Not),
            just(Token::Minus).to(UnaryOp::Neg),
        ))
        .map_with(|op, e| (op, span_range(&e.span())));

        let unary = unary_op
            .repeated()
            .foldr(member, |(op, op_span), operand| {
                let span = op_span.start..operand.span.end;
                Spanned::new(
                    Expr::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                )
            })
            .boxed();

        let additive_op = choice((
            just(Token::Plus).to(BinaryOp::Add),
            just(Token::Minus).to(BinaryOp::Sub),
        ));
        let additive = unary
            .clone()
            .foldl(additive_op.then(unary).repeated(), binary)
            .boxed();

        let relational_op = choice((
            just(Token::LessOrEqual).to(BinaryOp::LessOrEqual),
            just(Token::GreaterOrEqual).to(BinaryOp::GreaterOrEqual),
            just(Token::Less).to(BinaryOp::Less),
            just(Token::Greater).to(BinaryOp::Greater),
        ));
        let relational = additive
            .clone()
            .foldl(relational_op.then(additive).repeated(), binary)
            .boxed();

        let equality_op = choice((
            just(Token::StrictEq).to(BinaryOp::StrictEq),
            just(Token::StrictNe).to(BinaryOp::StrictNe),
            just(Token::LooseEq).to(BinaryOp::LooseEq),
            just(Token::LooseNe).to(BinaryOp::LooseNe),
        ));
        let equality = relational
            .clone()
            .foldl(equality_op.then(relational).repeated(), binary)
            .boxed();

        let and = equality
            .clone()
            .foldl(
                just(Token::AndAnd)
                    .to(BinaryOp::And)
                    .then(equality)
                    .repeated(),
                binary,
            )
            .boxed();

        let or = and
            .clone()
            .foldl(
                just(Token::OrOr).to(BinaryOp::Or).then(and).repeated(),
                binary,
            )
            .boxed();

        // Conditional binds loosest; both branches accept a full expression
        or.then(
            just(Token::Question)
                .ignore_then(expr.clone())
                .then_ignore(just(Token::Colon))
                .then(expr)
                .or_not(),
        )
        .map(|(test, branches)| match branches {
            Some((consequent, alternate)) => {
                let span = test.span.start..alternate.span.end;
                Spanned::new(
                    Expr::Conditional {
                        test: Box::new(test),
                        consequent: Box::new(consequent),
                        alternate: Box::new(alternate),
                    },
                    span,
                )
            }
            None => test,
        })
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Spanned<Expr> {
        parse_expression(src, 0).expect("Should parse")
    }

    fn ident_name(expr: &Spanned<Expr>) -> &str {
        match &expr.node {
            Expr::Ident(id) => id.as_str(),
            other => panic!("Expected identifier, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_identifier() {
        let expr = parse("scope");
        assert_eq!(ident_name(&expr), "scope");
        assert_eq!(expr.span, 0..5);
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("42").node, Expr::Literal(Literal::Number(42.0)));
        assert_eq!(
            parse("'!'").node,
            Expr::Literal(Literal::String("!".to_string()))
        );
        assert_eq!(parse("true").node, Expr::Literal(Literal::Bool(true)));
        assert_eq!(parse("null").node, Expr::Literal(Literal::Null));
        assert_eq!(parse("undefined").node, Expr::Literal(Literal::Undefined));
    }

    #[test]
    fn test_parse_helper_call_in_conditional() {
        let expr = parse("$eq(breaking, true) ? '!' : ''");
        match expr.node {
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                match test.node {
                    Expr::Call { callee, args } => {
                        assert_eq!(ident_name(&callee), "$eq");
                        assert_eq!(args.len(), 2);
                        assert_eq!(ident_name(&args[0]), "breaking");
                    }
                    other => panic!("Expected call, got {:?}", other),
                }
                assert_eq!(
                    consequent.node,
                    Expr::Literal(Literal::String("!".to_string()))
                );
                assert_eq!(
                    alternate.node,
                    Expr::Literal(Literal::String(String::new()))
                );
            }
            other => panic!("Expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_member_chain() {
        let expr = parse("commit.scope.length");
        match expr.node {
            Expr::Member { object, property } => {
                assert_eq!(property.node.as_str(), "length");
                assert!(matches!(object.node, Expr::Member { .. }));
            }
            other => panic!("Expected member, got {:?}", other),
        }
        assert_eq!(expr.span, 0..19);
    }

    #[test]
    fn test_parse_index() {
        let expr = parse("issues[0]");
        assert!(matches!(expr.node, Expr::Index { .. }));
        assert_eq!(expr.span, 0..9);
    }

    #[test]
    fn test_additive_binds_tighter_than_equality() {
        let expr = parse("a + b === c");
        match expr.node {
            Expr::Binary { op, left, .. } => {
                assert_eq!(op, BinaryOp::StrictEq);
                assert!(matches!(
                    left.node,
                    Expr::Binary {
                        op: BinaryOp::Add,
                        ..
                    }
                ));
            }
            other => panic!("Expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a || b && c");
        match expr.node {
            Expr::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOp::Or);
                assert!(matches!(
                    right.node,
                    Expr::Binary {
                        op: BinaryOp::And,
                        ..
                    }
                ));
            }
            other => panic!("Expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let expr = parse("a - b - c");
        match expr.node {
            Expr::Binary { op, left, right } => {
                assert_eq!(op, BinaryOp::Sub);
                assert!(matches!(left.node, Expr::Binary { .. }));
                assert_eq!(ident_name(&right), "c");
            }
            other => panic!("Expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_conditional_in_alternate() {
        let expr = parse("a ? 'x' : b ? 'y' : 'z'");
        match expr.node {
            Expr::Conditional { alternate, .. } => {
                assert!(matches!(alternate.node, Expr::Conditional { .. }));
            }
            other => panic!("Expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_operators() {
        let expr = parse("!!flag");
        match expr.node {
            Expr::Unary { op, operand } => {
                assert_eq!(op, UnaryOp::Not);
                assert!(matches!(
                    operand.node,
                    Expr::Unary {
                        op: UnaryOp::Not,
                        ..
                    }
                ));
            }
            other => panic!("Expected unary, got {:?}", other),
        }
    }

    #[test]
    fn test_array_literal_and_parentheses() {
        let expr = parse("$containsAny(types, ['feat', 'fix'])");
        match expr.node {
            Expr::Call { args, .. } => match &args[1].node {
                Expr::Array(items) => assert_eq!(items.len(), 2),
                other => panic!("Expected array, got {:?}", other),
            },
            other => panic!("Expected call, got {:?}", other),
        }

        let expr = parse("(a || b) && c");
        assert!(matches!(
            expr.node,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_spans_are_offset_into_template() {
        let expr = parse_expression("scope", 2).expect("Should parse");
        assert_eq!(expr.span, 2..7);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse_expression("a +", 0).is_err());
        assert!(parse_expression("a ? b", 0).is_err());
        assert!(parse_expression("a b", 0).is_err());
        assert!(parse_expression("a = b", 0).is_err());
        assert!(parse_expression("obj.", 0).is_err());
    }

    #[test]
    fn test_error_span_points_into_template() {
        let errs = parse_expression("a +", 10).expect_err("Should fail");
        match &errs[0] {
            crate::ParseError::Syntax { span, .. } => assert_eq!(span.clone(), 13..13),
        }
    }
}
