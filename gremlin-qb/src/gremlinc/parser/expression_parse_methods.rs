use crate::{
    gremlinc::{
        expression::{
            Comparison, ComparisonOp, Convert, Expression, ExpressionType, FunctionCall, Lambda,
            MemberAccess, Method, MethodCall,
        },
        location::{HasLoc, Loc},
        parser::{
            LambdaParser, ParserError, Rule,
            utils::{PairTools, PairsTools},
        },
    },
    protocol::value::Value,
};
use pest::iterators::Pair;

impl LambdaParser {
    pub(super) fn parse_lambda(pair: Pair<Rule>) -> Result<Expression, ParserError> {
        let loc = pair.loc();
        let mut pairs = pair.into_inner();
        let parameter = pairs.try_next("lambda parameter")?.as_str().to_string();
        let body = Self::parse_expression(pairs.try_next("lambda body")?)?;
        Ok(Expression::with_loc(
            loc,
            ExpressionType::Lambda(Lambda {
                parameter,
                body: Box::new(body),
            }),
        ))
    }

    fn parse_expression(pair: Pair<Rule>) -> Result<Expression, ParserError> {
        match pair.as_rule() {
            Rule::expression => Self::parse_expression(pair.try_inner_next()?),
            Rule::or_expr => Self::parse_binary_chain(pair, |l, r| {
                ExpressionType::Or(Box::new(l), Box::new(r))
            }),
            Rule::and_expr => Self::parse_binary_chain(pair, |l, r| {
                ExpressionType::And(Box::new(l), Box::new(r))
            }),
            Rule::comparison => Self::parse_comparison(pair),
            Rule::unary => Self::parse_unary(pair),
            Rule::lambda => Self::parse_lambda(pair),
            _ => Self::parse_primary(pair),
        }
    }

    /// Left-associative fold of `a op b op c`.
    fn parse_binary_chain(
        pair: Pair<Rule>,
        combine: fn(Expression, Expression) -> ExpressionType,
    ) -> Result<Expression, ParserError> {
        let loc = pair.loc();
        let mut pairs = pair.into_inner();
        let first = Self::parse_expression(pairs.try_next("operand")?)?;
        pairs.try_fold(first, |acc, next| {
            let right = Self::parse_expression(next)?;
            Ok(Expression::with_loc(loc.clone(), combine(acc, right)))
        })
    }

    fn parse_comparison(pair: Pair<Rule>) -> Result<Expression, ParserError> {
        let loc = pair.loc();
        let mut pairs = pair.into_inner();
        let left = Self::parse_expression(pairs.try_next("comparison operand")?)?;
        let Some(op) = pairs.next() else {
            return Ok(left);
        };
        let op = match op.as_str() {
            "==" => ComparisonOp::Eq,
            "!=" => ComparisonOp::Neq,
            "<" => ComparisonOp::Lt,
            "<=" => ComparisonOp::Lte,
            ">" => ComparisonOp::Gt,
            ">=" => ComparisonOp::Gte,
            other => return Err(ParserError::from(format!("Unknown comparison operator {other}"))),
        };
        let right = Self::parse_expression(pairs.try_next("right-hand operand")?)?;
        Ok(Expression::with_loc(
            loc,
            ExpressionType::Comparison(Comparison {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }),
        ))
    }

    fn parse_unary(pair: Pair<Rule>) -> Result<Expression, ParserError> {
        let loc = pair.loc();
        let mut negations = 0;
        let mut operand = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::not_op => negations += 1,
                Rule::cast => operand = Some(Self::parse_cast(inner)?),
                Rule::postfix => operand = Some(Self::parse_postfix(inner)?),
                other => return Err(ParserError::from(format!("Unexpected {other:?} in unary"))),
            }
        }
        let operand = operand.ok_or_else(|| ParserError::from("Expected operand after `!`"))?;
        Ok((0..negations).fold(operand, |inner, _| {
            Expression::with_loc(loc.clone(), ExpressionType::Not(Box::new(inner)))
        }))
    }

    fn parse_cast(pair: Pair<Rule>) -> Result<Expression, ParserError> {
        let loc = pair.loc();
        let mut pairs = pair.into_inner();
        let type_name = pairs.try_next("cast type")?.as_str().to_string();
        let inner = Self::parse_unary(pairs.try_next("cast operand")?)?;
        Ok(Expression::with_loc(
            loc,
            ExpressionType::Convert(Convert {
                type_name,
                inner: Box::new(inner),
            }),
        ))
    }

    fn parse_postfix(pair: Pair<Rule>) -> Result<Expression, ParserError> {
        let postfix_loc = pair.loc();
        let mut pairs = pair.into_inner();
        let primary = Self::parse_primary(pairs.try_next("primary expression")?)?;
        pairs.try_fold(primary, |target, suffix| {
            // each link of the chain spans from the start of the primary to its own end
            let end = suffix.loc().end;
            let len = end.byte_offset - postfix_loc.start.byte_offset;
            let loc = Loc::new(
                postfix_loc.start,
                end,
                postfix_loc.span.get(..len).unwrap_or_default().to_string(),
            );
            match suffix.as_rule() {
                Rule::member_access => {
                    let member = suffix.try_inner_next()?.as_str().to_string();
                    Ok(Expression::with_loc(
                        loc,
                        ExpressionType::Member(MemberAccess {
                            target: Box::new(target),
                            member,
                        }),
                    ))
                }
                Rule::method_call => {
                    let mut inner = suffix.into_inner();
                    let method = Method::from_name(inner.try_next("method name")?.as_str());
                    let args = match inner.next() {
                        Some(arguments) => Self::parse_arguments(arguments)?,
                        None => Vec::new(),
                    };
                    Ok(Expression::with_loc(
                        loc,
                        ExpressionType::MethodCall(MethodCall {
                            target: Box::new(target),
                            method,
                            args,
                        }),
                    ))
                }
                other => Err(ParserError::from(format!("Unexpected {other:?} after operand"))),
            }
        })
    }

    fn parse_arguments(pair: Pair<Rule>) -> Result<Vec<Expression>, ParserError> {
        pair.into_inner().map(Self::parse_expression).collect()
    }

    fn parse_primary(pair: Pair<Rule>) -> Result<Expression, ParserError> {
        let loc = pair.loc();
        let expr = match pair.as_rule() {
            Rule::null => ExpressionType::Null,
            Rule::boolean => ExpressionType::Constant(Value::Boolean(pair.as_str() == "true")),
            Rule::integer => ExpressionType::Constant(Value::I64(
                pair.as_str()
                    .parse::<i64>()
                    .map_err(|_| ParserError::from("Invalid integer value"))?,
            )),
            Rule::float => ExpressionType::Constant(Value::F64(
                pair.as_str()
                    .parse::<f64>()
                    .map_err(|_| ParserError::from("Invalid float value"))?,
            )),
            Rule::string_literal => {
                ExpressionType::Constant(Value::String(unescape(pair.try_inner_next()?.as_str())))
            }
            Rule::array_literal => ExpressionType::Array(
                pair.into_inner()
                    .map(Self::parse_expression)
                    .collect::<Result<_, _>>()?,
            ),
            Rule::step_label => ExpressionType::StepLabel(pair.try_inner_next()?.as_str().to_string()),
            Rule::function_call => {
                let mut inner = pair.into_inner();
                let name = inner.try_next("function name")?.as_str().to_string();
                let args = match inner.next() {
                    Some(arguments) => Self::parse_arguments(arguments)?,
                    None => Vec::new(),
                };
                ExpressionType::FunctionCall(FunctionCall { name, args })
            }
            Rule::parenthesized => return Self::parse_expression(pair.try_inner_next()?),
            Rule::identifier => ExpressionType::Parameter(pair.as_str().to_string()),
            other => return Err(ParserError::from(format!("Unexpected {other:?} in expression"))),
        };
        Ok(Expression::with_loc(loc, expr))
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
