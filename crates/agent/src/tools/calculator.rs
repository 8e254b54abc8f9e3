use agentcore_core::errors::ToolError;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;

const DEFAULT_PRECISION: u32 = 10;
const MAX_PRECISION: u32 = 15;
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;
const MAX_NESTING_DEPTH: usize = 256;

#[derive(Clone, Copy, Debug, Default)]
pub struct Calculator;

#[async_trait]
impl Tool for Calculator {
    fn name(&self) -> &'static str {
        "calculator"
    }

    fn description(&self) -> &'static str {
        "Evaluate a real-valued arithmetic expression. Supports + - * / % ^, parentheses, \
         the constants pi and e, and sqrt, abs, exp, ln, log, log10, log2, sin, cos, tan, \
         asin, acos, atan, floor, ceil and round."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The arithmetic expression to evaluate, e.g. `2 * (3 + 4)^2`"
                },
                "precision": {
                    "type": "integer",
                    "description": "Decimal places to round the result to (default 10, max 15)"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let expression = input.get("expression").and_then(Value::as_str).ok_or_else(|| {
            ToolError::InvalidArgument("The 'expression' parameter must be a string".to_string())
        })?;
        let precision = match input.get("precision") {
            None | Some(Value::Null) => DEFAULT_PRECISION,
            Some(value) => value.as_u64().map(|p| p.min(u64::from(MAX_PRECISION)) as u32).ok_or_else(
                || {
                    ToolError::InvalidArgument(
                        "The 'precision' parameter must be a non-negative integer".to_string(),
                    )
                },
            )?,
        };

        let result = round_to(evaluate(expression)?, precision);
        Ok(json!({ "expression": expression, "result": number_value(result) }))
    }
}

pub fn evaluate(expression: &str) -> Result<f64, ToolError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(invalid("expression is empty"));
    }

    let mut parser = Parser { tokens, position: 0, depth: 0 };
    let value = parser.expression()?;
    if let Some(token) = parser.peek() {
        return Err(invalid(format!("unexpected {token} at end of expression")));
    }
    if !value.is_finite() {
        return Err(invalid("result is not a finite number"));
    }
    Ok(value)
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
        json!(value as i64)
    } else {
        json!(value)
    }
}

fn invalid(message: impl Into<String>) -> ToolError {
    ToolError::InvalidArgument(message.into())
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    Open,
    Close,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "number `{value}`"),
            Self::Ident(name) => write!(f, "identifier `{name}`"),
            Self::Op(op) => write!(f, "operator `{op}`"),
            Self::Open => f.write_str("`(`"),
            Self::Close => f.write_str("`)`"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ToolError> {
    let chars = input.chars().collect::<Vec<_>>();
    let mut tokens = Vec::new();
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];
        match ch {
            c if c.is_whitespace() => index += 1,
            '0'..='9' | '.' => {
                let start = index;
                while index < chars.len() && (chars[index].is_ascii_digit() || chars[index] == '.')
                {
                    index += 1;
                }
                if index < chars.len() && matches!(chars[index], 'e' | 'E') {
                    let mut lookahead = index + 1;
                    if lookahead < chars.len() && matches!(chars[lookahead], '+' | '-') {
                        lookahead += 1;
                    }
                    if lookahead < chars.len() && chars[lookahead].is_ascii_digit() {
                        index = lookahead;
                        while index < chars.len() && chars[index].is_ascii_digit() {
                            index += 1;
                        }
                    }
                }
                let literal = chars[start..index].iter().collect::<String>();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("malformed number `{literal}`")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = index;
                while index < chars.len()
                    && (chars[index].is_ascii_alphanumeric() || chars[index] == '_')
                {
                    index += 1;
                }
                tokens.push(Token::Ident(chars[start..index].iter().collect::<String>()));
            }
            '*' if chars.get(index + 1) == Some(&'*') => {
                tokens.push(Token::Op('^'));
                index += 2;
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                tokens.push(Token::Op(ch));
                index += 1;
            }
            '(' => {
                tokens.push(Token::Open);
                index += 1;
            }
            ')' => {
                tokens.push(Token::Close);
                index += 1;
            }
            other => return Err(invalid(format!("unexpected character `{other}`"))),
        }
    }

    Ok(tokens)
}

/// Recursive-descent evaluator.
///
/// ```text
/// expression := term (("+" | "-") term)*
/// term       := unary (("*" | "/" | "%") unary)*
/// unary      := ("+" | "-") unary | power
/// power      := primary ("^" unary)?
/// primary    := number | constant | function "(" expression ")" | "(" expression ")"
/// ```
///
/// Every recursive cycle passes through `unary`, so nesting is bounded there.
struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat_op(&mut self, candidates: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(op)) if candidates.contains(op) => {
                let op = *op;
                self.position += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn expect_close(&mut self) -> Result<(), ToolError> {
        match self.next() {
            Some(Token::Close) => Ok(()),
            Some(token) => Err(invalid(format!("expected `)` but found {token}"))),
            None => Err(invalid("missing closing parenthesis")),
        }
    }

    fn expression(&mut self) -> Result<f64, ToolError> {
        let mut value = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ToolError> {
        let mut value = self.unary()?;
        while let Some(op) = self.eat_op(&['*', '/', '%']) {
            let rhs = self.unary()?;
            value = match op {
                '*' => value * rhs,
                _ if rhs == 0.0 => return Err(invalid("division by zero")),
                '/' => value / rhs,
                _ => value % rhs,
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, ToolError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(invalid("expression nested too deeply"));
        }
        self.depth += 1;
        let value = match self.eat_op(&['+', '-']) {
            Some('-') => self.unary().map(|value| -value),
            Some(_) => self.unary(),
            None => self.power(),
        };
        self.depth -= 1;
        value
    }

    fn power(&mut self) -> Result<f64, ToolError> {
        let base = self.primary()?;
        if self.eat_op(&['^']).is_some() {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, ToolError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::Open) => {
                let value = self.expression()?;
                self.expect_close()?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::Open)) {
                    self.position += 1;
                    let argument = self.expression()?;
                    self.expect_close()?;
                    apply_function(&name, argument)
                } else {
                    constant(&name)
                }
            }
            Some(token) => Err(invalid(format!("unexpected {token}"))),
            None => Err(invalid("unexpected end of expression")),
        }
    }
}

fn constant(name: &str) -> Result<f64, ToolError> {
    match name.to_ascii_lowercase().as_str() {
        "pi" => Ok(std::f64::consts::PI),
        "e" => Ok(std::f64::consts::E),
        _ => Err(invalid(format!("unknown constant `{name}`"))),
    }
}

fn apply_function(name: &str, argument: f64) -> Result<f64, ToolError> {
    let value = match name.to_ascii_lowercase().as_str() {
        "sqrt" => argument.sqrt(),
        "abs" => argument.abs(),
        "exp" => argument.exp(),
        "ln" | "log" => argument.ln(),
        "log10" => argument.log10(),
        "log2" => argument.log2(),
        "sin" => argument.sin(),
        "cos" => argument.cos(),
        "tan" => argument.tan(),
        "asin" => argument.asin(),
        "acos" => argument.acos(),
        "atan" => argument.atan(),
        "floor" => argument.floor(),
        "ceil" => argument.ceil(),
        "round" => argument.round(),
        _ => return Err(invalid(format!("unknown function `{name}`"))),
    };
    Ok(value)
}
