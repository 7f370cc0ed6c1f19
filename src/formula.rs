use crate::stats::StatsRecord;
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

lazy_static! {
    static ref FIELD_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref FIELD_REF_REGEX: Regex = Regex::new(r"\[([A-Za-z_][A-Za-z0-9_]*)\]").unwrap();
}

/// Parser recursion cap; formulas nested deeper are malformed.
const MAX_NESTING_DEPTH: usize = 64;

/// Token cap; keeps the expression tree small enough that recursive
/// evaluation cannot exhaust the stack.
const MAX_FORMULA_TOKENS: usize = 512;

/// Outcome of evaluating a formula against a stats record.
///
/// A formula either produces a finite number or it produces nothing at all;
/// there is no error detail beyond that. Serializes as a plain number or the
/// string `"NA"` so API payloads match what dashboard consumers render.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalResult {
    Number(f64),
    NotApplicable,
}

impl EvalResult {
    pub fn is_na(&self) -> bool {
        matches!(self, EvalResult::NotApplicable)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            EvalResult::Number(v) => Some(*v),
            EvalResult::NotApplicable => None,
        }
    }
}

impl Serialize for EvalResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EvalResult::Number(v) => serializer.serialize_f64(*v),
            EvalResult::NotApplicable => serializer.serialize_str("NA"),
        }
    }
}

impl<'de> Deserialize<'de> for EvalResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(EvalResult::Number(v)),
            Raw::Text(s) if s == "NA" => Ok(EvalResult::NotApplicable),
            Raw::Text(s) => Err(D::Error::custom(format!(
                "invalid evaluation result: {}",
                s
            ))),
        }
    }
}

/// Parsed formula expression.
#[derive(Debug, serde::Deserialize, serde::Serialize, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Field(String),
    Negate(Box<Expr>),
    Binary {
        lhs: Box<Expr>,
        operator: char,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Evaluates the expression against `stats`.
    ///
    /// Missing fields read as 0. Returns `None` when a division has a zero
    /// divisor or a result is non-finite.
    pub fn evaluate(&self, stats: &StatsRecord) -> Option<f64> {
        match self {
            Expr::Number(v) => Some(*v),
            Expr::Field(name) => Some(stats.value_or_zero(name)),
            Expr::Negate(inner) => Some(-inner.evaluate(stats)?),
            Expr::Binary { lhs, operator, rhs } => {
                let lhs_val = lhs.evaluate(stats)?;
                let rhs_val = rhs.evaluate(stats)?;

                let value = match operator {
                    '+' => lhs_val + rhs_val,
                    '-' => lhs_val - rhs_val,
                    '*' => lhs_val * rhs_val,
                    '/' => {
                        if rhs_val == 0.0 {
                            return None;
                        }
                        lhs_val / rhs_val
                    }
                    _ => return None,
                };

                value.is_finite().then_some(value)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Field(String),
    Op(char),
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '[' => {
                let mut name = String::new();
                i += 1;
                while i < chars.len() && chars[i] != ']' {
                    name.push(chars[i]);
                    i += 1;
                }
                if i == chars.len() {
                    // Unterminated field reference
                    return None;
                }
                i += 1;
                if !FIELD_NAME_REGEX.is_match(&name) {
                    return None;
                }
                tokens.push(Token::Field(name));
            }
            '+' | '-' | '*' | '/' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    literal.push(chars[i]);
                    i += 1;
                }
                let value = literal.parse::<f64>().ok()?;
                tokens.push(Token::Number(value));
            }
            _ => return None,
        }
    }

    Some(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek_op(&self, allowed: &str) -> Option<char> {
        match self.tokens.get(self.pos) {
            Some(Token::Op(c)) if allowed.contains(*c) => Some(*c),
            _ => None,
        }
    }

    fn parse_expr(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_term()?;
        while let Some(operator) = self.peek_op("+-") {
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                operator,
                rhs: Box::new(rhs),
            };
        }
        Some(lhs)
    }

    fn parse_term(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_factor()?;
        while let Some(operator) = self.peek_op("*/") {
            self.pos += 1;
            let rhs = self.parse_factor()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                operator,
                rhs: Box::new(rhs),
            };
        }
        Some(lhs)
    }

    fn parse_factor(&mut self) -> Option<Expr> {
        match self.tokens.get(self.pos).cloned()? {
            Token::Number(v) => {
                self.pos += 1;
                Some(Expr::Number(v))
            }
            Token::Field(name) => {
                self.pos += 1;
                Some(Expr::Field(name))
            }
            Token::Op('-') => {
                self.pos += 1;
                let inner = self.descend(|p| p.parse_factor())?;
                Some(Expr::Negate(Box::new(inner)))
            }
            Token::Op('+') => {
                self.pos += 1;
                self.descend(|p| p.parse_factor())
            }
            Token::LParen => {
                self.pos += 1;
                let inner = self.descend(|p| p.parse_expr())?;
                match self.tokens.get(self.pos) {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Some(inner)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Runs a recursive parse step, failing once nesting exceeds the cap.
    fn descend<T>(&mut self, step: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return None;
        }
        self.depth += 1;
        let result = step(self);
        self.depth -= 1;
        result
    }
}

/// Parses a formula string into an expression tree.
///
/// Returns `None` for any malformed input: empty formula, unbalanced
/// parentheses or brackets, invalid field names, unknown characters, or
/// trailing tokens. Formulas longer than `MAX_FORMULA_TOKENS` tokens or
/// nested deeper than `MAX_NESTING_DEPTH` are rejected the same way, so
/// adversarial input cannot overflow the stack.
pub fn parse_formula(formula: &str) -> Option<Expr> {
    let tokens = tokenize(formula)?;
    if tokens.is_empty() || tokens.len() > MAX_FORMULA_TOKENS {
        return None;
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return None;
    }
    Some(expr)
}

/// Evaluates a formula string against a stats record.
///
/// This is the public contract used by every chart and KPI surface: the
/// result is a finite number, or `NotApplicable` when the formula is
/// malformed, a division hits a zero divisor, or the result is non-finite.
/// It never panics and never returns an error. Fields referenced by the
/// formula but absent from `stats` contribute 0.
///
/// ```
/// use messmass::formula::{EvalResult, evaluate};
/// use messmass::stats::StatsRecord;
///
/// let mut stats = StatsRecord::new();
/// stats.set("visitWeb", 150.0);
/// stats.set("eventAttendees", 200.0);
///
/// let result = evaluate("[visitWeb] / [eventAttendees] * 100", &stats);
/// assert_eq!(result, EvalResult::Number(75.0));
///
/// let result = evaluate("[visitWeb] / [missing]", &stats);
/// assert_eq!(result, EvalResult::NotApplicable);
/// ```
pub fn evaluate(formula: &str, stats: &StatsRecord) -> EvalResult {
    match parse_formula(formula).and_then(|expr| expr.evaluate(stats)) {
        Some(value) if value.is_finite() => EvalResult::Number(value),
        _ => EvalResult::NotApplicable,
    }
}

/// Distinct field names referenced by a formula, in first-appearance order.
pub fn referenced_fields(formula: &str) -> Vec<String> {
    let mut fields = Vec::new();
    for captures in FIELD_REF_REGEX.captures_iter(formula) {
        let name = captures[1].to_string();
        if !fields.contains(&name) {
            fields.push(name);
        }
    }
    fields
}
