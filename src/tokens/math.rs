use std::str::FromStr;

use rust_decimal::Decimal;

#[derive(Clone, Debug, PartialEq)]
struct Quantity {
    value: Decimal,
    unit: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(Quantity),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

/// Evaluates an arithmetic token value such as `16px * 1.5` or `(8 + 4) / 3`.
///
/// Returns `None` unless the whole input is an expression with at least one
/// binary operator, so plain values (`8px`, `-4px`, `0 4px 8px`, `#0000`) pass
/// through untouched. Operands may carry one unit kind; mixing units fails.
pub fn evaluate(input: &str, fraction_digits: u32) -> Option<String> {
    let tokens = tokenize(input)?;
    if !has_binary_operator(&tokens) {
        return None;
    }
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
    };
    let result = parser.expression()?;
    if parser.pos != tokens.len() {
        return None;
    }
    let value = result.value.round_dp(fraction_digits).normalize();
    Some(format!("{value}{}", result.unit.unwrap_or_default()))
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let chars = input.chars().collect::<Vec<_>>();
    let mut tokens = Vec::new();
    let mut index = 0;
    while index < chars.len() {
        let ch = chars[index];
        let simple = match ch {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::Open),
            ')' => Some(Token::Close),
            _ => None,
        };
        if let Some(token) = simple {
            tokens.push(token);
            index += 1;
            continue;
        }
        if ch.is_whitespace() {
            index += 1;
            continue;
        }
        if !(ch.is_ascii_digit() || ch == '.') {
            return None;
        }

        let start = index;
        while index < chars.len() && (chars[index].is_ascii_digit() || chars[index] == '.') {
            index += 1;
        }
        let mut digits = chars[start..index].iter().collect::<String>();
        if digits.starts_with('.') {
            digits.insert(0, '0');
        }
        let value = Decimal::from_str(&digits).ok()?;

        let unit_start = index;
        while index < chars.len() && (chars[index].is_ascii_alphabetic() || chars[index] == '%') {
            index += 1;
        }
        let unit = (index > unit_start).then(|| chars[unit_start..index].iter().collect());
        tokens.push(Token::Number(Quantity { value, unit }));
    }
    Some(tokens)
}

fn has_binary_operator(tokens: &[Token]) -> bool {
    tokens.iter().enumerate().any(|(index, token)| match token {
        Token::Star | Token::Slash => true,
        Token::Plus | Token::Minus => index > 0
            && matches!(tokens[index - 1], Token::Number(_) | Token::Close),
        _ => false,
    })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn expression(&mut self) -> Option<Quantity> {
        let mut left = self.term()?;
        while let Some(op) = self.peek() {
            let op = op.clone();
            match op {
                Token::Plus | Token::Minus => {
                    self.pos += 1;
                    let right = self.term()?;
                    left = add(left, right, op == Token::Minus)?;
                }
                _ => break,
            }
        }
        Some(left)
    }

    fn term(&mut self) -> Option<Quantity> {
        let mut left = self.factor()?;
        while let Some(op) = self.peek() {
            let op = op.clone();
            match op {
                Token::Star => {
                    self.pos += 1;
                    left = multiply(left, self.factor()?)?;
                }
                Token::Slash => {
                    self.pos += 1;
                    left = divide(left, self.factor()?)?;
                }
                _ => break,
            }
        }
        Some(left)
    }

    fn factor(&mut self) -> Option<Quantity> {
        match self.next()?.clone() {
            Token::Number(quantity) => Some(quantity),
            Token::Minus => {
                let inner = self.factor()?;
                Some(Quantity {
                    value: -inner.value,
                    unit: inner.unit,
                })
            }
            Token::Plus => self.factor(),
            Token::Open => {
                let inner = self.expression()?;
                match self.next()? {
                    Token::Close => Some(inner),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

fn combine_units(left: Option<String>, right: Option<String>) -> Option<Option<String>> {
    match (left, right) {
        (Some(left), Some(right)) if left == right => Some(Some(left)),
        (Some(_), Some(_)) => None,
        (left, right) => Some(left.or(right)),
    }
}

fn add(left: Quantity, right: Quantity, subtract: bool) -> Option<Quantity> {
    let unit = combine_units(left.unit, right.unit)?;
    let value = if subtract {
        left.value.checked_sub(right.value)?
    } else {
        left.value.checked_add(right.value)?
    };
    Some(Quantity { value, unit })
}

fn multiply(left: Quantity, right: Quantity) -> Option<Quantity> {
    if left.unit.is_some() && right.unit.is_some() {
        return None;
    }
    Some(Quantity {
        value: left.value.checked_mul(right.value)?,
        unit: left.unit.or(right.unit),
    })
}

fn divide(left: Quantity, right: Quantity) -> Option<Quantity> {
    if right.value.is_zero() {
        return None;
    }
    let unit = match (left.unit, right.unit) {
        (unit, None) => unit,
        (Some(left), Some(right)) if left == right => None,
        _ => return None,
    };
    Some(Quantity {
        value: left.value.checked_div(right.value)?,
        unit,
    })
}
