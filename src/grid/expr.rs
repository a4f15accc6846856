//! Arithmetic sort keys for expression-valued cells.
//!
//! Some cells hold a small arithmetic expression (the work-order progress
//! column renders entry counters such as `3/4`) and must sort by their
//! numeric value. This is a recursive-descent evaluator over numeric
//! literals, `+ - * /`, unary signs and parentheses. Nothing else is
//! accepted.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! ```

use thiserror::Error;

/// Nesting limit for parentheses and unary signs.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("malformed number at offset {0}")]
    BadNumber(usize),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token at offset {0}")]
    UnexpectedToken(usize),
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
    Open,
    Close,
}

/// Evaluate `input` to a finite number.
pub fn evaluate(input: &str) -> Result<f64, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    if let Some((offset, _)) = parser.peek() {
        return Err(ExprError::UnexpectedToken(offset));
    }
    if !value.is_finite() {
        return Err(ExprError::NonFinite);
    }
    Ok(value)
}

/// Sort key for a cell: the evaluated value, or `None` if the cell is not
/// a valid expression.
pub fn sort_key(cell: &str) -> Option<f64> {
    evaluate(cell).ok()
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ExprError> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' => i += 1,
            '+' | '-' | '*' | '/' => {
                tokens.push((i, Token::Op(c)));
                i += 1;
            }
            '(' => {
                tokens.push((i, Token::Open));
                i += 1;
            }
            ')' => {
                tokens.push((i, Token::Close));
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let value = input[start..i]
                    .parse::<f64>()
                    .map_err(|_| ExprError::BadNumber(start))?;
                tokens.push((start, Token::Num(value)));
            }
            _ => {
                let ch = input[i..].chars().next().unwrap_or(c);
                return Err(ExprError::UnexpectedChar(ch, i));
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [(usize, Token)],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<(usize, Token)> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<(usize, Token)> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut value = self.term()?;
        while let Some((_, Token::Op(op @ ('+' | '-')))) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut value = self.factor()?;
        while let Some((_, Token::Op(op @ ('*' | '/')))) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = if op == '*' { value * rhs } else { value / rhs };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }

        let result = match self.next() {
            Some((_, Token::Num(v))) => Ok(v),
            Some((_, Token::Op('-'))) => self.factor().map(|v| -v),
            Some((_, Token::Op('+'))) => self.factor(),
            Some((_, Token::Open)) => {
                let value = self.expr()?;
                match self.next() {
                    Some((_, Token::Close)) => Ok(value),
                    Some((offset, _)) => Err(ExprError::UnexpectedToken(offset)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some((offset, _)) => Err(ExprError::UnexpectedToken(offset)),
            None => Err(ExprError::UnexpectedEnd),
        };

        self.depth -= 1;
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_progress_fractions() {
        assert_eq!(evaluate("3/4"), Ok(0.75));
        assert_eq!(evaluate("10 / 4"), Ok(2.5));
        assert_eq!(evaluate("7"), Ok(7.0));
    }

    #[test]
    fn respects_precedence_and_parentheses() {
        assert_eq!(evaluate("1 + 2 * 3"), Ok(7.0));
        assert_eq!(evaluate("(1 + 2) * 3"), Ok(9.0));
        assert_eq!(evaluate("8 - 2 - 1"), Ok(5.0));
        assert_eq!(evaluate("-2 * -3"), Ok(6.0));
    }

    #[test]
    fn rejects_anything_but_arithmetic() {
        assert_eq!(evaluate(""), Err(ExprError::Empty));
        assert_eq!(evaluate("   "), Err(ExprError::Empty));
        assert_eq!(evaluate("alert(1)"), Err(ExprError::UnexpectedChar('a', 0)));
        assert!(matches!(evaluate("1; 2"), Err(ExprError::UnexpectedChar(';', 1))));
        assert_eq!(evaluate("1 +"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("(1"), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("1 2"), Err(ExprError::UnexpectedToken(2)));
        assert_eq!(evaluate("1..2"), Err(ExprError::BadNumber(0)));
    }

    #[test]
    fn division_by_zero_is_not_a_key() {
        assert_eq!(evaluate("1/0"), Err(ExprError::NonFinite));
        assert_eq!(sort_key("1/0"), None);
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let input = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(evaluate(&input), Err(ExprError::TooDeep));
    }

    #[test]
    fn sort_key_for_plain_text_is_none() {
        assert_eq!(sort_key("2/4"), Some(0.5));
        assert_eq!(sort_key("n/a"), None);
    }
}
