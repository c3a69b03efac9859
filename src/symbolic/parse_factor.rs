//! Text to product-of-factors parser.
//!
//! A product is a run of tokens: identifiers, integer literals (optionally signed), the operators
//! `^ * /` and unary `+`/`-`. Scanning stops at the first token that cannot continue a product,
//! e.g. a binary `+`/`-` that separates terms or a bracket. The caller gets the factors read so
//! far together with the number of bytes consumed and decides what to do with the rest.
use crate::symbolic::factor::{MAX_NUMBER_POWER, MAX_POWER, Value, simplify};
use crate::symbolic::symbolic_errors::AlgexError;
use nom::{
    IResult, Parser,
    bytes::complete::take_while,
    character::complete::{digit1, multispace0, one_of, satisfy},
    combinator::recognize,
    sequence::pair,
};
use num::{BigInt, BigRational};
use num_traits::{One, Zero};

/// Outcome of scanning one product.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorScan {
    /// simplified factors read so far
    pub factors: Vec<Value>,
    /// bytes of the input consumed
    pub consumed: usize,
    /// true when the scan stopped at a token that cannot continue a product
    pub boundary: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Op(char),
    Sign(char),
    Number(String),
    Ident(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modifier {
    None,
    Mul,
    Pow,
    Div,
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn blanks(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

fn digits(input: &str) -> IResult<&str, &str> {
    digit1(input)
}

fn operator(input: &str) -> IResult<&str, char> {
    one_of("^*/").parse(input)
}

fn sign(input: &str) -> IResult<&str, char> {
    one_of("+-").parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(is_letter),
        take_while(|c: char| is_letter(c) || c.is_ascii_digit()),
    ))
    .parse(input)
}

/// Reads the next token. `None` marks a boundary: end of text, a sign where none is allowed
/// or a character that is not part of a product.
fn scan_token(sign_ok: bool, s: &str) -> Option<(Token<'_>, usize)> {
    let consumed = |rest: &str| s.len() - rest.len();
    let (rest, _) = blanks(s).ok()?;
    if rest.is_empty() {
        return None;
    }
    if let Ok((after, op)) = operator(rest) {
        return Some((Token::Op(op), consumed(after)));
    }
    let (rest, signed) = match sign(rest) {
        Ok((after, c)) => {
            if !sign_ok {
                return None;
            }
            let (after, _) = blanks(after).ok()?;
            (after, Some(c))
        }
        Err(_) => (rest, None),
    };
    if let Ok((after, lit)) = digits(rest) {
        let text = match signed {
            Some(c) => format!("{}{}", c, lit),
            None => lit.to_string(),
        };
        return Some((Token::Number(text), consumed(after)));
    }
    if let Some(c) = signed {
        return Some((Token::Sign(c), consumed(rest)));
    }
    let (after, name) = identifier(rest).ok()?;
    Some((Token::Ident(name), consumed(after)))
}

fn syntax(s: &str) -> AlgexError {
    AlgexError::Syntax(s.trim().to_string())
}

fn overflow(s: &str) -> AlgexError {
    AlgexError::Overflow(s.trim().to_string())
}

fn in_range(pow: i64) -> bool {
    (-MAX_POWER..=MAX_POWER).contains(&pow)
}

/// exact integer power of a rational; negative powers invert
fn rational_pow(base: &BigRational, n: i64, s: &str) -> Result<BigRational, AlgexError> {
    if base.is_zero() && n < 0 {
        return Err(syntax(s));
    }
    if !(-MAX_NUMBER_POWER..=MAX_NUMBER_POWER).contains(&n) {
        return Err(overflow(s));
    }
    let e = u32::try_from(n.unsigned_abs()).map_err(|_| overflow(s))?;
    let raised = BigRational::new(base.numer().pow(e), base.denom().pow(e));
    if n < 0 {
        Ok(raised.recip())
    } else {
        Ok(raised)
    }
}

/// simplifies the scanned factors, rejecting merged powers beyond [`MAX_POWER`]
fn condensed(vs: &[Value], s: &str) -> Result<Vec<Value>, AlgexError> {
    let factors = simplify(vs);
    if factors.iter().all(|v| in_range(v.pow())) {
        Ok(factors)
    } else {
        Err(overflow(s))
    }
}

/// Parses a product of factors from the start of `s`.
///
/// Returns the simplified product and the number of bytes consumed. When scanning reached a
/// boundary before the end of text `boundary` is set and `consumed` points at the unread part.
/// Malformed sequences (an operator with no operand, two operands without an operator, a
/// dangling operator at the end) are syntax errors. Symbol powers beyond [`MAX_POWER`] and
/// number powers beyond [`MAX_NUMBER_POWER`] are [`AlgexError::Overflow`].
pub fn parse_factors(s: &str) -> Result<FactorScan, AlgexError> {
    let mut modifier = Modifier::Mul;
    let mut sign_ok = true;
    let mut vs: Vec<Value> = Vec::new();
    let mut i = 0;
    while i < s.len() {
        let Some((tok, d)) = scan_token(sign_ok, &s[i..]) else {
            return Ok(FactorScan {
                factors: condensed(&vs, s)?,
                consumed: i,
                boundary: true,
            });
        };
        match tok {
            Token::Sign(c) => {
                if c == '-' {
                    vs.insert(0, Value::num(-1, 1));
                }
                i += d;
                continue;
            }
            Token::Ident(name) => {
                match modifier {
                    Modifier::None | Modifier::Pow => return Err(syntax(s)),
                    Modifier::Mul => vs.push(Value::sym(name)),
                    Modifier::Div => vs.push(Value::sym_pow(name, -1)),
                }
                modifier = Modifier::None;
                sign_ok = false;
            }
            Token::Number(text) => {
                match modifier {
                    Modifier::None => return Err(syntax(s)),
                    Modifier::Pow => {
                        let n: i64 = text.parse().map_err(|_| syntax(s))?;
                        let Some(last) = vs.last_mut() else {
                            return Err(syntax(s));
                        };
                        let raised = match &*last {
                            Value::Symbol(name, pow) => {
                                let p = pow
                                    .checked_mul(n)
                                    .filter(|p| in_range(*p))
                                    .ok_or_else(|| overflow(s))?;
                                Value::sym_pow(name, p)
                            }
                            Value::Number(base) => Value::Number(rational_pow(base, n, s)?),
                        };
                        *last = raised;
                    }
                    Modifier::Mul | Modifier::Div => {
                        let n: BigInt = text.parse().map_err(|_| syntax(s))?;
                        let r = BigRational::from_integer(n);
                        if modifier == Modifier::Div {
                            if r.is_zero() {
                                return Err(syntax(s));
                            }
                            vs.push(Value::Number(BigRational::one() / r));
                        } else {
                            vs.push(Value::Number(r));
                        }
                    }
                }
                modifier = Modifier::None;
                sign_ok = false;
            }
            Token::Op(c) => {
                if modifier != Modifier::None {
                    return Err(syntax(s));
                }
                sign_ok = true;
                modifier = match c {
                    '^' => Modifier::Pow,
                    '*' => Modifier::Mul,
                    _ => Modifier::Div,
                };
            }
        }
        i += d;
    }
    if modifier != Modifier::None {
        return Err(syntax(s));
    }
    Ok(FactorScan {
        factors: condensed(&vs, s)?,
        consumed: i,
        boundary: false,
    })
}
