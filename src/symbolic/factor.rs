//! # Factor Module
//!
//! The atomic layer of the engine. A factor ([`Value`]) is either an exact rational number or a
//! symbol raised to a non-zero integer power. A product of factors is brought to canonical form by
//! [`simplify`]: one leading rational coefficient followed by symbols sorted by name, each name
//! appearing once. Every higher layer (sums of terms, fractions) is built from these products and
//! relies on two properties of the canonical form:
//!
//! - the textual rendering of the symbolic part ([`prod`]) is a unique key for "like terms";
//! - a product containing an exact zero collapses to the empty list, which stands for `0`.
//!
//! ## Main functions
//! - [`simplify`], [`segment`], [`prod`], [`order`] - canonicalisation and rendering
//! - [`replace`] - the monomial pattern replacement every substitution is built on
//! - [`gcf`], [`inv`], [`den`], [`lcp`] - helpers for common factors and common denominators
//! - [`valid_symbol`] - what an externally visible symbol looks like
//!
//! ## Sign consistency
//! A pattern symbol only matches a symbol of the product whose exponent has the same sign, and
//! only while the leftover exponent keeps that sign. `a` matches inside `a^3` (three times) but
//! never inside `a^-3`. This is what makes the substitution fixed point of the term layer settle.
use itertools::Itertools;
use num::{BigInt, BigRational};
use num_traits::{One, Zero};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Largest symbol power magnitude the parser accepts.
pub const MAX_POWER: i64 = 1_000_000;
/// Largest exponent applied to a number literal.
pub const MAX_NUMBER_POWER: i64 = 4096;

/// A single factor: an exact rational number or a symbol with an integer power.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// exact rational number
    Number(BigRational),
    /// symbol name and its (non-zero) power
    Symbol(String, i64),
}

impl Value {
    /// number value num/den
    pub fn num(num: i64, den: i64) -> Value {
        Value::Number(BigRational::new(BigInt::from(num), BigInt::from(den)))
    }
    /// copies a rational into a number value
    pub fn rat(r: &BigRational) -> Value {
        Value::Number(r.clone())
    }
    /// integer number value
    pub fn int(n: &BigInt) -> Value {
        Value::Number(BigRational::from_integer(n.clone()))
    }
    /// symbol to the first power
    pub fn sym(name: &str) -> Value {
        Value::Symbol(name.to_string(), 1)
    }
    /// symbol to a power; a zero power is the number 1
    pub fn sym_pow(name: &str, pow: i64) -> Value {
        if pow == 0 {
            return Value::num(1, 1);
        }
        Value::Symbol(name.to_string(), pow)
    }

    pub fn is_num(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// the rational value, if this is a number
    pub fn number(&self) -> Option<&BigRational> {
        match self {
            Value::Number(n) => Some(n),
            Value::Symbol(..) => None,
        }
    }

    /// the symbol name, if this is a symbol
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(name, _) => Some(name),
            Value::Number(_) => None,
        }
    }

    /// the power of a symbol; numbers have power 0
    pub fn pow(&self) -> i64 {
        match self {
            Value::Symbol(_, pow) => *pow,
            Value::Number(_) => 0,
        }
    }

    fn as_symbol(&self) -> Option<(&str, i64)> {
        match self {
            Value::Symbol(name, pow) => Some((name.as_str(), *pow)),
            Value::Number(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Symbol(name, 1) => write!(f, "{}", name),
            Value::Symbol(name, pow) => write!(f, "{}^{}", name, pow),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::num(n, 1)
    }
}

impl From<&str> for Value {
    fn from(name: &str) -> Self {
        Value::sym(name)
    }
}

impl From<(&str, i64)> for Value {
    fn from((name, pow): (&str, i64)) -> Self {
        Value::sym_pow(name, pow)
    }
}

/// Builds a product of factors from integers, symbol names and `(name, power)` pairs
/// Usage: product![3, "a", ("b", -2)] -> [3, a, b^-2]
#[macro_export]
macro_rules! product {
    ($($x:expr),* $(,)?) => {
        vec![$($crate::symbolic::factor::Value::from($x)),*]
    };
}

/// Condenses an unordered product of values into canonical form:
/// `[coefficient, symbols sorted by name...]`, or the empty list when the product is zero.
/// Powers of the same name add with saturation at the `i64` bounds.
pub fn simplify(vs: &[Value]) -> Vec<Value> {
    if vs.is_empty() {
        return Vec::new();
    }
    let mut coeff = BigRational::one();
    let mut syms: Vec<(&str, i64)> = Vec::new();
    for v in vs {
        match v {
            Value::Number(n) => {
                if n.is_zero() {
                    return Vec::new();
                }
                coeff *= n;
            }
            Value::Symbol(name, pow) => syms.push((name.as_str(), *pow)),
        }
    }
    // higher powers first within a name
    syms.sort_by(|a, b| a.0.cmp(b.0).then(b.1.cmp(&a.1)));

    let mut res = vec![Value::Number(coeff)];
    for (name, pow) in syms {
        if pow == 0 {
            continue;
        }
        let merged = match res.last_mut() {
            Some(Value::Symbol(last, p)) if last.as_str() == name => {
                *p = p.saturating_add(pow);
                Some(*p)
            }
            _ => None,
        };
        match merged {
            Some(0) => {
                res.pop();
            }
            Some(_) => {}
            None => res.push(Value::Symbol(name.to_string(), pow)),
        }
    }
    res
}

/// Renders a product of values without simplifying it first. A leading coefficient of 1 is
/// dropped and a leading -1 becomes a `-` prefix when other factors follow.
pub fn prod(vs: &[Value]) -> String {
    if vs.is_empty() {
        return "0".to_string();
    }
    let mut prefix = "";
    let mut skip_first = false;
    if let (Value::Number(n), true) = (&vs[0], vs.len() != 1) {
        if n.is_one() {
            skip_first = true;
        } else if *n == -BigRational::one() {
            prefix = "-";
            skip_first = true;
        }
    }
    let body = vs
        .iter()
        .skip(if skip_first { 1 } else { 0 })
        .map(|v| v.to_string())
        .join("*");
    format!("{}{}", prefix, body)
}

/// Simplifies a product and splits it into coefficient, symbolic factors and the signature
/// string of the symbolic factors. `None` when the product is zero.
pub fn segment(vs: &[Value]) -> Option<(BigRational, Vec<Value>, String)> {
    let mut x = simplify(vs);
    if x.is_empty() {
        return None;
    }
    let rest = x.split_off(1);
    let coeff = match x.pop() {
        Some(Value::Number(n)) => n,
        _ => return None,
    };
    let key = prod(&rest);
    Some((coeff, rest, key))
}

/// Power complexity of a product: the sum of all symbol powers.
pub fn order(a: &[Value]) -> i64 {
    a.iter().map(Value::pow).fold(0, i64::saturating_add)
}

/// Replaces copies of the monomial `b` found in `a` with `c`, at most `max` times (`0` means
/// no limit). Returns the number of replacements and the simplified result.
///
/// A match needs every symbol of `b` present in `a` with a power of the same sign and at least
/// the same magnitude. Each match removes `b`'s powers from `a` and multiplies in `c` and the
/// reciprocal of `b`'s coefficient.
pub fn replace(a: &[Value], b: &[Value], c: &[Value], max: usize) -> (usize, Vec<Value>) {
    let mut qf = simplify(a);
    let Some((pn, pf, _)) = segment(b) else {
        return (0, qf);
    };
    let r = pn.recip();
    let mut n = 0;
    while !pf.is_empty() && (max == 0 || n < max) {
        let mut nf: Vec<Value> = Vec::new();
        let mut i = 0;
        let mut j = 0;
        'giveup: while i < pf.len() && j < qf.len() {
            let Some((tsym, tpow)) = pf[i].as_symbol() else {
                break 'giveup;
            };
            while j < qf.len() {
                let u = &qf[j];
                j += 1;
                let Some((usym, upow)) = u.as_symbol() else {
                    nf.push(u.clone());
                    continue;
                };
                if usym != tsym {
                    nf.push(u.clone());
                    continue;
                }
                if tpow.signum() != upow.signum() {
                    break 'giveup;
                }
                let np = upow - tpow;
                if np.signum() * tpow.signum() < 0 {
                    break 'giveup;
                }
                if np != 0 {
                    nf.push(Value::Symbol(usym.to_string(), np));
                }
                i += 1;
                break;
            }
        }
        if i != pf.len() {
            break;
        }
        nf.extend_from_slice(&qf[j..]);
        nf.extend_from_slice(c);
        nf.push(Value::Number(r.clone()));
        qf = simplify(&nf);
        n += 1;
    }
    (n, qf)
}

/// Greatest common factor of two sorted symbolic products: for every name in both, the entry
/// with the smaller power.
pub fn gcf(a: &[Value], b: &[Value]) -> Vec<Value> {
    let xs: Vec<(&str, i64)> = a.iter().filter_map(Value::as_symbol).collect();
    let ys: Vec<(&str, i64)> = b.iter().filter_map(Value::as_symbol).collect();
    let mut g = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < xs.len() && j < ys.len() {
        let (x, y) = (xs[i], ys[j]);
        if x.0 < y.0 {
            i += 1;
        } else if x.0 > y.0 {
            j += 1;
        } else {
            i += 1;
            j += 1;
            let pow = x.1.min(y.1);
            g.push(Value::Symbol(x.0.to_string(), pow));
        }
    }
    g
}

/// Inverse of the symbolic factors; numbers are skipped.
pub fn inv(a: &[Value]) -> Vec<Value> {
    a.iter()
        .filter_map(Value::as_symbol)
        .filter(|(_, pow)| *pow != 0)
        .map(|(name, pow)| Value::Symbol(name.to_string(), pow.saturating_neg()))
        .collect()
}

/// The denominator part of a product: negative power symbols, inverted.
pub fn den(vs: &[Value]) -> Vec<Value> {
    vs.iter()
        .filter_map(Value::as_symbol)
        .filter(|(_, pow)| *pow < 0)
        .map(|(name, pow)| Value::Symbol(name.to_string(), pow.saturating_abs()))
        .collect()
}

/// Least common product of two symbolic products.
pub fn lcp(a: &[Value], b: &[Value]) -> Vec<Value> {
    let mut all = inv(&gcf(a, b));
    all.extend_from_slice(a);
    all.extend_from_slice(b);
    simplify(&all)
}

static VALID_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9]*$").expect("symbol pattern is a valid regex")
});

/// Confirms that a token is an externally meaningful symbol. Internal bookkeeping symbols
/// (function tokens, temporaries) use other forms.
pub fn valid_symbol(token: &str) -> bool {
    VALID_LABEL.is_match(token)
}
