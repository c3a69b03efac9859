//! # Terms Module
//!
//! ## Purpose
//! An expression ([`Exp`]) is a sum of canonical monomials ([`Term`]), each stored under the
//! textual rendering of its symbolic part. Two monomials with the same symbols always land on
//! the same key, so "collecting like terms" is just adding coefficients, and a coefficient that
//! reaches zero removes the entry. The empty map is the zero expression.
//!
//! ## Main operations
//! - construction: [`Exp::new`], [`Exp::parse`], [`Exp::sum`], [`Exp::product`]
//! - arithmetic: [`Exp::add`], [`Exp::sub`], [`Exp::mul`], [`Exp::modulo`]
//! - substitution: [`Exp::substituted`] replaces a monomial pattern until nothing matches
//! - structure: [`Exp::partition`], [`Exp::leading`], [`Exp::divide`], [`Exp::common`],
//!   [`Exp::common_n`]
//!
//! ## Substitution and termination
//! Substitution works one pattern copy per term per round and repeats until a round changes
//! nothing. Replacing `a` by something containing `a` never settles, so the number of rounds
//! is capped by [`MAX_SUBSTITUTION_ROUNDS`] and running into the cap is reported as
//! [`AlgexError::Diverged`].
//!
//! ## Example
//! ```
//! use RustedAlgex::symbolic::terms::Exp;
//! use RustedAlgex::symbolic::factor::Value;
//! let e = Exp::parse("a^2 - b*b").unwrap();
//! let d = Exp::parse("a - b").unwrap();
//! let (q, r) = e.divide(&d).unwrap();
//! assert_eq!(q.to_string(), "a+b");
//! assert!(r.is_zero());
//! let s = e.substitute(&[Value::sym("b")], &Exp::parse("a").unwrap()).unwrap();
//! assert!(s.is_zero());
//! ```
use crate::symbolic::factor::{Value, gcf, order, prod, replace, segment};
use crate::symbolic::parse_factor::parse_factors;
use crate::symbolic::symbolic_errors::AlgexError;
use log::{debug, warn};
use num::{BigInt, BigRational, Integer};
use num_traits::{One, Signed, Zero};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// Key of the constant term.
pub const CONSTANT_KEY: &str = "0";
/// Placeholder symbol used by polynomial division.
pub const DIVISION_PLACEHOLDER: &str = "_factor";
/// Upper bound of substitution rounds before a substitution is declared divergent.
pub const MAX_SUBSTITUTION_ROUNDS: usize = 4096;

/// A coefficient times a product of symbols.
#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    pub coeff: BigRational,
    /// canonical symbol list, no numbers
    pub fact: Vec<Value>,
}

impl Term {
    /// the term as a product list `[coeff, symbols...]`
    pub fn factors(&self) -> Vec<Value> {
        let mut vs = Vec::with_capacity(self.fact.len() + 1);
        vs.push(Value::Number(self.coeff.clone()));
        vs.extend_from_slice(&self.fact);
        vs
    }

    pub fn to_exp(&self) -> Exp {
        Exp::from_product(&self.factors())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", prod(&self.factors()))
    }
}

/// Sum of canonical terms keyed by the rendering of their symbolic part.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Exp {
    terms: BTreeMap<String, Term>,
}

impl Exp {
    /// Sum of the given products; each product is simplified and like terms are combined.
    pub fn new<I, P>(products: I) -> Exp
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[Value]>,
    {
        let mut e = Exp::zero();
        for p in products {
            e.insert_product(p.as_ref());
        }
        e
    }

    pub fn zero() -> Exp {
        Exp::default()
    }

    pub fn one() -> Exp {
        Exp::rat(&BigRational::one())
    }

    pub fn rat(r: &BigRational) -> Exp {
        Exp::from_product(&[Value::rat(r)])
    }

    pub fn int(n: i64) -> Exp {
        Exp::from_product(&[Value::int(&BigInt::from(n))])
    }

    /// expression holding a single product
    pub fn from_product(p: &[Value]) -> Exp {
        let mut e = Exp::zero();
        e.insert_product(p);
        e
    }

    /// Parses a sum of products, e.g. `a+a*b-c/2+2/d`. Brackets are not understood at this
    /// level, see the fraction parser for that.
    pub fn parse(text: &str) -> Result<Exp, AlgexError> {
        let s = text.trim_end();
        if s.is_empty() {
            return Err(AlgexError::Syntax(text.to_string()));
        }
        let mut e = Exp::zero();
        let mut i = 0;
        while i < s.len() {
            let scan = parse_factors(&s[i..])?;
            if scan.boundary && scan.consumed == 0 {
                return Err(AlgexError::Syntax(s[i..].to_string()));
            }
            e.insert_product(&scan.factors);
            i += scan.consumed;
            if s[i..].starts_with('+') {
                i += 1;
                if i == s.len() {
                    return Err(AlgexError::Syntax(s.to_string()));
                }
            }
        }
        Ok(e)
    }

    fn insert(&mut self, coeff: BigRational, fact: Vec<Value>, key: String) {
        let total = match self.terms.get(&key) {
            Some(old) => &old.coeff + &coeff,
            None => coeff,
        };
        if total.is_zero() {
            self.terms.remove(&key);
        } else {
            self.terms.insert(key, Term { coeff: total, fact });
        }
    }

    fn insert_product(&mut self, p: &[Value]) {
        if let Some((coeff, fact, key)) = segment(p) {
            self.insert(coeff, fact, key);
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// terms in key order
    pub fn terms(&self) -> &BTreeMap<String, Term> {
        &self.terms
    }

    /// true when the expression is a single constant term
    pub fn is_constant(&self) -> bool {
        self.terms.len() == 1 && self.terms.contains_key(CONSTANT_KEY)
    }

    /// Sums a list of expressions.
    pub fn sum(exps: &[&Exp]) -> Exp {
        let mut e = Exp::zero();
        for a in exps {
            for (key, t) in &a.terms {
                e.insert(t.coeff.clone(), t.fact.clone(), key.clone());
            }
        }
        e
    }

    pub fn add(&self, other: &Exp) -> Exp {
        Exp::sum(&[self, other])
    }

    pub fn sub(&self, other: &Exp) -> Exp {
        let mut e = self.clone();
        for (key, t) in &other.terms {
            e.insert(-&t.coeff, t.fact.clone(), key.clone());
        }
        e
    }

    /// Multiplies a list of expressions; an empty list is zero.
    pub fn product(exps: &[&Exp]) -> Exp {
        let Some((first, rest)) = exps.split_first() else {
            return Exp::zero();
        };
        let mut e = (*first).clone();
        for a in rest {
            let mut f = Exp::zero();
            for p in a.terms.values() {
                for q in e.terms.values() {
                    let mut x = Vec::with_capacity(2 + p.fact.len() + q.fact.len());
                    x.push(Value::Number(p.coeff.clone()));
                    x.push(Value::Number(q.coeff.clone()));
                    x.extend_from_slice(&p.fact);
                    x.extend_from_slice(&q.fact);
                    f.insert_product(&x);
                }
            }
            e = f;
        }
        e
    }

    pub fn mul(&self, other: &Exp) -> Exp {
        Exp::product(&[self, other])
    }

    /// Reduces the integer coefficients modulo `|x|` into `[0, |x|)`. Terms with fractional
    /// coefficients pass through. A modulus that is not a non-zero integer leaves the
    /// expression as it is.
    pub fn modulo(&self, x: &Value) -> Exp {
        let Value::Number(m) = x else {
            return self.clone();
        };
        if !m.is_integer() || m.is_zero() {
            warn!("modulus {} is not a non-zero integer", m);
            return self.clone();
        }
        let modulus = m.to_integer().abs();
        let mut a = Exp::zero();
        for (key, t) in &self.terms {
            if !t.coeff.is_integer() {
                a.terms.insert(key.clone(), t.clone());
                continue;
            }
            let r = t.coeff.to_integer().mod_floor(&modulus);
            if r.is_zero() {
                continue;
            }
            a.terms.insert(
                key.clone(),
                Term {
                    coeff: BigRational::from_integer(r),
                    fact: t.fact.clone(),
                },
            );
        }
        a
    }

    /// Replaces every occurrence of the monomial `b` with `c`, repeating until no term
    /// contains `b`. Returns the new expression and whether any term matched.
    pub fn substituted(&self, b: &[Value], c: &Exp) -> Result<(Exp, bool), AlgexError> {
        if b.is_empty() {
            return Ok((self.clone(), false));
        }
        let replacements: Vec<Vec<Value>> = c.terms.values().map(Term::factors).collect();
        let zero = [Value::Number(BigRational::zero())];
        let mut g = self.clone();
        let mut acted = false;
        for round in 0..MAX_SUBSTITUTION_ROUNDS {
            let mut again = false;
            let mut f = Exp::zero();
            for x in g.terms.values() {
                let a = x.factors();
                let (hit, y) = replace(&a, b, &zero, 1);
                if hit == 0 {
                    f.insert_product(&y);
                    continue;
                }
                acted = true;
                if replacements.is_empty() {
                    continue;
                }
                again = true;
                for t in &replacements {
                    let (_, y) = replace(&a, b, t, 1);
                    f.insert_product(&y);
                }
            }
            g = f;
            if !again {
                return Ok((g, acted));
            }
            if round + 1 == MAX_SUBSTITUTION_ROUNDS {
                debug!("substitution of {} still matching, giving up", prod(b));
            }
        }
        Err(AlgexError::Diverged {
            rounds: MAX_SUBSTITUTION_ROUNDS,
        })
    }

    /// [`Exp::substituted`] without the change flag.
    pub fn substitute(&self, b: &[Value], c: &Exp) -> Result<Exp, AlgexError> {
        Ok(self.substituted(b, c)?.0)
    }

    /// Renames a symbol wherever it occurs, whatever the sign of its power.
    pub fn renamed(&self, from: &str, to: &str) -> Exp {
        let mut e = Exp::zero();
        for t in self.terms.values() {
            let mut vs = t.factors();
            for v in vs.iter_mut() {
                if let Value::Symbol(name, _) = v {
                    if name == from {
                        *name = to.to_string();
                    }
                }
            }
            e.insert_product(&vs);
        }
        e
    }

    /// true when some term contains the monomial `b` (same sign powers, see [`replace`]).
    pub fn contains(&self, b: &[Value]) -> bool {
        let zero = [Value::Number(BigRational::zero())];
        self.terms
            .values()
            .any(|t| replace(&t.factors(), b, &zero, 1).0 != 0)
    }

    /// true when any term mentions `name`, whatever the power.
    pub fn mentions(&self, name: &str) -> bool {
        self.terms
            .values()
            .any(|t| t.fact.iter().any(|v| v.symbol() == Some(name)))
    }

    /// Splits into `(div, rem)` with `self == div*b + rem`, where `rem` holds the terms that
    /// do not contain `b`.
    pub fn partition(&self, b: &[Value]) -> (Exp, Exp) {
        let one = [Value::num(1, 1)];
        let mut div = Exp::zero();
        let mut rem = Exp::zero();
        for (key, x) in &self.terms {
            let (hit, fac) = replace(&x.factors(), b, &one, 1);
            if hit != 0 {
                div.insert_product(&fac);
            } else {
                rem.insert(x.coeff.clone(), x.fact.clone(), key.clone());
            }
        }
        (div, rem)
    }

    /// The term of largest positive order. Ties go to the term whose key sorts first.
    pub fn leading(&self) -> Result<Term, AlgexError> {
        let mut best: Option<(&Term, i64)> = None;
        for t in self.terms.values() {
            let m = order(&t.fact);
            if m <= 0 {
                continue;
            }
            match best {
                Some((_, n)) if n >= m => {}
                _ => best = Some((t, m)),
            }
        }
        best.map(|(t, _)| t.clone()).ok_or(AlgexError::NoLeadingTerm)
    }

    /// Polynomial division by `a`: returns `(quotient, remainder)` with
    /// `self == quotient*a + remainder`.
    ///
    /// The leading term of `a` is expressed through a placeholder for `a` itself and
    /// substituted into `self`; whatever multiplies the placeholder is the quotient.
    pub fn divide(&self, a: &Exp) -> Result<(Exp, Exp), AlgexError> {
        let lead = a.leading()?;
        let repl = [Value::sym(DIVISION_PLACEHOLDER)];
        let rest = Exp::from_product(&repl)
            .add(&lead.to_exp())
            .sub(a)
            .mul(&Exp::rat(&lead.coeff.recip()));
        let simple = self.substitute(&lead.fact, &rest)?;
        let (x, y) = simple.partition(&repl);
        if x.is_zero() {
            return Err(AlgexError::NoExactDivision);
        }
        let div = x.substitute(&repl, a)?;
        Ok((div, y))
    }

    /// Numeric value of the expression and whether the expression is purely that number.
    /// The zero expression is the number 0.
    pub fn as_number(&self) -> (BigRational, bool) {
        if self.is_zero() {
            return (BigRational::zero(), true);
        }
        match self.terms.values().find(|t| t.fact.is_empty()) {
            Some(t) => (t.coeff.clone(), self.terms.len() == 1),
            None => (BigRational::zero(), false),
        }
    }

    /// Sorted, deduplicated externally visible symbol names.
    pub fn symbols(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .terms
            .values()
            .flat_map(|t| t.fact.iter().filter_map(Value::symbol))
            .filter(|name| !name.starts_with('_'))
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Structural equality; canonical form makes this algebraic equality.
    pub fn equals(&self, other: &Exp) -> bool {
        self == other
    }

    /// Greatest symbolic factor common to every term of every expression. Empty when any
    /// expression is zero or nothing is shared.
    pub fn common(exps: &[&Exp]) -> Vec<Value> {
        let mut f: Option<Vec<Value>> = None;
        for a in exps {
            if a.is_zero() {
                return Vec::new();
            }
            for t in a.terms.values() {
                let next = match f {
                    None => t.fact.clone(),
                    Some(prev) => gcf(&prev, &t.fact),
                };
                if next.is_empty() {
                    return Vec::new();
                }
                f = Some(next);
            }
        }
        f.unwrap_or_default()
    }

    /// Common numeric factor: gcd of the coefficient numerators over the lcm of their
    /// denominators. A single term keeps the sign of its numerator.
    pub fn common_n(exps: &[&Exp]) -> BigRational {
        let mut once = false;
        let mut n = BigInt::one();
        let mut d = BigInt::one();
        for ex in exps {
            for t in ex.terms.values() {
                d = d.lcm(t.coeff.denom());
                if once {
                    n = n.gcd(t.coeff.numer());
                    continue;
                }
                n = t.coeff.numer().clone();
                once = true;
            }
        }
        BigRational::new(n, d)
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, t) in self.terms.values().enumerate() {
            let s = t.to_string();
            if i != 0 && !s.starts_with('-') {
                write!(f, "+")?;
            }
            write!(f, "{}", s)?;
        }
        Ok(())
    }
}

impl FromStr for Exp {
    type Err = AlgexError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Exp::parse(s)
    }
}

impl Add for &Exp {
    type Output = Exp;
    fn add(self, rhs: &Exp) -> Exp {
        Exp::add(self, rhs)
    }
}

impl Sub for &Exp {
    type Output = Exp;
    fn sub(self, rhs: &Exp) -> Exp {
        Exp::sub(self, rhs)
    }
}

impl Mul for &Exp {
    type Output = Exp;
    fn mul(self, rhs: &Exp) -> Exp {
        Exp::mul(self, rhs)
    }
}

impl Neg for &Exp {
    type Output = Exp;
    fn neg(self) -> Exp {
        Exp::zero().sub(self)
    }
}
