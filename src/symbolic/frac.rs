//! # Fraction Module
//!
//! ## Purpose
//! A [`Frac`] is a ratio of two expressions plus a table of opaque function calls. A call such
//! as `sin(x)` lives in the numerator or denominator as a placeholder symbol `_FN<k>FN_` and
//! the table maps each placeholder to a [`FnDef`] (name and argument fractions). Rendering puts
//! the calls back in place.
//!
//! ## Reduction
//! [`Frac::reduced`] brings a fraction to its reduced form:
//! 1. unused or duplicate function placeholders are dropped and the rest renumbered densely,
//! 2. the common numeric factor is cancelled,
//! 3. the greatest common symbolic factor is cancelled,
//! 4. an exact polynomial division of numerator by denominator (or the other way) collapses
//!    the fraction to `q/1` (or `1/q`).
//!
//! A zero numerator reduces to `0/1`; a zero denominator is an error.
//!
//! ## Substitution
//! Substituting a fraction for a monomial first swaps the monomial for `_n*_d^-1`, clears
//! denominators and only then puts the numerator and denominator of the replacement back in.
//! Function calls are substituted by name and arity through [`Frac::substituted_fn`].
use crate::symbolic::factor::{Value, den, inv, lcp};
use crate::symbolic::symbolic_errors::AlgexError;
use crate::symbolic::terms::{Exp, MAX_SUBSTITUTION_ROUNDS};
use log::debug;
use num_traits::One;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

const AUX_NUM: &str = "_n";
const AUX_DEN: &str = "_d";

/// placeholder symbol of the k-th function call
pub fn fn_token(k: usize) -> String {
    format!("_FN{}FN_", k)
}

/// lowest placeholder index not yet used by `fns`
fn free_fn_token(fns: &BTreeMap<String, FnDef>) -> String {
    (0..)
        .map(fn_token)
        .find(|tok| !fns.contains_key(tok))
        .unwrap_or_default()
}

/// placeholder of the i-th argument while substituting a function body
fn arg_token(i: usize) -> String {
    format!("_TEMPARG{}_", i)
}

/// A call of an opaque function.
#[derive(Clone, Debug, PartialEq)]
pub struct FnDef {
    pub name: String,
    pub args: Vec<Frac>,
}

impl fmt::Display for FnDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        write!(f, "{}({})", self.name, args.join(","))
    }
}

/// Ratio of two expressions with the function calls they reference.
#[derive(Clone, Debug, PartialEq)]
pub struct Frac {
    pub num: Exp,
    pub den: Exp,
    pub fns: BTreeMap<String, FnDef>,
}

impl Default for Frac {
    fn default() -> Self {
        Frac::zero()
    }
}

impl Frac {
    pub fn zero() -> Frac {
        Frac::over(Exp::zero(), Exp::one())
    }

    /// num/den as given, without reduction
    pub fn over(num: Exp, den: Exp) -> Frac {
        Frac {
            num,
            den,
            fns: BTreeMap::new(),
        }
    }

    /// Turns an expression with negative powers into a fraction with a monomial
    /// denominator: the least common product of every term's denominator part.
    pub fn from_exp(e: &Exp) -> Frac {
        let mut d: Vec<Value> = Vec::new();
        for t in e.terms().values() {
            d = lcp(&d, &den(&t.fact));
        }
        let den = if d.is_empty() {
            Exp::one()
        } else {
            Exp::from_product(&d)
        };
        Frac::over(e.mul(&den), den)
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// true when the denominator is the constant 1
    pub fn is_polynomial(&self) -> bool {
        self.den.to_string() == "1"
    }

    fn func_strings(&self, text: String) -> String {
        self.fns
            .iter()
            .fold(text, |acc, (tok, def)| acc.replace(tok.as_str(), &def.to_string()))
    }

    /// Brings every function placeholder of `b` into the namespace of `self`. Returns `b` with
    /// its placeholders renamed and the merged table. Calls that render identically share one
    /// placeholder.
    pub fn merge_fns(&self, b: &Frac) -> Result<(Frac, BTreeMap<String, FnDef>), AlgexError> {
        if self.fns.is_empty() {
            return Ok((b.clone(), b.fns.clone()));
        }
        if b.fns.is_empty() {
            let mut c = b.clone();
            c.fns = self.fns.clone();
            return Ok((c, self.fns.clone()));
        }
        debug!(
            "merging {} function calls into a table of {}",
            b.fns.len(),
            self.fns.len()
        );
        let mut fns = self.fns.clone();
        let mut known: HashMap<String, String> = self
            .fns
            .iter()
            .map(|(tok, def)| (def.to_string(), tok.clone()))
            .collect();
        let mut c = b.clone();
        let mut finals: Vec<(String, String)> = Vec::new();
        for (i, (tok, def)) in b.fns.iter().enumerate() {
            let text = def.to_string();
            let target = match known.get(&text) {
                Some(prev) => prev.clone(),
                None => {
                    let fresh = free_fn_token(&fns);
                    fns.insert(fresh.clone(), def.clone());
                    known.insert(text, fresh.clone());
                    fresh
                }
            };
            // two steps so a rename never lands on a placeholder still waiting its turn
            let temp = format!("_tmp{}_", i);
            c.num = c.num.renamed(tok, &temp);
            c.den = c.den.renamed(tok, &temp);
            finals.push((temp, target));
        }
        for (temp, target) in finals {
            c.num = c.num.renamed(&temp, &target);
            c.den = c.den.renamed(&temp, &target);
        }
        c.fns = fns.clone();
        Ok((c, fns))
    }

    /// Removes placeholders no longer referenced, folds duplicates into one and renumbers the
    /// survivors to `_FN0FN_.._FN<n-1>FN_`.
    pub fn trim_fns(&mut self) {
        if self.fns.is_empty() {
            return;
        }
        let mut seen: HashMap<String, String> = HashMap::new();
        let mut dupes: Vec<(String, String)> = Vec::new();
        let mut fns: BTreeMap<String, FnDef> = BTreeMap::new();
        for (tok, def) in &self.fns {
            if !self.num.mentions(tok) && !self.den.mentions(tok) {
                continue;
            }
            let text = def.to_string();
            match seen.get(&text) {
                Some(first) => dupes.push((tok.clone(), first.clone())),
                None => {
                    seen.insert(text, tok.clone());
                    fns.insert(tok.clone(), def.clone());
                }
            }
        }
        let dense = (0..fns.len()).all(|k| fns.contains_key(&fn_token(k)));
        if fns.len() == self.fns.len() && dense {
            return;
        }
        for (tok, first) in dupes {
            self.num = self.num.renamed(&tok, &first);
            self.den = self.den.renamed(&tok, &first);
        }
        let wanted: Vec<String> = (0..fns.len()).map(fn_token).collect();
        let taken: HashSet<&String> = fns.keys().collect();
        let free: Vec<String> = wanted
            .iter()
            .filter(|tok| !taken.contains(tok))
            .cloned()
            .collect();
        let movers: Vec<String> = fns
            .keys()
            .filter(|tok| !wanted.contains(*tok))
            .cloned()
            .collect();
        for (tok, target) in movers.into_iter().zip(free) {
            if let Some(def) = fns.remove(&tok) {
                fns.insert(target.clone(), def);
            }
            self.num = self.num.renamed(&tok, &target);
            self.den = self.den.renamed(&tok, &target);
        }
        debug!("function table trimmed to {} entries", fns.len());
        self.fns = fns;
    }

    /// Scales numerator and denominator by the ratio of their common numeric factors so both
    /// carry integer coefficients with the sign of their first term.
    fn rescale(&mut self) {
        let n = Exp::common_n(&[&self.num]);
        let d = Exp::common_n(&[&self.den]);
        let r = &n / &d;
        let scale_num = Exp::from_product(&[Value::int(r.numer()), Value::rat(&n.recip())]);
        let scale_den = Exp::from_product(&[Value::int(r.denom()), Value::rat(&d.recip())]);
        self.num = self.num.mul(&scale_num);
        self.den = self.den.mul(&scale_den);
    }

    /// Reduced form of the fraction, see the module documentation.
    pub fn reduced(&self) -> Result<Frac, AlgexError> {
        let mut f = self.clone();
        f.trim_fns();
        if f.den.is_zero() {
            return Err(AlgexError::ZeroDenominator(f.num.to_string()));
        }
        if f.num.is_zero() {
            return Ok(Frac::zero());
        }

        f.rescale();

        let t = Exp::common(&[&f.num, &f.den]);
        if !t.is_empty() {
            let undo = Exp::from_product(&inv(&t));
            f.num = f.num.mul(&undo);
            f.den = f.den.mul(&undo);
        }

        let mut collapsed = false;
        match f.num.divide(&f.den) {
            Ok((q, rem)) if rem.is_zero() => {
                f.num = q;
                f.den = Exp::one();
                collapsed = true;
            }
            Ok(_) | Err(AlgexError::NoLeadingTerm) | Err(AlgexError::NoExactDivision) => {
                debug!("({}) does not divide ({})", f.den, f.num);
            }
            Err(e) => return Err(e),
        }
        match f.den.divide(&f.num) {
            Ok((q, rem)) if rem.is_zero() => {
                f.num = Exp::one();
                f.den = q;
                collapsed = true;
            }
            Ok(_) | Err(AlgexError::NoLeadingTerm) | Err(AlgexError::NoExactDivision) => {}
            Err(e) => return Err(e),
        }
        if collapsed {
            f.rescale();
        }
        f.trim_fns();
        Ok(f)
    }

    /// Replaces the monomial `b` (in either sign of power) with the fraction `c`. Returns the
    /// reduced result and whether anything matched.
    pub fn substituted(&self, b: &[Value], c: &Frac) -> Result<(Frac, bool), AlgexError> {
        let aux = Exp::from_product(&[Value::sym(AUX_NUM), Value::sym_pow(AUX_DEN, -1)]);
        let aux_inv = Exp::from_product(&[Value::sym_pow(AUX_NUM, -1), Value::sym(AUX_DEN)]);
        let b_inv = inv(b);
        let mut parts = [self.num.clone(), self.den.clone()];
        let mut changed = false;
        for part in parts.iter_mut() {
            let (next, hit) = part.substituted(b, &aux)?;
            changed |= hit;
            let (next, hit) = next.substituted(&b_inv, &aux_inv)?;
            changed |= hit;
            *part = next;
        }
        if !changed {
            return Ok((self.clone(), false));
        }
        let (c, fns) = self.merge_fns(c)?;
        let [num, den] = parts;
        let r1 = Frac::from_exp(&num);
        let r2 = Frac::from_exp(&den);
        let r = Frac::over(r1.num.mul(&r2.den), r1.den.mul(&r2.num)).reduced()?;

        let n = [Value::sym(AUX_NUM)];
        let d = [Value::sym(AUX_DEN)];
        let mut out = Frac::over(
            r.num.substitute(&n, &c.num)?.substitute(&d, &c.den)?,
            r.den.substitute(&n, &c.num)?.substitute(&d, &c.den)?,
        );
        out.fns = fns;
        Ok((out.reduced()?, true))
    }

    /// [`Frac::substituted`] without the change flag.
    pub fn substitute(&self, b: &[Value], c: &Frac) -> Result<Frac, AlgexError> {
        Ok(self.substituted(b, c)?.0)
    }

    /// Replaces every call of `def.name` with `def.args.len()` arguments by the body `c`,
    /// with the formal arguments of `def` (plain monomials such as `x`) bound to the actual
    /// arguments of each call.
    pub fn substituted_fn(&self, def: &FnDef, c: &Frac) -> Result<(Frac, bool), AlgexError> {
        if self.fns.is_empty() {
            return Ok((self.clone(), false));
        }
        let mut body = c.clone();
        let mut formals: Vec<Vec<Value>> = Vec::with_capacity(def.args.len());
        for (i, arg) in def.args.iter().enumerate() {
            let Some(pattern) = arg.as_sub_value() else {
                debug!("argument {} of {} is not a plain monomial", arg, def.name);
                return Ok((self.clone(), false));
            };
            let sym = vec![Value::sym(&arg_token(i))];
            body = body.substitute(&pattern, &Frac::from_exp(&Exp::from_product(&sym)))?;
            formals.push(sym);
        }
        let mut f = self.clone();
        let mut changed = false;
        for _ in 0..MAX_SUBSTITUTION_ROUNDS {
            let found = f
                .fns
                .iter()
                .find(|(_, call)| call.name == def.name && call.args.len() == def.args.len())
                .map(|(tok, call)| (tok.clone(), call.clone()));
            let Some((tok, call)) = found else {
                return Ok((f, changed));
            };
            let mut d = body.clone();
            for (sym, actual) in formals.iter().zip(&call.args) {
                d = d.substitute(sym, actual)?;
            }
            let (next, hit) = f.substituted(&[Value::sym(&tok)], &d)?;
            if hit {
                f = next;
                changed = true;
            } else {
                f.fns.remove(&tok);
            }
        }
        Err(AlgexError::Diverged {
            rounds: MAX_SUBSTITUTION_ROUNDS,
        })
    }

    /// Placeholder of the preferred function to isolate: the call with the most arguments,
    /// then the lexically smallest name, among the calls appearing in the numerator.
    pub fn leading_fn(&self) -> Result<String, AlgexError> {
        let mut best: Option<(&String, &FnDef)> = None;
        let mut tied = false;
        for (tok, def) in &self.fns {
            if !self.num.contains(&[Value::sym(tok)]) {
                continue;
            }
            match best {
                None => best = Some((tok, def)),
                Some((_, b)) => {
                    let (n, m) = (def.args.len(), b.args.len());
                    if n > m || (n == m && def.name < b.name) {
                        best = Some((tok, def));
                        tied = false;
                    } else if n == m && def.name == b.name {
                        tied = true;
                    }
                }
            }
        }
        if tied {
            return Err(AlgexError::AmbiguousFunction);
        }
        best.map(|(tok, _)| tok.clone()).ok_or(AlgexError::NoAnswer)
    }

    /// Rewrites `self = rhs` as `lead = ...`, isolating the leading function call of the
    /// numerator, or its leading term when no call is present.
    pub fn rearrange(&self, rhs: &Frac) -> Result<(Frac, Frac), AlgexError> {
        let lead = match self.leading_fn() {
            Ok(tok) => vec![Value::sym(&tok)],
            Err(AlgexError::NoAnswer) => self.num.leading()?.fact,
            Err(e) => return Err(e),
        };
        let (div, rem) = self.num.partition(&lead);
        let (rhs, fns) = self.merge_fns(rhs)?;
        let mut left = Frac::from_exp(&Exp::from_product(&lead));
        left.fns = fns.clone();
        let right = Frac {
            num: rhs.num.mul(&self.den).sub(&rem.mul(&rhs.den)),
            den: rhs.den.mul(&div),
            fns,
        };
        if right.num.contains(&lead) || right.den.contains(&lead) {
            return Err(AlgexError::NoAnswer);
        }
        Ok((left.reduced()?, right.reduced()?))
    }

    /// The numerator's symbolic factors when the fraction is a bare monomial with unit
    /// coefficient over 1, usable as a substitution pattern.
    pub fn as_sub_value(&self) -> Option<Vec<Value>> {
        if !self.is_polynomial() || self.num.len() != 1 {
            return None;
        }
        let t = self.num.terms().values().next()?;
        if t.fact.is_empty() || !t.coeff.is_one() {
            return None;
        }
        Some(t.fact.clone())
    }

    pub fn add(&self, other: &Frac) -> Result<Frac, AlgexError> {
        let (b, fns) = self.merge_fns(other)?;
        Frac {
            num: self.num.mul(&b.den).add(&b.num.mul(&self.den)),
            den: self.den.mul(&b.den),
            fns,
        }
        .reduced()
    }

    pub fn sub(&self, other: &Frac) -> Result<Frac, AlgexError> {
        let (b, fns) = self.merge_fns(other)?;
        Frac {
            num: self.num.mul(&b.den).sub(&b.num.mul(&self.den)),
            den: self.den.mul(&b.den),
            fns,
        }
        .reduced()
    }

    pub fn mul(&self, other: &Frac) -> Result<Frac, AlgexError> {
        let (b, fns) = self.merge_fns(other)?;
        Frac {
            num: self.num.mul(&b.num),
            den: self.den.mul(&b.den),
            fns,
        }
        .reduced()
    }

    pub fn div(&self, other: &Frac) -> Result<Frac, AlgexError> {
        if other.is_zero() {
            return Err(AlgexError::ZeroDenominator(self.to_string()));
        }
        let (b, fns) = self.merge_fns(other)?;
        Frac {
            num: self.num.mul(&b.den),
            den: self.den.mul(&b.num),
            fns,
        }
        .reduced()
    }

    /// externally visible symbols of numerator, denominator and function arguments
    pub fn symbols(&self) -> Vec<String> {
        let mut names = self.num.symbols();
        names.extend(self.den.symbols());
        for def in self.fns.values() {
            for arg in &def.args {
                names.extend(arg.symbols());
            }
        }
        names.sort();
        names.dedup();
        names
    }
}

impl From<Exp> for Frac {
    fn from(e: Exp) -> Self {
        Frac::from_exp(&e)
    }
}

impl fmt::Display for Frac {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ns = self.func_strings(self.num.to_string());
        let ds = self.func_strings(self.den.to_string());
        if ds == "1" {
            return write!(f, "{}", ns);
        }
        let ds = if self.den.is_constant() {
            ds
        } else {
            format!("({})", ds)
        };
        if self.num.len() == 1 {
            write!(f, "{}/{}", ns, ds)
        } else {
            write!(f, "({})/{}", ns, ds)
        }
    }
}
