//! Text to fraction parser.
//!
//! Understands everything the expression parser does plus round brackets, function calls and
//! comma separated lists:
//!
//! - `name(args)` where `name` is a valid symbol is a function call; `args` may be a comma list;
//! - any other `( ... )` group is a sub-fraction that can be raised to a power or divided by;
//! - a top level comma list yields [`ParsedFrac::List`].
//!
//! Identifiers starting with `_` are reserved for the engine and rejected.
//!
//! ```
//! use RustedAlgex::symbolic::parse_frac::parse_frac;
//! let f = parse_frac("a/(a+b) + b/(a-b)").unwrap().single().unwrap();
//! assert_eq!(f.to_string(), "(a^2+b^2)/(a^2-b^2)");
//! ```
use crate::symbolic::factor::{Value, valid_symbol};
use crate::symbolic::frac::{FnDef, Frac, fn_token};
use crate::symbolic::symbolic_errors::AlgexError;
use crate::symbolic::terms::Exp;
use crate::symbolic::utils::{
    check_brackets, reserved_identifier, split_outside_brackets, trailing_identifier,
};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A single fraction or a comma separated list of them.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedFrac {
    Single(Frac),
    List(Vec<Frac>),
}

impl ParsedFrac {
    /// the fraction, if a single one was parsed
    pub fn single(self) -> Option<Frac> {
        match self {
            ParsedFrac::Single(f) => Some(f),
            ParsedFrac::List(_) => None,
        }
    }

    /// every parsed fraction; a single one becomes a list of one
    pub fn into_vec(self) -> Vec<Frac> {
        match self {
            ParsedFrac::Single(f) => vec![f],
            ParsedFrac::List(v) => v,
        }
    }
}

/// Parses text into a reduced fraction or a list of reduced fractions.
pub fn parse_frac(text: &str) -> Result<ParsedFrac, AlgexError> {
    if let Some(name) = reserved_identifier(text) {
        return Err(AlgexError::ReservedPrefix(name));
    }
    parse_inner(text)
}

impl Frac {
    /// Parses text holding exactly one fraction.
    pub fn parse(text: &str) -> Result<Frac, AlgexError> {
        match parse_frac(text)? {
            ParsedFrac::Single(f) => Ok(f),
            ParsedFrac::List(_) => Err(AlgexError::Syntax(text.to_string())),
        }
    }
}

impl FromStr for Frac {
    type Err = AlgexError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frac::parse(s)
    }
}

fn sub_token(k: usize) -> String {
    format!("_XXX{}", k)
}

fn parse_inner(text: &str) -> Result<ParsedFrac, AlgexError> {
    check_brackets(text)?;
    let pieces = split_outside_brackets(text, ',');
    if pieces.len() > 1 {
        let mut list = Vec::with_capacity(pieces.len());
        for (index, piece) in pieces.iter().enumerate() {
            match parse_inner(piece) {
                Ok(ParsedFrac::Single(f)) => list.push(f),
                Ok(ParsedFrac::List(_)) => {
                    return Err(AlgexError::NestedList {
                        index,
                        text: piece.to_string(),
                    });
                }
                Err(cause) => {
                    return Err(AlgexError::BadListElement {
                        index,
                        text: piece.to_string(),
                        cause: Box::new(cause),
                    });
                }
            }
        }
        return Ok(ParsedFrac::List(list));
    }

    let mut flat = String::with_capacity(text.len());
    let mut subs: Vec<(String, Frac)> = Vec::new();
    let mut fns: BTreeMap<String, FnDef> = BTreeMap::new();
    let mut depth = 0usize;
    let mut base = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => {
                if depth == 0 {
                    base = i;
                }
                depth += 1;
            }
            ')' => {
                depth -= 1;
                if depth != 0 {
                    continue;
                }
                let inner_text = &text[base + 1..i];
                let inner = parse_inner(inner_text)?;
                let call = trailing_identifier(&flat)
                    .filter(|(_, name)| valid_symbol(name))
                    .map(|(at, name)| (at, name.to_string()));
                match (call, inner) {
                    (Some((at, name)), inner) => {
                        flat.truncate(at);
                        let tok = fn_token(fns.len());
                        fns.insert(
                            tok.clone(),
                            FnDef {
                                name,
                                args: inner.into_vec(),
                            },
                        );
                        flat.push_str(&format!(" {} ", tok));
                    }
                    (None, ParsedFrac::Single(f)) => {
                        let tok = sub_token(subs.len());
                        flat.push_str(&format!(" {} ", tok));
                        subs.push((tok, f));
                    }
                    (None, ParsedFrac::List(_)) => {
                        return Err(AlgexError::Syntax(format!("({})", inner_text)));
                    }
                }
            }
            _ if depth == 0 => flat.push(c),
            _ => {}
        }
    }

    // placeholders stay internal: errors name the text as written
    let mut e = Exp::parse(&flat).map_err(|err| match err {
        AlgexError::Syntax(_) => AlgexError::Syntax(text.trim().to_string()),
        AlgexError::Overflow(_) => AlgexError::Overflow(text.trim().to_string()),
        other => other,
    })?;
    for (tok, _) in &subs {
        let n = format!("{}n", tok);
        let d = format!("{}d", tok);
        e = e.substitute(
            &[Value::sym(tok)],
            &Exp::from_product(&[Value::sym(&n), Value::sym_pow(&d, -1)]),
        )?;
        e = e.substitute(
            &[Value::sym_pow(tok, -1)],
            &Exp::from_product(&[Value::sym_pow(&n, -1), Value::sym(&d)]),
        )?;
    }
    let mut r = Frac::from_exp(&e);
    r.fns = fns;
    for (tok, val) in subs {
        let (val, merged) = r.merge_fns(&val)?;
        r.fns = merged;
        let n = [Value::sym(&format!("{}n", tok))];
        let d = [Value::sym(&format!("{}d", tok))];
        r.num = r.num.substitute(&n, &val.num)?.substitute(&d, &val.den)?;
        r.den = r.den.substitute(&n, &val.num)?.substitute(&d, &val.den)?;
    }
    Ok(ParsedFrac::Single(r.reduced()?))
}
