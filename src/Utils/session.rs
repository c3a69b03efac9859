//! # Interactive calculator session
//!
//! Reads one command per line, keeps named bindings of fractions and functions, and prints
//! results to any [`Write`] sink. Failures are reported on the sink and the session goes on.
//!
//! | line | effect |
//! |---|---|
//! | `exit` | ends the session |
//! | `list` | table of bindings |
//! | `help` | command summary |
//! | `# ...` | comment |
//! | `file <path>` | runs the lines of a script |
//! | `x := <frac>` | binds `x` as written |
//! | `x = <frac>` | binds `x` after applying the current bindings |
//! | `x :=` | removes the binding |
//! | `x := subst a, b[, c]` | rewrites `a` using the relation `b = c` |
//! | `f(x, y) := <frac>` | binds a function |
//! | `x mod <n>` | binding `x` with coefficients reduced modulo `n` |
//! | `isolate <lhs>, <rhs>` | solves `lhs = rhs` for the leading function or term of `lhs` |
//! | anything else | comma list of fractions, printed after applying bindings |
use crate::Utils::config::SessionSettings;
use crate::symbolic::factor::{Value, valid_symbol};
use crate::symbolic::frac::{FnDef, Frac};
use crate::symbolic::parse_factor::parse_factors;
use crate::symbolic::parse_frac::{ParsedFrac, parse_frac};
use crate::symbolic::symbolic_errors::AlgexError;
use crate::symbolic::terms::Exp;
use log::{debug, info, warn};
use num_traits::Zero;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tabled::{builder::Builder, settings::Style};

/// Single word commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Builtin {
    Exit,
    List,
    Help,
}

/// What the caller should do after a line was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

static FILE_CMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^file\s+(.+)$").expect("file command pattern"));
static ISOLATE_CMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^isolate\s+(.+)$").expect("isolate command pattern"));
static FN_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9]*)\s*\(([^()]*)\)\s*:=\s*(.*)$").expect("function pattern")
});
static MOD_CMD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9]*)\s+mod\s+(\S+)$").expect("mod command pattern")
});
static ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\s:=]+)\s*(:=|=)\s*(.*)$").expect("assignment pattern")
});
static SUBST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^subst\s+(.+)$").expect("subst pattern"));

const HELP: &str = "\
 x := <exp>            bind x as written (x := alone unbinds)
 x = <exp>             bind x after applying bindings
 x := subst a, b[, c]  rewrite a using b = c
 f(x) := <exp>         bind a function
 x mod <n>             coefficients of x modulo n
 isolate <lhs>, <rhs>  solve lhs = rhs for its leading part
 file <path>           run a script
 # ...                 comment";

/// Calculator state: bound values and functions.
pub struct Session {
    settings: SessionSettings,
    vars: BTreeMap<String, Frac>,
    funcs: BTreeMap<String, (FnDef, Frac)>,
    depth: usize,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Session {
            settings,
            vars: BTreeMap::new(),
            funcs: BTreeMap::new(),
            depth: 0,
        }
    }

    /// value bound to `name`
    pub fn var(&self, name: &str) -> Option<&Frac> {
        self.vars.get(name)
    }

    /// Runs lines from `input` until it is exhausted or `exit` is read. With `interactive`
    /// the prompt is printed before each line.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        out: &mut W,
        interactive: bool,
    ) -> io::Result<Flow> {
        let mut lines = input.lines();
        loop {
            if interactive {
                write!(out, "{}", self.settings.prompt)?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                return Ok(Flow::Continue);
            };
            if self.execute_line(&line?, out)? == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }
    }

    /// Runs a script file.
    pub fn run_file<W: Write>(&mut self, path: &Path, out: &mut W) -> io::Result<Flow> {
        if self.depth >= self.settings.max_script_depth {
            writeln!(out, "scripts nested deeper than {}", self.settings.max_script_depth)?;
            return Ok(Flow::Continue);
        }
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) => {
                writeln!(out, "unable to open {:?}: {}", path, e)?;
                return Ok(Flow::Continue);
            }
        };
        info!("running script {:?}", path);
        self.depth += 1;
        let flow = self.run(io::BufReader::new(file), out, false);
        self.depth -= 1;
        flow
    }

    /// Executes one line of input.
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }
        if let Ok(cmd) = Builtin::from_str(line) {
            return self.builtin(cmd, out);
        }
        if let Some(caps) = FILE_CMD.captures(line) {
            let path = caps[1].trim().to_string();
            return self.run_file(Path::new(&path), out);
        }
        let result = if let Some(caps) = ISOLATE_CMD.captures(line) {
            self.isolate(&caps[1], out)
        } else if let Some(caps) = FN_DEF.captures(line) {
            self.define_function(&caps[1], &caps[2], &caps[3])
        } else if let Some(caps) = MOD_CMD.captures(line) {
            self.modulo(&caps[1], &caps[2], out)
        } else if let Some(caps) = ASSIGN.captures(line) {
            self.assign(&caps[1], &caps[2] == "=", caps[3].trim())
        } else {
            self.evaluate(line, out)
        };
        if let Err(msg) = result {
            warn!("{:?}: {}", line, msg);
            writeln!(out, "{}", msg)?;
        }
        Ok(Flow::Continue)
    }

    fn builtin<W: Write>(&self, cmd: Builtin, out: &mut W) -> io::Result<Flow> {
        match cmd {
            Builtin::Exit => {
                writeln!(out, "exiting")?;
                return Ok(Flow::Exit);
            }
            Builtin::List => self.list(out)?,
            Builtin::Help => {
                let words: Vec<String> = Builtin::iter().map(|b| b.to_string()).collect();
                writeln!(out, " {}", words.join(", "))?;
                writeln!(out, "{}", HELP)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn list<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.vars.is_empty() && self.funcs.is_empty() {
            return writeln!(out, " no bindings");
        }
        let mut builder = Builder::default();
        builder.push_record(["name".to_string(), "value".to_string()]);
        for (name, value) in &self.vars {
            builder.push_record([name.clone(), value.to_string()]);
        }
        for (def, body) in self.funcs.values() {
            builder.push_record([def.to_string(), body.to_string()]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        writeln!(out, "{}", table)
    }

    /// Substitutes the bindings into `f`, at most `passes` rounds.
    pub fn apply_bindings(&self, f: Frac) -> Result<Frac, AlgexError> {
        let mut f = f;
        for pass in 0..self.settings.passes {
            let mut changed = false;
            for (name, value) in &self.vars {
                let (next, hit) = f.substituted(&[Value::sym(name)], value)?;
                if hit {
                    f = next;
                    changed = true;
                }
            }
            for (def, body) in self.funcs.values() {
                let (next, hit) = f.substituted_fn(def, body)?;
                if hit {
                    f = next;
                    changed = true;
                }
            }
            if !changed {
                debug!("bindings settled after {} passes", pass);
                break;
            }
        }
        Ok(f)
    }

    fn evaluate<W: Write>(&self, line: &str, out: &mut W) -> Result<(), String> {
        let parsed = parse_frac(line).map_err(|e| format!("syntax error {:?}: {}", line, e))?;
        for f in parsed.into_vec() {
            let f = self.apply_bindings(f).map_err(|e| e.to_string())?;
            writeln!(out, " {}", f).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn assign(&mut self, name: &str, substitute: bool, rhs: &str) -> Result<(), String> {
        if !valid_symbol(name) {
            return Err(format!("invalid assignment to {:?}", name));
        }
        if rhs.is_empty() {
            self.vars.remove(name);
            return Ok(());
        }
        let value = match SUBST.captures(rhs) {
            Some(caps) => self.subst(&caps[1])?,
            None => match parse_frac(rhs).map_err(|e| format!("assignment failed: {}", e))? {
                ParsedFrac::Single(f) => f,
                ParsedFrac::List(_) => {
                    return Err(format!(
                        "unable to assign multiple expressions to {:?}",
                        name
                    ));
                }
            },
        };
        let value = if substitute {
            self.apply_bindings(value).map_err(|e| e.to_string())?
        } else {
            value
        };
        self.vars.insert(name.to_string(), value);
        Ok(())
    }

    /// `a, b[, c]`: rewrite `a` by isolating the largest term of `b` in `b = c`.
    fn subst(&self, args: &str) -> Result<Frac, String> {
        let items = parse_frac(args)
            .map_err(|e| format!("assignment failed: {}", e))?
            .into_vec();
        if items.len() < 2 || items.len() > 3 {
            return Err("usage: x := subst <exp>, <term>[, <replacement>]".to_string());
        }
        let a = self
            .vars
            .get(&items[0].to_string())
            .cloned()
            .unwrap_or_else(|| items[0].clone());
        let b = &items[1];
        let c = match items.get(2) {
            Some(c) => c.clone(),
            None => self
                .vars
                .get(&b.to_string())
                .cloned()
                .ok_or_else(|| format!("unable to find a substitute for {:?}", b.to_string()))?,
        };
        if !b.is_polynomial() {
            return Err(format!("no usable terms in {:?}", b.to_string()));
        }
        let Some(lead) = b.num.terms().values().next_back().filter(|t| !t.fact.is_empty())
        else {
            return Err(format!("no usable terms in {:?}", b.to_string()));
        };
        let rest = b.num.sub(&lead.to_exp());
        let scale = Frac::from_exp(&Exp::rat(&lead.coeff.recip()));
        let res = c
            .sub(&Frac::from_exp(&rest))
            .and_then(|r| r.mul(&scale))
            .map_err(|e| e.to_string())?;
        a.substitute(&lead.fact, &res).map_err(|e| e.to_string())
    }

    fn define_function(&mut self, name: &str, params: &str, body: &str) -> Result<(), String> {
        if body.trim().is_empty() {
            self.funcs.remove(name);
            return Ok(());
        }
        let args = parse_frac(params)
            .map_err(|e| format!("invalid parameters of {}: {}", name, e))?
            .into_vec();
        if let Some(bad) = args.iter().find(|a| a.as_sub_value().is_none()) {
            return Err(format!(
                "parameter {:?} of {} is not a plain symbol",
                bad.to_string(),
                name
            ));
        }
        let body = Frac::parse(body).map_err(|e| format!("assignment failed: {}", e))?;
        let def = FnDef {
            name: name.to_string(),
            args,
        };
        self.funcs.insert(name.to_string(), (def, body));
        Ok(())
    }

    fn modulo<W: Write>(&self, name: &str, modulus: &str, out: &mut W) -> Result<(), String> {
        let f = self
            .vars
            .get(name)
            .cloned()
            .ok_or_else(|| format!("invalid modular to {:?}", name))?;
        let m = match parse_factors(modulus) {
            Ok(scan) if !scan.boundary && scan.factors.len() <= 1 => scan
                .factors
                .first()
                .cloned()
                .unwrap_or(Value::Number(Zero::zero())),
            _ => return Err(format!("invalid modular denominator: {:?}", modulus)),
        };
        let f = self.apply_bindings(f).map_err(|e| e.to_string())?;
        if !f.is_polynomial() {
            return Err(format!("mod needs a polynomial, got {}", f));
        }
        writeln!(out, " {}", f.num.modulo(&m)).map_err(|e| e.to_string())
    }

    fn isolate<W: Write>(&self, args: &str, out: &mut W) -> Result<(), String> {
        let items = parse_frac(args)
            .map_err(|e| format!("syntax error {:?}: {}", args, e))?
            .into_vec();
        let [lhs, rhs] = items.as_slice() else {
            return Err("usage: isolate <lhs>, <rhs>".to_string());
        };
        let lhs = self.apply_bindings(lhs.clone()).map_err(|e| e.to_string())?;
        let rhs = self.apply_bindings(rhs.clone()).map_err(|e| e.to_string())?;
        let (left, right) = lhs.rearrange(&rhs).map_err(|e| e.to_string())?;
        writeln!(out, " {} = {}", left, right).map_err(|e| e.to_string())
    }
}
