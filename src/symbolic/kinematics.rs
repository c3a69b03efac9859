//! # Inverse kinematics of a six axis arm
//!
//! Every joint of the arm is a rotation about one coordinate axis followed by an offset along
//! the rotated Z axis. The desired pose is a position `r = [r0, r1, r2]` and an orientation
//! `B = [Bij]`. Peeling the first `i` joints off the left side of
//! `pose = J0 * J1 * ... * J5` gives six matrix equations per pose component, each cell of
//! which is an expression that must vanish.
//!
//! Sines and cosines of the joint angles are the unknowns: a symbol starting with `c` or `s` is
//! one of them, anything else (`d1`, `r0`, `B12`) is a known constant.
//!
//! ## Main functions
//! - [`six_axis_arm`], [`target_pose`] - the geometry
//! - [`pose_equations`] - the distinct vanishing expressions and where each one came from
//! - [`split_up`] - isolates the most complicated trig product of one expression
//! - [`solve`] - eliminates between expressions isolating the same product, recursively
use crate::symbolic::factor::{Value, inv, replace};
use crate::symbolic::rotation::{rx, rz};
use crate::symbolic::symbolic_errors::AlgexError;
use crate::symbolic::symbolic_matrix::{ExpMatrix, MatrixError};
use crate::symbolic::terms::Exp;
use itertools::Itertools;
use log::debug;
use std::collections::BTreeMap;
use std::fmt;

/// rotation of one joint and the offset applied after it
#[derive(Clone, Debug)]
pub struct Joint {
    pub rotation: ExpMatrix,
    pub offset: ExpMatrix,
}

/// One vanishing expression rearranged as `factor * div = rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct Isolated {
    /// product of joint sines and cosines, empty when the expression has none
    pub factor: Vec<Value>,
    pub rhs: Exp,
    pub div: Exp,
}

impl Isolated {
    /// rendering of the isolated product, e.g. `[c0 s3]`
    pub fn key(&self) -> String {
        format!("[{}]", self.factor.iter().join(" "))
    }
}

impl fmt::Display for Isolated {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let c = Exp::common(&[&self.rhs]);
        if self.rhs.len() > 1 && !c.is_empty() {
            let rest = self.rhs.mul(&Exp::from_product(&inv(&c)));
            write!(
                f,
                "{} = ({}) * ({}) / ({})",
                self.key(),
                Exp::from_product(&c),
                rest,
                self.div
            )
        } else {
            write!(f, "{} = ({}) / ({})", self.key(), self.rhs, self.div)
        }
    }
}

/// 3x1 column of parsed cells
pub fn vector(cells: [&str; 3]) -> Result<ExpMatrix, MatrixError> {
    let mut v = ExpMatrix::new(3, 1)?;
    for (i, cell) in cells.iter().enumerate() {
        v.set(i, 0, Exp::parse(cell)?)?;
    }
    Ok(v)
}

/// Joints of the arm: Z, X, X, Z, X, Z rotations with offsets `d0..d4` along Z.
pub fn six_axis_arm() -> Result<Vec<Joint>, MatrixError> {
    let joint = |rotation: ExpMatrix, d: &str| -> Result<Joint, MatrixError> {
        Ok(Joint {
            rotation,
            offset: vector(["0", "0", d])?,
        })
    };
    Ok(vec![
        joint(rz("0")?, "d0")?,
        joint(rx("1")?, "d1")?,
        joint(rx("2")?, "d2")?,
        joint(rz("3")?, "d3")?,
        joint(rx("4")?, "d4")?,
        joint(rz("5")?, "0")?,
    ])
}

/// Desired position `[r0, r1, r2]` and orientation `[Bij]`.
pub fn target_pose() -> Result<(ExpMatrix, ExpMatrix), MatrixError> {
    let r = vector(["r0", "r1", "r2"])?;
    let mut b = ExpMatrix::new(3, 3)?;
    for i in 0..3 {
        for j in 0..3 {
            b.set(i, j, Exp::from_product(&[Value::sym(&format!("B{}{}", i, j))]))?;
        }
    }
    Ok((r, b))
}

/// Distinct expressions that vanish for a valid joint solution, paired with the cells they came
/// from (`r[k:i]` for position, `b[k:i:j]` for orientation, `k` joints peeled off).
/// Shorter expressions come first.
pub fn pose_equations(
    joints: &[Joint],
    r: &ExpMatrix,
    b: &ExpMatrix,
) -> Result<Vec<(Exp, Vec<String>)>, MatrixError> {
    let one = Exp::one();
    let minus_one = Exp::int(-1);
    let mut eqs: BTreeMap<String, (Exp, Vec<String>)> = BTreeMap::new();
    let mut record = |e: &Exp, from: String| {
        eqs.entry(e.to_string())
            .or_insert_with(|| (e.clone(), Vec::new()))
            .1
            .push(from);
    };
    for k in 0..joints.len() {
        let mut lhs_r = r.clone();
        let mut lhs_b = b.clone();
        for joint in &joints[..k] {
            let t = joint.rotation.transpose();
            lhs_r = t.mul(&lhs_r)?.sum(&joint.offset, &minus_one)?;
            lhs_b = t.mul(&lhs_b)?;
        }
        let mut rhs_r = ExpMatrix::new(3, 1)?;
        let mut rhs_b = ExpMatrix::identity(3)?;
        for joint in joints[k..].iter().rev() {
            rhs_r = joint.rotation.mul(&rhs_r.sum(&joint.offset, &one)?)?;
            rhs_b = joint.rotation.mul(&rhs_b)?;
        }
        let zr = lhs_r.sum(&rhs_r, &minus_one)?;
        let zb = lhs_b.sum(&rhs_b, &minus_one)?;
        for i in 0..3 {
            record(&zr[(i, 0)], format!("r[{}:{}]", k, i));
            for j in 0..3 {
                record(&zb[(i, j)], format!("b[{}:{}:{}]", k, i, j));
            }
        }
    }
    let mut list: Vec<(Exp, Vec<String>)> = eqs.into_values().collect();
    list.sort_by_cached_key(|(e, _)| {
        let s = e.to_string();
        (s.len(), s)
    });
    Ok(list)
}

/// Angle sum identities for joints 1 and 2: `c1*c2 = c12+s1*s2`, `c1*s2 = s12-s1*c2`.
pub fn apply_identities(e: &Exp) -> Result<Exp, AlgexError> {
    let c1c2 = [Value::sym("c1"), Value::sym("c2")];
    let c1s2 = [Value::sym("c1"), Value::sym("s2")];
    e.substitute(&c1c2, &Exp::parse("c12+s1*s2")?)?
        .substitute(&c1s2, &Exp::parse("s12-s1*c2")?)
}

fn is_trig(v: &Value) -> bool {
    v.symbol().is_some_and(|name| name.starts_with(['c', 's']))
}

/// Rewrites a vanishing expression as `factor * div = rhs`.
///
/// After the angle identities the factor is the trig part of the term whose trig factors have
/// the longest rendering, ties going to the first term. Terms holding the factor make up `div`,
/// the others move to `rhs`. A leading minus sign of `div` and any symbolic factor shared by
/// both sides are cancelled.
pub fn split_up(e: &Exp) -> Result<Isolated, AlgexError> {
    let easy = apply_identities(e)?;
    let mut best = 0;
    let mut factor: Vec<Value> = Vec::new();
    for t in easy.terms().values() {
        let fs: Vec<Value> = t.fact.iter().filter(|v| is_trig(v)).cloned().collect();
        let n: usize = fs.iter().map(|v| v.to_string().len()).sum();
        if n > best {
            best = n;
            factor = fs;
        }
    }

    let mut rhs = Exp::zero();
    let mut div = Exp::zero();
    if !factor.is_empty() {
        let one = [Value::num(1, 1)];
        for t in easy.terms().values() {
            let a = t.factors();
            let (hit, b) = replace(&a, &factor, &one, 1);
            if hit == 0 {
                rhs = rhs.sub(&Exp::from_product(&a));
            } else {
                div = div.add(&Exp::from_product(&b));
            }
        }
    }
    if div.to_string().starts_with('-') {
        div = -&div;
        rhs = -&rhs;
    }
    let c = Exp::common(&[&div, &rhs]);
    if !c.is_empty() {
        let r = Exp::from_product(&inv(&c));
        rhs = rhs.mul(&r);
        div = div.mul(&r);
    }
    Ok(Isolated { factor, rhs, div })
}

/// Works through isolated expressions sorted by their factor. Within a run of expressions
/// isolating the same factor, the first is eliminated against each of the others; the
/// resulting expressions are isolated again and solved recursively. Returns the displayed
/// relations, each prefixed by dots marking the recursion depth.
pub fn solve(prefix: &str, mut rs: Vec<Isolated>) -> Result<Vec<String>, AlgexError> {
    let prefix = format!("{}...", prefix);
    debug!("{} solve {}", prefix, rs.len());
    let mut lines = Vec::new();
    if rs.is_empty() {
        return Ok(lines);
    }
    rs.sort_by_cached_key(|r| {
        let k = r.key();
        (k.len(), k)
    });

    let mut base = 0;
    let mut base_key = rs[0].key();
    let mut i = 1;
    while i < rs.len() {
        let r = rs[i].clone();
        let key = r.key();
        if key == base_key {
            if i + 1 != rs.len() {
                lines.push(format!("{}{}", prefix, r));
                i += 1;
                continue;
            }
            i += 1;
        }
        if i - base > 1 {
            debug!("{} sub-solving for {} {} {}", prefix, rs[base].key(), base, i);
            let mut roll = Vec::new();
            for j in base + 1..i {
                let z = rs[base]
                    .rhs
                    .mul(&rs[j].div)
                    .sub(&rs[j].rhs.mul(&rs[base].div));
                let next = split_up(&z)?;
                if !next.rhs.is_zero() {
                    lines.push(format!("{}{}", prefix, next));
                    roll.push(next);
                }
            }
            if roll.len() > 1 {
                lines.extend(solve(&prefix, roll)?);
            } else {
                lines.push(format!("{}{}", prefix, r));
            }
        } else {
            lines.push(format!("{}{}", prefix, r));
        }
        base = i;
        base_key = key;
        i += 1;
    }
    Ok(lines)
}
