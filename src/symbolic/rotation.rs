//! 3D rotation matrices with symbolic angles.
//!
//! The angle `theta` is a symbol suffix: its cosine is the symbol `c<theta>` and its sine is
//! `s<theta>`, so `rx("t")` uses `ct` and `st`.
use crate::symbolic::symbolic_matrix::{ExpMatrix, MatrixError};
use crate::symbolic::terms::Exp;

/// cos, sin and -sin of the angle
fn trig(theta: &str) -> Result<(Exp, Exp, Exp), MatrixError> {
    let c = Exp::parse(&format!("c{}", theta))?;
    let s = Exp::parse(&format!("s{}", theta))?;
    let minus_s = Exp::parse(&format!("-s{}", theta))?;
    Ok((c, s, minus_s))
}

/// Anticlockwise rotation around the X axis.
pub fn rx(theta: &str) -> Result<ExpMatrix, MatrixError> {
    let (c, s, minus_s) = trig(theta)?;
    let mut m = ExpMatrix::new(3, 3)?;
    m.set(0, 0, Exp::one())?;
    m.set(1, 1, c.clone())?;
    m.set(2, 2, c)?;
    m.set(1, 2, minus_s)?;
    m.set(2, 1, s)?;
    Ok(m)
}

/// Anticlockwise rotation around the Y axis.
pub fn ry(theta: &str) -> Result<ExpMatrix, MatrixError> {
    let (c, s, minus_s) = trig(theta)?;
    let mut m = ExpMatrix::new(3, 3)?;
    m.set(0, 0, c.clone())?;
    m.set(1, 1, Exp::one())?;
    m.set(2, 2, c)?;
    m.set(0, 2, s)?;
    m.set(2, 0, minus_s)?;
    Ok(m)
}

/// Anticlockwise rotation around the Z axis.
pub fn rz(theta: &str) -> Result<ExpMatrix, MatrixError> {
    let (c, s, minus_s) = trig(theta)?;
    let mut m = ExpMatrix::new(3, 3)?;
    m.set(0, 0, c.clone())?;
    m.set(1, 1, c)?;
    m.set(2, 2, Exp::one())?;
    m.set(0, 1, minus_s)?;
    m.set(1, 0, s)?;
    Ok(m)
}
