/// # Symbolic algebra over exact rationals
/// Layers, bottom up:
/// 1) factors: rational numbers and symbols with integer powers, canonical products
/// 2) terms: sums of canonical monomials with pattern substitution and polynomial division
/// 3) fractions: ratios of sums with opaque function calls, reduction and rearrangement
/// 4) a text parser producing fractions or comma lists of fractions
///# Example
/// ```
/// use RustedAlgex::symbolic::frac::Frac;
/// use RustedAlgex::symbolic::factor::Value;
/// let f = Frac::parse("(a^2 - b^2)/(a - b)").unwrap();
/// assert_eq!(f.to_string(), "a+b");
/// let g = f.substitute(&[Value::sym("b")], &Frac::parse("1/a").unwrap()).unwrap();
/// assert_eq!(g.to_string(), "(1+a^2)/(a)");
/// ```
/// ________________________________________________________________________________________________
pub mod factor;
pub mod parse_factor;
///____________________________________________________________________________________________________
/// sums of canonical terms
pub mod terms;
///____________________________________________________________________________________________________
/// fractions with function calls, and the parser that builds them
pub mod frac;
pub mod parse_frac;
#[cfg(test)]
mod frac_tests;
///____________________________________________________________________________________________________
/// matrices of expressions and 3D rotations
pub mod rotation;
pub mod symbolic_matrix;
#[cfg(test)]
mod symbolic_matrix_tests;
///____________________________________________________________________________________________________
/// inverse kinematics equations of a six axis arm built from the rotations
pub mod kinematics;
#[cfg(test)]
mod kinematics_tests;
pub mod symbolic_errors;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility functions mainly for bracket parsing and proceeding
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
