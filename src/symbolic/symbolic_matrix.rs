//! Matrices of exact expressions.
//!
//! Small dense matrices whose cells are [`Exp`] values. Arithmetic is exact, so products of
//! rotation matrices can be simplified with trigonometric identities expressed as
//! substitutions (see [`crate::symbolic::rotation`]).
use crate::symbolic::factor::Value;
use crate::symbolic::symbolic_errors::AlgexError;
use crate::symbolic::terms::Exp;
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, PartialEq)]
pub enum MatrixError {
    /// zero rows or columns requested
    BadDimensions { rows: usize, cols: usize },
    /// cell (row, col) outside the matrix
    BadCell { row: usize, col: usize },
    /// operand shapes do not fit the operation
    Mismatch { left: (usize, usize), right: (usize, usize) },
    /// failure of the underlying algebra (parsing, divergent substitution)
    Algebra(AlgexError),
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatrixError::BadDimensions { rows, cols } => {
                write!(f, "invalid matrix dimensions {}x{}", rows, cols)
            }
            MatrixError::BadCell { row, col } => write!(f, "invalid cell ({}, {})", row, col),
            MatrixError::Mismatch { left, right } => write!(
                f,
                "matrix shapes {}x{} and {}x{} do not fit",
                left.0, left.1, right.0, right.1
            ),
            MatrixError::Algebra(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MatrixError {}

impl From<AlgexError> for MatrixError {
    fn from(e: AlgexError) -> Self {
        MatrixError::Algebra(e)
    }
}

/// Dense matrix of expressions, row major.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpMatrix {
    data: Vec<Vec<Exp>>,
    pub nrows: usize,
    pub ncols: usize,
}

impl ExpMatrix {
    /// Create zero matrix
    pub fn new(nrows: usize, ncols: usize) -> Result<Self, MatrixError> {
        if nrows == 0 || ncols == 0 {
            return Err(MatrixError::BadDimensions {
                rows: nrows,
                cols: ncols,
            });
        }
        let data = vec![vec![Exp::zero(); ncols]; nrows];
        Ok(Self { data, nrows, ncols })
    }

    /// Create identity matrix
    pub fn identity(size: usize) -> Result<Self, MatrixError> {
        let mut m = Self::new(size, size)?;
        for i in 0..size {
            m.data[i][i] = Exp::one();
        }
        Ok(m)
    }

    /// Builds a matrix from rows of expression text, e.g. `&[&["c", "-s"], &["s", "c"]]`.
    pub fn from_text(rows: &[&[&str]]) -> Result<Self, MatrixError> {
        let ncols = rows.first().map_or(0, |r| r.len());
        let mut m = Self::new(rows.len(), ncols)?;
        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(MatrixError::Mismatch {
                    left: (rows.len(), ncols),
                    right: (i, row.len()),
                });
            }
            for (j, cell) in row.iter().enumerate() {
                m.data[i][j] = Exp::parse(cell)?;
            }
        }
        Ok(m)
    }

    pub fn set(&mut self, row: usize, col: usize, e: Exp) -> Result<(), MatrixError> {
        let cell = self
            .data
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(MatrixError::BadCell { row, col })?;
        *cell = e;
        Ok(())
    }

    /// cell (row, col), `None` outside the matrix
    pub fn el(&self, row: usize, col: usize) -> Option<&Exp> {
        self.data.get(row).and_then(|r| r.get(col))
    }

    pub fn transpose(&self) -> ExpMatrix {
        let data = (0..self.ncols)
            .map(|j| (0..self.nrows).map(|i| self.data[i][j].clone()).collect())
            .collect();
        ExpMatrix {
            data,
            nrows: self.ncols,
            ncols: self.nrows,
        }
    }

    /// Matrix product `self * b`.
    pub fn mul(&self, b: &ExpMatrix) -> Result<ExpMatrix, MatrixError> {
        if self.ncols != b.nrows {
            return Err(MatrixError::Mismatch {
                left: (self.nrows, self.ncols),
                right: (b.nrows, b.ncols),
            });
        }
        let mut m = ExpMatrix::new(self.nrows, b.ncols)?;
        for i in 0..self.nrows {
            for j in 0..b.ncols {
                let products: Vec<Exp> = (0..self.ncols)
                    .map(|k| self.data[i][k].mul(&b.data[k][j]))
                    .collect();
                let refs: Vec<&Exp> = products.iter().collect();
                m.data[i][j] = Exp::sum(&refs);
            }
        }
        Ok(m)
    }

    /// `self + scale*b`, element by element.
    pub fn sum(&self, b: &ExpMatrix, scale: &Exp) -> Result<ExpMatrix, MatrixError> {
        if self.nrows != b.nrows || self.ncols != b.ncols {
            return Err(MatrixError::Mismatch {
                left: (self.nrows, self.ncols),
                right: (b.nrows, b.ncols),
            });
        }
        let mut m = self.clone();
        for (row, brow) in m.data.iter_mut().zip(&b.data) {
            for (cell, bcell) in row.iter_mut().zip(brow) {
                *cell = cell.add(&scale.mul(bcell));
            }
        }
        Ok(m)
    }

    /// Replaces the monomial `b` by `c` in every cell.
    pub fn substitute(&self, b: &[Value], c: &Exp) -> Result<ExpMatrix, MatrixError> {
        let mut m = self.clone();
        for row in m.data.iter_mut() {
            for cell in row.iter_mut() {
                *cell = cell.substitute(b, c)?;
            }
        }
        Ok(m)
    }

    /// [`ExpMatrix::substitute`] with pattern and replacement given as text, e.g.
    /// `m.substitute_text("ct^2", "1-st^2")`.
    pub fn substitute_text(
        &self,
        pattern: &str,
        replacement: &str,
    ) -> Result<ExpMatrix, MatrixError> {
        let b = Exp::parse(pattern)?;
        let b = b
            .terms()
            .values()
            .next()
            .filter(|_| b.len() == 1)
            .map(|t| t.factors())
            .ok_or_else(|| AlgexError::Syntax(pattern.to_string()))?;
        let c = Exp::parse(replacement)?;
        self.substitute(&b, &c)
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().flatten().all(Exp::is_zero)
    }
}

impl Index<(usize, usize)> for ExpMatrix {
    type Output = Exp;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[i][j] // i - row, j - column
    }
}

impl IndexMut<(usize, usize)> for ExpMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.data[i][j]
    }
}

impl fmt::Display for ExpMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.data.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            let cells: Vec<String> = row.iter().map(|e| e.to_string()).collect();
            write!(f, "[{}]", cells.join(", "))?;
        }
        write!(f, "]")
    }
}
