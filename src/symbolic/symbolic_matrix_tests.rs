use crate::product;
use crate::symbolic::factor::Value;
use crate::symbolic::rotation::{rx, ry, rz};
use crate::symbolic::symbolic_matrix::*;
use crate::symbolic::terms::Exp;
//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let one = ExpMatrix::identity(2).unwrap();
        assert_eq!(one.to_string(), "[[1, 0], [0, 1]]");
        assert!(matches!(
            ExpMatrix::new(0, 3),
            Err(MatrixError::BadDimensions { rows: 0, cols: 3 })
        ));
    }

    #[test]
    fn test_transpose() {
        let mut a = ExpMatrix::new(2, 3).unwrap();
        for i in 0..a.nrows {
            for j in 0..a.ncols {
                let v = Value::num(i as i64 + 1, 5 * (j as i64 + 1));
                a.set(i, j, Exp::from_product(&[v])).unwrap();
            }
        }
        assert_eq!(a.to_string(), "[[1/5, 1/10, 1/15], [2/5, 1/5, 2/15]]");
        let b = a.transpose();
        assert_eq!((b.nrows, b.ncols), (3, 2));
        assert_eq!(b.to_string(), "[[1/5, 2/5], [1/10, 1/5], [1/15, 2/15]]");
        assert_eq!(b[(2, 1)].to_string(), "2/15");
    }

    #[test]
    fn test_mul() {
        let a = ExpMatrix::identity(2).unwrap();
        let mut b = ExpMatrix::identity(2).unwrap();
        let x2 = a.el(0, 0).unwrap().mul(&Exp::new(vec![product![("x", 2)]]));
        b.set(0, 1, x2).unwrap();
        assert_eq!(a.mul(&b).unwrap(), b);
        assert_eq!(b.mul(&a).unwrap(), b);

        let x = ExpMatrix::from_text(&[&["x00", "x01", "x02"], &["x10", "x11", "x12"]]).unwrap();
        let y = ExpMatrix::from_text(&[&["y00", "y01"], &["y10", "y11"], &["y20", "y21"]]).unwrap();
        let z = x.mul(&y).unwrap();
        assert_eq!(
            z.to_string(),
            "[[x00*y00+x01*y10+x02*y20, x00*y01+x01*y11+x02*y21], \
             [x10*y00+x11*y10+x12*y20, x10*y01+x11*y11+x12*y21]]"
        );
        assert!(matches!(x.mul(&x), Err(MatrixError::Mismatch { .. })));
    }

    #[test]
    fn test_sum() {
        let a = Exp::new(vec![vec![Value::num(-2, 3), Value::sym_pow("x", -1)]]);
        let b = Exp::new(vec![vec![Value::num(9, 4), Value::sym_pow("x", 2)]]);
        let mut p = ExpMatrix::new(1, 2).unwrap();
        p.set(0, 0, a.clone()).unwrap();
        let mut q = ExpMatrix::new(1, 2).unwrap();
        q.set(0, 0, a.clone()).unwrap();
        q.set(0, 1, b).unwrap();
        let r = p.sum(&q, &a.mul(&a)).unwrap();
        assert_eq!(r.to_string(), "[[-2/3*x^-1-8/27*x^-3, 1]]");
        let wide = ExpMatrix::new(1, 3).unwrap();
        assert!(matches!(p.sum(&wide, &a), Err(MatrixError::Mismatch { .. })));
    }

    #[test]
    fn test_cells() {
        let mut m = ExpMatrix::new(2, 2).unwrap();
        assert!(m.is_zero());
        assert!(m.el(2, 0).is_none());
        assert!(matches!(
            m.set(0, 5, Exp::one()),
            Err(MatrixError::BadCell { row: 0, col: 5 })
        ));
        m[(1, 0)] = Exp::parse("a+b").unwrap();
        assert_eq!(m.to_string(), "[[0, 0], [a+b, 0]]");
        assert!(!m.is_zero());
        assert!(matches!(
            ExpMatrix::from_text(&[&["a", "b"], &["c"]]),
            Err(MatrixError::Mismatch { .. })
        ));
        assert!(matches!(
            ExpMatrix::from_text(&[&["a+"]]),
            Err(MatrixError::Algebra(_))
        ));
    }

    #[test]
    fn test_rotation_double_angle() {
        for (i, r) in [rx("t"), ry("t"), rz("t")].into_iter().enumerate() {
            let r = r.unwrap();
            let r2 = r.mul(&r).unwrap();
            let ans = r2
                .substitute(&product![("ct", 2)], &Exp::parse("c2t+st^2").unwrap())
                .unwrap()
                .substitute(&product!["ct", "st"], &Exp::parse("1/2*s2t").unwrap())
                .unwrap();
            // with 2t -> t the square collapses back to the rotation itself
            let cf = r
                .sum(&ans, &Exp::int(-1))
                .unwrap()
                .substitute_text("c2t", "ct")
                .unwrap()
                .substitute_text("s2t", "st")
                .unwrap();
            assert_eq!(cf.to_string(), "[[0, 0, 0], [0, 0, 0], [0, 0, 0]]", "rotation {}", i);
            assert!(cf.is_zero());
        }
    }

    #[test]
    fn test_rotation_times_transpose_is_identity() {
        let one = ExpMatrix::identity(3).unwrap();
        for r in [rx("t"), ry("t"), rz("t")] {
            let r = r.unwrap();
            let p = r
                .mul(&r.transpose())
                .unwrap()
                .substitute_text("st^2", "1-ct^2")
                .unwrap();
            assert!(p.sum(&one, &Exp::int(-1)).unwrap().is_zero(), "{}", p);
        }
    }

    #[test]
    fn test_rotation_layout() {
        let r = rz("t").unwrap();
        assert_eq!(r.to_string(), "[[ct, -st, 0], [st, ct, 0], [0, 0, 1]]");
        let r = rx("a").unwrap();
        assert_eq!(r.to_string(), "[[1, 0, 0], [0, ca, -sa], [0, sa, ca]]");
        let r = ry("a").unwrap();
        assert_eq!(r.to_string(), "[[ca, 0, sa], [0, 1, 0], [-sa, 0, ca]]");
    }

    #[test]
    fn test_substitute_text_needs_single_term() {
        let r = rx("t").unwrap();
        assert!(matches!(
            r.substitute_text("ct+st", "1"),
            Err(MatrixError::Algebra(_))
        ));
    }
}
