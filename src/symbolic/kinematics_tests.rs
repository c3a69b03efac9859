use crate::symbolic::factor::Value;
use crate::symbolic::kinematics::*;
use crate::symbolic::rotation::rz;
use crate::symbolic::terms::Exp;
//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(s: &str) -> Exp {
        Exp::parse(s).unwrap()
    }

    fn isolated(factor: &[&str], rhs: &str, div: &str) -> Isolated {
        Isolated {
            factor: factor.iter().map(|s| Value::sym(s)).collect(),
            rhs: exp(rhs),
            div: exp(div),
        }
    }

    #[test]
    fn test_apply_identities() {
        let e = apply_identities(&exp("c1*c2*x+c1*s2")).unwrap();
        assert_eq!(e.to_string(), "c12*x-c2*s1+s1*s2*x+s12");
        let plain = exp("c0*c3+r0");
        assert_eq!(apply_identities(&plain).unwrap(), plain);
    }

    #[test]
    fn test_split_up() {
        let r = split_up(&exp("2*c0*s3*x-4*c0*y+6*z")).unwrap();
        assert_eq!(r, isolated(&["c0", "s3"], "4*c0*y-6*z", "2*x"));
        assert_eq!(r.to_string(), "[c0 s3] = (4*c0*y-6*z) / (2*x)");

        // sign and shared factors cancel
        let r = split_up(&exp("-c0*a*x+a*y")).unwrap();
        assert_eq!(r, isolated(&["c0"], "y", "x"));

        let r = split_up(&exp("c0*x-a*y-a*w")).unwrap();
        assert_eq!(r.to_string(), "[c0] = (a) * (w+y) / (x)");

        // equal complexity goes to the first term
        let r = split_up(&exp("c0*s1+c2*s3")).unwrap();
        assert_eq!(r.to_string(), "[c0 s1] = (-c2*s3) / (1)");

        let r = split_up(&exp("x*y-w")).unwrap();
        assert!(r.factor.is_empty() && r.rhs.is_zero() && r.div.is_zero());
        assert_eq!(r.key(), "[]");
    }

    #[test]
    fn test_solve_eliminates_shared_factor() {
        let rs = vec![
            isolated(&["c0"], "s1*x", "1"),
            isolated(&["c0"], "y", "1"),
            isolated(&["c0"], "w", "1"),
        ];
        let lines = solve("", rs).unwrap();
        assert_eq!(
            lines,
            vec![
                "...[c0] = (y) / (1)",
                "...[s1] = (y) / (x)",
                "...[s1] = (w) / (x)",
                "......[s1] = (w) / (x)",
            ]
        );
        assert!(solve("", Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_arm_geometry() {
        let arm = six_axis_arm().unwrap();
        assert_eq!(arm.len(), 6);
        assert_eq!(arm[0].rotation, rz("0").unwrap());
        assert_eq!(arm[0].offset.to_string(), "[[0], [0], [d0]]");
        assert!(arm[5].offset.is_zero());
        let (r, b) = target_pose().unwrap();
        assert_eq!(r.to_string(), "[[r0], [r1], [r2]]");
        assert_eq!(b[(1, 2)].to_string(), "B12");
    }

    #[test]
    fn test_pose_equations() {
        let arm = six_axis_arm().unwrap();
        let (r, b) = target_pose().unwrap();
        let eqs = pose_equations(&arm, &r, &b).unwrap();
        let cells: usize = eqs.iter().map(|(_, refs)| refs.len()).sum();
        assert_eq!(cells, 6 * (3 + 9));
        for pair in eqs.windows(2) {
            let (a, b) = (pair[0].0.to_string(), pair[1].0.to_string());
            assert!((a.len(), &a) < (b.len(), &b));
        }
        let (z, _) = eqs
            .iter()
            .find(|(_, refs)| refs.iter().any(|s| s == "r[0:2]"))
            .unwrap();
        assert!(z.mentions("r2") && z.mentions("d0"), "{}", z);

        for (e, _) in &eqs {
            let iso = split_up(e).unwrap();
            assert!(
                iso.factor
                    .iter()
                    .all(|v| v.symbol().is_some_and(|n| n.starts_with(['c', 's']))),
                "{}",
                iso
            );
        }
    }
}
