use crate::symbolic::factor::Value;
use crate::symbolic::frac::*;
use crate::symbolic::parse_frac::{ParsedFrac, parse_frac};
use crate::symbolic::symbolic_errors::AlgexError;
use crate::symbolic::terms::Exp;
use crate::symbolic::utils::*;
//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(s: &str) -> Frac {
        Frac::parse(s).unwrap()
    }

    #[test]
    fn test_equivalent_forms() {
        let cases = vec![
            ("x ", " x"),
            ("x+y", "y +c+ x -c"),
            ("a^2- b*b", "- (a+b)*(b-a)"),
            ("a/(a+b) + b/(a-b)", "(a^2+b^2)/(a^2-b^2)"),
            ("al/be", "1/(al/be)^-1"),
            ("alpha *beta", "-beta^2 /-(alpha/beta)^-1"),
        ];
        for (a, b) in cases {
            let fa = parse_frac(a).unwrap();
            let fb = parse_frac(b).unwrap();
            assert!(matches!(fa, ParsedFrac::Single(_)), "{:?}", a);
            assert_eq!(
                fa.single().unwrap().to_string(),
                fb.single().unwrap().to_string(),
                "{:?} vs {:?}",
                a,
                b
            );
        }
        assert_eq!(frac("a^2- b*b").to_string(), "a^2-b^2");
        assert_eq!(frac("al/be").to_string(), "al/(be)");
        assert_eq!(
            frac("a/(a+b) + b/(a-b)").to_string(),
            "(a^2+b^2)/(a^2-b^2)"
        );
    }

    #[test]
    fn test_lists() {
        let cases = vec![("x , y", " x,y "), ("x+y,b", "y +c+ x -c ,b")];
        for (a, b) in cases {
            let la = parse_frac(a).unwrap();
            let lb = parse_frac(b).unwrap();
            assert!(matches!(la, ParsedFrac::List(_)));
            assert_eq!(la, lb, "{:?} vs {:?}", a, b);
        }
        let items = parse_frac("x+y,b").unwrap().into_vec();
        let shown: Vec<String> = items.iter().map(|f| f.to_string()).collect();
        assert_eq!(shown, vec!["x+y", "b"]);
        assert!(Frac::parse("x,y").is_err());
    }

    #[test]
    fn test_reduce() {
        assert_eq!(frac("(2*a^2 + 4*a)/(6*a)").to_string(), "(2+a)/3");
        assert_eq!(frac("(2*a^2 + 4*a)/(2*a)").to_string(), "2+a");
        assert_eq!(frac("(a-b)/(a^2-b^2)").to_string(), "1/(a+b)");
        assert_eq!(frac("(x-x)/y").to_string(), "0");
        let f = Frac::over(Exp::parse("4*x").unwrap(), Exp::parse("6*x*y").unwrap());
        assert_eq!(f.reduced().unwrap().to_string(), "2/(3*y)");
        let bad = Frac::over(Exp::parse("x").unwrap(), Exp::zero());
        assert!(matches!(bad.reduced(), Err(AlgexError::ZeroDenominator(_))));
    }

    #[test]
    fn test_reduce_rescales_after_division() {
        let a = frac("1/(x-y)-1/(y-x)");
        let b = frac("2/(x-y)");
        assert_eq!(a.to_string(), "2/(x-y)");
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a, b);
        assert_eq!(frac("(a^2-b^2)/(2*a-2*b)").to_string(), "(a+b)/2");
    }

    #[test]
    fn test_from_exp() {
        let f = Frac::from_exp(&Exp::parse("a+b^-1").unwrap());
        assert_eq!(f.to_string(), "(1+a*b)/(b)");
        assert!(!f.is_polynomial());
        let g: Frac = Exp::parse("a+b").unwrap().into();
        assert!(g.is_polynomial());
        assert_eq!(g.to_string(), "a+b");
    }

    #[test]
    fn test_arithmetic() {
        let a = frac("1/a");
        let b = frac("1/b");
        assert_eq!(a.add(&b).unwrap().to_string(), "(a+b)/(a*b)");
        assert_eq!(a.sub(&a).unwrap().to_string(), "0");
        assert_eq!(frac("a/b").mul(&frac("b/a")).unwrap().to_string(), "1");
        assert_eq!(frac("a").div(&frac("b")).unwrap().to_string(), "a/(b)");
        assert!(matches!(
            frac("a").div(&Frac::zero()),
            Err(AlgexError::ZeroDenominator(_))
        ));
    }

    #[test]
    fn test_zero_denominator_in_text() {
        assert!(matches!(
            Frac::parse("1/(a-a)"),
            Err(AlgexError::ZeroDenominator(_))
        ));
    }

    #[test]
    fn test_substitute() {
        let f = frac("a+b");
        let g = f.substitute(&[Value::sym("b")], &frac("1/a")).unwrap();
        assert_eq!(g.to_string(), "(1+a^2)/(a)");

        let (h, hit) = frac("1/b").substituted(&[Value::sym("b")], &frac("x+1")).unwrap();
        assert!(hit);
        assert_eq!(h.to_string(), "1/(1+x)");

        let (same, hit) = f.substituted(&[Value::sym("z")], &frac("2")).unwrap();
        assert!(!hit);
        assert_eq!(same, f);
    }

    #[test]
    fn test_functions() {
        let f = frac("sin(x)*cos(x) + sin(x)");
        assert_eq!(f.to_string(), "sin(x)+sin(x)*cos(x)");
        assert_eq!(f.fns.len(), 2);
        assert!(f.fns.contains_key(&fn_token(0)));
        assert!(f.fns.contains_key(&fn_token(1)));

        let g = frac("sin(x)+cos(y)+sin(x)");
        assert_eq!(g.to_string(), "2*sin(x)+cos(y)");
        assert_eq!(g.fns.len(), 2);

        assert_eq!(frac("f(a, b/2)").to_string(), "f(a,1/2*b)");
        assert_eq!(frac("f(g(x))").to_string(), "f(g(x))");
    }

    #[test]
    fn test_merge_fns() {
        let a = frac("sin(x)");
        let b = frac("cos(y)+sin(x)");
        let (c, fns) = a.merge_fns(&b).unwrap();
        assert_eq!(fns.len(), 2);
        assert_eq!(c.to_string(), "sin(x)+cos(y)");
        assert_eq!(a.add(&b).unwrap().to_string(), "2*sin(x)+cos(y)");
        assert_eq!(a.sub(&frac("sin(x)")).unwrap().to_string(), "0");
    }

    #[test]
    fn test_substituted_fn() {
        let f = frac("f(a)+f(b)");
        let def = FnDef {
            name: "f".to_string(),
            args: vec![frac("x")],
        };
        let (g, hit) = f.substituted_fn(&def, &frac("x^2")).unwrap();
        assert!(hit);
        assert_eq!(g.to_string(), "a^2+b^2");
        assert!(g.fns.is_empty());

        let other = FnDef {
            name: "h".to_string(),
            args: vec![frac("x")],
        };
        let (same, hit) = f.substituted_fn(&other, &frac("x^2")).unwrap();
        assert!(!hit);
        assert_eq!(same.to_string(), "f(a)+f(b)");
    }

    #[test]
    fn test_leading_fn() {
        let f = frac("g(a,b)+f(c)");
        let tok = f.leading_fn().unwrap();
        assert_eq!(f.fns[&tok].name, "g");
        let f = frac("g(a)+f(c)");
        let tok = f.leading_fn().unwrap();
        assert_eq!(f.fns[&tok].name, "f");
        assert!(matches!(frac("x").leading_fn(), Err(AlgexError::NoAnswer)));
        assert!(matches!(
            frac("f(a)*f(b)+1").leading_fn(),
            Err(AlgexError::AmbiguousFunction)
        ));
    }

    #[test]
    fn test_rearrange() {
        let (left, right) = frac("sin(t)*r + q").rearrange(&frac("p")).unwrap();
        assert_eq!(left.to_string(), "sin(t)");
        assert_eq!(right.to_string(), "(p-q)/(r)");

        let (left, right) = frac("a*x + b").rearrange(&frac("c")).unwrap();
        assert_eq!(format!("{} = {}", left, right), "a*x = -b+c");

        assert!(matches!(
            frac("x").rearrange(&frac("x+1")),
            Err(AlgexError::NoAnswer)
        ));
        assert!(matches!(
            frac("f(a)*f(b)+1").rearrange(&frac("0")),
            Err(AlgexError::AmbiguousFunction)
        ));
    }

    #[test]
    fn test_sub_value_and_symbols() {
        assert_eq!(frac("x").as_sub_value(), Some(vec![Value::sym("x")]));
        assert_eq!(
            frac("a*b^2").as_sub_value(),
            Some(vec![Value::sym("a"), Value::sym_pow("b", 2)])
        );
        assert_eq!(frac("2*x").as_sub_value(), None);
        assert_eq!(frac("x+1").as_sub_value(), None);
        assert_eq!(frac("1/x").as_sub_value(), None);
        assert_eq!(frac("3").as_sub_value(), None);
        assert_eq!(frac("sin(t)*r/q").symbols(), vec!["q", "r", "t"]);
    }

    #[test]
    fn test_parse_errors() {
        for bad in [" ", "a+", "a*", "2 3", "a**b", "f()", "(a,b)", "a$b"] {
            let got = parse_frac(bad);
            assert!(
                matches!(got, Err(ref e) if e.is_syntax()),
                "{:?} gave {:?}",
                bad,
                got
            );
        }
        for bad in ["(a+b", "a+b)", "f(x))"] {
            assert!(matches!(
                parse_frac(bad),
                Err(AlgexError::UnbalancedParens(_))
            ));
        }
        assert!(matches!(
            parse_frac("_x+1"),
            Err(AlgexError::ReservedPrefix(ref name)) if name == "_x"
        ));
        match parse_frac("x,,y") {
            Err(AlgexError::BadListElement { index, cause, .. }) => {
                assert_eq!(index, 1);
                assert!(cause.is_syntax());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_errors_name_text_as_written() {
        assert_eq!(
            parse_frac("f(x)(y)"),
            Err(AlgexError::Syntax("f(x)(y)".to_string()))
        );
        assert_eq!(
            parse_frac(" (a+b)^4000000000 "),
            Err(AlgexError::Overflow("(a+b)^4000000000".to_string()))
        );
    }

    #[test]
    fn test_bracket_utils() {
        assert!(check_brackets("f(a,(b))").is_ok());
        assert!(check_brackets(")(").is_err());
        assert_eq!(find_char_positions_outside_brackets("a,(b,c),d", ','), vec![1, 7]);
        assert_eq!(split_outside_brackets("f(a,b),c", ','), vec!["f(a,b)", "c"]);
        assert_eq!(split_outside_brackets("abc", ','), vec!["abc"]);
        assert_eq!(trailing_identifier("2*sin "), Some((2, "sin")));
        assert_eq!(trailing_identifier("a+"), None);
        assert_eq!(reserved_identifier("a+_b1*c"), Some("_b1".to_string()));
        assert_eq!(reserved_identifier("a_b+c"), None);
    }
}
