use crate::Utils::config::SessionSettings;
use crate::Utils::session::*;
use std::io::Cursor;
//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;

    /// runs the lines and returns what the session printed
    fn run_lines(session: &mut Session, text: &str) -> (Flow, String) {
        let mut out: Vec<u8> = Vec::new();
        let flow = session.run(Cursor::new(text), &mut out, false).unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    fn session() -> Session {
        Session::new(SessionSettings::default())
    }

    #[test]
    fn test_assign_and_evaluate() {
        let mut s = session();
        let (flow, out) = run_lines(&mut s, "a := x+1\na*a\n");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, " 1+2*x+x^2\n");
        assert_eq!(s.var("a").unwrap().to_string(), "1+x");
    }

    #[test]
    fn test_bind_as_written_or_substituted() {
        let mut s = session();
        run_lines(&mut s, "a := x+1\nb := a+1\nc = a+1\n");
        assert_eq!(s.var("b").unwrap().to_string(), "1+a");
        assert_eq!(s.var("c").unwrap().to_string(), "2+x");
        run_lines(&mut s, "b :=\n");
        assert!(s.var("b").is_none());
    }

    #[test]
    fn test_lists_and_comments() {
        let mut s = session();
        let (_, out) = run_lines(&mut s, "# nothing here\n\nx+y, x-y\n");
        assert_eq!(out, " x+y\n x-y\n");
    }

    #[test]
    fn test_mod() {
        let mut s = session();
        let (_, out) = run_lines(&mut s, "p := 3*x+4*y\np mod 3\n");
        assert_eq!(out, " y\n");
        let (_, out) = run_lines(&mut s, "q mod 3\n");
        assert!(out.starts_with("invalid modular to"), "{}", out);
        let (_, out) = run_lines(&mut s, "p mod x\n");
        assert!(out.starts_with("invalid modular denominator"), "{}", out);
        let (_, out) = run_lines(&mut s, "r := 1/x\nr mod 2\n");
        assert!(out.starts_with("mod needs a polynomial"), "{}", out);
    }

    #[test]
    fn test_isolate() {
        let mut s = session();
        let (_, out) = run_lines(&mut s, "isolate a*x + b, c\n");
        assert_eq!(out, " a*x = -b+c\n");
        let (_, out) = run_lines(&mut s, "isolate sin(t)*r + q, p\n");
        assert_eq!(out, " sin(t) = (p-q)/(r)\n");
        let (_, out) = run_lines(&mut s, "isolate x\n");
        assert!(out.starts_with("usage: isolate"), "{}", out);
    }

    #[test]
    fn test_functions() {
        let mut s = session();
        let (_, out) = run_lines(&mut s, "f(x) := x^2\nf(a)+f(b)\n");
        assert_eq!(out, " a^2+b^2\n");
        let (_, out) = run_lines(&mut s, "g(x, y) := x*y\ng(a+1, b)\n");
        assert_eq!(out, " a*b+b\n");
        let (_, out) = run_lines(&mut s, "f(x) :=\nf(a)\n");
        assert_eq!(out, " f(a)\n");
        let (_, out) = run_lines(&mut s, "h(2*x) := x\n");
        assert!(out.contains("is not a plain symbol"), "{}", out);
    }

    #[test]
    fn test_subst() {
        let mut s = session();
        let (_, out) = run_lines(&mut s, "e := a*b + c\ns := subst e, a*b, d\ns\n");
        assert_eq!(out, " c+d\n");
        // the relation may come from a binding of the term
        let (_, out) = run_lines(&mut s, "k := 2*x + 1\nx := y\nm := subst k, x\nm\n");
        assert_eq!(out, " 1+2*y\n");
        // lower terms of the relation move to the other side
        let (_, out) = run_lines(&mut s, "t := subst z^2, z^2 + 1, w\nt\n");
        assert_eq!(out, " -1+w\n");
        let (_, out) = run_lines(&mut s, "u := subst e, q\n");
        assert!(out.starts_with("unable to find a substitute for"), "{}", out);
        let (_, out) = run_lines(&mut s, "u := subst e, 3, q\n");
        assert!(out.starts_with("no usable terms in"), "{}", out);
    }

    #[test]
    fn test_errors_do_not_end_session() {
        let mut s = session();
        let (flow, out) = run_lines(&mut s, "(a\n1 := x\nv := x, y\nv := (x\nw := 1+w\n");
        assert_eq!(flow, Flow::Continue);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4, "{}", out);
        assert!(lines[0].starts_with("syntax error"));
        assert!(lines[1].starts_with("invalid assignment to"));
        assert!(lines[2].starts_with("unable to assign multiple expressions to"));
        assert!(lines[3].starts_with("assignment failed"));
        assert_eq!(s.var("w").unwrap().to_string(), "1+w");
    }

    #[test]
    fn test_builtins() {
        let mut s = session();
        let (_, out) = run_lines(&mut s, "list\n");
        assert_eq!(out, " no bindings\n");
        let (_, out) = run_lines(&mut s, "help\n");
        assert!(out.starts_with(" exit, list, help\n"), "{}", out);
        let (_, out) = run_lines(&mut s, "a := x+1\nlist\n");
        assert!(out.contains("name") && out.contains("1+x"), "{}", out);
        let (flow, out) = run_lines(&mut s, "exit\na\n");
        assert_eq!(flow, Flow::Exit);
        assert_eq!(out, "exiting\n");
    }

    #[test]
    fn test_prompt_when_interactive() {
        let mut s = Session::new(SessionSettings {
            prompt: "algex> ".to_string(),
            ..SessionSettings::default()
        });
        let mut out: Vec<u8> = Vec::new();
        s.run(Cursor::new("1+1\n"), &mut out, true).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "algex>  2\nalgex> ");
    }

    #[test]
    fn test_run_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.ax");
        std::fs::write(&path, "# script\nq := 2*z\nq*q\n").unwrap();
        let mut s = session();
        let (flow, out) = run_lines(&mut s, &format!("file {}\nq\n", path.display()));
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, " 4*z^2\n 2*z\n");

        let (_, out) = run_lines(&mut s, "file /no/such/script.ax\n");
        assert!(out.starts_with("unable to open"), "{}", out);
    }

    #[test]
    fn test_script_nesting_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.ax");
        std::fs::write(&path, format!("file {}\n", path.display())).unwrap();
        let mut s = Session::new(SessionSettings {
            max_script_depth: 2,
            ..SessionSettings::default()
        });
        let (_, out) = run_lines(&mut s, &format!("file {}\n", path.display()));
        assert_eq!(out, "scripts nested deeper than 2\n");
    }

    #[test]
    fn test_exit_inside_script_stops_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.ax");
        std::fs::write(&path, "exit\n").unwrap();
        let mut s = session();
        let (flow, out) = run_lines(&mut s, &format!("file {}\nx\n", path.display()));
        assert_eq!(flow, Flow::Exit);
        assert_eq!(out, "exiting\n");
    }
}
