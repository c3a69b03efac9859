// the collection of utility functions mainly for bracket parsing and proceeding
use crate::symbolic::symbolic_errors::AlgexError;
use regex::Regex;
use std::sync::LazyLock;

/// Checks that every ')' closes an earlier '(' and nothing is left open.
pub fn check_brackets(s: &str) -> Result<(), AlgexError> {
    let mut depth: usize = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return Err(AlgexError::UnbalancedParens(format!(
                        "too many ')' at {} in {:?}",
                        i, s
                    )));
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(AlgexError::UnbalancedParens(format!(
            "too few ')' in {:?}",
            s
        )));
    }
    Ok(())
}

// find byte positions of a given char that are outside brackets only
pub fn find_char_positions_outside_brackets(s: &str, c: char) -> Vec<usize> {
    let mut depth: usize = 0;
    let mut positions = Vec::new();
    for (i, ch) in s.char_indices() {
        if ch == '(' {
            depth += 1;
        } else if ch == ')' {
            depth = depth.saturating_sub(1);
        } else if ch == c && depth == 0 {
            positions.push(i);
        }
    }
    positions
}

/// Splits at the top level occurrences of `c`; separators inside brackets are kept.
pub fn split_outside_brackets(s: &str, c: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for pos in find_char_positions_outside_brackets(s, c) {
        pieces.push(&s[start..pos]);
        start = pos + c.len_utf8();
    }
    pieces.push(&s[start..]);
    pieces
}

/// The identifier-like run (letters, digits, '_') at the end of `s`, ignoring trailing
/// blanks. Returns its byte offset and text.
pub fn trailing_identifier(s: &str) -> Option<(usize, &str)> {
    let trimmed = s.trim_end();
    let start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)?;
    Some((start, &trimmed[start..]))
}

static RESERVED_IDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])(_[A-Za-z0-9_]*)").expect("reserved identifier pattern")
});

/// First identifier in `s` that starts with the reserved '_' prefix.
pub fn reserved_identifier(s: &str) -> Option<String> {
    RESERVED_IDENT
        .captures(s)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
