use regex as rust_regex;
use tregex::Regex;

/// Rewrites one of our patterns into the syntax of the `regex` crate. Only
/// the constructs that differ are handled: non-capturing groups are spelled
/// `(?:` there, and `.` must also match `\n`.
pub fn to_rust_syntax(pattern: &str) -> String {
    let mut result = String::from("(?s)");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        result.push(c);
        match c {
            '\\' => result.extend(chars.next()),
            '(' if chars.peek() == Some(&':') => {
                chars.next();
                result.push_str("?:");
            }
            _ => {}
        }
    }
    result
}

/// Match a pattern against a given input on both engines, unanchored and
/// over the whole input, and compare the results.
pub fn check_against_rust(pattern: &str, input: &str) {
    let ours = Regex::new(pattern);
    let rust = rust_regex::Regex::new(&to_rust_syntax(pattern));
    let full = rust_regex::Regex::new(&format!("^(?:{})$", to_rust_syntax(pattern)));

    match (ours, rust, full) {
        (Ok(ours), Ok(rust), Ok(full)) => {
            assert_eq!(
                ours.is_match(input),
                rust.is_match(input),
                "Mismatch for pattern {:?} input {:?} (is_match)",
                pattern,
                input
            );
            assert_eq!(
                ours.is_full_match(input),
                full.is_match(input),
                "Mismatch for pattern {:?} input {:?} (is_full_match)",
                pattern,
                input
            );
        }
        (Err(_), Err(_), _) => {} // All failed, that's good
        (Err(e), Ok(_), _) => panic!("We failed to compile {pattern:?} but rust-regex succeeded: {e}"),
        (Ok(_), Err(e), _) | (Ok(_), _, Err(e)) => {
            panic!("rust-regex failed to compile {pattern:?} but we succeeded: {e}")
        }
    }
}
