//! Variable Substitution
//!
//! Expands `$X` occurrences (X a single byte) against the variable table.
//! The scan is a single pass and never re-expands substituted values. When
//! nothing matches, the input comes back borrowed; only a real substitution
//! allocates.

use std::borrow::Cow;

use crate::interpreter::types::VarTable;

/// Expand every `$X` whose slot is set; `$X` with an unset slot and a
/// trailing `$` are copied verbatim.
pub fn expand<'a>(input: &'a str, vars: &VarTable) -> Cow<'a, str> {
    let bytes = input.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0; // input is copied verbatim up to this byte
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() {
            if let Some(value) = vars.get(bytes[i + 1]) {
                let out = out.get_or_insert_with(|| String::with_capacity(input.len()));
                out.push_str(&input[copied..i]);
                out.push_str(value);
                i += 2;
                copied = i;
                continue;
            }
        }
        i += 1;
    }

    match out {
        None => Cow::Borrowed(input),
        Some(mut expanded) => {
            expanded.push_str(&input[copied..]);
            Cow::Owned(expanded)
        }
    }
}

/// Expand every argv entry. The result has the same length as the input;
/// the exec layer appends the terminating null when it builds C strings.
pub fn expand_argv<'a>(argv: &'a [String], vars: &VarTable) -> Vec<Cow<'a, str>> {
    argv.iter().map(|arg| expand(arg, vars)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(u8, &str)]) -> VarTable {
        let mut vars = VarTable::new();
        for &(name, value) in pairs {
            vars.set(name, Some(value.to_string()));
        }
        vars
    }

    #[test]
    fn identity_without_dollar_stays_borrowed() {
        let vars = table(&[(b'f', "value")]);
        assert!(matches!(expand("plain text", &vars), Cow::Borrowed(_)));
    }

    #[test]
    fn unset_slot_is_copied_verbatim_and_borrowed() {
        let vars = VarTable::new();
        let result = expand("$x and $y", &vars);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "$x and $y");
    }

    #[test]
    fn set_slot_substitutes() {
        let vars = table(&[(b'f', "./a.txt")]);
        let result = expand("cat $f twice $f", &vars);
        assert!(matches!(result, Cow::Owned(_)));
        assert_eq!(result, "cat ./a.txt twice ./a.txt");
    }

    #[test]
    fn mixed_set_and_unset() {
        let vars = table(&[(b'a', "A")]);
        assert_eq!(expand("$a$b$a", &vars), "A$bA");
    }

    #[test]
    fn trailing_dollar_is_literal() {
        let vars = table(&[(b'f', "x")]);
        assert_eq!(expand("end$", &vars), "end$");
    }

    #[test]
    fn substituted_values_are_not_re_expanded() {
        let vars = table(&[(b'a', "$b"), (b'b', "boom")]);
        assert_eq!(expand("$a", &vars), "$b");
    }

    #[test]
    fn non_ascii_after_dollar_is_literal() {
        let vars = table(&[(b'f', "x")]);
        assert_eq!(expand("$é$f", &vars), "$éx");
    }

    #[test]
    fn argv_expansion_preserves_length() {
        let vars = table(&[(b'f', "file")]);
        let argv: Vec<String> = vec!["echo".into(), "$f".into(), "$u".into()];
        let expanded = expand_argv(&argv, &vars);
        assert_eq!(expanded.len(), argv.len());
        assert_eq!(expanded[0], "echo");
        assert_eq!(expanded[1], "file");
        assert_eq!(expanded[2], "$u");
    }
}
