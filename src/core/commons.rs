// Helper functions for composing POSIX shell words.

/// Wraps a value in single quotes, escaping embedded single quotes with the
/// `'\''` idiom so the shell reassembles the original string.
pub fn quote_single(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Quotes a value only when the shell would otherwise interpret it. Bare
/// tokens stay bare so composed lines read like hand-typed commands.
pub fn quote_if_needed(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_shell_safe) {
        value.to_string()
    } else {
        quote_single(value)
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '+' | '=' | ',' | '@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_tokens_are_left_bare() {
        assert_eq!(quote_if_needed("main.cpp"), "main.cpp");
        assert_eq!(quote_if_needed("/c/msys64/ucrt64/bin"), "/c/msys64/ucrt64/bin");
        assert_eq!(quote_if_needed("-std=c++17"), "-std=c++17");
    }

    #[test]
    fn spaces_force_single_quotes() {
        assert_eq!(quote_if_needed("my app.cpp"), "'my app.cpp'");
        assert_eq!(quote_if_needed(""), "''");
    }

    #[test]
    fn embedded_single_quotes_are_escaped() {
        assert_eq!(quote_single("it's"), "'it'\\''s'");
    }
}
