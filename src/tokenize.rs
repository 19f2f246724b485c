use regex::Regex;
use std::sync::LazyLock;

/// Runs of ASCII word characters and apostrophes. Anything else, non-ASCII
/// letters included, separates words.
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9_']+").expect("word pattern is valid"));

/// Split text into lowercase word tokens.
///
/// Order and repetition are preserved for term-frequency counting. Absent or
/// empty text yields no tokens.
pub fn tokenize(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };

    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        // Words start and end on a word character, so edge apostrophes drop
        .map(|m| m.as_str().trim_matches('\''))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_lowercases_and_splits_on_punctuation() {
        let tokens = tokenize(Some("Rust, WebAssembly & the Web!"));
        assert_eq!(tokens, vec!["rust", "webassembly", "the", "web"]);
    }

    #[test]
    fn test_tokenize_keeps_repetition_and_order() {
        let tokens = tokenize(Some("go go Gadget go"));
        assert_eq!(tokens, vec!["go", "go", "gadget", "go"]);
    }

    #[test]
    fn test_tokenize_apostrophes() {
        // Inner apostrophes stay, wrapping quotes are separators
        let tokens = tokenize(Some("Don't say 'maybe' rock'n'roll"));
        assert_eq!(tokens, vec!["don't", "say", "maybe", "rock'n'roll"]);
    }

    #[test]
    fn test_tokenize_digits_and_underscores() {
        let tokens = tokenize(Some("HTTP/2 in 2024: snake_case"));
        assert_eq!(tokens, vec!["http", "2", "in", "2024", "snake_case"]);
    }

    #[test]
    fn test_tokenize_non_ascii_letters_separate_words() {
        let tokens = tokenize(Some("Café crème naïve"));
        assert_eq!(tokens, vec!["caf", "cr", "me", "na", "ve"]);
    }

    #[test]
    fn test_tokenize_lone_apostrophes() {
        assert_eq!(tokenize(Some("' '' rock 'n' roll'")), vec!["rock", "n", "roll"]);
        assert_eq!(tokenize(Some("a''b")), vec!["a''b"]);
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize(None).is_empty());
        assert!(tokenize(Some("")).is_empty());
        assert!(tokenize(Some("  -- ... !!")).is_empty());
    }

    #[test]
    fn test_tokenize_single_letters_kept() {
        // No minimum length and no stop words
        assert_eq!(tokenize(Some("a I x")), vec!["a", "i", "x"]);
    }
}
