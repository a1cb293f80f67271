//! Small string utilities shared by the core and its modules.

/// Iterate over the non-empty segments of `text` separated by `sep`.
///
/// A leading separator is skipped, so `segments("/lights/status", '/')`
/// yields `"lights"` then `"status"`. Modules use this to pick request
/// paths apart; the gateway uses it to extract the interface name.
pub fn segments(text: &str, sep: char) -> impl Iterator<Item = &str> {
    text.split(sep).filter(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_skip_leading_separator() {
        let parts: Vec<_> = segments("/lights/status", '/').collect();
        assert_eq!(parts, vec!["lights", "status"]);
    }

    #[test]
    fn should_yield_nothing_for_bare_separator() {
        assert_eq!(segments("/", '/').count(), 0);
    }

    #[test]
    fn should_split_on_custom_separator() {
        let parts: Vec<_> = segments("08-30", '-').collect();
        assert_eq!(parts, vec!["08", "30"]);
    }

    #[test]
    fn should_collapse_repeated_separators() {
        let parts: Vec<_> = segments("a//b", '/').collect();
        assert_eq!(parts, vec!["a", "b"]);
    }
}
