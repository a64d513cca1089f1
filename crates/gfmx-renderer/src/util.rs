//! Shared helpers for event processing.

use pulldown_cmark::{CodeBlockKind, HeadingLevel};

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Full info string of a code block (empty for indented blocks).
pub(crate) fn info_string<'a>(kind: &'a CodeBlockKind<'_>) -> &'a str {
    match kind {
        CodeBlockKind::Fenced(info) => info.as_ref(),
        CodeBlockKind::Indented => "",
    }
}

/// Language of a code block: the first word of its info string.
pub(crate) fn fence_language(info: &str) -> Option<&str> {
    info.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use pulldown_cmark::CowStr;

    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(heading_level_to_num(HeadingLevel::H1), 1);
        assert_eq!(heading_level_to_num(HeadingLevel::H6), 6);
    }

    #[test]
    fn test_fence_language() {
        assert_eq!(fence_language("rust ignore"), Some("rust"));
        assert_eq!(fence_language("  python"), Some("python"));
        assert_eq!(fence_language(""), None);
    }

    #[test]
    fn test_info_string() {
        let fenced = CodeBlockKind::Fenced(CowStr::Borrowed("sh title=run"));
        assert_eq!(info_string(&fenced), "sh title=run");
        assert_eq!(info_string(&CodeBlockKind::Indented), "");
    }
}
