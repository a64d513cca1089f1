//! GFM disallowed raw HTML filter.
//!
//! Certain tags interpret their content specially and are unsafe to pass
//! through from user-written Markdown. The filter neutralizes them by escaping
//! the leading `<` of every opening or closing tag with one of these names,
//! leaving the rest of the markup as written:
//!
//! ```
//! use gfmx_extension::tagfilter::filter_html;
//!
//! assert_eq!(
//!     filter_html("<script>alert(1)</script>"),
//!     "&lt;script>alert(1)&lt;/script>"
//! );
//! assert_eq!(filter_html("<em>kept</em>"), "<em>kept</em>");
//! ```

use std::borrow::Cow;

/// Tag names filtered by the extension (compared ASCII case-insensitively).
pub const DISALLOWED_TAGS: [&str; 9] = [
    "title",
    "textarea",
    "style",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "script",
    "plaintext",
];

/// Escape disallowed tags in a raw HTML fragment.
///
/// Returns the input borrowed when nothing needs escaping.
pub fn filter_html(html: &str) -> Cow<'_, str> {
    let bytes = html.as_bytes();
    let mut output: Option<String> = None;
    let mut copied = 0;

    for (pos, _) in html.match_indices('<') {
        if !is_disallowed_tag(&bytes[pos + 1..]) {
            continue;
        }
        let out = output.get_or_insert_with(|| String::with_capacity(html.len() + 16));
        out.push_str(&html[copied..pos]);
        out.push_str("&lt;");
        copied = pos + 1;
    }

    match output {
        Some(mut out) => {
            out.push_str(&html[copied..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(html),
    }
}

/// Check whether `rest` (the text right after a `<`) opens a disallowed tag.
fn is_disallowed_tag(rest: &[u8]) -> bool {
    let rest = rest.strip_prefix(b"/").unwrap_or(rest);

    DISALLOWED_TAGS.iter().any(|tag| {
        let len = tag.len();
        if rest.len() <= len || !rest[..len].eq_ignore_ascii_case(tag.as_bytes()) {
            return false;
        }
        match rest[len] {
            b'>' => true,
            b'/' => rest.get(len + 1) == Some(&b'>'),
            c => c.is_ascii_whitespace(),
        }
    })
}
