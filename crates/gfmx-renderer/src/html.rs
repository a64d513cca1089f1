//! HTML element writers.
//!
//! Markup follows the reference CommonMark renderer: void elements are
//! written XHTML-style (`<hr />`) and block elements end with a newline.

use std::fmt::Write;

use crate::state::escape_html;

/// Replacement for raw HTML in safe mode.
pub(crate) const RAW_HTML_OMITTED: &str = "<!-- raw HTML omitted -->";

/// Image `data:` URLs that stay allowed in safe mode.
const SAFE_DATA_PREFIXES: [&str; 4] = [
    "data:image/png",
    "data:image/gif",
    "data:image/jpeg",
    "data:image/webp",
];

pub(crate) fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
    if let Some(lang) = lang {
        write!(
            out,
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            escape_html(lang),
            escape_html(content)
        )
        .unwrap();
    } else {
        write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
    }
    out.push('\n');
}

pub(crate) fn link_start(href: &str, title: &str, out: &mut String) {
    write!(out, r#"<a href="{}""#, escape_html(href)).unwrap();
    if !title.is_empty() {
        write!(out, r#" title="{}""#, escape_html(title)).unwrap();
    }
    out.push('>');
}

pub(crate) fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    write!(
        out,
        r#"<img src="{}" alt="{}""#,
        escape_html(src),
        escape_html(alt)
    )
    .unwrap();
    if !title.is_empty() {
        write!(out, r#" title="{}""#, escape_html(title)).unwrap();
    }
    out.push_str(" />");
}

pub(crate) fn task_list_marker(checked: bool, out: &mut String) {
    if checked {
        out.push_str(r#"<input type="checkbox" checked="" disabled="" /> "#);
    } else {
        out.push_str(r#"<input type="checkbox" disabled="" /> "#);
    }
}

pub(crate) fn footnote_reference(label: &str, number: usize, out: &mut String) {
    let label = escape_html(label);
    write!(
        out,
        r##"<sup class="footnote-ref"><a href="#fn-{label}" id="fnref-{label}">{number}</a></sup>"##
    )
    .unwrap();
}

pub(crate) fn footnote_definition_start(label: &str, number: usize, out: &mut String) {
    write!(
        out,
        r#"<div class="footnote-definition" id="fn-{}"><sup class="footnote-definition-label">{number}</sup>"#,
        escape_html(label)
    )
    .unwrap();
    out.push('\n');
}

/// Check whether a URL may be emitted in safe mode.
///
/// `javascript:`, `vbscript:` and `file:` URLs are rejected, as are `data:`
/// URLs other than common image types.
pub(crate) fn is_safe_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("vbscript:") || lower.starts_with("file:")
    {
        return false;
    }
    if lower.starts_with("data:") {
        return SAFE_DATA_PREFIXES.iter().any(|prefix| lower.starts_with(prefix));
    }
    true
}
