//! Reduce Confluence storage-format / HTML bodies to plain text.

use std::sync::OnceLock;

use regex::Regex;

fn block_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<\s*(br\s*/?|/p|/h[1-6]|/li|/tr|/div)\s*>").expect("static regex")
    })
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

fn blank_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex"))
}

/// Strip markup, keeping paragraph breaks and decoding the common entities.
pub fn to_plain_text(html: &str) -> String {
    let text = block_break().replace_all(html, "\n");
    let text = any_tag().replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    blank_runs().replace_all(text.trim(), "\n\n").into_owned()
}
