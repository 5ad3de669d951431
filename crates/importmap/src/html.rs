//! Import map extraction from HTML
//!
//! Finds the first `<script type="importmap">` element in a document and
//! returns its raw text. Script contents are raw text in HTML, so no entity
//! decoding is applied. Elements inside `<!-- -->` comments are ignored.

use regex::Regex;
use std::sync::OnceLock;

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"))
}

fn script_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("script pattern is valid")
    })
}

fn importmap_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|\s)type\s*=\s*(?:"\s*importmap\s*"|'\s*importmap\s*'|importmap(?:\s|/|$))"#)
            .expect("type pattern is valid")
    })
}

/// Text content of the first import map script in `html`
pub fn extract_import_map(html: &str) -> Option<String> {
    let html = comment_regex().replace_all(html, "");

    script_regex()
        .captures_iter(&html)
        .find(|caps| importmap_type_regex().is_match(&caps[1]))
        .map(|caps| caps[2].to_string())
}

/// Whether `html` contains an import map script
pub fn has_import_map(html: &str) -> bool {
    extract_import_map(html).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_double_quoted() {
        let html = r#"<html><head>
            <script type="importmap">{"imports": {"a": "/a.js"}}</script>
        </head></html>"#;
        assert_eq!(
            extract_import_map(html).as_deref(),
            Some(r#"{"imports": {"a": "/a.js"}}"#)
        );
    }

    #[test]
    fn test_extract_single_quoted_and_unquoted() {
        let html = "<script type='importmap'>{}</script>";
        assert_eq!(extract_import_map(html).as_deref(), Some("{}"));

        let html = "<script async type=importmap>{\"imports\":{}}</script>";
        assert_eq!(extract_import_map(html).as_deref(), Some("{\"imports\":{}}"));
    }

    #[test]
    fn test_case_insensitive() {
        let html = r#"<SCRIPT TYPE="ImportMap">{}</SCRIPT>"#;
        assert_eq!(extract_import_map(html).as_deref(), Some("{}"));
    }

    #[test]
    fn test_skips_other_scripts() {
        let html = r#"
            <script type="module">import "a";</script>
            <script data-type="importmap">nope</script>
            <script type="importmap">{"imports":{"b":"/b.js"}}</script>
            <script type="importmap">{"imports":{"c":"/c.js"}}</script>
        "#;
        assert_eq!(
            extract_import_map(html).as_deref(),
            Some(r#"{"imports":{"b":"/b.js"}}"#)
        );
    }

    #[test]
    fn test_ignores_commented_script() {
        let html = r#"
            <!-- <script type="importmap">{"imports":{"old":"/old.js"}}</script> -->
            <script type="importmap">{"imports":{"new":"/new.js"}}</script>
        "#;
        assert_eq!(
            extract_import_map(html).as_deref(),
            Some(r#"{"imports":{"new":"/new.js"}}"#)
        );
    }

    #[test]
    fn test_no_import_map() {
        assert!(!has_import_map("<html><body>hi</body></html>"));
        assert!(!has_import_map(r#"<script type="module">{}</script>"#));
    }
}
