//! Save-or-skip decision for a response.
//!
//! Evaluated in order: save-all or status match, then the ignore-html and
//! ignore-empty narrowing, then the match override. The override is OR'd in
//! last, so a body containing the match string is always saved.

use crate::config::FetchConfig;

const HTML_PROBE: &[u8] = b"<html";

/// Borrowed view of the configuration fields the decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct SavePolicy<'a> {
    pub save_all: bool,
    pub save_status: &'a [u32],
    pub ignore_html: bool,
    pub ignore_empty: bool,
    pub match_body: &'a str,
}

impl<'a> SavePolicy<'a> {
    pub fn from_config(cfg: &'a FetchConfig) -> Self {
        Self {
            save_all: cfg.save_all,
            save_status: &cfg.save_status,
            ignore_html: cfg.ignore_html,
            ignore_empty: cfg.ignore_empty,
            match_body: &cfg.match_body,
        }
    }

    pub fn should_save(&self, status: u32, body: &[u8]) -> bool {
        let mut save = self.save_all || self.save_status.contains(&status);

        if self.ignore_html {
            save = save && !looks_like_html(body);
        }

        if self.ignore_empty {
            save = save && !is_blank(body);
        }

        if !self.match_body.is_empty() && contains(body, self.match_body.as_bytes()) {
            save = true;
        }

        save
    }
}

/// Case-insensitive `<html` anywhere in the body.
pub fn looks_like_html(body: &[u8]) -> bool {
    body.windows(HTML_PROBE.len())
        .any(|w| w.eq_ignore_ascii_case(HTML_PROBE))
}

/// True when the body is empty or only whitespace.
pub fn is_blank(body: &[u8]) -> bool {
    String::from_utf8_lossy(body).trim().is_empty()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy<'a>(save_status: &'a [u32], match_body: &'a str) -> SavePolicy<'a> {
        SavePolicy {
            save_all: false,
            save_status,
            ignore_html: false,
            ignore_empty: false,
            match_body,
        }
    }

    #[test]
    fn status_in_set_saves() {
        assert!(policy(&[500], "").should_save(500, b"oops"));
    }

    #[test]
    fn nothing_configured_skips() {
        assert!(!policy(&[], "").should_save(200, b"hello"));
    }

    #[test]
    fn save_all_saves_any_status() {
        let mut p = policy(&[], "");
        p.save_all = true;
        assert!(p.should_save(404, b""));
        assert!(p.should_save(302, b"moved"));
    }

    #[test]
    fn ignore_html_narrows() {
        let mut p = policy(&[200], "");
        p.ignore_html = true;
        assert!(!p.should_save(200, b"<!doctype html><HTML><body>x</body></HTML>"));
        assert!(p.should_save(200, b"{\"ok\":true}"));
    }

    #[test]
    fn ignore_empty_narrows() {
        let mut p = policy(&[200], "");
        p.ignore_empty = true;
        assert!(!p.should_save(200, b""));
        assert!(!p.should_save(200, b" \r\n\t "));
        assert!(p.should_save(200, b" x "));
    }

    #[test]
    fn match_overrides_everything() {
        let mut p = policy(&[], "needle");
        p.ignore_html = true;
        p.ignore_empty = true;
        assert!(p.should_save(200, b"<html>haystack needle haystack</html>"));
        assert!(!p.should_save(200, b"<html>haystack</html>"));
    }

    #[test]
    fn match_is_case_sensitive() {
        assert!(!policy(&[], "Needle").should_save(200, b"needle"));
    }

    #[test]
    fn html_probe() {
        assert!(looks_like_html(b"<HtMl lang=en>"));
        assert!(looks_like_html(b"junk before <html"));
        assert!(!looks_like_html(b"<htm"));
        assert!(!looks_like_html(b""));
    }

    #[test]
    fn from_config_borrows_fields() {
        let cfg = FetchConfig {
            save_status: vec![201],
            match_body: "secret".to_string(),
            ignore_empty: true,
            ..FetchConfig::default()
        };
        let p = SavePolicy::from_config(&cfg);
        assert!(p.should_save(201, b"created"));
        assert!(!p.should_save(201, b"   "));
        assert!(p.should_save(404, b"a secret"));
    }
}
