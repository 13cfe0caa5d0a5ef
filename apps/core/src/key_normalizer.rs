use std::sync::OnceLock;

use regex::Regex;

static HASH_SUFFIX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedKey {
    pub clean: String,
    pub tagged: bool,
}

impl NormalizedKey {
    /// A key made only of the suffix token normalizes to nothing.
    pub fn is_degenerate(&self) -> bool {
        self.clean.is_empty()
    }
}

fn hash_suffix() -> &'static Regex {
    HASH_SUFFIX.get_or_init(|| Regex::new("_h[A-Za-z0-9]+$").expect("hash suffix pattern"))
}

/// Strips the host's trailing `_h<alnum>+` token. Matching is case-sensitive on `h`.
pub fn normalize(raw: &str) -> NormalizedKey {
    match hash_suffix().find(raw) {
        Some(found) => NormalizedKey {
            clean: raw[..found.start()].to_string(),
            tagged: true,
        },
        None => NormalizedKey {
            clean: raw.to_string(),
            tagged: false,
        },
    }
}

pub fn clean_key(raw: &str) -> String {
    normalize(raw).clean
}

pub fn is_tagged(raw: &str) -> bool {
    hash_suffix().is_match(raw)
}
