use prefview_core::key_normalizer::{clean_key, is_tagged, normalize};

#[test]
fn strips_hash_suffix() {
    let normalized = normalize("foo_habc");
    assert_eq!(normalized.clean, "foo");
    assert!(normalized.tagged);
}

#[test]
fn suffix_letter_is_case_sensitive() {
    let normalized = normalize("foo_H123");
    assert_eq!(normalized.clean, "foo_H123");
    assert!(!normalized.tagged);
}

#[test]
fn suffix_needs_at_least_one_hash_char() {
    assert_eq!(clean_key("foo_h"), "foo_h");
    assert!(!is_tagged("foo_h"));
}

#[test]
fn suffix_only_key_is_degenerate() {
    let normalized = normalize("_habc");
    assert_eq!(normalized.clean, "");
    assert!(normalized.tagged);
    assert!(normalized.is_degenerate());
}

#[test]
fn only_trailing_token_is_removed() {
    assert_eq!(clean_key("level_h2_hdeadbeef"), "level_h2");
    assert_eq!(clean_key("a_hb_c"), "a_hb_c");
    assert_eq!(clean_key("hud_hidden"), "hud");
    assert_eq!(clean_key("hud_hidden-1"), "hud_hidden-1");
}

#[test]
fn clean_key_is_prefix_and_equal_iff_untagged() {
    let samples = [
        "score_habcd",
        "playerName",
        "mute_hzzzz",
        "foo_H123",
        "foo_h",
        "_habc",
        "x",
        "volume_h3418573451",
        "über_hß",
        "über_h9",
    ];

    for raw in samples {
        let normalized = normalize(raw);
        assert!(raw.starts_with(&normalized.clean), "{raw}");
        assert_eq!(normalized.clean == raw, !normalized.tagged, "{raw}");
        assert_eq!(normalized.tagged, is_tagged(raw), "{raw}");
    }
}
