//! Locale negotiation: pick exactly one supported locale for a request.
//!
//! Quality-weighted `Accept-Language` parsing is delegated to the
//! `accept-language` crate and tag matching to `fluent-langneg`, so
//! subtag handling (`zh-CN` → `zh`, `en-GB` → `en`) follows the usual
//! BCP 47 lookup rules instead of string prefix checks.

use fluent_langneg::{negotiate_languages, NegotiationStrategy};
use unic_langid::LanguageIdentifier;

use crate::i18n::Locale;

/// One entry of a client's language preference list.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceEntry {
    pub tag: String,
    pub quality: f32,
}

/// Ordered language preferences derived from a client header.
///
/// Entries are sorted by descending quality; ties keep header order.
/// Entries with `q=0` mean "not acceptable" and are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalePreference {
    entries: Vec<PreferenceEntry>,
}

impl LocalePreference {
    /// Parse an `Accept-Language` header value. Never fails: malformed
    /// segments are skipped and an unusable header yields an empty list.
    pub fn from_header(raw: &str) -> Self {
        let mut entries: Vec<PreferenceEntry> = accept_language::parse_with_quality(raw)
            .into_iter()
            .filter(|(tag, quality)| !tag.is_empty() && *quality > 0.0)
            .map(|(tag, quality)| PreferenceEntry { tag, quality })
            .collect();

        // Stable, so equal qualities keep header order.
        entries.sort_by(|a, b| b.quality.total_cmp(&a.quality));

        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PreferenceEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tags in preference order, parsed as language identifiers.
    /// Tags that are not valid identifiers (including `*`) are skipped.
    fn language_ids(&self) -> Vec<LanguageIdentifier> {
        self.entries
            .iter()
            .filter_map(|entry| entry.tag.parse().ok())
            .collect()
    }
}

/// Resolve the locale for a request.
///
/// 1. A persisted value wins if it is a member of `supported`.
/// 2. Otherwise the best lookup match of `preferences` against `supported`.
/// 3. Otherwise `default`.
///
/// Pure and deterministic. A persisted value outside `supported` is ignored
/// here; overwriting it is the router's job.
pub fn resolve(
    persisted: Option<&str>,
    preferences: &LocalePreference,
    supported: &[Locale],
    default: Locale,
) -> Locale {
    if let Some(sticky) = persisted.and_then(|code| supported.iter().find(|l| l.code() == code)) {
        return *sticky;
    }

    negotiate(preferences, supported).unwrap_or(default)
}

fn negotiate(preferences: &LocalePreference, supported: &[Locale]) -> Option<Locale> {
    if preferences.is_empty() {
        return None;
    }

    let requested = preferences.language_ids();
    let (candidates, available): (Vec<Locale>, Vec<LanguageIdentifier>) = supported
        .iter()
        .filter_map(|locale| {
            locale
                .code()
                .parse::<LanguageIdentifier>()
                .ok()
                .map(|id| (*locale, id))
        })
        .unzip();

    let matched = negotiate_languages(
        &requested,
        &available,
        None,
        NegotiationStrategy::Lookup,
    );

    let chosen = matched.first()?;
    available
        .iter()
        .position(|id| id == *chosen)
        .map(|index| candidates[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn supported() -> Vec<Locale> {
        vec![Locale::ENGLISH, Locale::CHINESE]
    }

    fn resolve_header(persisted: Option<&str>, header: &str) -> Locale {
        resolve(
            persisted,
            &LocalePreference::from_header(header),
            &supported(),
            Locale::ENGLISH,
        )
    }

    // ==================== Preference Parsing Tests ====================

    #[test]
    fn test_from_header_orders_by_quality() {
        let prefs = LocalePreference::from_header("en;q=0.5, zh-CN, fr;q=0.8");
        let tags: Vec<_> = prefs.entries().iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["zh-CN", "fr", "en"]);
    }

    #[test]
    fn test_from_header_drops_zero_quality() {
        let prefs = LocalePreference::from_header("zh;q=0, en");
        assert_eq!(prefs.entries().len(), 1);
        assert_eq!(prefs.entries()[0].tag, "en");
    }

    #[test]
    fn test_from_header_empty() {
        assert!(LocalePreference::from_header("").is_empty());
    }

    // ==================== Resolution Tests ====================

    #[test]
    fn test_header_subtag_matches_base_locale() {
        assert_eq!(resolve_header(None, "zh-CN,en;q=0.8"), Locale::CHINESE);
    }

    #[test]
    fn test_header_regional_and_wildcard_tags() {
        assert_eq!(resolve_header(None, "zh-TW"), Locale::CHINESE);
        assert_eq!(resolve_header(None, "en-US,zh;q=0.9"), Locale::ENGLISH);
        assert_eq!(resolve_header(None, "*;q=1, zh;q=0.5"), Locale::CHINESE);
        assert_eq!(resolve_header(None, "de, en;q=0"), Locale::ENGLISH);
    }

    #[test]
    fn test_header_quality_beats_order() {
        assert_eq!(resolve_header(None, "en;q=0.3,zh;q=0.9"), Locale::CHINESE);
    }

    #[test]
    fn test_header_skips_unsupported() {
        assert_eq!(resolve_header(None, "fr-FR,de;q=0.9,zh;q=0.5"), Locale::CHINESE);
    }

    #[test]
    fn test_persisted_wins_over_header() {
        assert_eq!(resolve_header(Some("en"), "zh-CN,zh;q=0.9"), Locale::ENGLISH);
        assert_eq!(resolve_header(Some("zh"), "en-US"), Locale::CHINESE);
    }

    #[test]
    fn test_unsupported_persisted_falls_through_to_header() {
        assert_eq!(resolve_header(Some("fr"), "zh"), Locale::CHINESE);
    }

    #[test]
    fn test_unsupported_persisted_and_no_header_is_default() {
        assert_eq!(resolve_header(Some("de"), ""), Locale::ENGLISH);
    }

    #[test]
    fn test_malformed_header_degrades_to_default() {
        assert_eq!(resolve_header(None, ";;;,,q=abc"), Locale::ENGLISH);
        assert_eq!(resolve_header(None, "*"), Locale::ENGLISH);
        assert_eq!(resolve_header(None, "fr, de"), Locale::ENGLISH);
    }

    #[test]
    fn test_default_is_returned_even_if_not_first_supported() {
        let result = resolve(
            None,
            &LocalePreference::empty(),
            &supported(),
            Locale::CHINESE,
        );
        assert_eq!(result, Locale::CHINESE);
    }

    #[test]
    fn test_restricted_supported_set() {
        let only_en = vec![Locale::ENGLISH];
        let result = resolve(
            Some("zh"),
            &LocalePreference::from_header("zh"),
            &only_en,
            Locale::ENGLISH,
        );
        assert_eq!(result, Locale::ENGLISH);
    }

    // ==================== Property Tests ====================

    fn tag_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec![
            "en", "zh", "fr", "de", "ja", "en-US", "en-GB", "zh-CN", "zh-TW", "es-419", "*",
        ])
    }

    fn header_from(tags: &[&str]) -> String {
        tags.iter()
            .enumerate()
            .map(|(i, tag)| format!("{};q={:.2}", tag, 1.0 - (i as f32) * 0.05))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn primary(tag: &str) -> &str {
        tag.split('-').next().unwrap_or(tag)
    }

    proptest! {
        #[test]
        fn prop_persisted_supported_always_wins(
            persisted in prop::sample::select(vec!["en", "zh"]),
            header in ".{0,40}",
        ) {
            let result = resolve_header(Some(persisted), &header);
            prop_assert_eq!(result.code(), persisted);
        }

        #[test]
        fn prop_resolution_is_idempotent(
            persisted in prop::option::of(prop::sample::select(vec!["en", "zh", "fr", ""])),
            tags in prop::collection::vec(tag_strategy(), 0..6),
        ) {
            let header = header_from(&tags);
            prop_assert_eq!(
                resolve_header(persisted, &header),
                resolve_header(persisted, &header)
            );
        }

        #[test]
        fn prop_never_picks_lower_ranked_supported_locale(
            tags in prop::collection::vec(tag_strategy(), 1..6),
        ) {
            let header = header_from(&tags);
            let result = resolve_header(None, &header);

            if let Some(rank) = tags.iter().position(|t| *t == "en" || *t == "zh") {
                let listed = tags[rank];
                let earlier_match = tags[..rank].iter().any(|t| primary(t) == result.code());
                prop_assert!(
                    result.code() == listed || earlier_match,
                    "header {:?} resolved to {} although {} ranks higher",
                    header, result, listed
                );
            }
        }

        #[test]
        fn prop_result_is_always_supported(header in ".{0,60}") {
            let result = resolve_header(None, &header);
            prop_assert!(supported().contains(&result));
        }
    }
}
