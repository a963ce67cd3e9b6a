//! Mapping between the locale codes stored on records (`en-GB`) and the
//! short prefixes the site uses in its URLs (`uk`).

use std::collections::BTreeMap;

use serde::Deserialize;

pub const DEFAULT_LOCALE: &str = "en";

/// Internal locale code to public URL prefix. Both columns are unique.
const LOCALE_PREFIXES: &[(&str, &str)] = &[
    ("en", "en"),
    ("en-GB", "uk"),
    ("en-AU", "au"),
    ("en-CA", "ca"),
    ("de-DE", "de"),
    ("fr-FR", "fr"),
    ("es-ES", "es"),
    ("it-IT", "it"),
    ("nl-NL", "nl"),
    ("pt-PT", "pt"),
    ("pl-PL", "pl"),
    ("ja-JP", "jp"),
];

pub fn map_locale_to_url_prefix(locale: &str) -> Option<&'static str> {
    LOCALE_PREFIXES
        .iter()
        .find(|(code, _)| *code == locale)
        .map(|(_, prefix)| *prefix)
}

/// Unknown prefixes come back unchanged.
pub fn map_url_prefix_to_locale(prefix: &str) -> String {
    LOCALE_PREFIXES
        .iter()
        .find(|(_, p)| p.eq_ignore_ascii_case(prefix))
        .map(|(code, _)| (*code).to_string())
        .unwrap_or_else(|| prefix.to_string())
}

/// Normalize a `locale` request parameter. Accepts an internal code or a URL
/// prefix; empty or missing falls back to [`DEFAULT_LOCALE`].
pub fn resolve_request_locale(param: Option<&str>) -> String {
    match param.map(str::trim) {
        Some(value) if !value.is_empty() => map_url_prefix_to_locale(value),
        _ => DEFAULT_LOCALE.to_string(),
    }
}

/// A sibling localization of a record.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Localization {
    pub locale: String,
    pub slug: String,
}

/// Build the prefix → slug map clients use to switch language while staying
/// on the same record. Locales without a prefix are left out.
pub fn locale_slug_map(
    locale: &str,
    slug: &str,
    localizations: &[Localization],
) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();

    if let Some(prefix) = map_locale_to_url_prefix(locale) {
        map.insert(prefix.to_string(), slug.to_string());
    }

    for localization in localizations {
        match map_locale_to_url_prefix(&localization.locale) {
            Some(prefix) => {
                map.entry(prefix.to_string())
                    .or_insert_with(|| localization.slug.clone());
            }
            None => {
                tracing::debug!(
                    locale = %localization.locale,
                    "Skipping localization without URL prefix"
                );
            }
        }
    }

    map
}

/// Query-string `?locale=` shared by most read endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

impl LocaleQuery {
    pub fn resolve(&self) -> String {
        resolve_request_locale(self.locale.as_deref())
    }
}
