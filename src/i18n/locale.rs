//! Locale type: validated member of the supported-locale set.
//!
//! A `Locale` can only be constructed from a code that is present in the
//! registry, so holding one is proof that the value is supported. Unsupported
//! codes never get past `Locale::from_code`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::i18n::{LocaleConfig, LocaleRegistry};

/// A supported locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    code: &'static str,
}

impl Locale {
    pub const ENGLISH: Locale = Locale { code: "en" };

    pub const CHINESE: Locale = Locale { code: "zh" };

    /// Create a Locale from a code string.
    ///
    /// Returns `None` when the code is not in the supported set. Callers treat
    /// that the same as an absent value; there is no attempt at correction
    /// (`"zh-CN"` is not turned into `"zh"` here, that is negotiation's job).
    pub fn from_code(code: &str) -> Option<Locale> {
        LocaleRegistry::get()
            .get_by_code(code)
            .map(|config| Locale { code: config.code })
    }

    /// The designated default locale.
    pub fn default_locale() -> Locale {
        Locale {
            code: LocaleRegistry::get().default_locale().code,
        }
    }

    /// Every supported locale, in registry order.
    pub fn supported() -> Vec<Locale> {
        LocaleRegistry::get()
            .list()
            .into_iter()
            .map(|config| Locale { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Full registry entry for this locale.
    ///
    /// # Panics
    /// Never in practice: a `Locale` is only built from registry entries.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be registered")
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_default(&self) -> bool {
        self.config().is_default
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
