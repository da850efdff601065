//! Internationalization (i18n): supported locales and request-time negotiation.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the supported locales and the default
//! - `locale`: `Locale`, a value that can only hold a supported code
//! - `negotiation`: `Accept-Language` parsing and the `resolve` decision function
//!
//! # Example
//!
//! ```rust
//! use locale_site::i18n::{resolve, Locale, LocalePreference};
//!
//! let prefs = LocalePreference::from_header("zh-CN,en;q=0.8");
//! let locale = resolve(None, &prefs, &Locale::supported(), Locale::default_locale());
//! assert_eq!(locale.code(), "zh");
//! ```

mod locale;
mod negotiation;
mod registry;

pub use locale::Locale;
pub use negotiation::{resolve, LocalePreference, PreferenceEntry};
pub use registry::{LocaleConfig, LocaleRegistry};
