//! Bundled, locale-keyed fallback content.
//!
//! The JSON documents under `content/` are compiled into the binary and
//! parsed once on first use. Every dataset must contain every supported
//! locale; `verify_all` checks this and runs both in tests and at startup.

use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;

use crate::api::types::{AboutData, HomeData, Product};
use crate::i18n::Locale;

const HOME_JSON: &str = include_str!("../../content/home.json");
const ABOUT_JSON: &str = include_str!("../../content/about.json");
const PRODUCTS_JSON: &str = include_str!("../../content/products.json");

/// Static content for one content type, keyed by locale code.
#[derive(Debug)]
pub struct FallbackDataset<T> {
    name: &'static str,
    entries: HashMap<String, T>,
}

impl<T: DeserializeOwned> FallbackDataset<T> {
    pub fn parse(name: &'static str, raw: &str) -> Result<Self> {
        let entries: HashMap<String, T> = serde_json::from_str(raw)
            .with_context(|| format!("Fallback dataset '{}' is not valid JSON for its type", name))?;

        Ok(Self { name, entries })
    }
}

impl<T> FallbackDataset<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Entry for `locale`, or the default locale's entry when `locale` is
    /// missing.
    ///
    /// # Panics
    /// Panics if the default locale is missing too. Bundled datasets are
    /// checked by `verify_all`, so this indicates a broken build.
    pub fn get(&self, locale: Locale) -> &T {
        self.entries
            .get(locale.code())
            .or_else(|| self.entries.get(Locale::default_locale().code()))
            .unwrap_or_else(|| {
                panic!(
                    "Fallback dataset '{}' has no entry for the default locale",
                    self.name
                )
            })
    }

    pub fn contains(&self, locale: Locale) -> bool {
        self.entries.contains_key(locale.code())
    }

    /// Fails if any supported locale is missing.
    pub fn verify(&self) -> Result<()> {
        let missing: Vec<&str> = Locale::supported()
            .into_iter()
            .filter(|locale| !self.contains(*locale))
            .map(|locale| locale.code())
            .collect();

        if !missing.is_empty() {
            bail!(
                "Fallback dataset '{}' is missing locales: {}",
                self.name,
                missing.join(", ")
            );
        }
        Ok(())
    }
}

fn load<T: DeserializeOwned>(
    cell: &'static OnceLock<FallbackDataset<T>>,
    name: &'static str,
    raw: &str,
) -> &'static FallbackDataset<T> {
    cell.get_or_init(|| {
        FallbackDataset::parse(name, raw)
            .unwrap_or_else(|e| panic!("Bundled fallback content is corrupt: {:#}", e))
    })
}

pub fn home() -> &'static FallbackDataset<HomeData> {
    static CELL: OnceLock<FallbackDataset<HomeData>> = OnceLock::new();
    load(&CELL, "home", HOME_JSON)
}

pub fn about() -> &'static FallbackDataset<AboutData> {
    static CELL: OnceLock<FallbackDataset<AboutData>> = OnceLock::new();
    load(&CELL, "about", ABOUT_JSON)
}

pub fn products() -> &'static FallbackDataset<Vec<Product>> {
    static CELL: OnceLock<FallbackDataset<Vec<Product>>> = OnceLock::new();
    load(&CELL, "products", PRODUCTS_JSON)
}

/// Parse every bundled dataset and check locale coverage.
pub fn verify_all() -> Result<()> {
    FallbackDataset::<HomeData>::parse("home", HOME_JSON)?.verify()?;
    FallbackDataset::<AboutData>::parse("about", ABOUT_JSON)?.verify()?;
    FallbackDataset::<Vec<Product>>::parse("products", PRODUCTS_JSON)?.verify()?;
    Ok(())
}
