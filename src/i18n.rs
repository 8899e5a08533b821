//! Language selection for localized diagnostics.
//!
//! Locale bundles live in `locales/` and are compiled in by the `i18n!`
//! invocation at the crate root; unknown keys fall back to English. Only
//! error messages and type names are localized, point labels and script
//! text pass through untouched.

/// A language the engine can render diagnostics in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Language {
    #[default]
    English,
    German,
}

/// Every shipped language, in menu order.
pub const LANGUAGES: [Language; 2] = [Language::English, Language::German];

impl Language {
    /// The locale code matching the bundle under `locales/`.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
        }
    }

    /// Name of the language in that language.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::German => "Deutsch",
        }
    }

    pub fn all() -> &'static [Language] {
        &LANGUAGES
    }

    pub fn from_code(code: &str) -> Option<Self> {
        LANGUAGES.into_iter().find(|l| l.code() == code)
    }
}

/// Switch the language used for all subsequently rendered diagnostics.
/// Process-wide.
pub fn set_language(lang: Language) {
    rust_i18n::set_locale(lang.code());
}

pub fn current_language() -> Language {
    Language::from_code(&rust_i18n::locale()).unwrap_or_default()
}
