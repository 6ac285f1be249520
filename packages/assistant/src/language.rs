//! Response language selection.
//!
//! The portal supports a fixed set of languages. Unknown codes fall back to
//! English, so every request always names a concrete response language.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
    Tamil,
    Bengali,
}

impl Language {
    /// Look up a language by its two-letter code. Anything unrecognised is English.
    ///
    /// # Examples
    /// ```
    /// use civicai_assistant::Language;
    ///
    /// assert_eq!(Language::from_code("hi"), Language::Hindi);
    /// assert_eq!(Language::from_code("fr"), Language::English);
    /// ```
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "hi" => Self::Hindi,
            "mr" => Self::Marathi,
            "ta" => Self::Tamil,
            "bn" => Self::Bengali,
            _ => Self::English,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Marathi => "mr",
            Self::Tamil => "ta",
            Self::Bengali => "bn",
        }
    }

    /// Name used inside prompts ("Respond strictly in Hindi").
    pub fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Marathi => "Marathi",
            Self::Tamil => "Tamil",
            Self::Bengali => "Bengali",
        }
    }
}

impl From<&str> for Language {
    fn from(code: &str) -> Self {
        Self::from_code(code)
    }
}

/// Display name for a language code, English for unknown codes.
pub fn language_name(code: &str) -> &'static str {
    Language::from_code(code).display_name()
}
