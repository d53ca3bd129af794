//! Collation scheme names.

use std::fmt;

/// How many comparison levels take part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strength {
    /// Base letters only (`_ai`).
    Primary,
    /// Base letters and accents (`_ci`).
    Secondary,
    /// Base letters, accents and case (`_cs`).
    Tertiary,
}

/// Languages with built-in rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// en
    English,
    /// de
    German,
    /// fr
    French,
    /// sv
    Swedish,
    /// fi
    Finnish,
    /// da
    Danish,
    /// nb
    Norwegian,
    /// es
    Spanish,
    /// it
    Italian,
    /// nl
    Dutch,
    /// pt
    Portuguese,
}

impl Language {
    /// Parses a two-letter language code.
    pub fn from_code(code: &str) -> Option<Self> {
        let language = match code {
            "en" => Language::English,
            "de" => Language::German,
            "fr" => Language::French,
            "sv" => Language::Swedish,
            "fi" => Language::Finnish,
            "da" => Language::Danish,
            "nb" | "no" => Language::Norwegian,
            "es" => Language::Spanish,
            "it" => Language::Italian,
            "nl" => Language::Dutch,
            "pt" => Language::Portuguese,
            _ => return None,
        };
        Some(language)
    }

    /// Returns the two-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
            Language::French => "fr",
            Language::Swedish => "sv",
            Language::Finnish => "fi",
            Language::Danish => "da",
            Language::Norwegian => "nb",
            Language::Spanish => "es",
            Language::Italian => "it",
            Language::Dutch => "nl",
            Language::Portuguese => "pt",
        }
    }
}

/// A parsed collation scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollationScheme {
    /// Code point order.
    Binary,
    /// Locale rules at a strength.
    Locale {
        /// Language rules.
        language: Language,
        /// Optional region, lowercase.
        region: Option<String>,
        /// Comparison strength.
        strength: Strength,
    },
}

impl CollationScheme {
    /// Parses a scheme name, case-insensitively.
    ///
    /// ```rust
    /// use grove_layer::collation::{CollationScheme, Language, Strength};
    ///
    /// let scheme = CollationScheme::parse("latin1_swedish_ci").unwrap();
    /// assert_eq!(
    ///     scheme,
    ///     CollationScheme::Locale { language: Language::Swedish, region: None, strength: Strength::Secondary }
    /// );
    /// assert_eq!(CollationScheme::parse("utf8_bin"), Some(CollationScheme::Binary));
    /// assert!(CollationScheme::parse("fricostatic_sengalese_ci").is_none());
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if name == "binary" || name == "ucs_binary" || name.ends_with("_bin") {
            return Some(CollationScheme::Binary);
        }

        let alias = match name.as_str() {
            "latin1_swedish_ci" => Some((Language::Swedish, Strength::Secondary)),
            "latin1_general_ci" | "utf8_general_ci" | "utf8_unicode_ci" => {
                Some((Language::English, Strength::Secondary))
            }
            "latin1_general_cs" => Some((Language::English, Strength::Tertiary)),
            "latin1_german1_ci" => Some((Language::German, Strength::Secondary)),
            "latin1_danish_ci" => Some((Language::Danish, Strength::Secondary)),
            "latin1_spanish_ci" => Some((Language::Spanish, Strength::Secondary)),
            _ => None,
        };
        if let Some((language, strength)) = alias {
            return Some(CollationScheme::Locale {
                language,
                region: None,
                strength,
            });
        }

        let parts: Vec<&str> = name.split('_').collect();
        let (lang, region, strength) = match parts.as_slice() {
            [lang, strength] => (*lang, None, *strength),
            [lang, region, strength] => (*lang, Some(*region), *strength),
            _ => return None,
        };
        let language = Language::from_code(lang)?;
        let strength = match strength {
            "ai" => Strength::Primary,
            "ci" => Strength::Secondary,
            "cs" => Strength::Tertiary,
            _ => return None,
        };
        if let Some(region) = region {
            if region.len() != 2 || !region.bytes().all(|b| b.is_ascii_alphabetic()) {
                return None;
            }
        }
        Some(CollationScheme::Locale {
            language,
            region: region.map(str::to_string),
            strength,
        })
    }

    /// Returns true for the binary scheme.
    pub fn is_binary(&self) -> bool {
        matches!(self, CollationScheme::Binary)
    }
}

impl fmt::Display for CollationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollationScheme::Binary => write!(f, "ucs_binary"),
            CollationScheme::Locale {
                language,
                region,
                strength,
            } => {
                write!(f, "{}", language.code())?;
                if let Some(region) = region {
                    write!(f, "_{}", region)?;
                }
                let suffix = match strength {
                    Strength::Primary => "ai",
                    Strength::Secondary => "ci",
                    Strength::Tertiary => "cs",
                };
                write!(f, "_{}", suffix)
            }
        }
    }
}
