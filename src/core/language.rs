//! Canonical table of supported languages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the 21 export languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    English,
    Arabic,
    #[serde(rename = "Chinese_Simplified")]
    ChineseSimplified,
    #[serde(rename = "Chinese_Traditional")]
    ChineseTraditional,
    French,
    German,
    Hindi,
    Indonesian,
    Italian,
    Japanese,
    Korean,
    Malay,
    Persian,
    Polish,
    Portuguese,
    Russian,
    Spanish,
    Thai,
    Turkish,
    Ukrainian,
    Vietnamese,
}

impl Language {
    /// Canonical export order
    pub const ALL: [Language; 21] = [
        Language::English,
        Language::Arabic,
        Language::ChineseSimplified,
        Language::ChineseTraditional,
        Language::French,
        Language::German,
        Language::Hindi,
        Language::Indonesian,
        Language::Italian,
        Language::Japanese,
        Language::Korean,
        Language::Malay,
        Language::Persian,
        Language::Polish,
        Language::Portuguese,
        Language::Russian,
        Language::Spanish,
        Language::Thai,
        Language::Turkish,
        Language::Ukrainian,
        Language::Vietnamese,
    ];

    /// Language of the input items
    pub const SOURCE: Language = Language::Korean;

    /// JSON field name used in the schema and records
    pub fn field_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Arabic => "Arabic",
            Language::ChineseSimplified => "Chinese_Simplified",
            Language::ChineseTraditional => "Chinese_Traditional",
            Language::French => "French",
            Language::German => "German",
            Language::Hindi => "Hindi",
            Language::Indonesian => "Indonesian",
            Language::Italian => "Italian",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::Malay => "Malay",
            Language::Persian => "Persian",
            Language::Polish => "Polish",
            Language::Portuguese => "Portuguese",
            Language::Russian => "Russian",
            Language::Spanish => "Spanish",
            Language::Thai => "Thai",
            Language::Turkish => "Turkish",
            Language::Ukrainian => "Ukrainian",
            Language::Vietnamese => "Vietnamese",
        }
    }

    /// Human-readable name ("Chinese Simplified")
    pub fn display_name(self) -> String {
        self.field_name().replace('_', " ")
    }

    pub fn is_source(self) -> bool {
        self == Self::SOURCE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(' ', "_");
        Language::ALL
            .into_iter()
            .find(|lang| lang.field_name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown language: {}", s))
    }
}
