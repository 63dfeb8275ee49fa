//! Core data models for translation

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::core::errors::{Result, TranslationError};
use crate::core::language::Language;

/// Most items one batch may carry
pub const MAX_BATCH_ITEMS: usize = 15;

/// One translated item: a generated key plus every export language.
///
/// Field order matches the export layout, so serializing a record yields
/// `key` followed by the languages in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub key: String,
    #[serde(rename = "English")]
    pub english: String,
    #[serde(rename = "Arabic")]
    pub arabic: String,
    #[serde(rename = "Chinese_Simplified")]
    pub chinese_simplified: String,
    #[serde(rename = "Chinese_Traditional")]
    pub chinese_traditional: String,
    #[serde(rename = "French")]
    pub french: String,
    #[serde(rename = "German")]
    pub german: String,
    #[serde(rename = "Hindi")]
    pub hindi: String,
    #[serde(rename = "Indonesian")]
    pub indonesian: String,
    #[serde(rename = "Italian")]
    pub italian: String,
    #[serde(rename = "Japanese")]
    pub japanese: String,
    #[serde(rename = "Korean")]
    pub korean: String,
    #[serde(rename = "Malay")]
    pub malay: String,
    #[serde(rename = "Persian")]
    pub persian: String,
    #[serde(rename = "Polish")]
    pub polish: String,
    #[serde(rename = "Portuguese")]
    pub portuguese: String,
    #[serde(rename = "Russian")]
    pub russian: String,
    #[serde(rename = "Spanish")]
    pub spanish: String,
    #[serde(rename = "Thai")]
    pub thai: String,
    #[serde(rename = "Turkish")]
    pub turkish: String,
    #[serde(rename = "Ukrainian")]
    pub ukrainian: String,
    #[serde(rename = "Vietnamese")]
    pub vietnamese: String,
}

impl TranslationRecord {
    /// Record with the given key and every language empty
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            english: String::new(),
            arabic: String::new(),
            chinese_simplified: String::new(),
            chinese_traditional: String::new(),
            french: String::new(),
            german: String::new(),
            hindi: String::new(),
            indonesian: String::new(),
            italian: String::new(),
            japanese: String::new(),
            korean: String::new(),
            malay: String::new(),
            persian: String::new(),
            polish: String::new(),
            portuguese: String::new(),
            russian: String::new(),
            spanish: String::new(),
            thai: String::new(),
            turkish: String::new(),
            ukrainian: String::new(),
            vietnamese: String::new(),
        }
    }

    fn slot_mut(&mut self, language: Language) -> &mut String {
        match language {
            Language::English => &mut self.english,
            Language::Arabic => &mut self.arabic,
            Language::ChineseSimplified => &mut self.chinese_simplified,
            Language::ChineseTraditional => &mut self.chinese_traditional,
            Language::French => &mut self.french,
            Language::German => &mut self.german,
            Language::Hindi => &mut self.hindi,
            Language::Indonesian => &mut self.indonesian,
            Language::Italian => &mut self.italian,
            Language::Japanese => &mut self.japanese,
            Language::Korean => &mut self.korean,
            Language::Malay => &mut self.malay,
            Language::Persian => &mut self.persian,
            Language::Polish => &mut self.polish,
            Language::Portuguese => &mut self.portuguese,
            Language::Russian => &mut self.russian,
            Language::Spanish => &mut self.spanish,
            Language::Thai => &mut self.thai,
            Language::Turkish => &mut self.turkish,
            Language::Ukrainian => &mut self.ukrainian,
            Language::Vietnamese => &mut self.vietnamese,
        }
    }

    /// Text for one language
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::Arabic => &self.arabic,
            Language::ChineseSimplified => &self.chinese_simplified,
            Language::ChineseTraditional => &self.chinese_traditional,
            Language::French => &self.french,
            Language::German => &self.german,
            Language::Hindi => &self.hindi,
            Language::Indonesian => &self.indonesian,
            Language::Italian => &self.italian,
            Language::Japanese => &self.japanese,
            Language::Korean => &self.korean,
            Language::Malay => &self.malay,
            Language::Persian => &self.persian,
            Language::Polish => &self.polish,
            Language::Portuguese => &self.portuguese,
            Language::Russian => &self.russian,
            Language::Spanish => &self.spanish,
            Language::Thai => &self.thai,
            Language::Turkish => &self.turkish,
            Language::Ukrainian => &self.ukrainian,
            Language::Vietnamese => &self.vietnamese,
        }
    }

    pub fn set(&mut self, language: Language, value: impl Into<String>) {
        *self.slot_mut(language) = value.into();
    }

    /// Builder-style variant of [`set`](Self::set)
    pub fn with(mut self, language: Language, value: impl Into<String>) -> Self {
        self.set(language, value);
        self
    }

    /// `(language, text)` pairs in canonical order
    pub fn translations(&self) -> impl Iterator<Item = (Language, &str)> + '_ {
        Language::ALL.into_iter().map(move |lang| (lang, self.get(lang)))
    }

    /// Source-language echo
    pub fn source_text(&self) -> &str {
        self.get(Language::SOURCE)
    }

    /// Whether `key` follows the lowercase snake_case convention
    pub fn has_conventional_key(&self) -> bool {
        static SNAKE_CASE: OnceLock<Regex> = OnceLock::new();
        SNAKE_CASE
            .get_or_init(|| {
                Regex::new(r"^[a-z0-9]+(_[a-z0-9]+)*$").expect("snake_case pattern is valid")
            })
            .is_match(&self.key)
    }
}

/// Ordered, non-blank source strings submitted in one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBatch {
    items: Vec<String>,
}

impl RequestBatch {
    /// Drop whitespace-only entries, keeping order and the entries verbatim
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items
            .into_iter()
            .map(Into::into)
            .filter(|item: &String| !item.trim().is_empty())
            .collect();
        Self { items }
    }

    /// Reject batches larger than [`MAX_BATCH_ITEMS`]
    pub fn validate(&self) -> Result<()> {
        if self.items.len() > MAX_BATCH_ITEMS {
            return Err(TranslationError::InvalidInput {
                message: format!(
                    "at most {} items can be translated at once, got {}",
                    MAX_BATCH_ITEMS,
                    self.items.len()
                ),
            });
        }
        Ok(())
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One structured-completion request sent upstream
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: String,
    pub response_schema: serde_json::Value,
}
