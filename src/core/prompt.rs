//! Prompt and system instruction text

use crate::core::language::Language;

/// Role framing sent as the system instruction
pub const SYSTEM_INSTRUCTION: &str = "You are a specialized multi-lingual translation engine designed to export data \
for i18n/localization. Your translations must be accurate, culturally sensitive, and formatted perfectly as a \
JSON list. Treat each element in the input list as a separate translation task.";

/// Build the user prompt for a batch of Korean items
pub fn build_prompt(items: &[String]) -> String {
    // Vec<String> always serializes
    let items_json = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());
    let languages = Language::ALL
        .iter()
        .map(|lang| lang.display_name())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Translate the following list of Korean text items into the specified languages and generate a snake_case key for each.

Input Items: {items_json}

Target Languages: {languages}

Requirements:
1. Output a JSON list where each object corresponds to exactly one input item, in the same order.
2. Generate a \"key\" field: A concise, meaningful snake_case identifier based on the English translation (e.g. \"hello_world\").
3. The \"Korean\" field in the output must match the input item exactly.
4. Act as a professional native translator for each language.
5. Preserve the cultural context, nuance, and tone of the original Korean text.
6. Return ONLY the JSON data.
"
    )
}
