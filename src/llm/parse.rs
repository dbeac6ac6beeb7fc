use std::collections::HashMap;

use serde_json::Value;

use crate::core::ForgeError;

/// The one template with a placeholder field that models routinely get wrong.
pub const SUGGEST_TEMPLATE: &str = "THPTQG form";

/// Drop a surrounding markdown code fence (``` or ```json) if present.
pub fn strip_code_fences(content: &str) -> &str {
    let mut text = content.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        text = match rest.find("```") {
            Some(end) => &rest[..end],
            None => rest,
        };
    } else if let Some(end) = text.rfind("```") {
        text = &text[..end];
    }

    text.trim()
}

/// Parse an LLM reply into a field map. The reply must be a JSON object;
/// non-string values are coerced to their JSON representation.
pub fn parse_field_map(content: &str) -> Result<HashMap<String, String>, ForgeError> {
    let stripped = strip_code_fences(content);
    let value: Value = serde_json::from_str(stripped)?;

    let object = match value {
        Value::Object(object) => object,
        other => return Err(ForgeError::MalformedLlmReply(other.to_string())),
    };

    Ok(object
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, text)
        })
        .collect())
}

/// Post-generation fixup for the suggest template: the Word field must echo
/// the input, and the suggest pattern's non-space length must match the
/// word's length. A broken pattern is replaced with first char, interior
/// underscores, last char (two characters or fewer: the word itself).
pub fn repair_note_fields(fields: &mut HashMap<String, String>, word: &str, model_name: &str) {
    if model_name != SUGGEST_TEMPLATE || !fields.contains_key("suggest") {
        return;
    }

    if let Some(value) = fields.get_mut("Word") {
        if value != word {
            *value = word.to_string();
        }
    }

    let word_len = word.chars().count();
    if let Some(pattern) = fields.get_mut("suggest") {
        let visible = pattern.chars().filter(|&c| c != ' ').count();
        if visible != word_len {
            *pattern = suggest_pattern(word);
        }
    }
}

fn suggest_pattern(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= 2 {
        return word.to_string();
    }

    let mut pattern = String::with_capacity(word.len());
    pattern.push(chars[0]);
    for _ in 0..chars.len() - 2 {
        pattern.push('_');
    }
    pattern.push(chars[chars.len() - 1]);
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_parses() {
        let fields = parse_field_map(r#"{"Front": "hola", "Back": "hello"}"#).unwrap();
        assert_eq!(fields["Front"], "hola");
        assert_eq!(fields["Back"], "hello");
    }

    #[test]
    fn fenced_json_parses() {
        let fields = parse_field_map("```json\n{\"Front\": \"hola\"}\n```").unwrap();
        assert_eq!(fields["Front"], "hola");
    }

    #[test]
    fn bare_fence_parses() {
        let fields = parse_field_map("```\n{\"Front\": \"hola\"}\n```").unwrap();
        assert_eq!(fields["Front"], "hola");
    }

    #[test]
    fn non_string_values_are_coerced() {
        let fields = parse_field_map(r#"{"Front": "hola", "Order": 3}"#).unwrap();
        assert_eq!(fields["Order"], "3");
    }

    #[test]
    fn array_reply_is_a_typed_error() {
        let err = parse_field_map(r#"["Front", "Back"]"#).unwrap_err();
        assert!(matches!(err, ForgeError::MalformedLlmReply(_)));
    }

    #[test]
    fn garbage_reply_is_a_json_error() {
        assert!(parse_field_map("not json at all").is_err());
    }

    fn suggest_fields(word: &str, suggest: &str) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        fields.insert("Word".to_string(), word.to_string());
        fields.insert("suggest".to_string(), suggest.to_string());
        fields
    }

    #[test]
    fn matching_pattern_is_left_alone() {
        let mut fields = suggest_fields("apple", "a_p_e");
        repair_note_fields(&mut fields, "apple", SUGGEST_TEMPLATE);
        assert_eq!(fields["suggest"], "a_p_e");
    }

    #[test]
    fn spaces_do_not_count_toward_pattern_length() {
        let mut fields = suggest_fields("apple", "a _ p _ e");
        repair_note_fields(&mut fields, "apple", SUGGEST_TEMPLATE);
        assert_eq!(fields["suggest"], "a _ p _ e");
    }

    #[test]
    fn broken_pattern_is_rebuilt_from_first_and_last_chars() {
        let mut fields = suggest_fields("apple", "a__e");
        repair_note_fields(&mut fields, "apple", SUGGEST_TEMPLATE);
        assert_eq!(fields["suggest"], "a___e");
    }

    #[test]
    fn repaired_pattern_length_always_equals_word_length() {
        for word in ["a", "of", "cat", "banana", "extraordinary"] {
            let mut fields = suggest_fields(word, "totally wrong");
            repair_note_fields(&mut fields, word, SUGGEST_TEMPLATE);
            assert_eq!(fields["suggest"].chars().count(), word.chars().count(), "word: {word}");
        }
    }

    #[test]
    fn drifted_word_field_is_forced_back() {
        let mut fields = suggest_fields("apple", "a___e");
        fields.insert("Word".to_string(), "apples".to_string());
        repair_note_fields(&mut fields, "apple", SUGGEST_TEMPLATE);
        assert_eq!(fields["Word"], "apple");
    }

    #[test]
    fn other_templates_are_untouched() {
        let mut fields = suggest_fields("apple", "zzz");
        repair_note_fields(&mut fields, "apple", "Basic");
        assert_eq!(fields["suggest"], "zzz");
    }
}
