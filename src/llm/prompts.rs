use std::fmt::Write;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that creates educational flashcards. Return only valid JSON.";

/// Assemble the generation prompt for one word/phrase. Field-specific
/// guidance is keyed off the template's declared fields: Front/Back gets
/// Basic-card guidance, Text gets cloze-deletion guidance.
pub fn build_prompt(
    word: &str,
    model_name: &str,
    field_names: &[String],
    language: &str,
    instructions: Option<&str>,
    additional_context: Option<&str>,
) -> String {
    let mut prompt = format!(
        "Generate flashcard content for the word/phrase: \"{}\"\n\
         Target language: {}\n\
         Anki Model: {}\n\
         Required fields: {}\n\n\
         CRITICAL: ALL content (meanings, definitions, examples, explanations) MUST be written in {}.\n\
         Do NOT mix languages. If the word is in English but target language is Vietnamese, write meanings in Vietnamese.\n\n",
        word,
        language,
        model_name,
        field_names.join(", "),
        language.to_uppercase(),
    );

    if let Some(instructions) = instructions {
        let _ = write!(prompt, "Model-specific instructions: {}\n\n", instructions);
    }

    if let Some(context) = additional_context {
        let _ = write!(prompt, "Additional context: {}\n\n", context);
    }

    let has = |name: &str| field_names.iter().any(|f| f == name);
    if has("Front") && has("Back") {
        prompt.push_str(
            "For Basic cards, Front should contain the question/prompt, Back should contain the answer.\n",
        );
    } else if has("Text") {
        prompt.push_str(
            "For Cloze cards, use {{c1::text}} format to mark deletions. You can use multiple cloze deletions like {{c1::first}}, {{c2::second}}.\n",
        );
    }

    prompt.push_str(
        "\nReturn ONLY a JSON object with the field names as keys and content as values. No additional text or markdown formatting.",
    );

    prompt
}
