//! Prompts for turning transcript chunks into study notes.
//!
//! Every instruction the model sees is assembled here, so a prompt change is
//! an edit to exactly one file and unit tests can inspect the text without a
//! live LLM. The orchestrator only decides *which* pieces to combine for a
//! given part.
//!
//! An instruction block has five sections: the fixed academic rules, the
//! output language, the topic, the role the model plays and the kind of
//! document to produce. Role and output kind are resolved from a custom
//! string first, then a preset key, then a built-in default.

/// Fixed rules prepended to every instruction block.
pub const BASE_RULES: &str = "You are an academic assistant. No pleasantries.
Your goal is to produce a document that is useful for studying.

RULES:
- Do not invent facts. If information is missing, state the uncertainty.
- Prioritise clarity and structure.
- Use well-formatted Markdown (headings, lists, tables where relevant).";

/// Role used when neither a custom role nor a known preset is given.
pub const DEFAULT_ROLE: &str = "You act as a technical, clear academic assistant.";

/// Output kind used when neither a custom format nor a known preset is given.
pub const DEFAULT_OUTPUT: &str = "Write detailed, structured notes without redundancy.";

/// Role presets: `(key, label, instruction)`.
pub const ROLE_PRESETS: &[(&str, &str, &str)] = &[
    (
        "data_scientist",
        "Data Scientist (DL)",
        "You act as a senior Data Scientist specialised in Deep Learning. You prioritise rigour and clarity.",
    ),
    (
        "philosophy_expert",
        "Philosophy (expert)",
        "You act as a philosophy expert, focusing on ethics and key philosophical theories.",
    ),
    (
        "history_professor",
        "History (professor)",
        "You act as a history professor, highlighting important historical events and contexts.",
    ),
    (
        "data_engineer",
        "Data Engineer",
        "You act as a data engineer, optimising data flows and ensuring data quality.",
    ),
    (
        "ai_engineer",
        "AI Engineer",
        "You act as an AI engineer, implementing artificial-intelligence models and solutions.",
    ),
];

/// Output-format presets: `(key, label, instruction)`.
pub const OUTPUT_PRESETS: &[(&str, &str, &str)] = &[
    (
        "detailed_notes",
        "Detailed notes",
        "Very detailed notes, with sections, definitions and clear bullet points.",
    ),
    (
        "summary",
        "Summary",
        "Concise summary of the main content, with key points and essential definitions.",
    ),
    (
        "concept_list",
        "Concept list",
        "List of the important concepts mentioned in the lesson, without explanations.",
    ),
    (
        "review_questions",
        "Review questions",
        "Review questions to assess understanding of the material covered in the lesson.",
    ),
];

/// Look up a preset instruction by key.
fn preset<'a>(presets: &'a [(&str, &str, &'a str)], key: &str) -> Option<&'a str> {
    presets
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, _, text)| *text)
}

/// Pick custom text, then a preset, then the fallback.
fn resolve<'a>(
    custom: Option<&'a str>,
    key: Option<&str>,
    presets: &'a [(&str, &str, &'a str)],
    fallback: &'a str,
) -> &'a str {
    custom
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| key.and_then(|k| preset(presets, k.trim())))
        .unwrap_or(fallback)
}

/// Role text for the given custom description / preset key.
pub fn role_text<'a>(custom: Option<&'a str>, key: Option<&str>) -> &'a str {
    resolve(custom, key, ROLE_PRESETS, DEFAULT_ROLE)
}

/// Output-format text for the given custom description / preset key.
pub fn output_text<'a>(custom: Option<&'a str>, key: Option<&str>) -> &'a str {
    resolve(custom, key, OUTPUT_PRESETS, DEFAULT_OUTPUT)
}

/// Assemble the instruction block sent as the system message.
///
/// `role` and `output_format` are already-resolved texts (see
/// [`role_text`] / [`output_text`]).
pub fn build_instructions(language: &str, topic: &str, role: &str, output_format: &str) -> String {
    format!(
        "{BASE_RULES}\n\n\
         LANGUAGE: {language}\n\
         TOPIC/SUBJECT: {topic}\n\n\
         ROLE (context):\n{role}\n\n\
         OUTPUT TYPE (requirements):\n{output_format}"
    )
    .trim()
    .to_string()
}

/// Output-format text for part `part` of `total`.
///
/// The base format keeps its wording; the part directive is appended after a
/// blank line so each completion stays within its output budget and reads as
/// a self-contained section.
pub fn per_part_output(base_output: &str, part: usize, total: usize) -> String {
    let mut out = base_output.trim().to_string();
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!(
        "\nIMPORTANT: This is part {part}/{total}. \
         Keep the output short and structured (about 1–2 pages at most)."
    ));
    out
}

/// Wrap the transcript text into the user message.
pub fn user_message(text: &str) -> String {
    format!(
        "TEXT:\n\"\"\"{text}\"\"\"\n\n\
         INSTRUCTIONS:\n\
         - Produce the requested output in Markdown.\n\
         - Do not add greetings or closings."
    )
}

/// Heading that introduces part `part` of `total` in the assembled document.
pub fn part_heading(part: usize, total: usize) -> String {
    format!("## Part {part}/{total}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_role_overrides_preset() {
        assert_eq!(
            role_text(Some("  A demanding professor.  "), Some("data_engineer")),
            "A demanding professor."
        );
    }

    #[test]
    fn test_blank_custom_falls_back_to_preset() {
        assert!(role_text(Some("   "), Some("history_professor")).contains("history professor"));
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        assert_eq!(role_text(None, Some("astronaut")), DEFAULT_ROLE);
        assert_eq!(output_text(None, None), DEFAULT_OUTPUT);
    }

    #[test]
    fn test_instructions_contain_all_sections() {
        let s = build_instructions("es", "Ethics 101", "ROLE-X", "FORMAT-Y");
        assert!(s.starts_with("You are an academic assistant."));
        assert!(s.contains("LANGUAGE: es"));
        assert!(s.contains("TOPIC/SUBJECT: Ethics 101"));
        assert!(s.contains("ROLE (context):\nROLE-X"));
        assert!(s.ends_with("OUTPUT TYPE (requirements):\nFORMAT-Y"));
    }

    #[test]
    fn test_per_part_output_appends_directive() {
        let s = per_part_output("Concise summary.", 2, 5);
        assert!(s.starts_with("Concise summary.\n\nIMPORTANT: This is part 2/5."));
        assert!(s.contains("short and structured"));
    }

    #[test]
    fn test_per_part_output_without_base() {
        let s = per_part_output("  ", 1, 1);
        assert!(s.starts_with("\nIMPORTANT: This is part 1/1."));
    }

    #[test]
    fn test_user_message_wraps_text() {
        let s = user_message("hello");
        assert!(s.starts_with("TEXT:\n\"\"\"hello\"\"\""));
        assert!(s.contains("Do not add greetings"));
    }

    #[test]
    fn test_every_preset_key_resolves() {
        for (key, _, text) in ROLE_PRESETS {
            assert_eq!(role_text(None, Some(key)), *text);
        }
        for (key, _, text) in OUTPUT_PRESETS {
            assert_eq!(output_text(None, Some(key)), *text);
        }
    }
}
