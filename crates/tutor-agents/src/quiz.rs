//! Decoding of structured quiz output from the generation service.
//!
//! The service is asked for bare JSON but routinely wraps it in a markdown
//! code fence or leads with prose, so decoding starts with an explicit
//! sanitization step. A decode failure yields one well-formed placeholder
//! record instead of an error.

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: String,
}

/// Strips one incidental markdown code fence (with or without a language
/// tag) plus any prose outside it. Text without a fence is returned
/// trimmed.
fn strip_code_fence(raw: &str) -> &str {
    let Some(start) = raw.find("```") else {
        return raw.trim();
    };
    let after = &raw[start + 3..];
    let body = match after.find('\n') {
        Some(i) => &after[i + 1..],
        // Single-line fence: drop a leading language tag if present.
        None => after.trim_start_matches("json"),
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Decodes the service output into quiz records. Never fails: malformed
/// output is replaced by a single placeholder record telling the student
/// to retry.
pub fn parse_quiz(raw: &str) -> Vec<QuizQuestion> {
    let cleaned = strip_code_fence(raw);
    match serde_json::from_str::<Vec<QuizQuestion>>(cleaned) {
        Ok(questions) => questions,
        Err(e) => {
            warn!(error = %e, "quiz output did not decode; substituting placeholder");
            vec![placeholder_question()]
        }
    }
}

fn placeholder_question() -> QuizQuestion {
    QuizQuestion {
        question: "The quiz could not be generated from the model output.".to_string(),
        options: vec![
            "A. Ask for the quiz again".to_string(),
            "B. Rephrase the topic".to_string(),
            "C. Ask for an explanation instead".to_string(),
            "D. Check the study material is ingested".to_string(),
        ],
        answer: "A".to_string(),
        explanation: "The generation service returned output that could not be decoded as a quiz."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_quiz, QuizQuestion};

    const BARE: &str = r#"[{"question":"What forms when magnesium burns?","options":["A. Ash","B. Oxide","C. Gas","D. Nothing"],"answer":"B","explanation":"Magnesium oxide forms."}]"#;

    fn expected() -> Vec<QuizQuestion> {
        vec![QuizQuestion {
            question: "What forms when magnesium burns?".to_string(),
            options: vec![
                "A. Ash".to_string(),
                "B. Oxide".to_string(),
                "C. Gas".to_string(),
                "D. Nothing".to_string(),
            ],
            answer: "B".to_string(),
            explanation: "Magnesium oxide forms.".to_string(),
        }]
    }

    #[test]
    fn bare_json_decodes() {
        assert_eq!(parse_quiz(BARE), expected());
    }

    #[test]
    fn fenced_json_with_prose_decodes_the_same() {
        let fenced = format!("Sure! ```json\n{}\n```", BARE);
        assert_eq!(parse_quiz(&fenced), expected());
    }

    #[test]
    fn fence_without_language_tag_decodes() {
        let fenced = format!("```\n{}\n```", BARE);
        assert_eq!(parse_quiz(&fenced), expected());
    }

    #[test]
    fn unterminated_fence_still_decodes() {
        let fenced = format!("```json\n{}", BARE);
        assert_eq!(parse_quiz(&fenced), expected());
    }

    #[test]
    fn malformed_output_becomes_one_placeholder() {
        let got = parse_quiz("I'd rather chat about the weather.");
        assert_eq!(got.len(), 1);
        assert!(got[0].question.contains("could not be generated"));
        assert_eq!(got[0].options.len(), 4);
    }

    #[test]
    fn truncated_json_becomes_one_placeholder() {
        let got = parse_quiz(r#"[{"question": "Half a"#);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].answer, "A");
    }
}
