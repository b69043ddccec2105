use tutor_core::error::Result;

use crate::generate::TextGenerator;
use crate::prompts;

/// What the student wants from this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Quiz,
    Explain,
    Chat,
}

impl Intent {
    /// Normalizes an unconstrained upstream response into an intent.
    ///
    /// The classifier service is asked for a single word but is not
    /// perfectly constrained ("Quiz ", "quiz!", "Sure: QUIZ"), so matching
    /// is by substring containment after trim + uppercase. Anything
    /// unrecognized is treated as a request for an explanation.
    pub fn from_response(raw: &str) -> Self {
        let normalized = raw.trim().to_uppercase();
        if normalized.contains("QUIZ") {
            Self::Quiz
        } else if normalized.contains("CHAT") {
            Self::Chat
        } else {
            Self::Explain
        }
    }
}

/// Classifies the query via the generation service with a constrained
/// prompt. Service failures propagate as transient errors.
pub fn classify_intent(generator: &dyn TextGenerator, query: &str) -> Result<Intent> {
    let raw = generator.complete(prompts::ROUTER_SYSTEM, "", query, &[])?;
    Ok(Intent::from_response(&raw))
}
