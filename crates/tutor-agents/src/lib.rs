//! Interfaces to the external text-generation service: intent routing,
//! quiz output decoding and the completion capability itself. The service
//! is opaque; everything here treats it as `prompt in, text out`.

pub mod generate;
pub mod intent;
pub mod prompts;
pub mod quiz;

pub use generate::{OfflineGenerator, TextGenerator};
pub use intent::{classify_intent, Intent};
pub use quiz::{parse_quiz, QuizQuestion};
