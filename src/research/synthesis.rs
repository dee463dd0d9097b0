// Synthesis producer
//
// The only model call that degrades instead of failing the run: on error the
// synthesis text becomes a placeholder carrying the error message.

use super::prompts::build_synthesis_prompt;
use crate::llm::ModelClient;
use crate::models::Interview;

/// Placeholder synthesis used when the model call fails
pub fn synthesis_failure_text(error: &str) -> String {
    format!(
        "Error during synthesis: {}\n\nRaw interview data available for manual analysis.",
        error
    )
}

pub fn synthesize(
    client: &dyn ModelClient,
    research_question: &str,
    target_demographic: &str,
    interviews: &[Interview],
) -> String {
    let prompt = build_synthesis_prompt(research_question, target_demographic, interviews);

    match client.complete(&prompt) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            log::error!("[synthesis] Model call failed: {}", e);
            synthesis_failure_text(&e.to_string())
        }
    }
}
