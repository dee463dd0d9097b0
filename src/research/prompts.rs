// Prompt templates for the research workflow

use crate::models::{Interview, Persona};

/// Question generation, filled with the requested count and research question
pub const QUESTION_GEN_PROMPT: &str = "Generate exactly {{num_questions}} interview questions about: {{research_question}}. Use the provided structured output to format the questions.";

/// Persona generation, filled with the requested count and demographic
pub const PERSONA_PROMPT: &str = r#"Generate exactly {{num_personas}} unique personas for an interview. Each should belong to the target demographic: {{demographic}}.

Each persona needs: name, age (a whole number), job, traits (3-4 short personality traits), communication_style, and background (one detail that shapes their perspective).

Respond only in JSON using this format: { "personas": [ ... ] }"#;

/// Persona-voiced answer to one interview question
pub const INTERVIEW_PROMPT: &str = r#"You are {{persona_name}}, a {{persona_age}}-year-old {{persona_job}} who is {{persona_traits}}.
Your communication style: {{communication_style}}
Background: {{background}}

Answer the following question in 2-3 sentences:

Question: {{question}}

Answer as {{persona_name}} in your own authentic voice. Be brief but creative and unique, and make each answer conversational.
BE REALISTIC - do not be overly optimistic. Mimic real human behavior based on your persona, and give honest answers."#;

/// Follow-up question derived from a persona's last answer
pub const FOLLOWUP_QUESTION_PROMPT: &str = r#"Generate ONE natural follow-up question for {{persona_name}} based on their last answer:
"{{previous_answer}}"
Keep it conversational and dig a bit deeper. Respond with the question only."#;

/// Persona-voiced answer to the follow-up question
pub const FOLLOWUP_ANSWER_PROMPT: &str = r#"You are {{persona_name}}, a {{persona_age}}-year-old {{persona_job}} who is {{persona_traits}}.
Your communication style: {{communication_style}}

Answer the follow-up question below in 2-4 sentences, staying authentic and specific.

Follow-up question: {{followup_question}}

Answer as {{persona_name}}:"#;

/// Cross-interview analysis with four fixed sections
pub const SYNTHESIS_PROMPT: &str = r#"Analyze these {{num_interviews}} user interviews about "{{research_question}}" among {{target_demographic}} and provide a concise yet comprehensive analysis:

1. KEY THEMES: What patterns and common themes emerged across all interviews? Look for similarities in responses, shared concerns, and recurring topics.

2. DIVERSE PERSPECTIVES: What different viewpoints or unique insights did different personas provide? Highlight contrasting opinions or approaches.

3. PAIN POINTS & OPPORTUNITIES: What challenges, frustrations, or unmet needs were identified? What opportunities for improvement emerged?

4. ACTIONABLE RECOMMENDATIONS: Based on these insights, what specific actions should be taken? Provide concrete, implementable suggestions.

Keep the analysis thorough but well-organized and actionable.

Interview Data:
{{interview_summary}}"#;

fn fill_persona(template: &str, persona: &Persona) -> String {
    template
        .replace("{{persona_name}}", &persona.name)
        .replace("{{persona_age}}", &persona.age.to_string())
        .replace("{{persona_job}}", &persona.job)
        .replace("{{persona_traits}}", &persona.traits_display())
        .replace("{{communication_style}}", &persona.communication_style)
        .replace("{{background}}", &persona.background)
}

pub fn build_question_prompt(num_questions: u32, research_question: &str) -> String {
    QUESTION_GEN_PROMPT
        .replace("{{num_questions}}", &num_questions.to_string())
        .replace("{{research_question}}", research_question)
}

pub fn build_persona_prompt(num_personas: u32, demographic: &str) -> String {
    PERSONA_PROMPT
        .replace("{{num_personas}}", &num_personas.to_string())
        .replace("{{demographic}}", demographic)
}

pub fn build_interview_prompt(persona: &Persona, question: &str) -> String {
    fill_persona(INTERVIEW_PROMPT, persona).replace("{{question}}", question)
}

pub fn build_followup_question_prompt(persona: &Persona, previous_answer: &str) -> String {
    FOLLOWUP_QUESTION_PROMPT
        .replace("{{persona_name}}", &persona.name)
        .replace("{{previous_answer}}", previous_answer)
}

pub fn build_followup_answer_prompt(persona: &Persona, followup_question: &str) -> String {
    fill_persona(FOLLOWUP_ANSWER_PROMPT, persona)
        .replace("{{followup_question}}", followup_question)
}

/// Render every transcript as plain text for the synthesis prompt
pub fn build_interview_summary(
    research_question: &str,
    target_demographic: &str,
    interviews: &[Interview],
) -> String {
    let mut summary = format!(
        "Research Question: {}\nTarget Demographic: {}\nNumber of Interviews: {}\n\n",
        research_question,
        target_demographic,
        interviews.len()
    );

    for (i, interview) in interviews.iter().enumerate() {
        let p = &interview.persona;
        summary.push_str(&format!(
            "Interview {} - {} ({}, {}):\n",
            i + 1,
            p.name,
            p.age,
            p.job
        ));
        summary.push_str(&format!("Persona Traits: {}\n", p.traits_display()));
        for (j, entry) in interview.responses.iter().enumerate() {
            summary.push_str(&format!("Q{}: {}\n", j + 1, entry.question));
            summary.push_str(&format!("A{}: {}\n", j + 1, entry.answer));
        }
        summary.push('\n');
    }

    summary
}

pub fn build_synthesis_prompt(
    research_question: &str,
    target_demographic: &str,
    interviews: &[Interview],
) -> String {
    let summary = build_interview_summary(research_question, target_demographic, interviews);

    SYNTHESIS_PROMPT
        .replace("{{num_interviews}}", &interviews.len().to_string())
        .replace("{{research_question}}", research_question)
        .replace("{{target_demographic}}", target_demographic)
        .replace("{{interview_summary}}", &summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TranscriptEntry;

    fn persona() -> Persona {
        Persona {
            name: "Maya Chen".to_string(),
            age: 34,
            job: "Backend Engineer".to_string(),
            traits: vec!["pragmatic".to_string(), "skeptical".to_string()],
            communication_style: "blunt".to_string(),
            background: "Maintains a legacy payments system".to_string(),
        }
    }

    #[test]
    fn test_build_question_prompt() {
        let prompt = build_question_prompt(3, "AI assistants");
        assert!(prompt.contains("exactly 3 interview questions"));
        assert!(prompt.contains("AI assistants"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_build_persona_prompt() {
        let prompt = build_persona_prompt(5, "developers");
        assert!(prompt.contains("exactly 5 unique personas"));
        assert!(prompt.contains("target demographic: developers"));
    }

    #[test]
    fn test_build_interview_prompt_embeds_persona() {
        let prompt = build_interview_prompt(&persona(), "How do you debug?");
        assert!(prompt.contains("You are Maya Chen, a 34-year-old Backend Engineer"));
        assert!(prompt.contains("pragmatic, skeptical"));
        assert!(prompt.contains("blunt"));
        assert!(prompt.contains("legacy payments"));
        assert!(prompt.contains("Question: How do you debug?"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_build_followup_prompts() {
        let q = build_followup_question_prompt(&persona(), "I use print statements.");
        assert!(q.contains("for Maya Chen"));
        assert!(q.contains("\"I use print statements.\""));

        let a = build_followup_answer_prompt(&persona(), "Why not a debugger?");
        assert!(a.contains("Follow-up question: Why not a debugger?"));
        assert!(!a.contains("{{"));
    }

    #[test]
    fn test_build_interview_summary_format() {
        let interviews = vec![Interview {
            persona: persona(),
            responses: vec![
                TranscriptEntry::new("Q one?", "A one."),
                TranscriptEntry::new("Q two?", "A two."),
            ],
        }];

        let summary = build_interview_summary("debugging", "developers", &interviews);
        assert!(summary.starts_with("Research Question: debugging\n"));
        assert!(summary.contains("Number of Interviews: 1"));
        assert!(summary.contains("Interview 1 - Maya Chen (34, Backend Engineer):\n"));
        assert!(summary.contains("Persona Traits: pragmatic, skeptical\n"));
        assert!(summary.contains("Q2: Q two?\nA2: A two.\n"));
    }

    #[test]
    fn test_build_synthesis_prompt_sections() {
        let prompt = build_synthesis_prompt("debugging", "developers", &[]);
        assert!(prompt.contains("Analyze these 0 user interviews about \"debugging\""));
        for section in [
            "KEY THEMES",
            "DIVERSE PERSPECTIVES",
            "PAIN POINTS & OPPORTUNITIES",
            "ACTIONABLE RECOMMENDATIONS",
        ] {
            assert!(prompt.contains(section));
        }
    }
}
