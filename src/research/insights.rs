//! Insight extraction from free-text synthesis
//!
//! The synthesis is scanned line by line. Heading lines are recognized by an
//! ordered synonym table and switch the active bucket; the content lines that
//! follow are cleaned of markdown and accumulated. When a bucket closes, its
//! first two lines become that field's text, unless an earlier section already
//! filled it.

use crate::models::InsightSummary;
use regex::Regex;
use std::sync::OnceLock;

/// Output field a heading routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightBucket {
    KeyInsights,
    Observations,
    Takeaways,
}

/// Heading synonyms in priority order; the first matching group wins.
///
/// Pain points and opportunities belong to observations so they are never
/// counted twice.
pub const HEADING_SYNONYMS: &[(InsightBucket, &[&str])] = &[
    (
        InsightBucket::KeyInsights,
        &[
            "key themes",
            "key insights",
            "insight summary",
            "main themes",
            "common themes",
            "key findings",
        ],
    ),
    (
        InsightBucket::Observations,
        &[
            "diverse perspectives",
            "observations",
            "pain points",
            "opportunities",
            "contrasting perspectives",
            "perspectives",
        ],
    ),
    (
        InsightBucket::Takeaways,
        &[
            "actionable recommendations",
            "takeaways",
            "recommendations",
            "next steps",
        ],
    ),
];

/// Lines kept per bucket
const MAX_LINES_PER_BUCKET: usize = 2;

const DEFAULT_OBSERVATIONS: &str = "Multiple perspectives gathered from diverse participants";
const DEFAULT_TAKEAWAYS: &str = "Further analysis recommended based on initial findings";
const FALLBACK_OBSERVATIONS: &str =
    "Participants showed varied perspectives based on their backgrounds and experiences.";
const FALLBACK_TAKEAWAYS: &str =
    "Consider implementing changes based on user feedback and identified patterns.";

static NUMBERED_PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_numbered_prefix_regex() -> &'static Regex {
    NUMBERED_PREFIX_REGEX.get_or_init(|| Regex::new(r"^\d+[.)]\s+").unwrap())
}

static EMPHASIS_REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();

/// Paired emphasis spans, strongest marker first. Markers must sit at word
/// edges, so `snake_case`, `2*3*4` and `__init__` are left alone.
fn get_emphasis_regexes() -> &'static [Regex] {
    EMPHASIS_REGEXES.get_or_init(|| {
        [
            r"(?P<pre>^|[^\w*])\*\*(?P<inner>[^*\s](?:[^*]*[^*\s])?)\*\*(?P<post>[^\w*]|$)",
            r"(?P<pre>^|[^\w_])__(?P<inner>[^_\s][^_]*\s[^_]*[^_\s])__(?P<post>[^\w_]|$)",
            r"(?P<pre>^|[^\w*])\*(?P<inner>[^*\s](?:[^*]*[^*\s])?)\*(?P<post>[^\w*]|$)",
            r"(?P<pre>^|[^\w_])_(?P<inner>[^_\s](?:[^_]*[^_\s])?)_(?P<post>[^\w_]|$)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
    })
}

/// Remove `**bold**`, `__bold text__`, `*italic*` and `_italic_` markers
fn strip_emphasis(text: &str) -> String {
    let mut out = text.to_string();
    for regex in get_emphasis_regexes() {
        // Boundary characters are consumed, so adjacent spans need a second pass
        for _ in 0..2 {
            out = regex
                .replace_all(&out, "${pre}${inner}${post}")
                .into_owned();
        }
    }
    out
}

/// Bucket for a heading line, if the line is one
pub fn detect_heading(line: &str) -> Option<InsightBucket> {
    let lower = line.to_lowercase();
    HEADING_SYNONYMS
        .iter()
        .find(|(_, synonyms)| synonyms.iter().any(|s| lower.contains(s)))
        .map(|(bucket, _)| *bucket)
}

/// Strip list markers, markdown emphasis and repeated trailing punctuation
pub fn clean_content_line(line: &str) -> String {
    let mut text = line.trim().trim_start_matches('#').trim_start();

    for bullet in ['-', '*', '•'] {
        if let Some(rest) = text.strip_prefix(bullet) {
            if rest.starts_with(char::is_whitespace) {
                text = rest.trim_start();
                break;
            }
        }
    }

    if let Some(m) = get_numbered_prefix_regex().find(text) {
        text = &text[m.end()..];
    }

    let mut cleaned = strip_emphasis(text)
        .trim_matches('*')
        .trim()
        .to_string();

    while let Some(last) = cleaned.chars().last() {
        if !matches!(last, '.' | '!' | '?') {
            break;
        }
        let without_last = &cleaned[..cleaned.len() - last.len_utf8()];
        if without_last.ends_with(last) {
            cleaned.truncate(without_last.len());
        } else {
            break;
        }
    }

    cleaned
}

/// Join the first lines of a closed bucket into one sentence-terminated string
fn commit_text(lines: &[String]) -> Option<String> {
    let pieces: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .take(MAX_LINES_PER_BUCKET)
        .map(|l| l.trim_end_matches(['.', '!', '?']).trim_end())
        .filter(|l| !l.is_empty())
        .collect();

    if pieces.is_empty() {
        return None;
    }

    Some(format!("{}.", pieces.join(". ")))
}

fn field_mut(summary: &mut InsightSummary, bucket: InsightBucket) -> &mut String {
    match bucket {
        InsightBucket::KeyInsights => &mut summary.key_insights,
        InsightBucket::Observations => &mut summary.observations,
        InsightBucket::Takeaways => &mut summary.takeaways,
    }
}

/// Assign a closed bucket's text; the first commit for a field wins
fn commit(summary: &mut InsightSummary, bucket: Option<InsightBucket>, lines: &mut Vec<String>) {
    if let Some(bucket) = bucket {
        let field = field_mut(summary, bucket);
        if field.is_empty() {
            if let Some(text) = commit_text(lines) {
                *field = text;
            }
        }
    }
    lines.clear();
}

/// Categorize a synthesis into key insights, observations and takeaways.
///
/// Deterministic, and every field of the result is non-empty.
pub fn extract_insights(synthesis_text: &str, research_question: &str) -> InsightSummary {
    if synthesis_text.trim().is_empty() {
        return InsightSummary {
            key_insights: format!("Analysis completed for: {}", research_question),
            observations: DEFAULT_OBSERVATIONS.to_string(),
            takeaways: DEFAULT_TAKEAWAYS.to_string(),
        };
    }

    let mut summary = InsightSummary::default();
    let mut current: Option<InsightBucket> = None;
    let mut lines: Vec<String> = Vec::new();

    for raw_line in synthesis_text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(bucket) = detect_heading(line) {
            commit(&mut summary, current, &mut lines);
            current = Some(bucket);

            if let Some((_, after)) = line.split_once(':') {
                let content = clean_content_line(after);
                if !content.is_empty() {
                    lines.push(content);
                }
            }
        } else if current.is_some() {
            let content = clean_content_line(line);
            if !content.is_empty() {
                lines.push(content);
            }
        }
    }
    commit(&mut summary, current, &mut lines);

    if summary.key_insights.is_empty() {
        let first_sentence = synthesis_text.split('.').next().unwrap_or_default().trim();
        summary.key_insights = if first_sentence.is_empty() {
            format!("Research completed on {}", research_question)
        } else {
            format!("{}.", first_sentence)
        };
    }
    if summary.observations.is_empty() {
        summary.observations = FALLBACK_OBSERVATIONS.to_string();
    }
    if summary.takeaways.is_empty() {
        summary.takeaways = FALLBACK_TAKEAWAYS.to_string();
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_headings() {
        let text = "KEY THEMES: Users like speed.\nDIVERSE PERSPECTIVES: Some worry about cost.\nACTIONABLE RECOMMENDATIONS: Lower the price.";
        let summary = extract_insights(text, "pricing");

        assert!(summary.key_insights.contains("Users like speed."));
        assert!(summary.observations.contains("Some worry about cost."));
        assert!(summary.takeaways.contains("Lower the price."));
    }

    #[test]
    fn test_empty_synthesis_defaults() {
        let summary = extract_insights("", "pricing");
        assert_eq!(summary.key_insights, "Analysis completed for: pricing");
        assert_eq!(summary.observations, DEFAULT_OBSERVATIONS);
        assert_eq!(summary.takeaways, DEFAULT_TAKEAWAYS);

        assert_eq!(extract_insights("  \n ", "pricing"), summary);
    }

    #[test]
    fn test_pain_points_route_to_observations() {
        assert_eq!(
            detect_heading("3. PAIN POINTS & OPPORTUNITIES"),
            Some(InsightBucket::Observations)
        );
        // Matches both an observation and a takeaway synonym
        assert_eq!(
            detect_heading("Pain points and recommendations"),
            Some(InsightBucket::Observations)
        );

        let text = "PAIN POINTS: Setup is slow.\nNothing else.";
        let summary = extract_insights(text, "onboarding");
        assert_eq!(summary.observations, "Setup is slow. Nothing else.");
        assert_eq!(summary.takeaways, FALLBACK_TAKEAWAYS);
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(
            detect_heading("Key themes and perspectives"),
            Some(InsightBucket::KeyInsights)
        );
        assert_eq!(detect_heading("## Next Steps"), Some(InsightBucket::Takeaways));
        assert_eq!(detect_heading("Users want dark mode."), None);
    }

    #[test]
    fn test_first_commit_wins() {
        let text = "KEY THEMES: First theme.\nDIVERSE PERSPECTIVES: A view.\nKEY INSIGHTS: Later theme.";
        let summary = extract_insights(text, "q");
        assert_eq!(summary.key_insights, "First theme.");
        assert_eq!(summary.observations, "A view.");
    }

    #[test]
    fn test_markdown_sections_keep_two_lines() {
        let text = r#"### 1. **Key Themes**
- **Speed** matters most..
- Reliability is expected
- Price is secondary

### 2. Diverse Perspectives
1. Juniors want guidance!!
2) Seniors want control

### 4. Actionable Recommendations
* Ship a faster CLI"#;
        let summary = extract_insights(text, "tools");

        assert_eq!(summary.key_insights, "Speed matters most. Reliability is expected.");
        assert_eq!(summary.observations, "Juniors want guidance. Seniors want control.");
        assert_eq!(summary.takeaways, "Ship a faster CLI.");
    }

    #[test]
    fn test_clean_content_line() {
        assert_eq!(clean_content_line("- item"), "item");
        assert_eq!(clean_content_line("• item"), "item");
        assert_eq!(clean_content_line("12. item"), "item");
        assert_eq!(clean_content_line("3) item"), "item");
        assert_eq!(clean_content_line("**bold** text"), "bold text");
        assert_eq!(clean_content_line("*italic*"), "italic");
        assert_eq!(clean_content_line("Really??"), "Really?");
        assert_eq!(clean_content_line("Done..."), "Done.");
        assert_eq!(clean_content_line("2024 was busy"), "2024 was busy");
    }

    #[test]
    fn test_inline_emphasis_is_stripped() {
        assert_eq!(
            clean_content_line("Users *really* like _speed_ a lot"),
            "Users really like speed a lot"
        );
        assert_eq!(clean_content_line("*fast* *cheap* *good*"), "fast cheap good");
        assert_eq!(
            clean_content_line("__very clear__ and **bold**, (_quoted_)"),
            "very clear and bold, (quoted)"
        );

        let summary = extract_insights("KEY THEMES:\n- Users *really* like _speed_ a lot", "q");
        assert_eq!(summary.key_insights, "Users really like speed a lot.");
    }

    #[test]
    fn test_identifiers_keep_underscores() {
        assert_eq!(
            clean_content_line("Set max_tokens in config_file"),
            "Set max_tokens in config_file"
        );
        assert_eq!(clean_content_line("__init__ runs first"), "__init__ runs first");
        assert_eq!(clean_content_line("_private stays"), "_private stays");
        assert_eq!(clean_content_line("2*3*4 is math"), "2*3*4 is math");
    }

    #[test]
    fn test_committed_text_always_ends_with_period() {
        let summary = extract_insights("KEY THEMES: Is it fast??", "q");
        assert_eq!(summary.key_insights, "Is it fast.");

        let summary = extract_insights("TAKEAWAYS:\n- Ship it!\n- Then measure?", "q");
        assert_eq!(summary.takeaways, "Ship it. Then measure.");
    }

    #[test]
    fn test_key_insights_fallback_to_first_sentence() {
        let summary = extract_insights("Overall people were happy. More detail here.", "q");
        assert_eq!(summary.key_insights, "Overall people were happy.");
        assert_eq!(summary.observations, FALLBACK_OBSERVATIONS);
        assert_eq!(summary.takeaways, FALLBACK_TAKEAWAYS);
    }

    #[test]
    fn test_deterministic() {
        let text = "Key findings:\n- One\n- Two\nTakeaways: Act now";
        assert_eq!(extract_insights(text, "q"), extract_insights(text, "q"));
    }

    #[test]
    fn test_empty_section_falls_back_to_raw_text() {
        let summary = extract_insights("KEY THEMES:\n\nACTIONABLE RECOMMENDATIONS: Do it", "q");
        assert_eq!(summary.key_insights, "KEY THEMES:\n\nACTIONABLE RECOMMENDATIONS: Do it.");
        assert_eq!(summary.takeaways, "Do it.");
    }
}
