//! Joke prompt and candidate cleanup

use crate::provider::Part;

/// Persona sent ahead of every request
const SYSTEM_PROMPT: &str = "You are that sarcastic friend who always has the perfect witty comeback. \
Focus ONLY on what is happening in the CENTER of the screen: slides, meetings, documents, whatever is front and center. \
Ignore sidebars, menus and other interface chrome. \
Make ONE short, snappy comment like a friend would whisper during a meeting, under 15 words when possible. \
Reference something specific from the content. Be clever, not hateful. \
Return ONLY the joke as plain text: no bullet points, no quotes, no JSON, no commentary.";

/// Build the generation prompt for one attempt.
///
/// `attempt` is 1-based; retries nudge the model away from its last idea.
pub fn build_prompt(context: &str, attempt: u32) -> String {
    let context = context.trim();
    let mut prompt = if context.is_empty() {
        format!("{}\n\nContent: the attached screenshot or audio clip.", SYSTEM_PROMPT)
    } else {
        format!("{}\n\nContent:\n{}", SYSTEM_PROMPT, context)
    };
    if attempt > 1 {
        prompt.push_str(
            "\n\nYour previous jokes about this were already used. Take a completely different angle.",
        );
    }
    prompt
}

/// Request parts for one attempt: the prompt first, then any media
pub fn build_parts(context: &str, attempt: u32, media: &[Part]) -> Vec<Part> {
    let mut parts = Vec::with_capacity(media.len() + 1);
    parts.push(Part::Text(build_prompt(context, attempt)));
    parts.extend(media.iter().cloned());
    parts
}

/// Reduce raw model output to a single joke.
///
/// Strips Markdown code fences, bullet markers and wrapping quotes. When the
/// model returns several lines, the first non-empty one wins. Returns `None`
/// when nothing usable is left.
pub fn clean_candidate(raw: &str) -> Option<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("```"))
        .map(strip_bullet)
        .map(strip_quotes)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

fn strip_bullet(line: &str) -> &str {
    for marker in ['*', '-', '•'] {
        if let Some(rest) = line.strip_prefix(marker) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim();
            }
        }
    }
    line
}

fn strip_quotes(line: &str) -> &str {
    let pairs = [('"', '"'), ('\u{201c}', '\u{201d}'), ('\'', '\'')];
    for (open, close) in pairs {
        if line.chars().count() >= 2 && line.starts_with(open) && line.ends_with(close) {
            let inner = &line[open.len_utf8()..line.len() - close.len_utf8()];
            // `"Yes," she said, "no"` is two quotes, not one wrapped line
            if inner.contains(open) || inner.contains(close) {
                return line;
            }
            return inner.trim();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_context() {
        let prompt = build_prompt("  Q3 roadmap slide with 14 arrows  ", 1);
        assert!(prompt.contains("Content:\nQ3 roadmap slide with 14 arrows"));
        assert!(!prompt.contains("previous jokes"));
    }

    #[test]
    fn test_retry_prompt_asks_for_new_angle() {
        assert!(build_prompt("ctx", 2).contains("different angle"));
    }

    #[test]
    fn test_clean_plain_text() {
        assert_eq!(
            clean_candidate("  Oh great, another synergy slide.\n").as_deref(),
            Some("Oh great, another synergy slide.")
        );
        assert_eq!(
            clean_candidate("-5 degrees in this meeting room").as_deref(),
            Some("-5 degrees in this meeting room")
        );
    }

    #[test]
    fn test_clean_takes_first_bullet() {
        let raw = "* Someone's really excited about pie charts.\n* Slide 47, still no point.\n* Zoom fatigue: the musical.";
        assert_eq!(
            clean_candidate(raw).as_deref(),
            Some("Someone's really excited about pie charts.")
        );
    }

    #[test]
    fn test_clean_strips_fences_and_quotes() {
        let raw = "```\n\"Those arrows are going nowhere fast.\"\n```";
        assert_eq!(
            clean_candidate(raw).as_deref(),
            Some("Those arrows are going nowhere fast.")
        );
        assert_eq!(
            clean_candidate("\u{201c}Curly quotes too.\u{201d}").as_deref(),
            Some("Curly quotes too.")
        );
    }

    #[test]
    fn test_clean_keeps_inner_quotes() {
        let raw = "\"Yes,\" she said, \"no\"";
        assert_eq!(clean_candidate(raw).as_deref(), Some(raw));
        assert_eq!(
            clean_candidate("'It's fine, it's all fine'").as_deref(),
            Some("'It's fine, it's all fine'")
        );
        assert_eq!(
            clean_candidate("'Classic'").as_deref(),
            Some("Classic")
        );
    }

    #[test]
    fn test_parts_put_prompt_before_media() {
        let media = [Part::inline("image/png", "aGVsbG8=")];
        let parts = build_parts("", 1, &media);
        assert_eq!(parts.len(), 2);
        match &parts[0] {
            Part::Text(prompt) => assert!(prompt.contains("attached screenshot")),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(parts[1], media[0]);
        assert_eq!(build_parts("ctx", 1, &[]).len(), 1);
    }

    #[test]
    fn test_clean_empty_output() {
        assert_eq!(clean_candidate(""), None);
        assert_eq!(clean_candidate("```json\n```"), None);
        assert_eq!(clean_candidate("* \n  \n\"\""), None);
    }
}
