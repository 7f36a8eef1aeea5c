//! Recovering level lists from model output.
//!
//! Models wrap JSON in markdown fences, add chatter around it, or get cut off
//! mid-array. The array is extracted and parsed whole when possible;
//! otherwise each complete top-level object is parsed on its own and the
//! malformed ones are dropped.

use levelr_core::plan::LevelDraft;
use serde_json::Value;

/// Remove markdown code fences.
pub fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Text from the first `[` through the last `]`, if both exist in order.
fn array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// End index of the balanced object opening at `start`, ignoring braces
/// inside string literals. `None` if the object never closes.
fn object_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// A level carries a title plus a description or tasks. Nested resource
/// objects only have a title and a url.
fn looks_like_level(value: &Value) -> bool {
    value.get("title").is_some()
        && (value.get("description").is_some() || value.get("tasks").is_some())
}

/// Parse every well-formed level object in `text`.
///
/// A candidate that does not parse is skipped by resuming at the next `{`
/// after its opening brace, so a broken quote in one object cannot swallow
/// the ones after it. Returns the drafts and the number of rejected
/// candidates.
fn salvage_drafts(text: &str) -> (Vec<LevelDraft>, usize) {
    let mut drafts = Vec::new();
    let mut rejected = 0;
    let mut pos = 0;

    while let Some(found) = text[pos..].find('{') {
        let start = pos + found;
        let parsed = object_end(text, start).and_then(|end| {
            serde_json::from_str::<Value>(&text[start..=end])
                .ok()
                .filter(looks_like_level)
                .and_then(to_draft)
                .map(|draft| (draft, end))
        });

        match parsed {
            Some((draft, end)) => {
                drafts.push(draft);
                pos = end + 1;
            }
            None => {
                rejected += 1;
                pos = start + 1;
            }
        }
    }
    (drafts, rejected)
}

/// Parse model output into level drafts. Returns an empty list when nothing
/// usable is found.
pub fn parse_level_drafts(text: &str) -> Vec<LevelDraft> {
    let cleaned = strip_fences(text);
    let candidate = array_span(&cleaned).unwrap_or(&cleaned);

    match serde_json::from_str::<Vec<Value>>(candidate) {
        Ok(values) => values.into_iter().filter_map(to_draft).collect(),
        Err(e) => {
            tracing::warn!("JSON parse failed ({}), attempting repair", e);
            let (drafts, rejected) = salvage_drafts(&cleaned);
            if rejected > 0 {
                tracing::warn!(
                    "Skipped {} malformed fragment(s), kept {} level(s)",
                    rejected,
                    drafts.len()
                );
            }
            drafts
        }
    }
}

fn to_draft(value: Value) -> Option<LevelDraft> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences() {
        assert_eq!(strip_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_fences("```\n[]\n```  "), "[]");
    }

    #[test]
    fn fenced_array_parses_to_the_same_levels() {
        let raw = r#"[{"title":"Setup","description":"Install tools","tasks":["a","b"],"estimatedTime":"1 hour"},
                      {"title":"Build","description":"Write code","tasks":["c"],"estimatedTime":"2 hours","tips":"Commit often"}]"#;
        let fenced = format!("Here you go:\n```json\n{}\n```\nEnjoy!", raw);

        let direct = parse_level_drafts(raw);
        let repaired = parse_level_drafts(&fenced);

        assert_eq!(direct.len(), 2);
        assert_eq!(direct, repaired);
        assert_eq!(repaired[1].tips.as_deref(), Some("Commit often"));
        assert_eq!(repaired[0].estimated_time.as_deref(), Some("1 hour"));
    }

    #[test]
    fn keeps_well_formed_objects_around_a_malformed_one() {
        let text = r#"[
            {"title": "One", "description": "first", "tasks": ["x"]},
            {"title": "Two", "description": oops},
            {"title": "Three", "description": "third", "resources": [{"title": "Docs", "url": "https://example.com"}]}
        ]"#;

        let drafts = parse_level_drafts(text);

        let titles: Vec<&str> = drafts.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Three"]);
        assert_eq!(drafts[1].resources[0].url, "https://example.com");
    }

    #[test]
    fn recovers_complete_objects_from_truncated_output() {
        let text = r#"[{"title": "One", "description": "a"}, {"title": "Two", "description": "b"}, {"title": "Thr"#;
        let drafts = parse_level_drafts(text);
        assert_eq!(drafts.len(), 2);
    }

    #[test]
    fn braces_inside_strings_do_not_split_objects() {
        let text = r#"{"title": "Use {curly} braces", "description": "quote \" and }"} trailing"#;
        assert_eq!(object_end(text, 0), Some(text.len() - "trailing".len() - 2));
        let drafts = parse_level_drafts(text);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Use {curly} braces");
    }

    #[test]
    fn unbalanced_quote_does_not_swallow_later_levels() {
        let text = r#"[{"title":"One","description":"a","tasks":["x"]}, {"title":"Two,"description":"b"}, {"title":"Three","description":"c","resources":[{"title":"Docs","url":"https://example.com"}]}, {"title":"Four","description":"d"}]"#;

        let titles: Vec<String> = parse_level_drafts(text).into_iter().map(|d| d.title).collect();

        assert_eq!(titles, vec!["One", "Three", "Four"]);
    }

    #[test]
    fn nested_resources_are_not_mistaken_for_levels() {
        let text = r#"[{"title":"Broken","description": oops, "resources":[{"title":"Docs","url":"u"}]}, {"title":"Kept","tasks":[]}]"#;

        let titles: Vec<String> = parse_level_drafts(text).into_iter().map(|d| d.title).collect();

        assert_eq!(titles, vec!["Kept"]);
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(parse_level_drafts("I cannot help with that.").is_empty());
        assert!(parse_level_drafts("[1, 2, 3]").is_empty());
    }
}
