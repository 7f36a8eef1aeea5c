use serde_json::{json, Value};

use super::GenerationRequest;

pub fn build_prompt(request: &GenerationRequest) -> String {
    let count = request.levels;
    format!(
        r#"You are a senior product designer and curriculum architect
who builds gamified learning systems.

This roadmap is used inside a real application. Every level must feel
purposeful, progressive and rewarding.

USER GOAL
Goal: "{goal}"
Category: "{category}"
Difficulty: "{difficulty}"
Total Levels: {count}

DESIGN RULES
- Create EXACTLY {count} levels.
- Level 1 is beginner-friendly and covers setup or fundamentals.
- Each next level is a clear step up in skill or complexity.
- The final level represents real-world completion or mastery.
- Be concrete and actionable. Do not repeat tasks across levels.

LEVEL FIELDS
- title: short and motivating, at most 5 words.
- description: 1-2 actionable sentences.
- tasks: 3-5 checklist actions the user can actually complete.
- estimatedTime: a realistic duration such as "2 hours".
- tips: one piece of insider advice.
- resources: 1-2 relevant links as {{"title", "url"}} objects.

OUTPUT FORMAT
Return ONLY a JSON array of {count} level objects. No markdown, no
explanations, no text before or after the array."#,
        goal = request.title.trim(),
        category = request.category.as_str(),
        difficulty = request.difficulty.as_str(),
        count = count,
    )
}

/// Structured-output schema for models that support it.
pub fn level_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING", "description": "Short, motivating title" },
                "description": { "type": "STRING", "description": "1-2 sentences, actionable" },
                "tasks": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "3-5 checklist actions"
                },
                "estimatedTime": { "type": "STRING", "description": "Realistic time" },
                "tips": { "type": "STRING", "description": "Insider advice" },
                "resources": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "title": { "type": "STRING" },
                            "url": { "type": "STRING" }
                        }
                    }
                }
            },
            "required": ["title", "description", "tasks", "estimatedTime"]
        }
    })
}
