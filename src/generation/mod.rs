//! Level plan generation.
//!
//! A prompt built from the goal is sent to the first model that still has
//! daily quota. Any failure moves on to the next model in priority order.
//! The response text is repaired into level drafts, and the drafts are
//! turned into a numbered, rewarded plan.

mod backend;
mod error;
mod prompt;
mod quota;
pub mod repair;
#[cfg(any(test, feature = "test-util"))]
mod scripted;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use levelr_core::models::{Difficulty, GoalCategory, Level};
use levelr_core::plan::{build_levels, placeholder_levels, LevelDraft};
use serde::{Deserialize, Serialize};

pub use backend::{GeminiBackend, GenerationBackend, GenerationOptions, DEFAULT_GEMINI_BASE_URL};
pub use error::{classify_failure, FailureKind, GenerationError};
pub use prompt::{build_prompt, level_schema};
pub use quota::{QuotaTracker, DEFAULT_MODELS};
#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedBackend;

pub const MAX_LEVELS: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub title: String,
    pub category: GoalCategory,
    pub difficulty: Difficulty,
    pub levels: u32,
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".into());
        }
        if !(1..=MAX_LEVELS).contains(&self.levels) {
            return Err(format!("levels must be between 1 and {}", MAX_LEVELS));
        }
        Ok(())
    }
}

/// Drafts produced by one successful model call.
#[derive(Debug, Clone)]
pub struct GeneratedDrafts {
    pub model: String,
    pub drafts: Vec<LevelDraft>,
}

/// A playable plan and the model that produced it, if any.
#[derive(Debug, Clone)]
pub struct LevelPlan {
    pub levels: Vec<Level>,
    /// `None` when the placeholder plan was substituted.
    pub model: Option<String>,
}

pub struct LevelPlanner {
    backend: Option<Arc<dyn GenerationBackend>>,
    quota: QuotaTracker,
}

impl LevelPlanner {
    /// `backend` is `None` when no API key is configured.
    pub fn new(backend: Option<Arc<dyn GenerationBackend>>, quota: QuotaTracker) -> Self {
        Self { backend, quota }
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedDrafts, GenerationError> {
        self.generate_on(request, Utc::now().date_naive()).await
    }

    /// Rotation against the quota bucket for `today`.
    pub async fn generate_on(
        &self,
        request: &GenerationRequest,
        today: NaiveDate,
    ) -> Result<GeneratedDrafts, GenerationError> {
        let backend = self.backend.as_ref().ok_or(GenerationError::MissingApiKey)?;
        let prompt = build_prompt(request);
        let schema = level_schema();
        let mut attempted: Vec<String> = Vec::new();

        tracing::info!(
            title = %request.title,
            category = request.category.as_str(),
            difficulty = request.difficulty.as_str(),
            levels = request.levels,
            "Generating level plan"
        );

        while let Some(model) = self.quota.pick(today, &attempted) {
            attempted.push(model.clone());
            let options = GenerationOptions::for_model(&model, schema.clone());

            let result = backend
                .generate(&model, &prompt, &options)
                .await
                .and_then(|text| {
                    let drafts = repair::parse_level_drafts(&text);
                    if drafts.is_empty() {
                        Err(GenerationError::Unparseable {
                            model: model.clone(),
                        })
                    } else {
                        Ok(drafts)
                    }
                });

            match result {
                Ok(drafts) => {
                    self.quota.record_success(&model, today);
                    tracing::info!(model = %model, levels = drafts.len(), "Level plan generated");
                    return Ok(GeneratedDrafts { model, drafts });
                }
                Err(err) => {
                    if err.kind() == FailureKind::Quota {
                        self.quota.mark_exhausted(&model, today);
                    }
                    tracing::warn!(model = %model, kind = ?err.kind(), "{}; trying next model", err);
                }
            }
        }

        tracing::error!(attempted = ?attempted, "All models failed");
        Err(GenerationError::AllModelsFailed { attempted })
    }

    /// Generate a plan, substituting the placeholder plan on any failure.
    pub async fn plan_levels(&self, request: &GenerationRequest) -> LevelPlan {
        match self.generate(request).await {
            Ok(generated) => LevelPlan {
                levels: build_levels(generated.drafts, request.difficulty, request.levels),
                model: Some(generated.model),
            },
            Err(err) => {
                tracing::warn!("Generation failed, using placeholder plan: {}", err);
                LevelPlan {
                    levels: placeholder_levels(request.levels, request.difficulty),
                    model: None,
                }
            }
        }
    }
}
