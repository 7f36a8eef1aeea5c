/// Why a model call failed, as far as rotation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Quota,
    NotFound,
    Overloaded,
    Other,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("Server missing GEMINI_API_KEY")]
    MissingApiKey,

    #[error("{model}: quota exhausted ({message})")]
    Quota { model: String, message: String },

    #[error("{model}: model not found")]
    ModelNotFound { model: String },

    #[error("{model}: service unavailable")]
    Overloaded { model: String },

    #[error("{model}: HTTP {status}: {message}")]
    Http {
        model: String,
        status: u16,
        message: String,
    },

    #[error("{model}: request failed: {message}")]
    Transport { model: String, message: String },

    #[error("{model}: response is missing text")]
    EmptyResponse { model: String },

    #[error("{model}: response contained no usable levels")]
    Unparseable { model: String },

    #[error("All models failed (tried: {})", attempted.join(", "))]
    AllModelsFailed { attempted: Vec<String> },
}

impl GenerationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Quota { .. } => FailureKind::Quota,
            Self::ModelNotFound { .. } => FailureKind::NotFound,
            Self::Overloaded { .. } => FailureKind::Overloaded,
            _ => FailureKind::Other,
        }
    }
}

/// Classify a failed HTTP call from its status and body.
pub fn classify_failure(status: u16, body: &str) -> FailureKind {
    if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
        FailureKind::Quota
    } else if status == 404 || body.contains("NOT_FOUND") {
        FailureKind::NotFound
    } else if status == 503 || body.contains("UNAVAILABLE") {
        FailureKind::Overloaded
    } else {
        FailureKind::Other
    }
}
