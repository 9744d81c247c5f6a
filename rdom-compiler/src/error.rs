use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal compile failures. Template problems never end up here; they are
/// collected as diagnostics instead.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{hook} hook failed")]
    Hook {
        hook: String,
        #[source]
        source: BoxError,
    },
    #[error("encoding compile output")]
    Json(#[from] serde_json::Error),
}

impl CompileError {
    pub fn hook(hook: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CompileError::Hook {
            hook: hook.into(),
            source: source.into(),
        }
    }
}
