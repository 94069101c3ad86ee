use thiserror::Error;

#[derive(Debug, Error)]
pub enum NixCfgError {
    #[error("file error: {1}: {0}")]
    FileError(std::io::Error, String),

    #[error("bad answers: {0}")]
    BadAnswers(String),

    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    #[error("external tool failed: {context}")]
    ExternalToolFailure {
        error: Option<std::io::Error>,
        context: String,
    },

    #[error("bad cli arguments: {0}")]
    BadArgs(String),

    #[error("nixcfg-rs bug: {0}")]
    NixCfgBug(String),
}

impl NixCfgError {
    pub fn invalid_input(field: &'static str, reason: &str) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.to_string(),
        }
    }
}
