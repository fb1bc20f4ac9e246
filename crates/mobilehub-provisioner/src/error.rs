use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionerError {
    #[error("resource creation failed: {0}")]
    CreateFailed(String),

    #[error("resource update failed: {0}")]
    UpdateFailed(String),

    #[error("AWS error: {0}")]
    Aws(String),

    #[error("timed out waiting for {operation} after {attempts} polls")]
    WaitTimeout { operation: String, attempts: u32 },

    #[error("polling {operation} was interrupted: {reason}")]
    WaitInterrupted { operation: String, reason: String },

    #[error("schema compilation failed for API {api_id}: {details}")]
    SchemaCompileFailed { api_id: String, details: String },

    #[error("removing {kind} {name} is not supported; restore it in the dev snapshot or delete it remotely")]
    DeleteUnsupported { kind: String, name: String },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("storage error: {0}")]
    Storage(#[from] mobilehub_storage::StorageError),

    #[error("snapshot error: {0}")]
    Core(#[from] mobilehub_core::CoreError),
}

impl ProvisionerError {
    /// Name the resource a remote call was acting on.
    pub fn with_resource(self, label: &str, name: &str) -> Self {
        match self {
            Self::CreateFailed(msg) => Self::CreateFailed(format!("{label} ({name}): {msg}")),
            Self::UpdateFailed(msg) => Self::UpdateFailed(format!("{label} ({name}): {msg}")),
            Self::Aws(msg) => Self::Aws(format!("{label} ({name}): {msg}")),
            Self::WaitInterrupted { operation, reason } => Self::WaitInterrupted {
                operation: format!("{label} ({name}) {operation}"),
                reason,
            },
            other => other,
        }
    }
}

/// Render an error with every source beneath it, joined by `": "`.
///
/// SDK errors tend to print as a bare "service error"; the AppSync or
/// DynamoDB message lives further down the chain.
pub fn format_err_chain(err: &(dyn std::error::Error + 'static)) -> String {
    std::iter::successors(Some(err), |e| e.source())
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}
