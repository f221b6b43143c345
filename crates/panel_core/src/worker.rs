use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRegistration {
    /// Scope reported by the host runtime, for diagnostics only.
    pub scope: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrarError {
    #[error("worker registration failed: {reason}")]
    Failed { reason: String },

    #[error("host has no background worker runtime")]
    Unsupported,
}

/// Registration hook for the host's background worker runtime.
///
/// The controller only ever registers the well-known script once at startup
/// and logs the result; nothing else in the panel observes it.
#[async_trait]
pub trait WorkerRegistrar: Send + Sync {
    fn is_supported(&self) -> bool;

    async fn register(&self, script_path: &str) -> Result<WorkerRegistration, RegistrarError>;
}

/// Registrar for hosts without a worker runtime. `register` is unreachable
/// through the controller because `is_supported` is false.
pub struct UnsupportedWorkerHost;

#[async_trait]
impl WorkerRegistrar for UnsupportedWorkerHost {
    fn is_supported(&self) -> bool {
        false
    }

    async fn register(&self, _script_path: &str) -> Result<WorkerRegistration, RegistrarError> {
        Err(RegistrarError::Unsupported)
    }
}
