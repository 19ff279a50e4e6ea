/// Result of an authorization query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Microphone and speech-recognition permission collaborator.
///
/// Queries are async so implementations may prompt the user and return the
/// settled answer. Anything other than `Granted` keeps the session idle.
#[async_trait::async_trait]
pub trait AuthorizationProvider: Send + Sync {
    async fn microphone(&self) -> AuthorizationStatus;
    async fn speech_recognition(&self) -> AuthorizationStatus;
}

/// Fixed-answer authorization provider for tests and headless deployments.
#[derive(Debug, Clone, Copy)]
pub struct StaticAuthorization {
    pub microphone: AuthorizationStatus,
    pub speech_recognition: AuthorizationStatus,
}

impl StaticAuthorization {
    pub fn granted() -> Self {
        Self {
            microphone: AuthorizationStatus::Granted,
            speech_recognition: AuthorizationStatus::Granted,
        }
    }

    pub fn denied() -> Self {
        Self {
            microphone: AuthorizationStatus::Denied,
            speech_recognition: AuthorizationStatus::Denied,
        }
    }
}

#[async_trait::async_trait]
impl AuthorizationProvider for StaticAuthorization {
    async fn microphone(&self) -> AuthorizationStatus {
        self.microphone
    }

    async fn speech_recognition(&self) -> AuthorizationStatus {
        self.speech_recognition
    }
}
