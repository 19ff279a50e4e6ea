pub mod auth;
pub mod capture;
pub mod stats;

pub use auth::{AuthorizationProvider, AuthorizationStatus, StaticAuthorization};
pub use capture::{AudioCaptureSession, CaptureConfig, SessionState};
pub use stats::SessionStats;
