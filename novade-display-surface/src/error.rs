//! Error types for the display surface layer.
//!
//! Every public operation that can fail returns a [`SurfaceError`]. The
//! collaborator traits report their own small error types ([`ServiceError`],
//! [`BindingError`], [`BaseInitError`]) which are wrapped by the manager at
//! the call site, next to the `tracing` event describing the failure.

use std::path::PathBuf;
use thiserror::Error;

/// A failed call into the display service (compositor IPC channel).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("display service call `{call}` failed with status {status}")]
pub struct ServiceError {
    /// Name of the service entry point that failed.
    pub call: &'static str,
    /// Raw status code returned by the service.
    pub status: i32,
}

impl ServiceError {
    pub fn new(call: &'static str, status: i32) -> Self {
        Self { call, status }
    }
}

/// The context-binding layer refused or failed an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {reason}")]
pub struct BindingError {
    pub operation: &'static str,
    pub reason: String,
}

impl BindingError {
    pub fn new(operation: &'static str, reason: impl Into<String>) -> Self {
        Self {
            operation,
            reason: reason.into(),
        }
    }
}

/// The generic window-system base initializer failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BaseInitError(pub String);

/// Errors surfaced by [`DisplaySurfaceManager`](crate::DisplaySurfaceManager).
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The display-service channel could not be opened.
    #[error("failed to open display service channel")]
    ChannelOpen(#[source] ServiceError),

    /// The display-service channel opened but the connection was refused.
    #[error("display service connection failed")]
    ChannelConnect(#[source] ServiceError),

    /// The base window system rejected initialization.
    #[error("base window system initialization failed")]
    BaseInit(#[from] BaseInitError),

    /// An operation needs `init_window_system` to have succeeded first.
    #[error("window system is not initialized")]
    NotInitialized,

    /// Only one rendering surface may be live at a time.
    #[error("a rendering surface is already live")]
    SurfaceAlreadyLive,

    /// The context binding refused to create a rendering surface.
    #[error("could not create rendering surface")]
    WindowCreation(#[source] BindingError),

    /// The context binding could not tear the rendering surface down.
    #[error("could not destroy rendering surface")]
    WindowDestruction(#[source] BindingError),

    /// Layer dimensions do not fit the compositor's 16.16 source encoding.
    #[error("layer geometry {width}x{height} does not fit the compositor source rectangle")]
    Geometry { width: u32, height: u32 },
}

/// Errors raised while loading or validating [`SurfaceConfig`](crate::SurfaceConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file from {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Errors raised while installing the global `tracing` subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    #[error("Failed to initialize logging: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn channel_errors_keep_service_error_as_source() {
        let err = SurfaceError::ChannelConnect(ServiceError::new("vchi_connect", -1));
        assert_eq!(err.to_string(), "display service connection failed");
        let source = err.source().expect("service error should be the source");
        assert_eq!(source.to_string(), "display service call `vchi_connect` failed with status -1");
    }

    #[test]
    fn base_init_error_converts_into_surface_error() {
        let err: SurfaceError = BaseInitError("no renderer".to_string()).into();
        assert!(matches!(err, SurfaceError::BaseInit(_)));
        assert_eq!(err.to_string(), "base window system initialization failed");
        assert_eq!(err.source().map(|e| e.to_string()), Some("no renderer".to_string()));
    }

    #[test]
    fn binding_error_display() {
        let err = BindingError::new("create_window", "no matching config");
        assert_eq!(err.to_string(), "create_window failed: no matching config");
    }

    #[test]
    fn config_parse_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("layer = = 1").unwrap_err();
        let err = ConfigError::from(toml_err);
        assert!(err.to_string().starts_with("Failed to parse configuration file"));
    }
}
