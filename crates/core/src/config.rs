//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! [`crate::AuthorizationPdfService`]. Nothing in this crate reads process-wide
//! environment variables while a document is being generated.

use crate::constants::{
    DEFAULT_CONTENT_LOAD_TIMEOUT, DEFAULT_FONT_SETTLE_TIMEOUT, DEFAULT_LAUNCH_TIMEOUT,
    DEFAULT_LAYOUT_SETTLE_DELAY, DEFAULT_LOGO_PATH, DEFAULT_PDF_TIMEOUT,
};
use crate::{DocumentError, DocumentResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bounds for every wait of a rendering pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderTimeouts {
    pub launch: Duration,
    pub content_load: Duration,
    /// Cap on `document.fonts.ready`; expiry is not an error.
    pub font_settle: Duration,
    /// Pause after font settlement so layout can finish.
    pub layout_settle: Duration,
    pub pdf: Duration,
}

impl Default for RenderTimeouts {
    fn default() -> Self {
        Self {
            launch: DEFAULT_LAUNCH_TIMEOUT,
            content_load: DEFAULT_CONTENT_LOAD_TIMEOUT,
            font_settle: DEFAULT_FONT_SETTLE_TIMEOUT,
            layout_settle: DEFAULT_LAYOUT_SETTLE_DELAY,
            pdf: DEFAULT_PDF_TIMEOUT,
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    chrome_executable: Option<PathBuf>,
    default_logo_path: PathBuf,
    timeouts: RenderTimeouts,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            default_logo_path: PathBuf::from(DEFAULT_LOGO_PATH),
            timeouts: RenderTimeouts::default(),
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `chrome_executable` of `None` lets the rendering engine auto-detect Chromium.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Config`] if the default logo path is relative or any
    /// bounded wait is zero.
    pub fn new(
        chrome_executable: Option<PathBuf>,
        default_logo_path: PathBuf,
        timeouts: RenderTimeouts,
    ) -> DocumentResult<Self> {
        if !default_logo_path.is_absolute() {
            return Err(DocumentError::Config(format!(
                "default logo path must be absolute: {}",
                default_logo_path.display()
            )));
        }

        let bounded = [
            ("launch", timeouts.launch),
            ("content load", timeouts.content_load),
            ("pdf", timeouts.pdf),
        ];
        if let Some((name, _)) = bounded.iter().find(|(_, limit)| limit.is_zero()) {
            return Err(DocumentError::Config(format!(
                "{name} timeout must be greater than zero"
            )));
        }

        Ok(Self {
            chrome_executable,
            default_logo_path,
            timeouts,
        })
    }

    pub fn chrome_executable(&self) -> Option<&Path> {
        self.chrome_executable.as_deref()
    }

    pub fn default_logo_path(&self) -> &Path {
        &self.default_logo_path
    }

    pub fn timeouts(&self) -> RenderTimeouts {
        self.timeouts
    }
}

/// Resolve the Chromium executable without reading environment variables.
///
/// An override must point at an existing file. Without an override the engine falls back
/// to its own detection of an installed Chrome/Chromium.
pub fn resolve_chrome_executable(
    override_path: Option<PathBuf>,
) -> DocumentResult<Option<PathBuf>> {
    match override_path {
        Some(path) if path.is_file() => Ok(Some(path)),
        Some(path) => Err(DocumentError::Config(format!(
            "ONKHOS_CHROME_PATH does not point at a file: {}",
            path.display()
        ))),
        None => Ok(None),
    }
}

/// Parse a millisecond timeout from an optional string value.
///
/// `None` or empty/whitespace returns `default`.
pub fn timeout_from_env_value(
    value: Option<String>,
    default: Duration,
) -> DocumentResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| {
                DocumentError::Config(format!("invalid timeout in milliseconds: {raw:?}"))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rejects_relative_logo_path() {
        let err = CoreConfig::new(None, PathBuf::from("logo.png"), RenderTimeouts::default())
            .expect_err("relative path");
        assert!(matches!(err, DocumentError::Config(_)));
    }

    #[test]
    fn rejects_zero_bounded_wait() {
        let timeouts = RenderTimeouts {
            pdf: Duration::ZERO,
            ..RenderTimeouts::default()
        };
        let err = CoreConfig::new(None, PathBuf::from(DEFAULT_LOGO_PATH), timeouts)
            .expect_err("zero timeout");
        assert!(err.to_string().contains("pdf"));
    }

    #[test]
    fn zero_font_settle_is_allowed() {
        let timeouts = RenderTimeouts {
            font_settle: Duration::ZERO,
            layout_settle: Duration::ZERO,
            ..RenderTimeouts::default()
        };
        let config = CoreConfig::new(None, PathBuf::from(DEFAULT_LOGO_PATH), timeouts)
            .expect("valid config");
        assert_eq!(config.timeouts().font_settle, Duration::ZERO);
    }

    #[test]
    fn chrome_override_must_be_a_file() {
        let temp = TempDir::new().unwrap();
        assert!(resolve_chrome_executable(Some(temp.path().to_path_buf())).is_err());

        let exe = temp.path().join("chromium");
        std::fs::write(&exe, b"#!/bin/sh\n").unwrap();
        assert_eq!(resolve_chrome_executable(Some(exe.clone())).unwrap(), Some(exe));

        assert_eq!(resolve_chrome_executable(None).unwrap(), None);
    }

    #[test]
    fn parses_timeout_values() {
        let default = Duration::from_secs(15);
        assert_eq!(timeout_from_env_value(None, default).unwrap(), default);
        assert_eq!(timeout_from_env_value(Some("  ".into()), default).unwrap(), default);
        assert_eq!(
            timeout_from_env_value(Some("2500".into()), default).unwrap(),
            Duration::from_millis(2500)
        );
        assert!(timeout_from_env_value(Some("soon".into()), default).is_err());
    }
}
