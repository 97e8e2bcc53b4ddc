//! Institution logo resolution.
//!
//! The page header always needs an image. The resolver walks a fixed fallback chain and
//! returns the first usable asset, pre-encoded as a base64 `data:` URI:
//!
//! 1. the clinic-supplied logo, when provided and non-empty
//! 2. the default asset at the configured absolute path
//! 3. the same asset shipped next to the running executable (`<exe dir>/assets/`)
//! 4. a built-in SVG mark
//!
//! Failing steps are logged at debug level and never surface as errors.

use crate::constants::BUNDLED_LOGO_RELATIVE_PATH;
use base64::{engine::general_purpose, Engine as _};
use std::path::{Path, PathBuf};

const FALLBACK_SVG: &str = r##"<svg width="50" height="50" viewBox="0 0 50 50" fill="none" xmlns="http://www.w3.org/2000/svg">
  <rect width="50" height="50" rx="8" fill="#2c3e50"/>
  <path d="M25 10 L25 40 M10 25 L40 25" stroke="white" stroke-width="3" stroke-linecap="round"/>
  <circle cx="25" cy="25" r="8" fill="none" stroke="white" stroke-width="2"/>
  <path d="M20 20 L30 30 M30 20 L20 30" stroke="#c6d651" stroke-width="1.5" stroke-linecap="round"/>
</svg>"##;

/// Step of the fallback chain that produced the logo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoSource {
    Clinic,
    DefaultPath,
    BundledAsset,
    BuiltIn,
}

/// An image ready for inline embedding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoImage {
    mime_type: &'static str,
    data_uri: String,
}

impl LogoImage {
    /// Encodes raw image bytes, sniffing the MIME type from magic bytes.
    ///
    /// Unrecognised content is labelled `image/png`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mime_type = infer::get(bytes)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .map_or("image/png", |kind| kind.mime_type());
        Self::encode(mime_type, bytes)
    }

    /// The built-in SVG mark.
    pub fn built_in() -> Self {
        Self::encode("image/svg+xml", FALLBACK_SVG.as_bytes())
    }

    fn encode(mime_type: &'static str, bytes: &[u8]) -> Self {
        let data_uri = format!(
            "data:{mime_type};base64,{}",
            general_purpose::STANDARD.encode(bytes)
        );
        Self {
            mime_type,
            data_uri,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }
}

/// Walks the logo fallback chain.
#[derive(Clone, Debug)]
pub struct LogoResolver {
    default_path: PathBuf,
    bundled_path: Option<PathBuf>,
}

impl LogoResolver {
    /// Resolver using `default_path` for step 2 and the asset installed beside the running
    /// executable for step 3.
    pub fn new(default_path: impl Into<PathBuf>) -> Self {
        Self {
            default_path: default_path.into(),
            bundled_path: installed_asset_path(),
        }
    }

    pub fn with_bundled_path(
        default_path: impl Into<PathBuf>,
        bundled_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            default_path: default_path.into(),
            bundled_path: Some(bundled_path.into()),
        }
    }

    /// Location checked by step 3, if the executable directory could be determined.
    pub fn bundled_path(&self) -> Option<&Path> {
        self.bundled_path.as_deref()
    }

    /// Resolves the logo for one document. Always returns an image.
    pub fn resolve(&self, clinic_logo: Option<&[u8]>) -> (LogoImage, LogoSource) {
        if let Some(bytes) = clinic_logo.filter(|bytes| !bytes.is_empty()) {
            return (LogoImage::from_bytes(bytes), LogoSource::Clinic);
        }
        tracing::debug!("no clinic logo supplied, trying default asset");

        if let Some(image) = read_asset(&self.default_path) {
            return (image, LogoSource::DefaultPath);
        }
        if let Some(image) = self.bundled_path.as_deref().and_then(read_asset) {
            return (image, LogoSource::BundledAsset);
        }

        tracing::debug!("using built-in logo");
        (LogoImage::built_in(), LogoSource::BuiltIn)
    }
}

/// `<exe dir>/assets/logo-padrao.png`, resolved at runtime.
fn installed_asset_path() -> Option<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|err| tracing::debug!("cannot locate running executable: {}", err))
        .ok()?;
    exe.parent().map(|dir| dir.join(BUNDLED_LOGO_RELATIVE_PATH))
}

fn read_asset(path: &Path) -> Option<LogoImage> {
    match std::fs::read(path) {
        Ok(bytes) if !bytes.is_empty() => Some(LogoImage::from_bytes(&bytes)),
        Ok(_) => {
            tracing::debug!("logo asset is empty: {}", path.display());
            None
        }
        Err(err) => {
            tracing::debug!("logo asset unavailable at {}: {}", path.display(), err);
            None
        }
    }
}
