//! Constants used throughout the Onkhos core crate.
//!
//! Page geometry, rendering limits, default asset locations and the fixed vocabularies of
//! the free-text medication parser live here so the document layer and the rendering
//! engine agree on them.

use std::time::Duration;

/// Default absolute location of the institution logo shipped with the system.
pub const DEFAULT_LOGO_PATH: &str = "/usr/share/onkhos/images/logo-padrao.png";

/// Location of the default logo relative to the directory of the running executable.
pub const BUNDLED_LOGO_RELATIVE_PATH: &str = "assets/logo-padrao.png";

/// Height of the page header template, in CSS pixels.
pub const HEADER_HEIGHT_PX: u32 = 132;

/// Height of the page footer template, in CSS pixels.
pub const FOOTER_HEIGHT_PX: u32 = 80;

/// CSS pixels per inch, used to convert template heights into print margins.
pub const CSS_PX_PER_INCH: f64 = 96.0;

/// A4 paper width in inches (210 mm).
pub const A4_WIDTH_IN: f64 = 210.0 / 25.4;

/// A4 paper height in inches (297 mm).
pub const A4_HEIGHT_IN: f64 = 297.0 / 25.4;

/// Viewport of the rendering page.
pub const VIEWPORT_WIDTH: u32 = 1200;
pub const VIEWPORT_HEIGHT: u32 = 1600;
pub const VIEWPORT_SCALE_FACTOR: f64 = 1.5;

pub const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_CONTENT_LOAD_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_FONT_SETTLE_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_LAYOUT_SETTLE_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_PDF_TIMEOUT: Duration = Duration::from_secs(30);
/// Grace period for an orderly browser shutdown before the process is killed.
pub const BROWSER_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Command-line switches for the headless browser.
pub const BROWSER_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--disable-features=TranslateUI",
    "--disable-ipc-flooding-protection",
];

/// Administration routes recognised in free-text prescriptions.
pub const ROUTE_VOCABULARY: &[&str] = &["EV", "VO", "IM", "SC", "IT", "IP", "TOP"];

/// Dose units recognised in free-text prescriptions, in matching order.
pub const DOSE_UNIT_VOCABULARY: &[&str] = &["mg", "mg/m²", "mg/kg", "AUC", "UI", "mcg", "ml", "g"];

/// Text shown for prior treatments that were not performed.
pub const NOT_PERFORMED: &str = "Não realizado";

/// Text shown in place of an authorization number that has not been granted yet.
pub const AWAITING_AUTHORIZATION: &str = "Aguardando processamento";
