//! # Rendering engine
//!
//! Drives a headless Chromium over the DevTools protocol to print composed markup as an A4
//! PDF. Every call launches a dedicated browser process and tears it down before
//! returning, whether the pass succeeded or not; no process outlives a request.
//!
//! A pass moves through [`RenderStage`]s:
//!
//! - `Idle → Launched`: spawn the browser, open a blank page, fix the viewport and start
//!   request interception (images, stylesheets and fonts are refused)
//! - `Launched → ContentLoaded`: load the document markup
//! - `ContentLoaded → Settled`: wait for web fonts (soft) and a short layout pause
//! - `Settled → Rendered`: print with the header and footer templates
//! - `Rendered → Closed`: close the browser
//!
//! Any error moves the pass to `Failed`; teardown still runs.

use crate::config::{CoreConfig, RenderTimeouts};
use crate::constants::{
    A4_HEIGHT_IN, A4_WIDTH_IN, BROWSER_ARGS, BROWSER_CLOSE_TIMEOUT, CSS_PX_PER_INCH,
    FOOTER_HEIGHT_PX, HEADER_HEIGHT_PX, VIEWPORT_HEIGHT, VIEWPORT_SCALE_FACTOR, VIEWPORT_WIDTH,
};
use crate::document::PageTemplates;
use crate::error::{RenderError, RenderStage};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

const FONTS_READY_EXPRESSION: &str = "document.fonts.ready.then(() => true)";

/// A finished PDF.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDocument {
    bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Launches one browser per rendering pass.
#[derive(Clone, Debug)]
pub struct RenderingEngine {
    chrome_executable: Option<PathBuf>,
    timeouts: RenderTimeouts,
}

impl RenderingEngine {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            chrome_executable: config.chrome_executable().map(PathBuf::from),
            timeouts: config.timeouts(),
        }
    }

    /// Prints `html` to PDF with `templates` on every page.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] naming the stage that failed. The browser process has
    /// been shut down by the time this returns, on success and on failure.
    pub async fn render(
        &self,
        html: &str,
        templates: &PageTemplates,
    ) -> Result<RenderedDocument, RenderError> {
        let mut session =
            BrowserSession::launch(self.chrome_executable.as_ref(), self.timeouts).await?;

        let outcome = session.print(html, templates).await;
        if let Err(err) = &outcome {
            tracing::warn!("rendering failed while {}: {}", err.stage(), err);
            session.stage = RenderStage::Failed;
        }
        session.close().await;

        outcome
    }
}

/// Background tasks tied to one browser; aborted when the session ends.
struct SessionTasks(Vec<JoinHandle<()>>);

impl Drop for SessionTasks {
    fn drop(&mut self) {
        for task in &self.0 {
            task.abort();
        }
    }
}

struct BrowserSession {
    browser: Browser,
    page: Page,
    timeouts: RenderTimeouts,
    stage: RenderStage,
    _tasks: SessionTasks,
}

impl BrowserSession {
    async fn launch(
        chrome_executable: Option<&PathBuf>,
        timeouts: RenderTimeouts,
    ) -> Result<Self, RenderError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .args(BROWSER_ARGS.iter().copied())
            .launch_timeout(timeouts.launch)
            .enable_request_intercept();
        if let Some(path) = chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(RenderError::BrowserConfig)?;

        // A failed launch has already killed and reaped the spawned process.
        let (mut browser, mut handler) = Browser::launch(config).await.map_err(|err| match err {
            CdpError::Timeout | CdpError::LaunchTimeout(_) => RenderError::Timeout {
                stage: RenderStage::Idle,
                limit: timeouts.launch,
            },
            other => RenderError::Launch(other),
        })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    tracing::debug!("browser handler event error: {}", err);
                }
            }
        });
        let mut tasks = SessionTasks(vec![handler_task]);
        tracing::debug!("browser launched");

        match open_page(&browser).await {
            Ok((page, interception)) => {
                tasks.0.push(interception);
                Ok(Self {
                    browser,
                    page,
                    timeouts,
                    stage: RenderStage::Launched,
                    _tasks: tasks,
                })
            }
            Err(err) => {
                shutdown(&mut browser).await;
                Err(err)
            }
        }
    }

    async fn print(
        &mut self,
        html: &str,
        templates: &PageTemplates,
    ) -> Result<RenderedDocument, RenderError> {
        let page = &self.page;
        self.step(self.timeouts.content_load, async {
            page.set_content(html).await.map(|_| ())
        })
        .await?;
        self.advance(RenderStage::ContentLoaded);

        self.settle().await?;
        self.advance(RenderStage::Settled);

        let params = print_params(templates);
        let bytes = self.step(self.timeouts.pdf, self.page.pdf(params)).await?;
        self.advance(RenderStage::Rendered);

        tracing::debug!("printed {} bytes", bytes.len());
        Ok(RenderedDocument { bytes })
    }

    /// Waits for web fonts up to the configured cap, then pauses for layout.
    ///
    /// Font readiness is best-effort: expiry or a script error only logs.
    async fn settle(&self) -> Result<(), RenderError> {
        let params = EvaluateParams::builder()
            .expression(FONTS_READY_EXPRESSION)
            .await_promise(true)
            .build()
            .map_err(|message| RenderError::Command {
                stage: self.stage,
                message,
            })?;

        let fonts = self.page.evaluate_expression(params);
        match tokio::time::timeout(self.timeouts.font_settle, fonts).await {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => tracing::debug!("font readiness check failed: {}", err),
            Err(_) => tracing::debug!(
                "fonts not ready after {:?}, continuing",
                self.timeouts.font_settle
            ),
        }

        tokio::time::sleep(self.timeouts.layout_settle).await;
        Ok(())
    }

    async fn step<T>(
        &self,
        limit: Duration,
        operation: impl Future<Output = Result<T, CdpError>>,
    ) -> Result<T, RenderError> {
        let stage = self.stage;
        match tokio::time::timeout(limit, operation).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(RenderError::Protocol { stage, source }),
            Err(_) => Err(RenderError::Timeout { stage, limit }),
        }
    }

    fn advance(&mut self, next: RenderStage) {
        tracing::trace!("render stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    async fn close(mut self) {
        shutdown(&mut self.browser).await;
        if self.stage != RenderStage::Failed {
            self.advance(RenderStage::Closed);
        }
        tracing::debug!("browser session ended in stage {:?}", self.stage);
    }
}

async fn open_page(browser: &Browser) -> Result<(Page, JoinHandle<()>), RenderError> {
    let stage = RenderStage::Idle;
    let protocol = |source| RenderError::Protocol { stage, source };

    let page = browser.new_page("about:blank").await.map_err(protocol)?;
    page.execute(SetDeviceMetricsOverrideParams::new(
        i64::from(VIEWPORT_WIDTH),
        i64::from(VIEWPORT_HEIGHT),
        VIEWPORT_SCALE_FACTOR,
        false,
    ))
    .await
    .map_err(protocol)?;

    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(protocol)?;
    let intercept_page = page.clone();
    let interception = tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let request_id = event.request_id.clone();
            let outcome = if is_blocked_resource(&event.resource_type) {
                tracing::trace!("blocking {:?} request {}", event.resource_type, event.request.url);
                intercept_page
                    .execute(FailRequestParams::new(request_id, ErrorReason::BlockedByClient))
                    .await
                    .map(|_| ())
            } else {
                intercept_page
                    .execute(ContinueRequestParams::new(request_id))
                    .await
                    .map(|_| ())
            };
            if let Err(err) = outcome {
                tracing::debug!("failed to resolve intercepted request: {}", err);
            }
        }
    });

    Ok((page, interception))
}

/// Images, stylesheets and fonts never reach the network.
fn is_blocked_resource(resource_type: &ResourceType) -> bool {
    matches!(
        resource_type,
        ResourceType::Image | ResourceType::Stylesheet | ResourceType::Font
    )
}

/// Closes the browser, killing the process when an orderly close fails or stalls.
async fn shutdown(browser: &mut Browser) {
    let closed = tokio::time::timeout(BROWSER_CLOSE_TIMEOUT, async {
        browser.close().await?;
        browser.wait().await.map_err(CdpError::from)?;
        Ok::<(), CdpError>(())
    })
    .await;

    let reason = match closed {
        Ok(Ok(())) => return,
        Ok(Err(err)) => err.to_string(),
        Err(_) => format!("no exit after {BROWSER_CLOSE_TIMEOUT:?}"),
    };
    tracing::warn!("browser did not close cleanly ({}), killing process", reason);
    if let Some(Err(err)) = browser.kill().await {
        tracing::warn!("failed to kill browser process: {}", err);
    }
}

fn css_px_to_inches(px: u32) -> f64 {
    f64::from(px) / CSS_PX_PER_INCH
}

/// A4 portrait, backgrounds on, margins reserving room for the page templates.
fn print_params(templates: &PageTemplates) -> PrintToPdfParams {
    PrintToPdfParams {
        landscape: Some(false),
        display_header_footer: Some(true),
        print_background: Some(true),
        scale: Some(1.0),
        paper_width: Some(A4_WIDTH_IN),
        paper_height: Some(A4_HEIGHT_IN),
        margin_top: Some(css_px_to_inches(HEADER_HEIGHT_PX)),
        margin_bottom: Some(css_px_to_inches(FOOTER_HEIGHT_PX)),
        margin_left: Some(0.0),
        margin_right: Some(0.0),
        header_template: Some(templates.header.clone()),
        footer_template: Some(templates.footer.clone()),
        prefer_css_page_size: Some(false),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> PageTemplates {
        PageTemplates {
            header: "<div>header</div>".into(),
            footer: "<div>footer</div>".into(),
        }
    }

    #[test]
    fn print_params_reserve_template_space() {
        let params = print_params(&templates());

        assert_eq!(params.display_header_footer, Some(true));
        assert_eq!(params.print_background, Some(true));
        assert_eq!(params.margin_top, Some(1.375));
        assert_eq!(params.margin_bottom, Some(80.0 / 96.0));
        assert_eq!(params.margin_left, Some(0.0));
        assert_eq!(params.header_template.as_deref(), Some("<div>header</div>"));
        assert_eq!(params.footer_template.as_deref(), Some("<div>footer</div>"));
    }

    #[test]
    fn print_params_use_a4_portrait() {
        let params = print_params(&templates());
        let width = params.paper_width.unwrap();
        let height = params.paper_height.unwrap();

        assert!((width - 8.2677).abs() < 1e-3);
        assert!((height - 11.6929).abs() < 1e-3);
        assert_eq!(params.landscape, Some(false));
        assert_eq!(params.prefer_css_page_size, Some(false));
    }

    #[test]
    fn blocks_only_static_assets() {
        assert!(is_blocked_resource(&ResourceType::Image));
        assert!(is_blocked_resource(&ResourceType::Stylesheet));
        assert!(is_blocked_resource(&ResourceType::Font));
        assert!(!is_blocked_resource(&ResourceType::Document));
        assert!(!is_blocked_resource(&ResourceType::Script));
    }

    #[test]
    fn rendered_document_exposes_bytes() {
        let document = RenderedDocument {
            bytes: b"%PDF-1.4".to_vec(),
        };
        assert_eq!(document.len(), 8);
        assert!(!document.is_empty());
        assert!(document.as_bytes().starts_with(b"%PDF"));
        assert_eq!(document.into_bytes(), b"%PDF-1.4".to_vec());
    }
}
