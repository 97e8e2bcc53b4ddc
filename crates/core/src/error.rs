use std::time::Duration;

/// Lifecycle stage of one rendering pass.
///
/// A pass moves `Idle → Launched → ContentLoaded → Settled → Rendered → Closed`; any
/// failure before `Closed` ends the pass in `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStage {
    Idle,
    Launched,
    ContentLoaded,
    Settled,
    Rendered,
    Closed,
    Failed,
}

impl RenderStage {
    /// Describes the work performed while leaving this stage, for error messages.
    pub fn activity(self) -> &'static str {
        match self {
            RenderStage::Idle => "launching the rendering process",
            RenderStage::Launched => "loading document content",
            RenderStage::ContentLoaded => "waiting for fonts and layout",
            RenderStage::Settled => "printing the PDF",
            RenderStage::Rendered => "closing the rendering process",
            RenderStage::Closed => "finishing",
            RenderStage::Failed => "recovering from a failure",
        }
    }
}

impl std::fmt::Display for RenderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.activity())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid browser configuration: {0}")]
    BrowserConfig(String),
    #[error("failed to launch rendering process: {0}")]
    Launch(#[source] chromiumoxide::error::CdpError),
    #[error("timed out after {limit:?} while {stage}")]
    Timeout { stage: RenderStage, limit: Duration },
    #[error("rendering failed while {stage}: {source}")]
    Protocol {
        stage: RenderStage,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    #[error("invalid DevTools command while {stage}: {message}")]
    Command { stage: RenderStage, message: String },
}

impl RenderError {
    /// Stage the pass was leaving when it failed.
    pub fn stage(&self) -> RenderStage {
        match self {
            RenderError::BrowserConfig(_) | RenderError::Launch(_) => RenderStage::Idle,
            RenderError::Timeout { stage, .. }
            | RenderError::Protocol { stage, .. }
            | RenderError::Command { stage, .. } => *stage,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to generate document: {0}")]
    Render(#[from] RenderError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_stage_and_limit() {
        let err = DocumentError::from(RenderError::Timeout {
            stage: RenderStage::Launched,
            limit: Duration::from_secs(15),
        });
        let message = err.to_string();
        assert!(message.starts_with("failed to generate document"));
        assert!(message.contains("loading document content"));
        assert!(message.contains("15s"));
    }

    #[test]
    fn configuration_errors_belong_to_idle_stage() {
        let err = RenderError::BrowserConfig("no executable".into());
        assert_eq!(err.stage(), RenderStage::Idle);
    }
}
