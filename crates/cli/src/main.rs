use anyhow::Context;
use authorization::AuthorizationRecord;
use clap::{Parser, Subcommand};
use onkhos_core::config::{resolve_chrome_executable, timeout_from_env_value};
use onkhos_core::constants::DEFAULT_LOGO_PATH;
use onkhos_core::{AuthorizationPdfService, CoreConfig, RenderTimeouts};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "onkhos")]
#[command(about = "Onkhos treatment authorization document generator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the authorization PDF for a record
    Generate {
        /// Authorization record (JSON)
        record: PathBuf,
        /// Institution logo image (optional)
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Output file (defaults to the record name with a .pdf extension)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the composed document markup
    Html {
        /// Authorization record (JSON)
        record: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the normalized medication list as JSON
    Medications {
        /// Authorization record (JSON)
        record: PathBuf,
    },
}

/// Entry point for the Onkhos CLI
///
/// # Environment Variables
/// - `ONKHOS_CHROME_PATH`: Chromium executable (default: auto-detected)
/// - `ONKHOS_DEFAULT_LOGO`: Absolute path of the default logo
///   (default: "/usr/share/onkhos/images/logo-padrao.png")
/// - `ONKHOS_CONTENT_TIMEOUT_MS`: Content load limit in milliseconds (default: 15000)
/// - `ONKHOS_PDF_TIMEOUT_MS`: PDF print limit in milliseconds (default: 30000)
/// - `RUST_LOG`: Log filter (default directive: "onkhos=info")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("onkhos=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Generate { record, logo, out }) => {
            let service = AuthorizationPdfService::new(config_from_env()?);
            let authorization = read_record(&record)?;
            let logo = logo
                .map(|path| {
                    std::fs::read(&path)
                        .with_context(|| format!("failed to read logo {}", path.display()))
                })
                .transpose()?;

            let document = service
                .generate(&authorization, logo.as_deref())
                .await
                .context("PDF generation failed")?;

            let out = out.unwrap_or_else(|| record.with_extension("pdf"));
            std::fs::write(&out, document.as_bytes())
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!("wrote {} ({} bytes)", out.display(), document.len());
        }
        Some(Commands::Html { record, out }) => {
            let service = AuthorizationPdfService::new(config_from_env()?);
            let html = service.compose_document(&read_record(&record)?);
            match out {
                Some(out) => std::fs::write(&out, html)
                    .with_context(|| format!("failed to write {}", out.display()))?,
                None => print!("{html}"),
            }
        }
        Some(Commands::Medications { record }) => {
            let service = AuthorizationPdfService::new(config_from_env()?);
            let medications = service.normalize_medications(&read_record(&record)?);
            println!("{}", serde_json::to_string_pretty(&medications)?);
        }
        None => {
            println!("Use 'onkhos --help' for commands");
        }
    }

    Ok(())
}

fn read_record(path: &Path) -> anyhow::Result<AuthorizationRecord> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read record {}", path.display()))?;
    AuthorizationRecord::from_json_slice(&bytes)
        .with_context(|| format!("invalid authorization record {}", path.display()))
}

fn config_from_env() -> anyhow::Result<CoreConfig> {
    let defaults = RenderTimeouts::default();
    let timeouts = RenderTimeouts {
        content_load: timeout_from_env_value(
            std::env::var("ONKHOS_CONTENT_TIMEOUT_MS").ok(),
            defaults.content_load,
        )?,
        pdf: timeout_from_env_value(std::env::var("ONKHOS_PDF_TIMEOUT_MS").ok(), defaults.pdf)?,
        ..defaults
    };

    let chrome = resolve_chrome_executable(
        std::env::var_os("ONKHOS_CHROME_PATH")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from),
    )?;
    let logo = std::env::var_os("ONKHOS_DEFAULT_LOGO")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGO_PATH));

    Ok(CoreConfig::new(chrome, logo, timeouts)?)
}
