use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use classnote_python_setup::downloads::{self, DownloadProgress, DEFAULT_MAX_REDIRECTS};
use classnote_python_setup::paths::DEFAULT_RESOURCES_DIR;
use classnote_python_setup::{platform, provision, SetupConfig, SetupOutcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "setup-python")]
#[command(version, about = "Download the standalone Python runtime bundled with ClassNoteAI", long_about = None)]
struct Cli {
    /// Platform key to set up (e.g. "linux-x64"); defaults to this machine
    platform: Option<String>,

    /// Resources directory the runtime is unpacked into
    #[arg(long, env = "CLASSNOTE_RESOURCES_DIR", default_value = DEFAULT_RESOURCES_DIR)]
    resources_dir: PathBuf,

    /// Maximum number of HTTP redirects to follow
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    max_redirects: usize,

    /// Reinstall even if the runtime is already present
    #[arg(long)]
    force: bool,

    /// List supported platform keys and exit
    #[arg(long)]
    list: bool,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_progress(progress: DownloadProgress) {
    println!("Downloading: {:.1}%", progress.percent);
    std::io::stdout().flush().ok();
}

async fn run(cli: Cli) -> anyhow::Result<SetupOutcome> {
    let config = SetupConfig {
        resources_dir: cli.resources_dir,
        platform: cli.platform,
        max_redirects: cli.max_redirects,
        force: cli.force,
        user_agent: downloads::default_user_agent(),
    };

    let outcome = provision(&config, Some(print_progress)).await?;
    Ok(outcome)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    if cli.list {
        for key in platform::supported_keys() {
            println!("{}", key);
        }
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(SetupOutcome::Installed { platform, path }) => {
            println!("Python for {} installed to {}", platform, path.display());
            ExitCode::SUCCESS
        }
        Ok(SetupOutcome::AlreadyInstalled { platform, path }) => {
            println!(
                "Python for {} already installed at {}",
                platform,
                path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Python setup failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
