/**
 * Setup Module - Bundled Python Runtime Provisioning
 *
 * This module handles:
 * 1. Resolving the target platform
 * 2. Skipping platforms that are already unpacked
 * 3. Downloading the distribution archive
 * 4. Extracting it and removing the archive
 */
pub mod extract;

use std::path::PathBuf;

use tracing::{info, warn};

use crate::downloads::{self, DownloadProgress, DEFAULT_MAX_REDIRECTS};
use crate::error::Result;
use crate::paths::{RuntimeLayout, DEFAULT_RESOURCES_DIR};
use crate::platform::{self, ArchiveType, PlatformDescriptor};

/// Options for one provisioning run
#[derive(Debug, Clone)]
pub struct SetupConfig {
    /// Resources root; the runtime goes under `{resources_dir}/python/`
    pub resources_dir: PathBuf,
    /// Explicit platform key, `None` for the host platform
    pub platform: Option<String>,
    pub max_redirects: usize,
    /// Reinstall even if the install dir already exists
    pub force: bool,
    pub user_agent: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            resources_dir: PathBuf::from(DEFAULT_RESOURCES_DIR),
            platform: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            force: false,
            user_agent: downloads::default_user_agent(),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Runtime was downloaded and unpacked
    Installed { platform: String, path: PathBuf },
    /// Install dir was already present, nothing was fetched
    AlreadyInstalled { platform: String, path: PathBuf },
}

impl SetupOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Installed { path, .. } | Self::AlreadyInstalled { path, .. } => path,
        }
    }
}

/// Resolve the platform from `config` and provision its runtime
pub async fn provision<F>(config: &SetupConfig, progress_callback: Option<F>) -> Result<SetupOutcome>
where
    F: Fn(DownloadProgress) + Send + Sync,
{
    let descriptor = platform::resolve(config.platform.as_deref())?;
    provision_platform(config, descriptor, progress_callback).await
}

/// Provision the runtime described by `descriptor`
pub async fn provision_platform<F>(
    config: &SetupConfig,
    descriptor: &PlatformDescriptor,
    progress_callback: Option<F>,
) -> Result<SetupOutcome>
where
    F: Fn(DownloadProgress) + Send + Sync,
{
    let layout = RuntimeLayout::new(&config.resources_dir, descriptor);

    if layout.is_installed() {
        if !config.force {
            info!(
                "Python for {} already installed at {:?}, skipping",
                descriptor.key, layout.install_dir
            );
            return Ok(SetupOutcome::AlreadyInstalled {
                platform: descriptor.key.to_string(),
                path: layout.install_dir,
            });
        }

        info!("Removing existing install at {:?}", layout.install_dir);
        tokio::fs::remove_dir_all(&layout.install_dir).await?;
    }

    info!(
        "Setting up Python {} for {}",
        platform::PYTHON_VERSION,
        descriptor.key
    );

    let client = downloads::build_client(&config.user_agent)?;
    downloads::download_file(
        &client,
        descriptor.url,
        &layout.archive_path,
        config.max_redirects,
        progress_callback,
    )
    .await?;

    install_from_archive(&layout, descriptor.archive_type).await?;

    info!("Python installed to {:?}", layout.install_dir);
    Ok(SetupOutcome::Installed {
        platform: descriptor.key.to_string(),
        path: layout.install_dir,
    })
}

/// Extract the downloaded archive, then delete it
///
/// On failure the archive stays on disk and the partial install dir is
/// removed, so the next run does not treat it as installed.
pub async fn install_from_archive(layout: &RuntimeLayout, archive_type: ArchiveType) -> Result<()> {
    if let Err(e) =
        extract::extract_archive(&layout.archive_path, &layout.install_dir, archive_type).await
    {
        if layout.install_dir.exists() {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&layout.install_dir).await {
                warn!(
                    "Failed to remove partial install {:?}: {}",
                    layout.install_dir, cleanup
                );
            }
        }
        return Err(e);
    }

    tokio::fs::remove_file(&layout.archive_path).await?;
    Ok(())
}
