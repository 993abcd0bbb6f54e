/**
 * Runtime Directories
 *
 * Layout produced under the resources root:
 * - {resources}/python/{platform}/python/            unpacked interpreter
 * - {resources}/python/{platform}/python.{ext}       downloaded archive (transient)
 *
 * The presence of the `python/` install dir is what marks a platform as
 * already provisioned.
 */
use std::path::{Path, PathBuf};

use crate::platform::PlatformDescriptor;

/// Default resources root, relative to the working directory
pub const DEFAULT_RESOURCES_DIR: &str = "resources";

/// Get the directory holding every bundled Python platform
///
/// Returns: {resources}/python/
pub fn get_python_resources_dir(resources_dir: &Path) -> PathBuf {
    resources_dir.join("python")
}

/// Paths for one platform's runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLayout {
    /// {resources}/python/{platform}/
    pub platform_dir: PathBuf,
    /// {resources}/python/{platform}/python/
    pub install_dir: PathBuf,
    /// {resources}/python/{platform}/python.{ext}
    pub archive_path: PathBuf,
}

impl RuntimeLayout {
    pub fn new(resources_dir: &Path, platform: &PlatformDescriptor) -> Self {
        let platform_dir = get_python_resources_dir(resources_dir).join(platform.key);
        let install_dir = platform_dir.join("python");
        let archive_path =
            platform_dir.join(format!("python.{}", platform.archive_type.extension()));

        Self {
            platform_dir,
            install_dir,
            archive_path,
        }
    }

    /// Whether the runtime has already been unpacked
    pub fn is_installed(&self) -> bool {
        self.install_dir.exists()
    }
}
