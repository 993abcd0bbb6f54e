/**
 * Platform Module
 *
 * Maps a platform key (`<os>-<arch>`, e.g. `darwin-arm64`) to the Python
 * distribution bundled for it.
 *
 * Keys follow the Node.js `process.platform` / `process.arch` naming the
 * desktop bundler uses for its resource folders:
 * - macOS / Linux: python-build-standalone "install_only" tarballs
 * - Windows: python.org embeddable zip
 */
use crate::error::{Result, SetupError};

// Literal macros so the URL table below can be built with `concat!`
macro_rules! python_version {
    () => {
        "3.11.9"
    };
}

macro_rules! standalone_release {
    () => {
        "20240814"
    };
}

/// python-build-standalone "install_only" tarball for a target triple
macro_rules! standalone_url {
    ($triple:literal) => {
        concat!(
            "https://github.com/indygreg/python-build-standalone/releases/download/",
            standalone_release!(),
            "/cpython-",
            python_version!(),
            "+",
            standalone_release!(),
            "-",
            $triple,
            "-install_only.tar.gz"
        )
    };
}

/// python.org Windows embeddable zip for an architecture
macro_rules! embeddable_url {
    ($arch:literal) => {
        concat!(
            "https://www.python.org/ftp/python/",
            python_version!(),
            "/python-",
            python_version!(),
            "-embed-",
            $arch,
            ".zip"
        )
    };
}

/// Python version bundled with the app
pub const PYTHON_VERSION: &str = python_version!();

/// python-build-standalone release tag the tarballs come from
pub const STANDALONE_RELEASE: &str = standalone_release!();

/// Container format of a downloaded distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    TarGz,
    Zip,
}

impl ArchiveType {
    /// File extension, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

/// Download descriptor for one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub key: &'static str,
    pub url: &'static str,
    pub archive_type: ArchiveType,
}

pub static PLATFORMS: &[PlatformDescriptor] = &[
    PlatformDescriptor {
        key: "darwin-arm64",
        url: standalone_url!("aarch64-apple-darwin"),
        archive_type: ArchiveType::TarGz,
    },
    PlatformDescriptor {
        key: "darwin-x64",
        url: standalone_url!("x86_64-apple-darwin"),
        archive_type: ArchiveType::TarGz,
    },
    PlatformDescriptor {
        key: "linux-x64",
        url: standalone_url!("x86_64-unknown-linux-gnu"),
        archive_type: ArchiveType::TarGz,
    },
    PlatformDescriptor {
        key: "linux-arm64",
        url: standalone_url!("aarch64-unknown-linux-gnu"),
        archive_type: ArchiveType::TarGz,
    },
    PlatformDescriptor {
        key: "win32-x64",
        url: embeddable_url!("amd64"),
        archive_type: ArchiveType::Zip,
    },
    PlatformDescriptor {
        key: "win32-arm64",
        url: embeddable_url!("arm64"),
        archive_type: ArchiveType::Zip,
    },
];

/// All supported platform keys, in table order
pub fn supported_keys() -> Vec<&'static str> {
    PLATFORMS.iter().map(|p| p.key).collect()
}

/// Look up a platform key in the table
pub fn lookup(key: &str) -> Option<&'static PlatformDescriptor> {
    PLATFORMS.iter().find(|p| p.key == key)
}

/// Build a platform key from Rust's `std::env::consts` OS / ARCH names
pub fn platform_key(os: &str, arch: &str) -> String {
    let os = match os {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    };
    let arch = match arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        other => other,
    };
    format!("{}-{}", os, arch)
}

/// Platform key of the machine we're running on
pub fn host_key() -> String {
    platform_key(std::env::consts::OS, std::env::consts::ARCH)
}

/// Resolve the descriptor for an explicit key, or for the host when `None`
pub fn resolve(requested: Option<&str>) -> Result<&'static PlatformDescriptor> {
    let key = match requested {
        Some(key) => key.to_string(),
        None => host_key(),
    };

    lookup(&key).ok_or_else(|| SetupError::UnsupportedPlatform {
        key,
        supported: supported_keys(),
    })
}
