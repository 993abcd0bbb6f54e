/**
 * Archive Extraction
 *
 * - tar.gz: the single top-level directory is stripped, so
 *   `python/bin/python3` lands at `{dest}/bin/python3`
 * - zip: entries are written as-is, overwriting existing files
 *
 * Both extractors are synchronous and run on tokio's blocking pool.
 */

use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{Result, SetupError};
use crate::platform::ArchiveType;

/// Extract `archive_path` into `dest` according to `archive_type`
pub async fn extract_archive(
    archive_path: &Path,
    dest: &Path,
    archive_type: ArchiveType,
) -> Result<usize> {
    info!("Extracting {:?} -> {:?}", archive_path, dest);

    let archive_path = archive_path.to_path_buf();
    let dest = dest.to_path_buf();

    let count = tokio::task::spawn_blocking(move || match archive_type {
        ArchiveType::TarGz => extract_tar_gz(&archive_path, &dest),
        ArchiveType::Zip => extract_zip(&archive_path, &dest),
    })
    .await??;

    info!("Extracted {} entries", count);
    Ok(count)
}

/// Unpack a gzip tarball, dropping the first path component of every entry
pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<usize> {
    std::fs::create_dir_all(dest)?;
    let canonical_dest = dest.canonicalize()?;

    let file = File::open(archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));
    let mut unpacked = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let raw_path = entry.path()?.into_owned();

        // The top-level directory entry itself strips to nothing
        let Some(relative) = strip_top_level(&raw_path)? else {
            continue;
        };
        let target = dest.join(&relative);

        // An earlier symlink entry must not redirect this write outside dest
        if let Some(parent) = target.parent() {
            ensure_inside(&canonical_dest, parent, &raw_path)?;
            std::fs::create_dir_all(parent)?;
        }

        // Hard link targets are archive paths too and need the same stripping
        if entry.header().entry_type().is_hard_link() {
            let link_name = entry
                .link_name()?
                .ok_or_else(|| SetupError::UnsafeEntry {
                    path: raw_path.display().to_string(),
                })?
                .into_owned();
            let Some(link_target) = strip_top_level(&link_name)? else {
                return Err(SetupError::UnsafeEntry {
                    path: link_name.display().to_string(),
                });
            };
            let source = dest.join(link_target);
            ensure_inside(&canonical_dest, &source, &link_name)?;

            if target.symlink_metadata().is_ok() {
                std::fs::remove_file(&target)?;
            }
            std::fs::hard_link(&source, &target)?;
        } else {
            entry.unpack(&target)?;
        }

        unpacked += 1;
    }

    debug!("Unpacked {} tar entries into {:?}", unpacked, dest);
    Ok(unpacked)
}

/// Unpack a zip archive into `dest`
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize> {
    std::fs::create_dir_all(dest)?;

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let count = archive.len();

    archive.extract(dest)?;

    debug!("Unpacked {} zip entries into {:?}", count, dest);
    Ok(count)
}

/// Fail unless `path` resolves to a location under `canonical_dest`
///
/// Symlinks are followed through the deepest ancestor that already exists;
/// parts not created yet cannot redirect anything.
fn ensure_inside(canonical_dest: &Path, path: &Path, entry_path: &Path) -> Result<()> {
    let mut existing = path;
    while existing.symlink_metadata().is_err() {
        match existing.parent() {
            Some(parent) => existing = parent,
            None => break,
        }
    }

    let resolved = existing.canonicalize()?;
    if !resolved.starts_with(canonical_dest) {
        return Err(SetupError::UnsafeEntry {
            path: entry_path.display().to_string(),
        });
    }
    Ok(())
}

/// Drop the first normal component of an archive path
///
/// Returns `None` for the top-level directory itself. Paths with `..`, a
/// root or a drive prefix are rejected.
fn strip_top_level(path: &Path) -> Result<Option<PathBuf>> {
    let mut stripped = PathBuf::new();
    let mut seen_top_level = false;

    for component in path.components() {
        match component {
            Component::Normal(part) => {
                if seen_top_level {
                    stripped.push(part);
                } else {
                    seen_top_level = true;
                }
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(SetupError::UnsafeEntry {
                    path: path.display().to_string(),
                });
            }
        }
    }

    if stripped.as_os_str().is_empty() {
        Ok(None)
    } else {
        Ok(Some(stripped))
    }
}
