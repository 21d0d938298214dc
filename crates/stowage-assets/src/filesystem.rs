//! Asset lookup chain and staging-directory materialization

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use stowage_formats::pak::PakArchive;
use tracing::{debug, info, warn};

use crate::{AssetError, Result};

/// Extension of an alias index file sitting beside its archive.
///
/// `assets.pak` may ship an `assets.lst` of `requested = stored` lines
/// redirecting lookup names to the names actually present in the FAT.
const ALIAS_EXTENSION: &str = "lst";

/// One mounted archive plus its optional alias index.
#[derive(Debug)]
struct MountedArchive {
    archive: PakArchive,
    /// Normalized requested-name -> stored-name redirects
    aliases: HashMap<String, String>,
}

impl MountedArchive {
    /// Resolve the name to look up in this archive's FAT.
    fn resolve<'a>(&'a self, requested: &'a str) -> &'a str {
        self.aliases
            .get(requested)
            .map_or(requested, String::as_str)
    }
}

/// Asset filesystem over an application directory and its PAK archives.
///
/// Lookup order for [`request_file`](Self::request_file): staging
/// directory, loose files under the application directory, then each
/// mounted archive. The first hit is materialized into the staging
/// directory and wins; archives never shadow loose files.
#[derive(Debug)]
pub struct ArchiveFileSystem {
    app_dir: PathBuf,
    staging_dir: PathBuf,
    archives: Vec<MountedArchive>,
}

impl ArchiveFileSystem {
    /// Mount an application directory and create the staging directory.
    ///
    /// Every `*.pak` directly under `app_dir` is opened read-only, in
    /// file-name order so the probe sequence is deterministic. An archive
    /// that fails to open is skipped with a warning rather than failing
    /// the whole mount — one corrupt archive should not take down every
    /// other asset source.
    pub fn new(app_dir: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>) -> Result<Self> {
        let app_dir = app_dir.into();
        let staging_dir = staging_dir.into();
        if !app_dir.is_dir() {
            return Err(AssetError::NotADirectory(app_dir));
        }
        fs::create_dir_all(&staging_dir)?;

        let mut pak_paths: Vec<PathBuf> = fs::read_dir(&app_dir)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pak"))
            })
            .collect();
        pak_paths.sort();

        let mut archives = Vec::with_capacity(pak_paths.len());
        for path in pak_paths {
            match PakArchive::open(&path, false) {
                Ok(archive) => {
                    let aliases = load_alias_index(&path);
                    debug!(
                        archive = %path.display(),
                        entries = archive.len(),
                        aliases = aliases.len(),
                        "mounted archive"
                    );
                    archives.push(MountedArchive { archive, aliases });
                }
                Err(e) => {
                    warn!(archive = %path.display(), error = %e, "skipping unreadable archive");
                }
            }
        }

        info!(
            app_dir = %app_dir.display(),
            archives = archives.len(),
            "asset filesystem mounted"
        );
        Ok(Self {
            app_dir,
            staging_dir,
            archives,
        })
    }

    /// Number of successfully mounted archives.
    pub fn archive_count(&self) -> usize {
        self.archives.len()
    }

    /// Where `relative_path` lives (or would live) in the staging dir.
    pub fn staged_path(&self, relative_path: &str) -> PathBuf {
        self.staging_dir.join(normalize_relative(relative_path))
    }

    /// Make `relative_path` available under the staging directory.
    ///
    /// Returns true when the file is present there afterwards, whether it
    /// already was, was copied from a loose file, or was extracted from an
    /// archive. Returns false when no source has it or the path is not a
    /// plain relative path. Probe failures are logged and treated as a
    /// miss for that source; the chain keeps going.
    pub fn request_file(&self, relative_path: &str) -> bool {
        let relative = normalize_relative(relative_path);
        if !is_safe_relative(&relative) {
            warn!(path = relative_path, "rejecting unsafe asset path");
            return false;
        }

        let staged = self.staging_dir.join(&relative);
        if staged.is_file() {
            debug!(path = %relative, "already staged");
            return true;
        }

        let loose = self.app_dir.join(&relative);
        if loose.is_file() {
            return match materialize_parent(&staged).and_then(|()| fs::copy(&loose, &staged)) {
                Ok(_) => {
                    debug!(path = %relative, "staged from loose file");
                    true
                }
                Err(e) => {
                    warn!(path = %relative, error = %e, "failed to copy loose file");
                    false
                }
            };
        }

        for mounted in &self.archives {
            let stored = mounted.resolve(&relative);
            if !mounted.archive.exists(stored) {
                continue;
            }
            if let Err(e) = materialize_parent(&staged) {
                warn!(path = %relative, error = %e, "failed to create staging directory");
                return false;
            }
            match mounted.archive.extract_to_file(stored, &staged) {
                Ok(true) => {
                    debug!(
                        path = %relative,
                        archive = %mounted.archive.path().display(),
                        "staged from archive"
                    );
                    return true;
                }
                Ok(false) => continue,
                Err(e) => {
                    warn!(
                        path = %relative,
                        archive = %mounted.archive.path().display(),
                        error = %e,
                        "extraction failed, trying next archive"
                    );
                }
            }
        }

        debug!(path = %relative, "asset not found in any source");
        false
    }
}

/// Normalize a lookup path the way archive entry names are normalized.
fn normalize_relative(path: &str) -> String {
    path.replace('\\', "/").to_ascii_lowercase()
}

/// Only plain relative paths may touch the staging directory.
fn is_safe_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Create the parent directories of a staging target.
fn materialize_parent(staged: &Path) -> std::io::Result<()> {
    match staged.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

/// Load the `requested = stored` alias index beside an archive, if any.
///
/// Lines are `requested = stored`; blank lines and `#` comments are
/// skipped, and both sides are normalized like entry names. A missing or
/// unreadable index just means "no aliases".
fn load_alias_index(archive_path: &Path) -> HashMap<String, String> {
    let index_path = archive_path.with_extension(ALIAS_EXTENSION);
    let Ok(contents) = fs::read_to_string(&index_path) else {
        return HashMap::new();
    };

    let mut aliases = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((requested, stored)) = line.split_once('=') else {
            warn!(
                index = %index_path.display(),
                line,
                "ignoring malformed alias line"
            );
            continue;
        };
        aliases.insert(
            normalize_relative(requested.trim()),
            normalize_relative(stored.trim()),
        );
    }
    debug!(index = %index_path.display(), aliases = aliases.len(), "loaded alias index");
    aliases
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalization_matches_archive_identity() {
        assert_eq!(normalize_relative("Maps\\E1M1.BSP"), "maps/e1m1.bsp");
    }

    #[test]
    fn unsafe_paths_are_detected() {
        assert!(is_safe_relative("data/file.txt"));
        assert!(!is_safe_relative("../escape.txt"));
        assert!(!is_safe_relative("data/../../escape.txt"));
        assert!(!is_safe_relative("/etc/passwd"));
        assert!(!is_safe_relative(""));
    }
}
