//! Tarball verification and extraction into the cache

use base64::Engine;
use flate2::read::GzDecoder;
use sha2::{Digest, Sha512};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Check `bytes` against an SRI string (`sha512-<base64>`).
///
/// Returns `false` on mismatch. Algorithms other than sha512 are not
/// verified and pass with a debug log.
pub fn verify_integrity(bytes: &[u8], integrity: &str) -> bool {
    // a string may list several hashes separated by whitespace
    let mut checked = false;
    for candidate in integrity.split_whitespace() {
        let Some(expected) = candidate.strip_prefix("sha512-") else {
            continue;
        };
        checked = true;
        let actual = base64::engine::general_purpose::STANDARD.encode(Sha512::digest(bytes));
        if actual == expected {
            return true;
        }
    }
    if !checked {
        debug!("No sha512 digest in integrity '{}', skipping check", integrity);
    }
    !checked
}

/// Relative path of a tarball entry with its top-level folder removed.
///
/// npm tarballs wrap content in a single folder (usually `package/`).
/// Entries that would escape the destination are rejected.
fn strip_top_level(entry_path: &Path) -> io::Result<Option<PathBuf>> {
    let mut out = PathBuf::new();
    for (i, component) in entry_path.components().enumerate() {
        match component {
            Component::Normal(seg) if i > 0 => out.push(seg),
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Path escapes destination: {}", entry_path.display()),
                ));
            }
        }
    }
    Ok((!out.as_os_str().is_empty()).then_some(out))
}

/// Unpack a gzipped tarball into `dest`, stripping the top-level folder.
fn unpack(bytes: &[u8], dest: &Path) -> io::Result<()> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();
        let Some(relative) = strip_top_level(&entry_path)? else {
            continue;
        };
        let out = dest.join(&relative);

        match entry.header().entry_type() {
            tar::EntryType::Directory => std::fs::create_dir_all(&out)?,
            tar::EntryType::Regular | tar::EntryType::Continuous => {
                if let Some(parent) = out.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut file = std::fs::File::create(&out)?;
                io::copy(&mut entry, &mut file)?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    if let Ok(mode) = entry.header().mode() {
                        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(mode))?;
                    }
                }
            }
            tar::EntryType::Symlink | tar::EntryType::Link => {
                warn!("Skipping link in package tarball: {}", entry_path.display());
            }
            _ => {}
        }
    }
    Ok(())
}

/// Extract `bytes` into `staging`, then move it onto `dest`.
///
/// The staging directory is removed on failure so `dest` either holds the
/// complete package or does not exist. If `dest` appeared in the meantime
/// (another relay process installed it) the existing entry is kept.
pub fn install_tarball(bytes: &[u8], staging: &Path, dest: &Path) -> io::Result<()> {
    let result = unpack(bytes, staging).and_then(|()| {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if dest.exists() {
            debug!("{} appeared during install, keeping it", dest.display());
            std::fs::remove_dir_all(staging)
        } else {
            std::fs::rename(staging, dest)
        }
    });

    if result.is_err() && staging.exists() {
        if let Err(e) = std::fs::remove_dir_all(staging) {
            warn!("Failed to remove staging dir {}: {}", staging.display(), e);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::testing::{sri_sha512, tarball};
    use tempfile::TempDir;

    #[test]
    fn integrity_matches_sha512() {
        let bytes = b"package bytes";
        assert!(verify_integrity(bytes, &sri_sha512(bytes)));
        assert!(!verify_integrity(bytes, &sri_sha512(b"other bytes")));
    }

    #[test]
    fn integrity_accepts_any_listed_sha512() {
        let bytes = b"package bytes";
        let list = format!("{} {}", sri_sha512(b"old"), sri_sha512(bytes));
        assert!(verify_integrity(bytes, &list));
    }

    #[test]
    fn integrity_without_sha512_is_unchecked() {
        assert!(verify_integrity(b"x", "sha1-deadbeef"));
    }

    #[test]
    fn strip_top_level_removes_package_folder() {
        assert_eq!(
            strip_top_level(Path::new("package/lib/index.js")).unwrap(),
            Some(PathBuf::from("lib/index.js"))
        );
        assert_eq!(strip_top_level(Path::new("package/")).unwrap(), None);
    }

    #[test]
    fn strip_top_level_rejects_traversal() {
        assert!(strip_top_level(Path::new("package/../../etc/passwd")).is_err());
        assert!(strip_top_level(Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn install_moves_staging_onto_dest() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join(".staging-1");
        let dest = temp.path().join("_pkg@1.0.0@pkg");
        let bytes = tarball(&[
            ("package.json", r#"{"main":"lib/index.js"}"#, 0o644),
            ("lib/index.js", "module.exports = 1", 0o644),
        ]);

        install_tarball(&bytes, &staging, &dest).unwrap();

        assert!(dest.join("package.json").is_file());
        assert!(dest.join("lib/index.js").is_file());
        assert!(!staging.exists());
    }

    #[test]
    fn corrupt_tarball_leaves_nothing_behind() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join(".staging-1");
        let dest = temp.path().join("_pkg@1.0.0@pkg");

        assert!(install_tarball(b"not a tarball", &staging, &dest).is_err());
        assert!(!staging.exists());
        assert!(!dest.exists());
    }
}
