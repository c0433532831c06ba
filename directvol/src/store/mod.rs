//! Filesystem-backed store for direct-volume mount descriptors.
//!
//! The store maps an opaque volume path to a directory under a configurable
//! root and keeps a single JSON descriptor file inside it:
//!
//! ```text
//! <root>/nfs/<base64url(volume_path)>/mountInfo.json
//! ```
//!
//! The directory name is the URL-safe base64 encoding of the volume path,
//! so distinct volumes never collide and any input characters produce a
//! filesystem-safe name. A separate runtime component consumes the
//! descriptor to perform the actual mount inside the guest; this module
//! only owns the on-disk contract.

mod constants;

use std::fs::{self, DirBuilder, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;

use crate::errors::{DirectVolumeError, DirectVolumeResult};
use crate::mount_info::MountInfo;

pub use constants::{DEFAULT_ROOT, MOUNT_INFO_FILE, MOUNT_INFO_FILE_MODE, NFS_DIR, VOLUME_DIR_MODE};

/// Store for direct-volume mount descriptors.
///
/// All operations are plain filesystem accesses relative to the store root,
/// which makes the store cheap to clone and trivial to point at a scratch
/// directory in tests.
#[derive(Debug, Clone)]
pub struct DirectVolumeStore {
    root: PathBuf,
}

impl DirectVolumeStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store rooted at the well-known default, [`DEFAULT_ROOT`].
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_ROOT)
    }

    /// Root directory this store operates under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the metadata for `volume_path`.
    pub fn volume_dir(&self, volume_path: &str) -> PathBuf {
        self.root.join(NFS_DIR).join(URL_SAFE.encode(volume_path))
    }

    /// Persist a mount descriptor for `volume_path`.
    ///
    /// The descriptor must parse as [`MountInfo`]; the raw bytes are then
    /// written untouched, so the consumer reads back exactly what the
    /// caller provided. A prior descriptor for the same volume is replaced
    /// whole.
    ///
    /// # Errors
    ///
    /// - [`DirectVolumeError::NotADirectory`] if the metadata path exists
    ///   but is not a directory
    /// - [`DirectVolumeError::InvalidDescriptor`] if the descriptor is not
    ///   valid JSON for the schema
    /// - [`DirectVolumeError::Io`] for any other filesystem failure
    pub fn add(&self, volume_path: &str, mount_info_json: &str) -> DirectVolumeResult<()> {
        let dir = self.volume_dir(volume_path);
        ensure_volume_dir(&dir)?;

        serde_json::from_str::<MountInfo>(mount_info_json)
            .map_err(DirectVolumeError::InvalidDescriptor)?;

        write_descriptor(&dir.join(MOUNT_INFO_FILE), mount_info_json)?;

        tracing::debug!(
            volume = volume_path,
            dir = %dir.display(),
            "persisted mount descriptor"
        );
        Ok(())
    }

    /// Persist a descriptor for a network filesystem export.
    ///
    /// Convenience over [`add`](Self::add): builds the descriptor from its
    /// parts, with `server:base_dir` as the mount source, and persists it.
    /// Failures are logged and reported as [`DirectVolumeError::Internal`]
    /// with the concrete cause chained underneath.
    pub fn add_network_volume(
        &self,
        volume_path: &str,
        server: &str,
        base_dir: &str,
        fs_type: &str,
    ) -> DirectVolumeResult<()> {
        let info = MountInfo::network_fs(fs_type, format!("{server}:{base_dir}"));
        let serialized = match serde_json::to_string(&info) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::error!(
                    volume = volume_path,
                    error = %e,
                    "serializing mount descriptor failed"
                );
                return Err(DirectVolumeError::internal(
                    "serializing mount descriptor failed",
                    DirectVolumeError::InvalidDescriptor(e),
                ));
            }
        };

        if let Err(e) = self.add(volume_path, &serialized) {
            tracing::error!(volume = volume_path, error = %e, "adding network volume failed");
            return Err(DirectVolumeError::internal(
                "adding network volume failed",
                e,
            ));
        }

        tracing::info!(
            volume = volume_path,
            descriptor = %serialized,
            "added network volume"
        );
        Ok(())
    }

    /// Load the mount descriptor recorded for `volume_path`.
    ///
    /// # Errors
    ///
    /// - [`DirectVolumeError::NotFound`] if no descriptor was recorded
    /// - [`DirectVolumeError::InvalidDescriptor`] if the recorded file no
    ///   longer parses
    /// - [`DirectVolumeError::Io`] for any other filesystem failure
    pub fn mount_info(&self, volume_path: &str) -> DirectVolumeResult<MountInfo> {
        let file = self.volume_dir(volume_path).join(MOUNT_INFO_FILE);
        let contents = match fs::read_to_string(&file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DirectVolumeError::NotFound(volume_path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents).map_err(DirectVolumeError::InvalidDescriptor)
    }

    /// Delete all metadata recorded for `volume_path`.
    ///
    /// Removes the whole per-volume directory. Removing a volume that was
    /// never added, or was already removed, succeeds.
    pub fn remove(&self, volume_path: &str) -> DirectVolumeResult<()> {
        let dir = self.volume_dir(volume_path);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::debug!(
                    volume = volume_path,
                    dir = %dir.display(),
                    "removed volume metadata"
                );
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Create the per-volume directory, tolerating an existing one.
///
/// Creation is unconditional and recursive, so there is no window between
/// an existence check and the create call. A path already occupied by a
/// non-directory is reported as [`DirectVolumeError::NotADirectory`].
fn ensure_volume_dir(dir: &Path) -> DirectVolumeResult<()> {
    let created = DirBuilder::new()
        .recursive(true)
        .mode(VOLUME_DIR_MODE)
        .create(dir);
    if let Err(e) = created {
        return match fs::symlink_metadata(dir) {
            Ok(meta) if !meta.is_dir() => Err(DirectVolumeError::NotADirectory(dir.to_path_buf())),
            _ => Err(e.into()),
        };
    }
    Ok(())
}

/// Write descriptor bytes at owner-only mode, truncating prior content.
fn write_descriptor(path: &Path, contents: &str) -> DirectVolumeResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(MOUNT_INFO_FILE_MODE)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mount_info::VOLUME_TYPE_FS;
    use std::error::Error as _;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    const VOL1_DESCRIPTOR: &str =
        r#"{"volume-type":"fs","fstype":"nfs","options":["10.0.0.1:/export"]}"#;

    fn scratch_store() -> (TempDir, DirectVolumeStore) {
        let tmp = TempDir::new().unwrap();
        let store = DirectVolumeStore::new(tmp.path());
        (tmp, store)
    }

    #[test]
    fn test_with_defaults_uses_well_known_root() {
        assert_eq!(
            DirectVolumeStore::with_defaults().root(),
            Path::new(DEFAULT_ROOT)
        );
    }

    #[test]
    fn test_volume_dir_is_injective_and_decodable() {
        let (_tmp, store) = scratch_store();
        let a = store.volume_dir("/mnt/vol1");
        let b = store.volume_dir("/mnt/vol2");
        assert_ne!(a, b);
        assert!(a.starts_with(store.root().join(NFS_DIR)));

        let encoded = a.file_name().unwrap().to_str().unwrap();
        assert_eq!(URL_SAFE.decode(encoded).unwrap(), b"/mnt/vol1");
    }

    #[test]
    fn test_volume_dir_names_are_filesystem_safe() {
        let (_tmp, store) = scratch_store();
        // "~~~" and "???" hit the alphabet positions where standard base64
        // would emit '+' and '/'.
        for volume in ["/mnt/~~~", "/mnt/???", "a/b/c/d"] {
            let dir = store.volume_dir(volume);
            let name = dir.file_name().unwrap().to_str().unwrap();
            assert!(!name.contains('/'), "{name} contains a path separator");
            assert!(!name.contains('+'), "{name} is not URL-safe");
        }
    }

    #[test]
    fn test_add_writes_descriptor_byte_identical() {
        let (_tmp, store) = scratch_store();
        store.add("/mnt/vol1", VOL1_DESCRIPTOR).unwrap();

        let file = store.volume_dir("/mnt/vol1").join(MOUNT_INFO_FILE);
        assert_eq!(fs::read_to_string(&file).unwrap(), VOL1_DESCRIPTOR);
    }

    #[test]
    fn test_add_overwrites_previous_descriptor() {
        let (_tmp, store) = scratch_store();
        store.add("/mnt/vol1", VOL1_DESCRIPTOR).unwrap();

        let replacement = r#"{"volume-type":"block","device":"/dev/vdb","fstype":"ext4"}"#;
        store.add("/mnt/vol1", replacement).unwrap();

        let file = store.volume_dir("/mnt/vol1").join(MOUNT_INFO_FILE);
        assert_eq!(fs::read_to_string(&file).unwrap(), replacement);
    }

    #[test]
    fn test_add_rejects_malformed_descriptor() {
        let (_tmp, store) = scratch_store();
        for bad in ["{not json", r#"{"volume-type":3}"#, "[]"] {
            let err = store.add("/mnt/vol1", bad).unwrap_err();
            assert!(
                matches!(err, DirectVolumeError::InvalidDescriptor(_)),
                "expected InvalidDescriptor for {bad:?}, got {err:?}"
            );
        }
        // The directory is created before validation and stays behind;
        // the descriptor file is never written.
        assert!(store.volume_dir("/mnt/vol1").is_dir());
        assert!(!store.volume_dir("/mnt/vol1").join(MOUNT_INFO_FILE).exists());
    }

    #[test]
    fn test_add_fails_when_metadata_path_is_a_file() {
        let (_tmp, store) = scratch_store();
        fs::create_dir_all(store.root().join(NFS_DIR)).unwrap();
        fs::write(store.volume_dir("/mnt/vol1"), b"stale").unwrap();

        let err = store.add("/mnt/vol1", VOL1_DESCRIPTOR).unwrap_err();
        assert!(matches!(err, DirectVolumeError::NotADirectory(_)));
    }

    #[test]
    fn test_permissions_restrict_to_owner() {
        let (_tmp, store) = scratch_store();
        store.add("/mnt/vol1", VOL1_DESCRIPTOR).unwrap();

        let dir = store.volume_dir("/mnt/vol1");
        let dir_mode = fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, VOLUME_DIR_MODE);

        let file = dir.join(MOUNT_INFO_FILE);
        let file_mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, MOUNT_INFO_FILE_MODE);
    }

    #[test]
    fn test_mount_info_round_trip() {
        let (_tmp, store) = scratch_store();
        store.add("/mnt/vol1", VOL1_DESCRIPTOR).unwrap();

        let info = store.mount_info("/mnt/vol1").unwrap();
        assert_eq!(info.volume_type, VOLUME_TYPE_FS);
        assert_eq!(info.fstype, "nfs");
        assert_eq!(info.options, vec!["10.0.0.1:/export"]);
        assert!(info.device.is_empty());
    }

    #[test]
    fn test_mount_info_for_missing_volume() {
        let (_tmp, store) = scratch_store();
        let err = store.mount_info("/mnt/none").unwrap_err();
        assert!(matches!(err, DirectVolumeError::NotFound(v) if v == "/mnt/none"));
    }

    #[test]
    fn test_remove_missing_volume_is_ok() {
        let (_tmp, store) = scratch_store();
        store.remove("/mnt/never-added").unwrap();
    }

    #[test]
    fn test_add_then_remove_leaves_nothing() {
        let (_tmp, store) = scratch_store();
        store.add("/mnt/vol1", VOL1_DESCRIPTOR).unwrap();

        let dir = store.volume_dir("/mnt/vol1");
        fs::write(dir.join("extra"), b"scratch").unwrap();

        store.remove("/mnt/vol1").unwrap();
        assert!(!dir.exists());

        // Removing again is still fine.
        store.remove("/mnt/vol1").unwrap();
    }

    #[test]
    fn test_add_network_volume_writes_expected_descriptor() {
        let (_tmp, store) = scratch_store();
        store
            .add_network_volume("/mnt/vol1", "10.0.0.1", "/export", "nfs")
            .unwrap();

        let file = store.volume_dir("/mnt/vol1").join(MOUNT_INFO_FILE);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            r#"{"volume-type":"fs","device":"","fstype":"nfs","options":["10.0.0.1:/export"]}"#
        );
    }

    #[test]
    fn test_add_network_volume_chains_the_cause() {
        let (_tmp, store) = scratch_store();
        fs::create_dir_all(store.root().join(NFS_DIR)).unwrap();
        fs::write(store.volume_dir("/mnt/vol1"), b"stale").unwrap();

        let err = store
            .add_network_volume("/mnt/vol1", "10.0.0.1", "/export", "nfs")
            .unwrap_err();
        assert!(err.source().is_some());
        match err {
            DirectVolumeError::Internal { source, .. } => {
                assert!(matches!(*source, DirectVolumeError::NotADirectory(_)));
            }
            other => panic!("expected Internal, got {other:?}"),
        }
    }
}
