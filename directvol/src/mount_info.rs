//! Mount descriptor model for direct volumes.
//!
//! A descriptor tells the consuming runtime everything it needs to mount a
//! volume inside the guest: what backs the volume, which filesystem to
//! mount, and free-form metadata the runtime may act on (group ownership
//! hints, extra mount options).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Volume type for filesystem-backed volumes, including network exports.
pub const VOLUME_TYPE_FS: &str = "fs";

/// Volume type for raw block device volumes.
pub const VOLUME_TYPE_BLOCK: &str = "block";

/// Metadata key carrying the numeric group id to apply to volume contents.
pub const METADATA_FS_GROUP: &str = "fsGroup";

/// Metadata key carrying the [`FsGroupChangePolicy`] for the volume.
pub const METADATA_FS_GROUP_CHANGE_POLICY: &str = "fsGroupChangePolicy";

/// The mount descriptor persisted for a direct volume.
///
/// All fields tolerate being absent on the wire; empty `metadata` and
/// `options` are omitted when serializing. Unknown keys are ignored so
/// descriptors written by newer provisioners still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountInfo {
    /// The type of the volume, see [`VOLUME_TYPE_FS`] and [`VOLUME_TYPE_BLOCK`].
    #[serde(rename = "volume-type")]
    pub volume_type: String,
    /// The device backing the volume. Empty for network filesystems.
    pub device: String,
    /// The filesystem type to mount.
    pub fstype: String,
    /// Additional metadata passed through to the consumer.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    /// Additional mount options.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl MountInfo {
    /// Descriptor for a network filesystem export.
    ///
    /// The export source (for NFS, `server:base_dir`) travels as the single
    /// mount option; no backing device is recorded.
    pub fn network_fs(fstype: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            volume_type: VOLUME_TYPE_FS.to_string(),
            fstype: fstype.into(),
            options: vec![source.into()],
            ..Self::default()
        }
    }
}

/// Policy for applying group ownership changes before exposing a volume.
///
/// Provisioners forward the pod-level policy through descriptor metadata
/// under [`METADATA_FS_GROUP_CHANGE_POLICY`]; the consumer decides how to
/// honor it when preparing the mount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsGroupChangePolicy {
    /// Always change ownership and permissions of the volume contents.
    #[default]
    Always,
    /// Only change ownership when the volume root does not already match.
    OnRootMismatch,
}

impl FsGroupChangePolicy {
    /// Wire representation, as stored in descriptor metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "Always",
            Self::OnRootMismatch => "OnRootMismatch",
        }
    }
}
