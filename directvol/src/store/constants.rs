//! Storage layout constants.
//!
//! The on-disk contract shared with the consuming runtime: where volume
//! metadata lives and how tightly access to it is restricted.

/// Default root directory for the volume metadata tree.
pub const DEFAULT_ROOT: &str = "/run/direct-volumes";

/// Subdirectory of the root grouping all per-volume entries.
pub const NFS_DIR: &str = "nfs";

/// File inside a per-volume directory holding the serialized mount descriptor.
pub const MOUNT_INFO_FILE: &str = "mountInfo.json";

/// Mode for per-volume metadata directories, owner access only.
pub const VOLUME_DIR_MODE: u32 = 0o700;

/// Mode for the mount descriptor file, owner read/write only.
pub const MOUNT_INFO_FILE_MODE: u32 = 0o600;
