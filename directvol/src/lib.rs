//! Persisted mount metadata for direct volumes.
//!
//! A direct volume is a host block device or network filesystem export that
//! a VM-based container runtime attaches to a guest outside the normal
//! container image filesystem. The provisioning side records *how* to mount
//! each volume; the runtime later reads that record back and performs the
//! mount inside the guest.
//!
//! This crate owns the on-disk contract between the two sides: a
//! [`DirectVolumeStore`] keeps one JSON mount descriptor ([`MountInfo`]) per
//! volume under a deterministic, collision-free path derived from the
//! volume's identifier.
//!
//! ```rust,no_run
//! use directvol::DirectVolumeStore;
//!
//! # fn main() -> directvol::DirectVolumeResult<()> {
//! let store = DirectVolumeStore::with_defaults();
//! store.add_network_volume("/mnt/vol1", "10.0.0.1", "/export", "nfs")?;
//!
//! let info = store.mount_info("/mnt/vol1")?;
//! assert_eq!(info.fstype, "nfs");
//!
//! store.remove("/mnt/vol1")?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod mount_info;
pub mod store;

pub use errors::{DirectVolumeError, DirectVolumeResult};
pub use mount_info::{FsGroupChangePolicy, MountInfo};
pub use store::{DEFAULT_ROOT, DirectVolumeStore};
