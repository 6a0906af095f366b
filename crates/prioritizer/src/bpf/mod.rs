//! Priority map publishing.
//!
//! The sched_ext scheduler owns a pinned BPF hash map keyed by host PID
//! with the cgroup inode as value. This module only writes entries into
//! it; the map is never created, resized, or verified back here. A write
//! for an existing PID overwrites the previous entry, so republishing the
//! same pair is a no-op in effect.

use std::mem::size_of;
use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use libbpf_rs::MapCore;
use libbpf_rs::MapFlags;
use libbpf_rs::MapHandle;
use tracing::debug;

use crate::config::Paths;

/// Errors that can occur while publishing a priority hint.
#[derive(Debug, derive_more::Display)]
pub enum PublishError {
    #[display("Priority map not found at {}; is the sched_ext scheduler running?", path.display())]
    TableUnavailable { path: PathBuf },
    #[display(
        "Priority map has key/value widths {key_size}/{value_size}, expected 4/8; refusing to truncate"
    )]
    TableShapeMismatch { key_size: u32, value_size: u32 },
    #[display("Failed to write priority entry for PID {pid}")]
    UpdateFailed { pid: u32 },
}

impl core::error::Error for PublishError {}

/// Upserts the `(pid, cgroup inode)` entry into the pinned priority map.
///
/// The entry uses the map's own single-key write primitive; there is no
/// batching and no read-back. The PID may be reused by an unrelated
/// process before the scheduler consults the entry; that race is a known
/// limitation of hinting by PID, not something this layer can close. The
/// map handle is dropped on every exit path.
///
/// # Errors
///
/// - [`PublishError::TableUnavailable`] if nothing is pinned at the map
///   path, which means the scheduler consuming the hints is not running
/// - [`PublishError::TableShapeMismatch`] if the pinned map's key or
///   value width differs from the `u32`/`u64` layout published here
/// - [`PublishError::UpdateFailed`] if the map write itself fails
pub fn publish_priority_hint(
    paths: &Paths,
    pid: u32,
    cgroup_inode: u64,
) -> Result<(), Report<PublishError>> {
    let map = MapHandle::from_pinned_path(&paths.priority_map_path).change_context(
        PublishError::TableUnavailable {
            path: paths.priority_map_path.clone(),
        },
    )?;

    check_table_shape(map.key_size(), map.value_size())?;

    map.update(
        &pid.to_ne_bytes(),
        &cgroup_inode.to_ne_bytes(),
        MapFlags::ANY,
    )
    .change_context(PublishError::UpdateFailed { pid })?;

    debug!(
        pid = pid,
        cgroup_inode = cgroup_inode,
        map = %paths.priority_map_path.display(),
        "Published priority entry"
    );
    Ok(())
}

/// Fails fast when the pinned map's layout differs from the one published.
///
/// A narrower value slot would silently truncate the 64-bit cgroup inode,
/// which is worse than refusing to write at all.
fn check_table_shape(key_size: u32, value_size: u32) -> Result<(), Report<PublishError>> {
    if key_size as usize != size_of::<u32>() || value_size as usize != size_of::<u64>() {
        return Err(Report::new(PublishError::TableShapeMismatch {
            key_size,
            value_size,
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_u32_key_u64_value() {
        assert!(check_table_shape(4, 8).is_ok());
    }

    #[test]
    fn rejects_narrow_value_slot() {
        let err = check_table_shape(4, 4).unwrap_err();
        assert!(matches!(
            err.current_context(),
            PublishError::TableShapeMismatch {
                key_size: 4,
                value_size: 4
            }
        ));
    }

    #[test]
    fn rejects_wide_key_slot() {
        assert!(check_table_shape(8, 8).is_err());
    }

    #[test]
    fn unavailable_table_points_at_the_scheduler() {
        let message = PublishError::TableUnavailable {
            path: PathBuf::from("/sys/fs/bpf/priority_pids"),
        }
        .to_string();

        assert!(message.contains("/sys/fs/bpf/priority_pids"));
        assert!(message.contains("scheduler"));
    }

    #[test]
    fn shape_mismatch_names_both_widths() {
        let message = PublishError::TableShapeMismatch {
            key_size: 4,
            value_size: 4,
        }
        .to_string();

        assert!(message.contains("4/4"));
        assert!(message.contains("refusing to truncate"));
    }
}
