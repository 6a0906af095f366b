//! Cgroup v2 identity resolution.
//!
//! A PID's cgroup membership is read from `<proc>/<pid>/cgroup` and the
//! unified-hierarchy line is resolved to a directory under the cgroup
//! mount root. That directory's inode is the kernel-stable identity the
//! scheduler keys on: two processes in the same cgroup always stat to the
//! same inode, while the textual path is only locally meaningful.

use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

use error_stack::Report;
use error_stack::ResultExt;
use tokio::fs;
use tracing::debug;

use crate::config::Paths;

/// Kernel-stable identity of one cgroup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgroupIdentity {
    /// Inode of the cgroup directory, stable for the cgroup's lifetime.
    pub inode: u64,
    /// The statted path, kept for operator-facing messages.
    pub path: PathBuf,
}

/// Errors that can occur during cgroup identity resolution.
#[derive(Debug, derive_more::Display)]
pub enum CgroupError {
    #[display("Failed to read cgroup record of PID {pid}")]
    RecordUnreadable { pid: u32 },
    #[display("PID {pid} is not on the unified cgroup v2 hierarchy")]
    NotUnified { pid: u32 },
    #[display("Malformed cgroup record line: {line}")]
    MalformedRecord { line: String },
    #[display("Cgroup path {} cannot be statted", path.display())]
    PathUnresolvable { path: PathBuf },
}

impl core::error::Error for CgroupError {}

/// Resolves a host PID to the identity of its cgroup.
///
/// The PID may exit between task resolution and this read; that window is
/// inherent to the design and surfaces as [`CgroupError::RecordUnreadable`].
///
/// # Errors
///
/// - [`CgroupError::RecordUnreadable`] if `<proc>/<pid>/cgroup` cannot be read
/// - [`CgroupError::NotUnified`] if the record holds only legacy v1 lines
/// - [`CgroupError::MalformedRecord`] if the record cannot be parsed
/// - [`CgroupError::PathUnresolvable`] if the cgroup directory is gone or
///   not statable
pub async fn resolve_cgroup_identity(
    paths: &Paths,
    pid: u32,
) -> Result<CgroupIdentity, Report<CgroupError>> {
    let record_path = paths.proc_root.join(pid.to_string()).join("cgroup");
    let record = fs::read_to_string(&record_path)
        .await
        .change_context(CgroupError::RecordUnreadable { pid })
        .attach_printable_lazy(|| format!("while reading {}", record_path.display()))?;

    let cgroup_path = unified_cgroup_path(&record, pid)?;
    let full_path = paths.cgroup_root.join(cgroup_path.trim_start_matches('/'));

    let metadata = fs::metadata(&full_path)
        .await
        .change_context(CgroupError::PathUnresolvable {
            path: full_path.clone(),
        })?;

    let identity = CgroupIdentity {
        inode: metadata.ino(),
        path: full_path,
    };
    debug!(
        pid = pid,
        inode = identity.inode,
        path = %identity.path.display(),
        "Resolved cgroup identity"
    );
    Ok(identity)
}

/// Extracts the unified-hierarchy path from a `/proc/<pid>/cgroup` record.
///
/// The v2 line is `0::<path>`: hierarchy id zero with an empty controller
/// list. Legacy per-controller lines are skipped, never used as a
/// fallback; a record without a v2 line is a compatibility boundary this
/// tool refuses to guess across.
fn unified_cgroup_path(record: &str, pid: u32) -> Result<&str, Report<CgroupError>> {
    for line in record.lines() {
        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(3, ':');
        let (Some(hierarchy), Some(controllers), Some(path)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(Report::new(CgroupError::MalformedRecord {
                line: line.to_string(),
            }));
        };

        if hierarchy != "0" || !controllers.is_empty() {
            // legacy v1 line
            continue;
        }

        if !path.starts_with('/') {
            return Err(Report::new(CgroupError::MalformedRecord {
                line: line.to_string(),
            }));
        }

        return Ok(path);
    }

    Err(Report::new(CgroupError::NotUnified { pid }))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn selects_unified_line_among_legacy_lines() {
        let record = "12:cpu,cpuacct:/legacy\n1:name=systemd:/init.scope\n0::/kubepods/pod-a\n";
        assert_eq!(
            unified_cgroup_path(record, 1).unwrap(),
            "/kubepods/pod-a"
        );
    }

    #[test]
    fn legacy_only_record_is_not_unified() {
        let record = "12:cpu,cpuacct:/legacy\n1:name=systemd:/init.scope\n";
        let err = unified_cgroup_path(record, 4821).unwrap_err();
        assert!(matches!(
            err.current_context(),
            CgroupError::NotUnified { pid: 4821 }
        ));
    }

    #[test]
    fn empty_record_is_not_unified() {
        let err = unified_cgroup_path("", 7).unwrap_err();
        assert!(matches!(
            err.current_context(),
            CgroupError::NotUnified { pid: 7 }
        ));
    }

    #[test]
    fn unparseable_line_is_malformed() {
        let err = unified_cgroup_path("garbage\n", 1).unwrap_err();
        assert!(matches!(
            err.current_context(),
            CgroupError::MalformedRecord { .. }
        ));
    }

    #[test]
    fn unified_line_without_rooted_path_is_malformed() {
        let err = unified_cgroup_path("0::\n", 1).unwrap_err();
        assert!(matches!(
            err.current_context(),
            CgroupError::MalformedRecord { .. }
        ));
    }

    fn fixture_paths(root: &TempDir, pid: u32, record: &str, cgroup_dir: Option<&str>) -> Paths {
        let proc_root = root.path().join("proc");
        let cgroup_root = root.path().join("sys/fs/cgroup");
        std::fs::create_dir_all(proc_root.join(pid.to_string())).unwrap();
        std::fs::write(proc_root.join(pid.to_string()).join("cgroup"), record).unwrap();
        if let Some(dir) = cgroup_dir {
            std::fs::create_dir_all(cgroup_root.join(dir)).unwrap();
        } else {
            std::fs::create_dir_all(&cgroup_root).unwrap();
        }

        Paths {
            proc_root,
            cgroup_root,
            ..Default::default()
        }
    }

    #[test_log::test(tokio::test)]
    async fn resolves_inode_under_cgroup_root() {
        let root = TempDir::new().unwrap();
        let paths = fixture_paths(
            &root,
            4821,
            "0::/kubepods/burstable/podXYZ/abc123\n",
            Some("kubepods/burstable/podXYZ/abc123"),
        );

        let identity = resolve_cgroup_identity(&paths, 4821).await.unwrap();

        let expected = std::fs::metadata(
            paths
                .cgroup_root
                .join("kubepods/burstable/podXYZ/abc123"),
        )
        .unwrap();
        assert_eq!(identity.inode, expected.ino());
        assert_eq!(
            identity.path,
            paths.cgroup_root.join("kubepods/burstable/podXYZ/abc123")
        );
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let root = TempDir::new().unwrap();
        let paths = fixture_paths(&root, 99, "0::/pods/x\n", Some("pods/x"));

        let first = resolve_cgroup_identity(&paths, 99).await.unwrap();
        let second = resolve_cgroup_identity(&paths, 99).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_record_is_unreadable() {
        let root = TempDir::new().unwrap();
        let paths = Paths {
            proc_root: root.path().join("proc"),
            cgroup_root: root.path().join("sys/fs/cgroup"),
            ..Default::default()
        };

        let err = resolve_cgroup_identity(&paths, 12345).await.unwrap_err();
        assert!(matches!(
            err.current_context(),
            CgroupError::RecordUnreadable { pid: 12345 }
        ));
    }

    #[tokio::test]
    async fn missing_cgroup_directory_is_unresolvable() {
        let root = TempDir::new().unwrap();
        let paths = fixture_paths(&root, 7, "0::/pods/gone\n", None);

        let err = resolve_cgroup_identity(&paths, 7).await.unwrap_err();
        assert!(matches!(
            err.current_context(),
            CgroupError::PathUnresolvable { .. }
        ));
    }
}
