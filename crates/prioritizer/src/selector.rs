//! Operator-facing workload selection.
//!
//! Thin by design: given the list of running containers on the node, pick
//! exactly one. Scriptable via `--pod`/`--container`, interactive as a
//! numbered stderr prompt otherwise.

use std::io::BufRead;
use std::io::Write;

use error_stack::Report;
use error_stack::ResultExt;

use crate::k8s::KubeWorkload;

/// Errors that can occur while selecting a workload.
#[derive(Debug, derive_more::Display)]
pub enum SelectionError {
    #[display("No running containers found on node {node_name}")]
    NoWorkloadsFound { node_name: String },
    #[display("No running container matches pod {pod}{}", container.as_ref().map(|c| format!(", container {c}")).unwrap_or_default())]
    WorkloadNotFound {
        pod: String,
        container: Option<String>,
    },
    #[display("Workload selection failed")]
    SelectionFailed,
}

impl core::error::Error for SelectionError {}

/// Picks exactly one workload from the node's running containers.
///
/// # Errors
///
/// - [`SelectionError::NoWorkloadsFound`] if the list is empty; this is
///   checked before any prompt is shown
/// - [`SelectionError::WorkloadNotFound`] if `--pod`/`--container` match
///   nothing
/// - [`SelectionError::SelectionFailed`] if the interactive prompt fails
pub fn select_workload<'a>(
    workloads: &'a [KubeWorkload],
    pod: Option<&str>,
    container: Option<&str>,
    node_name: &str,
) -> Result<&'a KubeWorkload, Report<SelectionError>> {
    if workloads.is_empty() {
        return Err(Report::new(SelectionError::NoWorkloadsFound {
            node_name: node_name.to_string(),
        }));
    }

    match pod {
        Some(pod) => select_by_name(workloads, pod, container),
        None => prompt_selection(workloads),
    }
}

fn select_by_name<'a>(
    workloads: &'a [KubeWorkload],
    pod: &str,
    container: Option<&str>,
) -> Result<&'a KubeWorkload, Report<SelectionError>> {
    workloads
        .iter()
        .find(|workload| {
            workload.pod_name == pod
                && container.map_or(true, |name| workload.container_name == name)
        })
        .ok_or_else(|| {
            Report::new(SelectionError::WorkloadNotFound {
                pod: pod.to_string(),
                container: container.map(|c| c.to_string()),
            })
        })
}

fn prompt_selection(workloads: &[KubeWorkload]) -> Result<&KubeWorkload, Report<SelectionError>> {
    let mut stderr = std::io::stderr().lock();

    writeln!(stderr, "Choose a container to prioritize:")
        .change_context(SelectionError::SelectionFailed)?;
    for (index, workload) in workloads.iter().enumerate() {
        writeln!(
            stderr,
            "  [{}] {}/{} container {}",
            index + 1,
            workload.namespace,
            workload.pod_name,
            workload.container_name
        )
        .change_context(SelectionError::SelectionFailed)?;
    }
    write!(stderr, "Selection [1-{}]: ", workloads.len())
        .change_context(SelectionError::SelectionFailed)?;
    stderr
        .flush()
        .change_context(SelectionError::SelectionFailed)?;

    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .change_context(SelectionError::SelectionFailed)?;

    let index = parse_choice(&input, workloads.len())?;
    Ok(&workloads[index])
}

/// Parses a 1-based prompt answer into a list index.
fn parse_choice(input: &str, len: usize) -> Result<usize, Report<SelectionError>> {
    let choice: usize = input
        .trim()
        .parse::<usize>()
        .change_context(SelectionError::SelectionFailed)
        .attach_printable_lazy(|| format!("not a selection index: {:?}", input.trim()))?;

    if choice == 0 || choice > len {
        return Err(Report::new(SelectionError::SelectionFailed)
            .attach_printable(format!("selection {choice} out of range 1-{len}")));
    }

    Ok(choice - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload(pod: &str, container: &str) -> KubeWorkload {
        KubeWorkload {
            namespace: "default".to_string(),
            pod_name: pod.to_string(),
            container_name: container.to_string(),
            container_id: format!("containerd://{pod}-{container}"),
        }
    }

    #[test]
    fn empty_list_fails_before_any_prompt() {
        let err = select_workload(&[], None, None, "node-a").unwrap_err();
        assert!(matches!(
            err.current_context(),
            SelectionError::NoWorkloadsFound { .. }
        ));
    }

    #[test]
    fn selects_by_pod_name() {
        let workloads = vec![workload("web", "app"), workload("db", "postgres")];

        let selected = select_workload(&workloads, Some("db"), None, "node-a").unwrap();
        assert_eq!(selected.container_name, "postgres");
    }

    #[test]
    fn selects_by_pod_and_container_name() {
        let workloads = vec![
            workload("web", "app"),
            workload("web", "sidecar"),
        ];

        let selected = select_workload(&workloads, Some("web"), Some("sidecar"), "node-a").unwrap();
        assert_eq!(selected.container_name, "sidecar");
    }

    #[test]
    fn missing_pod_is_reported() {
        let workloads = vec![workload("web", "app")];

        let err = select_workload(&workloads, Some("db"), None, "node-a").unwrap_err();
        assert!(matches!(
            err.current_context(),
            SelectionError::WorkloadNotFound { .. }
        ));
    }

    #[test]
    fn container_filter_must_match_within_pod() {
        let workloads = vec![workload("web", "app")];

        let err = select_workload(&workloads, Some("web"), Some("sidecar"), "node-a").unwrap_err();
        assert!(matches!(
            err.current_context(),
            SelectionError::WorkloadNotFound { .. }
        ));
    }

    #[test]
    fn parses_one_based_choices() {
        assert_eq!(parse_choice("1\n", 3).unwrap(), 0);
        assert_eq!(parse_choice(" 3 \n", 3).unwrap(), 2);
    }

    #[test]
    fn rejects_out_of_range_and_garbage_choices() {
        assert!(parse_choice("0\n", 3).is_err());
        assert!(parse_choice("4\n", 3).is_err());
        assert!(parse_choice("abc\n", 3).is_err());
        assert!(parse_choice("\n", 3).is_err());
    }
}
