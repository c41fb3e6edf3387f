//! Execution endpoint: where the extraction workers run.
//!
//! Only in-process execution exists. Endpoint strings follow the familiar `local`, `local[*]`,
//! `local[N]` convention; anything else is an unavailable capability.

use std::fmt;

use crate::error::{PackError, Result};
use crate::utils::config::WorkerThreadLimits;
use crate::utils::fd_limit::cap_workers_by_fd_limit;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionEndpoint {
    /// `local` (one worker), `local[N]` (N workers) or `local[*]` (`threads: None`, all threads).
    Local { threads: Option<usize> },
}

impl ExecutionEndpoint {
    pub fn parse(endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint == "local" {
            return Ok(ExecutionEndpoint::Local { threads: Some(1) });
        }
        let inner = endpoint
            .strip_prefix("local[")
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| unavailable(endpoint))?;
        match inner {
            "*" => Ok(ExecutionEndpoint::Local { threads: None }),
            n => match n.parse::<usize>() {
                Ok(n) if n > 0 => Ok(ExecutionEndpoint::Local { threads: Some(n) }),
                _ => Err(PackError::invalid_input(
                    endpoint,
                    "worker count must be a positive integer or *",
                )),
            },
        }
    }

    /// Number of workers (and output shards): explicit override, else the endpoint's count,
    /// clamped to the thread limits and the FD limit.
    pub fn worker_count(&self, override_count: Option<usize>, limits: &WorkerThreadLimits) -> usize {
        let ExecutionEndpoint::Local { threads } = *self;
        let requested = override_count
            .or(threads)
            .unwrap_or(limits.all_threads)
            .clamp(limits.floor, limits.max);
        cap_workers_by_fd_limit(requested)
    }
}

impl fmt::Display for ExecutionEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionEndpoint::Local { threads: None } => write!(f, "local[*]"),
            ExecutionEndpoint::Local { threads: Some(n) } => write!(f, "local[{n}]"),
        }
    }
}

fn unavailable(endpoint: &str) -> PackError {
    PackError::CapabilityUnavailable(format!(
        "no execution capability for endpoint {endpoint:?}; available: local, local[*], local[N]"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_forms() {
        assert_eq!(
            ExecutionEndpoint::parse("local").unwrap(),
            ExecutionEndpoint::Local { threads: Some(1) }
        );
        assert_eq!(
            ExecutionEndpoint::parse("local[*]").unwrap(),
            ExecutionEndpoint::Local { threads: None }
        );
        assert_eq!(
            ExecutionEndpoint::parse("local[3]").unwrap(),
            ExecutionEndpoint::Local { threads: Some(3) }
        );
    }

    #[test]
    fn remote_endpoint_is_unavailable() {
        assert!(matches!(
            ExecutionEndpoint::parse("spark://cluster:7077"),
            Err(PackError::CapabilityUnavailable(_))
        ));
    }

    #[test]
    fn zero_workers_is_invalid() {
        assert!(matches!(
            ExecutionEndpoint::parse("local[0]"),
            Err(PackError::InvalidInput { .. })
        ));
    }

    #[test]
    fn worker_count_prefers_override() {
        let limits = WorkerThreadLimits {
            all_threads: 8,
            ..Default::default()
        };
        let local_all = ExecutionEndpoint::Local { threads: None };
        assert_eq!(local_all.worker_count(Some(2), &limits), 2);
        assert_eq!(local_all.worker_count(None, &limits), 8);
        let local_one = ExecutionEndpoint::Local { threads: Some(1) };
        assert_eq!(local_one.worker_count(None, &limits), 1);
    }
}
