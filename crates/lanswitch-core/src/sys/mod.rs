// ── Command-backed host collaborators ──
//
// Every implementation here shells out through a shared `CommandRunner`,
// so swapping the runner is enough to observe what would run on a host.

mod dnsmasq;
mod ipset;
mod iproute;
mod iptables;

use std::process::Command;

use tokio::runtime::Handle;
use tracing::trace;

use crate::dataplane::{CommandRunner, Task, TaskSpawner};
use crate::error::CoreError;

pub use dnsmasq::{Dnsmasq, DnsmasqFactory};
pub use ipset::Ipset;
pub use iproute::IpRoute2;
pub use iptables::Iptables;

/// Runs programs with `std::process`, collecting stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String, CoreError> {
        trace!(program, args = %args.join(" "), "exec");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| CoreError::io(program, e))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            Err(CoreError::Command {
                program: program.to_owned(),
                args: args.join(" "),
                status: output.status.to_string(),
                output: combined.trim().to_owned(),
            })
        }
    }
}

/// Detaches work onto tokio's blocking pool, or a plain thread when no
/// runtime was around at construction.
#[derive(Debug, Clone, Default)]
pub struct TokioSpawner {
    handle: Option<Handle>,
}

impl TokioSpawner {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Capture the runtime the caller is running on, if any.
    pub fn current() -> Self {
        Self {
            handle: Handle::try_current().ok(),
        }
    }
}

impl TaskSpawner for TokioSpawner {
    fn submit(&self, task: Task) {
        match &self.handle {
            Some(handle) => {
                drop(handle.spawn_blocking(task));
            }
            None => {
                drop(std::thread::spawn(task));
            }
        }
    }
}

/// Convert borrowed argument lists into the owned form runners take.
pub(crate) fn argv<const N: usize>(args: [&str; N]) -> Vec<String> {
    args.iter().map(|&a| a.to_owned()).collect()
}
