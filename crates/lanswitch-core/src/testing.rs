// ── Test doubles for host collaborators ──

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::dataplane::{
    CommandRunner, Dataplane, ServiceFactory, SubService, Task, TaskSpawner,
};
use crate::error::CoreError;
use crate::model::ServiceConfig;
use crate::sys::{IpRoute2, Ipset, Iptables};

/// Records every command line; configured prefixes fail or reply.
#[derive(Default)]
pub(crate) struct RecordingRunner {
    calls: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
    replies: Mutex<Vec<(String, String)>>,
}

impl RecordingRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make every command line starting with `prefix` exit non-zero.
    pub(crate) fn fail_on(&self, prefix: &str) {
        self.failures.lock().unwrap().push(prefix.to_owned());
    }

    /// Answer command lines starting with `prefix` with `output`.
    pub(crate) fn reply(&self, prefix: &str, output: &str) {
        self.replies
            .lock()
            .unwrap()
            .push((prefix.to_owned(), output.to_owned()));
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, program: &str) -> Vec<String> {
        let prefix = format!("{program} ");
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(&prefix))
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String, CoreError> {
        let line = format!("{program} {}", args.join(" "));
        self.calls.lock().unwrap().push(line.clone());

        if self
            .failures
            .lock()
            .unwrap()
            .iter()
            .any(|p| line.starts_with(p.as_str()))
        {
            return Err(CoreError::Command {
                program: program.to_owned(),
                args: args.join(" "),
                status: "exit status: 1".into(),
                output: "injected failure".into(),
            });
        }

        let replies = self.replies.lock().unwrap();
        let reply = replies
            .iter()
            .find(|(p, _)| line.starts_with(p.as_str()))
            .map(|(_, out)| out.clone());
        Ok(reply.unwrap_or_else(|| {
            // `ip -o link show` needs an index to parse.
            if line.starts_with("ip -o link show") {
                "1: stub: <UP> mtu 1500".to_owned()
            } else {
                String::new()
            }
        }))
    }
}

/// Runs submitted work immediately on the caller's thread.
pub(crate) struct InlineSpawner;

impl TaskSpawner for InlineSpawner {
    fn submit(&self, task: Task) {
        task();
    }
}

/// Queues submitted work until the test releases it.
#[derive(Default, Clone)]
pub(crate) struct DeferredSpawner {
    queue: Arc<Mutex<Vec<Task>>>,
}

impl DeferredSpawner {
    pub(crate) fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Run every queued task in submission order.
    pub(crate) fn run_pending(&self) {
        let tasks = std::mem::take(&mut *self.queue.lock().unwrap());
        for task in tasks {
            task();
        }
    }
}

impl TaskSpawner for DeferredSpawner {
    fn submit(&self, task: Task) {
        self.queue.lock().unwrap().push(task);
    }
}

/// Factory whose services append `start:<net>` / `stop:<net>` to a log.
#[derive(Default, Clone)]
pub(crate) struct RecordingServices {
    pub(crate) log: Arc<Mutex<Vec<String>>>,
}

struct RecordingService {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl SubService for RecordingService {
    fn start(&mut self) {
        self.log.lock().unwrap().push(format!("start:{}", self.name));
    }

    fn stop(&mut self) {
        self.log.lock().unwrap().push(format!("stop:{}", self.name));
    }
}

impl ServiceFactory for RecordingServices {
    fn dhcp(&self, cfg: &ServiceConfig) -> Box<dyn SubService> {
        Box::new(RecordingService {
            name: cfg.name.clone(),
            log: Arc::clone(&self.log),
        })
    }
}

/// Sub-service reporting `svc start <name>` / `svc stop <name>` through a
/// runner, so its calls interleave with the rest of the recorded dataplane.
pub(crate) struct RunnerService {
    name: String,
    runner: Arc<RecordingRunner>,
}

impl RunnerService {
    pub(crate) fn new(name: &str, runner: &Arc<RecordingRunner>) -> Self {
        Self {
            name: name.to_owned(),
            runner: Arc::clone(runner),
        }
    }

    fn report(&self, action: &str) {
        let _ = self.runner.run("svc", &[action.to_owned(), self.name.clone()]);
    }
}

impl SubService for RunnerService {
    fn start(&mut self) {
        self.report("start");
    }

    fn stop(&mut self) {
        self.report("stop");
    }
}

/// Factory handing out [`RunnerService`]s for DHCP.
pub(crate) struct RunnerServices(pub(crate) Arc<RecordingRunner>);

impl ServiceFactory for RunnerServices {
    fn dhcp(&self, cfg: &ServiceConfig) -> Box<dyn SubService> {
        Box::new(RunnerService::new(&cfg.name, &self.0))
    }
}

/// A dataplane whose system backends all record into `runner`.
pub(crate) fn dataplane(
    runner: &Arc<RecordingRunner>,
    services: &RecordingServices,
    ipsec_dir: &Path,
) -> Dataplane {
    let shared: Arc<dyn CommandRunner> = runner.clone();
    Dataplane {
        links: Arc::new(IpRoute2::new(Arc::clone(&shared))),
        firewall: Arc::new(Iptables::new(Arc::clone(&shared))),
        sets: Arc::new(Ipset::new(Arc::clone(&shared))),
        services: Arc::new(services.clone()),
        runner: shared,
        spawner: Arc::new(InlineSpawner),
        ipsec_dir: ipsec_dir.to_path_buf(),
    }
}
