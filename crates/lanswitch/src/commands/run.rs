//! `lanswitch run`: provision every network and hold until shutdown.

use std::sync::Arc;

use lanswitch_config::SwitchConfig;
use lanswitch_core::{
    Dataplane, LeaseCache, LeaseNetwork, LocalSwitch, Networker, SharedWorker, WorkerRegistry,
};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;

#[derive(Debug, Clone, Copy)]
enum Phase {
    Start,
    Stop,
}

pub async fn handle(args: &RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut config = super::load(global)?;
    select_networks(&mut config, &args.networks)?;

    let registry = WorkerRegistry::init_global(Dataplane::system(&config.switch.ipsec_dir));
    let switch = Arc::new(LocalSwitch::new(config.switch.uuid.clone()));
    let cache = LeaseCache::global();

    for net in &config.networks {
        if net.dhcp {
            cache.add_network(LeaseNetwork::from(net));
        }
        registry.new_networker(net.clone());
    }
    info!(
        switch = %config.switch.uuid,
        networks = registry.len(),
        "starting workers"
    );

    drive(registry, &switch, Phase::Start).await?;
    info!("switch running");

    let shutdown = wait_for_shutdown().await;
    info!("shutting down");
    drive(registry, &switch, Phase::Stop).await?;
    shutdown.map_err(CliError::from)
}

/// Keep only the networks named on the command line.
fn select_networks(config: &mut SwitchConfig, wanted: &[String]) -> Result<(), CliError> {
    if wanted.is_empty() {
        return Ok(());
    }
    for name in wanted {
        super::require_network(config, name)?;
    }
    config.networks.retain(|n| wanted.contains(&n.name));
    Ok(())
}

/// Run one lifecycle phase over every worker, off the async executor.
async fn drive(
    registry: &'static WorkerRegistry,
    switch: &Arc<LocalSwitch>,
    phase: Phase,
) -> Result<(), CliError> {
    let mut workers: Vec<SharedWorker> = Vec::new();
    registry.list_workers(|worker| workers.push(Arc::clone(worker)));

    let switch = Arc::clone(switch);
    tokio::task::spawn_blocking(move || {
        let mut workers: Vec<_> = workers.iter().map(|w| w.blocking_lock()).collect();
        workers.sort_by(|a, b| a.name().cmp(b.name()));
        for worker in &mut workers {
            match phase {
                Phase::Start => {
                    worker.initialize();
                    worker.start(switch.as_ref());
                }
                Phase::Stop => worker.stop(),
            }
            info!(network = %worker.name(), state = %worker.state(), "worker {phase:?}");
        }
    })
    .await
    .map_err(|e| CliError::Runtime {
        reason: e.to_string(),
    })
}

async fn wait_for_shutdown() -> std::io::Result<()> {
    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = term.recv() => {
            warn!("received SIGTERM");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lanswitch_core::NetworkConfig;

    use super::*;

    fn config(names: &[&str]) -> SwitchConfig {
        SwitchConfig {
            networks: names
                .iter()
                .map(|name| NetworkConfig {
                    name: (*name).into(),
                    ..NetworkConfig::default()
                })
                .collect(),
            ..SwitchConfig::default()
        }
    }

    #[test]
    fn selection_keeps_named_networks() {
        let mut cfg = config(&["lan", "site", "lab"]);
        select_networks(&mut cfg, &["site".into(), "lan".into()]).unwrap();
        let names: Vec<_> = cfg.networks.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["lan", "site"]);
    }

    #[test]
    fn selection_rejects_unknown_networks() {
        let mut cfg = config(&["lan"]);
        let err = select_networks(&mut cfg, &["wan".into()]).unwrap_err();
        assert!(matches!(err, CliError::NetworkNotFound { ref available, .. } if available == "lan"));
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let mut cfg = config(&["lan", "site"]);
        select_networks(&mut cfg, &[]).unwrap();
        assert_eq!(cfg.networks.len(), 2);
    }
}
