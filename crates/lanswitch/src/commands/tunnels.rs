//! `lanswitch tunnels`: list the IPSec tunnels of ipsec networks.

use lanswitch_core::{Dataplane, IpSecWorker, Provider, TunnelInfo};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{GlobalOpts, TunnelsArgs};
use crate::error::CliError;
use crate::output;

const MASK: &str = "<redacted>";

#[derive(Serialize)]
struct TunnelEntry {
    network: String,
    #[serde(flatten)]
    info: TunnelInfo,
}

#[derive(Tabled)]
struct TunnelRow {
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Left")]
    left: String,
    #[tabled(rename = "Right")]
    right: String,
    #[tabled(rename = "Transport")]
    transport: String,
    #[tabled(rename = "Secret")]
    secret: String,
}

impl From<&TunnelEntry> for TunnelRow {
    fn from(entry: &TunnelEntry) -> Self {
        let info = &entry.info;
        Self {
            network: entry.network.clone(),
            name: info.name.clone(),
            left: endpoint(&info.left, info.left_id.as_deref(), info.left_port),
            right: endpoint(&info.right, info.right_id.as_deref(), info.right_port),
            transport: info.transport.to_string(),
            secret: info.secret.clone(),
        }
    }
}

fn endpoint(addr: &str, id: Option<&str>, port: Option<u16>) -> String {
    let mut out = addr.to_owned();
    if let Some(port) = port {
        out.push_str(&format!(":{port}"));
    }
    if let Some(id) = id {
        out.push_str(&format!(" ({id})"));
    }
    out
}

pub fn handle(args: &TunnelsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load(global)?;
    if let Some(name) = &args.network {
        super::require_network(&config, name)?;
    }

    let dataplane = Dataplane::system(&config.switch.ipsec_dir);
    let mut entries = Vec::new();
    for net in config
        .networks
        .iter()
        .filter(|n| n.provider == Provider::Ipsec)
        .filter(|n| args.network.as_ref().is_none_or(|name| &n.name == name))
    {
        let worker = IpSecWorker::new(net.clone(), dataplane.clone());
        worker.list_tunnels(|mut info| {
            if !args.show_secrets {
                info.secret = MASK.into();
            }
            entries.push(TunnelEntry {
                network: net.name.clone(),
                info,
            });
        });
    }

    let rendered = output::render_list(global.output, &entries, |e| TunnelRow::from(e), |e| {
        e.info.name.clone()
    })?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
