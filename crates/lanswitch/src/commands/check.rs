//! `lanswitch check`: validate the configuration and list its networks.

use lanswitch_core::NetworkConfig;
use lanswitch_core::dataplane::{Dataplane, OutputKind};
use tabled::Tabled;
use tracing::debug;

use crate::cli::{CheckArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Bridge")]
    bridge: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Outputs")]
    outputs: usize,
    #[tabled(rename = "DHCP")]
    dhcp: String,
    #[tabled(rename = "Tunnels")]
    tunnels: usize,
}

impl From<&NetworkConfig> for NetworkRow {
    fn from(net: &NetworkConfig) -> Self {
        Self {
            name: net.name.clone(),
            provider: net.provider.to_string(),
            bridge: net.bridge.name.clone(),
            address: net.bridge.address.clone(),
            outputs: net.outputs.len(),
            dhcp: if net.dhcp {
                format!("{}-{}", net.subnet.start, net.subnet.end)
            } else {
                "-".into()
            },
            tunnels: net.ipsec.as_ref().map_or(0, |ipsec| ipsec.tunnels.len()),
        }
    }
}

pub fn handle(args: &CheckArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load(global)?;

    for net in &config.networks {
        for out in &net.outputs {
            let kind: OutputKind = out.interface.parse()?;
            debug!(network = %net.name, output = %out.interface, ?kind, "output ok");
        }
    }

    if args.links {
        let dataplane = Dataplane::system(&config.switch.ipsec_dir);
        for net in &config.networks {
            for out in &net.outputs {
                if let OutputKind::Physical(name) = out.interface.parse()? {
                    let index = dataplane.links.link_index(&name)?;
                    debug!(network = %net.name, link = %name, index, "link present");
                }
            }
        }
    }

    if args.print {
        output::print_output(&config.to_toml()?, global.quiet);
        return Ok(());
    }

    let rendered = output::render_list(
        global.output,
        &config.networks,
        |n| NetworkRow::from(n),
        |net| net.name.clone(),
    )?;
    output::print_output(&rendered, global.quiet);

    if !global.quiet {
        let summary = format!("{} network(s) valid", config.networks.len());
        eprintln!("{}", output::success(&summary, output::should_color(global.color)));
    }
    Ok(())
}
