// ── IPSec daemon artifacts ──
//
// Rendered straight through `Display` so a tunnel's files are
// `Secrets(&t).to_string()` and `Connections(&t).to_string()`.

use std::fmt::{self, Display, Formatter};

use secrecy::ExposeSecret;

use crate::model::{IpSecTunnel, Transport};

/// VXLAN UDP port the transport-mode selectors pin on the local side.
const VXLAN_PORT: u16 = 8472;

/// `<name>.secrets`: one PSK line for the remote endpoint.
pub(super) struct Secrets<'a>(pub &'a IpSecTunnel);

impl Display for Secrets<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let t = self.0;
        writeln!(f, "%any {} : PSK \"{}\"", t.right, t.secret.expose_secret())
    }
}

/// `<name>.conf`: the `conn` stanzas for the tunnel's transport.
pub(super) struct Connections<'a>(pub &'a IpSecTunnel);

impl Display for Connections<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0.transport {
            Transport::Vxlan => vxlan(f, self.0),
            Transport::Gre => gre(f, self.0),
        }
    }
}

fn ike_port(f: &mut Formatter<'_>, side: &str, port: Option<u16>) -> fmt::Result {
    match port {
        Some(port) => writeln!(f, "    {side}ikeport={port}"),
        None => Ok(()),
    }
}

fn id(f: &mut Formatter<'_>, side: &str, prefix: &str, id: Option<&str>) -> fmt::Result {
    match id {
        Some(id) => writeln!(f, "    {side}id=@{prefix}{id}"),
        None => Ok(()),
    }
}

/// A shared base plus two asymmetric connections, one per flow direction.
fn vxlan(f: &mut Formatter<'_>, t: &IpSecTunnel) -> fmt::Result {
    let name = &t.name;
    writeln!(f, "conn {name}")?;
    writeln!(f, "    keyexchange=ike")?;
    writeln!(f, "    ikev2=no")?;
    writeln!(f, "    type=transport")?;
    writeln!(f, "    left={}", t.left)?;
    ike_port(f, "left", t.left_port)?;
    writeln!(f, "    right={}", t.right)?;
    ike_port(f, "right", t.right_port)?;
    writeln!(f, "    authby=secret")?;

    for (conn, (local, remote), (left_proto, right_proto)) in [
        ("c1", ("c1.", "c2."), (format!("udp/{VXLAN_PORT}"), "udp".to_owned())),
        ("c2", ("c2.", "c1."), ("udp".to_owned(), format!("udp/{VXLAN_PORT}"))),
    ] {
        writeln!(f)?;
        writeln!(f, "conn {name}-{conn}")?;
        writeln!(f, "    auto=add")?;
        writeln!(f, "    also={name}")?;
        id(f, "left", local, t.left_id.as_deref())?;
        id(f, "right", remote, t.right_id.as_deref())?;
        writeln!(f, "    leftprotoport={left_proto}")?;
        writeln!(f, "    rightprotoport={right_proto}")?;
    }
    Ok(())
}

fn gre(f: &mut Formatter<'_>, t: &IpSecTunnel) -> fmt::Result {
    writeln!(f, "conn {}-c1", t.name)?;
    writeln!(f, "    auto=add")?;
    writeln!(f, "    ikev2=no")?;
    writeln!(f, "    type=transport")?;
    writeln!(f, "    left={}", t.left)?;
    ike_port(f, "left", t.left_port)?;
    id(f, "left", "", t.left_id.as_deref())?;
    writeln!(f, "    right={}", t.right)?;
    id(f, "right", "", t.right_id.as_deref())?;
    ike_port(f, "right", t.right_port)?;
    writeln!(f, "    authby=secret")?;
    writeln!(f, "    leftprotoport=gre")?;
    writeln!(f, "    rightprotoport=gre")
}
