// Testbed: Lab Topology Resolution for Hardware-in-the-Loop Tests
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.


//! # Emulated Lab in GNS3
//!
//! A lab which runs inside a GNS3 project. The project is the source of truth for the topology:
//! every node whose name is a role acronym (`sw1`, `tg1`, `lhost1`, ...) becomes a device, and
//! every link between two such nodes becomes a cable. Nodes with other names (clouds, NAT, ...)
//! are ignored.
//!
//! Switch ports are numbered by the position of the interface on the node, starting at 1. All
//! other devices use the interface names shown by GNS3.
//!
//! The admin state of a port is emulated by suspending the GNS3 link plugged into it.

use gns3::{GNS3Interface, GNS3Link, GNS3Node, GNS3Server};
use testbed::control::{AdminState, DeviceError, OperState, PortControl};
use testbed::setup::SetupConfig;
use testbed::topology::{Device, DeviceKind, Endpoint, PortId, Role};

use log::*;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;

/// Port identifier of the interface at `position` (starting at 0) of a node
fn port_id(kind: DeviceKind, position: usize, iface: &GNS3Interface) -> PortId {
    match kind {
        DeviceKind::Switch => PortId::Number(position as u32 + 1),
        _ => PortId::from(iface.name.as_str()),
    }
}

/// Find the node and the port at one end of a GNS3 link. Returns `None` if the node is not a
/// device of the lab.
fn link_endpoint(
    devices: &HashMap<&str, (&GNS3Node, DeviceKind)>,
    link: &GNS3Link,
    side: usize,
) -> Result<Option<Endpoint>, Box<dyn Error>> {
    let end = &link.nodes[side];
    let (node, kind) = match devices.get(end.node_id.as_str()) {
        Some(x) => *x,
        None => return Ok(None),
    };
    let position = node
        .interfaces
        .iter()
        .position(|i| i.adapter_number == end.adapter_number && i.port_number == end.port_number)
        .ok_or_else(|| format!("Link {} uses an unknown interface of {}", link.id, node.name))?;
    Ok(Some(Endpoint::new(node.name.as_str(), port_id(kind, position, &node.interfaces[position]))))
}

/// Build the setup description of the lab from the nodes and links of a GNS3 project.
pub fn setup_from_project(
    name: impl Into<String>,
    nodes: &[GNS3Node],
    links: &[GNS3Link],
) -> Result<SetupConfig, Box<dyn Error>> {
    let mut setup = SetupConfig::new(name);
    let mut devices: HashMap<&str, (&GNS3Node, DeviceKind)> = HashMap::new();

    for node in nodes.iter() {
        let kind = match Role::from(node.name.as_str()).kind() {
            Some(kind) => kind,
            None => {
                debug!("Ignoring node {} ({})", node.name, node.node_type);
                continue;
            }
        };
        let ports: Vec<PortId> =
            node.interfaces.iter().enumerate().map(|(i, iface)| port_id(kind, i, iface)).collect();
        setup.add_device(node.name.as_str(), kind, ports);
        devices.insert(node.id.as_str(), (node, kind));
    }

    for link in links.iter() {
        match (link_endpoint(&devices, link, 0)?, link_endpoint(&devices, link, 1)?) {
            (Some(a), Some(b)) => {
                setup.add_link(a.role, a.port, b.role, b.port);
            }
            _ => debug!("Ignoring link {}, which does not connect two lab devices", link.id),
        }
    }

    info!(
        "Imported {} devices and {} links from the GNS3 project",
        setup.devices.len(),
        setup.links.len()
    );
    Ok(setup)
}

/// # GNS3 Lab
///
/// Handle on an opened GNS3 project, together with the setup imported from it.
#[derive(Debug)]
pub struct Gns3Lab {
    server: GNS3Server,
    host: String,
    setup: SetupConfig,
    nodes: HashMap<Role, GNS3Node>,
    links: Vec<GNS3Link>,
}

impl Gns3Lab {
    /// Connect to the GNS3 server, open the project, start all nodes and import the topology.
    pub fn open(host: &str, port: u32, project: &str) -> Result<Self, Box<dyn Error>> {
        let mut server = GNS3Server::new(host, port)?;
        server.open_project_by_name(project)?;
        server.start_all_nodes()?;
        let nodes = server.get_nodes()?;
        let links = server.get_links()?;
        let setup = setup_from_project(project, &nodes, &links)?;
        let nodes = nodes.into_iter().map(|n| (Role::from(n.name.as_str()), n)).collect();
        Ok(Self { server, host: host.to_string(), setup, nodes, links })
    }

    /// The setup imported from the project
    pub fn setup(&self) -> &SetupConfig {
        &self.setup
    }

    /// The GNS3 node of a device
    pub fn node(&self, role: &str) -> Option<&GNS3Node> {
        self.nodes.get(role)
    }

    /// Host on which the console of the node listens
    pub fn console_host(&self, node: &GNS3Node) -> String {
        match node.console_host.as_deref() {
            Some(h) if !h.is_empty() && h != "0.0.0.0" && h != "::" => h.to_string(),
            _ => self.host.clone(),
        }
    }

    /// Create the port control of a device, which suspends and resumes the links of the device.
    pub fn port_control(&self, device: &Device) -> Result<Gns3PortControl, DeviceError> {
        let node = self
            .nodes
            .get(device.role())
            .ok_or_else(|| DeviceError::Connection(format!("No GNS3 node {}", device.role())))?;
        let mut links = BTreeMap::new();
        for (i, iface) in node.interfaces.iter().enumerate() {
            if let Some(link) = self.links.iter().find(|l| l.connects(node, iface)) {
                links.insert(port_id(device.kind(), i, iface), link.id.clone());
            }
        }
        Ok(Gns3PortControl { server: self.server.clone(), node_id: node.id.clone(), links })
    }
}

/// # GNS3 Port Control
///
/// Admin-down suspends the link plugged into the port, admin-up resumes it. A port is operational
/// up if its link is not suspended and the node is started. Ports without a link are always down.
#[derive(Debug, Clone)]
pub struct Gns3PortControl {
    server: GNS3Server,
    node_id: String,
    links: BTreeMap<PortId, String>,
}

fn gns3_error(e: gns3::Error) -> DeviceError {
    DeviceError::Connection(e.to_string())
}

impl PortControl for Gns3PortControl {
    fn set_admin_state(&mut self, port: &PortId, state: AdminState) -> Result<(), DeviceError> {
        let link_id = match self.links.get(port) {
            Some(id) => id,
            None => {
                debug!("Port {} has no link, nothing to {}", port, state);
                return Ok(());
            }
        };
        let link =
            self.server.suspend_link(link_id, state == AdminState::Down).map_err(gns3_error)?;
        if link.suspend != (state == AdminState::Down) {
            return Err(DeviceError::UnexpectedResponse(format!(
                "link {} is still {}",
                link_id,
                if link.suspend { "suspended" } else { "active" }
            )));
        }
        Ok(())
    }

    fn operational_state(&mut self, port: &PortId) -> Result<OperState, DeviceError> {
        let link_id = match self.links.get(port) {
            Some(id) => id,
            None => return Ok(OperState::Down),
        };
        let link = self.server.get_link(link_id).map_err(gns3_error)?;
        if link.suspend {
            return Ok(OperState::Down);
        }
        let node = self.server.get_node(&self.node_id).map_err(gns3_error)?;
        Ok(if node.status.is_started() { OperState::Up } else { OperState::Down })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::btreemap;
    use testbed::topology::TopologyGraph;

    fn node(id: &str, name: &str, ifaces: &[&str]) -> GNS3Node {
        let ports: Vec<serde_json::Value> = ifaces
            .iter()
            .enumerate()
            .map(|(i, n)| serde_json::json!({"adapter_number": i, "port_number": 0, "name": n}))
            .collect();
        serde_json::from_value(serde_json::json!({
            "node_id": id, "name": name, "node_type": "qemu", "console": 5000 + id.len(),
            "status": "started", "ports": ports
        }))
        .unwrap()
    }

    fn link(id: &str, a: (&str, u32), b: (&str, u32)) -> GNS3Link {
        serde_json::from_value(serde_json::json!({
            "link_id": id,
            "nodes": [
                {"node_id": a.0, "adapter_number": a.1, "port_number": 0},
                {"node_id": b.0, "adapter_number": b.1, "port_number": 0}
            ]
        }))
        .unwrap()
    }

    fn project() -> (Vec<GNS3Node>, Vec<GNS3Link>) {
        let nodes = vec![
            node("n1", "sw1", &["swp1", "swp2", "swp3", "swp4"]),
            node("n2", "tg1", &["eth0", "eth1", "eth2"]),
            node("n3", "Cloud1", &["virbr0"]),
            node("n4", "lhost1", &["ens3"]),
        ];
        let links = vec![
            link("l1", ("n2", 1), ("n1", 0)),
            link("l2", ("n1", 1), ("n2", 2)),
            link("l3", ("n2", 0), ("n3", 0)),
            link("l4", ("n4", 0), ("n1", 3)),
        ];
        (nodes, links)
    }

    #[test]
    fn import_project() {
        let (nodes, links) = project();
        let setup = setup_from_project("lab", &nodes, &links).unwrap();
        assert_eq!(setup.devices.len(), 3);
        assert_eq!(setup.devices[0].kind, DeviceKind::Switch);
        assert_eq!(
            setup.devices[0].ports,
            vec![PortId::Number(1), PortId::Number(2), PortId::Number(3), PortId::Number(4)]
        );
        assert_eq!(setup.devices[1].ports[0], PortId::from("eth0"));
        assert_eq!(setup.links.len(), 3);

        let topo = TopologyGraph::from_setup(&setup).unwrap();
        let mapping = testbed::resolver::resolve(&topo, &[("tg1", "sw1", 2).into()]).unwrap();
        assert_eq!(
            mapping[("tg1", "sw1")],
            btreemap! {1 => PortId::from("eth1"), 2 => PortId::from("eth2")}
        );
        assert_eq!(
            mapping[("sw1", "tg1")],
            btreemap! {1 => PortId::Number(1), 2 => PortId::Number(2)}
        );
        assert_eq!(topo.peer("lhost1", &"ens3".into()), Some(&Endpoint::new("sw1", 4u32)));
    }

    #[test]
    fn import_unknown_interface() {
        let (nodes, mut links) = project();
        links.push(link("l5", ("n1", 9), ("n4", 0)));
        assert!(setup_from_project("lab", &nodes, &links).is_err());
    }

    #[test]
    fn open_lab() {
        let lab = match Gns3Lab::open("localhost", 3080, "simplified") {
            Ok(lab) => lab,
            Err(_) => return, // skip the test
        };
        let topo = TopologyGraph::from_setup(lab.setup()).unwrap();
        for device in topo.devices() {
            assert!(lab.node(device.role().as_str()).is_some());
            lab.port_control(device).unwrap();
        }
    }
}
