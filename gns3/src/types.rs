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


//! # GNS3 Types

use serde::Deserialize;
use std::fmt;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct GNS3ResponseVersion {
    pub version: String,
}

/// Project Information
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GNS3Project {
    /// ID of the project
    #[serde(rename = "project_id")]
    pub id: String,
    /// Name of the project
    pub name: String,
    /// Status of the project
    pub status: GNS3ProjectStatus,
}

/// Project Status
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum GNS3ProjectStatus {
    /// Open status
    #[serde(rename = "opened")]
    Opened,
    /// Close status
    #[serde(rename = "closed")]
    Closed,
}

/// Node Information
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GNS3Node {
    /// ID of the node
    #[serde(rename = "node_id")]
    pub id: String,
    /// name of the node
    pub name: String,
    /// type of the node (e.g., qemu)
    pub node_type: String,
    /// Telnet port of the console, if the node has one
    #[serde(rename = "console")]
    pub console_port: Option<u16>,
    /// Host on which the console listens
    #[serde(default)]
    pub console_host: Option<String>,
    /// Status of the node
    pub status: GNS3NodeStatus,
    /// Interfaces of the node, in the order shown by GNS3
    #[serde(rename = "ports")]
    pub interfaces: Vec<GNS3Interface>,
}

impl GNS3Node {
    /// Get the interface with the given name
    pub fn interface(&self, name: &str) -> Option<&GNS3Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

/// Node Status
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum GNS3NodeStatus {
    /// Node is stopped
    #[serde(rename = "stopped")]
    Stopped,
    /// Node is started
    #[serde(rename = "started")]
    Started,
    /// Node is suspended
    #[serde(rename = "suspended")]
    Suspended,
}

impl GNS3NodeStatus {
    /// Returns true if the node is started
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }
}

/// Interface Information
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GNS3Interface {
    /// adapter number
    pub adapter_number: u32,
    /// port number
    pub port_number: u32,
    /// Name of the interface
    pub name: String,
}

/// Link data
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GNS3Link {
    /// ID of the link
    #[serde(rename = "link_id")]
    pub id: String,
    /// nodes which the link connects
    pub nodes: [GNS3LinkEndpoint; 2],
    /// The link is suspended, and drops all packets
    #[serde(default)]
    pub suspend: bool,
}

impl GNS3Link {
    /// Returns true if the link is plugged into the interface of the node
    pub fn connects(&self, node: &GNS3Node, iface: &GNS3Interface) -> bool {
        self.nodes.iter().any(|e| e.is_interface(node, iface))
    }
}

/// Endpoint of a link
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GNS3LinkEndpoint {
    /// ID of the node for which the link is configured
    pub node_id: String,
    /// adapter number
    pub adapter_number: u32,
    /// port number
    pub port_number: u32,
}

impl GNS3LinkEndpoint {
    /// Returns true if the endpoint refers to the interface of the node
    pub fn is_interface(&self, node: &GNS3Node, iface: &GNS3Interface) -> bool {
        self.node_id == node.id
            && self.adapter_number == iface.adapter_number
            && self.port_number == iface.port_number
    }
}

impl fmt::Display for GNS3LinkEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.node_id, self.adapter_number, self.port_number)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const NODE: &str = r#"{
        "node_id": "f1a2", "name": "sw1", "node_type": "qemu", "console": 5000,
        "console_host": "127.0.0.1", "status": "started", "compute_id": "local",
        "ports": [
            {"adapter_number": 0, "port_number": 0, "name": "swp1", "short_name": "swp1"},
            {"adapter_number": 1, "port_number": 0, "name": "swp2", "short_name": "swp2"}
        ]
    }"#;

    const LINK: &str = r#"{
        "link_id": "9c3e", "suspend": true, "capturing": false,
        "nodes": [
            {"node_id": "f1a2", "adapter_number": 1, "port_number": 0},
            {"node_id": "77b0", "adapter_number": 0, "port_number": 0}
        ]
    }"#;

    #[test]
    fn parse_node_and_link() {
        let node: GNS3Node = serde_json::from_str(NODE).unwrap();
        assert_eq!(node.console_port, Some(5000));
        assert!(node.status.is_started());
        assert_eq!(node.interfaces.len(), 2);

        let link: GNS3Link = serde_json::from_str(LINK).unwrap();
        assert!(link.suspend);
        assert!(link.connects(&node, node.interface("swp2").unwrap()));
        assert!(!link.connects(&node, node.interface("swp1").unwrap()));
        assert_eq!(link.nodes[1].to_string(), "77b0/0/0");
    }

    #[test]
    fn link_needs_two_endpoints() {
        let dangling = r#"{
            "link_id": "9c3e",
            "nodes": [{"node_id": "f1a2", "adapter_number": 1, "port_number": 0}]
        }"#;
        assert!(serde_json::from_str::<GNS3Link>(dangling).is_err());
    }

    #[test]
    fn node_without_console() {
        let node: GNS3Node = serde_json::from_str(
            r#"{"node_id": "a", "name": "x", "node_type": "ethernet_switch", "console": null,
                "status": "stopped", "ports": []}"#,
        )
        .unwrap();
        assert_eq!(node.console_port, None);
        assert_eq!(node.console_host, None);
        assert!(!node.status.is_started());
    }
}
