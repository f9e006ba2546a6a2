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

//! # Setup Description
//!
//! Declarative description of a lab: the devices with their ports, and the cables between them.
//! A setup is stored as JSON:
//!
//! ```json
//! {
//!   "name": "simplified",
//!   "devices": [
//!     { "acronym": "sw1", "kind": "switch", "ports": [1, 2, 3, 4] },
//!     { "acronym": "tg1", "kind": "tg", "ports": ["eth1", "eth2", "eth3", "eth4"] }
//!   ],
//!   "links": [
//!     ["tg1", "eth1", "sw1", 1],
//!     ["tg1", "eth2", "sw1", 2]
//!   ]
//! }
//! ```
//!
//! The setup is only parsed here. All semantic checks happen when the
//! [`TopologyGraph`](crate::topology::TopologyGraph) is built from it.

use crate::topology::{ConfigurationError, DeviceKind, Endpoint, PortId, Role};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Description of the whole lab
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Name of the setup (e.g. `simplified`)
    #[serde(default)]
    pub name: String,
    /// All devices, in declaration order
    pub devices: Vec<DeviceDecl>,
    /// All links, in declaration order
    #[serde(default)]
    pub links: Vec<LinkDecl>,
}

/// Declaration of a single device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDecl {
    /// Role acronym, like `sw1`
    pub acronym: Role,
    /// Kind of the device
    pub kind: DeviceKind,
    /// Optional human readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ports of the device
    pub ports: Vec<PortId>,
}

/// Declaration of a cable, written as `[role_a, port_a, role_b, port_b]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDecl(pub Role, pub PortId, pub Role, pub PortId);

impl LinkDecl {
    /// Create a new link declaration
    pub fn new(
        a: impl Into<Role>,
        port_a: impl Into<PortId>,
        b: impl Into<Role>,
        port_b: impl Into<PortId>,
    ) -> Self {
        Self(a.into(), port_a.into(), b.into(), port_b.into())
    }

    /// Returns both endpoints of the link
    pub fn endpoints(&self) -> (Endpoint, Endpoint) {
        (Endpoint::new(&self.0, &self.1), Endpoint::new(&self.2, &self.3))
    }
}

impl SetupConfig {
    /// Create an empty setup
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), devices: Vec::new(), links: Vec::new() }
    }

    /// Add a device to the setup
    pub fn add_device<P>(
        &mut self,
        acronym: impl Into<Role>,
        kind: DeviceKind,
        ports: impl IntoIterator<Item = P>,
    ) -> &mut Self
    where
        P: Into<PortId>,
    {
        self.devices.push(DeviceDecl {
            acronym: acronym.into(),
            kind,
            name: None,
            ports: ports.into_iter().map(|p| p.into()).collect(),
        });
        self
    }

    /// Add a link to the setup
    pub fn add_link(
        &mut self,
        a: impl Into<Role>,
        port_a: impl Into<PortId>,
        b: impl Into<Role>,
        port_b: impl Into<PortId>,
    ) -> &mut Self {
        self.links.push(LinkDecl::new(a, port_a, b, port_b));
        self
    }

    /// Parse a setup from a JSON string
    pub fn from_json_str(s: impl AsRef<str>) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(s.as_ref())?)
    }

    /// Read a setup from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        Self::from_json_str(fs::read_to_string(path)?)
    }

    /// Write the setup as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
