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

//! Module containing all type definitions

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

type IndexType = u32;
/// Device Identification (and index into the graph)
pub type DeviceId = NodeIndex<IndexType>;
/// Link Identification (and index into the graph). Links are numbered in declaration order.
pub type LinkId = EdgeIndex<IndexType>;

/// # Device Kind
///
/// Every device kind has its own acronym prefix. The role of a device is the prefix followed by
/// the index of the device among all devices of the same kind, e.g. `sw2` is `switch[2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Switch under test
    #[serde(rename = "switch")]
    Switch,
    /// Traffic generator
    #[serde(rename = "tg")]
    TrafficGenerator,
    /// Linux host
    #[serde(rename = "lhost")]
    LinuxHost,
}

impl DeviceKind {
    /// All known device kinds
    pub const ALL: [DeviceKind; 3] =
        [DeviceKind::Switch, DeviceKind::TrafficGenerator, DeviceKind::LinuxHost];

    /// Acronym prefix of the device kind
    pub fn acronym_prefix(&self) -> &'static str {
        match self {
            Self::Switch => "sw",
            Self::TrafficGenerator => "tg",
            Self::LinuxHost => "lhost",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Switch => write!(f, "switch"),
            Self::TrafficGenerator => write!(f, "tg"),
            Self::LinuxHost => write!(f, "lhost"),
        }
    }
}

/// # Role
///
/// Short acronym identifying the function of a device in the topology, like `sw1` or `tg1`.
/// `Role` implements `Borrow<str>`, so collections keyed by roles can be queried with plain
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Create a new role from its acronym
    pub fn new(acronym: impl Into<String>) -> Self {
        Self(acronym.into())
    }

    /// Returns the acronym
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Split the acronym into the device kind and the kind-local index (starting at 1). Returns
    /// `None` if the acronym does not follow the `<prefix><index>` scheme. The index must be
    /// written without leading zeros, such that every device has exactly one acronym (`sw01` is
    /// rejected, it would be the same device as `sw1`).
    pub fn split(&self) -> Option<(DeviceKind, usize)> {
        DeviceKind::ALL.iter().find_map(|kind| {
            let index = self.0.strip_prefix(kind.acronym_prefix())?;
            if index.is_empty()
                || index.starts_with('0')
                || !index.bytes().all(|b| b.is_ascii_digit())
            {
                return None;
            }
            index.parse::<usize>().ok().filter(|i| *i > 0).map(|i| (*kind, i))
        })
    }

    /// Returns the device kind encoded in the acronym
    pub fn kind(&self) -> Option<DeviceKind> {
        self.split().map(|(kind, _)| kind)
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&Role> for Role {
    fn from(r: &Role) -> Self {
        r.clone()
    }
}

impl Borrow<str> for Role {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// # Port Identifier
///
/// Device-local identifier of a physical port. Switches number their ports, traffic generators
/// and hosts name their interfaces. In a setup file, both are written as plain JSON values (`24`
/// or `"eth1"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortId {
    /// Numbered port
    Number(u32),
    /// Named interface
    Name(String),
}

impl From<u32> for PortId {
    fn from(n: u32) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for PortId {
    fn from(s: &str) -> Self {
        Self::Name(s.to_string())
    }
}

impl From<String> for PortId {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

impl From<&PortId> for PortId {
    fn from(p: &PortId) -> Self {
        p.clone()
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(s) => f.write_str(s),
        }
    }
}

/// One side of a link: a port on a specific device.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Endpoint {
    /// Role of the device
    pub role: Role,
    /// Port on the device
    pub port: PortId,
}

impl Endpoint {
    /// Create a new endpoint
    pub fn new(role: impl Into<Role>, port: impl Into<PortId>) -> Self {
        Self { role: role.into(), port: port.into() }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.port)
    }
}

/// # Device
///
/// A lab device as declared in the setup. Devices never change during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub(crate) role: Role,
    pub(crate) kind: DeviceKind,
    pub(crate) index: usize,
    pub(crate) name: Option<String>,
    pub(crate) ports: Vec<PortId>,
}

impl Device {
    /// Role acronym of the device
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Kind of the device
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Index among all devices of the same kind (the `2` in `sw2`)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Human readable name, falls back to the role
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.role.as_str())
    }

    /// All ports of the device, in declaration order
    pub fn ports(&self) -> &[PortId] {
        &self.ports
    }

    /// Returns true if the device has the given port
    pub fn has_port(&self, port: &PortId) -> bool {
        self.ports.contains(port)
    }
}

/// # Link
///
/// Physical cable between two ports of two distinct devices. The endpoints are stored in the order
/// in which they were declared; use [`Link::oriented`] to look at the link from one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub(crate) id: LinkId,
    pub(crate) a: Endpoint,
    pub(crate) b: Endpoint,
}

impl Link {
    /// Identifier of the link (declaration order)
    pub fn id(&self) -> LinkId {
        self.id
    }

    /// Both endpoints, in declaration order
    pub fn endpoints(&self) -> (&Endpoint, &Endpoint) {
        (&self.a, &self.b)
    }

    /// Returns true if one endpoint belongs to the given role
    pub fn touches(&self, role: &str) -> bool {
        self.a.role.as_str() == role || self.b.role.as_str() == role
    }

    /// Look at the link from the side of `role`. Returns `None` if the link does not touch it.
    pub fn oriented(&self, role: &str) -> Option<LinkView<'_>> {
        if self.a.role.as_str() == role {
            Some(LinkView { id: self.id, near: &self.a, far: &self.b })
        } else if self.b.role.as_str() == role {
            Some(LinkView { id: self.id, near: &self.b, far: &self.a })
        } else {
            None
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.a, self.b)
    }
}

/// A link seen from one of its ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkView<'a> {
    /// Identifier of the link
    pub id: LinkId,
    /// Endpoint on the side from which the link is looked at
    pub near: &'a Endpoint,
    /// Endpoint on the other side
    pub far: &'a Endpoint,
}

/// Configuration Error, raised while loading the setup or building the topology graph.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The setup file cannot be read
    #[error("Cannot read the setup file: {0}")]
    Io(#[from] std::io::Error),
    /// The setup description is no valid JSON, or does not match the schema
    #[error("Cannot parse the setup description: {0}")]
    Json(#[from] serde_json::Error),
    /// Two devices share the same role acronym
    #[error("Device role {0} is declared more than once")]
    DuplicateRole(Role),
    /// The acronym does not match the declared kind of the device
    #[error("Acronym {role} is not valid for a device of kind {kind}")]
    InvalidAcronym {
        /// Role of the device
        role: Role,
        /// Declared kind
        kind: DeviceKind,
    },
    /// A device declares the same port twice
    #[error("Port {port} is declared twice on {role}")]
    DuplicatePort {
        /// Role of the device
        role: Role,
        /// Duplicated port
        port: PortId,
    },
    /// A link (or a device handle) references a device which does not exist
    #[error("Unknown device: {0}")]
    UnknownDevice(Role),
    /// A link references a port which is not declared on the device
    #[error("Port {port} is not declared on {role}")]
    UnknownPort {
        /// Role of the device
        role: Role,
        /// Port which was not found
        port: PortId,
    },
    /// A link connects a device to itself
    #[error("Link connects {0} to itself")]
    SelfLoop(Role),
    /// A port is used by more than one link
    #[error("Port {0} is part of more than one link")]
    PortInMultipleLinks(Endpoint),
}

/// Topology Error, raised when a link query cannot be satisfied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// No device with the role exists in the topology
    #[error("No device with role {0} in the topology")]
    UnknownRole(Role),
    /// The query asked for zero links
    #[error("Link query {a} -> {b} must request at least one link")]
    InvalidCount {
        /// First role
        a: Role,
        /// Second role
        b: Role,
    },
    /// Fewer links exist between the two roles than requested
    #[error("Not enough links between {a} and {b}: requested {requested}, available {available}")]
    InsufficientLinks {
        /// First role
        a: Role,
        /// Second role
        b: Role,
        /// Number of requested links
        requested: usize,
        /// Number of links in the topology
        available: usize,
    },
}
