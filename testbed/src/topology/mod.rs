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

//! # Topology
//!
//! Static model of the lab: devices, their ports, and the cables between them. The graph is built
//! from a [`SetupConfig`](crate::setup::SetupConfig):
//!
//! ```rust
//! use testbed::setup::SetupConfig;
//! use testbed::topology::{DeviceKind, PortId, TopologyGraph};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut setup = SetupConfig::new("two-links");
//!     setup
//!         .add_device("sw1", DeviceKind::Switch, vec![1u32, 2, 3])
//!         .add_device("tg1", DeviceKind::TrafficGenerator, vec!["eth1", "eth2"])
//!         .add_link("tg1", "eth1", "sw1", 1u32)
//!         .add_link("tg1", "eth2", "sw1", 3u32);
//!
//!     let topo = TopologyGraph::from_setup(&setup)?;
//!
//!     let links = topo.links_between("sw1", "tg1");
//!     assert_eq!(links.len(), 2);
//!     assert_eq!(links[1].near.port, PortId::Number(3));
//!     assert_eq!(links[1].far.port, PortId::from("eth2"));
//!     Ok(())
//! }
//! ```

mod graph;
mod types;

pub use graph::{LabGraph, TopologyGraph};
pub use types::{
    ConfigurationError, Device, DeviceId, DeviceKind, Endpoint, Link, LinkId, LinkView, PortId,
    Role, TopologyError,
};
