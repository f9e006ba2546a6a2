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


#![deny(missing_docs)]

//! # Testbed: Lab Topology Resolution for Hardware-in-the-Loop Tests
//! This is a library for running tests against a lab of physical (or emulated) network devices.
//! Tests do not hard-code which cable connects which ports. Instead, they ask for the links they
//! need, like "4 links between `tg1` and `sw1`", and receive the concrete ports on both sides.
//!
//! ## Structure
//!
//! - **[`Topology`](topology)**: Static graph of the lab, with the devices, their ports and the
//!   cables between them. See the main structure [`TopologyGraph`](topology::TopologyGraph).
//!
//! - **[`Setup`](setup)**: Declarative description of a lab, stored as JSON, from which the
//!   topology graph is built.
//!
//! - **[`Resolver`](resolver)**: Resolves [link queries](resolver::LinkQuery) into a
//!   [`PortMapping`](resolver::PortMapping), where the logical link index `i` refers to the same
//!   cable on both sides.
//!
//! - **[`Environment`]**: Session-wide object owning the topology and the handles of all devices,
//!   grouped by kind (`env.switch[1]`, `env.tg[1]`, `env.lhost[1]`).
//!
//! - **[`Control`](control)**: The [`PortControl`](control::PortControl) trait, which every device
//!   client implements. [`EmulatedDevice`](emulated::EmulatedDevice) is an in-memory
//!   implementation.
//!
//! - **[`Ports`](ports)**: Bulk operations on the admin state of ports, to isolate the test traffic
//!   on the resolved links.
//!
//! - **[`ExampleSetups`](example_setups)**: Collection of predefined labs.
//!
//! ## Usage
//!
//! ```
//! use testbed::emulated::EmulatedDevice;
//! use testbed::ports::{self, WaitOptions};
//! use testbed::topology::TopologyGraph;
//! use testbed::Environment;
//! use testbed::Error;
//! # use testbed::example_setups::*;
//! # use std::time::Duration;
//!
//! fn main() -> Result<(), Error> {
//!     // load the lab
//!     // let setup = SetupConfig::from_file("lab.json")?;
//! # let setup = Simplified::setup();
//!     let topo = TopologyGraph::from_setup(&setup)?;
//!
//!     // connect to all devices
//!     let mut env = Environment::connect(topo, |d| Ok(Box::new(EmulatedDevice::from_device(d))))?;
//!
//!     // ask for two cables between the traffic generator and the switch
//!     let mapping = env.get_ports(&["tg1:sw1:2".parse().unwrap()])?;
//!
//!     // isolate the traffic on those two cables
//! # let wait = WaitOptions::new(Duration::from_secs(1)).poll_interval(Duration::from_millis(1));
//!     ports::disable_all_ports(&mut env.switch, None)?;
//!     ports::enable_ports(&mut env.switch, &mapping, Some(&wait))?;
//!
//!     println!("{}", mapping);
//!     env.teardown()?;
//!     Ok(())
//! }
//! ```

// test modules
pub mod example_setups;
mod test;

pub mod control;
pub mod emulated;
pub mod environment;
mod error;
pub mod ports;
pub mod resolver;
pub mod setup;
pub mod topology;

pub use environment::Environment;
pub use error::Error;
