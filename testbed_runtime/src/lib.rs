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


//! # Runtime System
//!
//! Connects the [`testbed`] environment to a running lab. The lab is a GNS3 project: the topology
//! is imported from the project, switch and traffic generator ports are controlled by suspending
//! their GNS3 links, and linux hosts are controlled through their console. For simplified usage,
//! check the function [`connect_lab`].

#![deny(missing_docs, missing_debug_implementations)]

pub mod console;
pub mod gns3_lab;

use console::{ConsoleConnection, LinuxPortControl};
use gns3_lab::Gns3Lab;
use testbed::control::{DeviceError, PortControl};
use testbed::topology::{DeviceKind, TopologyGraph};
use testbed::Environment;

use log::*;
use std::error::Error;

/// # Connect to the lab
///
/// Open the GNS3 project `project` on the server at `host:port`, and create the environment for
/// it. This function does the following:
///
/// 1. Open the project, start all nodes, and import the topology from the nodes and links.
/// 2. Build the topology graph. Inconsistent projects are rejected here.
/// 3. Connect to every device. Linux hosts with a console are controlled through the console,
///    every other device through GNS3 link suspension.
pub fn connect_lab(host: &str, port: u32, project: &str) -> Result<Environment, Box<dyn Error>> {
    info!("Opening the GNS3 project {}...", project);
    let lab = Gns3Lab::open(host, port, project)?;
    let topo = TopologyGraph::from_setup(lab.setup())?;

    let env = Environment::connect(topo, |device| -> Result<Box<dyn PortControl>, DeviceError> {
        let node = lab.node(device.role().as_str());
        match (device.kind(), node.and_then(|n| n.console_port.map(|p| (n, p)))) {
            (DeviceKind::LinuxHost, Some((node, console))) => {
                let host = lab.console_host(node);
                debug!("Connecting to the console of {} at {}:{}", device.role(), host, console);
                Ok(Box::new(LinuxPortControl::new(ConsoleConnection::new(&host, console)?)))
            }
            _ => Ok(Box::new(lab.port_control(device)?)),
        }
    })?;

    info!(
        "Lab {} ready: {} switches, {} traffic generators, {} linux hosts",
        project,
        env.switch.len(),
        env.tg.len(),
        env.lhost.len()
    );
    Ok(env)
}
