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


//! # Linux Host Sample

use super::{eth_ports, ExampleSetup};
use crate::setup::SetupConfig;
use crate::topology::DeviceKind::*;

/// # Linux Host Sample
///
/// One switch, one traffic generator with two cables to the switch (`eth1-1`, `eth2-2`), and one
/// linux host with two cables to the switch (`eth1-7`, `eth2-8`).
pub struct LinuxHostSample {}

impl ExampleSetup for LinuxHostSample {
    fn setup() -> SetupConfig {
        let mut setup = SetupConfig::new("lhost");
        setup
            .add_device("sw1", Switch, 1..=8u32)
            .add_device("tg1", TrafficGenerator, eth_ports(2))
            .add_device("lhost1", LinuxHost, eth_ports(2))
            .add_link("tg1", "eth1", "sw1", 1u32)
            .add_link("tg1", "eth2", "sw1", 2u32)
            .add_link("lhost1", "eth1", "sw1", 7u32)
            .add_link("lhost1", "eth2", "sw1", 8u32);
        setup
    }
}
