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


//! # Simplified Setup

use super::{eth_ports, ExampleSetup};
use crate::setup::SetupConfig;
use crate::topology::DeviceKind::*;

/// # Simplified
///
/// One switch with 8 ports and one traffic generator with 4 interfaces. The interface `eth{i}` of
/// the traffic generator is connected to port `i` of the switch.
///
/// ```text
///          eth1 -- 1
///  tg1     eth2 -- 2     sw1
///          eth3 -- 3
///          eth4 -- 4
/// ```
pub struct Simplified {}

impl ExampleSetup for Simplified {
    fn setup() -> SetupConfig {
        let mut setup = SetupConfig::new("simplified");
        setup.add_device("sw1", Switch, 1..=8u32).add_device("tg1", TrafficGenerator, eth_ports(4));
        for i in 1..=4u32 {
            setup.add_link("tg1", format!("eth{}", i), "sw1", i);
        }
        setup
    }
}
