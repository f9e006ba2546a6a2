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


//! # Golden Setup

use super::{eth_ports, ExampleSetup};
use crate::setup::SetupConfig;
use crate::topology::DeviceKind::*;

/// # Golden
///
/// Three switches in a triangle. Every switch is connected to the traffic generator with two
/// cables (ports 1 and 2), and to each of the other switches with one cable.
///
/// ```text
///            tg1
///        /    |    \
///     sw1 -- sw2 -- sw3
///      \____________/
/// ```
///
/// | Link        | Ports          |
/// |-------------|----------------|
/// | tg1 -- sw1  | eth1-1, eth2-2 |
/// | tg1 -- sw2  | eth3-1, eth4-2 |
/// | tg1 -- sw3  | eth5-1, eth6-2 |
/// | sw1 -- sw2  | 5-5            |
/// | sw1 -- sw3  | 6-5            |
/// | sw2 -- sw3  | 6-6            |
pub struct Golden {}

impl ExampleSetup for Golden {
    fn setup() -> SetupConfig {
        let mut setup = SetupConfig::new("golden");
        setup
            .add_device("sw1", Switch, 1..=8u32)
            .add_device("sw2", Switch, 1..=8u32)
            .add_device("sw3", Switch, 1..=8u32)
            .add_device("tg1", TrafficGenerator, eth_ports(6));

        for (i, sw) in ["sw1", "sw2", "sw3"].iter().enumerate() {
            let i = i as u32;
            setup
                .add_link("tg1", format!("eth{}", 2 * i + 1), *sw, 1u32)
                .add_link("tg1", format!("eth{}", 2 * i + 2), *sw, 2u32);
        }

        setup
            .add_link("sw1", 5u32, "sw2", 5u32)
            .add_link("sw1", 6u32, "sw3", 5u32)
            .add_link("sw2", 6u32, "sw3", 6u32);
        setup
    }
}
