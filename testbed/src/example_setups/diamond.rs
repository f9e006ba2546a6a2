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


//! # Diamond Setup

use super::{eth_ports, ExampleSetup};
use crate::setup::SetupConfig;
use crate::topology::DeviceKind::*;

/// # Diamond
///
/// Four switches arranged in a diamond. Every switch is connected to the traffic generator on port
/// 1 (`sw{i}` to `eth{i}`).
///
/// ```text
///         sw1
///     2 /     \ 3
///   2  /       \  2
///    sw2       sw3
///   3  \       /  3
///     2 \     / 3
///         sw4
/// ```
pub struct Diamond {}

impl ExampleSetup for Diamond {
    fn setup() -> SetupConfig {
        let mut setup = SetupConfig::new("diamond");
        for sw in ["sw1", "sw2", "sw3", "sw4"].iter() {
            setup.add_device(*sw, Switch, 1..=8u32);
        }
        setup.add_device("tg1", TrafficGenerator, eth_ports(4));

        for (i, sw) in ["sw1", "sw2", "sw3", "sw4"].iter().enumerate() {
            setup.add_link("tg1", format!("eth{}", i + 1), *sw, 1u32);
        }

        setup
            .add_link("sw1", 2u32, "sw2", 2u32)
            .add_link("sw1", 3u32, "sw3", 2u32)
            .add_link("sw2", 3u32, "sw4", 2u32)
            .add_link("sw3", 3u32, "sw4", 3u32);
        setup
    }
}
