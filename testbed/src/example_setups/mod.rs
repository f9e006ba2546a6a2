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


//! Predefined lab setups, used by tests and as templates for new setup files.

use crate::setup::SetupConfig;
use crate::topology::DeviceKind;

mod simplified;
pub use simplified::Simplified;

mod golden;
pub use golden::Golden;

mod diamond;
pub use diamond::Diamond;

mod lhost;
pub use lhost::LinuxHostSample;

/// Trait for easier access to example setups.
pub trait ExampleSetup {
    /// Get the setup description
    fn setup() -> SetupConfig;
}

/// # Standalone
///
/// A single switch with 8 ports, and no cables at all. Only useful for tests which do not send any
/// traffic.
pub struct Standalone {}

impl ExampleSetup for Standalone {
    fn setup() -> SetupConfig {
        let mut setup = SetupConfig::new("standalone");
        setup.add_device("sw1", DeviceKind::Switch, 1..=8u32);
        setup
    }
}

/// Get the example setup by its name (`standalone`, `simplified`, `golden`, `diamond` or `lhost`).
pub fn by_name(name: &str) -> Option<SetupConfig> {
    match name {
        "standalone" => Some(Standalone::setup()),
        "simplified" => Some(Simplified::setup()),
        "golden" => Some(Golden::setup()),
        "diamond" => Some(Diamond::setup()),
        "lhost" => Some(LinuxHostSample::setup()),
        _ => None,
    }
}

/// Interface names `eth1` to `eth{n}`
pub(crate) fn eth_ports(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("eth{}", i)).collect()
}
