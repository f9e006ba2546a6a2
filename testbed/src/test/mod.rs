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


#[cfg(test)]
mod test_resolver;
#[cfg(test)]
mod test_setup;
#[cfg(test)]
mod test_topology;

#[cfg(test)]
use crate::{emulated::EmulatedDevice, setup::SetupConfig, topology::*, Environment};
#[cfg(test)]
use std::collections::BTreeMap;

/// Connect an environment with emulated devices. Returns the environment together with a clone of
/// every emulated device, to inspect them afterwards.
#[cfg(test)]
fn emulated_env<F>(
    setup: SetupConfig,
    mut configure: F,
) -> (Environment, BTreeMap<Role, EmulatedDevice>)
where
    F: FnMut(&Device, EmulatedDevice) -> EmulatedDevice,
{
    let topo = TopologyGraph::from_setup(&setup).unwrap();
    let mut probes = BTreeMap::new();
    let env = Environment::connect(topo, |d| {
        let dev = configure(d, EmulatedDevice::from_device(d));
        probes.insert(d.role().clone(), dev.clone());
        Ok(Box::new(dev))
    })
    .unwrap();
    (env, probes)
}
