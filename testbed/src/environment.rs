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

//! # Test Environment
//!
//! Session-wide handle on the lab. The [`Environment`] owns the topology graph and one
//! [`DeviceHandle`] per connected device, grouped by kind. Tests receive the environment, ask it
//! for the ports they need with [`Environment::get_ports`], and talk to the devices through
//! `env.switch[i]`, `env.tg[i]` and `env.lhost[i]`.

use crate::control::{AdminState, DeviceError, OperState, PortControl};
use crate::ports::PortLifecycle;
use crate::resolver::{self, LinkQuery, PortMapping};
use crate::setup::SetupConfig;
use crate::topology::{
    ConfigurationError, Device, DeviceKind, PortId, Role, TopologyError, TopologyGraph,
};
use crate::Error;

use log::*;
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

/// # Device Handle
///
/// A device of the topology together with its control-plane client. The handle checks that every
/// port belongs to the device before forwarding a request to the client, and keeps track of the
/// admin lifecycle of each port it touched.
#[derive(Debug)]
pub struct DeviceHandle {
    device: Device,
    control: Box<dyn PortControl>,
    lifecycle: BTreeMap<PortId, PortLifecycle>,
}

impl DeviceHandle {
    /// Create a new handle
    pub fn new(device: Device, control: Box<dyn PortControl>) -> Self {
        Self { device, control, lifecycle: BTreeMap::new() }
    }

    /// The device as declared in the topology
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Role of the device
    pub fn role(&self) -> &Role {
        self.device.role()
    }

    /// Direct access to the client
    pub fn control(&mut self) -> &mut dyn PortControl {
        self.control.as_mut()
    }

    /// Change the administrative state of a port
    pub fn set_admin_state(&mut self, port: &PortId, state: AdminState) -> Result<(), DeviceError> {
        self.check_port(port)?;
        self.control.set_admin_state(port, state)?;
        let current = self.lifecycle.entry(port.clone()).or_insert(PortLifecycle::Unknown);
        *current = current.after_admin(state);
        trace!("{}: port {} is now {:?}", self.device.role(), port, current);
        Ok(())
    }

    /// Read the operational state of a port. Observing a pending port as up confirms it.
    pub fn operational_state(&mut self, port: &PortId) -> Result<OperState, DeviceError> {
        self.check_port(port)?;
        let state = self.control.operational_state(port)?;
        if state == OperState::Up {
            if let Some(current) = self.lifecycle.get_mut(port) {
                *current = current.confirmed();
            }
        }
        Ok(state)
    }

    /// Admin lifecycle of a port, as observed through this handle
    pub fn lifecycle(&self, port: &PortId) -> PortLifecycle {
        self.lifecycle.get(port).copied().unwrap_or(PortLifecycle::Unknown)
    }

    /// Run the cleanup hook of the client
    pub fn cleanup(&mut self) -> Result<(), DeviceError> {
        self.control.cleanup()
    }

    fn check_port(&self, port: &PortId) -> Result<(), DeviceError> {
        if self.device.has_port(port) {
            Ok(())
        } else {
            Err(DeviceError::UnknownPort(port.clone()))
        }
    }
}

/// # Device Registry
///
/// All handles of one device kind, indexed by the kind-local index of the device. `switch[2]` is
/// the handle of `sw2`.
#[derive(Debug)]
pub struct DeviceRegistry {
    kind: DeviceKind,
    handles: BTreeMap<usize, DeviceHandle>,
}

impl DeviceRegistry {
    /// Create an empty registry
    pub fn new(kind: DeviceKind) -> Self {
        Self { kind, handles: BTreeMap::new() }
    }

    /// Kind of all devices in this registry
    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Get the handle with the given index
    pub fn get(&self, index: usize) -> Option<&DeviceHandle> {
        self.handles.get(&index)
    }

    /// Get the handle with the given index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut DeviceHandle> {
        self.handles.get_mut(&index)
    }

    /// Get the handle by the role acronym. Returns `None` if the role belongs to a different kind.
    pub fn by_role(&self, role: &str) -> Option<&DeviceHandle> {
        self.index_of(role).and_then(move |i| self.handles.get(&i))
    }

    /// Get the handle by the role acronym
    pub fn by_role_mut(&mut self, role: &str) -> Option<&mut DeviceHandle> {
        match self.index_of(role) {
            Some(i) => self.handles.get_mut(&i),
            None => None,
        }
    }

    /// Returns true if the role names a device of the kind of this registry
    pub fn covers(&self, role: &str) -> bool {
        self.index_of(role).is_some()
    }

    fn index_of(&self, role: &str) -> Option<usize> {
        match Role::from(role).split() {
            Some((kind, index)) if kind == self.kind => Some(index),
            _ => None,
        }
    }

    /// Iterate over all handles, ordered by index
    pub fn iter(&self) -> impl Iterator<Item = &DeviceHandle> {
        self.handles.values()
    }

    /// Iterate over all handles, ordered by index
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DeviceHandle> {
        self.handles.values_mut()
    }

    /// Number of handles
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if the registry holds no handle
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn insert(&mut self, handle: DeviceHandle) -> Option<DeviceHandle> {
        self.handles.insert(handle.device.index(), handle)
    }
}

impl Index<usize> for DeviceRegistry {
    type Output = DeviceHandle;

    fn index(&self, index: usize) -> &Self::Output {
        match self.handles.get(&index) {
            Some(h) => h,
            None => panic!("No {} with index {} connected", self.kind, index),
        }
    }
}

impl IndexMut<usize> for DeviceRegistry {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let kind = self.kind;
        match self.handles.get_mut(&index) {
            Some(h) => h,
            None => panic!("No {} with index {} connected", kind, index),
        }
    }
}

/// # Environment
///
/// Owns the topology graph for the whole session, together with the handles of all connected
/// devices. The topology never changes after construction.
///
/// ```rust
/// use testbed::emulated::EmulatedDevice;
/// use testbed::example_setups::{ExampleSetup, Simplified};
/// use testbed::topology::TopologyGraph;
/// use testbed::Environment;
///
/// fn main() -> Result<(), testbed::Error> {
///     let topo = TopologyGraph::from_setup(&Simplified::setup())?;
///     let env = Environment::connect(topo, |d| Ok(Box::new(EmulatedDevice::from_device(d))))?;
///
///     let ports = env.get_ports(&[("tg1", "sw1", 2).into()])?;
///     assert_eq!(ports[("tg1", "sw1")][&2], "eth2".into());
///     assert_eq!(env.switch[1].role().as_str(), "sw1");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Environment {
    topology: TopologyGraph,
    /// Switches, indexed by their index (`switch[1]` is `sw1`)
    pub switch: DeviceRegistry,
    /// Traffic generators, indexed by their index (`tg[1]` is `tg1`)
    pub tg: DeviceRegistry,
    /// Linux hosts, indexed by their index (`lhost[1]` is `lhost1`)
    pub lhost: DeviceRegistry,
}

impl Environment {
    /// Create an environment without any connected device
    pub fn new(topology: TopologyGraph) -> Self {
        Self {
            topology,
            switch: DeviceRegistry::new(DeviceKind::Switch),
            tg: DeviceRegistry::new(DeviceKind::TrafficGenerator),
            lhost: DeviceRegistry::new(DeviceKind::LinuxHost),
        }
    }

    /// Build the topology from the setup, without connecting to any device
    pub fn from_setup(setup: &SetupConfig) -> Result<Self, ConfigurationError> {
        Ok(Self::new(TopologyGraph::from_setup(setup)?))
    }

    /// Create the environment and connect to every device of the topology, in declaration order.
    /// The `connect` function creates the client for a single device. Fails if two devices end up
    /// in the same registry slot.
    pub fn connect<F>(topology: TopologyGraph, mut connect: F) -> Result<Self, Error>
    where
        F: FnMut(&Device) -> Result<Box<dyn PortControl>, DeviceError>,
    {
        let mut env = Self::new(topology);
        let devices: Vec<Device> = env.topology.devices().cloned().collect();
        for device in devices {
            let control = connect(&device)?;
            info!("Connected to {} ({})", device.role(), device.name());
            let role = device.role().clone();
            let registry = env.registry_mut(device.kind());
            if registry.insert(DeviceHandle::new(device, control)).is_some() {
                return Err(ConfigurationError::DuplicateRole(role).into());
            }
        }
        Ok(env)
    }

    /// Attach a client to the device with the given role. An existing handle is replaced.
    pub fn attach(
        &mut self,
        role: &str,
        control: Box<dyn PortControl>,
    ) -> Result<(), ConfigurationError> {
        let device = self
            .topology
            .device(role)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownDevice(Role::from(role)))?;
        let registry = self.registry_mut(device.kind());
        if registry.insert(DeviceHandle::new(device, control)).is_some() {
            warn!("Replaced the handle of {}", role);
        }
        Ok(())
    }

    /// The topology of the lab
    pub fn topology(&self) -> &TopologyGraph {
        &self.topology
    }

    /// All handles of the given kind
    pub fn registry(&self, kind: DeviceKind) -> &DeviceRegistry {
        match kind {
            DeviceKind::Switch => &self.switch,
            DeviceKind::TrafficGenerator => &self.tg,
            DeviceKind::LinuxHost => &self.lhost,
        }
    }

    /// All handles of the given kind
    pub fn registry_mut(&mut self, kind: DeviceKind) -> &mut DeviceRegistry {
        match kind {
            DeviceKind::Switch => &mut self.switch,
            DeviceKind::TrafficGenerator => &mut self.tg,
            DeviceKind::LinuxHost => &mut self.lhost,
        }
    }

    /// Resolve link queries on the topology. See [`resolver::resolve`].
    pub fn get_ports(&self, queries: &[LinkQuery]) -> Result<PortMapping, TopologyError> {
        resolver::resolve(&self.topology, queries)
    }

    /// Returns true if the topology can satisfy all queries
    pub fn supports(&self, queries: &[LinkQuery]) -> bool {
        resolver::resolve(&self.topology, queries).is_ok()
    }

    /// Tear down the session. The cleanup hook of every handle is called, even if an earlier one
    /// failed. The first error is returned.
    pub fn teardown(mut self) -> Result<(), DeviceError> {
        let mut result = Ok(());
        for kind in DeviceKind::ALL.iter() {
            for handle in self.registry_mut(*kind).iter_mut() {
                if let Err(e) = handle.cleanup() {
                    error!("Cleanup of {} failed: {}", handle.role(), e);
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
            }
        }
        info!("Environment {} torn down", self.topology.name());
        result
    }
}
