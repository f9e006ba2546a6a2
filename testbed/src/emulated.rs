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

//! # Emulated Device
//!
//! In-memory [`PortControl`] implementation, used for dry runs and for testing everything above the
//! device clients. Every port starts enabled and up. After a port is enabled, it reports
//! operational up only after a configurable number of status polls, which emulates the time a real
//! link needs to come up.
//!
//! Clones share the same state, such that a test can keep a clone to inspect the device after the
//! original was handed to an [`Environment`](crate::Environment):
//!
//! ```rust
//! use testbed::control::{AdminState, PortControl};
//! use testbed::emulated::{EmulatedDevice, Operation};
//!
//! let mut dev = EmulatedDevice::new(vec![1u32, 2, 3]);
//! let probe = dev.clone();
//! dev.set_admin_state(&2u32.into(), AdminState::Down).unwrap();
//!
//! assert_eq!(probe.admin_state(&2u32.into()), Some(AdminState::Down));
//! assert_eq!(probe.journal(), vec![Operation::SetAdminState(2u32.into(), AdminState::Down)]);
//! ```

use crate::control::{AdminState, DeviceError, OperState, PortControl};
use crate::topology::{Device, PortId};

use log::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Request received by an emulated device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Admin state change of a port
    SetAdminState(PortId, AdminState),
    /// Cleanup hook
    Cleanup,
}

#[derive(Debug, Clone, Copy)]
struct EmulatedPort {
    admin: AdminState,
    /// Polls left until the port reports up
    settling: usize,
}

#[derive(Debug, Default)]
struct DeviceState {
    ports: BTreeMap<PortId, EmulatedPort>,
    link_up_delay: usize,
    rejected: BTreeSet<PortId>,
    faulty: BTreeSet<PortId>,
    fail_cleanup: bool,
    journal: Vec<Operation>,
}

/// # Emulated Device
///
/// See the [module documentation](self).
#[derive(Debug, Clone)]
pub struct EmulatedDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl EmulatedDevice {
    /// Create a device with the given ports, all enabled and up
    pub fn new<P: Into<PortId>>(ports: impl IntoIterator<Item = P>) -> Self {
        let ports = ports
            .into_iter()
            .map(|p| (p.into(), EmulatedPort { admin: AdminState::Up, settling: 0 }))
            .collect();
        Self { state: Arc::new(Mutex::new(DeviceState { ports, ..Default::default() })) }
    }

    /// Create a device with the ports of the device in the topology
    pub fn from_device(device: &Device) -> Self {
        Self::new(device.ports().iter())
    }

    /// Number of status polls after enabling a port, before the port reports up
    pub fn link_up_delay(self, polls: usize) -> Self {
        self.lock().link_up_delay = polls;
        self
    }

    /// Admin requests on this port are rejected
    pub fn reject(self, port: impl Into<PortId>) -> Self {
        self.lock().rejected.insert(port.into());
        self
    }

    /// This port never reports up
    pub fn faulty(self, port: impl Into<PortId>) -> Self {
        self.lock().faulty.insert(port.into());
        self
    }

    /// The cleanup hook fails
    pub fn fail_cleanup(self) -> Self {
        self.lock().fail_cleanup = true;
        self
    }

    /// Set the admin state of every port, without recording it in the journal. Ports are settled.
    pub fn with_initial_state(self, admin: AdminState) -> Self {
        self.lock().ports.values_mut().for_each(|p| *p = EmulatedPort { admin, settling: 0 });
        self
    }

    /// Current admin state of a port
    pub fn admin_state(&self, port: &PortId) -> Option<AdminState> {
        self.lock().ports.get(port).map(|p| p.admin)
    }

    /// All ports which are currently enabled
    pub fn enabled_ports(&self) -> Vec<PortId> {
        self.lock()
            .ports
            .iter()
            .filter(|(_, p)| p.admin == AdminState::Up)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// All requests received so far, in order
    pub fn journal(&self) -> Vec<Operation> {
        self.lock().journal.clone()
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PortControl for EmulatedDevice {
    fn set_admin_state(&mut self, port: &PortId, state: AdminState) -> Result<(), DeviceError> {
        let mut dev = self.lock();
        if dev.rejected.contains(port) {
            return Err(DeviceError::Rejected {
                port: port.clone(),
                reason: "port is locked".to_string(),
            });
        }
        let delay = dev.link_up_delay;
        let entry = dev.ports.get_mut(port).ok_or_else(|| DeviceError::UnknownPort(port.clone()))?;
        if entry.admin != state {
            *entry = EmulatedPort { admin: state, settling: delay };
        }
        dev.journal.push(Operation::SetAdminState(port.clone(), state));
        trace!("emulated: port {} set to {}", port, state);
        Ok(())
    }

    fn operational_state(&mut self, port: &PortId) -> Result<OperState, DeviceError> {
        let mut dev = self.lock();
        let faulty = dev.faulty.contains(port);
        let entry = dev.ports.get_mut(port).ok_or_else(|| DeviceError::UnknownPort(port.clone()))?;
        Ok(match entry.admin {
            AdminState::Down => OperState::Down,
            AdminState::Up if faulty => OperState::Down,
            AdminState::Up if entry.settling > 0 => {
                entry.settling -= 1;
                OperState::Down
            }
            AdminState::Up => OperState::Up,
        })
    }

    fn cleanup(&mut self) -> Result<(), DeviceError> {
        let mut dev = self.lock();
        dev.journal.push(Operation::Cleanup);
        if dev.fail_cleanup {
            Err(DeviceError::Connection("session already closed".to_string()))
        } else {
            Ok(())
        }
    }
}
