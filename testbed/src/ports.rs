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

//! # Port Admin State
//!
//! Bulk operations on the administrative state of ports. A typical test first disables every port
//! of the switches, and then enables only the ports returned by the link query, such that no
//! traffic leaks over other cables:
//!
//! ```rust
//! use testbed::emulated::EmulatedDevice;
//! use testbed::example_setups::{ExampleSetup, Simplified};
//! use testbed::ports::{self, WaitOptions};
//! use testbed::topology::TopologyGraph;
//! use testbed::Environment;
//! use std::time::Duration;
//!
//! fn main() -> Result<(), testbed::Error> {
//!     let topo = TopologyGraph::from_setup(&Simplified::setup())?;
//!     let mut env = Environment::connect(topo, |d| Ok(Box::new(EmulatedDevice::from_device(d))))?;
//!     let active_ports = env.get_ports(&[("tg1", "sw1", 3).into()])?;
//!
//!     let wait = WaitOptions::new(Duration::from_secs(1)).poll_interval(Duration::from_millis(1));
//!     ports::disable_all_ports(&mut env.switch, None)?;
//!     ports::enable_ports(&mut env.switch, &active_ports, Some(&wait))?;
//!     Ok(())
//! }
//! ```
//!
//! Disabling is best effort: a port which cannot be disabled is logged, and the remaining ports are
//! still processed. The error is only reported once all ports were handled.

use crate::control::{AdminState, DeviceError, OperState};
use crate::environment::DeviceRegistry;
use crate::resolver::PortMapping;
use crate::topology::{Endpoint, Role};

use itertools::Itertools;
use log::*;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const DEFAULT_TIMEOUT_S: u64 = 30;
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// How long, and how often, to poll the operational state of ports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Give up after this duration
    pub timeout: Duration,
    /// Sleep between two polls
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_S),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    /// Wait at most `timeout`, using the default poll interval
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, ..Default::default() }
    }

    /// Change the poll interval
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// # Port Lifecycle
///
/// Admin state of a port, as far as it was observed through a
/// [`DeviceHandle`](crate::environment::DeviceHandle):
///
/// ```text
/// Unknown --disable--> AdminDown --enable--> AdminUp{pending} --status up--> AdminUp{confirmed}
///                          ^                        |
///                          +-------disable----------+
/// ```
///
/// A port which never reports up stays pending. Its real state is left to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortLifecycle {
    /// No admin request was issued yet
    Unknown,
    /// The port was disabled
    AdminDown,
    /// The port was enabled. `confirmed` is set once the port reported operational up.
    AdminUp {
        /// The port reported operational up
        confirmed: bool,
    },
}

impl PortLifecycle {
    /// State after an admin request was issued successfully
    pub fn after_admin(self, state: AdminState) -> Self {
        match (self, state) {
            (_, AdminState::Down) => Self::AdminDown,
            (Self::AdminUp { confirmed: true }, AdminState::Up) => self,
            (_, AdminState::Up) => Self::AdminUp { confirmed: false },
        }
    }

    /// State after the port reported operational up
    pub fn confirmed(self) -> Self {
        match self {
            Self::AdminUp { .. } => Self::AdminUp { confirmed: true },
            other => other,
        }
    }

    /// Returns true if the port was enabled, but did not yet report up
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::AdminUp { confirmed: false })
    }
}

/// Admin request which failed on a single port
#[derive(Debug)]
pub struct PortFailure {
    /// Port on which the request failed
    pub endpoint: Endpoint,
    /// Error returned by the device
    pub error: DeviceError,
}

impl fmt::Display for PortFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.endpoint, self.error)
    }
}

/// Ports did not reach the expected operational state in time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Ports did not become {expected} within {timeout:?}: {}", .pending.iter().join(", "))]
pub struct PortStateTimeoutError {
    /// Expected operational state
    pub expected: OperState,
    /// Configured timeout
    pub timeout: Duration,
    /// Ports which still did not reach the expected state
    pub pending: Vec<Endpoint>,
}

/// Error of the bulk port operations
#[derive(Error, Debug)]
pub enum PortStateError {
    /// Some admin requests failed. All other ports were still processed.
    #[error("Admin state change failed on {} port(s): {}", .0.len(), .0.iter().join(", "))]
    AdminState(Vec<PortFailure>),
    /// Waiting for the operational state timed out
    #[error(transparent)]
    Timeout(#[from] PortStateTimeoutError),
    /// The mapping references a device for which no handle is connected
    #[error("No handle connected for device {0}")]
    MissingHandle(Role),
}

/// Disable every port of every device in the registry.
///
/// A port which cannot be disabled does not stop the operation. After all ports were handled, a
/// [`PortStateError::AdminState`] lists all ports which failed. If `wait` is given, and all ports
/// were disabled successfully, the function blocks until every port reports operational down.
pub fn disable_all_ports(
    devices: &mut DeviceRegistry,
    wait: Option<&WaitOptions>,
) -> Result<(), PortStateError> {
    let mut failures: Vec<PortFailure> = Vec::new();
    let mut disabled: Vec<Endpoint> = Vec::new();

    for handle in devices.iter_mut() {
        let ports = handle.device().ports().to_vec();
        for port in ports {
            let endpoint = Endpoint::new(handle.role(), &port);
            match handle.set_admin_state(&port, AdminState::Down) {
                Ok(()) => disabled.push(endpoint),
                Err(error) => {
                    warn!("Cannot disable port {}: {}", endpoint, error);
                    failures.push(PortFailure { endpoint, error });
                }
            }
        }
    }

    info!("Disabled {} ports on all {} devices", disabled.len(), devices.kind());

    if !failures.is_empty() {
        return Err(PortStateError::AdminState(failures));
    }
    match wait {
        Some(options) => wait_for_ports(devices, &disabled, OperState::Down, options),
        None => Ok(()),
    }
}

/// Enable exactly the ports of `mapping` which belong to devices in the registry. Every port is
/// enabled once, even if it appears in multiple entries of the mapping. Entries of other device
/// kinds are ignored.
///
/// If `wait` is given, the function blocks until every enabled port reports operational up, and
/// fails with [`PortStateTimeoutError`] naming the ports which did not come up in time.
pub fn enable_ports(
    devices: &mut DeviceRegistry,
    mapping: &PortMapping,
    wait: Option<&WaitOptions>,
) -> Result<(), PortStateError> {
    let targets: Vec<Endpoint> = mapping
        .iter()
        .filter(|((owner, _), _)| devices.covers(owner.as_str()))
        .flat_map(|((owner, _), ports)| ports.values().map(move |p| Endpoint::new(owner, p)))
        .unique()
        .collect();

    if let Some(missing) =
        targets.iter().find(|e| devices.by_role(e.role.as_str()).is_none()).map(|e| &e.role)
    {
        return Err(PortStateError::MissingHandle(missing.clone()));
    }

    let mut failures: Vec<PortFailure> = Vec::new();
    for endpoint in targets.iter() {
        let handle = devices
            .by_role_mut(endpoint.role.as_str())
            .ok_or_else(|| PortStateError::MissingHandle(endpoint.role.clone()))?;
        if let Err(error) = handle.set_admin_state(&endpoint.port, AdminState::Up) {
            warn!("Cannot enable port {}: {}", endpoint, error);
            failures.push(PortFailure { endpoint: endpoint.clone(), error });
        }
    }

    info!("Enabled ports [{}]", targets.iter().join(", "));

    if !failures.is_empty() {
        return Err(PortStateError::AdminState(failures));
    }
    match wait {
        Some(options) => wait_for_ports(devices, &targets, OperState::Up, options),
        None => Ok(()),
    }
}

/// Poll the operational state of the ports until all of them report `expected`. A port whose state
/// cannot be read is treated as not yet ready. Fails with [`PortStateTimeoutError`] once the
/// timeout has passed.
pub fn wait_for_ports(
    devices: &mut DeviceRegistry,
    ports: &[Endpoint],
    expected: OperState,
    options: &WaitOptions,
) -> Result<(), PortStateError> {
    let start = Instant::now();
    let mut pending: Vec<Endpoint> = ports.to_vec();

    loop {
        let mut not_ready: Vec<Endpoint> = Vec::new();
        for endpoint in pending.into_iter() {
            let handle = devices
                .by_role_mut(endpoint.role.as_str())
                .ok_or_else(|| PortStateError::MissingHandle(endpoint.role.clone()))?;
            match handle.operational_state(&endpoint.port) {
                Ok(state) if state == expected => {}
                Ok(_) => not_ready.push(endpoint),
                Err(e) => {
                    debug!("Cannot read the state of {}: {}", endpoint, e);
                    not_ready.push(endpoint);
                }
            }
        }
        pending = not_ready;

        if pending.is_empty() {
            debug!("All ports are {} after {:?}", expected, start.elapsed());
            return Ok(());
        }
        if start.elapsed() >= options.timeout {
            error!(
                "Ports did not become {} within {:?}: {}",
                expected,
                options.timeout,
                pending.iter().join(", ")
            );
            let timeout = options.timeout;
            return Err(PortStateTimeoutError { expected, timeout, pending }.into());
        }
        debug!("Waiting for {} ports to become {}", pending.len(), expected);
        thread::sleep(options.poll_interval);
    }
}
