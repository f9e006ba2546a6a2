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

//! # Device Control
//!
//! The interface every device client has to provide in order to be managed by the
//! [`Environment`](crate::environment::Environment). The wire protocol of the client (telnet, REST,
//! XML-RPC, ...) is up to the implementation.

use crate::topology::PortId;

use std::fmt;
use thiserror::Error;

/// Administrative state of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminState {
    /// Port is enabled
    Up,
    /// Port is disabled
    Down,
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "Enabled"),
            Self::Down => write!(f, "Disabled"),
        }
    }
}

/// Operational state of a port, as observed by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperState {
    /// Link is up
    Up,
    /// Link is down
    Down,
}

impl OperState {
    /// The operational state expected after the admin state was applied and the link settled
    pub fn expected_for(admin: AdminState) -> Self {
        match admin {
            AdminState::Up => Self::Up,
            AdminState::Down => Self::Down,
        }
    }
}

impl fmt::Display for OperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "Up"),
            Self::Down => write!(f, "Down"),
        }
    }
}

/// Error reported by a device client
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The port does not exist on the device
    #[error("Port {0} does not exist on the device")]
    UnknownPort(PortId),
    /// The device refused the request
    #[error("Request on port {port} was rejected: {reason}")]
    Rejected {
        /// Port on which the request was issued
        port: PortId,
        /// Reason given by the device
        reason: String,
    },
    /// The answer of the device could not be understood
    #[error("Unexpected answer from the device: {0}")]
    UnexpectedResponse(String),
    /// The connection to the device failed
    #[error("Connection Error: {0}")]
    Connection(String),
    /// IO Error
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

/// # Port Control
///
/// Control-plane client of a single device, restricted to the port operations which are needed
/// to isolate test traffic. Everything else a device can do (VLANs, ACLs, LAGs, traffic streams)
/// lives in separate clients, and is of no concern to the environment.
///
/// All methods are blocking.
pub trait PortControl: fmt::Debug {
    /// Change the administrative state of a port.
    fn set_admin_state(&mut self, port: &PortId, state: AdminState) -> Result<(), DeviceError>;

    /// Read the current operational state of a port.
    fn operational_state(&mut self, port: &PortId) -> Result<OperState, DeviceError>;

    /// Called once when the session is torn down. The default implementation does nothing.
    fn cleanup(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}
