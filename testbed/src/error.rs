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

//! Module containing all error types

use crate::control::DeviceError;
use crate::ports::{PortStateError, PortStateTimeoutError};
use crate::topology::{ConfigurationError, TopologyError};
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// The setup is malformed or inconsistent
    #[error("Configuration Error: {0}")]
    ConfigurationError(#[from] ConfigurationError),
    /// A link query cannot be satisfied
    #[error("Topology Error: {0}")]
    TopologyError(#[from] TopologyError),
    /// A bulk port operation failed
    #[error("Port State Error: {0}")]
    PortStateError(#[from] PortStateError),
    /// A device client failed
    #[error("Device Error: {0}")]
    DeviceError(#[from] DeviceError),
}

impl From<PortStateTimeoutError> for Error {
    fn from(cause: PortStateTimeoutError) -> Self {
        Self::PortStateError(PortStateError::Timeout(cause))
    }
}
