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

//! # Link Query Resolver
//!
//! Turns abstract requests like "4 links between `tg1` and `sw1`" into the concrete ports on both
//! sides. The result is a [`PortMapping`], keyed by the ordered role pair:
//!
//! ```text
//! (tg1, sw1): {1: eth1, 2: eth2, 3: eth3, 4: eth4}
//! (sw1, tg1): {1: 1,    2: 2,    3: 3,    4: 4   }
//! ```
//!
//! Index `i` on both sides always refers to the same cable. Links are picked in declaration order,
//! so the same query on the same topology always yields the same mapping.

use crate::topology::{PortId, Role, TopologyError, TopologyGraph};

use itertools::Itertools;
use log::*;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;
use thiserror::Error;

/// # Link Query
///
/// Request for `count` links between the device `a` and the device `b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkQuery {
    /// First role
    pub a: Role,
    /// Second role
    pub b: Role,
    /// Number of links to select
    pub count: usize,
}

impl LinkQuery {
    /// Create a new link query
    pub fn new(a: impl Into<Role>, b: impl Into<Role>, count: usize) -> Self {
        Self { a: a.into(), b: b.into(), count }
    }
}

impl<A, B> From<(A, B, usize)> for LinkQuery
where
    A: Into<Role>,
    B: Into<Role>,
{
    fn from((a, b, count): (A, B, usize)) -> Self {
        Self::new(a, b, count)
    }
}

impl fmt::Display for LinkQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.a, self.b, self.count)
    }
}

/// Error while parsing a link query from a string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid link query `{0}`, expected `<role>:<role>:<count>`")]
pub struct ParseLinkQueryError(String);

impl FromStr for LinkQuery {
    type Err = ParseLinkQueryError;

    /// Parse a query written as `tg1:sw1:4`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLinkQueryError(s.to_string());
        let mut parts = s.trim().split(':');
        let a = parts.next().filter(|x| !x.is_empty()).ok_or_else(err)?;
        let b = parts.next().filter(|x| !x.is_empty()).ok_or_else(err)?;
        let count = parts.next().and_then(|x| x.parse::<usize>().ok()).ok_or_else(err)?;
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self::new(a, b, count))
    }
}

/// # Port Mapping
///
/// Result of a link query. For every ordered role pair `(a, b)`, the mapping stores the logical
/// link index (starting at 1) together with the port on device `a`. The reversed pair `(b, a)`
/// stores the ports on device `b` for the same indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortMapping {
    map: BTreeMap<(Role, Role), BTreeMap<usize, PortId>>,
}

impl PortMapping {
    /// Get the ports on `a` which connect to `b`, keyed by the logical index
    pub fn get(&self, a: &str, b: &str) -> Option<&BTreeMap<usize, PortId>> {
        self.map.get(&(Role::from(a), Role::from(b)))
    }

    /// Get the port on `a` of the link with the logical `index` towards `b`
    pub fn port(&self, a: &str, b: &str, index: usize) -> Option<&PortId> {
        self.get(a, b).and_then(|ports| ports.get(&index))
    }

    /// Get all ports on `a` towards `b`, ordered by their logical index
    pub fn ports(&self, a: &str, b: &str) -> Vec<&PortId> {
        self.get(a, b).map(|ports| ports.values().collect()).unwrap_or_default()
    }

    /// Get all ports of the device `role` used by any entry, each port only once
    pub fn ports_of(&self, role: &str) -> Vec<&PortId> {
        self.map
            .iter()
            .filter(|((owner, _), _)| owner.as_str() == role)
            .flat_map(|(_, ports)| ports.values())
            .unique()
            .collect()
    }

    /// Iterate over all entries, ordered by the role pair
    pub fn iter(&self) -> impl Iterator<Item = (&(Role, Role), &BTreeMap<usize, PortId>)> {
        self.map.iter()
    }

    /// Number of role pairs (each query adds two)
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the mapping contains no entries
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Index<(&str, &str)> for PortMapping {
    type Output = BTreeMap<usize, PortId>;

    fn index(&self, (a, b): (&str, &str)) -> &Self::Output {
        match self.get(a, b) {
            Some(ports) => ports,
            None => panic!("No ports resolved for ({}, {})", a, b),
        }
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ((a, b), ports) in self.map.iter() {
            writeln!(
                f,
                "({}, {}): {{{}}}",
                a,
                b,
                ports.iter().map(|(i, p)| format!("{}: {}", i, p)).join(", ")
            )?;
        }
        Ok(())
    }
}

/// Resolve the link queries on the topology.
///
/// For every query, the first `count` links between the two roles (in declaration order) are
/// selected and recorded on both sides. The results of all queries are merged into one mapping. If
/// the same role pair is requested twice, a warning is logged and the later query wins.
///
/// The function fails with a [`TopologyError`] if a role is unknown, if a query asks for zero
/// links, or if there are fewer links than requested. In this case, no partial mapping is returned.
pub fn resolve(graph: &TopologyGraph, queries: &[LinkQuery]) -> Result<PortMapping, TopologyError> {
    let mut mapping = PortMapping::default();

    for query in queries.iter() {
        for role in [&query.a, &query.b].iter() {
            if graph.device(role.as_str()).is_none() {
                return Err(TopologyError::UnknownRole((*role).clone()));
            }
        }
        if query.count == 0 {
            return Err(TopologyError::InvalidCount { a: query.a.clone(), b: query.b.clone() });
        }

        let links = graph.links_between(query.a.as_str(), query.b.as_str());
        if links.len() < query.count {
            return Err(TopologyError::InsufficientLinks {
                a: query.a.clone(),
                b: query.b.clone(),
                requested: query.count,
                available: links.len(),
            });
        }

        let forward = (query.a.clone(), query.b.clone());
        let backward = (query.b.clone(), query.a.clone());
        if mapping.map.contains_key(&forward) || mapping.map.contains_key(&backward) {
            warn!("Link query {} overwrites an earlier query for the same devices", query);
        }

        let (near, far): (BTreeMap<usize, PortId>, BTreeMap<usize, PortId>) = links
            .iter()
            .take(query.count)
            .enumerate()
            .map(|(i, link)| ((i + 1, link.near.port.clone()), (i + 1, link.far.port.clone())))
            .unzip();

        debug!(
            "Resolved {}: {} -> [{}]",
            query,
            query.a,
            near.values().map(|p| p.to_string()).join(", ")
        );

        mapping.map.insert(forward, near);
        mapping.map.insert(backward, far);
    }

    Ok(mapping)
}
