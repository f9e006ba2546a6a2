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

//! # Topology Graph
//!
//! This module represents the wiring of the lab.

use crate::setup::SetupConfig;
use crate::topology::{
    ConfigurationError, Device, DeviceId, DeviceKind, Endpoint, Link, LinkId, LinkView, PortId,
    Role,
};

use itertools::Itertools;
use log::*;
use petgraph::graph::Graph;
use petgraph::Undirected;
use std::collections::{HashMap, HashSet};

/// Graph with the devices as nodes, and the cables as edges
pub type LabGraph = Graph<Device, Link, Undirected, u32>;

/// # Topology Graph
///
/// Static description of all lab devices, and the physical links between their ports. The graph
/// is built once from a [`SetupConfig`], and never changes afterwards. Thus, it can be shared
/// freely between threads.
///
/// Devices and links keep the order in which they were declared. All queries which return
/// multiple links return them in this order, such that the same query always yields the same
/// ports.
#[derive(Debug, Clone)]
pub struct TopologyGraph {
    name: String,
    graph: LabGraph,
    roles: HashMap<Role, DeviceId>,
    attachments: HashMap<Endpoint, LinkId>,
}

impl TopologyGraph {
    /// Build the graph from the setup description. This function validates the setup, and fails if
    /// a device role is declared twice, a role acronym does not match the device kind, a device
    /// declares a port twice, or a link references an unknown device or port, connects a device to
    /// itself, or reuses a port that is already cabled.
    pub fn from_setup(setup: &SetupConfig) -> Result<Self, ConfigurationError> {
        let mut graph = LabGraph::with_capacity(setup.devices.len(), setup.links.len());
        let mut roles: HashMap<Role, DeviceId> = HashMap::new();
        let mut attachments: HashMap<Endpoint, LinkId> = HashMap::new();
        let mut indices: HashSet<(DeviceKind, usize)> = HashSet::new();

        for decl in setup.devices.iter() {
            let index = match decl.acronym.split() {
                Some((kind, index)) if kind == decl.kind => index,
                _ => {
                    return Err(ConfigurationError::InvalidAcronym {
                        role: decl.acronym.clone(),
                        kind: decl.kind,
                    })
                }
            };
            // registries are keyed by the kind-local index
            if roles.contains_key(&decl.acronym) || !indices.insert((decl.kind, index)) {
                return Err(ConfigurationError::DuplicateRole(decl.acronym.clone()));
            }
            let mut seen: HashSet<&PortId> = HashSet::with_capacity(decl.ports.len());
            if let Some(port) = decl.ports.iter().find(|p| !seen.insert(*p)) {
                return Err(ConfigurationError::DuplicatePort {
                    role: decl.acronym.clone(),
                    port: port.clone(),
                });
            }

            let id = graph.add_node(Device {
                role: decl.acronym.clone(),
                kind: decl.kind,
                index,
                name: decl.name.clone(),
                ports: decl.ports.clone(),
            });
            roles.insert(decl.acronym.clone(), id);
        }

        for decl in setup.links.iter() {
            let (a, b) = decl.endpoints();
            let id_a = Self::lookup_endpoint(&graph, &roles, &a)?;
            let id_b = Self::lookup_endpoint(&graph, &roles, &b)?;
            if id_a == id_b {
                return Err(ConfigurationError::SelfLoop(a.role));
            }
            for endpoint in [&a, &b].iter() {
                if attachments.contains_key(*endpoint) {
                    return Err(ConfigurationError::PortInMultipleLinks((*endpoint).clone()));
                }
            }

            let link_id = LinkId::new(graph.edge_count());
            let link = Link { id: link_id, a: a.clone(), b: b.clone() };
            let added = graph.add_edge(id_a, id_b, link);
            debug_assert_eq!(added, link_id);
            attachments.insert(a, link_id);
            attachments.insert(b, link_id);
        }

        info!(
            "Topology {} built with {} devices and {} links",
            setup.name,
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self { name: setup.name.clone(), graph, roles, attachments })
    }

    fn lookup_endpoint(
        graph: &LabGraph,
        roles: &HashMap<Role, DeviceId>,
        endpoint: &Endpoint,
    ) -> Result<DeviceId, ConfigurationError> {
        let id = *roles
            .get(&endpoint.role)
            .ok_or_else(|| ConfigurationError::UnknownDevice(endpoint.role.clone()))?;
        if !graph[id].has_port(&endpoint.port) {
            return Err(ConfigurationError::UnknownPort {
                role: endpoint.role.clone(),
                port: endpoint.port.clone(),
            });
        }
        Ok(id)
    }

    /// Name of the topology, as given in the setup
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns a reference to the underlying graph
    pub fn get_graph(&self) -> &LabGraph {
        &self.graph
    }

    /// Number of devices
    pub fn num_devices(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of links
    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get the device with the given role, or `None` if there is no such device
    pub fn device(&self, role: &str) -> Option<&Device> {
        self.roles.get(role).map(|id| &self.graph[*id])
    }

    /// Iterate over all devices, in declaration order
    pub fn devices(&self) -> impl Iterator<Item = &Device> + '_ {
        self.graph.node_indices().map(move |id| &self.graph[id])
    }

    /// Iterate over all devices of the given kind, in declaration order
    pub fn devices_of_kind(&self, kind: DeviceKind) -> impl Iterator<Item = &Device> + '_ {
        self.devices().filter(move |d| d.kind == kind)
    }

    /// Iterate over all links, in declaration order
    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.graph.edge_indices().map(move |id| &self.graph[id])
    }

    /// Returns all links between the device `a` and the device `b`, in declaration order. Every
    /// link is oriented such that `near` is the endpoint on `a`. If one of the roles is unknown,
    /// or if there exists no link between them, an empty vector is returned.
    pub fn links_between(&self, a: &str, b: &str) -> Vec<LinkView<'_>> {
        let (id_a, id_b) = match (self.roles.get(a), self.roles.get(b)) {
            (Some(id_a), Some(id_b)) => (*id_a, *id_b),
            _ => return Vec::new(),
        };
        self.graph
            .edge_indices()
            .filter(|e| match self.graph.edge_endpoints(*e) {
                Some((s, t)) => (s == id_a && t == id_b) || (s == id_b && t == id_a),
                None => false,
            })
            .filter_map(|e| self.graph[e].oriented(a))
            .collect()
    }

    /// Returns the number of links between `a` and `b`
    pub fn count_links(&self, a: &str, b: &str) -> usize {
        self.links_between(a, b).len()
    }

    /// Returns the roles of all devices connected to `role`, each once, ordered by the first link
    /// connecting them.
    pub fn neighbors(&self, role: &str) -> Vec<&Role> {
        self.links().filter_map(|l| l.oriented(role)).map(|v| &v.far.role).unique().collect()
    }

    /// Returns the endpoint on the other side of the cable plugged into `port` of `role`. Returns
    /// `None` if the port is not cabled.
    pub fn peer(&self, role: &str, port: &PortId) -> Option<&Endpoint> {
        let link = self.attachments.get(&Endpoint::new(role, port))?;
        self.graph[*link].oriented(role).map(|v| v.far)
    }
}
