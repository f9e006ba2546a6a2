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


//! Test loading setup descriptions.

use crate::example_setups::*;
use crate::setup::{LinkDecl, SetupConfig};
use crate::topology::{ConfigurationError, DeviceKind, PortId, TopologyGraph};

const SETUP: &str = r#"{
  "name": "lab-42",
  "devices": [
    { "acronym": "sw1", "kind": "switch", "name": "leaf-a", "ports": [1, 2, 3, 4] },
    { "acronym": "tg1", "kind": "tg", "ports": ["eth1", "eth2"] },
    { "acronym": "lhost1", "kind": "lhost", "ports": ["ens3"] }
  ],
  "links": [
    ["tg1", "eth1", "sw1", 1],
    ["tg1", "eth2", "sw1", 2],
    ["sw1", 4, "lhost1", "ens3"]
  ]
}"#;

#[test]
fn parse_setup() {
    let setup = SetupConfig::from_json_str(SETUP).unwrap();
    assert_eq!(setup.name, "lab-42");
    assert_eq!(setup.devices.len(), 3);
    assert_eq!(setup.devices[0].kind, DeviceKind::Switch);
    assert_eq!(setup.devices[0].name.as_deref(), Some("leaf-a"));
    assert_eq!(setup.devices[0].ports[3], PortId::Number(4));
    assert_eq!(setup.devices[2].kind, DeviceKind::LinuxHost);
    assert_eq!(setup.links[2], LinkDecl::new("sw1", 4u32, "lhost1", "ens3"));

    let topo = TopologyGraph::from_setup(&setup).unwrap();
    assert_eq!(topo.device("sw1").unwrap().name(), "leaf-a");
    assert_eq!(topo.device("tg1").unwrap().name(), "tg1");
    assert_eq!(topo.count_links("lhost1", "sw1"), 1);
}

#[test]
fn links_are_optional() {
    let setup = SetupConfig::from_json_str(
        r#"{"devices": [{"acronym": "sw1", "kind": "switch", "ports": [1]}]}"#,
    )
    .unwrap();
    assert_eq!(setup.name, "");
    assert!(setup.links.is_empty());
}

#[test]
fn invalid_setup() {
    assert!(matches!(
        SetupConfig::from_json_str(r#"{"devices": [{"acronym": "sw1", "kind": "router"}]}"#),
        Err(ConfigurationError::Json(_))
    ));
    assert!(matches!(
        SetupConfig::from_json_str(r#"{"devices": [], "links": [["sw1", 1, "sw2"]]}"#),
        Err(ConfigurationError::Json(_))
    ));
    assert!(matches!(
        SetupConfig::from_file("/this/file/does/not/exist.json"),
        Err(ConfigurationError::Io(_))
    ));
}

#[test]
fn write_and_read_back() {
    let setup = Golden::setup();
    let json = setup.to_json().unwrap();
    assert!(json.contains("\"kind\": \"tg\""));
    assert_eq!(SetupConfig::from_json_str(&json).unwrap(), setup);
}
