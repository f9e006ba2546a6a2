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


//! Test building the topology graph, and the queries on it.

use crate::example_setups::*;
use crate::setup::SetupConfig;
use crate::topology::{ConfigurationError, DeviceKind::*, Endpoint, PortId, Role, TopologyGraph};
use crate::Environment;
use lazy_static::lazy_static;

lazy_static! {
    static ref SIMPLIFIED: TopologyGraph = TopologyGraph::from_setup(&Simplified::setup()).unwrap();
    static ref GOLDEN: TopologyGraph = TopologyGraph::from_setup(&Golden::setup()).unwrap();
}

/// Setup with one switch and one traffic generator, and no links.
fn two_devices() -> SetupConfig {
    let mut setup = SetupConfig::new("test");
    setup
        .add_device("sw1", Switch, vec![1u32, 2, 3, 4])
        .add_device("tg1", TrafficGenerator, vec!["eth1", "eth2"]);
    setup
}

#[test]
fn simplified_topology() {
    assert_eq!(SIMPLIFIED.name(), "simplified");
    assert_eq!(SIMPLIFIED.num_devices(), 2);
    assert_eq!(SIMPLIFIED.num_links(), 4);
    assert_eq!(SIMPLIFIED.device("sw1").unwrap().kind(), Switch);
    assert_eq!(SIMPLIFIED.device("sw1").unwrap().ports().len(), 8);
    assert_eq!(SIMPLIFIED.device("tg1").unwrap().index(), 1);
    assert!(SIMPLIFIED.device("sw2").is_none());
}

#[test]
fn links_between_in_declaration_order() {
    let links = SIMPLIFIED.links_between("tg1", "sw1");
    assert_eq!(links.len(), 4);
    for (i, link) in links.iter().enumerate() {
        let i = i as u32 + 1;
        assert_eq!(link.near, &Endpoint::new("tg1", format!("eth{}", i)));
        assert_eq!(link.far, &Endpoint::new("sw1", i));
    }
}

#[test]
fn links_between_is_symmetric() {
    let forward = SIMPLIFIED.links_between("tg1", "sw1");
    let backward = SIMPLIFIED.links_between("sw1", "tg1");
    assert_eq!(forward.len(), backward.len());
    for (f, b) in forward.iter().zip(backward.iter()) {
        assert_eq!(f.id, b.id);
        assert_eq!(f.near, b.far);
        assert_eq!(f.far, b.near);
    }
}

#[test]
fn links_between_unknown_or_unconnected() {
    assert!(SIMPLIFIED.links_between("tg1", "sw9").is_empty());
    assert!(SIMPLIFIED.links_between("sw1", "sw1").is_empty());
    assert_eq!(GOLDEN.count_links("sw1", "sw2"), 1);
    assert_eq!(GOLDEN.count_links("tg1", "sw3"), 2);
}

#[test]
fn neighbors_and_peers() {
    let neighbors: Vec<&str> = GOLDEN.neighbors("sw1").into_iter().map(|r| r.as_str()).collect();
    assert_eq!(neighbors, vec!["tg1", "sw2", "sw3"]);

    assert_eq!(GOLDEN.peer("sw3", &PortId::Number(6)), Some(&Endpoint::new("sw2", 6u32)));
    assert_eq!(GOLDEN.peer("tg1", &"eth4".into()), Some(&Endpoint::new("sw2", 2u32)));
    assert_eq!(GOLDEN.peer("sw1", &PortId::Number(8)), None);
}

#[test]
fn devices_of_kind() {
    let switches: Vec<&Role> = GOLDEN.devices_of_kind(Switch).map(|d| d.role()).collect();
    assert_eq!(switches, vec![&Role::from("sw1"), &Role::from("sw2"), &Role::from("sw3")]);
    assert_eq!(GOLDEN.devices_of_kind(LinuxHost).count(), 0);
    assert_eq!(GOLDEN.links().count(), 9);
}

#[test]
fn example_setups_are_valid() {
    for name in ["standalone", "simplified", "golden", "diamond", "lhost"].iter() {
        let setup = by_name(name).unwrap();
        assert_eq!(setup.name.as_str(), *name);
        TopologyGraph::from_setup(&setup).unwrap();
    }
    assert!(by_name("unknown").is_none());
}

#[test]
fn duplicate_role() {
    let mut setup = two_devices();
    setup.add_device("sw1", Switch, vec![5u32]);
    match TopologyGraph::from_setup(&setup) {
        Err(ConfigurationError::DuplicateRole(role)) => assert_eq!(role.as_str(), "sw1"),
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn same_index_written_twice() {
    let mut setup = two_devices();
    setup.add_device("sw01", Switch, vec![7u32, 8]);
    match TopologyGraph::from_setup(&setup) {
        Err(ConfigurationError::InvalidAcronym { role, kind }) => {
            assert_eq!(role.as_str(), "sw01");
            assert_eq!(kind, Switch);
        }
        r => panic!("unexpected result: {:?}", r),
    }
    assert!(Environment::from_setup(&setup).is_err());
}

#[test]
fn invalid_acronym() {
    for acronym in ["tg2", "switch1", "sw0", "sw", "sw1a", "sw01"].iter() {
        let mut setup = SetupConfig::new("test");
        setup.add_device(*acronym, Switch, vec![1u32]);
        assert!(matches!(
            TopologyGraph::from_setup(&setup),
            Err(ConfigurationError::InvalidAcronym { kind: Switch, .. })
        ));
    }
}

#[test]
fn duplicate_port() {
    let mut setup = SetupConfig::new("test");
    setup.add_device("lhost1", LinuxHost, vec!["eth0", "eth1", "eth0"]);
    match TopologyGraph::from_setup(&setup) {
        Err(ConfigurationError::DuplicatePort { role, port }) => {
            assert_eq!(role.as_str(), "lhost1");
            assert_eq!(port, PortId::from("eth0"));
        }
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn link_to_unknown_device_or_port() {
    let mut setup = two_devices();
    setup.add_link("tg1", "eth1", "sw2", 1u32);
    assert!(matches!(
        TopologyGraph::from_setup(&setup),
        Err(ConfigurationError::UnknownDevice(_))
    ));

    let mut setup = two_devices();
    setup.add_link("tg1", "eth3", "sw1", 1u32);
    assert!(matches!(
        TopologyGraph::from_setup(&setup),
        Err(ConfigurationError::UnknownPort { .. })
    ));
}

#[test]
fn self_loop() {
    let mut setup = two_devices();
    setup.add_link("sw1", 1u32, "sw1", 2u32);
    assert!(matches!(TopologyGraph::from_setup(&setup), Err(ConfigurationError::SelfLoop(_))));
}

#[test]
fn port_in_multiple_links() {
    let mut setup = two_devices();
    setup.add_link("tg1", "eth1", "sw1", 1u32).add_link("tg1", "eth2", "sw1", 1u32);
    match TopologyGraph::from_setup(&setup) {
        Err(ConfigurationError::PortInMultipleLinks(e)) => {
            assert_eq!(e, Endpoint::new("sw1", 1u32))
        }
        r => panic!("unexpected result: {:?}", r),
    }
}

#[test]
fn role_split() {
    assert_eq!(Role::from("sw12").split(), Some((Switch, 12)));
    assert_eq!(Role::from("tg1").split(), Some((TrafficGenerator, 1)));
    assert_eq!(Role::from("lhost3").kind(), Some(LinuxHost));
    assert_eq!(Role::from("sw-1").split(), None);
    assert_eq!(Role::from("sw01").split(), None);
    assert_eq!(Role::from("tg007").split(), None);
    assert_eq!(Role::from("router1").split(), None);
}
