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


//! Test resolving link queries.

use crate::example_setups::*;
use crate::resolver::{resolve, LinkQuery};
use crate::topology::{PortId, Role, TopologyError, TopologyGraph};
use lazy_static::lazy_static;
use maplit::btreemap;

lazy_static! {
    static ref SIMPLIFIED: TopologyGraph = TopologyGraph::from_setup(&Simplified::setup()).unwrap();
    static ref GOLDEN: TopologyGraph = TopologyGraph::from_setup(&Golden::setup()).unwrap();
}

fn eth(i: u32) -> PortId {
    PortId::Name(format!("eth{}", i))
}

#[test]
fn four_links() {
    let mapping = resolve(&SIMPLIFIED, &[("tg1", "sw1", 4).into()]).unwrap();
    assert_eq!(mapping.len(), 2);
    assert_eq!(
        mapping[("tg1", "sw1")],
        btreemap! {1 => eth(1), 2 => eth(2), 3 => eth(3), 4 => eth(4)}
    );
    assert_eq!(
        mapping[("sw1", "tg1")],
        btreemap! {
            1 => PortId::Number(1),
            2 => PortId::Number(2),
            3 => PortId::Number(3),
            4 => PortId::Number(4),
        }
    );
}

#[test]
fn subset_takes_first_links() {
    let mapping = resolve(&SIMPLIFIED, &[("sw1", "tg1", 2).into()]).unwrap();
    assert_eq!(mapping.ports("sw1", "tg1"), vec![&PortId::Number(1), &PortId::Number(2)]);
    assert_eq!(mapping.ports("tg1", "sw1"), vec![&eth(1), &eth(2)]);
    assert_eq!(mapping.port("tg1", "sw1", 3), None);
}

#[test]
fn insufficient_links() {
    let err = resolve(&SIMPLIFIED, &[("tg1", "sw1", 5).into()]).unwrap_err();
    assert_eq!(
        err,
        TopologyError::InsufficientLinks {
            a: Role::from("tg1"),
            b: Role::from("sw1"),
            requested: 5,
            available: 4,
        }
    );
    let msg = err.to_string();
    assert!(msg.contains('5'));
    assert!(msg.contains('4'));
}

#[test]
fn unknown_role_and_zero_count() {
    assert_eq!(
        resolve(&SIMPLIFIED, &[("tg1", "sw2", 1).into()]),
        Err(TopologyError::UnknownRole(Role::from("sw2")))
    );
    assert_eq!(
        resolve(&SIMPLIFIED, &[("tg1", "sw1", 0).into()]),
        Err(TopologyError::InvalidCount { a: Role::from("tg1"), b: Role::from("sw1") })
    );
}

#[test]
fn no_partial_result() {
    let queries: Vec<LinkQuery> = vec![("tg1", "sw1", 1).into(), ("sw1", "sw2", 2).into()];
    assert!(resolve(&GOLDEN, &queries).is_err());
}

#[test]
fn index_refers_to_the_same_cable() {
    let queries: Vec<LinkQuery> =
        vec![("tg1", "sw1", 2).into(), ("tg1", "sw2", 2).into(), ("sw2", "sw3", 1).into()];
    let mapping = resolve(&GOLDEN, &queries).unwrap();
    assert_eq!(mapping.len(), 6);
    for ((a, b), ports) in mapping.iter() {
        for (i, port) in ports.iter() {
            let peer = GOLDEN.peer(a.as_str(), port).unwrap();
            assert_eq!(&peer.role, b);
            assert_eq!(Some(&peer.port), mapping.port(b.as_str(), a.as_str(), *i));
        }
    }
}

#[test]
fn deterministic() {
    let queries: Vec<LinkQuery> = vec![("tg1", "sw3", 2).into(), ("sw1", "sw3", 1).into()];
    let first = resolve(&GOLDEN, &queries).unwrap();
    for _ in 0..10 {
        assert_eq!(resolve(&GOLDEN, &queries).unwrap(), first);
    }
}

#[test]
fn duplicate_pair_last_wins() {
    let queries: Vec<LinkQuery> = vec![("tg1", "sw1", 4).into(), ("sw1", "tg1", 1).into()];
    let mapping = resolve(&SIMPLIFIED, &queries).unwrap();
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping[("tg1", "sw1")], btreemap! {1 => eth(1)});
    assert_eq!(mapping[("sw1", "tg1")], btreemap! {1 => PortId::Number(1)});
}

#[test]
fn ports_of_role() {
    let queries: Vec<LinkQuery> = vec![("tg1", "sw1", 2).into(), ("sw1", "sw2", 1).into()];
    let mapping = resolve(&GOLDEN, &queries).unwrap();
    assert_eq!(
        mapping.ports_of("sw1"),
        vec![&PortId::Number(5), &PortId::Number(1), &PortId::Number(2)]
    );
    assert!(mapping.ports_of("sw3").is_empty());
}

#[test]
fn parse_link_query() {
    let query: LinkQuery = "tg1:sw1:4".parse().unwrap();
    assert_eq!(query, LinkQuery::new("tg1", "sw1", 4));
    assert_eq!(query.to_string(), "tg1:sw1:4");
    assert!("tg1:sw1".parse::<LinkQuery>().is_err());
    assert!("tg1:sw1:x".parse::<LinkQuery>().is_err());
    assert!("tg1::4".parse::<LinkQuery>().is_err());
    assert!("tg1:sw1:4:5".parse::<LinkQuery>().is_err());
}

#[test]
fn display_mapping() {
    let mapping = resolve(&SIMPLIFIED, &[("tg1", "sw1", 2).into()]).unwrap();
    assert_eq!(mapping.to_string(), "(sw1, tg1): {1: 1, 2: 2}\n(tg1, sw1): {1: eth1, 2: eth2}\n");
}
