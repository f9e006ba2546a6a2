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


use testbed::emulated::EmulatedDevice;
use testbed::example_setups;
use testbed::ports::{self, WaitOptions};
use testbed::resolver::LinkQuery;
use testbed::setup::SetupConfig;
use testbed::topology::{DeviceKind, TopologyGraph};
use testbed::Environment;
use testbed_runtime::connect_lab;

use clap::{Parser, Subcommand};
use log::*;
use std::error::Error;
use std::time::Duration;

fn main() -> Result<(), Box<dyn Error>> {
    // initialize the env logger
    pretty_env_logger::init();
    // run clap
    let args = CommandLineArguments::parse();

    // match on the action
    match args.cmd {
        MainCommand::Validate { setup } => {
            let topo = TopologyGraph::from_setup(&SetupConfig::from_file(&setup)?)?;
            print_summary(&topo);
        }
        MainCommand::Resolve { setup, queries } => {
            let topo = TopologyGraph::from_setup(&SetupConfig::from_file(&setup)?)?;
            let mapping = testbed::resolver::resolve(&topo, &queries)?;
            print!("{}", mapping);
        }
        MainCommand::Example { name } => {
            let setup = example_setups::by_name(&name)
                .ok_or_else(|| format!("Unknown example setup: {}", name))?;
            println!("{}", setup.to_json()?);
        }
        MainCommand::Isolate { queries, project, host, port, timeout, dry_run } => {
            let mut env = match (dry_run, project) {
                (Some(setup), _) => {
                    info!("Dry run on emulated devices");
                    let topo = TopologyGraph::from_setup(&SetupConfig::from_file(&setup)?)?;
                    Environment::connect(topo, |d| Ok(Box::new(EmulatedDevice::from_device(d))))?
                }
                (None, Some(project)) => connect_lab(&host, port, &project)?,
                (None, None) => return Err("Either --project or --dry-run is required".into()),
            };

            let mapping = env.get_ports(&queries)?;
            let wait = WaitOptions::new(Duration::from_secs(timeout));

            info!("Disabling all switch ports");
            ports::disable_all_ports(&mut env.switch, Some(&wait))?;
            info!("Enabling the resolved ports");
            ports::enable_ports(&mut env.switch, &mapping, Some(&wait))?;

            print!("{}", mapping);
            env.teardown()?;
        }
    }

    Ok(())
}

fn print_summary(topo: &TopologyGraph) {
    println!("Setup {}", topo.name());
    for kind in DeviceKind::ALL.iter() {
        let devices: Vec<String> = topo
            .devices_of_kind(*kind)
            .map(|d| format!("{} ({} ports)", d.role(), d.ports().len()))
            .collect();
        if !devices.is_empty() {
            println!("  {}: {}", kind, devices.join(", "));
        }
    }
    println!("  {} links:", topo.num_links());
    for link in topo.links() {
        println!("    {}", link);
    }
}

#[derive(Parser, Debug)]
#[clap(name = "testbed", author = "Tibor Schneider")]
struct CommandLineArguments {
    /// Action to perform
    #[clap(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand, Debug)]
enum MainCommand {
    /// Load a setup file, check it, and print a summary
    #[clap(name = "validate")]
    Validate {
        /// Setup file (JSON)
        setup: String,
    },
    /// Resolve link queries on a setup file, and print the port mapping
    #[clap(name = "resolve")]
    Resolve {
        /// Setup file (JSON)
        setup: String,
        /// Link queries, written as `<role>:<role>:<count>` (e.g. `tg1:sw1:4`)
        #[clap(required = true)]
        queries: Vec<LinkQuery>,
    },
    /// Print a predefined setup (standalone, simplified, golden, diamond or lhost)
    #[clap(name = "example")]
    Example {
        /// Name of the setup
        name: String,
    },
    /// Disable all switch ports of the lab, except the ones of the resolved links
    #[clap(name = "isolate")]
    Isolate {
        /// Link queries, written as `<role>:<role>:<count>` (e.g. `tg1:sw1:4`)
        #[clap(required = true)]
        queries: Vec<LinkQuery>,
        /// Name of the GNS3 project
        #[clap(short = 'p', long)]
        project: Option<String>,
        /// Host of the GNS3 server
        #[clap(long, default_value = "localhost")]
        host: String,
        /// Port of the GNS3 server
        #[clap(long, default_value = "3080")]
        port: u32,
        /// Seconds to wait for the ports to change their state
        #[clap(short = 't', long, default_value = "30")]
        timeout: u64,
        /// Run against emulated devices built from the setup file, instead of the GNS3 project
        #[clap(long)]
        dry_run: Option<String>,
    },
}
