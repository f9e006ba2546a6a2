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


//! # GNS3 Server

use crate::types::*;
use crate::{Error, Result};

use isahc::prelude::*;
use log::*;
use regex::Regex;
use serde_json::{json, Value};

/// # GNS3 Server Handle
///
/// Most requests are scoped to the project which was opened last.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Clone)]
pub struct GNS3Server {
    address: String,
    version: String,
    project: Option<String>,
}

impl GNS3Server {
    /// Connect to the server, and ask for its version
    pub fn new(address: impl AsRef<str>, port: u32) -> Result<Self> {
        let address = format!("http://{}:{}", address.as_ref(), port);
        let version_addr = format!("{}/v2/version", address);
        let v: GNS3ResponseVersion = serde_json::from_str(&isahc::get(&version_addr)?.text()?)?;
        debug!("Connected to GNS3 {} at {}", v.version, address);
        Ok(Self { address, version: v.version, project: None })
    }

    /// Get the version
    pub fn version(&self) -> &str {
        self.version.as_ref()
    }

    /// ID of the project which is currently opened
    pub fn project_id(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Returns all project informations
    pub fn get_projects(&self) -> Result<Vec<GNS3Project>> {
        Ok(serde_json::from_str(&self.request_get("projects")?)?)
    }

    /// Find the project with the given name
    pub fn find_project(&self, name: impl AsRef<str>) -> Result<Option<GNS3Project>> {
        Ok(self.get_projects()?.into_iter().find(|p| p.name == name.as_ref()))
    }

    /// Opens a project (if it is not already opened), and selects it for all further requests
    pub fn open_project(&mut self, project_id: impl AsRef<str>) -> Result<GNS3Project> {
        self.project = None;
        let key = format!("projects/{}", project_id.as_ref());
        let mut project: GNS3Project = serde_json::from_str(&self.request_get(&key)?)?;
        if project.status == GNS3ProjectStatus::Closed {
            let response = self.request_post(format!("{}/open", key), json!({}))?;
            project = serde_json::from_str(&response)?;
        }
        self.project = Some(project.id.clone());
        Ok(project)
    }

    /// Opens the project with the given name
    pub fn open_project_by_name(&mut self, name: impl AsRef<str>) -> Result<GNS3Project> {
        let project = self
            .find_project(name.as_ref())?
            .ok_or_else(|| Error::ProjectNotFound(name.as_ref().to_string()))?;
        self.open_project(project.id)
    }

    /// Close the currently opened project
    pub fn close_project(&mut self) -> Result<GNS3Project> {
        let project_id: String = self.project.take().ok_or(Error::NoProjectOpened)?;
        Ok(serde_json::from_str(
            &self.request_post(format!("projects/{}/close", project_id), json!({}))?,
        )?)
    }

    /// Return all nodes in the project
    pub fn get_nodes(&self) -> Result<Vec<GNS3Node>> {
        let key = format!("projects/{}/nodes", self.current_project()?);
        Ok(serde_json::from_str(&self.request_get(key)?)?)
    }

    /// Return a single node of the project
    pub fn get_node(&self, node_id: impl AsRef<str>) -> Result<GNS3Node> {
        let key = format!("projects/{}/nodes/{}", self.current_project()?, node_id.as_ref());
        Ok(serde_json::from_str(&self.request_get(key)?)?)
    }

    /// Start all nodes in the project
    pub fn start_all_nodes(&self) -> Result<()> {
        let key = format!("projects/{}/nodes/start", self.current_project()?);
        self.request_post(key, json!({}))?;
        Ok(())
    }

    /// Return all links in the project
    pub fn get_links(&self) -> Result<Vec<GNS3Link>> {
        let key = format!("projects/{}/links", self.current_project()?);
        Ok(serde_json::from_str(&self.request_get(key)?)?)
    }

    /// Return a single link of the project
    pub fn get_link(&self, link_id: impl AsRef<str>) -> Result<GNS3Link> {
        let key = format!("projects/{}/links/{}", self.current_project()?, link_id.as_ref());
        Ok(serde_json::from_str(&self.request_get(key)?)?)
    }

    /// Suspend (or resume) a link. A suspended link drops all packets, while the interfaces on both
    /// sides stay configured.
    pub fn suspend_link(&self, link_id: impl AsRef<str>, suspend: bool) -> Result<GNS3Link> {
        let key = format!("projects/{}/links/{}", self.current_project()?, link_id.as_ref());
        Ok(serde_json::from_str(&self.request_put(key, json!({ "suspend": suspend }))?)?)
    }

    fn current_project(&self) -> Result<&str> {
        self.project.as_deref().ok_or(Error::NoProjectOpened)
    }

    fn request_get(&self, key: impl AsRef<str>) -> Result<String> {
        let addr = format!("{}/v2/{}", self.address, key.as_ref());
        trace!("GET  {}", addr);
        handle_response(isahc::get(&addr)?)
    }

    fn request_post(&self, key: impl AsRef<str>, data: Value) -> Result<String> {
        let addr = format!("{}/v2/{}", self.address, key.as_ref());
        trace!("POST {} {}", addr, data);
        handle_response(isahc::post(&addr, data.to_string())?)
    }

    fn request_put(&self, key: impl AsRef<str>, data: Value) -> Result<String> {
        let addr = format!("{}/v2/{}", self.address, key.as_ref());
        trace!("PUT  {} {}", addr, data);
        handle_response(isahc::put(&addr, data.to_string())?)
    }
}

fn handle_response(mut response: Response<Body>) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::ResponseError(status.as_u16(), response.text()?));
    }
    let response = response.text()?;
    match parse_gns3_error(&response) {
        Some(e) => Err(e),
        None => Ok(response),
    }
}

/// GNS3 reports some errors with a successful status code, and a body of the form `<id>: <message>`
fn parse_gns3_error(response: &str) -> Option<Error> {
    let error_re = Regex::new(r"^(\d+): (.*)$").ok()?;
    let captures = error_re.captures(response)?;
    Some(Error::GNS3Error {
        id: captures.get(1)?.as_str().parse().ok()?,
        message: captures.get(2)?.as_str().to_string(),
    })
}
