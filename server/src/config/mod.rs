/*
 * Created on Thu Jan 27 2022
 *
 * This file is a part of Skytable
 * Skytable (formerly known as TerrabaseDB or Skybase) is a free and open-source
 * NoSQL database written by Sayan Nandan ("the Author") with the
 * vision to provide flexibility in data modelling without compromising
 * on performance, queryability or scalability.
 *
 * Copyright (c) 2022, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! Server configuration: a `serde`-deserialized file plus a thin `clap`
//! CLI surface for pointing at it.

use crate::net::MAXIMUM_CONNECTION_LIMIT;
use clap::Parser;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

const DEFAULT_IPV4: IpAddr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
const DEFAULT_PORT: u16 = 2003;
const DEFAULT_DATABASES: usize = 16;
const DEFAULT_APPENDFILENAME: &str = "appendonly.aof";

#[derive(Parser, Debug)]
#[command(name = "kvd", about = "An in-memory key-value server")]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    bind: Option<IpAddr>,
    port: Option<u16>,
    #[serde(default)]
    appendonly: bool,
    appendfilename: Option<String>,
    databases: Option<usize>,
    #[serde(rename = "self")]
    self_node: Option<String>,
    #[serde(default)]
    peers: Vec<String>,
    maxclient: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: IpAddr,
    pub port: u16,
    pub appendonly: bool,
    pub appendfilename: String,
    pub databases: usize,
    pub self_node: Option<String>,
    pub peers: Vec<String>,
    pub max_connections: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_IPV4,
            port: DEFAULT_PORT,
            appendonly: false,
            appendfilename: DEFAULT_APPENDFILENAME.to_owned(),
            databases: DEFAULT_DATABASES,
            self_node: None,
            peers: Vec::new(),
            max_connections: MAXIMUM_CONNECTION_LIMIT,
        }
    }
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// A node runs clustered when it names itself and has at least one
    /// peer; otherwise it's standalone.
    pub fn is_clustered(&self) -> bool {
        self.self_node.is_some() && !self.peers.is_empty()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let raw: RawConfig = serde_yaml::from_str(&contents)?;
        let defaults = Config::default();
        Ok(Config {
            bind: raw.bind.unwrap_or(defaults.bind),
            port: raw.port.unwrap_or(defaults.port),
            appendonly: raw.appendonly,
            appendfilename: raw.appendfilename.unwrap_or(defaults.appendfilename),
            databases: raw.databases.unwrap_or(defaults.databases),
            self_node: raw.self_node,
            peers: raw.peers,
            max_connections: raw.maxclient.unwrap_or(defaults.max_connections),
        })
    }

    /// Loads from the path given on the command line, or falls back to an
    /// all-defaults standalone configuration when none was supplied.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        match &cli.config {
            Some(path) => Config::from_file(Path::new(path)),
            None => Ok(Config::default()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read configuration file: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse configuration file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_standalone() {
        let cfg = Config::default();
        assert!(!cfg.is_clustered());
        assert_eq!(cfg.databases, 16);
    }

    #[test]
    fn clustered_requires_both_self_and_peers() {
        let mut cfg = Config::default();
        cfg.self_node = Some("node-a".into());
        assert!(!cfg.is_clustered());
        cfg.peers = vec!["node-b:2003".into()];
        assert!(cfg.is_clustered());
    }

    #[test]
    fn parses_yaml_configuration() {
        let yaml = r#"
bind: 127.0.0.1
port: 7878
appendonly: true
databases: 4
"#;
        let raw: RawConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(raw.port, Some(7878));
        assert!(raw.appendonly);
        assert_eq!(raw.databases, Some(4));
    }
}
