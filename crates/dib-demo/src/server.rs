//! Server and its supervisor
//!
//! The two depend on each other. The supervisor takes the server as a
//! [`Lazy`] handle, so the server can be built first.

use crate::greeter::Greeter;
use dib::runtime::{Lazy, Result};
use dib::{injectable, singleton};
use std::sync::Arc;

/// Listener addresses
#[injectable]
#[singleton]
pub struct Server {
    hosts: Vec<String>,
    ports: Vec<u16>,
    greeter: Arc<Greeter>,
    supervisor: Arc<Supervisor>,
}

#[injectable]
impl Server {
    #[dib::inject]
    pub fn new(
        hosts: Vec<String>,
        ports: Vec<u16>,
        greeter: Arc<Greeter>,
        supervisor: Arc<Supervisor>,
    ) -> Self {
        Self {
            hosts,
            ports,
            greeter,
            supervisor,
        }
    }

    /// `host:port` for every host and port pair
    pub fn addresses(&self) -> Vec<String> {
        self.hosts
            .iter()
            .flat_map(|host| self.ports.iter().map(move |port| format!("{host}:{port}")))
            .collect()
    }

    /// Banner shown to clients
    pub fn banner(&self) -> String {
        self.greeter.greet("client")
    }

    /// Supervisor watching this server
    pub fn supervisor(&self) -> &Arc<Supervisor> {
        &self.supervisor
    }
}

/// Restarts the server on failure
#[injectable]
#[singleton]
pub struct Supervisor {
    server: Lazy<Arc<Server>>,
}

#[injectable]
impl Supervisor {
    #[dib::inject]
    pub fn new(server: Lazy<Arc<Server>>) -> Self {
        Self { server }
    }

    /// The supervised server
    pub fn server(&self) -> Result<Arc<Server>> {
        self.server.get()
    }
}
