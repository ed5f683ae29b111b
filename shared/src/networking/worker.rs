use serde::{Deserialize, Serialize};

/// Identity of a worker process and the coordinator it reports to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub name: String,
    pub address: String,
    pub port: u16,
}

impl Worker {
    pub fn new(name: String, address: String, port: u16) -> Self {
        Self {
            name,
            address,
            port,
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
