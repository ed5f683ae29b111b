use serde::{Deserialize, Serialize};

/// Where the coordinator listens and how many workers it waits for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub worker_count: usize,
}

impl ServerConfig {
    pub fn new(address: String, port: u16, worker_count: usize) -> Self {
        Self {
            address,
            port,
            worker_count,
        }
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
