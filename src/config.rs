//! Connection configuration for the ClickHouse server the executor talks
//! to, grounded on the shape of the teacher's own
//! `infrastructure::olap::clickhouse::config::ClickHouseConfig`, trimmed to
//! what the executor's narrow `Query`/`Exec` contract (spec.md §4.6) needs.

use serde::{Deserialize, Serialize};

fn default_native_port() -> u16 {
    9000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickHouseConfig {
    pub host: String,
    #[serde(default = "default_native_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub use_tls: bool,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_native_port(),
            user: "default".to_string(),
            password: String::new(),
            database: "default".to_string(),
            use_tls: false,
        }
    }
}

impl ClickHouseConfig {
    pub fn url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}
