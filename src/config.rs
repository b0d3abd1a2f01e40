use std::env;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub admin_password: String,
}

impl ServerConfig {
    /// Reads `PORT` and `ADMIN_PASSWORD`. An explicit port (from the command line) wins over `PORT`.
    pub fn from_env(port_override: Option<u16>) -> Result<Self> {
        let port = match port_override {
            Some(port) => port,
            None => match env::var("PORT") {
                Ok(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| Error::Config(format!("PORT is not a valid port: {}", value)))?,
                Err(_) => DEFAULT_PORT,
            },
        };
        let admin_password = env::var("ADMIN_PASSWORD")
            .map_err(|_| Error::Config("ADMIN_PASSWORD must be set to run the web server".to_string()))?;
        if admin_password.trim().is_empty() {
            return Err(Error::Config("ADMIN_PASSWORD must not be empty".to_string()));
        }

        Ok(ServerConfig { port, admin_password })
    }
}
