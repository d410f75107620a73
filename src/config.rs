//! Environment-derived gateway configuration.

use crate::{Error, ErrorContext, Result};
use std::env;
use std::net::SocketAddr;

/// Default bind address when `GATEWAY_ADDR` is unset.
const DEFAULT_ADDR: &str = "0.0.0.0:8000";

/// Runtime configuration, sourced from the environment at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to (`GATEWAY_ADDR`).
    pub bind_addr: SocketAddr,
    /// Base URL of the TGI endpoint (`TGI_URL`).
    pub tgi_url: String,
    /// Bearer token expected on incoming requests (`OPENAI_API_KEY`).
    pub api_key: String,
    /// Origins allowed by the CORS layer (`GATEWAY_ALLOWED_ORIGINS`,
    /// comma-separated).
    pub allowed_origins: Vec<String>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let tgi_url = require("TGI_URL")?;
        let api_key = require("OPENAI_API_KEY")?;

        let bind_addr = env::var("GATEWAY_ADDR")
            .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
            .parse()
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid bind address: {e}"),
                    ErrorContext::new().with_field_path("GATEWAY_ADDR"),
                )
            })?;

        let allowed_origins = match env::var("GATEWAY_ALLOWED_ORIGINS") {
            Ok(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => vec![
                "http://localhost".to_string(),
                "http://localhost:8080".to_string(),
            ],
        };

        Ok(Self {
            bind_addr,
            tgi_url,
            api_key,
            allowed_origins,
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).map_err(|_| {
        Error::configuration_with_context(
            format!("{name} must be set"),
            ErrorContext::new().with_field_path(name),
        )
    })
}
