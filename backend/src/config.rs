use std::net::SocketAddr;

use clap::Parser;

use crate::{engine::FailurePolicy, ors::DEFAULT_BASE_URL};

/// Every option can also be given through the environment.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Eco-aware route comparison service", long_about = None)]
pub struct Config {
    /// OpenRouteService API key; without it only synthesized data is served
    #[arg(long, env = "ORS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "ORS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub ors_base_url: String,

    /// How failed upstream calls are handled
    #[arg(long, env = "ROUTE_FAILURE_POLICY", value_enum, default_value_t = FailurePolicy::Substitute)]
    pub failure_policy: FailurePolicy,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Seed for synthesized data, for reproducible demos
    #[arg(long, env = "ROUTE_SEED")]
    pub seed: Option<u64>,
}

impl Config {
    /// Blank keys count as missing.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
