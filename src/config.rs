//! Application configuration loaded from the environment

use std::net::SocketAddr;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::booking::calculators::{DEFAULT_SERVICE_FEE_RATE, DEFAULT_TAX_RATE};

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub database_max_connections: u32,
    /// Service fee rate used when a property sets none
    pub default_service_fee_rate: Decimal,
    /// Tax rate used when a property sets none
    pub default_tax_rate: Decimal,
    pub default_currency: String,
}

impl Config {
    /// Read configuration from process environment (after `dotenvy` has run).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?;
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5u32)?;

        let default_service_fee_rate =
            parse_or(&lookup, "DEFAULT_SERVICE_FEE_RATE", DEFAULT_SERVICE_FEE_RATE)?;
        ensure_unit_rate("DEFAULT_SERVICE_FEE_RATE", default_service_fee_rate)?;

        let default_tax_rate = parse_or(&lookup, "DEFAULT_TAX_RATE", DEFAULT_TAX_RATE)?;
        ensure_unit_rate("DEFAULT_TAX_RATE", default_tax_rate)?;

        let default_currency = lookup("DEFAULT_CURRENCY")
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "USD".to_string());

        Ok(Self {
            database_url,
            bind_addr,
            database_max_connections,
            default_service_fee_rate,
            default_tax_rate,
            default_currency,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
        }),
        None => Ok(default),
    }
}

fn ensure_unit_rate(name: &'static str, rate: Decimal) -> Result<(), ConfigError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ConfigError::Invalid {
            name,
            value: rate.to_string(),
        });
    }
    Ok(())
}
