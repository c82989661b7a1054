// src/config.rs

use std::{env, fmt};

use crate::error::ConfigError;

const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Where the CSV lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub bucket: String,
    pub key: String,
}

/// Relational target. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub table: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("table", &self.table)
            .finish()
    }
}

/// Catalog entry created when the relational load fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub database: String,
    pub table: String,
    pub location: String,
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: SourceConfig,
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any name → value lookup.
    ///
    /// Every required variable is checked before returning, so a single error
    /// lists all of the missing names. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |name: &'static str| -> String {
            match lookup(name).filter(|v| !v.trim().is_empty()) {
                Some(value) => value,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let source = SourceConfig {
            bucket: required("S3_BUCKET"),
            key: required("CSV_KEY"),
        };
        let host = required("RDS_HOST");
        let user = required("RDS_USER");
        let password = required("RDS_PASS");
        let name = required("RDS_DB");
        let table = required("RDS_TABLE");
        let catalog = CatalogConfig {
            database: required("GLUE_DB"),
            table: required("GLUE_TABLE"),
            location: required("GLUE_S3_LOCATION"),
        };

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let port = match lookup("RDS_PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid {
                    name: "RDS_PORT",
                    value: raw.clone(),
                })?,
            None => DEFAULT_MYSQL_PORT,
        };

        Ok(Self {
            source,
            database: DatabaseConfig {
                host,
                port,
                user,
                password,
                name,
                table,
            },
            catalog,
        })
    }
}
