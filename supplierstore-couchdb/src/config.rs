//! Connection credentials and retry policy resolved from the environment.
//!
//! Resolution order follows the platforms the service deploys to: a Cloud
//! Foundry `VCAP_SERVICES` blob first, then a Kubernetes `BINDING_CLOUDANT`
//! blob, then discrete `CLOUDANT_*` variables with local-development defaults.
//!
//! Both resolvers are pure functions over a snapshot of the environment, so
//! tests can exercise every branch without mutating process state.

use std::{collections::HashMap, env, time::Duration};

use serde::Deserialize;
use serde_json::Value;

use supplierstore_core::error::{SupplierStoreError, SupplierStoreResult};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "pass";
const DEFAULT_PORT: u16 = 5984;

/// A resolved set of CouchDB connection credentials.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Base url of the CouchDB server, without a database path.
    pub url: String,
}

impl Credentials {
    /// Resolves credentials from a snapshot of environment variables.
    ///
    /// Priority: `VCAP_SERVICES` (first service whose key starts with
    /// `cloudantNoSQLDB`), then `BINDING_CLOUDANT`, then discrete
    /// `CLOUDANT_HOST` / `CLOUDANT_USERNAME` / `CLOUDANT_PASSWORD` with
    /// defaults suitable for a local CouchDB container. A binding blob that
    /// parses but lacks any of the required keys is a connection error, not a
    /// fall-through.
    pub fn resolve(env: &HashMap<String, String>) -> SupplierStoreResult<Credentials> {
        if let Some(vcap) = env.get("VCAP_SERVICES") {
            let services: Value = serde_json::from_str(vcap).map_err(|err| {
                SupplierStoreError::Connection(format!("malformed VCAP_SERVICES: {err}"))
            })?;

            if let Some(services) = services.as_object() {
                for (name, instances) in services {
                    if name.starts_with("cloudantNoSQLDB") {
                        let credentials = instances
                            .get(0)
                            .and_then(|instance| instance.get("credentials"))
                            .cloned()
                            .ok_or_else(|| {
                                SupplierStoreError::Connection(
                                    "VCAP_SERVICES cloudant service has no credentials"
                                        .to_string(),
                                )
                            })?;

                        return Self::from_binding(credentials);
                    }
                }
            }
        }

        if let Some(binding) = env.get("BINDING_CLOUDANT") {
            let credentials: Value = serde_json::from_str(binding).map_err(|err| {
                SupplierStoreError::Connection(format!("malformed BINDING_CLOUDANT: {err}"))
            })?;

            return Self::from_binding(credentials);
        }

        let host = env
            .get("CLOUDANT_HOST")
            .cloned()
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Credentials {
            url: format!("http://{host}:{DEFAULT_PORT}"),
            host,
            port: DEFAULT_PORT,
            username: env
                .get("CLOUDANT_USERNAME")
                .cloned()
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password: env
                .get("CLOUDANT_PASSWORD")
                .cloned()
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        })
    }

    /// Resolves credentials from the process environment.
    pub fn from_env() -> SupplierStoreResult<Credentials> {
        Self::resolve(&env::vars().collect())
    }

    fn from_binding(credentials: Value) -> SupplierStoreResult<Credentials> {
        serde_json::from_value(credentials).map_err(|_| {
            SupplierStoreError::Connection(
                "failed to retrieve connection options, check that the app is bound to a \
                 Cloudant service"
                    .to_string(),
            )
        })
    }
}

/// Retry behavior for rate-limited (HTTP 429) requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// How many times a rate-limited request is retried before giving up.
    pub retries: u32,
    /// Backoff before the first retry; doubles (by `growth`) per attempt.
    pub initial_backoff: Duration,
    /// Multiplier applied to the backoff after each attempt.
    pub growth: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 10,
            initial_backoff: Duration::from_millis(10),
            growth: 2,
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from a snapshot of environment variables, falling back
    /// to the default for any variable that is unset or unparsable.
    pub fn resolve(env: &HashMap<String, String>) -> RetryPolicy {
        let defaults = RetryPolicy::default();

        RetryPolicy {
            retries: parse_var(env, "RETRY_COUNT").unwrap_or(defaults.retries),
            initial_backoff: parse_var(env, "RETRY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.initial_backoff),
            growth: parse_var(env, "RETRY_BACKOFF").unwrap_or(defaults.growth),
        }
    }

    /// Builds a policy from the process environment.
    pub fn from_env() -> RetryPolicy {
        Self::resolve(&env::vars().collect())
    }

    /// Backoff duration before retry number `attempt` (zero-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff * self.growth.pow(attempt)
    }
}

fn parse_var<T: std::str::FromStr>(env: &HashMap<String, String>, key: &str) -> Option<T> {
    env.get(key).and_then(|value| value.parse().ok())
}
