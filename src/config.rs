//! Connection configuration model.

use crate::error::{DsnError, DsnResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Login timeout applied when none is configured.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

/// Request timeout applied when none is configured (no timeout).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(0);

/// Authenticator for the primary username/password login flow.
pub const DEFAULT_AUTHENTICATOR: &str = "snowflake";

/// Client identifier reported to the server when none is configured.
pub const DEFAULT_APPLICATION: &str = "Rust";

/// Scheme used when none is configured.
pub const DEFAULT_PROTOCOL: &str = "https";

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 443;

/// Schema assumed when a DSN names a database but no schema.
pub const DEFAULT_SCHEMA: &str = "public";

/// Domain under which account hosts live.
pub const DOMAIN_SUFFIX: &str = "snowflakecomputing.com";

/// Environment variable read by [`Config::from_default_env`].
pub const DSN_ENV_VAR: &str = "SNOWFLAKE_DSN";

const REDACTED: &str = "****";

/// Outbound proxy settings.
///
/// Carried on each [`Config`] so that concurrent parses with different
/// proxies never interfere with each other.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxySettings {
    /// Proxy host name.
    pub host: String,
    /// Proxy port (0 when unset).
    pub port: u16,
    /// Proxy user name.
    pub user: String,
    /// Proxy password.
    #[serde(skip_serializing)]
    pub password: String,
}

impl ProxySettings {
    /// Check whether any proxy setting is present.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty()
            || self.port != 0
            || !self.user.is_empty()
            || !self.password.is_empty()
    }
}

impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .finish()
    }
}

/// Structured connection parameters for a Snowflake account.
///
/// Empty strings and zero values mean "unset"; [`Config::fill_missing`]
/// fills them with defaults and validates the mandatory fields.
///
/// ```rust
/// use snowflake_dsn::Config;
///
/// let cfg = Config::parse("jsmith:secret@acme/sales/reporting?warehouse=etl").unwrap();
/// assert_eq!(cfg.account, "acme");
/// assert_eq!(cfg.host, "acme.snowflakecomputing.com");
/// assert_eq!(cfg.database, "sales");
/// assert_eq!(cfg.schema, "reporting");
/// assert_eq!(cfg.warehouse, "etl");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Account name.
    pub account: String,
    /// User name.
    pub user: String,
    /// Password.
    #[serde(skip_serializing)]
    pub password: String,
    /// Database name.
    pub database: String,
    /// Schema name.
    pub schema: String,
    /// Warehouse name.
    pub warehouse: String,
    /// Role name.
    pub role: String,
    /// Region, either supplied directly or split off the account.
    pub region: String,
    /// Connection parameters with no dedicated field.
    ///
    /// An entry whose key names a field (`role`, `loginTimeout`, ...) is
    /// ignored when building a DSN; set the field instead.
    pub params: IndexMap<String, String>,

    /// `http` or `https`.
    pub protocol: String,
    /// Host name.
    pub host: String,
    /// Port (0 when unset).
    pub port: u16,

    /// Authenticator name, e.g. `snowflake` or an Okta URL.
    pub authenticator: String,
    /// MFA passcode.
    #[serde(skip_serializing)]
    pub passcode: String,
    /// The MFA passcode is appended to the password.
    pub passcode_in_password: bool,

    /// Login timeout.
    #[serde(with = "duration_secs")]
    pub login_timeout: Duration,
    /// Request timeout.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,

    /// Client application identifier.
    pub application: String,
    /// Skip certificate revocation checks.
    pub insecure_mode: bool,
    /// Outbound proxy.
    pub proxy: ProxySettings,
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a configuration.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Parse a DSN into a validated configuration.
    pub fn parse(dsn: &str) -> DsnResult<Self> {
        crate::parser::parse_dsn(dsn)
    }

    /// Parse the DSN held in an environment variable.
    pub fn from_env(var: &str) -> DsnResult<Self> {
        let dsn = std::env::var(var).map_err(|_| DsnError::EnvNotFound(var.to_string()))?;
        info!(var = %var, "Loading Snowflake DSN from environment");
        Self::parse(&dsn)
    }

    /// Parse the DSN held in `SNOWFLAKE_DSN`.
    pub fn from_default_env() -> DsnResult<Self> {
        Self::from_env(DSN_ENV_VAR)
    }

    /// Build the canonical DSN for this configuration.
    pub fn to_dsn(&self) -> DsnResult<String> {
        crate::serializer::to_dsn(self)
    }

    /// Build the canonical DSN with every secret masked, for logs.
    pub fn to_redacted_dsn(&self) -> DsnResult<String> {
        let mut masked = self.clone();
        if !masked.password.is_empty() {
            masked.password = REDACTED.to_string();
        }
        if !masked.passcode.is_empty() {
            masked.passcode = REDACTED.to_string();
        }
        if !masked.proxy.password.is_empty() {
            masked.proxy.password = REDACTED.to_string();
        }
        masked.to_dsn()
    }

    /// Apply defaults and validate mandatory fields in place.
    pub fn fill_missing(&mut self) -> DsnResult<()> {
        crate::defaults::fill_missing(self)
    }

    /// Get an extension parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Check whether the primary authenticator is in use.
    pub fn is_default_authenticator(&self) -> bool {
        self.authenticator.is_empty() || self.authenticator == DEFAULT_AUTHENTICATOR
    }
}

impl FromStr for Config {
    type Err = DsnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("warehouse", &self.warehouse)
            .field("role", &self.role)
            .field("region", &self.region)
            .field("params", &self.params)
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("authenticator", &self.authenticator)
            .field("passcode", &redact(&self.passcode))
            .field("passcode_in_password", &self.passcode_in_password)
            .field("login_timeout", &self.login_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("application", &self.application)
            .field("insecure_mode", &self.insecure_mode)
            .field("proxy", &self.proxy)
            .finish()
    }
}

fn redact(secret: &str) -> &str {
    if secret.is_empty() { "" } else { REDACTED }
}

/// Split `account.region` at the first dot.
///
/// Returns `None` when there is no dot or the dot is the first character.
pub fn split_embedded_region(account: &str) -> Option<(&str, &str)> {
    match account.find('.') {
        Some(pos) if pos > 0 => Some((&account[..pos], &account[pos + 1..])),
        _ => None,
    }
}

/// Host for an account, with the region segment when one is given.
pub fn account_host(account: &str, region: &str) -> String {
    if region.is_empty() {
        format!("{account}.{DOMAIN_SUFFIX}")
    } else {
        format!("{account}.{region}.{DOMAIN_SUFFIX}")
    }
}

/// Account name recoverable from a `<account>.….snowflakecomputing.com` host.
pub fn account_from_host(host: &str) -> Option<&str> {
    if !host.ends_with(&format!(".{DOMAIN_SUFFIX}")) {
        return None;
    }
    match host.find('.') {
        Some(pos) if pos > 0 => Some(&host[..pos]),
        _ => None,
    }
}

/// Builder for [`Config`].
///
/// ```rust
/// use snowflake_dsn::Config;
/// use std::time::Duration;
///
/// let cfg = Config::builder()
///     .account("acme.eu-west-1")
///     .user("jsmith")
///     .password("secret")
///     .warehouse("etl")
///     .login_timeout(Duration::from_secs(30))
///     .build()
///     .unwrap();
///
/// assert_eq!(cfg.account, "acme");
/// assert_eq!(cfg.region, "eu-west-1");
/// assert_eq!(cfg.host, "acme.eu-west-1.snowflakecomputing.com");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the account.
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.config.account = account.into();
        self
    }

    /// Set the user name.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.config.user = user.into();
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Set the database.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config.database = database.into();
        self
    }

    /// Set the schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.config.schema = schema.into();
        self
    }

    /// Set the warehouse.
    pub fn warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.config.warehouse = warehouse.into();
        self
    }

    /// Set the role.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.config.role = role.into();
        self
    }

    /// Set the region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    /// Set the protocol.
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.config.protocol = protocol.into();
        self
    }

    /// Set the host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the authenticator.
    pub fn authenticator(mut self, authenticator: impl Into<String>) -> Self {
        self.config.authenticator = authenticator.into();
        self
    }

    /// Set the MFA passcode.
    pub fn passcode(mut self, passcode: impl Into<String>) -> Self {
        self.config.passcode = passcode.into();
        self
    }

    /// Mark the passcode as appended to the password.
    pub fn passcode_in_password(mut self, enabled: bool) -> Self {
        self.config.passcode_in_password = enabled;
        self
    }

    /// Set the login timeout.
    pub fn login_timeout(mut self, timeout: Duration) -> Self {
        self.config.login_timeout = timeout;
        self
    }

    /// Set the request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the application identifier.
    pub fn application(mut self, application: impl Into<String>) -> Self {
        self.config.application = application.into();
        self
    }

    /// Enable/disable insecure mode.
    pub fn insecure_mode(mut self, enabled: bool) -> Self {
        self.config.insecure_mode = enabled;
        self
    }

    /// Set the proxy.
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.config.proxy = proxy;
        self
    }

    /// Add an extension parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.params.insert(key.into(), value.into());
        self
    }

    /// Apply defaults, validate, and return the configuration.
    pub fn build(self) -> DsnResult<Config> {
        let mut config = self.config;
        config.fill_missing()?;
        Ok(config)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
