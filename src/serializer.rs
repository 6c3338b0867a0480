//! DSN serializer.

use crate::config::{
    Config, DEFAULT_APPLICATION, DEFAULT_AUTHENTICATOR, DEFAULT_LOGIN_TIMEOUT, DEFAULT_PROTOCOL,
    DEFAULT_REQUEST_TIMEOUT, account_from_host,
};
use crate::error::DsnResult;
use crate::params::ParamKey;
use std::time::Duration;
use tracing::{debug, trace};
use url::form_urlencoded;

/// Build the canonical DSN for a configuration.
///
/// The output has the form `user:password@host:port[?query]`, where the
/// query holds only the fields that differ from their defaults. Defaults are
/// applied to a copy first, so the input is left untouched and missing
/// mandatory fields are reported as errors.
///
/// Query key order is not part of the format.
///
/// # Examples
///
/// ```rust
/// use snowflake_dsn::{Config, to_dsn};
/// use std::time::Duration;
///
/// let mut cfg = Config::new();
/// cfg.account = "acme".into();
/// cfg.user = "jsmith".into();
/// cfg.password = "secret".into();
/// assert_eq!(to_dsn(&cfg).unwrap(), "jsmith:secret@acme.snowflakecomputing.com:443");
///
/// cfg.login_timeout = Duration::from_secs(30);
/// assert_eq!(
///     to_dsn(&cfg).unwrap(),
///     "jsmith:secret@acme.snowflakecomputing.com:443?loginTimeout=30"
/// );
/// ```
pub fn to_dsn(cfg: &Config) -> DsnResult<String> {
    let mut cfg = cfg.clone();
    cfg.fill_missing()?;

    let mut query = QueryWriter::new();

    if account_from_host(&cfg.host) != Some(cfg.account.as_str()) {
        query.pair(ParamKey::Account, &cfg.account);
    }
    query.non_empty(ParamKey::Database, &cfg.database);
    query.non_empty(ParamKey::Schema, &cfg.schema);
    query.non_empty(ParamKey::Warehouse, &cfg.warehouse);
    query.non_empty(ParamKey::Role, &cfg.role);
    query.non_empty(ParamKey::Region, &cfg.region);
    if cfg.protocol != DEFAULT_PROTOCOL {
        query.pair(ParamKey::Protocol, &cfg.protocol);
    }
    if cfg.authenticator != DEFAULT_AUTHENTICATOR {
        query.pair(ParamKey::Authenticator, &cfg.authenticator);
    }
    query.non_empty(ParamKey::Passcode, &cfg.passcode);
    query.flag(ParamKey::PasscodeInPassword, cfg.passcode_in_password);
    query.timeout(ParamKey::LoginTimeout, cfg.login_timeout, DEFAULT_LOGIN_TIMEOUT);
    query.timeout(ParamKey::RequestTimeout, cfg.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    if cfg.application != DEFAULT_APPLICATION {
        query.pair(ParamKey::Application, &cfg.application);
    }
    query.flag(ParamKey::InsecureMode, cfg.insecure_mode);

    query.non_empty(ParamKey::ProxyHost, &cfg.proxy.host);
    if cfg.proxy.port != 0 {
        query.pair(ParamKey::ProxyPort, &cfg.proxy.port.to_string());
    }
    query.non_empty(ParamKey::ProxyUser, &cfg.proxy.user);
    query.non_empty(ParamKey::ProxyPassword, &cfg.proxy.password);

    for (key, value) in &cfg.params {
        if ParamKey::from_key(key).is_some() {
            trace!(key = %key, "Skipping extension parameter shadowing a field");
            continue;
        }
        query.raw(key, value);
    }

    let mut dsn = format!("{}:{}@{}:{}", cfg.user, cfg.password, cfg.host, cfg.port);
    let query = query.finish();
    if !query.is_empty() {
        dsn.push('?');
        dsn.push_str(&query);
    }

    debug!(
        account = %cfg.account,
        host = %cfg.host,
        port = cfg.port,
        "DSN built"
    );
    Ok(dsn)
}

/// Accumulates `key=value` pairs, percent-encoding each value.
struct QueryWriter {
    inner: form_urlencoded::Serializer<'static, String>,
}

impl QueryWriter {
    fn new() -> Self {
        Self {
            inner: form_urlencoded::Serializer::new(String::new()),
        }
    }

    fn pair(&mut self, key: ParamKey, value: &str) {
        self.inner.append_pair(key.as_str(), value);
    }

    fn raw(&mut self, key: &str, value: &str) {
        self.inner.append_pair(key, value);
    }

    fn non_empty(&mut self, key: ParamKey, value: &str) {
        if !value.is_empty() {
            self.pair(key, value);
        }
    }

    fn flag(&mut self, key: ParamKey, enabled: bool) {
        if enabled {
            self.pair(key, "true");
        }
    }

    fn timeout(&mut self, key: ParamKey, value: Duration, default: Duration) {
        if value != default {
            self.pair(key, &value.as_secs().to_string());
        }
    }

    fn finish(mut self) -> String {
        self.inner.finish()
    }
}
