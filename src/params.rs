//! Query-string parameters.
//!
//! Values are percent-encoded the way HTML forms encode them (`+` for a
//! space, `%XX` for everything outside the unreserved set). Keys are
//! matched verbatim; unknown keys land in [`Config::params`].

use crate::config::Config;
use crate::error::{DsnError, DsnResult};
use std::time::Duration;
use tracing::trace;

/// Query keys with a dedicated [`Config`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// `account`
    Account,
    /// `warehouse`
    Warehouse,
    /// `database`
    Database,
    /// `schema`
    Schema,
    /// `role`
    Role,
    /// `region`
    Region,
    /// `protocol`
    Protocol,
    /// `passcode`
    Passcode,
    /// `passcodeInPassword`
    PasscodeInPassword,
    /// `loginTimeout`, in seconds
    LoginTimeout,
    /// `requestTimeout`, in seconds
    RequestTimeout,
    /// `application`
    Application,
    /// `authenticator`
    Authenticator,
    /// `insecureMode`
    InsecureMode,
    /// `proxyHost`
    ProxyHost,
    /// `proxyPort`
    ProxyPort,
    /// `proxyUser`
    ProxyUser,
    /// `proxyPassword`
    ProxyPassword,
}

impl ParamKey {
    /// Every recognized key.
    pub const ALL: [ParamKey; 18] = [
        Self::Account,
        Self::Warehouse,
        Self::Database,
        Self::Schema,
        Self::Role,
        Self::Region,
        Self::Protocol,
        Self::Passcode,
        Self::PasscodeInPassword,
        Self::LoginTimeout,
        Self::RequestTimeout,
        Self::Application,
        Self::Authenticator,
        Self::InsecureMode,
        Self::ProxyHost,
        Self::ProxyPort,
        Self::ProxyUser,
        Self::ProxyPassword,
    ];

    /// Look up a key by its query-string name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Query-string name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Warehouse => "warehouse",
            Self::Database => "database",
            Self::Schema => "schema",
            Self::Role => "role",
            Self::Region => "region",
            Self::Protocol => "protocol",
            Self::Passcode => "passcode",
            Self::PasscodeInPassword => "passcodeInPassword",
            Self::LoginTimeout => "loginTimeout",
            Self::RequestTimeout => "requestTimeout",
            Self::Application => "application",
            Self::Authenticator => "authenticator",
            Self::InsecureMode => "insecureMode",
            Self::ProxyHost => "proxyHost",
            Self::ProxyPort => "proxyPort",
            Self::ProxyUser => "proxyUser",
            Self::ProxyPassword => "proxyPassword",
        }
    }

    /// Whether values of this key must never appear in logs.
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Passcode | Self::ProxyPassword)
    }
}

impl std::fmt::Display for ParamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply a raw query string (without the leading `?`) to `cfg`.
///
/// Pairs without an `=` are skipped. Values are percent-decoded before
/// dispatch; a malformed escape or an unparseable typed value aborts.
pub fn apply_query(cfg: &mut Config, query: &str) -> DsnResult<()> {
    for pair in query.split('&') {
        let Some((key, raw)) = pair.split_once('=') else {
            trace!(pair = %pair, "Skipping query pair without '='");
            continue;
        };
        let value = query_unescape(raw)?;
        match ParamKey::from_key(key) {
            Some(param) => {
                trace!(key = %param, secret = param.is_secret(), "Applying query parameter");
                apply_param(cfg, param, value)?;
            }
            None => {
                trace!(key = %key, "Storing extension parameter");
                cfg.params.insert(key.to_string(), value);
            }
        }
    }
    Ok(())
}

fn apply_param(cfg: &mut Config, key: ParamKey, value: String) -> DsnResult<()> {
    match key {
        ParamKey::Account => cfg.account = value,
        ParamKey::Warehouse => cfg.warehouse = value,
        ParamKey::Database => cfg.database = value,
        ParamKey::Schema => cfg.schema = value,
        ParamKey::Role => cfg.role = value,
        ParamKey::Region => cfg.region = value,
        ParamKey::Protocol => cfg.protocol = value,
        ParamKey::Passcode => cfg.passcode = value,
        ParamKey::PasscodeInPassword => cfg.passcode_in_password = parse_bool(key, &value)?,
        ParamKey::LoginTimeout => cfg.login_timeout = parse_seconds(key, &value)?,
        ParamKey::RequestTimeout => cfg.request_timeout = parse_seconds(key, &value)?,
        ParamKey::Application => cfg.application = value,
        ParamKey::Authenticator => cfg.authenticator = value,
        ParamKey::InsecureMode => cfg.insecure_mode = parse_bool(key, &value)?,
        ParamKey::ProxyHost => cfg.proxy.host = value,
        ParamKey::ProxyPort => {
            cfg.proxy.port = value
                .parse()
                .map_err(|e| DsnError::invalid_parameter(key.as_str(), &value, e))?;
        }
        ParamKey::ProxyUser => cfg.proxy.user = value,
        ParamKey::ProxyPassword => cfg.proxy.password = value,
    }
    Ok(())
}

/// Parse a boolean the way connection strings spell them.
pub fn parse_bool(key: ParamKey, value: &str) -> DsnResult<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(DsnError::invalid_parameter(
            key.as_str(),
            value,
            "expected a boolean",
        )),
    }
}

/// Parse a whole number of seconds.
pub fn parse_seconds(key: ParamKey, value: &str) -> DsnResult<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| DsnError::invalid_parameter(key.as_str(), value, e))
}

/// Percent-encode a value for use in a query string.
pub fn query_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Decode a percent-encoded query value.
///
/// `+` decodes to a space. A `%` must be followed by two hex digits and the
/// decoded bytes must be valid UTF-8.
pub fn query_unescape(value: &str) -> DsnResult<String> {
    if !value.contains(['%', '+']) {
        return Ok(value.to_string());
    }

    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_value);
                let lo = bytes.get(i + 2).copied().and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                    _ => return Err(DsnError::InvalidEscape(value.to_string())),
                }
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).map_err(|_| DsnError::InvalidEscape(value.to_string()))
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
