//! Defaulting and validation pass shared by the parser and the serializer.
//!
//! The pass runs in a fixed order, since later steps read fields written by
//! earlier ones:
//!
//! 1. `account`, `user` and `password` must be non-empty, checked in that order.
//! 2. `protocol` and `port` get their defaults.
//! 3. An `account.region` account is split, the embedded region winning over
//!    any region supplied separately.
//! 4. An unset `host` is derived from `account` and `region`.
//! 5. A region missing from a `*.snowflakecomputing.com` host is inserted.
//! 6. Timeouts, `application` and `authenticator` get their defaults. A
//!    timeout with a fractional second is rounded up to whole seconds, the
//!    unit the DSN carries.
//!
//! Running the pass twice gives the same result as running it once.

use crate::config::{
    Config, DEFAULT_APPLICATION, DEFAULT_AUTHENTICATOR, DEFAULT_LOGIN_TIMEOUT, DEFAULT_PORT,
    DEFAULT_PROTOCOL, DEFAULT_REQUEST_TIMEOUT, DOMAIN_SUFFIX, account_host, split_embedded_region,
};
use crate::error::{DsnError, DsnResult};
use std::time::Duration;
use tracing::trace;

/// Fill unset fields and validate mandatory ones in place.
pub fn fill_missing(cfg: &mut Config) -> DsnResult<()> {
    if cfg.account.is_empty() {
        return Err(DsnError::EmptyAccount);
    }
    if cfg.user.is_empty() {
        return Err(DsnError::EmptyUsername);
    }
    if cfg.password.is_empty() {
        return Err(DsnError::EmptyPassword);
    }

    if cfg.protocol.is_empty() {
        cfg.protocol = DEFAULT_PROTOCOL.to_string();
    }
    if cfg.port == 0 {
        cfg.port = DEFAULT_PORT;
    }

    if let Some((account, region)) = split_embedded_region(&cfg.account) {
        let (account, region) = (account.to_string(), region.to_string());
        trace!(account = %account, region = %region, "Splitting region from account");
        cfg.account = account;
        cfg.region = region;
    }

    if cfg.host.is_empty() {
        cfg.host = account_host(&cfg.account, &cfg.region);
    }

    if !cfg.region.is_empty() {
        reconcile_host_region(cfg);
    }

    if cfg.login_timeout.is_zero() {
        cfg.login_timeout = DEFAULT_LOGIN_TIMEOUT;
    }
    if cfg.request_timeout.is_zero() {
        cfg.request_timeout = DEFAULT_REQUEST_TIMEOUT;
    }
    cfg.login_timeout = whole_seconds(cfg.login_timeout);
    cfg.request_timeout = whole_seconds(cfg.request_timeout);
    if cfg.application.is_empty() {
        cfg.application = DEFAULT_APPLICATION.to_string();
    }
    if cfg.authenticator.is_empty() {
        cfg.authenticator = DEFAULT_AUTHENTICATOR.to_string();
    }

    Ok(())
}

/// Round up to the next whole second.
fn whole_seconds(timeout: Duration) -> Duration {
    if timeout.subsec_nanos() == 0 {
        timeout
    } else {
        Duration::from_secs(timeout.as_secs().saturating_add(1))
    }
}

/// Insert the region into a host derived before the region was known.
fn reconcile_host_region(cfg: &mut Config) {
    let suffix = format!(".{DOMAIN_SUFFIX}");
    let Some(pos) = cfg.host.find(&suffix) else {
        return;
    };
    if pos == 0 {
        return;
    }
    let prefix = &cfg.host[..pos];
    if !prefix.ends_with(cfg.region.as_str()) {
        let host = format!("{prefix}.{}{suffix}", cfg.region);
        trace!(from = %cfg.host, to = %host, "Inserting region into host");
        cfg.host = host;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minimal() -> Config {
        Config {
            account: "acme".into(),
            user: "u".into(),
            password: "p".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_mandatory_field_order() {
        let mut cfg = Config::default();
        assert_eq!(fill_missing(&mut cfg), Err(DsnError::EmptyAccount));

        cfg.account = "acme".into();
        assert_eq!(fill_missing(&mut cfg), Err(DsnError::EmptyUsername));

        cfg.user = "u".into();
        assert_eq!(fill_missing(&mut cfg), Err(DsnError::EmptyPassword));

        cfg.password = "p".into();
        assert_eq!(fill_missing(&mut cfg), Ok(()));
    }

    #[test]
    fn test_failed_validation_leaves_defaults_unset() {
        let mut cfg = Config {
            account: "acme".into(),
            ..Default::default()
        };
        assert!(fill_missing(&mut cfg).is_err());
        assert_eq!(cfg.port, 0);
        assert!(cfg.host.is_empty());
    }

    #[test]
    fn test_timeouts_round_up_to_seconds() {
        let mut cfg = minimal();
        cfg.login_timeout = Duration::from_millis(500);
        cfg.request_timeout = Duration::from_millis(90_500);
        fill_missing(&mut cfg).unwrap();

        assert_eq!(cfg.login_timeout, Duration::from_secs(1));
        assert_eq!(cfg.request_timeout, Duration::from_secs(91));

        fill_missing(&mut cfg).unwrap();
        assert_eq!(cfg.login_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_fills_defaults() {
        let mut cfg = minimal();
        fill_missing(&mut cfg).unwrap();

        assert_eq!(cfg.protocol, "https");
        assert_eq!(cfg.port, 443);
        assert_eq!(cfg.host, "acme.snowflakecomputing.com");
        assert_eq!(cfg.login_timeout, Duration::from_secs(60));
        assert_eq!(cfg.request_timeout, Duration::ZERO);
        assert_eq!(cfg.application, DEFAULT_APPLICATION);
        assert_eq!(cfg.authenticator, "snowflake");
    }

    #[test]
    fn test_keeps_explicit_values() {
        let mut cfg = minimal();
        cfg.protocol = "http".into();
        cfg.port = 8080;
        cfg.host = "localhost".into();
        cfg.login_timeout = Duration::from_secs(5);
        cfg.authenticator = "externalbrowser".into();
        fill_missing(&mut cfg).unwrap();

        assert_eq!(cfg.protocol, "http");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.login_timeout, Duration::from_secs(5));
        assert_eq!(cfg.authenticator, "externalbrowser");
    }

    #[test]
    fn test_region_inserted_into_host() {
        let mut cfg = minimal();
        cfg.host = "acme.snowflakecomputing.com".into();
        cfg.region = "eu-central-1".into();
        fill_missing(&mut cfg).unwrap();

        assert_eq!(cfg.host, "acme.eu-central-1.snowflakecomputing.com");
    }

    #[test]
    fn test_region_already_in_host() {
        let mut cfg = minimal();
        cfg.host = "acme.eu-central-1.snowflakecomputing.com".into();
        cfg.region = "eu-central-1".into();
        fill_missing(&mut cfg).unwrap();

        assert_eq!(cfg.host, "acme.eu-central-1.snowflakecomputing.com");
    }

    #[test]
    fn test_region_ignored_for_foreign_host() {
        let mut cfg = minimal();
        cfg.host = "proxy.internal".into();
        cfg.region = "eu-central-1".into();
        fill_missing(&mut cfg).unwrap();

        assert_eq!(cfg.host, "proxy.internal");
    }

    #[test]
    fn test_embedded_region_wins() {
        let mut cfg = minimal();
        cfg.account = "acme.us-east-1".into();
        cfg.region = "eu-west-1".into();
        fill_missing(&mut cfg).unwrap();

        assert_eq!(cfg.account, "acme");
        assert_eq!(cfg.region, "us-east-1");
        assert_eq!(cfg.host, "acme.us-east-1.snowflakecomputing.com");
    }

    #[test]
    fn test_idempotent() {
        let mut once = minimal();
        once.account = "acme.us-east-1".into();
        once.database = "db".into();
        fill_missing(&mut once).unwrap();

        let mut twice = once.clone();
        fill_missing(&mut twice).unwrap();

        assert_eq!(once, twice);
    }
}
