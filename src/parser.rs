//! DSN parser.

use crate::config::{Config, DEFAULT_SCHEMA, account_from_host};
use crate::error::DsnResult;
use crate::lexer::{self, PathSegment};
use crate::params::{self, query_unescape};
use tracing::debug;

/// Parse a DSN into a validated [`Config`].
///
/// Accepted shapes:
///
/// ```text
/// user[:password]@account_or_hostport/database/schema[?params]
/// user[:password]@account_or_hostport/database[?params]
/// user[:password]@account_or_hostport[?params]
/// ```
///
/// Segment values in the path take precedence over `database`/`schema`
/// query parameters, and an `account.region` target takes precedence over
/// a `region` query parameter.
///
/// # Examples
///
/// ```rust
/// use snowflake_dsn::parse_dsn;
///
/// let cfg = parse_dsn("user:pass@acc/db/sch?warehouse=wh").unwrap();
/// assert_eq!(cfg.user, "user");
/// assert_eq!(cfg.password, "pass");
/// assert_eq!(cfg.host, "acc.snowflakecomputing.com");
/// assert_eq!(cfg.port, 443);
/// assert_eq!(cfg.schema, "sch");
///
/// let cfg = parse_dsn("user:pass@acc/db").unwrap();
/// assert_eq!(cfg.schema, "public");
/// ```
pub fn parse_dsn(dsn: &str) -> DsnResult<Config> {
    debug!(dsn_len = dsn.len(), "parse_dsn()");

    let segments = lexer::split(dsn);
    let mut cfg = Config::new();

    if let Some(credentials) = segments.credentials {
        let (user, password) = lexer::split_credentials(credentials);
        cfg.user = user.to_string();
        cfg.password = password.to_string();
    }

    let mut embedded_region = None;
    if let Some(target) = segments.target {
        let target = lexer::parse_target(target)?;
        if !target.region.is_empty() {
            embedded_region = Some(target.region.clone());
        }
        cfg.account = target.account;
        cfg.region = target.region;
        cfg.host = target.host;
        cfg.port = target.port;
    }

    if let Some(query) = segments.query {
        params::apply_query(&mut cfg, query)?;
    }
    if let Some(region) = embedded_region {
        cfg.region = region;
    }

    match segments.path {
        PathSegment::None => {}
        PathSegment::Database(database) => {
            cfg.database = database.to_string();
            cfg.schema = DEFAULT_SCHEMA.to_string();
        }
        PathSegment::Qualified { database, schema } => {
            cfg.database = database.to_string();
            cfg.schema = schema.to_string();
        }
    }

    if cfg.account.is_empty() {
        if let Some(account) = account_from_host(&cfg.host) {
            cfg.account = account.to_string();
        }
    }

    cfg.fill_missing()?;
    redecode_names(&mut cfg)?;

    debug!(
        account = %cfg.account,
        host = %cfg.host,
        port = cfg.port,
        database = %cfg.database,
        "DSN parsed"
    );
    Ok(cfg)
}

/// Decode database, schema, role and warehouse once more.
///
/// Path segments arrive here still encoded; query values are decoded a
/// second time, which existing DSNs rely on.
fn redecode_names(cfg: &mut Config) -> DsnResult<()> {
    cfg.database = query_unescape(&cfg.database)?;
    cfg.schema = query_unescape(&cfg.schema)?;
    cfg.role = query_unescape(&cfg.role)?;
    cfg.warehouse = query_unescape(&cfg.warehouse)?;
    Ok(())
}
