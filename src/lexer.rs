//! Segment lexer for DSN strings.
//!
//! A DSN is split into its segments by scanning backwards from the end:
//!
//! ```text
//! user[:password]@target[/database[/schema]][?query]
//! ```
//!
//! - The last `/` in the string decides whether a path is present.
//! - The query starts at the first `?` after the last `/` (or after the
//!   `@` when there is no path).
//! - Credentials end at the last `@` before the path.
//! - With two or more slashes, the first slash after the `@` ends the target,
//!   and the last slash separates the database from the schema.
//!
//! All delimiters are ASCII, so every boundary is a valid `str` index.

use crate::config::{DEFAULT_PORT, DOMAIN_SUFFIX, account_host, split_embedded_region};
use crate::error::{DsnError, DsnResult};

/// Read-only cursor over a DSN with bounded delimiter searches.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    src: &'a str,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over `src`.
    pub fn new(src: &'a str) -> Self {
        Self { src }
    }

    /// Length of the underlying string in bytes.
    pub fn len(&self) -> usize {
        self.src.len()
    }

    /// Check if the underlying string is empty.
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Last occurrence of `delim` strictly before `end`.
    pub fn rfind_before(&self, delim: u8, end: usize) -> Option<usize> {
        let end = end.min(self.len());
        self.src.as_bytes()[..end].iter().rposition(|&b| b == delim)
    }

    /// First occurrence of `delim` in `start..end`.
    pub fn find_between(&self, delim: u8, start: usize, end: usize) -> Option<usize> {
        let end = end.min(self.len());
        if start >= end {
            return None;
        }
        self.src.as_bytes()[start..end]
            .iter()
            .position(|&b| b == delim)
            .map(|pos| start + pos)
    }

    /// First occurrence of `delim` at or after `start`.
    pub fn find_from(&self, delim: u8, start: usize) -> Option<usize> {
        self.find_between(delim, start, self.len())
    }

    /// The text in `start..end`, empty when the range is inverted.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        self.src.get(start..end).unwrap_or("")
    }

    /// The text from `start` to the end.
    pub fn tail(&self, start: usize) -> &'a str {
        self.slice(start, self.len())
    }
}

/// Database/schema portion of a DSN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathSegment<'a> {
    /// No `/` in the DSN.
    #[default]
    None,
    /// `/database`; the schema takes its default.
    Database(&'a str),
    /// `/database/schema`.
    Qualified {
        /// Database text.
        database: &'a str,
        /// Schema text.
        schema: &'a str,
    },
}

/// Raw, undecoded segments of a DSN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Segments<'a> {
    /// `user[:password]`, present when an `@` bounds it.
    pub credentials: Option<&'a str>,
    /// `account` or `host[:port]`.
    pub target: Option<&'a str>,
    /// Database and schema.
    pub path: PathSegment<'a>,
    /// Query string without the leading `?`.
    pub query: Option<&'a str>,
}

/// Split a DSN into its raw segments.
pub fn split(dsn: &str) -> Segments<'_> {
    let cursor = Cursor::new(dsn);
    match cursor.rfind_before(b'/', cursor.len()) {
        Some(slash) => split_with_path(cursor, slash),
        None => split_without_path(cursor),
    }
}

fn split_with_path(cursor: Cursor<'_>, slash: usize) -> Segments<'_> {
    let question = cursor.find_from(b'?', slash + 1);
    let path_end = question.unwrap_or(cursor.len());
    let query = question.map(|pos| cursor.tail(pos + 1));

    // A leading slash carries neither credentials nor a target.
    if slash == 0 {
        return Segments {
            credentials: None,
            target: None,
            path: PathSegment::Database(cursor.slice(1, path_end)),
            query,
        };
    }

    let at = cursor.rfind_before(b'@', slash);
    let target_start = at.map_or(0, |pos| pos + 1);
    let first_slash = cursor.find_between(b'/', target_start, slash);
    let target_end = first_slash.unwrap_or(slash);

    let path = match first_slash {
        Some(first) => PathSegment::Qualified {
            database: cursor.slice(first + 1, slash),
            schema: cursor.slice(slash + 1, path_end),
        },
        None => PathSegment::Database(cursor.slice(slash + 1, path_end)),
    };

    Segments {
        credentials: at.map(|pos| cursor.slice(0, pos)),
        target: Some(cursor.slice(target_start, target_end)),
        path,
        query,
    }
}

fn split_without_path(cursor: Cursor<'_>) -> Segments<'_> {
    let at = cursor.rfind_before(b'@', cursor.len());
    let target_start = at.map_or(0, |pos| pos + 1);
    let question = cursor.find_from(b'?', target_start);
    let target_end = question.unwrap_or(cursor.len());

    Segments {
        credentials: at.map(|pos| cursor.slice(0, pos)),
        target: Some(cursor.slice(target_start, target_end)),
        path: PathSegment::None,
        query: question.map(|pos| cursor.tail(pos + 1)),
    }
}

/// Split `user[:password]` once on the first `:`.
pub fn split_credentials(credentials: &str) -> (&str, &str) {
    credentials.split_once(':').unwrap_or((credentials, ""))
}

/// Connection target decoded from the segment between `@` and the path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Target {
    /// Account name, empty when a host was given.
    pub account: String,
    /// Region split off the account name.
    pub region: String,
    /// Host name.
    pub host: String,
    /// Port, 0 when a host was given without one.
    pub port: u16,
}

/// Parse an `account` or `host[:port]` target.
///
/// A segment with no port (or port 0) whose host does not end in
/// `snowflakecomputing.com` is an account name: the host is derived from it
/// and an `account.region` form is split at the first dot.
///
/// The port must be a decimal integer in `0..=65535`; anything else,
/// including an out-of-range number, is [`DsnError::InvalidPort`].
///
/// ```rust
/// use snowflake_dsn::lexer::parse_target;
///
/// let target = parse_target("ab.us-east-1").unwrap();
/// assert_eq!(target.account, "ab");
/// assert_eq!(target.region, "us-east-1");
///
/// let target = parse_target("ab:5432").unwrap();
/// assert_eq!(target.host, "ab");
/// assert_eq!(target.port, 5432);
/// assert_eq!(target.account, "");
/// ```
pub fn parse_target(segment: &str) -> DsnResult<Target> {
    let (host, port) = match segment.split_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| DsnError::InvalidPort(port.to_string()))?;
            (host, port)
        }
        None => (segment, 0),
    };

    if port != 0 || host.ends_with(DOMAIN_SUFFIX) {
        return Ok(Target {
            host: host.to_string(),
            port,
            ..Default::default()
        });
    }

    let (account, region) = split_embedded_region(host).unwrap_or((host, ""));
    Ok(Target {
        account: account.to_string(),
        region: region.to_string(),
        host: account_host(host, ""),
        port: DEFAULT_PORT,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cursor_searches() {
        let cursor = Cursor::new("a/b/c?d");
        assert_eq!(cursor.rfind_before(b'/', cursor.len()), Some(3));
        assert_eq!(cursor.rfind_before(b'/', 3), Some(1));
        assert_eq!(cursor.rfind_before(b'/', 1), None);
        assert_eq!(cursor.find_between(b'/', 2, 5), Some(3));
        assert_eq!(cursor.find_between(b'/', 4, 2), None);
        assert_eq!(cursor.find_from(b'?', 0), Some(5));
        assert_eq!(cursor.tail(6), "d");
        assert_eq!(cursor.slice(4, 2), "");
        assert!(!cursor.is_empty());
        assert!(Cursor::new("").is_empty());
    }

    #[test]
    fn test_split_full() {
        let seg = split("user:pass@acc/db/sch?warehouse=wh");
        assert_eq!(seg.credentials, Some("user:pass"));
        assert_eq!(seg.target, Some("acc"));
        assert_eq!(
            seg.path,
            PathSegment::Qualified {
                database: "db",
                schema: "sch"
            }
        );
        assert_eq!(seg.query, Some("warehouse=wh"));
    }

    #[test]
    fn test_split_database_only() {
        let seg = split("user:pass@acc/db?role=r");
        assert_eq!(seg.target, Some("acc"));
        assert_eq!(seg.path, PathSegment::Database("db"));
        assert_eq!(seg.query, Some("role=r"));
    }

    #[test]
    fn test_split_no_path() {
        let seg = split("user:pass@host.snowflakecomputing.com:443?database=db");
        assert_eq!(seg.credentials, Some("user:pass"));
        assert_eq!(seg.target, Some("host.snowflakecomputing.com:443"));
        assert_eq!(seg.path, PathSegment::None);
        assert_eq!(seg.query, Some("database=db"));
    }

    #[test]
    fn test_split_extra_slashes_belong_to_database() {
        let seg = split("u:p@acc/a/b/c");
        assert_eq!(
            seg.path,
            PathSegment::Qualified {
                database: "a/b",
                schema: "c"
            }
        );
    }

    #[test]
    fn test_split_last_at_before_path_ends_credentials() {
        let seg = split("u:p@ss@acc/db");
        assert_eq!(seg.credentials, Some("u:p@ss"));
        assert_eq!(seg.target, Some("acc"));
    }

    #[test]
    fn test_split_without_credentials() {
        let seg = split("acc/db");
        assert_eq!(seg.credentials, None);
        assert_eq!(seg.target, Some("acc"));
        assert_eq!(seg.path, PathSegment::Database("db"));
    }

    #[test]
    fn test_split_leading_slash() {
        let seg = split("/db?account=acc");
        assert_eq!(seg.credentials, None);
        assert_eq!(seg.target, None);
        assert_eq!(seg.path, PathSegment::Database("db"));
        assert_eq!(seg.query, Some("account=acc"));
    }

    #[test]
    fn test_split_empty_segments() {
        let seg = split("user:pass@/db");
        assert_eq!(seg.target, Some(""));
        assert_eq!(seg.path, PathSegment::Database("db"));

        let seg = split("u:p@acc//");
        assert_eq!(
            seg.path,
            PathSegment::Qualified {
                database: "",
                schema: ""
            }
        );
    }

    #[test]
    fn test_split_query_only() {
        let seg = split("?account=acc");
        assert_eq!(seg.credentials, None);
        assert_eq!(seg.target, Some(""));
        assert_eq!(seg.path, PathSegment::None);
        assert_eq!(seg.query, Some("account=acc"));
    }

    #[test]
    fn test_split_empty() {
        let seg = split("");
        assert_eq!(seg.credentials, None);
        assert_eq!(seg.target, Some(""));
        assert_eq!(seg.query, None);
    }

    #[test]
    fn test_split_credentials() {
        assert_eq!(split_credentials("user:pass"), ("user", "pass"));
        assert_eq!(split_credentials("user:pa:ss"), ("user", "pa:ss"));
        assert_eq!(split_credentials("user"), ("user", ""));
        assert_eq!(split_credentials(":pass"), ("", "pass"));
    }

    #[test]
    fn test_parse_target_account() {
        let target = parse_target("acme").unwrap();
        assert_eq!(
            target,
            Target {
                account: "acme".into(),
                region: String::new(),
                host: "acme.snowflakecomputing.com".into(),
                port: 443,
            }
        );
    }

    #[test]
    fn test_parse_target_account_with_region() {
        let target = parse_target("ab.us-east-1").unwrap();
        assert_eq!(target.account, "ab");
        assert_eq!(target.region, "us-east-1");
        assert_eq!(target.host, "ab.us-east-1.snowflakecomputing.com");
        assert_eq!(target.port, 443);
    }

    #[test]
    fn test_parse_target_host_port() {
        let target = parse_target("ab:5432").unwrap();
        assert_eq!(target.host, "ab");
        assert_eq!(target.port, 5432);
        assert_eq!(target.account, "");
        assert_eq!(target.region, "");
    }

    #[test]
    fn test_parse_target_full_host_without_port() {
        let target = parse_target("acme.snowflakecomputing.com").unwrap();
        assert_eq!(target.host, "acme.snowflakecomputing.com");
        assert_eq!(target.port, 0);
        assert_eq!(target.account, "");
    }

    #[test]
    fn test_parse_target_zero_port_is_account() {
        let target = parse_target("acme:0").unwrap();
        assert_eq!(target.account, "acme");
        assert_eq!(target.port, 443);
    }

    #[test]
    fn test_parse_target_bad_port() {
        assert_eq!(
            parse_target("acme:44x"),
            Err(DsnError::InvalidPort("44x".into()))
        );
        assert_eq!(parse_target("acme:"), Err(DsnError::InvalidPort(String::new())));
        assert_eq!(
            parse_target("acme:70000"),
            Err(DsnError::InvalidPort("70000".into()))
        );
    }

    #[test]
    fn test_parse_target_empty() {
        let target = parse_target("").unwrap();
        assert_eq!(target.account, "");
        assert_eq!(target.host, ".snowflakecomputing.com");
    }
}
