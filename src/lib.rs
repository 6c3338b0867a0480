//! # snowflake-dsn
//!
//! Translate between Snowflake connection strings (DSNs) and a structured
//! [`Config`].
//!
//! ```text
//! user[:password]@account_or_host[:port][/database[/schema]][?key=value&...]
//! ```
//!
//! This crate performs no I/O: it only parses, validates and builds
//! connection parameters for a driver to consume.
//!
//! ## Parsing
//!
//! ```rust
//! use snowflake_dsn::Config;
//!
//! let cfg = Config::parse("jsmith:secret@acme.us-east-1/sales?warehouse=etl&role=analyst").unwrap();
//! assert_eq!(cfg.account, "acme");
//! assert_eq!(cfg.region, "us-east-1");
//! assert_eq!(cfg.host, "acme.us-east-1.snowflakecomputing.com");
//! assert_eq!(cfg.port, 443);
//! assert_eq!(cfg.database, "sales");
//! assert_eq!(cfg.schema, "public");
//! assert_eq!(cfg.warehouse, "etl");
//! ```
//!
//! ## Building
//!
//! ```rust
//! use snowflake_dsn::Config;
//!
//! let cfg = Config::builder()
//!     .account("acme")
//!     .user("jsmith")
//!     .password("secret")
//!     .warehouse("etl")
//!     .build()
//!     .unwrap();
//!
//! let dsn = cfg.to_dsn().unwrap();
//! assert_eq!(dsn, "jsmith:secret@acme.snowflakecomputing.com:443?warehouse=etl");
//! assert_eq!(Config::parse(&dsn).unwrap(), cfg);
//! ```
//!
//! ## Errors
//!
//! ```rust
//! use snowflake_dsn::{Config, DsnError};
//!
//! assert_eq!(Config::parse("jsmith@acme").unwrap_err(), DsnError::EmptyPassword);
//! assert!(matches!(
//!     Config::parse("jsmith:secret@host:http").unwrap_err(),
//!     DsnError::InvalidPort(port) if port == "http"
//! ));
//! ```

pub mod config;
pub mod defaults;
pub mod env;
pub mod error;
pub mod lexer;
pub mod logging;
pub mod params;
pub mod parser;
pub mod serializer;

pub use config::{
    Config, ConfigBuilder, DEFAULT_APPLICATION, DEFAULT_AUTHENTICATOR, DEFAULT_LOGIN_TIMEOUT,
    DEFAULT_PORT, DEFAULT_PROTOCOL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SCHEMA, DOMAIN_SUFFIX,
    DSN_ENV_VAR, ProxySettings,
};
pub use env::{EnvExpander, EnvSource, MapEnvSource, StdEnvSource};
pub use error::{DsnError, DsnResult};
pub use params::ParamKey;
pub use parser::parse_dsn;
pub use serializer::to_dsn;
