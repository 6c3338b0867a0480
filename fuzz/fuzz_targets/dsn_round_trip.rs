//! Structured fuzzing for building and re-parsing DSNs.
//!
//! Generates configurations from a restricted alphabet (values that survive
//! the double decode of database, schema, role and warehouse) and checks
//! that parsing the built DSN reproduces the defaulted configuration.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_dsn_round_trip
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use snowflake_dsn::{Config, parse_dsn, to_dsn};
use std::time::Duration;

/// Identifier drawn from a delimiter-free alphabet.
#[derive(Debug, Arbitrary)]
struct Ident(Vec<u8>);

impl Ident {
    fn render(&self) -> String {
        const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789_-";
        self.0
            .iter()
            .take(16)
            .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
            .collect()
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzConfig {
    account: Ident,
    region: Option<Ident>,
    user: Ident,
    password: Ident,
    database: Option<Ident>,
    schema: Option<Ident>,
    warehouse: Option<Ident>,
    role: Option<Ident>,
    login_timeout: u16,
    request_timeout: u16,
    insecure_mode: bool,
    passcode_in_password: bool,
}

fn render(ident: &Option<Ident>) -> String {
    ident.as_ref().map(Ident::render).unwrap_or_default()
}

fuzz_target!(|input: FuzzConfig| {
    let cfg = Config {
        account: input.account.render(),
        region: render(&input.region),
        user: input.user.render(),
        password: input.password.render(),
        database: render(&input.database),
        schema: render(&input.schema),
        warehouse: render(&input.warehouse),
        role: render(&input.role),
        login_timeout: Duration::from_secs(input.login_timeout.into()),
        request_timeout: Duration::from_secs(input.request_timeout.into()),
        insecure_mode: input.insecure_mode,
        passcode_in_password: input.passcode_in_password,
        ..Default::default()
    };

    let Ok(dsn) = to_dsn(&cfg) else {
        return;
    };
    let parsed = parse_dsn(&dsn).expect("built DSN must parse");

    let mut expected = cfg;
    expected.fill_missing().expect("validated by to_dsn");
    assert_eq!(parsed, expected, "round trip through {dsn}");
});
