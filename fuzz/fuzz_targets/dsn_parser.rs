//! Fuzz target for the DSN parser.
//!
//! Feeds arbitrary strings to the parser, which must return an error
//! rather than panic on malformed input.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_dsn_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use snowflake_dsn::{lexer, parse_dsn};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = lexer::split(input);
        if let Ok(cfg) = parse_dsn(input) {
            // A parsed config always satisfies the mandatory-field invariant
            assert!(!cfg.account.is_empty());
            assert!(!cfg.user.is_empty());
            assert!(!cfg.password.is_empty());
            assert_ne!(cfg.port, 0);
        }
    }
});
