//! Fuzz target: YAML configuration parsing
//!
//! Invariants checked:
//! - No panics under any input
//! - Every accepted configuration passes `validate()`
//!
//! cargo fuzz run fuzz_config

#![no_main]

use libfuzzer_sys::fuzz_target;
use sousvide::adapters::config_file::YamlConfigAdapter;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = YamlConfigAdapter::parse(text) {
        assert!(config.validate().is_ok());
        assert!(config.polling_interval().as_nanos() > 0);
    }
});
