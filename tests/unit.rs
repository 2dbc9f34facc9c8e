//! Unit test harness for stage-motion.
//!
//! Configuration parsing and validation through the public API.

mod unit {
    mod config_parsing;
    mod config_validation;
}
