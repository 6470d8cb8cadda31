#![allow(dead_code)]

pub use concurrently_test_utils::builders;
pub use concurrently_test_utils::scripted_runner;
pub use concurrently_test_utils::{init_tracing, with_timeout};
