#![allow(dead_code)]

pub use cmdpipe_test_utils::builders;
pub use cmdpipe_test_utils::{init_tracing, quiet_context, sh, with_timeout};
