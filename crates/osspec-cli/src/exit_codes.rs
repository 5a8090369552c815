//! Exit codes for the `osspec` binary.
//!
//! Coarse and stable for CI: 0 success, 1 compile/validation failure, 2
//! usage error (clap emits 2 on its own for bad invocations).

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const USAGE: i32 = 2;
