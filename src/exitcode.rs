//! Process exit codes
//!
//! Usage errors exit with 1; other failures use BSD sysexits.h values.

/// Successful termination (also used when the operator declines)
pub const OK: i32 = 0;

/// Command line usage error
pub const USAGE: i32 = 1;

/// Data format error (e.g. dataset schemas differ)
pub const DATAERR: i32 = 65;

/// Remote hub unavailable or rejected the request
pub const UNAVAILABLE: i32 = 69;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
