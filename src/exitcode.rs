/// Standard Unix exit codes for the linkstash CLI.
///
/// These codes follow the BSD convention where possible.
///
/// Successful termination
pub const SUCCESS: i32 = 0;

/// Generic failure, e.g. the store rejected an operation
pub const FAILURE: i32 = 1;

/// Command line usage error - invalid arguments, malformed ids, nothing to change
pub const USAGE: i32 = 64;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration file missing or malformed
pub const CONFIG: i32 = 78;
