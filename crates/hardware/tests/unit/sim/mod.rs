
/// Trace parsing and file loading.
pub mod trace;
