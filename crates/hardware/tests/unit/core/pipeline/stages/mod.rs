/// Commit stage and watchdog.
pub mod commit;

/// Dispatch stage and stall accounting.
pub mod dispatch;



/// Writeback stage.
pub mod writeback;
