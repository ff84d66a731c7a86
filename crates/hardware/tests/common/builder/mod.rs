//! Fluent builders for test inputs.


pub use trace::TraceBuilder;
