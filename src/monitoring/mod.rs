/*!
 * Monitoring
 * Structured tracing setup and wait-path statistics
 */

mod stats;
mod tracer;

pub use stats::{WaitStats, WaitStatsSnapshot};
pub use tracer::{init_tracing, WaitSpan, ENV_TRACE_JSON};
