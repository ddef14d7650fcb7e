pub mod escalator;
pub mod query_ctx;

pub use escalator::{EscalationPolicy, ResultEscalator};
pub use query_ctx::QueryCtx;
