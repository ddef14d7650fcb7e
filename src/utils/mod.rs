pub mod cancel;
pub mod logging;
