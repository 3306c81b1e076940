//! Wrapper configuration loading
//!
//! Paths, ports and thresholds used by the wrapper itself, loaded from
//! defaults, an optional config file and `BITCOIND_WRAPPER_*` environment
//! variables (Env > File > Defaults). CLI flags override the result.

pub mod loader;

pub use loader::{load_config, WrapperConfig};
