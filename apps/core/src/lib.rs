pub mod config;
pub mod contract;
pub mod key_normalizer;
pub mod logging;
pub mod memory_store;
pub mod model;
pub mod pref_index;
pub mod prober;
pub mod registry_store;
pub mod runtime;
pub mod store;
pub mod transport;
