//! Concrete adapter implementations for ports.

pub mod csv_price_adapter;
pub mod csv_feed_adapter;
pub mod cached_price_adapter;
pub mod file_config_adapter;
pub mod json_snapshot_adapter;
pub mod run_state_adapter;
