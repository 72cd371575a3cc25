pub mod config;
pub mod fee_tier;
pub mod pool;
pub mod position;
pub mod tick;
pub mod tick_bitmap;
pub mod oracle;

pub use config::*;
pub use fee_tier::*;
pub use pool::*;
pub use position::PositionInfo;
pub use tick::{TickGlobals, TickInfo};
pub use oracle::Observation;
