pub mod scale;
pub mod time;

pub use scale::{ConnectionState, ScaleConfig, WeightReading};
pub use time::to_iso_millis;
