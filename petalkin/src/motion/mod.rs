//! Motion quantization and move tables.

pub mod quantizer;
pub mod table;

pub use quantizer::{MotionQuantizer, QuantizeOptions};
pub use table::{MoveSegment, MoveTable, SpeedMode};
