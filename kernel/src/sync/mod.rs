pub mod interrupt;

pub use interrupt::{InterruptGate, IntStatus};
