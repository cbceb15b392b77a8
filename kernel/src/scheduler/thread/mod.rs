//! Thread module

pub mod thread;
pub mod state;
pub mod stack;
pub mod table;

pub use thread::{Level, Priority, Thread, ThreadBuilder, ThreadId, UserContext};
pub use state::ThreadState;
pub use stack::ThreadStack;
pub use table::ThreadTable;
