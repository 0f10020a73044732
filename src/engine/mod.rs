pub mod medium;
pub mod seed;
pub mod store;
pub mod vault;

pub use medium::{FileMedium, Medium, MemoryMedium};
pub use store::{KindInfo, Snapshot, Store};
