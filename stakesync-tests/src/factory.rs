mod chain_readers;
mod contracts;
mod logs;

pub use chain_readers::*;
pub use contracts::*;
pub use logs::*;
