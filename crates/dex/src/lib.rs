pub mod cpmm;
pub mod buyback;

pub use cpmm::VirtualCpmm;
pub use buyback::buyback;
