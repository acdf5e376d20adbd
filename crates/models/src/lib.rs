mod error;
mod reserve;
mod trade;
mod schedule;
mod record;

pub use error::*;
pub use reserve::*;
pub use trade::*;
pub use schedule::*;
pub use record::*;
