//! Built-in transforms.

pub mod dedupe;
pub mod filter;
pub mod map;
pub mod mapcat;
pub mod scan;
pub mod take;
pub mod take_last;

pub use dedupe::Dedupe;
pub use filter::Filter;
pub use map::Map;
pub use mapcat::MapCat;
pub use scan::Scan;
pub use take::{Take, TakeWhile};
pub use take_last::TakeLast;
