#![forbid(unsafe_code)]

pub mod model;
pub mod selector;
pub mod time;

pub use selector::{FrozenIds, compute_working_list};
pub use time::Clock;
