#![doc = include_str!("../README.md")]

mod cache;
mod combiner;
mod error;
mod fast_value;
mod log;
mod lookup;
mod pause;
mod pipeline;
mod producer;
mod rand_source;
mod record;
mod seeded_random;
mod thread_random;
mod time;
mod trigger;

pub use crate::cache::*;
pub use crate::combiner::*;
pub use crate::error::*;
pub use crate::fast_value::*;
pub use crate::log::*;
pub use crate::lookup::*;
pub use crate::pause::*;
pub use crate::pipeline::*;
pub use crate::producer::*;
pub use crate::rand_source::*;
pub use crate::record::*;
pub use crate::seeded_random::*;
pub use crate::thread_random::*;
pub use crate::time::*;
pub use crate::trigger::*;
