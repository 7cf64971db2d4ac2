//! Synthetic WIB frame generation.
//!
//! A [`FrameGenerator`] fills frames with binomial noise around a pedestal,
//! sets error flags with a configurable probability, stamps a strictly
//! increasing timestamp and refreshes every checksum before a frame leaves
//! the generator.

pub mod config;
pub mod error;
pub mod generator;
pub mod naming;

pub use config::{GeneratorConfig, Identity};
pub use error::{GenError, Result};
pub use generator::{FrameGenerator, MAX_NOISE_RETRIES};
pub use naming::FileNaming;
