pub mod control; // Control-to-audio parameter messages
pub mod dsp;
pub mod error;
pub mod patch; // Serializable effect descriptors

pub use control::{drain, EffectMessage, MessageReceiver};
pub use dsp::{DesignCtx, Effect, Frame};
pub use error::{ConfigError, Result};

/// Largest block the auditioner renders at once.
pub const MAX_BLOCK_SIZE: usize = 2048;
