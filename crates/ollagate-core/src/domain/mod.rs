//! Domain types shared by the gateway layers.

pub mod capabilities;
pub mod duration;
pub mod keep_alive;
pub mod options;

pub use capabilities::{Capability, CapabilitySet, default_capabilities};
pub use duration::{DurationParseError, SignedDuration, format_duration, parse_duration};
pub use keep_alive::KeepAlive;
pub use options::{DecodedOptions, GenerationOptions, OptionKind, OptionsError, decode_options};
