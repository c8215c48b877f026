//! Compact data interchange for small devices.
//!
//! limero bundles two independent codecs:
//!
//! - [`value`]: self-describing [`Value`] trees with CBOR and JSON encodings
//! - [`frame`]: a bounded CBOR subset written field by field, protected by
//!   CRC-16 and delimited with COBS for serial and radio links
//!
//! The `limero` binary (feature `cli`) converts between JSON and CBOR and
//! dumps frames from the command line.

/// Re-export value types.
pub mod value {
    pub use limero_value::*;
}

/// Re-export frame types.
pub mod frame {
    pub use limero_frame::*;
}

pub use limero_frame::{FrameDecoder, FrameEncoder, FrameError};
pub use limero_value::{Value, ValueError, ValueKind};
