use crate::error::Result;

/// Decodes a value from its wire representation.
pub trait Deserialize: Sized {
    /// Parses a complete datagram payload.
    ///
    /// # Arguments
    /// * `buf` - The received bytes.
    ///
    /// # Returns
    /// The decoded value or a `ParseErr` describing why the payload is malformed.
    fn deserialize(buf: &[u8]) -> Result<Self>;
}
