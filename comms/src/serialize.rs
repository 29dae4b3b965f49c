/// Encodes a value into its wire representation.
pub trait Serialize {
    /// Appends the encoded form of `self` to `buf`.
    ///
    /// # Arguments
    /// * `buf` - The buffer to write into, it is not cleared beforehand.
    fn serialize(&self, buf: &mut Vec<u8>);
}
