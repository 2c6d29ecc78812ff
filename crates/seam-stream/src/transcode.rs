//! Stream transcoder trait for protocol bridging.

/// Stream transcoder: maps an input stream to an output stream.
///
/// Stateful, supports 1:N mapping and an end-of-stream flush. Used for both
/// directions of the protocol boundary: deltas to wire events on the way out,
/// wire events back to deltas on the way in.
pub trait Transcode: Send {
    /// Input item type consumed by this transcoder.
    type Input: Send + 'static;
    /// Output item type produced by this transcoder.
    type Output: Send + 'static;
    /// Error raised when the input stream breaks the protocol.
    type Error: Send + 'static;

    /// Map one input item to zero or more output items.
    fn transcode(&mut self, item: &Self::Input) -> Result<Vec<Self::Output>, Self::Error>;

    /// Items emitted after the input stream ends.
    fn finish(&mut self) -> Result<Vec<Self::Output>, Self::Error> {
        Ok(Vec::new())
    }
}
