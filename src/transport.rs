//! Transport capability consumed by the tracker

/// Narrow interface to the wire-protocol client
///
/// The tracker treats the transport as a synchronous upcall: `publish`
/// returns an assigned message id (or a negative failure code) before the
/// tracker's own `publish` returns. The transport is not required to copy
/// the buffers it is handed; the tracker keeps its own copies alive until
/// the message is acknowledged or times out.
///
/// Acknowledgements travel the other way: the transport's event pump calls
/// [`PublishTracker::on_published`](crate::PublishTracker::on_published)
/// with the same id.
pub trait Transport {
    /// Publish a message, returning the assigned id
    ///
    /// A return value `>= 0` is the message id the broker will acknowledge;
    /// any negative value is a transport-specific failure code.
    fn publish(&mut self, topic: &str, payload: &[u8], qos: u8, retain: bool) -> i32;
}
