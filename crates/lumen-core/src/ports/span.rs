/// Access to the distributed-trace span of the current request.
pub trait SpanReporter: Send + Sync {
    /// Mark the active span as failed with `description`.
    ///
    /// Returns `false` when there is no valid span to mark; that is not an error.
    fn mark_failed(&self, description: &str) -> bool;
}
