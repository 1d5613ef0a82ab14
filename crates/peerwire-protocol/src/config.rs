use peerwire_frame::DEFAULT_MAX_PAYLOAD;

/// Configuration for a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Largest declared payload size accepted from a peer. Default: 64 MiB.
    pub max_payload_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
