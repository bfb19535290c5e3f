/// Largest JSON or form body read from a request, in bytes.
pub const DEFAULT_MAX_BODY_SIZE: usize = 128 << 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Bodies longer than this are rejected with `400 Bad Request`.
    pub max_body_size: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}
