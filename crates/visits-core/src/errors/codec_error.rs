/// Errors raised while decoding or reading a persisted store image.
///
/// Any of these aborts the whole load; no partial state survives.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("truncated image: needed {needed} bytes for {field} at offset {offset}")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
    },

    #[error("{field} at offset {offset} is not NUL-terminated")]
    MissingTerminator { field: &'static str, offset: usize },

    #[error("{field} at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str, offset: usize },

    #[error("invalid timestamp at offset {offset}: {secs}s {nanos}ns")]
    InvalidTimestamp { offset: usize, secs: i64, nanos: i64 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
