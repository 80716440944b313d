use thiserror::Error;

#[derive(Debug, Error)]
pub enum TgxError {
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    #[error("unrecognized element format {0:?}")]
    UnrecognizedElementFormat(String),

    #[error("invalid vertex layout: {0}")]
    InvalidLayout(String),

    #[error(
        "corrupt vertex stream {stream}: {len} bytes needed at offset {offset}, stream holds {available}"
    )]
    CorruptVertexStream {
        stream: usize,
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        index: u16,
        position: usize,
        vertex_count: usize,
    },

    #[error("face at position {position} reads past the end of a {len} value index buffer")]
    IndexBufferOverrun { position: usize, len: usize },

    #[error("unsupported primitive type {0}")]
    UnsupportedPrimitive(u32),

    #[error("missing sub-file {0:?}")]
    MissingFile(String),

    #[error("render metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("unsupported game {0:?}")]
    UnsupportedGame(String),

    #[error("config: {0}")]
    Config(String),
}

pub type TgxResult<T> = Result<T, TgxError>;
