use crate::{BytecodeCache, PipelineError};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use std::sync::Arc;
use vmcam_runtime::{Handle, Runtime, Session};

/// Standard alphabet, decoded the way a browser's `atob` does: padding is
/// optional and stray bits in the last symbol are ignored.
const ATTRIBUTE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode the base64 program blob carried by the video element.
///
/// ASCII whitespace (line wrapping in the attribute) is ignored.
pub fn decode_bytecode(encoded: &str) -> Result<Vec<u8>, PipelineError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(PipelineError::Bytecode("bytecode attribute is empty".to_string()));
    }
    Ok(ATTRIBUTE_ENGINE.decode(compact)?)
}

/// Where each tick gets its bytecode buffer from.
pub enum BytecodeStore<R: Runtime> {
    /// One buffer for the whole session.
    Cached(Arc<Handle<R, R::DataBuffer>>),
    /// The encoded attribute, decoded again on every tick.
    PerFrame(Arc<str>),
}

/// A bytecode buffer borrowed for one tick.
pub enum BytecodeRef<R: Runtime> {
    Shared(Arc<Handle<R, R::DataBuffer>>),
    Owned(Handle<R, R::DataBuffer>),
}

impl<R: Runtime> BytecodeRef<R> {
    pub fn handle(&self) -> &Handle<R, R::DataBuffer> {
        match self {
            BytecodeRef::Shared(handle) => &**handle,
            BytecodeRef::Owned(handle) => handle,
        }
    }
}

impl<R: Runtime> BytecodeStore<R> {
    /// Decode up front for `PerSession`; `PerFrame` only checks the blob decodes.
    pub fn new(
        cache: BytecodeCache,
        encoded: &str,
        session: &Session<R>,
    ) -> Result<Self, PipelineError> {
        let bytes = decode_bytecode(encoded)?;
        match cache {
            BytecodeCache::PerSession => {
                let buffer = session.create_data_buffer(&bytes)?;
                log::info!("bytecode: {} bytes, cached for the session", bytes.len());
                Ok(BytecodeStore::Cached(Arc::new(buffer)))
            }
            BytecodeCache::PerFrame => {
                log::info!("bytecode: {} bytes, decoded per frame", bytes.len());
                Ok(BytecodeStore::PerFrame(Arc::from(encoded)))
            }
        }
    }

    pub fn acquire(&self, session: &Session<R>) -> Result<BytecodeRef<R>, PipelineError> {
        match self {
            BytecodeStore::Cached(buffer) => Ok(BytecodeRef::Shared(buffer.clone())),
            BytecodeStore::PerFrame(encoded) => {
                let bytes = decode_bytecode(encoded)?;
                Ok(BytecodeRef::Owned(session.create_data_buffer(&bytes)?))
            }
        }
    }
}

impl<R: Runtime> Clone for BytecodeStore<R> {
    fn clone(&self) -> Self {
        match self {
            BytecodeStore::Cached(buffer) => BytecodeStore::Cached(buffer.clone()),
            BytecodeStore::PerFrame(encoded) => BytecodeStore::PerFrame(encoded.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ignores_line_wrapping() {
        assert_eq!(decode_bytecode("aGVs\nbG8=\n").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_accepts_missing_padding() {
        assert_eq!(decode_bytecode("aGVsbG8").unwrap(), b"hello");
        assert_eq!(decode_bytecode("aGVsbA").unwrap(), b"hell");
    }

    #[test]
    fn test_decode_ignores_trailing_bits() {
        assert_eq!(decode_bytecode("aGVsbG9").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert!(matches!(decode_bytecode("  \n"), Err(PipelineError::Bytecode(_))));
    }

    #[test]
    fn test_decode_rejects_invalid() {
        assert!(matches!(decode_bytecode("not*base64"), Err(PipelineError::Bytecode(_))));
    }
}
