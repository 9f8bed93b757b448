//! Bolt protocol codec for tokio_util.
//!
//! Implements chunked message framing as per Bolt protocol specification.
//! Messages are split into chunks with a 2-byte length prefix and terminated
//! by an empty chunk. Each message carries exactly one PackStream value.

use std::sync::Arc;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::config::CodecConfig;
use super::packstream::{
    DecodeError, HandlerRegistry, PackStreamReader, PackStreamWriter, SliceSource, Value,
};
use super::BoltError;

/// End of message marker (0x00 0x00)
pub const END_MARKER: [u8; 2] = [0x00, 0x00];

/// Bolt message codec for framing.
#[derive(Debug)]
pub struct BoltCodec {
    config: CodecConfig,
    registry: Arc<HandlerRegistry>,
    /// Buffer for accumulating chunks
    message_buffer: BytesMut,
}

impl BoltCodec {
    /// Create a codec with default limits and the full Bolt registry.
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default(), Arc::new(HandlerRegistry::bolt()))
    }

    /// Create a codec with explicit limits and registry.
    pub fn with_config(config: CodecConfig, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            config,
            registry,
            message_buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Active limits.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Shared handler registry.
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    fn decode_message(&self, data: &[u8]) -> Result<Value, BoltError> {
        let mut reader = PackStreamReader::new(SliceSource::new(data), Arc::clone(&self.registry))
            .with_max_depth(self.config.max_nesting_depth);
        let value = reader.read()?;

        let remaining = reader.source().remaining();
        if remaining > 0 {
            return Err(BoltError::PackStream(
                DecodeError::TrailingBytes { remaining }.into(),
            ));
        }
        Ok(value)
    }

    /// Split a message into chunks.
    fn encode_chunked(&self, data: &[u8], dst: &mut BytesMut) {
        let chunk_size = self.config.max_chunk_size.clamp(1, u16::MAX as usize);
        dst.reserve(data.len() + (data.len() / chunk_size + 1) * 2 + END_MARKER.len());

        for chunk in data.chunks(chunk_size) {
            // Write chunk header (2-byte big-endian length)
            dst.put_u16(chunk.len() as u16);
            dst.put_slice(chunk);
        }

        dst.put_slice(&END_MARKER);
    }
}

impl Default for BoltCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for BoltCodec {
    type Item = Value;
    type Error = BoltError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            // Need at least 2 bytes for chunk header
            if src.len() < 2 {
                return Ok(None);
            }

            let chunk_size = u16::from_be_bytes([src[0], src[1]]) as usize;

            if chunk_size == 0 {
                src.advance(2);

                if self.message_buffer.is_empty() {
                    // NOOP keep-alive
                    continue;
                }

                let message_data = self.message_buffer.split();
                return self.decode_message(&message_data).map(Some);
            }

            if src.len() < 2 + chunk_size {
                src.reserve(2 + chunk_size - src.len());
                return Ok(None);
            }

            let size = self.message_buffer.len() + chunk_size;
            if size > self.config.max_message_size {
                return Err(BoltError::MessageTooLarge {
                    size,
                    max: self.config.max_message_size,
                });
            }

            src.advance(2);
            self.message_buffer.extend_from_slice(&src[..chunk_size]);
            src.advance(chunk_size);
        }
    }
}

impl Encoder<Value> for BoltCodec {
    type Error = BoltError;

    fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), Self::Error> {
        // A refused value must not leave a partial message in dst.
        let mut writer = PackStreamWriter::new(BytesMut::new(), Arc::clone(&self.registry));
        writer.write(&item)?;
        let encoded = writer.into_inner();

        if encoded.len() > self.config.max_message_size {
            return Err(BoltError::MessageTooLarge {
                size: encoded.len(),
                max: self.config.max_message_size,
            });
        }

        self.encode_chunked(&encoded, dst);
        Ok(())
    }
}
