//! Byte sources and sinks the reader and writer run against.
//!
//! The codec never blocks on its own. In-memory sources report exhaustion as
//! [`DecodeError::UnexpectedEof`]; `std::io` adapters pass every other I/O
//! error through unchanged.

use std::io::{self, Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use super::error::{DecodeError, PackStreamError, PackStreamResult};

/// Upper bound on buffer growth ahead of data actually arriving.
const READ_CHUNK: usize = 8 * 1024;

/// Pull-based byte input.
pub trait ByteSource {
    /// Read one byte.
    fn read_byte(&mut self) -> PackStreamResult<u8>;

    /// Fill `buf` completely.
    fn read_into(&mut self, buf: &mut [u8]) -> PackStreamResult<()>;

    /// Read exactly `len` bytes.
    ///
    /// Declared lengths come off the wire, so the buffer grows with the data
    /// instead of being allocated up front.
    fn read_bytes(&mut self, len: usize) -> PackStreamResult<Vec<u8>> {
        let mut out = Vec::with_capacity(len.min(READ_CHUNK));
        let mut chunk = [0u8; READ_CHUNK];
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(READ_CHUNK);
            self.read_into(&mut chunk[..n])?;
            out.extend_from_slice(&chunk[..n]);
            remaining -= n;
        }
        Ok(out)
    }

    /// Read a big-endian `u16`.
    fn read_u16(&mut self) -> PackStreamResult<u16> {
        let mut buf = [0u8; 2];
        self.read_into(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Read a big-endian `u32`.
    fn read_u32(&mut self) -> PackStreamResult<u32> {
        let mut buf = [0u8; 4];
        self.read_into(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Read a big-endian `i16`.
    fn read_i16(&mut self) -> PackStreamResult<i16> {
        let mut buf = [0u8; 2];
        self.read_into(&mut buf)?;
        Ok(i16::from_be_bytes(buf))
    }

    /// Read a big-endian `i32`.
    fn read_i32(&mut self) -> PackStreamResult<i32> {
        let mut buf = [0u8; 4];
        self.read_into(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }

    /// Read a big-endian `i64`.
    fn read_i64(&mut self) -> PackStreamResult<i64> {
        let mut buf = [0u8; 8];
        self.read_into(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }

    /// Read a big-endian IEEE 754 double.
    fn read_f64(&mut self) -> PackStreamResult<f64> {
        let mut buf = [0u8; 8];
        self.read_into(&mut buf)?;
        Ok(f64::from_be_bytes(buf))
    }
}

/// Push-based byte output.
pub trait ByteSink {
    /// Append one byte.
    fn write_byte(&mut self, byte: u8) -> PackStreamResult<()>;

    /// Append a slice.
    fn write_bytes(&mut self, bytes: &[u8]) -> PackStreamResult<()>;

    /// Push buffered bytes to the underlying transport.
    fn flush(&mut self) -> PackStreamResult<()> {
        Ok(())
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read_byte(&mut self) -> PackStreamResult<u8> {
        (**self).read_byte()
    }

    fn read_into(&mut self, buf: &mut [u8]) -> PackStreamResult<()> {
        (**self).read_into(buf)
    }

    fn read_bytes(&mut self, len: usize) -> PackStreamResult<Vec<u8>> {
        (**self).read_bytes(len)
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    fn write_byte(&mut self, byte: u8) -> PackStreamResult<()> {
        (**self).write_byte(byte)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> PackStreamResult<()> {
        (**self).write_bytes(bytes)
    }

    fn flush(&mut self) -> PackStreamResult<()> {
        (**self).flush()
    }
}

// ============================================================================
// In-memory source
// ============================================================================

/// Source over a byte slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    total: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            total: data.len(),
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.total - self.data.len()
    }

    /// Bytes left.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Whether everything has been consumed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn ensure(&self, len: usize) -> PackStreamResult<()> {
        if self.data.remaining() < len {
            return Err(DecodeError::UnexpectedEof.into());
        }
        Ok(())
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_byte(&mut self) -> PackStreamResult<u8> {
        self.ensure(1)?;
        Ok(self.data.get_u8())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> PackStreamResult<()> {
        self.ensure(buf.len())?;
        self.data.copy_to_slice(buf);
        Ok(())
    }

    fn read_bytes(&mut self, len: usize) -> PackStreamResult<Vec<u8>> {
        self.ensure(len)?;
        let bytes = self.data[..len].to_vec();
        self.data.advance(len);
        Ok(bytes)
    }
}

// ============================================================================
// In-memory sinks
// ============================================================================

impl ByteSink for BytesMut {
    fn write_byte(&mut self, byte: u8) -> PackStreamResult<()> {
        self.put_u8(byte);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> PackStreamResult<()> {
        self.put_slice(bytes);
        Ok(())
    }
}

impl ByteSink for Vec<u8> {
    fn write_byte(&mut self, byte: u8) -> PackStreamResult<()> {
        self.push(byte);
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> PackStreamResult<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

// ============================================================================
// std::io adapters
// ============================================================================

fn map_read_error(err: io::Error) -> PackStreamError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DecodeError::UnexpectedEof.into()
    } else {
        PackStreamError::Io(err)
    }
}

/// Source over any [`Read`].
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R: Read> IoSource<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read_byte(&mut self) -> PackStreamResult<u8> {
        let mut buf = [0u8; 1];
        self.read_into(&mut buf)?;
        Ok(buf[0])
    }

    fn read_into(&mut self, buf: &mut [u8]) -> PackStreamResult<()> {
        self.inner.read_exact(buf).map_err(map_read_error)
    }
}

/// Sink over any [`Write`].
#[derive(Debug)]
pub struct IoSink<W> {
    inner: W,
}

impl<W: Write> IoSink<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Borrow the writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn write_byte(&mut self, byte: u8) -> PackStreamResult<()> {
        self.inner.write_all(&[byte])?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> PackStreamResult<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> PackStreamResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingIo(io::ErrorKind);

    impl Read for FailingIo {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(self.0, "boom"))
        }
    }

    impl Write for FailingIo {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(self.0, "boom"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(self.0, "boom"))
        }
    }

    #[test]
    fn test_slice_source_reads() {
        let data = [0x01, 0x00, 0x02, 0xFF, 0xFF, 0xFF, 0xFE];
        let mut src = SliceSource::new(&data);
        assert_eq!(src.read_byte().unwrap(), 1);
        assert_eq!(src.read_u16().unwrap(), 2);
        assert_eq!(src.read_i32().unwrap(), -2);
        assert!(src.is_empty());
        assert_eq!(src.position(), 7);
    }

    #[test]
    fn test_slice_source_eof() {
        let mut src = SliceSource::new(&[0x01]);
        let err = src.read_u16().unwrap_err();
        assert_eq!(err.as_decode(), Some(&DecodeError::UnexpectedEof));
        // nothing consumed on a short read
        assert_eq!(src.remaining(), 1);
    }

    #[test]
    fn test_slice_source_huge_declared_length() {
        let mut src = SliceSource::new(&[1, 2, 3]);
        let err = src.read_bytes(u32::MAX as usize).unwrap_err();
        assert_eq!(err.as_decode(), Some(&DecodeError::UnexpectedEof));
    }

    #[test]
    fn test_io_source_chunked_read() {
        let data: Vec<u8> = (0..20_000u32).map(|i| i as u8).collect();
        let mut src = IoSource::new(io::Cursor::new(data.clone()));
        assert_eq!(src.read_bytes(data.len()).unwrap(), data);
    }

    #[test]
    fn test_io_source_eof_is_decode_error() {
        let mut src = IoSource::new(io::Cursor::new(vec![0u8; 3]));
        let err = src.read_i64().unwrap_err();
        assert_eq!(err.as_decode(), Some(&DecodeError::UnexpectedEof));
    }

    #[test]
    fn test_io_source_error_passes_through() {
        let mut src = IoSource::new(FailingIo(io::ErrorKind::ConnectionReset));
        match src.read_byte().unwrap_err() {
            PackStreamError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("Expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_sinks() {
        let mut buf = BytesMut::new();
        buf.write_byte(0xC0).unwrap();
        buf.write_bytes(&[1, 2]).unwrap();
        assert_eq!(&buf[..], &[0xC0, 1, 2]);

        let mut vec = Vec::new();
        ByteSink::write_bytes(&mut vec, &[9, 8]).unwrap();
        assert_eq!(vec, vec![9, 8]);

        let mut sink = IoSink::new(Vec::new());
        sink.write_byte(7).unwrap();
        ByteSink::flush(&mut sink).unwrap();
        assert_eq!(sink.into_inner(), vec![7]);
    }

    #[test]
    fn test_io_sink_error_passes_through() {
        let mut sink = IoSink::new(FailingIo(io::ErrorKind::BrokenPipe));
        match sink.write_byte(1).unwrap_err() {
            PackStreamError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("Expected Io, got {:?}", other),
        }
    }
}
