//! Seekable byte streams over files and memory buffers.
//!
//! A [`Stream`] is what codecs read from and write to. The same decode or
//! encode logic runs unchanged against a file handle, a growable `Vec<u8>`,
//! a caller-owned fixed-size buffer, or a read-only slice.
//!
//! `Stream` implements [`std::io::Read`], [`std::io::Write`] and
//! [`std::io::Seek`] so codec crates can consume it directly. The inherent
//! methods return [`Result`](crate::Result) with errors classified into
//! [`ImageError`](crate::ImageError).

use alloc::vec::Vec;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use crate::error::{Result, ResultExt};

enum Backing<'a> {
    File(File),
    Growable(Cursor<Vec<u8>>),
    Fixed(Cursor<&'a mut [u8]>),
    ReadOnly(Cursor<&'a [u8]>),
}

/// Random-access byte source/sink.
///
/// Positions are absolute byte offsets from the start of the backing store.
/// Seeking past the end is allowed; the next read then reports end-of-data.
pub struct Stream<'a> {
    backing: Backing<'a>,
}

impl<'a> Stream<'a> {
    /// Stream over an open file handle.
    ///
    /// Reads and writes are only as permitted by how the file was opened.
    pub fn from_file(file: File) -> Self {
        Self {
            backing: Backing::File(file),
        }
    }

    /// Read-only stream over an in-memory buffer.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            backing: Backing::ReadOnly(Cursor::new(data)),
        }
    }

    /// Writable stream over a caller-owned buffer of fixed capacity.
    ///
    /// The buffer never grows; a write that does not fit fails with
    /// [`ImageError::NoSpaceLeft`](crate::ImageError::NoSpaceLeft).
    pub fn from_mut_slice(buffer: &'a mut [u8]) -> Self {
        Self {
            backing: Backing::Fixed(Cursor::new(buffer)),
        }
    }

    /// Writable stream over a growable buffer, positioned at the start.
    pub fn from_vec(buffer: Vec<u8>) -> Self {
        Self {
            backing: Backing::Growable(Cursor::new(buffer)),
        }
    }

    /// Empty growable stream.
    pub fn growable() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Move to an absolute offset.
    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.seek(SeekFrom::Start(offset)).or_at()?;
        Ok(())
    }

    /// Current absolute offset.
    pub fn position(&mut self) -> Result<u64> {
        self.stream_position().or_at()
    }

    /// Read up to `buf.len()` bytes, returning how many were read.
    ///
    /// Returns `Ok(0)` at end-of-data.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other.or_at(),
            }
        }
    }

    /// Fill `buf` completely or fail with
    /// [`ImageError::EndOfStream`](crate::ImageError::EndOfStream).
    pub fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.read_exact(buf).or_at()
    }

    /// Read into `buf` as far as the stream allows, without treating a short
    /// stream as an error. Used by codecs to fetch a fixed-size signature.
    pub fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read_bytes(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Write all of `buf`, returning the number of bytes written.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<usize> {
        self.write_all(buf).or_at()?;
        Ok(buf.len())
    }

    /// Size of the backing store in bytes.
    pub fn len(&mut self) -> Result<u64> {
        match &mut self.backing {
            Backing::File(file) => Ok(file.metadata().or_at()?.len()),
            Backing::Growable(cursor) => Ok(cursor.get_ref().len() as u64),
            Backing::Fixed(cursor) => Ok(cursor.get_ref().len() as u64),
            Backing::ReadOnly(cursor) => Ok(cursor.get_ref().len() as u64),
        }
    }

    /// Whether the backing store has no bytes.
    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether writes can succeed on this backing at all.
    pub fn is_writable(&self) -> bool {
        !matches!(self.backing, Backing::ReadOnly(_))
    }

    /// Bytes of a growable stream. `None` for every other backing.
    pub fn into_vec(self) -> Option<Vec<u8>> {
        match self.backing {
            Backing::Growable(cursor) => Some(cursor.into_inner()),
            _ => None,
        }
    }
}

impl core::fmt::Debug for Stream<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let kind = match &self.backing {
            Backing::File(_) => "File",
            Backing::Growable(_) => "Growable",
            Backing::Fixed(_) => "Fixed",
            Backing::ReadOnly(_) => "ReadOnly",
        };
        f.debug_struct("Stream").field("backing", &kind).finish()
    }
}

impl Read for Stream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.backing {
            Backing::File(file) => file.read(buf),
            Backing::Growable(cursor) => cursor.read(buf),
            Backing::Fixed(cursor) => cursor.read(buf),
            Backing::ReadOnly(cursor) => cursor.read(buf),
        }
    }
}

impl Write for Stream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.backing {
            Backing::File(file) => file.write(buf),
            Backing::Growable(cursor) => cursor.write(buf),
            Backing::Fixed(cursor) => {
                // Never truncate: either the whole write fits or nothing is written.
                let capacity = cursor.get_ref().len() as u64;
                let remaining = capacity.saturating_sub(cursor.position());
                if (buf.len() as u64) > remaining {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "no space left in output buffer",
                    ));
                }
                cursor.write(buf)
            }
            Backing::ReadOnly(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stream is read-only",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.backing {
            Backing::File(file) => file.flush(),
            _ => Ok(()),
        }
    }
}

impl Seek for Stream<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.backing {
            Backing::File(file) => file.seek(pos),
            Backing::Growable(cursor) => cursor.seek(pos),
            Backing::Fixed(cursor) => cursor.seek(pos),
            Backing::ReadOnly(cursor) => cursor.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageError;

    #[test]
    fn read_only_seek_and_read() {
        let data = [1u8, 2, 3, 4, 5];
        let mut stream = Stream::from_slice(&data);

        stream.seek_to(2).unwrap();
        assert_eq!(stream.position().unwrap(), 2);

        let mut buf = [0u8; 2];
        assert_eq!(stream.read_bytes(&mut buf).unwrap(), 2);
        assert_eq!(buf, [3, 4]);
        assert_eq!(stream.position().unwrap(), 4);
        assert_eq!(stream.len().unwrap(), 5);
    }

    #[test]
    fn seek_past_end_is_not_an_error() {
        let data = [0u8; 4];
        let mut stream = Stream::from_slice(&data);

        stream.seek_to(100).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(stream.read_bytes(&mut buf).unwrap(), 0);

        let err = stream.read_exact_bytes(&mut buf).unwrap_err().decompose().0;
        assert!(matches!(err, ImageError::EndOfStream));
    }

    #[test]
    fn read_up_to_short_stream() {
        let data = *b"GIF";
        let mut stream = Stream::from_slice(&data);
        let mut buf = [0u8; 6];
        assert_eq!(stream.read_up_to(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"GIF");
    }

    #[test]
    fn read_only_rejects_writes() {
        let data = [0u8; 4];
        let mut stream = Stream::from_slice(&data);
        assert!(!stream.is_writable());

        let err = stream.write_bytes(&[1]).unwrap_err().decompose().0;
        assert!(matches!(err, ImageError::Io(_)));
    }

    #[test]
    fn fixed_buffer_never_truncates() {
        let mut buffer = [0u8; 4];
        let mut stream = Stream::from_mut_slice(&mut buffer);

        assert_eq!(stream.write_bytes(&[1, 2, 3]).unwrap(), 3);
        let err = stream.write_bytes(&[4, 5]).unwrap_err().decompose().0;
        assert!(matches!(err, ImageError::NoSpaceLeft));
        assert_eq!(stream.position().unwrap(), 3);

        assert_eq!(stream.write_bytes(&[4]).unwrap(), 1);
        drop(stream);
        assert_eq!(buffer, [1, 2, 3, 4]);
    }

    #[test]
    fn fixed_buffer_seek_past_end_then_write() {
        let mut buffer = [0u8; 2];
        let mut stream = Stream::from_mut_slice(&mut buffer);
        stream.seek_to(8).unwrap();
        let err = stream.write_bytes(&[1]).unwrap_err().decompose().0;
        assert!(matches!(err, ImageError::NoSpaceLeft));
    }

    #[test]
    fn growable_grows_and_reads_back() {
        let mut stream = Stream::growable();
        stream.write_bytes(b"hello").unwrap();
        stream.write_bytes(b" world").unwrap();
        assert_eq!(stream.len().unwrap(), 11);

        stream.seek_to(6).unwrap();
        let mut buf = [0u8; 5];
        stream.read_exact_bytes(&mut buf).unwrap();
        assert_eq!(&buf, b"world");

        assert_eq!(stream.into_vec().unwrap(), b"hello world");
    }

    #[test]
    fn file_backed_round_trip() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"zenio").unwrap();

        let mut stream = Stream::from_file(file);
        assert_eq!(stream.len().unwrap(), 5);
        stream.seek_to(0).unwrap();
        let mut buf = [0u8; 5];
        stream.read_exact_bytes(&mut buf).unwrap();
        assert_eq!(&buf, b"zenio");
        assert!(stream.into_vec().is_none());
    }
}
