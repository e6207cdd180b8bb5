use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use memmap2::Mmap;

use crate::error::Result;

/// Random-access byte source the tile reader pulls pixel rows from.
///
/// Every `Read + Seek` type qualifies, so files, in-memory cursors and
/// memory maps (through `Cursor<Mmap>`) all work.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns fewer bytes than requested only at end of data.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;
}

impl<T: Read + Seek> ByteSource for T {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.seek(SeekFrom::Start(offset))?;
        read_full(self, buf)
    }
}

/// Fill `buf` as far as the reader allows. Stops early only at EOF.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// An opened FITS file, read either with seek+read or through a memory map.
///
/// Dropping it closes the handle (or unmaps the file).
pub enum FitsSource {
    File(File),
    Mapped(Cursor<Mmap>),
}

impl FitsSource {
    pub fn open(path: &Path, memory_map: bool) -> Result<Self> {
        let file = File::open(path)?;
        if memory_map {
            let mmap = unsafe { Mmap::map(&file)? };
            Ok(FitsSource::Mapped(Cursor::new(mmap)))
        } else {
            Ok(FitsSource::File(file))
        }
    }
}

impl Read for FitsSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            FitsSource::File(f) => f.read(buf),
            FitsSource::Mapped(c) => c.read(buf),
        }
    }
}

impl Seek for FitsSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            FitsSource::File(f) => f.seek(pos),
            FitsSource::Mapped(c) => c.seek(pos),
        }
    }
}
