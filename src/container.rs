use crate::error::{Field, Result, TzarError};
use crate::format::{Entry, EntryHeader, FormatFlag, CONTENT_LEN_SIZE, PATH_LEN_SIZE};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Sequential record writer
///
/// Layout: `[flag: 1]` then per entry
/// `[path_len: u32 LE][path][content_len: u64 LE][content]` until end of stream.
#[derive(Debug)]
pub struct ContainerWriter<W: Write> {
    inner: W,
}

impl<W: Write> ContainerWriter<W> {
    /// Start a container, emitting the flag byte
    pub fn new(mut inner: W, flag: FormatFlag) -> Result<Self> {
        inner.write_all(&[flag.to_byte()])?;
        Ok(Self { inner })
    }

    /// Append one record. Records are written strictly in call order.
    pub fn write_entry(&mut self, path: &str, content: &[u8]) -> Result<()> {
        let path_len =
            u32::try_from(path.len()).map_err(|_| TzarError::PathTooLong(path.len()))?;
        self.inner.write_all(&path_len.to_le_bytes())?;
        self.inner.write_all(path.as_bytes())?;
        self.inner.write_all(&(content.len() as u64).to_le_bytes())?;
        self.inner.write_all(content)?;
        Ok(())
    }

    /// Flush and hand back the underlying stream
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Sequential record reader
///
/// Content can be read or skipped; skipping seeks past the bytes without
/// buffering them. Any short read is fatal: there is no way to resynchronize
/// after a corrupt length field.
#[derive(Debug)]
pub struct ContainerReader<R> {
    inner: R,
    flag: FormatFlag,
    offset: u64,
    len: u64,
    /// Content bytes of the current record not yet consumed
    pending: u64,
}

impl<R: Read + Seek> ContainerReader<R> {
    /// Open a stream and consume its flag byte
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;

        let mut reader = Self {
            inner,
            flag: FormatFlag::Plain,
            offset: 0,
            len,
            pending: 0,
        };

        let mut flag = [0u8; 1];
        reader.read_field(&mut flag, Field::Flag)?;
        reader.flag = FormatFlag::from_byte(flag[0])?;
        Ok(reader)
    }

    pub fn flag(&self) -> FormatFlag {
        self.flag
    }

    /// Give back the underlying stream
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.offset)
    }

    fn read_field(&mut self, buf: &mut [u8], field: Field) -> Result<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(TzarError::Truncated {
                field,
                offset: self.offset,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the next path and declared content size.
    ///
    /// Returns `None` at a clean end of stream. Content left unconsumed from
    /// the previous record is skipped first.
    pub fn next_header(&mut self) -> Result<Option<EntryHeader>> {
        if self.pending > 0 {
            self.skip_content()?;
        }
        if self.remaining() == 0 {
            return Ok(None);
        }

        let mut len_buf = [0u8; PATH_LEN_SIZE];
        self.read_field(&mut len_buf, Field::PathLength)?;
        let path_len = u32::from_le_bytes(len_buf) as u64;
        if path_len > self.remaining() {
            return Err(TzarError::Truncated {
                field: Field::PathBytes,
                offset: self.offset,
            });
        }

        let path_offset = self.offset;
        let mut path_buf = vec![0u8; path_len as usize];
        self.read_field(&mut path_buf, Field::PathBytes)?;
        let path = String::from_utf8(path_buf).map_err(|_| TzarError::InvalidPath(path_offset))?;

        let mut size_buf = [0u8; CONTENT_LEN_SIZE];
        self.read_field(&mut size_buf, Field::ContentLength)?;
        let size = u64::from_le_bytes(size_buf);

        self.pending = size;
        Ok(Some(EntryHeader { path, size }))
    }

    fn check_pending(&self) -> Result<u64> {
        if self.pending > self.remaining() {
            return Err(TzarError::Truncated {
                field: Field::ContentBytes,
                offset: self.offset,
            });
        }
        Ok(self.pending)
    }

    /// Buffer the current record's content
    pub fn read_content(&mut self) -> Result<Vec<u8>> {
        let size = self.check_pending()?;
        self.pending = 0;
        let mut content = vec![0u8; size as usize];
        self.read_field(&mut content, Field::ContentBytes)?;
        Ok(content)
    }

    /// Seek past the current record's content without reading it
    pub fn skip_content(&mut self) -> Result<()> {
        let size = self.check_pending()?;
        self.pending = 0;
        if size > 0 {
            // bounded by the stream length, which always fits in i64
            let delta = i64::try_from(size).map_err(|_| TzarError::Truncated {
                field: Field::ContentBytes,
                offset: self.offset,
            })?;
            self.inner.seek(SeekFrom::Current(delta))?;
            self.offset += size;
        }
        Ok(())
    }

    /// Read the next full record
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        match self.next_header()? {
            Some(header) => {
                let content = self.read_content()?;
                Ok(Some(Entry {
                    path: header.path,
                    content,
                }))
            }
            None => Ok(None),
        }
    }
}

/// Create a container file, truncating any existing file
pub fn create_container(path: &Path, flag: FormatFlag) -> Result<ContainerWriter<BufWriter<File>>> {
    let file = File::create(path)?;
    ContainerWriter::new(BufWriter::new(file), flag)
}

/// Open a container file and read its flag
pub fn open_container(path: &Path) -> Result<ContainerReader<BufReader<File>>> {
    let file = File::open(path)?;
    ContainerReader::new(BufReader::new(file))
}

/// Read every record of a container file into memory
pub fn read_container_file(path: &Path) -> Result<(FormatFlag, Vec<Entry>)> {
    let mut reader = open_container(path)?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry()? {
        entries.push(entry);
    }
    Ok((reader.flag(), entries))
}

/// Write a complete container file
pub fn write_container_file(path: &Path, flag: FormatFlag, entries: &[Entry]) -> Result<()> {
    let mut writer = create_container(path, flag)?;
    for entry in entries {
        writer.write_entry(&entry.path, &entry.content)?;
    }
    writer.finish()?;
    Ok(())
}
