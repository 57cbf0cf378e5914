use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

/// Byte cursors into the client log. Each one belongs to a single reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offsets {
    pub search: u64,
    pub draft_start: u64,
    pub pack: u64,
    pub pick: u64,
}

pub enum Flow {
    Continue,
    Stop,
}

pub fn file_size(path: &Path) -> io::Result<u64> {
    fs::metadata(path).map(|meta| meta.len())
}

/// Reads complete lines starting at `offset` and hands each one to `visit` together with the
/// offset just past it. A trailing line without its newline is left for the next call.
/// Returns the offset after the last line consumed. The file is closed before returning.
pub fn scan_lines<F>(path: &Path, offset: u64, mut visit: F) -> io::Result<u64>
where
    F: FnMut(&str, u64) -> Flow,
{
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::Start(offset))?;

    let mut pos = offset;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 || buf.last() != Some(&b'\n') {
            break;
        }
        pos += read as u64;

        let line = String::from_utf8_lossy(&buf);
        if let Flow::Stop = visit(&line, pos) {
            break;
        }
    }

    Ok(pos)
}
