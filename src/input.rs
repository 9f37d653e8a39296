//! Opening line-oriented inputs
//!
//! Every pass re-opens its input from the path, so plain files and
//! BGZF-compressed files (`.gz`/`.bgz`) are supported but pipes are not.

use log::debug;
use noodles::bgzf;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

const BGZF_HEADER_SIZE: usize = 18;

/// Check whether a file starts with a valid BGZF header.
/// Returns `Ok(false)` for regular gzip, too-small files, or plain text.
fn is_bgzf<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let mut header = [0u8; BGZF_HEADER_SIZE];
    let result = match reader.read_exact(&mut header) {
        Ok(()) => Ok(header[0..2] == [0x1f, 0x8b]      // gzip magic
            && header[2] == 0x08                        // DEFLATE
            && header[3] == 0x04                        // FEXTRA
            && header[10..12] == [0x06, 0x00]           // XLEN=6
            && header[12..14] == [b'B', b'C']           // BC subfield
            && header[14..16] == [0x02, 0x00]), // SLEN=2
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    };
    reader.seek(SeekFrom::Start(0))?;
    result
}

fn is_compressed(path: &Path) -> bool {
    let name = path.to_string_lossy();
    [".gz", ".bgz"].iter().any(|extension| name.ends_with(extension))
}

/// Open `path` for line-by-line reading, decompressing BGZF when the
/// extension asks for it.
pub fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let mut file = File::open(path).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Failed to open '{}': {}", path.display(), e),
        )
    })?;

    if is_compressed(path) {
        if !is_bgzf(&mut file)? {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "'{}' is regular gzip, not BGZF. Convert with: zcat '{}' | bgzip > output.gz",
                    path.display(),
                    path.display()
                ),
            ));
        }
        debug!("Reading {} through a BGZF reader", path.display());
        Ok(Box::new(BufReader::new(bgzf::io::Reader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_is_bgzf_rejects_plain_text() {
        let mut cursor = Cursor::new(b"@HD\tVN:1.6\nread-L-10\t0\tchr1\t5\n".to_vec());
        assert!(!is_bgzf(&mut cursor).unwrap());
        // Rewound for the caller
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_is_bgzf_short_input() {
        let mut cursor = Cursor::new(vec![0x1f, 0x8b]);
        assert!(!is_bgzf(&mut cursor).unwrap());
    }

    #[test]
    fn test_open_plain_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "line1").unwrap();
        writeln!(file, "line2").unwrap();
        file.flush().unwrap();

        let reader = open_reader(file.path()).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["line1", "line2"]);
    }

    #[test]
    fn test_open_regular_gzip_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.sam.gz");
        // Plain gzip header without the BGZF extra field
        let mut bytes = vec![0x1f, 0x8b, 0x08, 0x00];
        bytes.extend_from_slice(&[0u8; 20]);
        std::fs::write(&path, bytes).unwrap();

        let err = open_reader(&path).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_reader(Path::new("/nonexistent/reads.sam")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
