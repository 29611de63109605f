// logtriage - platform/fs.rs
//
// Filesystem helpers consumed by the engine: lossy text reads,
// offset-based byte reads for tailing, size/existence queries, and
// atomic whole-file replacement.
//
// Encoding policy: boot logs routinely contain stray binary bytes, so
// every text read decodes permissively (replacement characters) rather
// than failing. The junk detector handles the resulting noise.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Read the full content of a file as a string, lossily decoding
/// invalid UTF-8.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read the full content of a file as individual lines (terminators
/// stripped), lossily decoding invalid UTF-8.
pub fn read_lines_lossy(path: &Path) -> io::Result<Vec<String>> {
    let content = read_to_string_lossy(path)?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Current size of a file in bytes.
pub fn file_size(path: &Path) -> io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Whether a path currently exists.
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Read up to `limit` bytes from `path` starting at byte position `offset`.
///
/// Returns fewer bytes than `limit` if the file ends before `limit` is
/// reached.
pub fn read_bytes_at(path: &Path, offset: u64, limit: usize) -> io::Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; limit];
    let n = file.read(&mut buf)?;
    buf.truncate(n);
    Ok(buf)
}

/// Write `content` to `path` atomically: the bytes land in a temporary
/// file in the same directory, which is then renamed over the target.
/// The target is never left partially written, even on failure.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = tmp_path(path, dir);

    let result = (|| {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(content)?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)
    })();

    if result.is_err() {
        // The rename did not happen; drop the orphaned temp file.
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

/// Temp-file name beside the target, unique per process so concurrent
/// runs against different targets cannot collide.
fn tmp_path(target: &Path, dir: &Path) -> PathBuf {
    let stem = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    dir.join(format!(".{stem}.{}.tmp", std::process::id()))
}
