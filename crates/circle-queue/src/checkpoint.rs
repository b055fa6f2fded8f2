use crate::arena::Queue;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Outcome of [`write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The queue was non-empty; the file was written with this many items.
    Written { items: usize },
    /// The queue was empty; no file was created.
    Empty,
}

/// Outcome of [`read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A checkpoint file existed and this many items were restored onto the
    /// queue.
    Loaded { items: usize },
    /// No checkpoint file existed for this rank; the queue is unchanged.
    NoFile,
}

/// The on-disk path for a rank's checkpoint file within `dir`.
pub fn checkpoint_path(dir: &Path, rank: usize) -> PathBuf {
    dir.join(format!("circle{rank}.txt"))
}

/// Serialises `queue`'s items, one per line (LF-terminated) in push order,
/// to `<dir>/circle<rank>.txt`.
///
/// If the queue is empty, no file is created and [`WriteOutcome::Empty`] is
/// returned — an empty queue is not distinguished from "no checkpoint taken".
pub fn write(queue: &Queue, rank: usize, dir: &Path) -> io::Result<WriteOutcome> {
    if queue.is_empty() {
        return Ok(WriteOutcome::Empty);
    }

    let path = checkpoint_path(dir, rank);
    let file = std::fs::File::create(&path)?;
    let mut writer = io::BufWriter::new(file);
    let mut items = 0usize;
    for item in queue.iter() {
        writer.write_all(item)?;
        writer.write_all(b"\n")?;
        items += 1;
    }
    writer.flush()?;
    tracing::debug!(rank, items, path = %path.display(), "wrote checkpoint");
    Ok(WriteOutcome::Written { items })
}

/// Restores items from `<dir>/circle<rank>.txt` onto `queue`, one per line
/// with the trailing LF stripped; blank lines are skipped.
///
/// A missing file is not an error: it means "empty starting queue" and
/// yields [`ReadOutcome::NoFile`]. Restoring into a non-empty queue is
/// allowed (logged as a warning); pre-existing items stay below the restored
/// ones in LIFO order, i.e. the restored items are processed first.
pub fn read(queue: &mut Queue, rank: usize, dir: &Path) -> io::Result<ReadOutcome> {
    let path = checkpoint_path(dir, rank);
    let file = match std::fs::File::open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ReadOutcome::NoFile),
        Err(e) => return Err(e),
    };

    if !queue.is_empty() {
        tracing::warn!(
            rank,
            existing = queue.size(),
            "restoring checkpoint into a non-empty queue"
        );
    }

    let mut items = 0usize;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        queue
            .push(line.as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        items += 1;
    }
    tracing::info!(rank, items, path = %path.display(), "restored checkpoint");
    Ok(ReadOutcome::Loaded { items })
}
