use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use zip::ZipArchive;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Book;
use crate::inpx::collection::RECORD_SUFFIX;
use crate::inpx::decoder::{decode, FIELD_SEPARATOR};
use crate::inpx::field::FieldStructure;

/// Books decoded by a background reader, in archive order.
///
/// The reader blocks once `capacity` books are waiting, so a slow consumer
/// throttles decoding instead of growing a buffer.
pub struct BookStream {
    receiver: Option<Receiver<Book>>,
    worker: Option<JoinHandle<()>>,
    error: Arc<Mutex<Option<Error>>>,
}

impl BookStream {
    pub fn spawn(
        archive: ZipArchive<File>,
        structure: FieldStructure,
        capacity: usize,
        error: Arc<Mutex<Option<Error>>>,
    ) -> Self {
        let (sender, receiver) = bounded(capacity);
        let slot = error.clone();

        let worker = thread::spawn(move || {
            if let Err(e) = read_records(archive, &structure, &sender) {
                tracing::warn!("collection stream aborted: {}", e);
                *slot.lock() = Some(e);
            }
            // Dropping the sender closes the queue once it is drained.
        });

        BookStream {
            receiver: Some(receiver),
            worker: Some(worker),
            error,
        }
    }

    /// Waits for the reader to stop and returns the error that ended it.
    /// Books not yet consumed are discarded.
    pub fn finish(mut self) -> Result<()> {
        self.shutdown();
        match self.error.lock().clone() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn last_error(&self) -> Option<Error> {
        self.error.lock().clone()
    }

    fn shutdown(&mut self) {
        self.receiver.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                *self.error.lock() = Some(Error::new(
                    ErrorKind::InvalidState,
                    "collection reader thread panicked".to_string(),
                ));
            }
        }
    }
}

impl Iterator for BookStream {
    type Item = Book;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.as_ref()?.recv().ok()
    }
}

impl Drop for BookStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Walks every record file of the archive and sends decoded books.
/// Stops quietly when the consumer goes away.
fn read_records(
    mut archive: ZipArchive<File>,
    structure: &FieldStructure,
    sender: &Sender<Book>,
) -> Result<()> {
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| {
            Error::new(ErrorKind::DecodeFailure, format!("error opening entry #{}: {}", i, e))
        })?;

        let entry_name = entry.name().to_string();
        let Some(sub_archive) = entry_name.strip_suffix(RECORD_SUFFIX) else {
            continue;
        };
        let sub_archive = sub_archive.to_string();
        tracing::debug!("reading records of {}", entry_name);

        let mut reader = BufReader::new(entry);
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader.read_until(b'\n', &mut line).map_err(|e| {
                Error::new(ErrorKind::DecodeFailure, format!("error reading {}: {}", entry_name, e))
            })?;
            if read == 0 {
                break;
            }

            // A blank line is a record with no fields and fails the count check.
            let record = line.trim_ascii();

            // The separator terminates every field, so the last split is empty.
            let mut values: Vec<&[u8]> = record.split(|b| *b == FIELD_SEPARATOR).collect();
            values.pop();

            let mut book = decode(structure, &values).map_err(|e| {
                Error::new(e.kind, format!("{} in {}", e.context, entry_name))
            })?;
            book.file.archive = sub_archive.clone();

            if sender.send(book).is_err() {
                return Ok(());
            }
        }
    }

    Ok(())
}
