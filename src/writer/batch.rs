use crate::core::types::Book;
use crate::core::error::Result;
use crate::writer::importer::BookSink;

/// Accumulates books and hands them to a sink in batches
pub struct BatchWriter<'a, S: BookSink + ?Sized> {
    pub sink: &'a mut S,
    pub buffer: Vec<Book>,
    pub batch_size: usize,
    pub partial: bool,
}

impl<'a, S: BookSink + ?Sized> BatchWriter<'a, S> {
    pub fn new(sink: &'a mut S, batch_size: usize, partial: bool) -> Self {
        BatchWriter {
            sink,
            buffer: Vec::with_capacity(batch_size + 1),
            batch_size,
            partial,
        }
    }

    /// Buffers `book`; flushes once the buffer grows past the batch size.
    /// Returns how many books were flushed.
    pub fn push(&mut self, book: Book) -> Result<usize> {
        self.buffer.push(book);

        if self.buffer.len() > self.batch_size {
            return self.flush();
        }

        Ok(0)
    }

    pub fn flush(&mut self) -> Result<usize> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        self.sink.add_books(&self.buffer, self.partial)?;
        let flushed = self.buffer.len();
        tracing::debug!("flushed batch of {} books", flushed);
        self.buffer.clear();
        Ok(flushed)
    }
}
