use std::fmt;

/// Append-only byte accumulator used to assemble outgoing responses.
///
/// The storage always holds a zero terminator byte beyond the logical length,
/// so capacity is strictly greater than `len()` at all times. Growth is
/// exact-fit: on overflow the storage is resized to exactly the new content
/// plus the terminator, not doubled. Callers that append in a loop are
/// expected to size the builder up front.
#[derive(Debug)]
pub struct ByteBuilder {
    /// Content bytes followed by a single terminator byte.
    data: Vec<u8>,
}

impl ByteBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut data = Vec::with_capacity(capacity.max(1));
        data.push(0);
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.data.pop();
        self.data
    }

    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let len = self.len();
        self.reserve_exact_for(len + bytes.len());
        self.data.truncate(len);
        self.data.extend_from_slice(bytes);
        self.data.push(0);
    }

    /// Appends formatted text, measuring the exact rendered size first so the
    /// storage grows at most once.
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) {
        let mut counter = ByteCounter(0);
        let _ = fmt::write(&mut counter, args);
        if counter.0 == 0 {
            return;
        }
        let len = self.len();
        self.reserve_exact_for(len + counter.0);
        self.data.truncate(len);
        let _ = fmt::write(&mut RawWriter(&mut self.data), args);
        self.data.push(0);
    }

    fn reserve_exact_for(&mut self, new_len: usize) {
        if new_len + 1 <= self.data.capacity() {
            return;
        }
        let mut grown = Vec::with_capacity(new_len + 1);
        grown.extend_from_slice(&self.data[..self.len()]);
        self.data = grown;
    }
}

struct ByteCounter(usize);

impl fmt::Write for ByteCounter {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        self.0 += text.len();
        Ok(())
    }
}

struct RawWriter<'a>(&'a mut Vec<u8>);

impl fmt::Write for RawWriter<'_> {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        self.0.extend_from_slice(text.as_bytes());
        Ok(())
    }
}
