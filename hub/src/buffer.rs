//! The chunked append-only trade/depth buffer (C6), grounded in
//! `utils/chunkedSlide.go`'s `ChunkedStore[T]`. Chunking keeps the hot path
//! (`append` + `most_recent`) O(1) without reallocating a single growing
//! vector on every append.

use std::sync::RwLock;

/// Default chunk size per spec §4.6.
pub const DEFAULT_CHUNK_SIZE: usize = 128;

struct Inner<T> {
    chunks: Vec<Vec<T>>,
    total: usize,
}

/// A same-day, append-only store of `T` (trades or depth snapshots) for one
/// symbol. Supports O(1) append/most-recent and bounded latest-N/range
/// reads for backfill and HTTP snapshot queries.
pub struct ChunkedBuffer<T> {
    chunk_size: usize,
    inner: RwLock<Inner<T>>,
}

impl<T: Clone> ChunkedBuffer<T> {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size: chunk_size.max(1), inner: RwLock::new(Inner { chunks: Vec::new(), total: 0 }) }
    }

    pub fn append(&self, item: T) {
        let mut inner = self.inner.write().unwrap();
        let needs_new_chunk = match inner.chunks.last() {
            Some(chunk) => chunk.len() >= self.chunk_size,
            None => true,
        };
        if needs_new_chunk {
            inner.chunks.push(Vec::with_capacity(self.chunk_size));
        }
        inner.chunks.last_mut().unwrap().push(item);
        inner.total += 1;
    }

    pub fn size(&self) -> usize {
        self.inner.read().unwrap().total
    }

    /// The single most recently appended item, without copying the rest of
    /// the buffer.
    pub fn most_recent(&self) -> Option<T> {
        let inner = self.inner.read().unwrap();
        inner.chunks.last().and_then(|chunk| chunk.last()).cloned()
    }

    /// The last `n` items, most recent first.
    pub fn latest(&self, n: usize) -> Vec<T> {
        let inner = self.inner.read().unwrap();
        if n >= inner.total {
            return inner.chunks.iter().flatten().rev().cloned().collect();
        }
        let mut result = Vec::with_capacity(n);
        let mut remaining = n;
        for chunk in inner.chunks.iter().rev() {
            if remaining == 0 {
                break;
            }
            if remaining >= chunk.len() {
                result.extend(chunk.iter().rev().cloned());
                remaining -= chunk.len();
            } else {
                result.extend(chunk[chunk.len() - remaining..].iter().rev().cloned());
                remaining = 0;
            }
        }
        result
    }

    /// A half-open `[start, end)` slice in insertion order.
    pub fn range(&self, start: usize, end: usize) -> Vec<T> {
        let inner = self.inner.read().unwrap();
        if start >= inner.total || end <= start {
            return Vec::new();
        }
        let end = end.min(inner.total);
        let mut result = Vec::with_capacity(end - start);
        let mut pos = 0usize;
        for chunk in &inner.chunks {
            let chunk_end = pos + chunk.len();
            if pos >= end {
                break;
            }
            if chunk_end > start {
                let local_start = start.saturating_sub(pos);
                let local_end = chunk.len().min(end - pos);
                result.extend(chunk[local_start..local_end].iter().cloned());
            }
            pos = chunk_end;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_most_recent() {
        let buf = ChunkedBuffer::new(4);
        assert_eq!(buf.most_recent(), None);
        buf.append(1);
        buf.append(2);
        buf.append(3);
        assert_eq!(buf.most_recent(), Some(3));
        assert_eq!(buf.size(), 3);
    }

    #[test]
    fn spans_multiple_chunks() {
        let buf = ChunkedBuffer::new(2);
        for i in 0..7 {
            buf.append(i);
        }
        assert_eq!(buf.size(), 7);
        assert_eq!(buf.most_recent(), Some(6));
        assert_eq!(buf.latest(3), vec![6, 5, 4]);
        assert_eq!(buf.range(0, 7), (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn latest_saturates_at_total_size() {
        let buf = ChunkedBuffer::new(3);
        buf.append("a");
        buf.append("b");
        assert_eq!(buf.latest(10), vec!["b", "a"]);
    }

    #[test]
    fn range_is_half_open_insertion_order() {
        let buf = ChunkedBuffer::new(3);
        for i in 0..10 {
            buf.append(i);
        }
        assert_eq!(buf.range(2, 5), vec![2, 3, 4]);
        assert_eq!(buf.range(9, 9), Vec::<i32>::new());
        assert_eq!(buf.range(8, 100), vec![8, 9]);
    }
}
