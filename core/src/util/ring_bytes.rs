use std::collections::VecDeque;

/// Bounded byte buffer that keeps only the most recent `cap` bytes.
#[derive(Debug, Clone)]
pub struct RingBytes {
    inner: VecDeque<u8>,
    cap: usize,
}

impl RingBytes {
    pub fn new(cap: usize) -> Self {
        Self {
            inner: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, data: &[u8]) {
        let data = if data.len() > self.cap {
            &data[data.len() - self.cap..]
        } else {
            data
        };
        let overflow = self
            .inner
            .len()
            .saturating_add(data.len())
            .saturating_sub(self.cap);
        if overflow > 0 {
            self.inner.drain(..overflow);
        }
        self.inner.extend(data);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.iter().copied().collect()
    }

    /// Lossy UTF-8 view of the retained tail, trimmed of surrounding whitespace.
    pub fn tail_string(&self) -> String {
        String::from_utf8_lossy(&self.to_bytes()).trim().to_string()
    }
}
