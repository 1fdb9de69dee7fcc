//! Correlation id generation.

/// Source of correlation ids owned by a connection.
///
/// Ids must be unique among in flight requests of one connection. Any
/// `FnMut() -> i64` closure is a generator.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> i64;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> i64 + Send,
{
    fn next_id(&mut self) -> i64 {
        self()
    }
}

/// Monotonic counter starting at `1`.
#[derive(Debug, Clone)]
pub struct Sequential {
    next: i64,
}

impl Sequential {
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    pub const fn starting_at(next: i64) -> Self {
        Self { next }
    }
}

impl Default for Sequential {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for Sequential {
    fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sequential() {
        let mut ids = Sequential::new();
        assert_eq!((ids.next_id(), ids.next_id()), (1, 2));
    }

    #[test]
    fn closure() {
        let mut n = 100i64;
        let mut ids = move || {
            n += 10;
            n
        };
        assert_eq!(IdGenerator::next_id(&mut ids), 110);
        assert_eq!(IdGenerator::next_id(&mut ids), 120);
    }
}
