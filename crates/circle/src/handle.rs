use circle_queue::{Queue, QueueError};

/// Capability object passed to the creator and processor callbacks.
///
/// Borrows the Local Queue for exactly the duration of one callback
/// invocation. There is no owned, escape-hatch form of this type — the
/// historical `CIRCLE_get_handle` returned a handle valid outside a callback,
/// which made it possible to call back into the library from contexts where
/// the queue was not actually available; tying `Handle` to a lifetime makes
/// that a compile error instead of a runtime hazard.
pub struct Handle<'a> {
    queue: &'a mut Queue,
}

impl<'a> Handle<'a> {
    pub(crate) fn new(queue: &'a mut Queue) -> Self {
        Self { queue }
    }

    /// Enqueues `item`, delegating to the Local Queue's validation and error
    /// semantics (empty, oversized, or forbidden-byte items are rejected).
    pub fn enqueue(&mut self, item: &[u8]) -> Result<(), QueueError> {
        self.queue.push(item)
    }

    /// Dequeues the most recently pushed item, if any.
    pub fn dequeue(&mut self) -> Result<Vec<u8>, QueueError> {
        self.queue.pop()
    }

    /// Number of items currently queued.
    pub fn size(&self) -> usize {
        self.queue.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_dequeue_delegate_to_queue() {
        let mut queue = Queue::new(4096, 256);
        {
            let mut handle = Handle::new(&mut queue);
            handle.enqueue(b"a").unwrap();
            handle.enqueue(b"b").unwrap();
            assert_eq!(handle.size(), 2);
            assert_eq!(handle.dequeue().unwrap(), b"b");
        }
        assert_eq!(queue.size(), 1);
    }
}
