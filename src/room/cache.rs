use std::{collections::VecDeque, num::NonZeroUsize};

use super::Message;

/// Most recent messages of the room, oldest first.
///
/// Eviction is purely by arrival order: once `capacity` entries are held,
/// every `push` drops the oldest one.
#[derive(Debug, Clone)]
pub struct MessageCache {
    capacity: NonZeroUsize,
    entries:  VecDeque<Message>,
}

impl MessageCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { capacity, entries: VecDeque::with_capacity(capacity.get()) }
    }

    /// Appends `msg`, dropping the oldest entry if the cache is full.
    pub fn push(&mut self, msg: Message) {
        if self.entries.len() >= self.capacity.get() {
            self.entries.pop_front();
        }
        self.entries.push_back(msg);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn capacity(&self) -> NonZeroUsize { self.capacity }

    pub fn to_vec(&self) -> Vec<Message> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(n: usize) -> NonZeroUsize { NonZeroUsize::new(n).unwrap() }

    #[test]
    fn keeps_everything_below_capacity() {
        let mut cache = MessageCache::new(cap(3));
        assert!(cache.is_empty());

        cache.push(Message::text("a"));
        cache.push(Message::text("b"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.to_vec(), vec![Message::text("a"), Message::text("b")]);
    }

    #[test]
    fn evicts_oldest_once_full() {
        let mut cache = MessageCache::new(cap(2));
        cache.push(Message::text("a"));
        cache.push(Message::text("b"));

        cache.push(Message::text("c"));

        assert_eq!(cache.to_vec(), vec![Message::text("b"), Message::text("c")]);
    }

    #[test]
    fn holds_last_capacity_messages_after_many_pushes() {
        let mut cache = MessageCache::new(cap(10));
        for i in 0..25 {
            cache.push(Message::text(format!("m{i}")));
            assert!(cache.len() <= cache.capacity().get());
        }

        let expected: Vec<Message> = (15..25).map(|i| Message::text(format!("m{i}"))).collect();
        assert_eq!(cache.to_vec(), expected);
    }

    #[test]
    fn reading_does_not_change_eviction_order() {
        let mut cache = MessageCache::new(cap(2));
        cache.push(Message::text("a"));
        cache.push(Message::text("b"));

        // touching "a" must not protect it
        assert_eq!(cache.iter().next(), Some(&Message::text("a")));
        cache.push(Message::text("c"));

        assert_eq!(cache.to_vec(), vec![Message::text("b"), Message::text("c")]);
    }
}
