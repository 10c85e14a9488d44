// Copyright (c) 2024 Mike Tsao

use crossbeam::channel::{Receiver, Sender};

/// Both halves of a crossbeam channel, kept together so a service can hand out
/// clones of whichever side a client needs.
#[derive(Debug)]
pub struct CrossbeamChannel<T> {
    #[allow(missing_docs)]
    pub sender: Sender<T>,
    #[allow(missing_docs)]
    pub receiver: Receiver<T>,
}
impl<T> Default for CrossbeamChannel<T> {
    fn default() -> Self {
        let (sender, receiver) = crossbeam::channel::unbounded();
        Self { sender, receiver }
    }
}

/// Same idea, but holding at most a fixed number of messages.
#[derive(Debug)]
pub struct BoundedCrossbeamChannel<T> {
    #[allow(missing_docs)]
    pub sender: Sender<T>,
    #[allow(missing_docs)]
    pub receiver: Receiver<T>,
}
impl<T> Default for BoundedCrossbeamChannel<T> {
    fn default() -> Self {
        Self::new_with(1)
    }
}
impl<T> BoundedCrossbeamChannel<T> {
    #[allow(missing_docs)]
    pub fn new_with(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam::channel::bounded(capacity);
        Self { sender, receiver }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossbeam_channel() {
        let channel = CrossbeamChannel::default();

        let _ = channel.sender.send(42);
        let _ = channel.sender.clone().send(43);

        assert_eq!(channel.receiver.recv().unwrap(), 42);
        assert_eq!(channel.receiver.try_recv().unwrap(), 43);
        assert!(channel.receiver.try_recv().is_err());
    }

    #[test]
    fn bounded_channel_refuses_overflow() {
        let channel = BoundedCrossbeamChannel::new_with(2);
        assert!(channel.sender.try_send(1).is_ok());
        assert!(channel.sender.try_send(2).is_ok());
        assert!(channel.sender.try_send(3).is_err());
        assert_eq!(channel.receiver.recv().unwrap(), 1);
    }
}
