//! Bounded two-phase MPSC channel: `reserve -> (send | abort)`.
//!
//! Built on a two-phase reserve/resolve idiom (reserve a permit, resolve it
//! exactly once) generalized here to queue+reservation accounting:
//! `queue_len + reserved <= capacity` is the channel's hard invariant,
//! checked on every `try_reserve` and never violated by `send` or `abort`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::types::ChannelId;

/// Error returned by a channel operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The channel is at capacity (`queue_len + reserved == capacity`).
    #[error("channel full")]
    Full,
    /// The operation would block and the caller did not request waiting.
    #[error("would block")]
    WouldBlock,
    /// The receiver side is closed; no more values can ever be observed.
    #[error("disconnected")]
    Disconnected,
    /// The sender side is closed; the channel is not in a state that
    /// permits new reservations (outstanding permits may still resolve).
    #[error("invalid state")]
    InvalidState,
    /// Permit identity did not match the channel it was asked to resolve
    /// against (defensive; should never occur through the public API).
    #[error("invalid permit")]
    InvalidPermit,
}

/// A reservation made by `try_reserve`, which must be resolved exactly
/// once via [`Channel::send`] or [`Channel::abort`].
///
/// Dropping a permit without resolving it is treated as `abort`: the
/// permit holds a shared handle onto the channel's reservation counter and
/// decrements it itself, so a panicking sender never leaks channel
/// capacity even though the channel it reserved against is not reachable
/// from the drop glue.
#[derive(Debug)]
#[must_use = "a permit must be resolved via send() or abort(), or it aborts on drop"]
pub struct Permit {
    channel: ChannelId,
    reserved: Arc<AtomicUsize>,
    resolved: bool,
}

impl Permit {
    fn new(channel: ChannelId, reserved: Arc<AtomicUsize>) -> Self {
        Self {
            channel,
            reserved,
            resolved: false,
        }
    }

    /// The channel this permit reserved capacity on.
    #[must_use]
    pub const fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Marks this permit resolved and releases its reservation, returning
    /// the channel's reservation counter after the release.
    fn release(&mut self) {
        self.resolved = true;
        self.reserved.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        if !self.resolved {
            self.reserved.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// A bounded, two-phase MPSC channel over values of type `T`.
pub struct Channel<T> {
    id: ChannelId,
    capacity: usize,
    queue: VecDeque<T>,
    reserved: Arc<AtomicUsize>,
    sender_closed: bool,
    receiver_closed: bool,
}

impl<T> Channel<T> {
    /// Creates a new open channel with the given id and fixed capacity.
    #[must_use]
    pub fn new(id: ChannelId, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            queue: VecDeque::with_capacity(capacity),
            reserved: Arc::new(AtomicUsize::new(0)),
            sender_closed: false,
            receiver_closed: false,
        }
    }

    /// This channel's identifier.
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        self.id
    }

    /// Number of committed, unreceived messages.
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Number of outstanding (unresolved) reservations.
    #[must_use]
    pub fn reserved(&self) -> usize {
        self.reserved.load(Ordering::Acquire)
    }

    /// Fixed capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// True iff both sides are closed and no queued/reserved capacity
    /// remains.
    #[must_use]
    pub fn is_fully_closed(&self) -> bool {
        self.sender_closed && self.receiver_closed && self.reserved() == 0 && self.queue.is_empty()
    }

    /// Attempts to reserve one slot of capacity.
    ///
    /// # Errors
    /// Returns [`ChannelError::InvalidState`] if the sender side is closed,
    /// [`ChannelError::Disconnected`] if the receiver side is closed, or
    /// [`ChannelError::Full`] if `queue_len + reserved == capacity`.
    pub fn try_reserve(&mut self) -> Result<Permit, ChannelError> {
        if self.sender_closed {
            return Err(ChannelError::InvalidState);
        }
        if self.receiver_closed {
            return Err(ChannelError::Disconnected);
        }
        if self.queue.len() + self.reserved() >= self.capacity {
            return Err(ChannelError::Full);
        }
        self.reserved.fetch_add(1, Ordering::AcqRel);
        Ok(Permit::new(self.id, Arc::clone(&self.reserved)))
    }

    /// Resolves a permit by enqueuing `value` at the tail and releasing the
    /// reservation.
    ///
    /// # Errors
    /// Returns [`ChannelError::Disconnected`] if the receiver closed after
    /// the reservation was made; the permit's reservation is still
    /// released in that case.
    pub fn send(&mut self, mut permit: Permit, value: T) -> Result<(), ChannelError> {
        assert_eq!(permit.channel, self.id, "permit belongs to a different channel");
        permit.release();
        if self.receiver_closed {
            return Err(ChannelError::Disconnected);
        }
        self.queue.push_back(value);
        Ok(())
    }

    /// Resolves a permit by abandoning the reservation without enqueuing.
    pub fn abort(&mut self, mut permit: Permit) {
        assert_eq!(permit.channel, self.id, "permit belongs to a different channel");
        permit.release();
    }

    /// Pops the head of the queue, if any.
    ///
    /// # Errors
    /// Returns [`ChannelError::WouldBlock`] if the queue is empty and the
    /// channel is not fully drained-and-closed; returns
    /// [`ChannelError::Disconnected`] if the queue is empty, the sender is
    /// closed, and no reservations remain (no more values can ever arrive).
    pub fn try_recv(&mut self) -> Result<T, ChannelError> {
        if let Some(value) = self.queue.pop_front() {
            return Ok(value);
        }
        if self.sender_closed && self.reserved() == 0 {
            return Err(ChannelError::Disconnected);
        }
        Err(ChannelError::WouldBlock)
    }

    /// Closes the sender side: rejects new `try_reserve` calls with
    /// [`ChannelError::InvalidState`], but outstanding permits may still
    /// `send`.
    pub fn close_sender(&mut self) {
        self.sender_closed = true;
    }

    /// Closes the receiver side: queued values are still poppable by
    /// `try_recv` until drained, but new `send`s on existing permits fail
    /// `Disconnected`.
    pub fn close_receiver(&mut self) {
        self.receiver_closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chan(capacity: usize) -> Channel<u32> {
        Channel::new(ChannelId::new_for_test(0, 0), capacity)
    }

    #[test]
    fn capacity_four_send_four_recv_one_send_one() {
        let mut c = chan(4);
        for i in 0..4 {
            let p = c.try_reserve().unwrap();
            c.send(p, i).unwrap();
        }
        assert_eq!(c.try_reserve().unwrap_err(), ChannelError::Full);
        assert_eq!(c.try_recv().unwrap(), 0);
        let p = c.try_reserve().unwrap();
        c.send(p, 4).unwrap();
        assert!(c.queue_len() + c.reserved() <= c.capacity());
    }

    #[test]
    fn abort_releases_reservation_without_enqueue() {
        let mut c = chan(1);
        let p = c.try_reserve().unwrap();
        c.abort(p);
        assert_eq!(c.reserved(), 0);
        assert_eq!(c.queue_len(), 0);
        // Capacity is available again.
        c.try_reserve().unwrap();
    }

    #[test]
    fn dropping_an_unresolved_permit_releases_its_reservation() {
        let mut c = chan(1);
        let p = c.try_reserve().unwrap();
        assert_eq!(c.reserved(), 1);
        drop(p);
        assert_eq!(c.reserved(), 0);
        // A fresh reservation would have failed with Full had the drop
        // leaked the slot.
        c.try_reserve().unwrap();
    }

    #[test]
    fn sender_close_rejects_new_reserves_with_invalid_state_but_not_outstanding_sends() {
        let mut c = chan(2);
        let p = c.try_reserve().unwrap();
        c.close_sender();
        assert_eq!(c.try_reserve().unwrap_err(), ChannelError::InvalidState);
        c.send(p, 1).unwrap();
        assert_eq!(c.try_recv().unwrap(), 1);
    }

    #[test]
    fn receiver_close_rejects_new_reserves_with_disconnected() {
        let mut c = chan(2);
        c.close_receiver();
        assert_eq!(c.try_reserve().unwrap_err(), ChannelError::Disconnected);
    }

    #[test]
    fn receiver_close_disconnects_outstanding_sends() {
        let mut c = chan(1);
        let p = c.try_reserve().unwrap();
        c.close_receiver();
        assert_eq!(c.send(p, 1), Err(ChannelError::Disconnected));
    }

    #[test]
    fn fully_closed_iff_both_sides_closed_and_drained() {
        let mut c = chan(1);
        assert!(!c.is_fully_closed());
        c.close_sender();
        c.close_receiver();
        assert!(c.is_fully_closed());
    }

    #[test]
    fn empty_recv_would_block_unless_disconnected() {
        let mut c = chan(1);
        assert_eq!(c.try_recv().unwrap_err(), ChannelError::WouldBlock);
        c.close_sender();
        assert_eq!(c.try_recv().unwrap_err(), ChannelError::Disconnected);
    }
}
