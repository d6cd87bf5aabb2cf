//! Invariant 3: `queue_len + reserved <= capacity` holds at every step, plus
//! the capacity=4 send/recv/send literal scenario.

use asx::channel::mpsc::{Channel, ChannelError};
use asx::types::ChannelId;

fn invariant_holds<T>(c: &Channel<T>) {
    assert!(c.queue_len() + c.reserved() <= c.capacity());
}

#[test]
fn capacity_four_send_four_recv_one_send_one() {
    let mut c: Channel<u32> = Channel::new(ChannelId::new_for_test(0, 0), 4);
    for i in 0..4 {
        let p = c.try_reserve().unwrap();
        invariant_holds(&c);
        c.send(p, i).unwrap();
        invariant_holds(&c);
    }
    assert_eq!(c.try_reserve().unwrap_err(), ChannelError::Full);

    assert_eq!(c.try_recv().unwrap(), 0);
    invariant_holds(&c);

    let p = c.try_reserve().unwrap();
    invariant_holds(&c);
    c.send(p, 4).unwrap();
    invariant_holds(&c);

    assert_eq!(c.queue_len(), 4);
    assert_eq!(c.reserved(), 0);
}

#[test]
fn invariant_holds_across_many_seeded_reserve_send_abort_sequences() {
    for seed in 0u32..32 {
        let capacity = 1 + (seed % 6) as usize;
        let mut c: Channel<u32> = Channel::new(ChannelId::new_for_test(0, 0), capacity);
        let mut outstanding = Vec::new();
        for step in 0..64u32 {
            invariant_holds(&c);
            match (seed + step) % 3 {
                0 => {
                    if let Ok(p) = c.try_reserve() {
                        outstanding.push(p);
                    }
                }
                1 => {
                    if let Some(p) = outstanding.pop() {
                        c.send(p, step).unwrap();
                    }
                }
                _ => {
                    if let Some(p) = outstanding.pop() {
                        c.abort(p);
                    } else {
                        let _ = c.try_recv();
                    }
                }
            }
            invariant_holds(&c);
        }
    }
}

#[test]
fn reserve_fails_exactly_at_capacity_boundary() {
    let mut c: Channel<u32> = Channel::new(ChannelId::new_for_test(0, 0), 2);
    let p1 = c.try_reserve().unwrap();
    let p2 = c.try_reserve().unwrap();
    assert_eq!(c.try_reserve().unwrap_err(), ChannelError::Full);
    c.send(p1, 1).unwrap();
    c.abort(p2);
    invariant_holds(&c);
}
