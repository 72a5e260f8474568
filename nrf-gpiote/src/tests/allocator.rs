use std::vec::Vec;

use crate::{ChannelAllocator, ChannelId, Error, Pin, PinAssignment, Polarity};

#[test]
fn high_accuracy_ids_are_unique_until_full() {
    let mut alloc: ChannelAllocator<'_, 4> = ChannelAllocator::new(4);

    let ids: Vec<ChannelId> = (0..4).map(|pin| alloc.allocate(pin, None, true).unwrap()).collect();
    assert_eq!(ids, [ChannelId(0), ChannelId(1), ChannelId(2), ChannelId(3)]);
    for (pin, id) in ids.iter().enumerate() {
        assert_eq!(alloc.assignment(pin as Pin), Some(PinAssignment::Channel(*id)));
        assert!(alloc.is_high_accuracy(*id));
    }

    assert_eq!(alloc.allocate(10, None, true), Err(Error::NoMem));
    assert_eq!(alloc.assignment(10), Some(PinAssignment::Unused));
}

#[test]
fn low_power_ids_follow_the_channels() {
    let mut alloc: ChannelAllocator<'_, 2> = ChannelAllocator::new(4);

    assert_eq!(alloc.allocate(20, None, false), Ok(ChannelId(4)));
    assert_eq!(alloc.allocate(21, None, false), Ok(ChannelId(5)));
    assert_eq!(alloc.allocate(22, None, false), Err(Error::NoMem));
    assert!(!alloc.is_high_accuracy(ChannelId(4)));

    // Low-power exhaustion leaves the high-accuracy channels untouched.
    assert_eq!(alloc.allocate(22, None, true), Ok(ChannelId(0)));
}

#[test]
fn second_bind_of_a_pin_is_rejected() {
    let handler = |_: Pin, _: Polarity| {};
    let mut alloc: ChannelAllocator<'_, 4> = ChannelAllocator::new(4);

    let id = alloc.allocate(7, Some(&handler), true).unwrap();
    assert_eq!(alloc.allocate(7, None, true), Err(Error::InvalidState));
    assert_eq!(alloc.allocate(7, None, false), Err(Error::InvalidState));

    assert_eq!(alloc.assignment(7), Some(PinAssignment::Channel(id)));
    assert!(alloc.handler(id).is_some());
}

#[test]
fn freed_channel_is_reused() {
    let mut alloc: ChannelAllocator<'_, 4> = ChannelAllocator::new(4);
    for pin in 0..4 {
        alloc.allocate(pin, None, true).unwrap();
    }

    alloc.free(ChannelId(1));
    alloc.clear(1);

    assert_eq!(alloc.assignment(1), Some(PinAssignment::Unused));
    assert_eq!(alloc.allocate(9, None, true), Ok(ChannelId(1)));
}

#[test]
fn plain_output_holds_the_pin() {
    let mut alloc: ChannelAllocator<'_, 4> = ChannelAllocator::new(4);

    alloc.set_plain_output(12).unwrap();
    assert_eq!(alloc.assignment(12), Some(PinAssignment::PlainOutput));
    assert_eq!(alloc.allocate(12, None, false), Err(Error::InvalidState));
    assert_eq!(alloc.set_plain_output(12), Err(Error::InvalidState));
}

#[test]
fn port_binding_keeps_pin_and_polarity() {
    let mut alloc: ChannelAllocator<'_, 4> = ChannelAllocator::new(4);

    let id = alloc.allocate(17, None, false).unwrap();
    alloc.set_port_polarity(id, Polarity::Toggle);

    let binding = alloc.port_binding(id).unwrap();
    assert_eq!(binding.pin, 17);
    assert_eq!(binding.polarity, Polarity::Toggle);
    assert_eq!(alloc.port_binding(ChannelId(0)), None);

    alloc.free(id);
    assert_eq!(alloc.port_binding(id), None);
}

#[test]
fn pins_past_the_port_are_rejected() {
    let mut alloc: ChannelAllocator<'_, 4> = ChannelAllocator::new(4);

    assert_eq!(alloc.assignment(32), None);
    assert_eq!(alloc.allocate(32, None, true), Err(Error::InvalidParam));
    assert_eq!(alloc.allocate(u8::MAX, None, false), Err(Error::InvalidParam));
    assert_eq!(alloc.set_plain_output(40), Err(Error::InvalidParam));
    alloc.clear(32);

    // Nothing was taken.
    assert_eq!(alloc.allocate(0, None, true), Ok(ChannelId(0)));
}
