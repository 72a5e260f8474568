use std::sync::atomic::{AtomicU32, Ordering};

use super::{init_gpiote, EdgeLog, MockHardware};
use crate::{EdgeHandler, Error, InConfig, Pin, Polarity, SharedGpiote};

#[test]
fn install_once() {
    let hw = MockHardware::new();
    let shared: SharedGpiote<'_, MockHardware> = SharedGpiote::new();

    assert_eq!(shared.with(|gpiote| gpiote.is_init()), None);
    shared.install(init_gpiote(&hw)).unwrap();
    assert_eq!(shared.install(init_gpiote(&hw)).err(), Some(Error::InvalidState));
    assert_eq!(shared.with(|gpiote| gpiote.is_init()), Some(true));

    assert!(shared.take().is_some());
    assert!(shared.take().is_none());
}

#[test]
fn interrupt_reaches_installed_driver() {
    let log = EdgeLog::default();
    let handler = |pin: Pin, polarity: Polarity| log.record(pin, polarity);

    let hw = MockHardware::new();
    let shared: SharedGpiote<'_, MockHardware> = SharedGpiote::new();

    // Nothing installed yet.
    shared.on_interrupt();

    shared.install(init_gpiote(&hw)).unwrap();
    shared
        .with(|gpiote| {
            gpiote.in_init(3, &InConfig::toggle(false), Some(&handler))?;
            gpiote.in_event_enable(3, true)
        })
        .unwrap()
        .unwrap();

    hw.set_input(3, true);
    shared.on_interrupt();
    assert_eq!(log.take(), [(3, Polarity::LoToHi)]);
}

static SHARED: SharedGpiote<'static, MockHardware> = SharedGpiote::new();
static EDGES: AtomicU32 = AtomicU32::new(0);

fn count_edge(_pin: Pin, _polarity: Polarity) {
    EDGES.fetch_add(1, Ordering::Relaxed);
}

#[test]
fn driver_lives_in_a_static() {
    let hw = MockHardware::new();
    let mut gpiote = init_gpiote(&hw);
    gpiote
        .in_init(5, &InConfig::toggle(false), Some(&count_edge as &dyn EdgeHandler))
        .unwrap();
    gpiote.in_event_enable(5, true).unwrap();
    SHARED.install(gpiote).unwrap();

    hw.set_input(5, true);
    SHARED.on_interrupt();
    hw.set_input(5, false);
    SHARED.on_interrupt();
    assert_eq!(EDGES.load(Ordering::Relaxed), 2);

    assert!(SHARED.take().is_some());
}
