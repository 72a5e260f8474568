use super::{init_gpiote, MockHardware};
use crate::{Config, Error, Gpiote, GpioteUser, Sense, UserId, INT_PORT_MASK};

fn ignore(_: u32, _: u32) {}

#[test]
fn users_need_storage() {
    let hw = MockHardware::new();
    let mut gpiote = init_gpiote(&hw);

    assert_eq!(gpiote.register_user(1, 0, &ignore), Err(Error::InvalidState));
    assert_eq!(gpiote.enable_user(UserId(0)), Err(Error::InvalidState));
    assert_eq!(gpiote.user_pins_state(UserId(0)), Err(Error::InvalidState));
}

#[test]
fn init_users_checks_capacity() {
    let mut small = [GpioteUser::EMPTY; 2];
    let mut buffer = [GpioteUser::EMPTY; 2];
    let mut spare = [GpioteUser::EMPTY; 2];

    let hw = MockHardware::new();
    let mut gpiote = init_gpiote(&hw);

    assert_eq!(gpiote.init_users(&mut small, 3), Err(Error::InvalidParam));
    gpiote.init_users(&mut buffer, 2).unwrap();
    assert_eq!(gpiote.init_users(&mut spare, 1), Err(Error::InvalidState));
}

#[test]
fn register_until_full() {
    let mut buffer = [GpioteUser::EMPTY; 4];

    let hw = MockHardware::new();
    let mut gpiote = init_gpiote(&hw);
    gpiote.init_users(&mut buffer, 2).unwrap();

    assert_eq!(gpiote.register_user(0, 0, &ignore), Err(Error::InvalidParam));
    assert_eq!(gpiote.register_user(1 << 1, 0, &ignore), Ok(UserId(0)));
    assert_eq!(gpiote.register_user(0, 1 << 2, &ignore), Ok(UserId(1)));
    assert_eq!(gpiote.register_user(1 << 3, 0, &ignore), Err(Error::NoMem));

    let user = gpiote.user(UserId(1)).unwrap();
    assert_eq!(user.pins_mask(), 1 << 2);
}

#[test]
fn register_disables_sense() {
    let mut buffer = [GpioteUser::EMPTY; 1];

    let hw = MockHardware::new();
    let mut gpiote = init_gpiote(&hw);
    gpiote.init_users(&mut buffer, 1).unwrap();

    gpiote.register_user((1 << 10) | (1 << 11), 1 << 11, &ignore).unwrap();
    assert_eq!(hw.sense(10), Sense::Disabled);
    assert_eq!(hw.sense(11), Sense::Disabled);
}

#[test]
fn enable_arms_opposite_level() {
    let mut buffer = [GpioteUser::EMPTY; 1];

    let hw = MockHardware::new();
    let mut gpiote: Gpiote<'_, MockHardware> = Gpiote::new(hw.clone(), Config::default());
    gpiote.init_users(&mut buffer, 1).unwrap();
    assert_eq!(hw.inten(), 0);

    hw.set_input(3, true);
    let user = gpiote.register_user((1 << 3) | (1 << 4), (1 << 3) | (1 << 4), &ignore).unwrap();
    gpiote.enable_user(user).unwrap();

    assert_eq!(hw.sense(3), Sense::Low);
    assert_eq!(hw.sense(4), Sense::High);
    assert_eq!(gpiote.user(user).unwrap().sense_high_pins(), 1 << 4);
    assert_eq!(hw.inten(), INT_PORT_MASK);
    assert!(!hw.port_event());

    assert_eq!(gpiote.user_pins_state(user), Ok(1 << 3));
}

#[test]
fn disable_turns_sense_and_port_interrupt_off() {
    let mut buffer = [GpioteUser::EMPTY; 2];

    let hw = MockHardware::new();
    let mut gpiote: Gpiote<'_, MockHardware> = Gpiote::new(hw.clone(), Config::default());
    gpiote.init_users(&mut buffer, 2).unwrap();

    let a = gpiote.register_user(1 << 3, 0, &ignore).unwrap();
    let b = gpiote.register_user(1 << 4, 0, &ignore).unwrap();
    gpiote.enable_user(a).unwrap();
    gpiote.enable_user(b).unwrap();

    gpiote.disable_user(a).unwrap();
    assert_eq!(hw.sense(3), Sense::Disabled);
    assert_eq!(hw.sense(4), Sense::High);
    assert_eq!(hw.inten(), INT_PORT_MASK);

    gpiote.disable_user(b).unwrap();
    assert_eq!(hw.inten(), 0);
}

#[test]
fn driver_keeps_port_interrupt_when_users_go_away() {
    let mut buffer = [GpioteUser::EMPTY; 1];

    let hw = MockHardware::new();
    let mut gpiote = init_gpiote(&hw);
    gpiote.init_users(&mut buffer, 1).unwrap();

    let user = gpiote.register_user(1 << 3, 0, &ignore).unwrap();
    gpiote.enable_user(user).unwrap();
    gpiote.disable_user(user).unwrap();
    assert_eq!(hw.inten() & INT_PORT_MASK, INT_PORT_MASK);
}

#[test]
fn unknown_user_id() {
    let mut buffer = [GpioteUser::EMPTY; 2];

    let hw = MockHardware::new();
    let mut gpiote = init_gpiote(&hw);
    gpiote.init_users(&mut buffer, 2).unwrap();
    gpiote.register_user(1, 0, &ignore).unwrap();

    assert_eq!(gpiote.enable_user(UserId(1)), Err(Error::InvalidParam));
    assert_eq!(gpiote.disable_user(UserId(1)), Err(Error::InvalidParam));
    assert_eq!(gpiote.user_pins_state(UserId(5)), Err(Error::InvalidParam));
}

#[test]
fn uninit_users_disarms_and_forgets() {
    let mut buffer = [GpioteUser::EMPTY; 2];

    let hw = MockHardware::new();
    let mut gpiote: Gpiote<'_, MockHardware> = Gpiote::new(hw.clone(), Config::default());
    assert_eq!(gpiote.uninit_users(), Err(Error::InvalidState));

    gpiote.init_users(&mut buffer, 2).unwrap();
    let user = gpiote.register_user(1 << 3, 1 << 3, &ignore).unwrap();
    gpiote.enable_user(user).unwrap();
    assert_eq!(hw.sense(3), Sense::High);

    gpiote.uninit_users().unwrap();
    assert_eq!(hw.sense(3), Sense::Disabled);
    assert_eq!(hw.inten(), 0);
    assert_eq!(hw.irq(), None);
    assert!(gpiote.user(user).is_none());
    assert_eq!(gpiote.register_user(1 << 3, 0, &ignore), Err(Error::InvalidState));
}

#[test]
fn full_teardown_releases_the_interrupt() {
    let mut buffer = [GpioteUser::EMPTY; 1];

    let hw = MockHardware::new();
    let mut gpiote = init_gpiote(&hw);
    gpiote.init_users(&mut buffer, 1).unwrap();
    let user = gpiote.register_user(1 << 6, 0, &ignore).unwrap();
    gpiote.enable_user(user).unwrap();

    // Users outlive the pin driver.
    gpiote.uninit().unwrap();
    assert_eq!(hw.sense(6), Sense::High);
    assert!(hw.irq().is_some());
    assert_eq!(hw.inten(), INT_PORT_MASK);

    gpiote.uninit_users().unwrap();
    assert_eq!(hw.sense(6), Sense::Disabled);
    assert_eq!(hw.inten(), 0);
    assert_eq!(hw.irq(), None);
}
