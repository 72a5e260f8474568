//! GPIOTE channel allocation and interrupt dispatch for nRF51/nRF52 applications
//! running next to a SoftDevice.
//!
//! A [`Gpiote`] owns the pin and channel tables. Pins are bound either to a
//! high-accuracy GPIOTE channel (one `EVENTS_IN[n]` per pin) or to a low-power
//! slot driven by the shared PORT event and per-pin sense detection. A second,
//! mask-based consumer ([`GpioteUser`]) watches whole groups of pins on the same
//! PORT event. [`Gpiote::on_interrupt`] services all of them.
//!
//! Register access goes through the [`Hardware`] trait. With one of the chip
//! features enabled, [`PacHardware`] implements it on the real peripherals.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

#[cfg(feature = "nrf51")]
pub(crate) use nrf51_pac as pac;
#[cfg(feature = "nrf52832")]
pub(crate) use nrf52832_pac as pac;
#[cfg(feature = "nrf52833")]
pub(crate) use nrf52833_pac as pac;
#[cfg(feature = "nrf52840")]
pub(crate) use nrf52840_pac as pac;

#[cfg(any(
    all(feature = "nrf51", feature = "nrf52832"),
    all(feature = "nrf51", feature = "nrf52833"),
    all(feature = "nrf51", feature = "nrf52840"),
    all(feature = "nrf52832", feature = "nrf52833"),
    all(feature = "nrf52832", feature = "nrf52840"),
    all(feature = "nrf52833", feature = "nrf52840"),
))]
compile_error!("Only one chip feature can be enabled at a time.");

mod error;
pub use error::*;

pub mod interrupt;

mod hal;
pub use hal::*;

mod channel;
pub use channel::*;

mod users;
pub use users::*;

mod driver;
pub use driver::*;

mod dispatch;

mod shared;
pub use shared::*;

#[cfg(any(feature = "nrf51", feature = "nrf52832", feature = "nrf52833", feature = "nrf52840"))]
mod pac_hw;
#[cfg(any(feature = "nrf51", feature = "nrf52832", feature = "nrf52833", feature = "nrf52840"))]
pub use pac_hw::*;

#[cfg(test)]
mod tests;

/// Index of a pin on port 0.
pub type Pin = u8;

/// Number of pins on port 0.
pub const NUMBER_OF_PINS: usize = 32;

/// Upper bound on high-accuracy channels across supported chips.
pub const MAX_CHANNELS: usize = 8;

/// Default number of low-power (PORT) slots.
pub const DEFAULT_LOW_POWER_CHANNELS: usize = 4;

/// Maximum number of legacy users, one bit each in the enabled mask.
pub const MAX_USERS: usize = 32;

/// Interrupt enable bit of the PORT event.
pub const INT_PORT_MASK: u32 = 1 << 31;

/// Interrupt enable bits of the `EVENTS_IN[n]` events.
pub const INT_IN_MASK: u32 = (1 << MAX_CHANNELS) - 1;

/// Iterate over the pins set in `mask`, lowest first.
pub(crate) fn pins(mask: u32) -> impl Iterator<Item = Pin> {
    (0..NUMBER_OF_PINS as Pin).filter(move |pin| mask & (1 << pin) != 0)
}
