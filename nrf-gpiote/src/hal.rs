use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::interrupt::Priority;
use crate::Pin;

/// Edge a channel reacts to. Discriminants match `CONFIG[n].POLARITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Polarity {
    None = 0,
    LoToHi = 1,
    HiToLo = 2,
    Toggle = 3,
}

/// Per-pin sense level. Discriminants match `PIN_CNF[n].SENSE`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Sense {
    #[default]
    Disabled = 0,
    High = 2,
    Low = 3,
}

/// Pull resistor of an input. Discriminants match `PIN_CNF[n].PULL`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Pull {
    #[default]
    None = 0,
    Down = 1,
    Up = 3,
}

/// Output level. Discriminants match `CONFIG[n].OUTINIT`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Level {
    #[default]
    Low = 0,
    High = 1,
}

/// A GPIOTE event register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// `EVENTS_IN[n]` of a high-accuracy channel.
    In(usize),
    /// The shared `EVENTS_PORT`, raised on a rising edge of DETECT.
    Port,
}

/// Register-level access to GPIOTE, the NVIC line of its interrupt and the
/// port 0 pin configuration.
///
/// Channel arguments are always below [`Hardware::CHANNELS`] and pin arguments
/// below [`NUMBER_OF_PINS`](crate::NUMBER_OF_PINS).
pub trait Hardware {
    /// Number of high-accuracy channels (4 on nRF51, 8 on nRF52).
    const CHANNELS: usize;
    /// Implemented NVIC priority bits.
    const PRIO_BITS: u8;
    /// Priority levels owned by the SoftDevice.
    const RESERVED_PRIORITIES: &'static [Priority];

    // GPIOTE events and interrupt enables

    fn event_is_set(&self, event: Event) -> bool;
    fn event_clear(&self, event: Event);
    fn event_address(&self, channel: usize) -> u32;
    /// Set bits of `INTENSET`.
    fn int_enable(&self, mask: u32);
    /// Set bits of `INTENCLR`.
    fn int_disable(&self, mask: u32);
    /// Whether any bit of `mask` is enabled.
    fn int_is_enabled(&self, mask: u32) -> bool;

    // GPIOTE channel configuration

    /// Write pin and polarity of an event channel, leaving the mode untouched.
    fn event_configure(&self, channel: usize, pin: Pin, polarity: Polarity);
    fn event_enable(&self, channel: usize);
    fn event_disable(&self, channel: usize);
    fn event_pin(&self, channel: usize) -> Pin;
    fn event_polarity(&self, channel: usize) -> Polarity;
    /// Write pin, action and initial level of a task channel, leaving the mode untouched.
    fn task_configure(&self, channel: usize, pin: Pin, action: Polarity, init: Level);
    fn task_enable(&self, channel: usize);
    fn task_disable(&self, channel: usize);
    /// Drive the pin of a task channel to `level` by rewriting `OUTINIT`.
    fn task_force(&self, channel: usize, level: Level);
    fn task_trigger(&self, channel: usize);
    fn task_address(&self, channel: usize) -> u32;
    /// Reset a channel's configuration to its power-on value.
    fn te_default(&self, channel: usize);

    // Port 0

    fn pins_read(&self) -> u32;
    fn pin_set(&self, pin: Pin);
    fn pin_clear(&self, pin: Pin);
    fn pin_toggle(&self, pin: Pin);
    fn sense_get(&self, pin: Pin) -> Sense;
    fn sense_set(&self, pin: Pin, sense: Sense);
    fn cfg_output(&self, pin: Pin);
    fn cfg_input(&self, pin: Pin, pull: Pull);
    /// Connect the input buffer without touching direction or pull.
    fn cfg_watcher(&self, pin: Pin);
    fn cfg_default(&self, pin: Pin);

    // NVIC

    /// Set the GPIOTE interrupt priority, clear any pending request and unmask it.
    fn irq_enable(&self, priority: Priority);
    fn irq_disable(&self);
}
