use std::sync::{Arc, Mutex, MutexGuard};

use crate::interrupt::{Priority, NRF52_RESERVED_PRIORITIES};
use crate::{Event, Hardware, Level, Pin, Polarity, Pull, Sense, MAX_CHANNELS, NUMBER_OF_PINS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum PinConfig {
    #[default]
    Default,
    Output,
    Input(Pull),
    Watcher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Mode {
    #[default]
    Disabled,
    Event,
    Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChannelConfig {
    pub mode: Mode,
    pub pin: Pin,
    pub polarity: Polarity,
    pub outinit: Level,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Disabled,
            pin: 0,
            polarity: Polarity::None,
            outinit: Level::Low,
        }
    }
}

#[derive(Default)]
struct Regs {
    input: u32,
    out: u32,
    sense: [Sense; NUMBER_OF_PINS],
    pin_config: [PinConfig; NUMBER_OF_PINS],
    channels: [ChannelConfig; MAX_CHANNELS],
    events_in: [bool; MAX_CHANNELS],
    events_port: bool,
    detect: bool,
    inten: u32,
    irq: Option<Priority>,
    task_triggers: [u32; MAX_CHANNELS],
}

impl Regs {
    /// DETECT is the OR of all pins sitting at their sense level. PORT fires on its rising edge.
    fn update_detect(&mut self) {
        let detect = (0..NUMBER_OF_PINS).any(|pin| {
            let high = self.input & (1 << pin) != 0;
            match self.sense[pin] {
                Sense::High => high,
                Sense::Low => !high,
                Sense::Disabled => false,
            }
        });
        if detect && !self.detect {
            self.events_port = true;
        }
        self.detect = detect;
    }
}

/// GPIOTE and port 0 simulated in memory, with four channels like an nRF51.
///
/// Clones share the same registers, so a test can keep one to drive pins while
/// the driver owns another.
#[derive(Clone, Default)]
pub(crate) struct MockHardware {
    regs: Arc<Mutex<Regs>>,
}

impl MockHardware {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn regs(&self) -> MutexGuard<'_, Regs> {
        self.regs.lock().unwrap()
    }

    /// Drive an input level from outside.
    pub(crate) fn set_input(&self, pin: Pin, high: bool) {
        let mut regs = self.regs();
        let mask = 1 << pin;
        let was_high = regs.input & mask != 0;
        if high {
            regs.input |= mask;
        } else {
            regs.input &= !mask;
        }

        if was_high != high {
            for channel in 0..MAX_CHANNELS {
                let config = regs.channels[channel];
                if config.mode != Mode::Event || config.pin != pin {
                    continue;
                }
                let fires = match config.polarity {
                    Polarity::LoToHi => high,
                    Polarity::HiToLo => !high,
                    Polarity::Toggle => true,
                    Polarity::None => false,
                };
                if fires {
                    regs.events_in[channel] = true;
                }
            }
        }
        regs.update_detect();
    }

    pub(crate) fn sense(&self, pin: Pin) -> Sense {
        self.regs().sense[pin as usize]
    }

    pub(crate) fn pin_config(&self, pin: Pin) -> PinConfig {
        self.regs().pin_config[pin as usize]
    }

    pub(crate) fn channel(&self, channel: usize) -> ChannelConfig {
        self.regs().channels[channel]
    }

    pub(crate) fn output(&self, pin: Pin) -> bool {
        self.regs().out & (1 << pin) != 0
    }

    pub(crate) fn port_event(&self) -> bool {
        self.regs().events_port
    }

    pub(crate) fn in_event(&self, channel: usize) -> bool {
        self.regs().events_in[channel]
    }

    pub(crate) fn inten(&self) -> u32 {
        self.regs().inten
    }

    pub(crate) fn irq(&self) -> Option<Priority> {
        self.regs().irq
    }

    pub(crate) fn task_triggers(&self, channel: usize) -> u32 {
        self.regs().task_triggers[channel]
    }
}

impl Hardware for MockHardware {
    const CHANNELS: usize = 4;
    const PRIO_BITS: u8 = 3;
    const RESERVED_PRIORITIES: &'static [Priority] = &NRF52_RESERVED_PRIORITIES;

    fn event_is_set(&self, event: Event) -> bool {
        let regs = self.regs();
        match event {
            Event::In(channel) => regs.events_in[channel],
            Event::Port => regs.events_port,
        }
    }

    fn event_clear(&self, event: Event) {
        let mut regs = self.regs();
        match event {
            Event::In(channel) => regs.events_in[channel] = false,
            Event::Port => regs.events_port = false,
        }
    }

    fn event_address(&self, channel: usize) -> u32 {
        0x4000_6100 + 4 * channel as u32
    }

    fn int_enable(&self, mask: u32) {
        self.regs().inten |= mask;
    }

    fn int_disable(&self, mask: u32) {
        self.regs().inten &= !mask;
    }

    fn int_is_enabled(&self, mask: u32) -> bool {
        self.regs().inten & mask != 0
    }

    fn event_configure(&self, channel: usize, pin: Pin, polarity: Polarity) {
        let mut regs = self.regs();
        let config = &mut regs.channels[channel];
        config.pin = pin;
        config.polarity = polarity;
    }

    fn event_enable(&self, channel: usize) {
        self.regs().channels[channel].mode = Mode::Event;
    }

    fn event_disable(&self, channel: usize) {
        self.regs().channels[channel].mode = Mode::Disabled;
    }

    fn event_pin(&self, channel: usize) -> Pin {
        self.regs().channels[channel].pin
    }

    fn event_polarity(&self, channel: usize) -> Polarity {
        self.regs().channels[channel].polarity
    }

    fn task_configure(&self, channel: usize, pin: Pin, action: Polarity, init: Level) {
        let mut regs = self.regs();
        let config = &mut regs.channels[channel];
        config.pin = pin;
        config.polarity = action;
        config.outinit = init;
    }

    fn task_enable(&self, channel: usize) {
        self.regs().channels[channel].mode = Mode::Task;
    }

    fn task_disable(&self, channel: usize) {
        self.regs().channels[channel].mode = Mode::Disabled;
    }

    fn task_force(&self, channel: usize, level: Level) {
        self.regs().channels[channel].outinit = level;
    }

    fn task_trigger(&self, channel: usize) {
        self.regs().task_triggers[channel] += 1;
    }

    fn task_address(&self, channel: usize) -> u32 {
        0x4000_6000 + 4 * channel as u32
    }

    fn te_default(&self, channel: usize) {
        self.regs().channels[channel] = ChannelConfig::default();
    }

    fn pins_read(&self) -> u32 {
        self.regs().input
    }

    fn pin_set(&self, pin: Pin) {
        self.regs().out |= 1 << pin;
    }

    fn pin_clear(&self, pin: Pin) {
        self.regs().out &= !(1 << pin);
    }

    fn pin_toggle(&self, pin: Pin) {
        self.regs().out ^= 1 << pin;
    }

    fn sense_get(&self, pin: Pin) -> Sense {
        self.regs().sense[pin as usize]
    }

    fn sense_set(&self, pin: Pin, sense: Sense) {
        let mut regs = self.regs();
        regs.sense[pin as usize] = sense;
        regs.update_detect();
    }

    fn cfg_output(&self, pin: Pin) {
        self.regs().pin_config[pin as usize] = PinConfig::Output;
    }

    fn cfg_input(&self, pin: Pin, pull: Pull) {
        let mut regs = self.regs();
        regs.pin_config[pin as usize] = PinConfig::Input(pull);
        regs.sense[pin as usize] = Sense::Disabled;
        regs.update_detect();
    }

    fn cfg_watcher(&self, pin: Pin) {
        self.regs().pin_config[pin as usize] = PinConfig::Watcher;
    }

    fn cfg_default(&self, pin: Pin) {
        let mut regs = self.regs();
        regs.pin_config[pin as usize] = PinConfig::Default;
        regs.sense[pin as usize] = Sense::Disabled;
        regs.update_detect();
    }

    fn irq_enable(&self, priority: Priority) {
        self.regs().irq = Some(priority);
    }

    fn irq_disable(&self) {
        self.regs().irq = None;
    }
}
