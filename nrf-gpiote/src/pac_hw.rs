use cortex_m::peripheral::NVIC;

use crate::interrupt::Priority;
use crate::pac::{self, Interrupt};
use crate::{Event, Hardware, Level, Pin, Polarity, Pull, Sense};

#[cfg(feature = "nrf51")]
pub use crate::pac::GPIO as Port;
#[cfg(not(feature = "nrf51"))]
pub use crate::pac::P0 as Port;

const CONFIG_MODE_MSK: u32 = 0b11;
const CONFIG_MODE_EVENT: u32 = 1;
const CONFIG_MODE_TASK: u32 = 3;
const CONFIG_PSEL_POS: u32 = 8;
const CONFIG_PSEL_MSK: u32 = 0x1f << CONFIG_PSEL_POS;
const CONFIG_POLARITY_POS: u32 = 16;
const CONFIG_POLARITY_MSK: u32 = 0b11 << CONFIG_POLARITY_POS;
const CONFIG_OUTINIT_POS: u32 = 20;
const CONFIG_OUTINIT_MSK: u32 = 1 << CONFIG_OUTINIT_POS;

const PIN_CNF_DIR_OUTPUT: u32 = 1;
const PIN_CNF_INPUT_DISCONNECT: u32 = 1 << 1;
const PIN_CNF_PULL_POS: u32 = 2;
const PIN_CNF_SENSE_POS: u32 = 16;
const PIN_CNF_SENSE_MSK: u32 = 0b11 << PIN_CNF_SENSE_POS;

/// [`Hardware`] on the GPIOTE and port 0 peripherals of the selected chip.
pub struct PacHardware {
    gpiote: pac::GPIOTE,
    port: Port,
}

impl PacHardware {
    pub fn new(gpiote: pac::GPIOTE, port: Port) -> Self {
        Self { gpiote, port }
    }

    pub fn free(self) -> (pac::GPIOTE, Port) {
        (self.gpiote, self.port)
    }
}

impl Hardware for PacHardware {
    #[cfg(feature = "nrf51")]
    const CHANNELS: usize = 4;
    #[cfg(not(feature = "nrf51"))]
    const CHANNELS: usize = 8;

    const PRIO_BITS: u8 = pac::NVIC_PRIO_BITS;

    #[cfg(feature = "nrf51")]
    const RESERVED_PRIORITIES: &'static [Priority] = &crate::interrupt::NRF51_RESERVED_PRIORITIES;
    #[cfg(not(feature = "nrf51"))]
    const RESERVED_PRIORITIES: &'static [Priority] = &crate::interrupt::NRF52_RESERVED_PRIORITIES;

    fn event_is_set(&self, event: Event) -> bool {
        match event {
            Event::In(channel) => self.gpiote.events_in[channel].read().bits() != 0,
            Event::Port => self.gpiote.events_port.read().bits() != 0,
        }
    }

    fn event_clear(&self, event: Event) {
        match event {
            Event::In(channel) => self.gpiote.events_in[channel].write(|w| unsafe { w.bits(0) }),
            Event::Port => self.gpiote.events_port.write(|w| unsafe { w.bits(0) }),
        }
    }

    fn event_address(&self, channel: usize) -> u32 {
        &self.gpiote.events_in[channel] as *const _ as u32
    }

    fn int_enable(&self, mask: u32) {
        self.gpiote.intenset.write(|w| unsafe { w.bits(mask) });
    }

    fn int_disable(&self, mask: u32) {
        self.gpiote.intenclr.write(|w| unsafe { w.bits(mask) });
    }

    fn int_is_enabled(&self, mask: u32) -> bool {
        self.gpiote.intenset.read().bits() & mask != 0
    }

    fn event_configure(&self, channel: usize, pin: Pin, polarity: Polarity) {
        let polarity: u8 = polarity.into();
        self.gpiote.config[channel].modify(|r, w| unsafe {
            w.bits(
                (r.bits() & !(CONFIG_PSEL_MSK | CONFIG_POLARITY_MSK))
                    | ((pin as u32) << CONFIG_PSEL_POS)
                    | ((polarity as u32) << CONFIG_POLARITY_POS),
            )
        });
    }

    fn event_enable(&self, channel: usize) {
        self.gpiote.config[channel]
            .modify(|r, w| unsafe { w.bits((r.bits() & !CONFIG_MODE_MSK) | CONFIG_MODE_EVENT) });
    }

    fn event_disable(&self, channel: usize) {
        self.gpiote.config[channel].modify(|r, w| unsafe { w.bits(r.bits() & !CONFIG_MODE_MSK) });
    }

    fn event_pin(&self, channel: usize) -> Pin {
        ((self.gpiote.config[channel].read().bits() & CONFIG_PSEL_MSK) >> CONFIG_PSEL_POS) as Pin
    }

    fn event_polarity(&self, channel: usize) -> Polarity {
        let bits = (self.gpiote.config[channel].read().bits() & CONFIG_POLARITY_MSK) >> CONFIG_POLARITY_POS;
        Polarity::try_from(bits as u8).unwrap_or(Polarity::None)
    }

    fn task_configure(&self, channel: usize, pin: Pin, action: Polarity, init: Level) {
        let action: u8 = action.into();
        let init: u8 = init.into();
        self.gpiote.config[channel].modify(|r, w| unsafe {
            w.bits(
                (r.bits() & !(CONFIG_PSEL_MSK | CONFIG_POLARITY_MSK | CONFIG_OUTINIT_MSK))
                    | ((pin as u32) << CONFIG_PSEL_POS)
                    | ((action as u32) << CONFIG_POLARITY_POS)
                    | ((init as u32) << CONFIG_OUTINIT_POS),
            )
        });
    }

    fn task_enable(&self, channel: usize) {
        self.gpiote.config[channel]
            .modify(|r, w| unsafe { w.bits((r.bits() & !CONFIG_MODE_MSK) | CONFIG_MODE_TASK) });
    }

    fn task_disable(&self, channel: usize) {
        self.gpiote.config[channel].modify(|r, w| unsafe { w.bits(r.bits() & !CONFIG_MODE_MSK) });
    }

    fn task_force(&self, channel: usize, level: Level) {
        let level: u8 = level.into();
        self.gpiote.config[channel].modify(|r, w| unsafe {
            w.bits((r.bits() & !CONFIG_OUTINIT_MSK) | ((level as u32) << CONFIG_OUTINIT_POS))
        });
    }

    fn task_trigger(&self, channel: usize) {
        self.gpiote.tasks_out[channel].write(|w| unsafe { w.bits(1) });
    }

    fn task_address(&self, channel: usize) -> u32 {
        &self.gpiote.tasks_out[channel] as *const _ as u32
    }

    fn te_default(&self, channel: usize) {
        self.gpiote.config[channel].write(|w| unsafe { w.bits(0) });
    }

    fn pins_read(&self) -> u32 {
        self.port.in_.read().bits()
    }

    fn pin_set(&self, pin: Pin) {
        self.port.outset.write(|w| unsafe { w.bits(1 << pin) });
    }

    fn pin_clear(&self, pin: Pin) {
        self.port.outclr.write(|w| unsafe { w.bits(1 << pin) });
    }

    fn pin_toggle(&self, pin: Pin) {
        if self.port.out.read().bits() & (1 << pin) != 0 {
            self.pin_clear(pin);
        } else {
            self.pin_set(pin);
        }
    }

    fn sense_get(&self, pin: Pin) -> Sense {
        let bits = (self.port.pin_cnf[pin as usize].read().bits() & PIN_CNF_SENSE_MSK) >> PIN_CNF_SENSE_POS;
        Sense::try_from(bits as u8).unwrap_or(Sense::Disabled)
    }

    fn sense_set(&self, pin: Pin, sense: Sense) {
        let sense: u8 = sense.into();
        self.port.pin_cnf[pin as usize].modify(|r, w| unsafe {
            w.bits((r.bits() & !PIN_CNF_SENSE_MSK) | ((sense as u32) << PIN_CNF_SENSE_POS))
        });
    }

    fn cfg_output(&self, pin: Pin) {
        self.port.pin_cnf[pin as usize].write(|w| unsafe { w.bits(PIN_CNF_DIR_OUTPUT | PIN_CNF_INPUT_DISCONNECT) });
    }

    fn cfg_input(&self, pin: Pin, pull: Pull) {
        let pull: u8 = pull.into();
        self.port.pin_cnf[pin as usize].write(|w| unsafe { w.bits((pull as u32) << PIN_CNF_PULL_POS) });
    }

    fn cfg_watcher(&self, pin: Pin) {
        self.port.pin_cnf[pin as usize].modify(|r, w| unsafe { w.bits(r.bits() & !PIN_CNF_INPUT_DISCONNECT) });
    }

    fn cfg_default(&self, pin: Pin) {
        self.port.pin_cnf[pin as usize].write(|w| unsafe { w.bits(PIN_CNF_INPUT_DISCONNECT) });
    }

    fn irq_enable(&self, priority: Priority) {
        unsafe {
            cortex_m::peripheral::Peripherals::steal()
                .NVIC
                .set_priority(Interrupt::GPIOTE, priority.to_nvic(Self::PRIO_BITS));
            NVIC::unpend(Interrupt::GPIOTE);
            NVIC::unmask(Interrupt::GPIOTE);
        }
    }

    fn irq_disable(&self) {
        NVIC::mask(Interrupt::GPIOTE);
    }
}
