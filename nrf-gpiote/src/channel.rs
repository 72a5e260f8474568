use core::cmp::min;

use crate::{Error, Pin, Polarity, MAX_CHANNELS, NUMBER_OF_PINS};

/// Receives the edges of an input channel.
///
/// Called from [`Gpiote::on_interrupt`](crate::Gpiote::on_interrupt), so it runs
/// at the GPIOTE interrupt priority and must not call back into the driver.
///
/// Handlers are shared with interrupt context, so they must be `Sync`. One
/// built on a `Cell` is rejected:
///
/// ```compile_fail
/// use core::cell::Cell;
/// use nrf_gpiote::{EdgeHandler, Pin, Polarity};
///
/// struct Counter(Cell<u32>);
///
/// impl EdgeHandler for Counter {
///     fn on_edge(&self, _pin: Pin, _polarity: Polarity) {
///         self.0.set(self.0.get() + 1);
///     }
/// }
/// ```
///
/// An atomic counter is fine:
///
/// ```
/// use core::sync::atomic::{AtomicU32, Ordering};
/// use nrf_gpiote::{EdgeHandler, Pin, Polarity};
///
/// struct Counter(AtomicU32);
///
/// impl EdgeHandler for Counter {
///     fn on_edge(&self, _pin: Pin, _polarity: Polarity) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait EdgeHandler: Sync {
    fn on_edge(&self, pin: Pin, polarity: Polarity);
}

impl<F: Fn(Pin, Polarity) + Sync> EdgeHandler for F {
    fn on_edge(&self, pin: Pin, polarity: Polarity) {
        self(pin, polarity)
    }
}

/// Identifier of a bound channel.
///
/// Ids below the chip's channel count name high-accuracy channels; the ids above
/// name the low-power slots, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(pub(crate) u8);

impl ChannelId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a pin is committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinAssignment {
    Unused,
    PlainOutput,
    Channel(ChannelId),
}

/// Pin and trigger polarity of a low-power slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortBinding {
    pub pin: Pin,
    pub polarity: Polarity,
}

#[derive(Clone, Copy)]
pub(crate) enum Slot<'a> {
    Free,
    /// Drives a task output.
    Task,
    /// Watches an input, with an optional edge handler.
    Event(Option<&'a dyn EdgeHandler>),
}

impl<'a> Slot<'a> {
    fn is_free(&self) -> bool {
        matches!(self, Slot::Free)
    }
}

#[derive(Clone, Copy)]
struct PortSlot<'a> {
    slot: Slot<'a>,
    binding: PortBinding,
}

impl<'a> PortSlot<'a> {
    const FREE: Self = Self {
        slot: Slot::Free,
        binding: PortBinding {
            pin: 0,
            polarity: Polarity::None,
        },
    };
}

/// Pin table, high-accuracy channel table and low-power slot table.
///
/// A pin is bound to at most one channel and a channel to at most one pin. A
/// failed allocation leaves every table as it was.
pub struct ChannelAllocator<'a, const LOW_POWER: usize> {
    pins: [PinAssignment; NUMBER_OF_PINS],
    channels: [Slot<'a>; MAX_CHANNELS],
    channel_count: usize,
    port: [PortSlot<'a>; LOW_POWER],
}

impl<'a, const LOW_POWER: usize> ChannelAllocator<'a, LOW_POWER> {
    pub(crate) fn new(channel_count: usize) -> Self {
        Self {
            pins: [PinAssignment::Unused; NUMBER_OF_PINS],
            channels: [Slot::Free; MAX_CHANNELS],
            channel_count: min(channel_count, MAX_CHANNELS),
            port: [PortSlot::FREE; LOW_POWER],
        }
    }

    /// Mark every pin unused and every channel free.
    pub(crate) fn reset(&mut self) {
        self.pins = [PinAssignment::Unused; NUMBER_OF_PINS];
        self.channels = [Slot::Free; MAX_CHANNELS];
        self.port = [PortSlot::FREE; LOW_POWER];
    }

    /// Number of high-accuracy channels.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Role of `pin`, `None` when there is no such pin.
    pub fn assignment(&self, pin: Pin) -> Option<PinAssignment> {
        self.pins.get(pin as usize).copied()
    }

    pub fn is_high_accuracy(&self, channel: ChannelId) -> bool {
        channel.index() < self.channel_count
    }

    /// Bind `pin` to the first free channel of the requested class.
    ///
    /// Fails with [`Error::InvalidParam`] for a pin past the port, with
    /// [`Error::InvalidState`] when the pin already has a role and with
    /// [`Error::NoMem`] when every channel of the class is taken.
    pub fn allocate(
        &mut self,
        pin: Pin,
        handler: Option<&'a dyn EdgeHandler>,
        high_accuracy: bool,
    ) -> Result<ChannelId, Error> {
        self.bind(pin, Slot::Event(handler), high_accuracy)
    }

    /// Bind `pin` to a free high-accuracy channel driving a task output.
    pub(crate) fn allocate_task(&mut self, pin: Pin) -> Result<ChannelId, Error> {
        self.bind(pin, Slot::Task, true)
    }

    fn bind(&mut self, pin: Pin, slot: Slot<'a>, high_accuracy: bool) -> Result<ChannelId, Error> {
        self.ensure_unused(pin)?;

        let index = if high_accuracy {
            let index = self.channels[..self.channel_count]
                .iter()
                .position(Slot::is_free)
                .ok_or(Error::NoMem)?;
            self.channels[index] = slot;
            index
        } else {
            let index = self.port.iter().position(|p| p.slot.is_free()).ok_or(Error::NoMem)?;
            self.port[index] = PortSlot {
                slot,
                binding: PortBinding {
                    pin,
                    polarity: Polarity::None,
                },
            };
            self.channel_count + index
        };

        let id = ChannelId(index as u8);
        self.pins[pin as usize] = PinAssignment::Channel(id);
        trace!("gpiote: pin {} bound to channel {}", pin, id.0);
        Ok(id)
    }

    /// Release a channel. The pin table entry is left for [`clear`](Self::clear).
    pub fn free(&mut self, channel: ChannelId) {
        let index = channel.index();
        if index < self.channel_count {
            self.channels[index] = Slot::Free;
        } else if let Some(port) = self.port.get_mut(index - self.channel_count) {
            *port = PortSlot::FREE;
        }
    }

    pub(crate) fn set_plain_output(&mut self, pin: Pin) -> Result<(), Error> {
        self.ensure_unused(pin)?;
        self.pins[pin as usize] = PinAssignment::PlainOutput;
        Ok(())
    }

    pub fn clear(&mut self, pin: Pin) {
        if let Some(assignment) = self.pins.get_mut(pin as usize) {
            *assignment = PinAssignment::Unused;
        }
    }

    fn ensure_unused(&self, pin: Pin) -> Result<(), Error> {
        match self.assignment(pin) {
            Some(PinAssignment::Unused) => Ok(()),
            Some(_) => Err(Error::InvalidState),
            None => Err(Error::InvalidParam),
        }
    }

    pub(crate) fn slot(&self, channel: ChannelId) -> Slot<'a> {
        let index = channel.index();
        if index < self.channel_count {
            self.channels[index]
        } else {
            self.port.get(index - self.channel_count).map_or(Slot::Free, |p| p.slot)
        }
    }

    /// Edge handler of an input channel, if it has one.
    pub fn handler(&self, channel: ChannelId) -> Option<&'a dyn EdgeHandler> {
        match self.slot(channel) {
            Slot::Event(handler) => handler,
            _ => None,
        }
    }

    /// Binding of a low-power slot.
    pub fn port_binding(&self, channel: ChannelId) -> Option<PortBinding> {
        let port = self.port.get(channel.index().checked_sub(self.channel_count)?)?;
        (!port.slot.is_free()).then_some(port.binding)
    }

    pub(crate) fn set_port_polarity(&mut self, channel: ChannelId, polarity: Polarity) {
        if let Some(index) = channel.index().checked_sub(self.channel_count) {
            if let Some(port) = self.port.get_mut(index) {
                port.binding.polarity = polarity;
            }
        }
    }

    /// Bound low-power slots with their handlers, in slot order.
    pub(crate) fn port_slots(&self) -> impl Iterator<Item = (PortBinding, Option<&'a dyn EdgeHandler>)> + '_ {
        self.port.iter().filter_map(|port| match port.slot {
            Slot::Event(handler) => Some((port.binding, handler)),
            _ => None,
        })
    }
}
