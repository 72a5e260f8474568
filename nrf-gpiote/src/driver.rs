use crate::channel::Slot;
use crate::interrupt::{check_priority, Priority};
use crate::users::UserTable;
use crate::{
    pins, ChannelAllocator, ChannelId, EdgeHandler, Error, Event, GpioteUser, Hardware, Level, Pin, PinAssignment,
    Polarity, PortHandler, Pull, Sense, UserId, DEFAULT_LOW_POWER_CHANNELS, INT_PORT_MASK, MAX_USERS, NUMBER_OF_PINS,
};

/// Driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// NVIC priority of the GPIOTE interrupt. Must not be one of the levels the
    /// SoftDevice reserves.
    pub interrupt_priority: Priority,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interrupt_priority: Priority::Level3,
        }
    }
}

/// Output pin configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutConfig {
    /// Drive the pin through a GPIOTE task channel instead of OUTSET/OUTCLR.
    pub task_pin: bool,
    /// What the task does to the pin. Ignored for plain outputs.
    pub action: Polarity,
    pub init_state: Level,
}

impl OutConfig {
    /// A plain output starting at `init_state`.
    pub const fn simple(init_state: Level) -> Self {
        Self {
            task_pin: false,
            action: Polarity::None,
            init_state,
        }
    }

    /// A task-driven output starting at `init_state`.
    pub const fn task(action: Polarity, init_state: Level) -> Self {
        Self {
            task_pin: true,
            action,
            init_state,
        }
    }
}

/// Input pin configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InConfig {
    /// Edge to report.
    pub sense: Polarity,
    /// Ignored for watchers.
    pub pull: Pull,
    /// Watch a pin that is also driven as an output: only connect its input buffer.
    pub is_watcher: bool,
    /// Use a dedicated channel instead of a low-power slot.
    pub hi_accuracy: bool,
}

impl InConfig {
    pub const fn low_to_high(hi_accuracy: bool) -> Self {
        Self::new(Polarity::LoToHi, hi_accuracy)
    }

    pub const fn high_to_low(hi_accuracy: bool) -> Self {
        Self::new(Polarity::HiToLo, hi_accuracy)
    }

    pub const fn toggle(hi_accuracy: bool) -> Self {
        Self::new(Polarity::Toggle, hi_accuracy)
    }

    const fn new(sense: Polarity, hi_accuracy: bool) -> Self {
        Self {
            sense,
            pull: Pull::None,
            is_watcher: false,
            hi_accuracy,
        }
    }

    pub const fn with_pull(mut self, pull: Pull) -> Self {
        self.pull = pull;
        self
    }
}

/// Role of a pin, derived from the pin and channel tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    Unassigned,
    OutputPlain,
    OutputTaskBound(ChannelId),
    InputChannelBound(ChannelId),
    InputPortBound(ChannelId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninitialized,
    Initialized,
}

/// GPIOTE driver: pin roles, channel allocation and interrupt dispatch.
///
/// `LOW_POWER` is the number of pins that can be watched through the PORT event
/// with a single-pin handler.
pub struct Gpiote<'a, H: Hardware, const LOW_POWER: usize = DEFAULT_LOW_POWER_CHANNELS> {
    pub(crate) hw: H,
    config: Config,
    state: State,
    pub(crate) channels: ChannelAllocator<'a, LOW_POWER>,
    pub(crate) users: Option<UserTable<'a>>,
}

impl<'a, H: Hardware, const LOW_POWER: usize> Gpiote<'a, H, LOW_POWER> {
    pub fn new(hw: H, config: Config) -> Self {
        Self {
            hw,
            config,
            state: State::Uninitialized,
            channels: ChannelAllocator::new(H::CHANNELS),
            users: None,
        }
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn channels(&self) -> &ChannelAllocator<'a, LOW_POWER> {
        &self.channels
    }

    pub fn is_init(&self) -> bool {
        self.state == State::Initialized
    }

    /// Reset the tables, enable the GPIOTE interrupt at the configured priority
    /// and enable the PORT interrupt.
    pub fn init(&mut self) -> Result<(), Error> {
        if self.is_init() {
            warn!("gpiote: already initialized");
            return Err(Error::InvalidState);
        }
        check_priority(self.config.interrupt_priority, H::PRIO_BITS, H::RESERVED_PRIORITIES)?;

        self.channels.reset();
        self.hw.irq_enable(self.config.interrupt_priority);
        self.hw.int_enable(INT_PORT_MASK);
        self.state = State::Initialized;

        debug!(
            "gpiote: initialized, {} channels, {} low-power slots",
            self.channels.channel_count(),
            LOW_POWER
        );
        Ok(())
    }

    /// Release every pin that has a role and mark the driver uninitialized.
    ///
    /// Legacy users are independent of the pin driver and stay registered and
    /// armed; the GPIOTE interrupt is turned off only when there are none. Use
    /// [`uninit_users`](Self::uninit_users) to release them.
    pub fn uninit(&mut self) -> Result<(), Error> {
        self.ensure_init()?;

        for pin in 0..NUMBER_OF_PINS as Pin {
            match self.pin_state(pin)? {
                PinState::Unassigned => {}
                PinState::OutputPlain | PinState::OutputTaskBound(_) => self.out_uninit(pin)?,
                PinState::InputChannelBound(_) | PinState::InputPortBound(_) => self.in_uninit(pin)?,
            }
        }

        // Legacy users keep the interrupt alive.
        if self.users.is_none() {
            self.hw.int_disable(INT_PORT_MASK);
            self.hw.irq_disable();
        }

        self.state = State::Uninitialized;
        debug!("gpiote: uninitialized");
        Ok(())
    }

    pub fn pin_state(&self, pin: Pin) -> Result<PinState, Error> {
        Ok(match self.channels.assignment(pin).ok_or(Error::InvalidParam)? {
            PinAssignment::Unused => PinState::Unassigned,
            PinAssignment::PlainOutput => PinState::OutputPlain,
            PinAssignment::Channel(channel) => match self.channels.slot(channel) {
                Slot::Task => PinState::OutputTaskBound(channel),
                _ if self.channels.is_high_accuracy(channel) => PinState::InputChannelBound(channel),
                _ => PinState::InputPortBound(channel),
            },
        })
    }

    // Outputs

    /// Configure `pin` as an output. Task pins take a high-accuracy channel.
    pub fn out_init(&mut self, pin: Pin, config: &OutConfig) -> Result<(), Error> {
        check_pin(pin)?;
        self.ensure_init()?;

        if config.task_pin {
            let channel = self.channels.allocate_task(pin).map_err(|e| {
                warn!("gpiote: no channel for output pin {}: {:?}", pin, e);
                e
            })?;
            self.hw
                .task_configure(channel.index(), pin, config.action, config.init_state);
        } else {
            self.channels.set_plain_output(pin)?;
        }

        self.hw.cfg_output(pin);
        match config.init_state {
            Level::High => self.hw.pin_set(pin),
            Level::Low => self.hw.pin_clear(pin),
        }
        Ok(())
    }

    pub fn out_uninit(&mut self, pin: Pin) -> Result<(), Error> {
        match self.pin_state(pin)? {
            PinState::OutputPlain => {}
            PinState::OutputTaskBound(channel) => {
                self.hw.task_disable(channel.index());
                self.hw.te_default(channel.index());
                self.channels.free(channel);
            }
            _ => return Err(Error::InvalidState),
        }
        self.hw.cfg_default(pin);
        self.channels.clear(pin);
        Ok(())
    }

    pub fn out_set(&mut self, pin: Pin) -> Result<(), Error> {
        self.plain_output(pin)?;
        self.hw.pin_set(pin);
        Ok(())
    }

    pub fn out_clear(&mut self, pin: Pin) -> Result<(), Error> {
        self.plain_output(pin)?;
        self.hw.pin_clear(pin);
        Ok(())
    }

    pub fn out_toggle(&mut self, pin: Pin) -> Result<(), Error> {
        self.plain_output(pin)?;
        self.hw.pin_toggle(pin);
        Ok(())
    }

    pub fn out_task_enable(&mut self, pin: Pin) -> Result<(), Error> {
        let channel = self.task_channel(pin)?;
        self.hw.task_enable(channel.index());
        Ok(())
    }

    pub fn out_task_disable(&mut self, pin: Pin) -> Result<(), Error> {
        let channel = self.task_channel(pin)?;
        self.hw.task_disable(channel.index());
        Ok(())
    }

    /// Address of the task register, for wiring through PPI.
    pub fn out_task_addr(&self, pin: Pin) -> Result<u32, Error> {
        let channel = self.task_channel(pin)?;
        Ok(self.hw.task_address(channel.index()))
    }

    pub fn out_task_force(&mut self, pin: Pin, level: Level) -> Result<(), Error> {
        let channel = self.task_channel(pin)?;
        self.hw.task_force(channel.index(), level);
        Ok(())
    }

    pub fn out_task_trigger(&mut self, pin: Pin) -> Result<(), Error> {
        let channel = self.task_channel(pin)?;
        self.hw.task_trigger(channel.index());
        Ok(())
    }

    // Inputs

    /// Bind `pin` to a channel of the class `config` asks for and configure it.
    /// Events stay off until [`in_event_enable`](Self::in_event_enable).
    pub fn in_init(
        &mut self,
        pin: Pin,
        config: &InConfig,
        handler: Option<&'a dyn EdgeHandler>,
    ) -> Result<(), Error> {
        check_pin(pin)?;
        self.ensure_init()?;

        let channel = self
            .channels
            .allocate(pin, handler, config.hi_accuracy)
            .map_err(|e| {
                warn!("gpiote: cannot bind input pin {}: {:?}", pin, e);
                e
            })?;

        if config.is_watcher {
            self.hw.cfg_watcher(pin);
        } else {
            self.hw.cfg_input(pin, config.pull);
        }

        if config.hi_accuracy {
            self.hw.event_configure(channel.index(), pin, config.sense);
        } else {
            self.channels.set_port_polarity(channel, config.sense);
        }
        Ok(())
    }

    pub fn in_uninit(&mut self, pin: Pin) -> Result<(), Error> {
        let state = self.pin_state(pin)?;
        self.in_event_disable(pin)?;

        let channel = match state {
            PinState::InputChannelBound(channel) => {
                self.hw.te_default(channel.index());
                channel
            }
            PinState::InputPortBound(channel) => channel,
            _ => return Err(Error::InvalidState),
        };

        self.hw.cfg_default(pin);
        self.channels.free(channel);
        self.channels.clear(pin);
        Ok(())
    }

    /// Start reporting edges of an input pin.
    ///
    /// A low-power toggle pin is armed for the level opposite to the one it
    /// reads now. `int_enable` only matters for high-accuracy pins with a handler.
    pub fn in_event_enable(&mut self, pin: Pin, int_enable: bool) -> Result<(), Error> {
        match self.pin_state(pin)? {
            PinState::InputPortBound(channel) => {
                let polarity = self
                    .channels
                    .port_binding(channel)
                    .map_or(Polarity::None, |binding| binding.polarity);
                let sense = match polarity {
                    Polarity::Toggle if self.hw.pins_read() & (1 << pin) != 0 => Sense::Low,
                    Polarity::Toggle => Sense::High,
                    Polarity::LoToHi => Sense::High,
                    _ => Sense::Low,
                };
                self.hw.sense_set(pin, sense);
            }
            PinState::InputChannelBound(channel) => {
                let index = channel.index();
                self.hw.event_enable(index);
                self.hw.event_clear(Event::In(index));
                if int_enable && self.channels.handler(channel).is_some() {
                    self.hw.int_enable(1 << index);
                }
            }
            _ => return Err(Error::InvalidState),
        }
        Ok(())
    }

    pub fn in_event_disable(&mut self, pin: Pin) -> Result<(), Error> {
        match self.pin_state(pin)? {
            PinState::InputPortBound(_) => self.hw.sense_set(pin, Sense::Disabled),
            PinState::InputChannelBound(channel) => {
                self.hw.event_disable(channel.index());
                self.hw.int_disable(1 << channel.index());
            }
            _ => return Err(Error::InvalidState),
        }
        Ok(())
    }

    pub fn in_is_set(&self, pin: Pin) -> Result<bool, Error> {
        check_pin(pin)?;
        Ok(self.hw.pins_read() & (1 << pin) != 0)
    }

    /// Address of the event register, for wiring through PPI.
    pub fn in_event_addr(&self, pin: Pin) -> Result<u32, Error> {
        match self.pin_state(pin)? {
            PinState::InputChannelBound(channel) => Ok(self.hw.event_address(channel.index())),
            _ => Err(Error::InvalidState),
        }
    }

    // Legacy users

    /// Hand over storage for up to `max_users` mask-based users.
    ///
    /// Enables the GPIOTE interrupt; the PORT interrupt follows the first enabled user.
    pub fn init_users(&mut self, buffer: &'a mut [GpioteUser<'a>], max_users: usize) -> Result<(), Error> {
        if max_users > buffer.len() || max_users > MAX_USERS {
            return Err(Error::InvalidParam);
        }
        if self.users.is_some() {
            return Err(Error::InvalidState);
        }
        check_priority(self.config.interrupt_priority, H::PRIO_BITS, H::RESERVED_PRIORITIES)?;

        let (users, _) = buffer.split_at_mut(max_users);
        self.users = Some(UserTable::new(users));

        if !self.is_init() {
            self.hw.int_disable(u32::MAX);
        }
        self.hw.irq_enable(self.config.interrupt_priority);

        debug!("gpiote: room for {} users", max_users);
        Ok(())
    }

    /// Register a group of pins. Their sense is disabled until the user is enabled.
    pub fn register_user(
        &mut self,
        low_to_high_mask: u32,
        high_to_low_mask: u32,
        handler: &'a dyn PortHandler,
    ) -> Result<UserId, Error> {
        let table = self.users.as_mut().ok_or(Error::InvalidState)?;
        let pins_mask = low_to_high_mask | high_to_low_mask;
        if pins_mask == 0 {
            return Err(Error::InvalidParam);
        }
        if table.count >= table.users.len() {
            warn!("gpiote: no room for another user");
            return Err(Error::NoMem);
        }

        let id = UserId(table.count as u8);
        table.users[table.count] = GpioteUser {
            pins_mask,
            low_to_high_mask,
            high_to_low_mask,
            sense_high_pins: 0,
            handler: Some(handler),
        };
        table.count += 1;

        for pin in pins(pins_mask) {
            self.hw.sense_set(pin, Sense::Disabled);
        }

        trace!("gpiote: user {} registered for pins {:x}", id.0, pins_mask);
        Ok(id)
    }

    /// Arm sense on every pin of the user, each for the level opposite to the
    /// one it reads now.
    pub fn enable_user(&mut self, user: UserId) -> Result<(), Error> {
        let table = self.users.as_mut().ok_or(Error::InvalidState)?;
        if user.index() >= table.count {
            return Err(Error::InvalidParam);
        }

        self.hw.event_clear(Event::Port);
        let pins_state = self.hw.pins_read();

        if table.enabled == 0 {
            self.hw.int_enable(INT_PORT_MASK);
        }
        table.enabled |= 1 << user.index();

        let entry = &mut table.users[user.index()];
        entry.sense_high_pins = 0;
        for pin in pins(entry.pins_mask) {
            if pins_state & (1 << pin) != 0 {
                self.hw.sense_set(pin, Sense::Low);
            } else {
                self.hw.sense_set(pin, Sense::High);
                entry.sense_high_pins |= 1 << pin;
            }
        }
        Ok(())
    }

    pub fn disable_user(&mut self, user: UserId) -> Result<(), Error> {
        let table = self.users.as_mut().ok_or(Error::InvalidState)?;
        let entry = table.get(user).ok_or(Error::InvalidParam)?;

        for pin in pins(entry.pins_mask) {
            self.hw.sense_set(pin, Sense::Disabled);
        }

        table.enabled &= !(1 << user.index());
        if table.enabled == 0 && !self.is_init() {
            self.hw.int_disable(INT_PORT_MASK);
        }
        Ok(())
    }

    /// Current level of the user's pins, as a mask.
    pub fn user_pins_state(&self, user: UserId) -> Result<u32, Error> {
        let table = self.users.as_ref().ok_or(Error::InvalidState)?;
        let entry = table.get(user).ok_or(Error::InvalidParam)?;
        Ok(self.hw.pins_read() & entry.pins_mask)
    }

    pub fn user(&self, user: UserId) -> Option<&GpioteUser<'a>> {
        self.users.as_ref()?.get(user)
    }

    /// Disarm every legacy user and give up the user storage.
    ///
    /// The PORT interrupt and the GPIOTE interrupt are turned off unless the pin
    /// driver is still initialized.
    pub fn uninit_users(&mut self) -> Result<(), Error> {
        let table = self.users.take().ok_or(Error::InvalidState)?;

        for index in 0..table.count {
            if table.is_enabled(index) {
                for pin in pins(table.users[index].pins_mask) {
                    self.hw.sense_set(pin, Sense::Disabled);
                }
            }
        }

        if !self.is_init() {
            self.hw.int_disable(INT_PORT_MASK);
            self.hw.irq_disable();
        }

        debug!("gpiote: users released");
        Ok(())
    }

    fn ensure_init(&self) -> Result<(), Error> {
        if self.is_init() {
            Ok(())
        } else {
            Err(Error::InvalidState)
        }
    }

    fn plain_output(&self, pin: Pin) -> Result<(), Error> {
        match self.pin_state(pin)? {
            PinState::OutputPlain => Ok(()),
            _ => Err(Error::InvalidState),
        }
    }

    fn task_channel(&self, pin: Pin) -> Result<ChannelId, Error> {
        match self.pin_state(pin)? {
            PinState::OutputTaskBound(channel) => Ok(channel),
            _ => Err(Error::InvalidState),
        }
    }
}

fn check_pin(pin: Pin) -> Result<(), Error> {
    if (pin as usize) < NUMBER_OF_PINS {
        Ok(())
    } else {
        Err(Error::InvalidParam)
    }
}
