use crate::Pin;

/// Receives the transitions of a legacy user's pins.
///
/// Both arguments are pin masks. Called from the GPIOTE interrupt, so it must
/// not call back into the driver. Shared with interrupt context, hence `Sync`.
///
/// ```compile_fail
/// use core::cell::Cell;
/// use nrf_gpiote::PortHandler;
///
/// struct Last(Cell<u32>);
///
/// impl PortHandler for Last {
///     fn on_port_event(&self, low_to_high: u32, _high_to_low: u32) {
///         self.0.set(low_to_high);
///     }
/// }
/// ```
pub trait PortHandler: Sync {
    fn on_port_event(&self, low_to_high: u32, high_to_low: u32);
}

impl<F: Fn(u32, u32) + Sync> PortHandler for F {
    fn on_port_event(&self, low_to_high: u32, high_to_low: u32) {
        self(low_to_high, high_to_low)
    }
}

/// Identifier returned by [`Gpiote::register_user`](crate::Gpiote::register_user).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UserId(pub(crate) u8);

impl UserId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A registered group of pins reported together.
///
/// Storage for these is supplied by the application through
/// [`Gpiote::init_users`](crate::Gpiote::init_users).
#[derive(Clone, Copy)]
pub struct GpioteUser<'a> {
    pub(crate) pins_mask: u32,
    pub(crate) low_to_high_mask: u32,
    pub(crate) high_to_low_mask: u32,
    /// Pins whose sense is currently armed high.
    pub(crate) sense_high_pins: u32,
    pub(crate) handler: Option<&'a dyn PortHandler>,
}

impl<'a> GpioteUser<'a> {
    pub const EMPTY: Self = Self {
        pins_mask: 0,
        low_to_high_mask: 0,
        high_to_low_mask: 0,
        sense_high_pins: 0,
        handler: None,
    };

    pub fn pins_mask(&self) -> u32 {
        self.pins_mask
    }

    pub fn sense_high_pins(&self) -> u32 {
        self.sense_high_pins
    }

    /// Flip the recorded sense direction of `pin`, returning whether it is now high.
    pub(crate) fn toggle_sense(&mut self, pin: Pin) -> bool {
        self.sense_high_pins ^= 1 << pin;
        self.sense_high_pins & (1 << pin) != 0
    }
}

impl<'a> Default for GpioteUser<'a> {
    fn default() -> Self {
        Self::EMPTY
    }
}

pub(crate) struct UserTable<'a> {
    pub(crate) users: &'a mut [GpioteUser<'a>],
    pub(crate) count: usize,
    /// One bit per user id.
    pub(crate) enabled: u32,
}

impl<'a> UserTable<'a> {
    pub(crate) fn new(users: &'a mut [GpioteUser<'a>]) -> Self {
        users.fill(GpioteUser::EMPTY);
        Self {
            users,
            count: 0,
            enabled: 0,
        }
    }

    pub(crate) fn get(&self, user: UserId) -> Option<&GpioteUser<'a>> {
        self.users[..self.count].get(user.index())
    }

    pub(crate) fn is_enabled(&self, index: usize) -> bool {
        self.enabled & (1 << index) != 0
    }
}
