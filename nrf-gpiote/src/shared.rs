use core::cell::RefCell;

use critical_section::Mutex;

use crate::{Error, Gpiote, Hardware, DEFAULT_LOW_POWER_CHANNELS};

/// A [`Gpiote`] that thread mode and the GPIOTE interrupt can both reach.
///
/// Every access runs inside a critical section. Handlers are called from
/// [`on_interrupt`](Self::on_interrupt) while the driver is borrowed, so they
/// must not use this `SharedGpiote` themselves.
///
/// It is `Sync`, and so usable from a `static`, when the hardware is `Send`;
/// edge and port handlers are always `Sync`.
///
/// ```ignore
/// static GPIOTE: SharedGpiote<'static, PacHardware> = SharedGpiote::new();
///
/// #[interrupt]
/// fn GPIOTE() {
///     GPIOTE.on_interrupt();
/// }
/// ```
pub struct SharedGpiote<'a, H: Hardware, const LOW_POWER: usize = DEFAULT_LOW_POWER_CHANNELS> {
    inner: Mutex<RefCell<Option<Gpiote<'a, H, LOW_POWER>>>>,
}

impl<'a, H: Hardware, const LOW_POWER: usize> SharedGpiote<'a, H, LOW_POWER> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Store a driver. Fails with [`Error::InvalidState`] if one is already installed.
    pub fn install(&self, gpiote: Gpiote<'a, H, LOW_POWER>) -> Result<(), Error> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).borrow_mut();
            if slot.is_some() {
                return Err(Error::InvalidState);
            }
            *slot = Some(gpiote);
            Ok(())
        })
    }

    pub fn take(&self) -> Option<Gpiote<'a, H, LOW_POWER>> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().take())
    }

    /// Run `f` on the installed driver. Returns `None` when nothing is installed.
    pub fn with<R>(&self, f: impl FnOnce(&mut Gpiote<'a, H, LOW_POWER>) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().as_mut().map(f))
    }

    pub fn on_interrupt(&self) {
        if self.with(Gpiote::on_interrupt).is_none() {
            trace!("gpiote: interrupt with no driver installed");
        }
    }
}

impl<'a, H: Hardware, const LOW_POWER: usize> Default for SharedGpiote<'a, H, LOW_POWER> {
    fn default() -> Self {
        Self::new()
    }
}
