//! NVIC priority levels and the levels a SoftDevice keeps for itself.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::Error;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Priority {
    Level0 = 0,
    Level1 = 1,
    Level2 = 2,
    Level3 = 3,
    Level4 = 4,
    Level5 = 5,
    Level6 = 6,
    Level7 = 7,
}

/// Levels S110/S130 reserve on nRF51 (2 priority bits).
pub const NRF51_RESERVED_PRIORITIES: [Priority; 2] = [Priority::Level0, Priority::Level2];

/// Levels S132/S140 reserve on nRF52 (3 priority bits).
pub const NRF52_RESERVED_PRIORITIES: [Priority; 3] = [Priority::Level0, Priority::Level1, Priority::Level4];

impl Priority {
    #[inline]
    pub fn to_nvic(self, prio_bits: u8) -> u8 {
        (self as u8) << (8 - prio_bits)
    }

    #[inline]
    pub fn from_nvic(priority: u8, prio_bits: u8) -> Self {
        Self::try_from_primitive(priority >> (8 - prio_bits)).unwrap_or(Self::Level7)
    }

    /// Whether the level exists on an NVIC with `prio_bits` bits and is not one
    /// of the `reserved` levels.
    pub fn is_app_accessible(self, prio_bits: u8, reserved: &[Priority]) -> bool {
        (self as u8) < (1 << prio_bits) && !reserved.contains(&self)
    }
}

pub(crate) fn check_priority(priority: Priority, prio_bits: u8, reserved: &[Priority]) -> Result<(), Error> {
    if priority.is_app_accessible(prio_bits, reserved) {
        Ok(())
    } else {
        warn!("gpiote: interrupt priority {:?} is reserved or out of range", priority);
        Err(Error::InvalidParam)
    }
}
