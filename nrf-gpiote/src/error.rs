use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Status code of a successful operation.
pub const NRF_SUCCESS: u32 = 0;

/// Errors returned by the configuration-time operations.
///
/// The discriminants are the `NRF_ERROR_*` codes the SoftDevice SDK uses, so a
/// result can be handed to C code or logged next to SoftDevice errors.
#[rustfmt::skip]
#[repr(u32)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, IntoPrimitive, TryFromPrimitive)]
pub enum Error {
    /// A fixed-size table (channels or users) is full.
    NoMem = 4,
    /// Out-of-range pin or user id, empty mask, or unusable configuration.
    InvalidParam = 7,
    /// The driver is not initialized, or the pin is not in the role the operation needs.
    InvalidState = 8,
}

impl Error {
    /// Map a raw status code to a result. Codes this driver never produces map to
    /// [`Error::InvalidState`].
    pub fn convert(ret: u32) -> Result<(), Error> {
        if ret == NRF_SUCCESS {
            Ok(())
        } else {
            Err(Error::try_from_primitive(ret).unwrap_or(Error::InvalidState))
        }
    }
}

/// Raw status code of a result.
pub fn code<T>(result: &Result<T, Error>) -> u32 {
    match result {
        Ok(_) => NRF_SUCCESS,
        Err(e) => (*e).into(),
    }
}
