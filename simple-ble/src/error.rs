#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Advertising data does not fit the payload.
    Oversize { expected: usize },
    /// Advertising or connection interval outside what the link layer accepts.
    InvalidInterval,
    /// Minimum connection interval above the maximum.
    IntervalOrder,
    /// Device name longer than the GAP name characteristic.
    NameTooLong,
    /// Pairing parameters the stack cannot offer.
    UnsupportedSecurity,
}
