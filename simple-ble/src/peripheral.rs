/// Connectability of the advertising set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvMode {
    /// `ADV_IND`
    Connectable,
    /// `ADV_NONCONN_IND`
    NonConnectable,
}

/// Stack events the peripheral reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleEvent {
    Connected { conn_handle: u16 },
    Disconnected,
    AdvertisingTimeout,
}

/// What the stack should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Start advertising; any advertising already running has ended.
    Advertise(AdvMode),
    /// Stop the current advertising set, then start it again.
    RestartAdvertising(AdvMode),
    SystemOff,
}

/// Connection state of the peripheral.
///
/// While a central is connected the device keeps advertising, but
/// non-connectably; when it leaves, connectable advertising resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Peripheral {
    conn_handle: Option<u16>,
    mode: AdvMode,
}

impl Default for Peripheral {
    fn default() -> Self {
        Self::new()
    }
}

impl Peripheral {
    pub const fn new() -> Self {
        Self {
            conn_handle: None,
            mode: AdvMode::Connectable,
        }
    }

    /// Handle of the current connection, `None` when not connected.
    pub fn conn_handle(&self) -> Option<u16> {
        self.conn_handle
    }

    pub fn adv_mode(&self) -> AdvMode {
        self.mode
    }

    pub fn start(&self) -> Action {
        Action::Advertise(self.mode)
    }

    pub fn on_event(&mut self, event: BleEvent) -> Action {
        match event {
            BleEvent::Connected { conn_handle } => {
                debug!("ble: connected, handle {}", conn_handle);
                self.conn_handle = Some(conn_handle);
                self.mode = AdvMode::NonConnectable;
                Action::Advertise(self.mode)
            }
            BleEvent::Disconnected => {
                debug!("ble: disconnected");
                self.conn_handle = None;
                self.mode = AdvMode::Connectable;
                Action::RestartAdvertising(self.mode)
            }
            BleEvent::AdvertisingTimeout => {
                info!("ble: advertising timed out, powering off");
                Action::SystemOff
            }
        }
    }
}
