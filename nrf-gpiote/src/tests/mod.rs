mod mock;

mod allocator;
mod shared;
mod users;

use std::mem;
use std::sync::Mutex;
use std::vec::Vec;

use crate::{Config, Gpiote, Pin, Polarity};

pub(crate) use mock::MockHardware;

pub(crate) fn init_gpiote<'a>(hw: &MockHardware) -> Gpiote<'a, MockHardware> {
    let mut gpiote = Gpiote::new(hw.clone(), Config::default());
    gpiote.init().unwrap();
    gpiote
}

/// Records every edge it is handed.
#[derive(Default)]
pub(crate) struct EdgeLog(Mutex<Vec<(Pin, Polarity)>>);

impl EdgeLog {
    pub(crate) fn record(&self, pin: Pin, polarity: Polarity) {
        self.0.lock().unwrap().push((pin, polarity));
    }

    pub(crate) fn take(&self) -> Vec<(Pin, Polarity)> {
        mem::take(&mut *self.0.lock().unwrap())
    }
}

/// Records every (low-to-high, high-to-low) pair it is handed.
#[derive(Default)]
pub(crate) struct PortLog(Mutex<Vec<(u32, u32)>>);

impl PortLog {
    pub(crate) fn record(&self, low_to_high: u32, high_to_low: u32) {
        self.0.lock().unwrap().push((low_to_high, high_to_low));
    }

    pub(crate) fn take(&self) -> Vec<(u32, u32)> {
        mem::take(&mut *self.0.lock().unwrap())
    }
}
