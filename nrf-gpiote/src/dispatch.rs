use crate::{pins, ChannelId, Event, Gpiote, Hardware, Polarity, Sense, INT_IN_MASK, INT_PORT_MASK};

impl<'a, H: Hardware, const LOW_POWER: usize> Gpiote<'a, H, LOW_POWER> {
    /// Service the GPIOTE interrupt. Call this from the `GPIOTE` vector.
    ///
    /// All pending events are collected and cleared first. Then high-accuracy
    /// channels are reported in ascending order, then low-power slots, then
    /// legacy users.
    pub fn on_interrupt(&mut self) {
        let mut status = 0u32;
        let mut input = 0u32;

        for index in 0..self.channels.channel_count() {
            let mask = 1 << index;
            if self.hw.event_is_set(Event::In(index)) && self.hw.int_is_enabled(mask) {
                self.hw.event_clear(Event::In(index));
                status |= mask;
            }
        }

        if self.hw.event_is_set(Event::Port) {
            self.hw.event_clear(Event::Port);
            status |= INT_PORT_MASK;
            input = self.hw.pins_read();
        }

        trace!("gpiote: irq status {:x} input {:x}", status, input);

        if status & INT_IN_MASK != 0 {
            self.dispatch_channels(status);
        }
        if status & INT_PORT_MASK != 0 {
            self.dispatch_port_slots(input);
            self.dispatch_users(input);
        }
    }

    fn dispatch_channels(&self, status: u32) {
        for index in 0..self.channels.channel_count() {
            if status & (1 << index) == 0 {
                continue;
            }
            if let Some(handler) = self.channels.handler(ChannelId(index as u8)) {
                handler.on_edge(self.hw.event_pin(index), self.hw.event_polarity(index));
            }
        }
    }

    fn dispatch_port_slots(&self, input: u32) {
        for (binding, handler) in self.channels.port_slots() {
            let pin = binding.pin;
            let high = input & (1 << pin) != 0;
            let sense = self.hw.sense_get(pin);

            let fired = match sense {
                Sense::High => high,
                Sense::Low => !high,
                Sense::Disabled => false,
            };
            if !fired {
                continue;
            }

            // Toggle pins report the edge that actually happened and re-arm for the next one.
            let polarity = if binding.polarity == Polarity::Toggle {
                if sense == Sense::High {
                    self.hw.sense_set(pin, Sense::Low);
                    Polarity::LoToHi
                } else {
                    self.hw.sense_set(pin, Sense::High);
                    Polarity::HiToLo
                }
            } else {
                binding.polarity
            };

            if let Some(handler) = handler {
                handler.on_edge(pin, polarity);
            }
        }
    }

    /// Report legacy user transitions until the sense-enabled pins stop changing.
    ///
    /// Pins are disarmed as their transition is reported, so an edge that lands
    /// while handlers run is seen on the next pass. Disarmed pins are re-armed in
    /// the opposite direction at the end; if such a pin already moved back, DETECT
    /// rises again and the return edge arrives with the next PORT event.
    fn dispatch_users(&mut self, input: u32) {
        let Some(table) = self.users.as_mut() else {
            return;
        };
        if table.enabled == 0 {
            return;
        }

        let mut pins_state = input;
        let mut sense_enabled = 0u32;
        let mut sense_disabled = 0u32;

        loop {
            for index in 0..table.count {
                if !table.is_enabled(index) {
                    continue;
                }
                let user = table.users[index];
                let watched = user.pins_mask & !sense_disabled;
                sense_enabled |= watched;

                let transitions = (pins_state ^ !user.sense_high_pins) & watched;
                for pin in pins(transitions) {
                    self.hw.sense_set(pin, Sense::Disabled);
                }
                sense_disabled |= transitions;
                sense_enabled &= !sense_disabled;

                let low_to_high = pins_state & user.low_to_high_mask & transitions;
                let high_to_low = !pins_state & user.high_to_low_mask & transitions;
                if low_to_high | high_to_low != 0 {
                    if let Some(handler) = user.handler {
                        handler.on_port_event(low_to_high, high_to_low);
                    }
                }
            }

            let changed = (self.hw.pins_read() ^ pins_state) & sense_enabled;
            if changed == 0 {
                break;
            }
            trace!("gpiote: pins {:x} changed during dispatch", changed);
            pins_state ^= changed;
        }

        for index in 0..table.count {
            if !table.is_enabled(index) {
                continue;
            }
            let user = &mut table.users[index];
            for pin in pins(sense_disabled & user.pins_mask) {
                let sense = if user.toggle_sense(pin) { Sense::High } else { Sense::Low };
                self.hw.sense_set(pin, sense);
            }
        }
    }
}
