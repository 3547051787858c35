//! Event sink that renders domain events onto the log facade.
//!
//! Always attached — the serial console stays useful whether or not an
//! uplink exists.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("sampler started"),
            AppEvent::SampleTaken(s) => {
                info!(
                    "{} slot {:02}: {:.3} A, {:.1} V{}",
                    s.timestamp,
                    s.slot,
                    s.amps,
                    s.volts,
                    if s.parked { " [parked]" } else { "" }
                );
            }
            AppEvent::BatchComplete { batch, parked } => {
                info!("batch {} complete (parked={})", batch, parked);
            }
            AppEvent::Fault { kind, error } => match kind {
                Some(k) => warn!("fault on {} channel: {}", k.prefix(), error),
                None => warn!("fault: {}", error),
            },
        }
    }
}
