//! Integration tests: SamplerService → ports, driven by mock adapters.

use std::collections::HashMap;

use leakwatch::app::events::AppEvent;
use leakwatch::app::ports::{
    AnalogPort, ClockPort, EventSink, LinkPort, RelayPort, StoragePort,
};
use leakwatch::app::service::SamplerService;
use leakwatch::clock::CalendarTime;
use leakwatch::config::SystemConfig;
use leakwatch::{CommsError, Error, StorageError};
use leakwatch::logwriter::MeasureKind;

// ── Mock implementations ──────────────────────────────────────

/// Analog + clock halves of the rig. The clock advances one second per
/// read, mirroring the 1 Hz cadence.
struct MockHw {
    amps: f32,
    volts: f32,
    unix_secs: i64,
}

impl MockHw {
    fn new(amps: f32) -> Self {
        Self {
            amps,
            volts: 12.6,
            // 2023-11-14 22:13:20 UTC
            unix_secs: 1_700_000_000,
        }
    }
}

impl AnalogPort for MockHw {
    fn read_current(&mut self) -> f32 {
        self.amps
    }
    fn read_voltage(&mut self) -> f32 {
        self.volts
    }
}

impl ClockPort for MockHw {
    fn now(&mut self) -> CalendarTime {
        let t = CalendarTime::from_unix(self.unix_secs);
        self.unix_secs += 1;
        t
    }
}

struct MockNet {
    link_up: bool,
    publish_ok: bool,
    published: Vec<(String, String)>,
}

impl MockNet {
    fn new(link_up: bool) -> Self {
        Self {
            link_up,
            publish_ok: true,
            published: Vec::new(),
        }
    }

    fn topics(&self) -> Vec<&str> {
        self.published.iter().map(|(t, _)| t.as_str()).collect()
    }
}

impl LinkPort for MockNet {
    fn is_connected(&self) -> bool {
        self.link_up
    }
}

impl RelayPort for MockNet {
    fn publish(&mut self, topic: &str, payload: &str) -> bool {
        if self.publish_ok {
            self.published.push((topic.to_string(), payload.to_string()));
        }
        self.publish_ok
    }
}

#[derive(Default)]
struct MockSd {
    files: HashMap<String, Vec<u8>>,
    open: Option<String>,
    /// Writes to files starting with this prefix fail.
    fail_prefix: Option<&'static str>,
}

impl StoragePort for MockSd {
    fn open_append(&mut self, name: &str) -> Result<(), StorageError> {
        self.files.entry(name.to_string()).or_default();
        self.open = Some(name.to_string());
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        let Some(name) = self.open.clone() else {
            return Err(StorageError::WriteFailed);
        };
        if self.fail_prefix.is_some_and(|p| name.starts_with(p)) {
            return Err(StorageError::WriteFailed);
        }
        self.files
            .get_mut(&name)
            .ok_or(StorageError::WriteFailed)?
            .extend_from_slice(data);
        Ok(())
    }

    fn close(&mut self) {
        self.open = None;
    }

    fn reinit(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn file_size(&mut self, name: &str) -> Result<u64, StorageError> {
        self.files
            .get(name)
            .map(|v| v.len() as u64)
            .ok_or(StorageError::NotFound)
    }
}

#[derive(Default)]
struct Recorder {
    events: Vec<AppEvent>,
}

impl Recorder {
    fn faults(&self) -> Vec<(Option<MeasureKind>, Error)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Fault { kind, error } => Some((*kind, *error)),
                _ => None,
            })
            .collect()
    }

    fn batches(&self) -> Vec<u64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::BatchComplete { batch, .. } => Some(*batch),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for Recorder {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

fn config_with_confirmation(secs: u32) -> SystemConfig {
    SystemConfig {
        parked_confirmation_secs: secs,
        ..SystemConfig::default()
    }
}

struct Rig {
    service: SamplerService,
    hw: MockHw,
    sd: MockSd,
    net: MockNet,
    sink: Recorder,
}

impl Rig {
    fn new(config: &SystemConfig, amps: f32, link_up: bool) -> Self {
        Self {
            service: SamplerService::new(config),
            hw: MockHw::new(amps),
            sd: MockSd::default(),
            net: MockNet::new(link_up),
            sink: Recorder::default(),
        }
    }

    fn tick(&mut self, now_ms: u64) -> bool {
        self.service
            .tick(now_ms, &mut self.hw, &mut self.sd, &mut self.net, &mut self.sink)
    }

    /// Run `n` samples at exact 1 s spacing starting from `start_ms`.
    fn run(&mut self, start_ms: u64, n: u64) {
        for i in 0..n {
            assert!(self.tick(start_ms + i * 1000));
        }
    }
}

// ── Cadence ───────────────────────────────────────────────────

#[test]
fn first_tick_fires_immediately() {
    let mut rig = Rig::new(&SystemConfig::default(), 0.1, false);
    assert!(rig.tick(5_000));
    assert_eq!(rig.service.sample_count(), 1);
}

#[test]
fn ticks_within_the_interval_do_not_fire() {
    let mut rig = Rig::new(&SystemConfig::default(), 0.1, false);
    assert!(rig.tick(0));
    assert!(!rig.tick(500));
    assert!(!rig.tick(999));
    assert!(rig.tick(1000));
    assert_eq!(rig.service.sample_count(), 2);
}

#[test]
fn late_sample_shifts_phase_without_accumulating_lag() {
    let mut rig = Rig::new(&SystemConfig::default(), 0.1, false);
    assert!(rig.tick(0));
    // A slow SD write delays this sample by 600 ms.
    assert!(rig.tick(1600));
    // The next interval counts from when the late sample fired.
    assert!(!rig.tick(2500));
    assert!(rig.tick(2600));
}

// ── Batches ───────────────────────────────────────────────────

#[test]
fn sixty_samples_complete_one_batch() {
    let mut rig = Rig::new(&SystemConfig::default(), 0.1, false);
    rig.run(0, 59);
    assert_eq!(rig.service.slot(), 59);
    assert!(rig.sink.batches().is_empty());

    rig.run(59_000, 1);
    assert_eq!(rig.service.slot(), 0);
    assert_eq!(rig.service.batches_completed(), 1);
    assert_eq!(rig.sink.batches(), vec![1]);
}

#[test]
fn batch_lines_are_framed_in_the_day_files() {
    let mut rig = Rig::new(&SystemConfig::default(), 0.25, false);
    rig.run(0, 60);

    // Both channels wrote a file for the day the mock clock lives in.
    let amps = rig
        .sd
        .files
        .iter()
        .find(|(name, _)| name.starts_with("Amps "))
        .map(|(_, v)| String::from_utf8(v.clone()).unwrap())
        .unwrap();
    assert!(amps.starts_with('\n'));
    assert!(amps.contains(" --> 0.250, "));
    assert!(amps.ends_with("0.250\n"));
    assert!(rig.sd.files.keys().any(|n| n.starts_with("Volts ")));
}

// ── Parked gate through the service ───────────────────────────

#[test]
fn parked_confirms_after_the_full_window() {
    let mut rig = Rig::new(&config_with_confirmation(5), 0.1, false);
    rig.run(0, 4);
    assert!(!rig.service.is_parked());
    rig.run(4_000, 1);
    assert!(rig.service.is_parked());
}

#[test]
fn motion_resets_the_confirmation() {
    let mut rig = Rig::new(&config_with_confirmation(5), 0.1, false);
    rig.run(0, 4);
    rig.hw.amps = 2.0;
    rig.run(4_000, 1);
    assert!(!rig.service.is_parked());
    assert_eq!(rig.service.connectivity(false).confirmation_counter, 0);
}

// ── Publishing ────────────────────────────────────────────────

#[test]
fn publishes_only_once_parked() {
    let mut rig = Rig::new(&config_with_confirmation(3), 0.0, true);
    rig.run(0, 2);
    assert!(rig.net.published.is_empty());

    // Third quiet sample confirms parked; its own tick already publishes.
    rig.run(2_000, 1);
    let topics = rig.net.topics();
    assert!(topics.contains(&"leakwatch/current"));
    assert!(topics.contains(&"leakwatch/voltage"));
}

#[test]
fn no_publish_without_a_link() {
    let mut rig = Rig::new(&config_with_confirmation(2), 0.0, false);
    rig.run(0, 10);
    assert!(rig.service.is_parked());
    assert!(rig.net.published.is_empty());
}

#[test]
fn publish_failure_raises_faults_but_logging_continues() {
    let mut rig = Rig::new(&config_with_confirmation(1), 0.0, true);
    rig.net.publish_ok = false;
    rig.run(0, 2);

    let faults = rig.sink.faults();
    assert!(faults
        .iter()
        .any(|(k, e)| *k == Some(MeasureKind::Current)
            && matches!(e, Error::Comms(CommsError::MqttPublishFailed))));
    assert!(faults
        .iter()
        .any(|(k, _)| *k == Some(MeasureKind::Voltage)));
    // The day-files are untouched by the relay's trouble.
    assert!(rig.sd.files.values().all(|v| !v.is_empty()));
}

#[test]
fn batch_close_publishes_a_status_message() {
    let mut rig = Rig::new(&config_with_confirmation(1), 0.0, true);
    rig.run(0, 60);
    assert!(rig.net.topics().contains(&"leakwatch/status"));
}

// ── Failure independence ──────────────────────────────────────

#[test]
fn invalid_clock_skips_logging_but_keeps_the_cadence() {
    let mut rig = Rig::new(&SystemConfig::default(), 0.1, false);
    rig.hw.unix_secs = 0; // RTC lost its charge: 1970.
    rig.run(0, 5);

    assert!(rig.sd.files.is_empty());
    assert_eq!(rig.service.sample_count(), 5);
    assert_eq!(rig.service.slot(), 5);
    let faults = rig.sink.faults();
    assert_eq!(faults.len(), 5);
    assert!(faults
        .iter()
        .all(|(k, e)| k.is_none() && matches!(e, Error::Clock(_))));
}

#[test]
fn storage_fault_on_one_channel_leaves_the_other_intact() {
    let mut rig = Rig::new(&SystemConfig::default(), 0.1, false);
    rig.sd.fail_prefix = Some("Amps");
    rig.run(0, 3);

    let faults = rig.sink.faults();
    assert!(faults
        .iter()
        .any(|(k, e)| *k == Some(MeasureKind::Current)
            && matches!(e, Error::Storage(StorageError::WriteFailed))));
    assert!(faults.iter().all(|(k, _)| *k != Some(MeasureKind::Voltage)));

    let volts: Vec<_> = rig
        .sd
        .files
        .iter()
        .filter(|(n, _)| n.starts_with("Volts "))
        .collect();
    assert!(!volts.is_empty());
    assert!(volts.iter().all(|(_, v)| !v.is_empty()));
}

#[test]
fn storage_fault_never_stalls_the_sampler() {
    let mut rig = Rig::new(&SystemConfig::default(), 0.1, false);
    rig.sd.fail_prefix = Some("Amps");
    rig.run(0, 60);
    // The batch still closed on time.
    assert_eq!(rig.service.batches_completed(), 1);
    assert_eq!(rig.service.slot(), 0);
}

#[test]
fn storage_fault_reaches_the_error_topic_while_uplinked() {
    let mut rig = Rig::new(&config_with_confirmation(1), 0.0, true);
    rig.sd.fail_prefix = Some("Amps");
    rig.run(0, 2);
    assert!(rig.net.topics().contains(&"leakwatch/error"));
}
