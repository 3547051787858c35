//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`] — whether an uplink exists right now. The
//! sampler only reads the flag; association attempts are paced here, at
//! a fixed retry interval, and the caller decides *when* polling is
//! allowed at all (the main loop withholds it until the vehicle is
//! parked, so the radio never competes with the measurement while
//! driving).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF STA driver calls via
//!   `esp_idf_svc::wifi::BlockingWifi`, handed in from `main`.
//! - **all other targets**: simulation backend with injectable failures
//!   for host-side tests.

use core::fmt;

use log::{info, warn};

use crate::app::ports::LinkPort;
use crate::config::SystemConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
type WifiDriver = esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>;

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
}

impl fmt::Display for WifiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), CommsError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CommsError::WifiConnectFailed);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), CommsError> {
    // Empty means an open network; otherwise WPA2 length rules.
    if !password.is_empty() && (password.len() < 8 || password.len() > 64) {
        return Err(CommsError::WifiConnectFailed);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiLink {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    retry_interval_ms: u64,
    last_attempt_ms: Option<u64>,
    #[cfg(target_os = "espidf")]
    driver: Option<WifiDriver>,
    /// Simulation: fail this many platform_connect() calls, then succeed.
    #[cfg(not(target_os = "espidf"))]
    sim_fail_attempts: u32,
}

impl WifiLink {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            retry_interval_ms: u64::from(config.wifi_retry_interval_secs) * 1000,
            last_attempt_ms: None,
            #[cfg(target_os = "espidf")]
            driver: None,
            #[cfg(not(target_os = "espidf"))]
            sim_fail_attempts: 0,
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn with_driver(mut self, driver: WifiDriver) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), CommsError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| CommsError::WifiConnectFailed)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| CommsError::WifiConnectFailed)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Drive association. Call only when radio use is acceptable; attempts
    /// are paced at the configured retry interval regardless of call rate.
    pub fn poll(&mut self, now_ms: u64) {
        if self.ssid.is_empty() {
            return;
        }
        match self.state {
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: link lost");
                    self.state = WifiState::Disconnected;
                }
            }
            WifiState::Disconnected => {
                let due = match self.last_attempt_ms {
                    None => true,
                    Some(prev) => now_ms.wrapping_sub(prev) >= self.retry_interval_ms,
                };
                if !due {
                    return;
                }
                self.last_attempt_ms = Some(now_ms);
                match self.platform_connect() {
                    Ok(()) => {
                        self.state = WifiState::Connected;
                        info!("WiFi: connected to '{}'", self.ssid);
                    }
                    Err(e) => {
                        warn!(
                            "WiFi: connect failed ({}), retry in {}s",
                            e,
                            self.retry_interval_ms / 1000
                        );
                    }
                }
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        info!("WiFi: disconnected");
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let Some(wifi) = self.driver.as_mut() else {
            return Err(CommsError::WifiConnectFailed);
        };
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client = ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| CommsError::WifiConnectFailed)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| CommsError::WifiConnectFailed)?,
            auth_method,
            ..Default::default()
        };
        wifi.set_configuration(&Configuration::Client(client))
            .map_err(|_| CommsError::WifiConnectFailed)?;
        if !wifi.is_started().unwrap_or(false) {
            wifi.start().map_err(|_| CommsError::WifiConnectFailed)?;
        }
        wifi.connect().map_err(|_| CommsError::WifiConnectFailed)?;
        wifi.wait_netif_up()
            .map_err(|_| CommsError::WifiConnectFailed)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if self.sim_fail_attempts > 0 {
            self.sim_fail_attempts -= 1;
            return Err(CommsError::WifiConnectFailed);
        }
        info!("WiFi(sim): connected to '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Some(wifi) = self.driver.as_mut() {
            let _ = wifi.disconnect();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        info!("WiFi(sim): disconnected");
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver
            .as_ref()
            .map(|w| w.is_connected().unwrap_or(false))
            .unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    /// Simulation control for host tests.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, attempts: u32) {
        self.sim_fail_attempts = attempts;
    }
}

impl LinkPort for WifiLink {
    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
