//! MQTT relay adapter.
//!
//! Implements [`RelayPort`] over the ESP-IDF MQTT client, with every
//! publish wrapped in the bounded [`RetryPolicy`]; a message still failing
//! after the budget is spent is dropped, never queued. The host backend
//! records publishes and injects failures for the integration tests.

use log::warn;

use crate::app::ports::RelayPort;
#[cfg(target_os = "espidf")]
use crate::error::CommsError;
use crate::relay::RetryPolicy;

pub struct MqttRelay {
    policy: RetryPolicy,
    #[cfg(target_os = "espidf")]
    client: Option<esp_idf_svc::mqtt::client::EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimBroker {
    fail_attempts: u32,
    attempts: u32,
    published: Vec<(String, String)>,
}

impl MqttRelay {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            sim: SimBroker::default(),
        }
    }

    /// Connect to the broker. Publishes before (or without) this are
    /// dropped after the retry budget, same as any other publish failure.
    #[cfg(target_os = "espidf")]
    pub fn connect(&mut self, broker_url: &str, client_id: &str) -> Result<(), CommsError> {
        use esp_idf_svc::mqtt::client::{EspMqttClient, MqttClientConfiguration};
        use log::info;

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            ..Default::default()
        };
        let client = EspMqttClient::new_cb(broker_url, &conf, |_| {})
            .map_err(|_| CommsError::MqttPublishFailed)?;
        self.client = Some(client);
        info!("MQTT: client up ({})", broker_url);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &str) -> bool {
        use esp_idf_svc::mqtt::client::QoS;

        let Some(client) = self.client.as_mut() else {
            return false;
        };
        client
            .publish(topic, QoS::AtLeastOnce, false, payload.as_bytes())
            .is_ok()
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &str) -> bool {
        self.sim.attempts += 1;
        if self.sim.fail_attempts > 0 {
            self.sim.fail_attempts -= 1;
            return false;
        }
        self.sim.published.push((topic.into(), payload.into()));
        true
    }

    #[cfg(target_os = "espidf")]
    fn backoff(ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn backoff(ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    // ── Simulation control for host tests ─────────────────────

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next(&mut self, attempts: u32) {
        self.sim.fail_attempts = attempts;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_attempts(&self) -> u32 {
        self.sim.attempts
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_published(&self) -> &[(String, String)] {
        &self.sim.published
    }
}

impl RelayPort for MqttRelay {
    fn publish(&mut self, topic: &str, payload: &str) -> bool {
        let policy = self.policy;
        let ok = policy.run(|| self.platform_publish(topic, payload), |ms| Self::backoff(ms));
        if !ok {
            warn!(
                "MQTT: dropping message on '{}' after {} attempts",
                topic, policy.max_attempts
            );
        }
        ok
    }
}
