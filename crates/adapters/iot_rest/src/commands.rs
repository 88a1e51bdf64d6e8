//! Inbound set-point command feed.
//!
//! The platform queues device-model action invocations per device; this
//! feed polls the pending queue for every known target and forwards each
//! matching action value through an mpsc channel. The binary drains the
//! channel into the command dispatcher.

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::IotError;
use crate::{IotRestConfig, IotTarget, check};

#[derive(Debug, Deserialize)]
struct PendingActions {
    #[serde(default)]
    items: Vec<PendingAction>,
}

#[derive(Debug, Deserialize)]
struct PendingAction {
    action: String,
    value: String,
}

/// Polls the platform's pending action queues.
pub struct CommandFeed {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    targets: Vec<IotTarget>,
    poll_period: Duration,
}

impl CommandFeed {
    #[must_use]
    pub fn new(config: &IotRestConfig, targets: Vec<IotTarget>, poll_period: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            targets,
            poll_period,
        }
    }

    /// Spawn the polling task. The task ends when the receiver is dropped.
    #[must_use]
    pub fn spawn(self) -> (mpsc::Receiver<String>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.poll_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                for target in &self.targets {
                    match self.fetch_pending(target).await {
                        Ok(values) => {
                            for value in values {
                                if tx.send(value).await.is_err() {
                                    return;
                                }
                            }
                        }
                        Err(err) => {
                            tracing::warn!(
                                device_id = target.device_id,
                                error = %err,
                                "pending-action poll failed"
                            );
                        }
                    }
                }
            }
        });
        (rx, handle)
    }

    async fn fetch_pending(&self, target: &IotTarget) -> Result<Vec<String>, IotError> {
        let uri = format!(
            "{}/iot/api/v2/apps/{}/devices/{}/actions/pending",
            self.base_url, target.app_id, target.device_id
        );
        let response = self
            .client
            .get(uri)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(IotError::Transport)?;
        let response = check(response).await?;
        let pending: PendingActions = response.json().await.map_err(IotError::Transport)?;
        Ok(extract_values(pending, &target.action))
    }
}

/// Keep the values of the actions this feed is responsible for; the queue
/// can carry other device-model actions.
fn extract_values(pending: PendingActions, action: &str) -> Vec<String> {
    pending
        .items
        .into_iter()
        .filter(|item| item.action.eq_ignore_ascii_case(action))
        .map(|item| item.value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> PendingActions {
        serde_json::from_value(serde_json::json!({
            "items": [
                { "action": "SetSetPointTemp", "value": "70:ee:50:00:00:01/21" },
                { "action": "Reboot", "value": "" },
                { "action": "setsetpointtemp", "value": "70:ee:50:00:00:01/18" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn should_keep_only_matching_actions_case_insensitively() {
        let values = extract_values(pending(), "SetSetPointTemp");
        assert_eq!(
            values,
            vec!["70:ee:50:00:00:01/21", "70:ee:50:00:00:01/18"]
        );
    }

    #[test]
    fn should_tolerate_empty_queue() {
        let empty: PendingActions = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(extract_values(empty, "SetSetPointTemp").is_empty());
    }
}
