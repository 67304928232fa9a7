use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use ureq::Agent;

use crate::config::NotificationConfig;
use crate::error::{PromoteError, Result};
use crate::notify::{Notification, Notifier};

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts notifications to a Slack channel through `chat.postMessage`
pub struct SlackNotifier {
    agent: Agent,
    token: String,
    config: NotificationConfig,
}

impl SlackNotifier {
    pub fn new(token: impl Into<String>, config: NotificationConfig) -> Self {
        let agent: Agent = ureq::config::Config::builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .new_agent();

        SlackNotifier {
            agent,
            token: token.into(),
            config,
        }
    }

    /// Post `text` to `channel`.
    ///
    /// Slack answers most API errors with status 200 and `"ok": false`, so
    /// the body is checked as well as the status.
    pub fn post_message(&self, channel: &str, text: &str) -> Result<()> {
        let url = format!(
            "{}/chat.postMessage",
            self.config.api_base.trim_end_matches('/')
        );
        let payload = json!({
            "channel": channel,
            "text": text,
            "username": self.config.username,
            "icon_emoji": self.config.icon_emoji,
        });

        debug!(%channel, "posting Slack message");

        let response = match self
            .agent
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send_json(&payload)
        {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(status)) => {
                return Err(PromoteError::notify(format!(
                    "Slack responded with status {}",
                    status
                )));
            }
            Err(e) => {
                return Err(PromoteError::notify(format!("Slack request failed: {}", e)));
            }
        };

        let body: PostMessageResponse = response
            .into_body()
            .read_json()
            .map_err(|e| PromoteError::notify(format!("Invalid Slack response: {}", e)))?;

        if body.ok {
            Ok(())
        } else {
            Err(PromoteError::notify(format!(
                "Slack rejected the message: {}",
                body.error.as_deref().unwrap_or("unknown error")
            )))
        }
    }
}

impl Notifier for SlackNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        self.post_message(&self.config.channel, &notification.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Status;
    use mockito::Matcher;

    fn notifier_for(server: &mockito::Server) -> SlackNotifier {
        let config = NotificationConfig {
            api_base: server.url(),
            timeout_secs: 2,
            ..NotificationConfig::default()
        };
        SlackNotifier::new("xoxb-test", config)
    }

    fn notification() -> Notification {
        Notification {
            status: Status::Succeeded,
            text: "merging BUILD7 from octo/widgets `test/a` to `feature/a` done".to_string(),
        }
    }

    #[test]
    fn test_posts_to_configured_channel() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat.postMessage")
            .match_header("authorization", "Bearer xoxb-test")
            .match_body(Matcher::PartialJson(json!({
                "channel": "#travis-build-result",
                "text": "merging BUILD7 from octo/widgets `test/a` to `feature/a` done",
                "username": "TravisMergerBot",
                "icon_emoji": ":sob:",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"channel":"C123","ts":"1.2"}"#)
            .create();

        let result = notifier_for(&server).notify(&notification());
        mock.assert();
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn test_slack_error_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat.postMessage")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":false,"error":"channel_not_found"}"#)
            .create();

        let result = notifier_for(&server).notify(&notification());
        mock.assert();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("channel_not_found"));
    }

    #[test]
    fn test_http_error_status() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat.postMessage")
            .with_status(500)
            .create();

        let result = notifier_for(&server).notify(&notification());
        mock.assert();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_invalid_json_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat.postMessage")
            .with_status(200)
            .with_body("not valid json")
            .create();

        let result = notifier_for(&server).notify(&notification());
        mock.assert();
        assert!(result.is_err());
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat.postMessage")
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create();

        let config = NotificationConfig {
            api_base: format!("{}/", server.url()),
            ..NotificationConfig::default()
        };
        let result = SlackNotifier::new("xoxb-test", config).post_message("#other", "hi");
        mock.assert();
        assert!(result.is_ok());
    }
}
