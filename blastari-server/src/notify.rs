use async_trait::async_trait;
use blastari_core::{CoreError, EmailConfig, UserFeedback};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

#[async_trait]
pub trait FeedbackNotifier: Send + Sync {
    async fn notify(&self, feedback: &UserFeedback) -> Result<(), CoreError>;
}

#[derive(Debug, Serialize)]
struct EmailBody<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    reply_to: &'a str,
    subject: String,
    text: String,
}

/// Sends feedback through a Resend-compatible `/emails` endpoint.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    client: Client,
    api_key: String,
    api_base_url: String,
    from: String,
    to: String,
}

impl EmailNotifier {
    pub fn new(
        api_key: String,
        api_base_url: &str,
        from: String,
        to: String,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            from,
            to,
        })
    }

    /// `None` when no API key or recipient is configured.
    pub fn from_config(config: &EmailConfig, timeout: Duration) -> Result<Option<Self>, CoreError> {
        match (&config.api_key, &config.feedback_to) {
            (Some(key), Some(to)) if !key.is_empty() && !to.is_empty() => Ok(Some(Self::new(
                key.clone(),
                &config.api_base_url,
                config.from.clone(),
                to.clone(),
                timeout,
            )?)),
            _ => {
                debug!("Email notifications disabled");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl FeedbackNotifier for EmailNotifier {
    async fn notify(&self, feedback: &UserFeedback) -> Result<(), CoreError> {
        let body = EmailBody {
            from: &self.from,
            to: vec![self.to.as_str()],
            reply_to: &feedback.email,
            subject: format!("New BLASTari feedback from {}", feedback.name),
            text: format!(
                "Name: {}\nEmail: {}\n\n{}",
                feedback.name, feedback.email, feedback.feedback
            ),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CoreError::RequestFailed {
                message: format!("email delivery failed: {message}"),
                status_code: Some(status.as_u16()),
            });
        }

        info!("Feedback notification sent for {}", feedback.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn feedback() -> UserFeedback {
        UserFeedback {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            feedback: "The subreddit list was spot on.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_notify_posts_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_partial_json(json!({
                "to": ["team@blastari.app"],
                "reply_to": "ada@example.com"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "email-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = EmailNotifier::new(
            "re_test".to_string(),
            &server.uri(),
            "BLASTari <feedback@blastari.app>".to_string(),
            "team@blastari.app".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        notifier.notify(&feedback()).await.unwrap();
    }

    #[tokio::test]
    async fn test_delivery_failure_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
            .mount(&server)
            .await;

        let notifier = EmailNotifier::new(
            "re_test".to_string(),
            &server.uri(),
            "bad".to_string(),
            "team@blastari.app".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = notifier.notify(&feedback()).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::RequestFailed {
                status_code: Some(422),
                ..
            }
        ));
    }

    #[test]
    fn test_disabled_without_credentials() {
        let config = EmailConfig::default();
        assert!(EmailNotifier::from_config(&config, Duration::from_secs(1))
            .unwrap()
            .is_none());
    }
}
