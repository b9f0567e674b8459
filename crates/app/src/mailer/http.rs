//! Mail relay over HTTP.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use zeroize::Zeroizing;

use super::{MailMessage, Mailer, MailerError};

#[derive(Debug, Clone)]
pub struct HttpMailerConfig {
    /// Relay endpoint accepting JSON mail requests.
    pub api_url: String,
    pub api_key: Zeroizing<String>,

    /// `From` address.
    pub sender: String,
}

/// Posts templated mails to a relay that renders and delivers them.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    config: HttpMailerConfig,
    http: Client,
}

impl HttpMailer {
    #[must_use]
    pub fn new(config: HttpMailerConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn relay_request<'a>(&'a self, message: &'a MailMessage) -> RelayRequest<'a> {
        RelayRequest {
            from: &self.config.sender,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    #[serde(flatten)]
    message: &'a MailMessage,
}

#[async_trait]
impl Mailer for HttpMailer {
    #[tracing::instrument(
        name = "mailer.http.send",
        skip(self, message),
        fields(template = %message.template_path),
        err
    )]
    async fn send(&self, message: MailMessage) -> Result<(), MailerError> {
        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(self.config.api_key.as_str())
            .json(&self.relay_request(&message))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        relay_outcome(status, &body)
    }
}

/// Any non-2xx answer is a rejection carrying the relay's status and body.
fn relay_outcome(status: StatusCode, body: &str) -> Result<(), MailerError> {
    if status.is_success() {
        return Ok(());
    }

    Err(MailerError::Rejected(format!("status {status}: {}", body.trim())))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn mailer(api_url: &str) -> HttpMailer {
        HttpMailer::new(HttpMailerConfig {
            api_url: api_url.to_string(),
            api_key: Zeroizing::new("relay-key".to_string()),
            sender: "orders@sonit.test".to_string(),
        })
    }

    fn message() -> MailMessage {
        MailMessage {
            to: "buyer@sonit.test".to_string(),
            subject: "Sonit payment notification".to_string(),
            template_path: "html_template/mail/payment/success.html".to_string(),
            data: json!({ "transactionID": "123456", "url": "https://shop.sonit.test/" }),
        }
    }

    #[test]
    fn request_body_flattens_message_next_to_sender() -> TestResult {
        let relay = mailer("http://localhost:0");
        let message = message();

        let body = serde_json::to_value(relay.relay_request(&message))?;

        assert_eq!(
            body,
            json!({
                "from": "orders@sonit.test",
                "to": "buyer@sonit.test",
                "subject": "Sonit payment notification",
                "template_path": "html_template/mail/payment/success.html",
                "data": { "transactionID": "123456", "url": "https://shop.sonit.test/" },
            })
        );

        Ok(())
    }

    #[test]
    fn success_statuses_are_accepted() {
        assert!(relay_outcome(StatusCode::OK, "").is_ok());
        assert!(relay_outcome(StatusCode::ACCEPTED, "queued").is_ok());
    }

    #[test]
    fn error_statuses_become_rejections() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::BAD_GATEWAY,
        ] {
            let result = relay_outcome(status, "relay unavailable\n");

            match result {
                Err(MailerError::Rejected(reason)) => {
                    assert!(reason.contains(status.as_str()), "{reason} lacks {status}");
                    assert!(reason.ends_with("relay unavailable"), "{reason}");
                }
                other => panic!("expected Rejected for {status}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn unreachable_relay_is_an_http_error() {
        let result = mailer("http://127.0.0.1:9/send").send(message()).await;

        assert!(
            matches!(result, Err(MailerError::Http(_))),
            "expected Http error, got {result:?}"
        );
    }
}
