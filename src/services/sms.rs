use crate::error::{Error, Result};
use reqwest::Client;

/// Delivery channel for one-time codes. The HTTP gateway is the production
/// implementation; tests swap in a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait OtpSender: Send + Sync {
    async fn send_otp(&self, phone_number: &str, code: &str) -> Result<()>;
}

/// Bulk-SMS gateway client. Without an API key configured the sender becomes
/// a no-op, which keeps local development from needing an SMS account.
pub struct SmsGateway {
    client: Client,
    gateway_url: String,
    api_key: Option<String>,
}

impl SmsGateway {
    pub fn from_config() -> Self {
        let config = crate::config::get_config();
        Self {
            client: Client::new(),
            gateway_url: config.sms_gateway_url.clone(),
            api_key: config.sms_api_key.clone(),
        }
    }
}

#[async_trait::async_trait]
impl OtpSender for SmsGateway {
    async fn send_otp(&self, phone_number: &str, code: &str) -> Result<()> {
        let Some(api_key) = &self.api_key else {
            tracing::debug!(phone_number, "SMS delivery disabled; skipping send");
            return Ok(());
        };

        let body = serde_json::json!({
            "variables_values": code,
            "route": "otp",
            "numbers": phone_number,
        });
        let resp = self
            .client
            .post(&self.gateway_url)
            .header("authorization", api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Internal(format!(
                "SMS gateway returned {}",
                resp.status()
            )));
        }
        let payload: serde_json::Value = resp.json().await?;
        if payload.get("return").and_then(|v| v.as_bool()) == Some(false) {
            return Err(Error::Internal(
                "SMS gateway rejected the message".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mocked_sender_observes_phone_and_code() {
        let mut mock = MockOtpSender::new();
        mock.expect_send_otp()
            .withf(|phone, code| phone == "9876543210" && code.len() == 6)
            .times(1)
            .returning(|_, _| Ok(()));

        tokio_test::block_on(mock.send_otp("9876543210", "123456")).unwrap();
    }
}
