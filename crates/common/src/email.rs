//! Transactional email delivery.
//!
//! Thin client for an HTTP email-delivery provider plus the three message
//! templates the product sends (welcome, password reset, booking
//! confirmation). Delivery is always best-effort from the caller's point of
//! view: callers log failures, they do not fail requests over them.

use serde::Serialize;

#[derive(Clone, Debug)]
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: String,
    sender: String,
    authorization_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: String,
        authorization_token: String,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { http_client, base_url, sender, authorization_token }
    }

    pub fn from_config(cfg: &configs::EmailConfig) -> Option<Self> {
        if !cfg.is_configured() {
            return None;
        }
        Some(Self::new(
            cfg.base_url.clone(),
            cfg.sender.clone(),
            cfg.auth_token.clone(),
            std::time::Duration::from_millis(cfg.timeout_ms),
        ))
    }

    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), reqwest::Error> {
        let url = format!("{}/email", self.base_url);
        let request_body = SendEmailRequest {
            from: &self.sender,
            to: recipient,
            subject,
            html_body,
            text_body,
        };
        self.http_client
            .post(&url)
            .header("X-Server-Token", &self.authorization_token)
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Message templates. Each returns `(subject, html_body, text_body)`.
pub mod templates {
    pub fn welcome(name: &str) -> (String, String, String) {
        let subject = "Welcome to Evervow!".to_string();
        let html = format!(
            "<h1>Welcome, {name}!</h1>\
             <p>Your account is ready. Browse vendors, compare services and \
             send your first booking request whenever you like.</p>",
        );
        let text = format!(
            "Welcome, {name}!\nYour account is ready. Browse vendors, compare \
             services and send your first booking request whenever you like.",
        );
        (subject, html, text)
    }

    pub fn password_reset(reset_link: &str) -> (String, String, String) {
        let subject = "Reset your Evervow password".to_string();
        let html = format!(
            "<p>Someone requested a password reset for your account.</p>\
             <p>Click <a href=\"{reset_link}\">here</a> to choose a new \
             password. The link expires in one hour.</p>\
             <p>If this wasn't you, you can ignore this email.</p>",
        );
        let text = format!(
            "Someone requested a password reset for your account.\n\
             Visit {reset_link} to choose a new password. The link expires in \
             one hour.\nIf this wasn't you, you can ignore this email.",
        );
        (subject, html, text)
    }

    pub fn booking_confirmation(
        customer_name: &str,
        vendor_name: &str,
        service_title: &str,
        event_date: &str,
    ) -> (String, String, String) {
        let subject = format!("Your booking with {vendor_name} was approved");
        let html = format!(
            "<h1>Good news, {customer_name}!</h1>\
             <p><strong>{vendor_name}</strong> approved your booking for \
             <strong>{service_title}</strong> on {event_date}.</p>\
             <p>Complete the payment in the app to lock in the date.</p>",
        );
        let text = format!(
            "Good news, {customer_name}!\n{vendor_name} approved your booking \
             for {service_title} on {event_date}.\nComplete the payment in \
             the app to lock in the date.",
        );
        (subject, html, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    struct SendEmailBodyMatcher;

    impl wiremock::Match for SendEmailBodyMatcher {
        fn matches(&self, request: &Request) -> bool {
            let result: Result<serde_json::Value, _> = serde_json::from_slice(&request.body);
            match result {
                Ok(body) => {
                    body.get("From").is_some()
                        && body.get("To").is_some()
                        && body.get("Subject").is_some()
                        && body.get("HtmlBody").is_some()
                        && body.get("TextBody").is_some()
                }
                Err(_) => false,
            }
        }
    }

    fn client(base_url: String) -> EmailClient {
        EmailClient::new(
            base_url,
            "noreply@evervow.test".into(),
            "token".into(),
            std::time::Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn send_email_fires_a_request_to_base_url() {
        let mock_server = MockServer::start().await;
        let client = client(mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/email"))
            .and(header_exists("X-Server-Token"))
            .and(SendEmailBodyMatcher)
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let out = client
            .send_email("bride@example.com", "subject", "<p>html</p>", "text")
            .await;
        assert!(out.is_ok());
    }

    #[tokio::test]
    async fn send_email_fails_if_the_server_returns_500() {
        let mock_server = MockServer::start().await;
        let client = client(mock_server.uri());

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let out = client
            .send_email("bride@example.com", "subject", "<p>html</p>", "text")
            .await;
        assert!(out.is_err());
    }

    #[tokio::test]
    async fn send_email_times_out_if_the_server_is_slow() {
        let mock_server = MockServer::start().await;
        let client = client(mock_server.uri());

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(30)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let out = client
            .send_email("bride@example.com", "subject", "<p>html</p>", "text")
            .await;
        assert!(out.is_err());
    }

    #[test]
    fn password_reset_template_embeds_the_link() {
        let (subject, html, text) = templates::password_reset("https://x/reset?token=abc");
        assert!(subject.contains("password"));
        assert!(html.contains("https://x/reset?token=abc"));
        assert!(text.contains("https://x/reset?token=abc"));
    }
}
