use reqwest::header::CONTENT_TYPE;

use crate::api;
use crate::body::MailBody;
use crate::errors::Error;
use crate::mail::Mail;

/// HTTP client for the mail send endpoint.
pub struct Client {
    api_key: String,
    client: reqwest::Client,
}

impl Client {
    pub fn new() -> Self {
        Self {
            api_key: String::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_api_key(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Serialize and send a mail.
    ///
    /// Returns the API's acknowledgement whether it accepted the mail or
    /// not; `Err` is reserved for transport and encoding failures.
    pub async fn send(&self, mail: &Mail) -> Result<api::SendGridResponse, Error> {
        let body = MailBody::create(mail).to_string()?;
        let url = api::build_endpoint_url(api::Endpoint::MailSend);

        log::info!(
            "Sending mail to {} recipient(s), {} attachment(s)",
            mail.recipients().len(),
            mail.attachments().len()
        );

        let resp = self
            .client
            .post(reqwest::Url::parse(&url)?)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        api::SendGridResponse::from_response(resp).await
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
