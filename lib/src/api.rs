use crate::errors::Error;

pub const SENDGRID_BASE_API: &str = "https://api.sendgrid.com/v3/";

pub enum Endpoint {
    MailSend,
}

#[inline]
pub fn build_endpoint_url(endpoint: Endpoint) -> String {
    match endpoint {
        Endpoint::MailSend => format!("{}{}", SENDGRID_BASE_API, "mail/send"),
    }
}

/// Outcome of a mail send call.
///
/// The API acknowledges accepted mail with a 2xx status and an empty
/// body. Failure responses carry a JSON error document, kept here as
/// raw text rather than parsed.
#[derive(Debug)]
pub struct SendGridResponse {
    pub code: u16,
    pub error_message: Option<String>,
}

impl SendGridResponse {
    pub fn is_successful(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    pub(crate) async fn from_response(resp: reqwest::Response) -> Result<Self, Error> {
        let status = resp.status();

        if status.is_success() {
            Ok(Self {
                code: status.as_u16(),
                error_message: None,
            })
        } else {
            let body = resp.text().await?;

            Ok(Self {
                code: status.as_u16(),
                error_message: Some(body),
            })
        }
    }
}
