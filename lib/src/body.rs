use serde_json::json;
use serde_json::map::Map;
use serde_json::Value;

use crate::errors::Error;
use crate::mail::{Attachment, ContentMap, Mail, RecipientList};
use crate::mail::{MAX_RECIPIENTS, TYPE_HTML, TYPE_PLAIN};

/// Serialized request body for the mail send endpoint.
///
/// Reads a completed `Mail` and reproduces the API schema field for
/// field: one personalization block for `to`, extra blocks for `cc` and
/// `bcc` when present, and the optional top-level keys only when their
/// field was set.
pub struct MailBody {
    body: Value,
}

impl MailBody {
    pub fn create(mail: &Mail) -> Self {
        Self {
            body: build_body(mail),
        }
    }

    /// Render the body as a JSON string. A failure in the JSON encoder
    /// aborts the call; no partial document is produced.
    pub fn to_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.body).map_err(|e| e.into())
    }

    pub fn as_value(&self) -> &Value {
        &self.body
    }

    pub fn into_value(self) -> Value {
        self.body
    }
}

fn build_body(mail: &Mail) -> Value {
    let mut body = Map::new();

    let mut personalizations = Vec::new();
    personalizations.push(json!({ "to": email_params(mail.recipients()) }));
    if !mail.carbon_copies().is_empty() {
        personalizations.push(json!({ "cc": email_params(mail.carbon_copies()) }));
    }
    if !mail.blind_carbon_copies().is_empty() {
        personalizations.push(json!({ "bcc": email_params(mail.blind_carbon_copies()) }));
    }

    body.insert(
        "personalizations".to_string(),
        Value::Array(personalizations),
    );
    body.insert("from".to_string(), single_address(mail.from()));
    body.insert("subject".to_string(), Value::from(mail.subject()));
    body.insert("content".to_string(), content_params(mail.content()));

    if let Some(template_id) = mail.template_id() {
        body.insert("template_id".to_string(), Value::from(template_id));
    }

    if !mail.reply_to().is_empty() {
        body.insert("reply_to".to_string(), single_address(mail.reply_to()));
    }

    if let Some(send_at) = mail.send_at() {
        body.insert("send_at".to_string(), Value::from(send_at));
    }

    if !mail.attachments().is_empty() {
        body.insert(
            "attachments".to_string(),
            attachment_params(mail.attachments()),
        );
    }

    if !mail.click_tracking().is_empty() {
        body.insert(
            "tracking_settings".to_string(),
            json!({ "click_tracking": tracking_params(mail.click_tracking()) }),
        );
    }

    Value::Object(body)
}

/// Recipient list as an array of address objects. Emission is capped at
/// the API's list limit; a blank display name is sent as null.
fn email_params(list: &RecipientList) -> Value {
    let entries = list
        .iter()
        .take(MAX_RECIPIENTS)
        .map(|(email, name)| {
            let name = if name.is_empty() {
                Value::Null
            } else {
                Value::from(name)
            };

            json!({ "email": email, "name": name })
        })
        .collect();

    Value::Array(entries)
}

/// The API supports exactly one sender and one reply-to address; the
/// first entry of the list wins.
fn single_address(list: &RecipientList) -> Value {
    match list.first() {
        Some((email, name)) => json!({ "email": email, "name": name }),
        None => Value::Object(Map::new()),
    }
}

/// Content blocks in API order: text/plain first, text/html second,
/// anything else in insertion order.
fn content_params(content: &ContentMap) -> Value {
    let mut entries = Vec::new();

    if let Some(text) = content.get(TYPE_PLAIN) {
        entries.push(json!({ "type": TYPE_PLAIN, "value": text }));
    }

    if let Some(html) = content.get(TYPE_HTML) {
        entries.push(json!({ "type": TYPE_HTML, "value": html }));
    }

    for (mime, text) in content.iter() {
        if mime == TYPE_PLAIN || mime == TYPE_HTML {
            continue;
        }

        entries.push(json!({ "type": mime, "value": text }));
    }

    Value::Array(entries)
}

/// Attachments whose encoding came back empty are failed reads; they
/// are left out of the body rather than sent.
fn attachment_params(attachments: &[Attachment]) -> Value {
    let entries = attachments
        .iter()
        .filter(|a| !a.content().is_empty())
        .map(|a| json!(a))
        .collect();

    Value::Array(entries)
}

fn tracking_params(options: &[(String, bool)]) -> Value {
    let mut params = Map::new();

    for (key, enabled) in options {
        params.insert(key.clone(), Value::from(*enabled));
    }

    Value::Object(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_mail() -> Mail {
        let mut mail = Mail::new();
        mail.add_recipient("a@x.com", Some("A"));
        mail.set_from("sender@x.com", Some("Sender"));
        mail.set_subject("Hello");
        mail.set_content("Hi");
        mail
    }

    #[test]
    fn test_minimal_body_keys() {
        let body = MailBody::create(&minimal_mail()).into_value();

        let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort();

        // None of the optional keys appear on a minimal mail
        assert_eq!(keys, vec!["content", "from", "personalizations", "subject"]);
    }

    #[test]
    fn test_minimal_body_values() {
        let body = MailBody::create(&minimal_mail()).into_value();

        assert_eq!(body["personalizations"][0]["to"][0]["email"], "a@x.com");
        assert_eq!(body["personalizations"][0]["to"][0]["name"], "A");
        assert_eq!(body["from"]["email"], "sender@x.com");
        assert_eq!(body["subject"], "Hello");
        assert_eq!(body["content"][0]["type"], "text/plain");
        assert_eq!(body["content"][0]["value"], "Hi");
    }

    #[test]
    fn test_personalization_blocks() {
        let mut mail = minimal_mail();
        let body = MailBody::create(&mail).into_value();
        assert_eq!(body["personalizations"].as_array().unwrap().len(), 1);

        mail.add_cc("cc@x.com", None);
        mail.add_bcc("bcc@x.com", None);

        let body = MailBody::create(&mail).into_value();
        let blocks = body["personalizations"].as_array().unwrap();

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1]["cc"][0]["email"], "cc@x.com");
        assert_eq!(blocks[2]["bcc"][0]["email"], "bcc@x.com");
    }

    #[test]
    fn test_blank_name_is_null() {
        let mut mail = minimal_mail();
        mail.add_recipient("b@x.com", None);

        let body = MailBody::create(&mail).into_value();

        assert_eq!(body["personalizations"][0]["to"][1]["email"], "b@x.com");
        assert!(body["personalizations"][0]["to"][1]["name"].is_null());
    }

    #[test]
    fn test_html_only_content() {
        let mut mail = Mail::new();
        mail.add_recipient("a@x.com", None);
        mail.set_from("sender@x.com", None);
        mail.set_subject("Hello");
        mail.set_html_content("hi");

        let body = MailBody::create(&mail).into_value();
        let content = body["content"].as_array().unwrap();

        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text/html");
        assert_eq!(content[0]["value"], "hi");
    }

    #[test]
    fn test_content_ordering() {
        let mut mail = minimal_mail();
        mail.add_content("text/x-amp-html", "amp");
        mail.set_html_content("<p>hi</p>");

        let body = MailBody::create(&mail).into_value();
        let content = body["content"].as_array().unwrap();

        assert_eq!(content[0]["type"], "text/plain");
        assert_eq!(content[1]["type"], "text/html");
        assert_eq!(content[2]["type"], "text/x-amp-html");
    }

    #[test]
    fn test_template_id_and_send_at() {
        let mut mail = minimal_mail();
        mail.set_template_id("d-12345");

        let future = chrono::offset::Utc::now().timestamp() + 3600;
        mail.set_send_at(future);

        let body = MailBody::create(&mail).into_value();

        assert_eq!(body["template_id"], "d-12345");
        assert_eq!(body["send_at"], future);
    }

    #[test]
    fn test_reply_to() {
        let mut mail = minimal_mail();
        mail.set_reply_to("replies@x.com", Some("Replies"));

        let body = MailBody::create(&mail).into_value();

        assert_eq!(body["reply_to"]["email"], "replies@x.com");
        assert_eq!(body["reply_to"]["name"], "Replies");
    }

    #[test]
    fn test_empty_attachment_dropped() {
        let mut mail = minimal_mail();
        mail.add_attachment_reader("ok.txt", std::io::Cursor::new(b"data".to_vec()));
        mail.add_attachment_reader("broken.txt", FailingReader);

        assert_eq!(mail.attachments().len(), 2);

        let body = MailBody::create(&mail).into_value();
        let attachments = body["attachments"].as_array().unwrap();

        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0]["filename"], "ok.txt");
        assert_eq!(attachments[0]["content"], base64::encode(b"data"));
    }

    #[test]
    fn test_click_tracking() {
        let mut mail = minimal_mail();
        mail.set_click_tracking(true);

        let body = MailBody::create(&mail).into_value();

        assert_eq!(body["tracking_settings"]["click_tracking"]["enable"], true);
    }

    #[test]
    fn test_to_string() {
        let body = MailBody::create(&minimal_mail());
        let text = body.to_string().unwrap();

        assert!(text.starts_with('{'));
        assert!(text.contains("\"personalizations\""));
    }

    struct FailingReader;

    impl std::io::Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
        }
    }
}
