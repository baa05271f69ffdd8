use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::offset::Utc;
use serde::Serialize;

use crate::encoder;

pub const TYPE_PLAIN: &str = "text/plain";
pub const TYPE_HTML: &str = "text/html";

/// Maximum entries per recipient list accepted by the API.
pub const MAX_RECIPIENTS: usize = 1000;

/// Maximum number of attachments per mail.
pub const MAX_ATTACHMENTS: usize = 10;

/// Insertion-ordered email -> display name map with a fixed capacity.
///
/// Re-inserting an existing address overwrites its name in place. Once
/// `MAX_RECIPIENTS` distinct addresses are held, further inserts are
/// dropped; the drop count is kept for diagnostics.
#[derive(Debug, Default)]
pub struct RecipientList {
    entries: Vec<(String, String)>,
    dropped: usize,
}

impl RecipientList {
    pub fn new() -> Self {
        Default::default()
    }

    pub(crate) fn insert(&mut self, email: &str, name: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(e, _)| e == email) {
            entry.1 = name.to_string();
            return;
        }

        if self.entries.len() >= MAX_RECIPIENTS {
            self.dropped += 1;
            log::debug!("Recipient list full, dropping {}", email);
            return;
        }

        self.entries.push((email.to_string(), name.to_string()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<(&str, &str)> {
        self.entries.first().map(|(e, n)| (e.as_str(), n.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(e, n)| (e.as_str(), n.as_str()))
    }

    /// Number of inserts rejected by the capacity check.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Insertion-ordered MIME type -> body text map.
#[derive(Debug, Default)]
pub struct ContentMap {
    entries: Vec<(String, String)>,
}

impl ContentMap {
    pub(crate) fn insert(&mut self, mime: &str, body: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(m, _)| m == mime) {
            entry.1 = body.to_string();
            return;
        }

        self.entries.push((mime.to_string(), body.to_string()));
    }

    pub fn get(&self, mime: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(m, _)| m == mime)
            .map(|(_, b)| b.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(m, b)| (m.as_str(), b.as_str()))
    }
}

/// A single attachment: base64 content plus filename.
///
/// The source is resolved and encoded exactly once, when the attachment
/// is added. An empty content string marks a failed read; such entries
/// stay in the list and are skipped by the serializer.
#[derive(Debug, Serialize)]
pub struct Attachment {
    content: String,
    filename: String,
}

impl Attachment {
    fn from_file(path: &Path) -> Self {
        Self {
            content: encoder::encode_file(path),
            filename: encoder::file_name(path),
        }
    }

    fn from_reader(filename: &str, reader: impl Read) -> Self {
        Self {
            content: encoder::encode_reader(reader),
            filename: filename.to_string(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// One outbound mail request.
///
/// Built up through mutator calls in any order, then serialized by
/// `body::MailBody`. Mutators never fail: input that breaks a cap or a
/// file check is silently dropped.
#[derive(Debug, Default)]
pub struct Mail {
    to: RecipientList,
    cc: RecipientList,
    bcc: RecipientList,
    from: RecipientList,
    reply_to: RecipientList,
    subject: String,
    content: ContentMap,
    template_id: Option<String>,
    send_at: Option<i64>,
    attachments: Vec<Attachment>,
    click_tracking: Vec<(String, bool)>,
}

impl Mail {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a recipient, up to a maximum of 1000.
    pub fn add_recipient(&mut self, email: &str, name: Option<&str>) {
        self.to.insert(email, name.unwrap_or(""));
    }

    /// Add a carbon copy recipient, up to a maximum of 1000.
    pub fn add_cc(&mut self, email: &str, name: Option<&str>) {
        self.cc.insert(email, name.unwrap_or(""));
    }

    /// Add a blind carbon copy recipient, up to a maximum of 1000.
    pub fn add_bcc(&mut self, email: &str, name: Option<&str>) {
        self.bcc.insert(email, name.unwrap_or(""));
    }

    /// Set the sender address and optional display name.
    pub fn set_from(&mut self, email: &str, name: Option<&str>) {
        self.from.insert(email, name.unwrap_or(""));
    }

    /// Set the reply-to address and optional display name.
    pub fn set_reply_to(&mut self, email: &str, name: Option<&str>) {
        self.reply_to.insert(email, name.unwrap_or(""));
    }

    /// Set the subject line. The API rejects blank subjects, so an empty
    /// string is stored as a single space.
    pub fn set_subject(&mut self, subject: &str) {
        self.subject = coerce_blank(subject);
    }

    /// Set the plain text body.
    pub fn set_content(&mut self, body: &str) {
        self.add_content(TYPE_PLAIN, body);
    }

    /// Set the HTML body.
    pub fn set_html_content(&mut self, body: &str) {
        self.add_content(TYPE_HTML, body);
    }

    /// Set the body for an arbitrary MIME type. An empty body is stored
    /// as a single space, like the subject.
    pub fn add_content(&mut self, mime: &str, body: &str) {
        self.content.insert(mime, &coerce_blank(body));
    }

    /// Set the id of the transactional template to render this mail with.
    pub fn set_template_id(&mut self, template_id: &str) {
        self.template_id = Some(template_id.to_string());
    }

    /// Schedule delivery for a Unix timestamp, in seconds. Timestamps
    /// not strictly in the future are ignored.
    pub fn set_send_at(&mut self, send_at: i64) {
        if send_at > Utc::now().timestamp() {
            self.send_at = Some(send_at);
        }
    }

    /// Enable or disable click tracking for links in this mail.
    pub fn set_click_tracking(&mut self, enabled: bool) {
        if let Some(opt) = self.click_tracking.iter_mut().find(|(k, _)| k == "enable") {
            opt.1 = enabled;
        } else {
            self.click_tracking.push(("enable".to_string(), enabled));
        }
    }

    /// Attach a file, up to a maximum of 10 attachments. The path must
    /// point to a readable regular file or the call does nothing.
    pub fn add_attachment(&mut self, path: &Path) {
        if self.attachments.len() >= MAX_ATTACHMENTS {
            log::warn!("Attachment limit reached, dropping {}", path.display());
            return;
        }

        let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
        if !is_file || fs::File::open(path).is_err() {
            log::warn!("Not a readable file, dropping attachment {}", path.display());
            return;
        }

        self.attachments.push(Attachment::from_file(path));
    }

    /// Attach content from an opaque source, up to a maximum of 10
    /// attachments.
    pub fn add_attachment_reader(&mut self, filename: &str, reader: impl Read) {
        if self.attachments.len() >= MAX_ATTACHMENTS {
            log::warn!("Attachment limit reached, dropping {}", filename);
            return;
        }

        self.attachments.push(Attachment::from_reader(filename, reader));
    }

    pub fn recipients(&self) -> &RecipientList {
        &self.to
    }

    pub fn carbon_copies(&self) -> &RecipientList {
        &self.cc
    }

    pub fn blind_carbon_copies(&self) -> &RecipientList {
        &self.bcc
    }

    pub fn from(&self) -> &RecipientList {
        &self.from
    }

    pub fn reply_to(&self) -> &RecipientList {
        &self.reply_to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn content(&self) -> &ContentMap {
        &self.content
    }

    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub fn send_at(&self) -> Option<i64> {
        self.send_at
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn click_tracking(&self) -> &[(String, bool)] {
        &self.click_tracking
    }
}

fn coerce_blank(text: &str) -> String {
    if text.is_empty() {
        " ".to_string()
    } else {
        text.to_string()
    }
}
