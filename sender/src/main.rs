use std::env;
use std::path::PathBuf;
use std::process;

use structopt::StructOpt;

use sendgrid::body::MailBody;
use sendgrid::client::Client;
use sendgrid::config;
use sendgrid::mail::Mail;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sendgrid-sender",
    about = "Command-line sender for the SendGrid v3 mail API."
)]
struct Opt {
    /// Recipient, as "addr" or "addr=Display Name" (repeatable)
    #[structopt(short, long)]
    to: Vec<String>,

    /// Carbon copy recipient (repeatable)
    #[structopt(long)]
    cc: Vec<String>,

    /// Blind carbon copy recipient (repeatable)
    #[structopt(long)]
    bcc: Vec<String>,

    /// Sender, as "addr" or "addr=Display Name"
    #[structopt(short, long)]
    from: String,

    /// Reply-to address
    #[structopt(long)]
    reply_to: Option<String>,

    #[structopt(short, long)]
    subject: String,

    /// Plain text body
    #[structopt(short, long)]
    body: Option<String>,

    /// HTML body
    #[structopt(long)]
    html: Option<String>,

    /// Transactional template id
    #[structopt(long)]
    template_id: Option<String>,

    /// Deferred delivery time, as a Unix timestamp in seconds
    #[structopt(long)]
    send_at: Option<i64>,

    /// File to attach (repeatable)
    #[structopt(short, long)]
    attach: Vec<PathBuf>,

    /// Enable click tracking
    #[structopt(long)]
    click_tracking: bool,

    /// Config file holding the `api_key` entry
    #[structopt(short, long)]
    config: Option<String>,

    /// Print the request body instead of sending
    #[structopt(long)]
    dry_run: bool,
}

/// Split an "addr=Display Name" argument into its parts.
fn split_address(arg: &str) -> (&str, Option<&str>) {
    match arg.find('=') {
        Some(idx) => (&arg[..idx], Some(&arg[idx + 1..])),
        None => (arg, None),
    }
}

fn build_mail(opt: &Opt) -> Mail {
    let mut mail = Mail::new();

    for to in &opt.to {
        let (email, name) = split_address(to);
        mail.add_recipient(email, name);
    }

    for cc in &opt.cc {
        let (email, name) = split_address(cc);
        mail.add_cc(email, name);
    }

    for bcc in &opt.bcc {
        let (email, name) = split_address(bcc);
        mail.add_bcc(email, name);
    }

    let (email, name) = split_address(&opt.from);
    mail.set_from(email, name);

    if let Some(reply_to) = &opt.reply_to {
        let (email, name) = split_address(reply_to);
        mail.set_reply_to(email, name);
    }

    mail.set_subject(&opt.subject);

    if let Some(body) = &opt.body {
        mail.set_content(body);
    }

    if let Some(html) = &opt.html {
        mail.set_html_content(html);
    }

    if let Some(template_id) = &opt.template_id {
        mail.set_template_id(template_id);
    }

    if let Some(send_at) = opt.send_at {
        mail.set_send_at(send_at);
    }

    if opt.click_tracking {
        mail.set_click_tracking(true);
    }

    for path in &opt.attach {
        mail.add_attachment(path);
    }

    mail
}

#[tokio::main]
async fn main() {
    env_logger::builder().format_timestamp_micros().init();

    let opt = Opt::from_args();
    let mail = build_mail(&opt);

    if opt.dry_run {
        let body = MailBody::create(&mail);
        let out = serde_json::to_string_pretty(body.as_value())
            .expect("Failed to serialize mail body");

        println!("{}", out);
        return;
    }

    let api_key = match &opt.config {
        Some(path) => config::load_config(Some(path))
            .get("api_key")
            .cloned()
            .expect("No api_key found in config"),
        None => env::var("SENDGRID_API_KEY").expect("SENDGRID_API_KEY not set in env"),
    };

    let client = Client::from_api_key(&api_key);

    match client.send(&mail).await {
        Ok(resp) => {
            if resp.is_successful() {
                log::info!("Mail accepted with status {}", resp.code);
            } else {
                log::error!(
                    "Mail rejected with status {}: {}",
                    resp.code,
                    resp.error_message.as_deref().unwrap_or("")
                );
                process::exit(1);
            }
        }
        Err(e) => {
            log::error!("Failed to send mail: {}", e);
            process::exit(1);
        }
    }
}
