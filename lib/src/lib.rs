//! Client library for the SendGrid v3 mail send API.
//!
//! A mail is assembled through `mail::Mail`, rendered into the wire
//! format by `body::MailBody`, and shipped by `client::Client`.

pub mod api;
pub mod body;
pub mod client;
pub mod config;
pub mod encoder;
pub mod errors;
pub mod mail;
