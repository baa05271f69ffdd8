use std::fs;
use std::io::Read;
use std::path::Path;

/// Read and base64-encode a file for use as attachment content.
///
/// Returns an empty string if the file cannot be read. The attachment
/// is kept either way; empty content is dropped at serialization time.
pub fn encode_file(path: &Path) -> String {
    match fs::read(path) {
        Ok(data) => base64::encode(&data),
        Err(e) => {
            log::error!("Failed to read attachment {}: {}", path.display(), e);
            String::new()
        }
    }
}

/// Read and base64-encode an opaque content source.
pub fn encode_reader(mut reader: impl Read) -> String {
    let mut data = Vec::new();

    match reader.read_to_end(&mut data) {
        Ok(_) => base64::encode(&data),
        Err(e) => {
            log::error!("Failed to read attachment content: {}", e);
            String::new()
        }
    }
}

/// Attachment filename for a path source.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
