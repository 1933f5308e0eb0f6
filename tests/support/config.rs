use std::io::Write;

use tempfile::NamedTempFile;

/// Write `contents` to a temporary `.toml` file that lives as long as the
/// returned handle.
pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("streamwatch-test-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file.flush().expect("flush temp config");
    file
}

/// A config that only enables the log channel.
pub const LOG_ONLY_TOML: &str = r#"
[logging]
level = "warn"

[dispatcher]
channels = ["log"]

[channels.log]
"Message Text" = "{name} {message}"

[entities.alice]
name = "Alice"
"#;
