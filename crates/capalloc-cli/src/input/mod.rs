pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Path that selects piped stdin instead of a file.
pub const STDIN_PATH: &str = "-";

/// Load a typed input from a file path, or from piped stdin when the path is `-`.
///
/// Stdin is only consulted for `-`; any other path is read as a file.
pub fn load<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    load_with(path, stdin::read_stdin)
}

fn load_with<T, F>(path: &str, read_stdin: F) -> Result<T, Box<dyn std::error::Error>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Result<Option<Value>, Box<dyn std::error::Error>>,
{
    if path != STDIN_PATH {
        return file::read_config(path);
    }
    match read_stdin()? {
        Some(data) => Ok(serde_json::from_value(data)?),
        None => Err("--input - expects JSON piped on stdin".into()),
    }
}
