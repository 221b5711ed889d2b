// User-facing error messages
//
// Helpers that turn raw failures into messages with a next step. Typed
// errors live next to the code that raises them (extract, state, server).

/// Append a suggestion block to an error message.
pub fn wrap_error_with_suggestion(message: impl AsRef<str>, suggestion: &str) -> String {
    format!("{}\n\n{}", message.as_ref(), suggestion)
}

/// Error for a config file that could not be read.
pub fn file_not_found_error(path: &str, what: &str) -> String {
    wrap_error_with_suggestion(
        format!("{} not found or unreadable: {}", what, path),
        "Check the path and file permissions.",
    )
}

/// Error for a config file that is not valid TOML.
pub fn config_parse_error(detail: &str) -> String {
    wrap_error_with_suggestion(
        format!("Failed to parse ~/.coursesync/config.toml: {}", detail),
        "Fix the syntax or delete the file to fall back to environment variables.",
    )
}

/// Error raised when a model call is attempted without an API key.
pub fn api_key_missing_error() -> String {
    wrap_error_with_suggestion(
        "GROQ_API_KEY is not set",
        "Add it to a .env file, export it in your shell:\n  \
         export GROQ_API_KEY=\"gsk_...\"\n\
         or set [groq] api_key in ~/.coursesync/config.toml",
    )
}
