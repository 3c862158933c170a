//! Starboard ABI descriptor paths.
//!
//! A platform names its ABI descriptor either as a complete path
//! (`starboard/sabi/arm64/sabi-v13.json`) or as a template with a version
//! placeholder (`starboard/sabi/arm64/sabi-v{sb_api_version}.json`). Templates
//! follow format-string rules: `{{` and `}}` are literal braces.

use crate::core::errors::{ConfigError, Result};

/// ABI descriptor used when a platform does not name one.
pub const DEFAULT_SABI_JSON_PATH: &str = "starboard/sabi/default/sabi.json";

/// Starboard API version substituted into descriptor path templates.
pub const SB_API_VERSION: u32 = 13;

/// Placeholder names accepted for the API version.
const VERSION_PLACEHOLDERS: [&str; 2] = ["sb_api_version", "version"];

/// Substitute `api_version` into an ABI descriptor path template.
///
/// A path without placeholders is returned unchanged.
pub fn format_sabi_path(template: &str, api_version: u32) -> Result<String> {
    let invalid = |reason: &str| ConfigError::SabiTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => return Err(invalid("unterminated placeholder")),
                    }
                }
                if !VERSION_PLACEHOLDERS.contains(&name.as_str()) {
                    return Err(invalid(&format!("unknown placeholder `{{{}}}`", name)));
                }
                out.push_str(&api_version.to_string());
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(invalid("single `}` encountered")),
            _ => out.push(c),
        }
    }

    Ok(out)
}
