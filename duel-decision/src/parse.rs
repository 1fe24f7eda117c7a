//! Extracting a JSON object from a model's free-text completion.
//!
//! Models wrap their answer in prose surprisingly often even when
//! asked not to; the parser looks for the first balanced `{...}` span
//! rather than assuming the whole response is JSON.

use crate::types::{ModelActionResponse, ModelChainResponse};

/// Find the first balanced `{...}` substring, respecting string
/// literals and escapes so braces inside quoted text don't confuse the
/// scan.
pub fn first_balanced_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a turn-decision response out of model free text.
pub fn parse_action_response(text: &str) -> Option<ModelActionResponse> {
    let object = first_balanced_json_object(text)?;
    serde_json::from_str(object).ok()
}

/// Parse a chain-decision response out of model free text.
pub fn parse_chain_response(text: &str) -> Option<ModelChainResponse> {
    let object = first_balanced_json_object(text)?;
    serde_json::from_str(object).ok()
}
