//! Environment-driven switches for the client core.

use tracing::warn;

pub const ENGINE_ADDRESS_ENV: &str = "INTERTRANS_ENGINE_ADDRESS";
pub const MAX_MESSAGE_BYTES_ENV: &str = "INTERTRANS_MAX_MESSAGE_BYTES";
pub const EXPORT_CODE_ENV: &str = "INTERTRANS_EXPORT_CODE";

pub const DEFAULT_ENGINE_ADDRESS: &str = "localhost:50051";
/// 2 x 1000 MiB, the cap the research notebooks configure on their channels.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1000 * 1024 * 1024 * 2;

fn flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(val) => {
            let v = val.trim().to_lowercase();
            if default {
                !matches!(v.as_str(), "0" | "false" | "no" | "off")
            } else {
                matches!(v.as_str(), "1" | "true" | "yes" | "on")
            }
        }
        Err(_) => default,
    }
}

pub fn engine_address() -> String {
    match std::env::var(ENGINE_ADDRESS_ENV) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => DEFAULT_ENGINE_ADDRESS.to_string(),
    }
}

pub fn max_message_bytes() -> usize {
    match std::env::var(MAX_MESSAGE_BYTES_ENV) {
        Ok(val) => match val.trim().parse::<usize>() {
            Ok(bytes) if bytes > 0 => bytes,
            _ => {
                warn!(value = %val, "ignoring invalid {MAX_MESSAGE_BYTES_ENV}");
                DEFAULT_MAX_MESSAGE_BYTES
            }
        },
        Err(_) => DEFAULT_MAX_MESSAGE_BYTES,
    }
}

/// Whether CSV export includes the extracted code and raw inference output.
pub fn export_code_columns() -> bool {
    flag(EXPORT_CODE_ENV, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message_cap_is_two_thousand_mib() {
        assert_eq!(DEFAULT_MAX_MESSAGE_BYTES, 2_097_152_000);
    }

    #[test]
    fn test_flag_defaults_when_unset() {
        assert!(flag("INTERTRANS_TEST_FLAG_THAT_IS_NEVER_SET", true));
        assert!(!flag("INTERTRANS_TEST_FLAG_THAT_IS_NEVER_SET", false));
    }
}
