use serde_json::Value;

use crate::errors::NixCfgError;

/// Checks that the JSON quoting of `value` is also a valid Nix string
/// literal with the same meaning. JSON and Nix agree on `\"`, `\\`, `\n`,
/// `\r` and `\t`, but Nix would expand `${` and does not know `\uXXXX`.
pub fn check(field: &'static str, value: &str) -> Result<(), NixCfgError> {
    if value.contains("${") {
        return Err(NixCfgError::invalid_input(
            field,
            "value must not contain Nix antiquotation \"${\"",
        ));
    }

    if value
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        return Err(NixCfgError::invalid_input(
            field,
            "value contains control characters",
        ));
    }

    Ok(())
}

/// Quotes `value` as a double-quoted Nix string
pub fn quote(field: &'static str, value: &str) -> Result<String, NixCfgError> {
    check(field, value)?;

    Ok(Value::String(value.to_string()).to_string())
}
