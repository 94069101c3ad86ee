use super::RawAnswers;
use crate::errors::NixCfgError;
use crate::nixos::escape;
use crate::store::PhoneEnvironment;

/// Validates raw answers before anything is derived or written.
pub fn validate(answers: &RawAnswers) -> Result<(), NixCfgError> {
    validate_hostname(&answers.info.hostname)?;
    validate_username(&answers.info.username)?;
    validate_password(&answers.info.password)?;
    escape::check("fullname", &answers.info.fullname)?;

    if let Some(ref device) = answers.device {
        if device.is_empty() {
            return Err(NixCfgError::invalid_input("device", "empty device name"));
        }

        escape::check("device", device)?;
    }

    answers
        .environment
        .phone_environment
        .parse::<PhoneEnvironment>()?;

    Ok(())
}

fn validate_hostname(hostname: &str) -> Result<(), NixCfgError> {
    if hostname.is_empty() {
        return Err(NixCfgError::invalid_input("hostname", "empty hostname"));
    }

    if let Some(c) = hostname
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(NixCfgError::invalid_input(
            "hostname",
            &format!("illegal character {c:?} in {hostname:?}"),
        ));
    }

    Ok(())
}

fn validate_username(username: &str) -> Result<(), NixCfgError> {
    if username.is_empty() {
        return Err(NixCfgError::invalid_input("username", "empty username"));
    }

    escape::check("username", username)
}

fn validate_password(password: &str) -> Result<(), NixCfgError> {
    if password.is_empty() {
        return Err(NixCfgError::invalid_input("password", "empty password"));
    }

    // mkpasswd --stdin only reads the first line
    if password.contains(['\n', '\r']) {
        return Err(NixCfgError::invalid_input(
            "password",
            "password must be a single line",
        ));
    }

    Ok(())
}
