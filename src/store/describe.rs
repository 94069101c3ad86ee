use serde_json::Value;

use super::{
    ConfigurationSnapshot,
    PhoneEnvironment,
};
use crate::errors::NixCfgError;

struct Description {
    /// JSON pointer into the serialized snapshot
    path: &'static str,
    label: &'static str,
    mapping: Option<fn(&str) -> String>,
}

const DESCRIPTIONS: [Description; 5] = [
    Description {
        path: "/fde/enable",
        label: "FDE enabled",
        mapping: None,
    },
    Description {
        path: "/info/fullname",
        label: "Full name",
        mapping: None,
    },
    Description {
        path: "/info/username",
        label: "User name",
        mapping: None,
    },
    Description {
        path: "/info/hostname",
        label: "Host name",
        mapping: None,
    },
    Description {
        path: "/environment/phone_environment",
        label: "Phone environment",
        mapping: Some(phone_environment_name),
    },
];

fn phone_environment_name(key: &str) -> String {
    PhoneEnvironment::from_key(key)
        .map(|env| env.display_name().to_string())
        .unwrap_or(key.to_string())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Walks the fixed list of descriptions over `snapshot`,
/// returning `(label, value)` pairs in display order.
pub fn describe(
    snapshot: &ConfigurationSnapshot,
) -> Result<Vec<(&'static str, String)>, NixCfgError> {
    let data = serde_json::to_value(snapshot).map_err(|err| {
        NixCfgError::NixCfgBug(format!("failed to serialize snapshot: {err}"))
    })?;

    DESCRIPTIONS
        .iter()
        .map(|description| {
            let value = data.pointer(description.path).ok_or_else(|| {
                NixCfgError::NixCfgBug(format!(
                    "no value at {} in snapshot",
                    description.path
                ))
            })?;

            let mut display = display_value(value);
            if let Some(mapping) = description.mapping {
                display = mapping(&display);
            }

            Ok((description.label, display))
        })
        .collect()
}

pub fn format_description(description: &[(&'static str, String)]) -> String {
    description
        .iter()
        .map(|(label, value)| format!(" - {label}: {value:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}
