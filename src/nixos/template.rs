use crate::errors::NixCfgError;

const OPEN: &str = "{{ ";
const CLOSE: &str = " }}";

/// Replaces every `{{ name }}` in `template` with its value from `vars`.
///
/// Substitution is a single pass over the template, values are never
/// scanned for tokens themselves.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> Result<String, NixCfgError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);

        let after = &rest[start + OPEN.len()..];
        let end = after.find(CLOSE).ok_or_else(|| {
            NixCfgError::NixCfgBug(format!("unterminated token in template at {after:?}"))
        })?;

        let name = &after[..end];
        let value = vars
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| NixCfgError::NixCfgBug(format!("no value for token {name}")))?;

        out.push_str(value);
        rest = &after[end + CLOSE.len()..];
    }

    out.push_str(rest);

    Ok(out)
}

/// Indents every non-empty line by two spaces
pub fn indent(s: &str) -> String {
    s.lines()
        .map(|line| match line {
            "" => String::new(),
            line => format!("  {line}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
