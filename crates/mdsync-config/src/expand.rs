//! `${VAR}` expansion for values read from `mdsync.toml`.

use std::borrow::Cow;
use std::env::VarError;

use crate::{Config, ConfigError};

/// Expand `${VAR}` and `${VAR:-default}` in the `[confluence]` strings and
/// the `[import]` output dir and search space.
///
/// Errors name the TOML key that referenced the variable.
pub(crate) fn expand_config(config: &mut Config) -> Result<(), ConfigError> {
    if let Some(confluence) = config.confluence.as_mut() {
        for (field, value) in [
            ("confluence.base_url", &mut confluence.base_url),
            ("confluence.username", &mut confluence.username),
            ("confluence.password", &mut confluence.password),
            ("confluence.space_key", &mut confluence.space_key),
        ] {
            *value = expand_value(value, field)?;
        }
        expand_optional(&mut confluence.parent_page_id, "confluence.parent_page_id")?;
    }
    expand_optional(&mut config.import.output_dir, "import.output_dir")?;
    expand_optional(&mut config.import.search_space_key, "import.search_space_key")
}

fn expand_optional(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(raw) = value.as_deref() {
        *value = Some(expand_value(raw, field)?);
    }
    Ok(())
}

/// Values without `${` are kept as written, so `pa$$word` stays literal.
fn expand_value(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    shellexpand::env_with_context(value, |name| std::env::var(name).map(Some))
        .map(Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: match err.cause {
                VarError::NotPresent => format!("${{{}}} not set", err.var_name),
                VarError::NotUnicode(_) => format!("${{{}}} is not valid UTF-8", err.var_name),
            },
        })
}
