//! `explorer-kit track` command — feed a variant assignment to the exposure tracker.

use std::path::Path;

use serde_json::Value;

use super::load_context;
use crate::chain::Connection;
use crate::error::Error;

/// Interpret a CLI variant argument: JSON when it parses, a string otherwise.
#[must_use]
pub fn parse_variant(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// Execute the `track` command.
///
/// # Errors
///
/// Returns an error if configuration loading fails.
#[allow(clippy::print_stdout)]
pub fn run(config_path: &Path, experiment: &str, variant: &str) -> Result<(), Error> {
    let ctx = load_context(config_path, |_| Connection::default())?;
    let Some(experiments) = ctx.experiments() else {
        tracing::info!("growthbook is disabled, nothing tracked");
        return Ok(());
    };

    if experiments.on_assignment(experiment, &parse_variant(variant)) {
        println!("reported {experiment}");
    } else {
        println!("{experiment} already reported");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn variants_parse_as_json_or_string() {
        assert_eq!(parse_variant("true"), json!(true));
        assert_eq!(parse_variant("2"), json!(2));
        assert_eq!(parse_variant(r#""quoted""#), json!("quoted"));
        assert_eq!(parse_variant("control"), json!("control"));
    }
}
