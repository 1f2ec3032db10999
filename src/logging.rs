use tracing_subscriber::EnvFilter;

/// Log level variable set by the execution environment.
pub const LOG_LEVEL_ENV: &str = "AWS_LAMBDA_LOG_LEVEL";
/// `JSON` selects structured output, anything else plain text.
pub const LOG_FORMAT_ENV: &str = "AWS_LAMBDA_LOG_FORMAT";

/// Installs a `tracing` subscriber writing to stdout.
///
/// The filter comes from `AWS_LAMBDA_LOG_LEVEL`, then `RUST_LOG`, then
/// defaults to `info`. Calling this more than once is harmless.
pub fn init_default_subscriber() {
    let lookup = |key: &str| std::env::var(key).ok();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_from(lookup))
        .with_target(false)
        .with_ansi(false)
        .without_time();

    // Err means a global subscriber already exists.
    let _ = if json_format_from(lookup) {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Picks the log filter from the variables visible through `lookup`.
#[must_use]
pub fn filter_from<F>(lookup: F) -> EnvFilter
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOG_LEVEL_ENV)
        .and_then(|level| EnvFilter::try_new(level.to_lowercase()).ok())
        .or_else(|| {
            lookup(EnvFilter::DEFAULT_ENV).and_then(|directives| EnvFilter::try_new(directives).ok())
        })
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Whether `lookup` asks for JSON log lines.
#[must_use]
pub fn json_format_from<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOG_FORMAT_ENV).is_some_and(|format| format.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracing_subscriber::filter::LevelFilter;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn lambda_log_level_wins_over_rust_log() {
        let filter = filter_from(lookup(&[(LOG_LEVEL_ENV, "DEBUG"), ("RUST_LOG", "warn")]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn rust_log_is_used_without_lambda_log_level() {
        let filter = filter_from(lookup(&[("RUST_LOG", "warn")]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn defaults_to_info() {
        let filter = filter_from(lookup(&[]));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn json_format_is_case_insensitive() {
        assert!(json_format_from(lookup(&[(LOG_FORMAT_ENV, "JSON")])));
        assert!(json_format_from(lookup(&[(LOG_FORMAT_ENV, "json")])));
        assert!(!json_format_from(lookup(&[(LOG_FORMAT_ENV, "Text")])));
        assert!(!json_format_from(lookup(&[])));
    }
}
