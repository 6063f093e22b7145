use std::env;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins when set; otherwise every
/// module in `modules` logs at `log_level`.
pub fn setup(modules: &[&str], log_level: &str) {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", default_directives(modules, log_level));
    }
    get_subscriber().init();
}

pub fn default_directives(modules: &[&str], log_level: &str) -> String {
    modules
        .iter()
        .map(|module| format!("{module}={log_level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Logs go to stderr so that stdout carries only the query result.
pub fn get_subscriber() -> SubscriberBuilder<DefaultFields, Format, EnvFilter, fn() -> std::io::Stderr>
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr as fn() -> std::io::Stderr)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_directive_per_module() {
        assert_eq!(
            default_directives(&["seeql", "seeql_core"], "debug"),
            "seeql=debug,seeql_core=debug"
        );
    }
}
