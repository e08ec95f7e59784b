use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

fn default_directives(debug: bool) -> &'static str {
    if debug {
        "info,tf_core=debug,tf_scraper=debug,tf_inference=debug,tf_storage=debug,tf_web=debug,tf_cli=debug"
    } else {
        "info"
    }
}

/// Logs go to stderr so `tf analyze` output stays pipeable. `RUST_LOG` wins when set.
pub fn init_logging(debug: bool) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
