use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("dc_buildspace=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("dc_buildspace=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Environment variable overriding the JSON logger's filter.
pub const LOG_FILTER_ENV: &str = "DC_BUILDSPACE_LOG";

/// JSON lines on stderr, for CI hosts that collect structured build logs.
///
/// Event fields are flattened into the line and the fields of the current
/// span are attached, so every line logged during a tool run carries the
/// configuration and JDK alias of that run.
pub fn init_json_logger(verbose: bool) {
    let default_directives = if verbose {
        "dc_buildspace=debug,info"
    } else {
        "dc_buildspace=info"
    };
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer(std::io::stderr))
        .init();
}

fn json_layer<S, W>(make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(make_writer)
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(false)
}
