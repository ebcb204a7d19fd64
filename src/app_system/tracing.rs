/// Configure tracing once for the whole process.
///
/// `RUST_LOG` wins when set. Otherwise the level follows the `-v` count:
/// warnings only by default, `info` with `-v`, `debug` with `-vv`. Logs go
/// to stderr so command output on stdout stays clean.
pub fn setup_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
