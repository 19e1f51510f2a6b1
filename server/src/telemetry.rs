/// Installs the global `tracing` subscriber.
///
/// Verbosity comes from `RUST_LOG`, e.g. `RUST_LOG=info` or
/// `RUST_LOG=tastyroot_core=debug,tastyroot_server=info`. With `RUST_LOG`
/// unset only errors are printed.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
