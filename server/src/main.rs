use tastyroot_server::{telemetry, ServerConfig, ServerError};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    telemetry::setup_tracing();

    let config = ServerConfig::from_env()?;
    let (router, _backend) = tastyroot_server::app(&config).await?;

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    tastyroot_server::run(listener, router).await?;
    Ok(())
}
