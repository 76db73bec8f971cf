use order_server::{Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    dotenv::dotenv().ok();

    let config = Config::from_env();
    order_server::utils::logger::init_logger(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!("🍜 Order server starting...");

    // 2. Initialize server state (store, registry, order manager)
    let state = ServerState::initialize(&config);

    // 3. Run the HTTP/WebSocket server until shutdown
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
