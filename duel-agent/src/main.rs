use duel_agent::{Agent, AgentError, Config};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "agent exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AgentError> {
    let config = Config::from_env();
    let agent = Agent::start(config).await?;

    tracing::info!("agent started, waiting for shutdown signal");
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");

    agent.shutdown().await;
    Ok(())
}
