use review_assigner::{Server, config::AssignerConfig, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AssignerConfig::from_env()?;
    Server::run(config).await
}
