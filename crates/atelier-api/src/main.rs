use atelier_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    atelier_api::setup::init_tracing();

    let config = Config::from_env()?;

    let (_state, router) = atelier_api::setup::initialize_app(config.clone()).await?;

    atelier_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
