use authkeep::{
    providers::oauth2::PasswordGrantProvider, ClientId, ClientSecret, Credentials, Tier,
    TokenManager, TokenStatus,
};
use clap::Parser;

#[derive(Debug, Parser)]
struct Opts {
    /// The issuing authority's token request URL
    #[arg(short, long, env)]
    token_url: reqwest::Url,

    /// The client ID of the client
    #[arg(short, long, env)]
    client_id: ClientId,

    /// The client secret used to identify the client to the issuing authority
    #[arg(short = 's', long, env, hide_env_values = true)]
    client_secret: Option<ClientSecret>,

    /// The user to log in as
    #[arg(short, long, env)]
    username: String,

    /// The user's password
    #[arg(short, long, env, hide_env_values = true)]
    password: String,

    /// The directory used to cache tokens
    #[arg(long, env, default_value = ".authkeep")]
    cache_dir: std::path::PathBuf,

    /// Remove any cached tokens before requesting a token
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let client = reqwest::Client::builder().https_only(true).build()?;

    let mut provider = PasswordGrantProvider::new(client, opts.token_url, opts.client_id);
    if let Some(secret) = opts.client_secret {
        provider = provider.with_client_secret(secret);
    }

    let credentials = Credentials::new(opts.username, opts.password);

    let mut manager = TokenManager::with_cache_dir(credentials, provider, opts.cache_dir).await;

    if opts.clear {
        match manager.clear_cache().await {
            Ok(()) => tracing::info!("removed cached tokens"),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no cached tokens to remove")
            }
            Err(error) => return Err(error.into()),
        }
    }

    let status = manager.status();
    let acquisition = manager.acquire().await?;

    match acquisition.tier {
        Tier::Memory => tracing::info!(?status, "reused cached token"),
        Tier::Refresh => tracing::info!(?status, "renewed token"),
        Tier::Login => tracing::warn!(?status, "had to log in again"),
    }

    tracing::info!(
        token = format_args!("{:#?}", acquisition.token),
        expiry = manager.expiry().0,
        fresh = (manager.status() == TokenStatus::Valid),
        "obtained id token"
    );

    Ok(())
}
