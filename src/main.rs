use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use rudis::server::{Server, ServerConfig};

/// Entry point: parse flags, set up logging, run the server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ServerConfig::from_args(std::env::args())?;
    let server = Server::new(config);

    server.run().await
}
