use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use kestrel_common::{DEFAULT_HOST, DEFAULT_PORT, MAX_CONNECTIONS};
use kestrel_server::run;
use kestrel_storage::Db;

#[derive(Parser, Debug)]
#[command(name = "kestrel-server", about = "Kestrel — in-memory key-value server")]
struct Args {
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
    #[arg(long, default_value_t = MAX_CONNECTIONS)]
    max_connections: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kestrel_server=info".into()),
        )
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let listener = TcpListener::bind(&addr).await?;
    info!("Kestrel escutando em {addr}");

    let db = Db::new();
    run(listener, db, args.max_connections, shutdown_signal()).await;

    Ok(())
}

/// Completa no Ctrl-C. Se o handler não puder ser instalado, o servidor
/// segue rodando em vez de desligar na hora.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("falha ao instalar handler de Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
