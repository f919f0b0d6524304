use clap::Parser;
use tracing_subscriber::EnvFilter;

use eduboard::cli::{Cli, Command, run_classify_command, run_doctor_command, run_enhance_command};
use eduboard::config::Config;
use eduboard::demo::DemoServices;
use eduboard::web::WebServer;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("eduboard=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    // LOG_FORMAT=json for log shippers
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    init_tracing();

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            serve(config).await
        }
        Command::Classify { input } => run_classify_command(&config, &input).await,
        Command::Enhance { text, file, url } => {
            run_enhance_command(&config, text, file.as_deref(), url.as_deref()).await
        }
        Command::Doctor => run_doctor_command(&config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let services = DemoServices::from_config(&config);
    let mut server = WebServer::new(config.server.clone(), services);
    let addr = server.start().await?;

    eprintln!("EduAI is running at http://{}", addr);
    eprintln!("Press Ctrl-C to stop.");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl-C, shutting down");
    server.shutdown().await;
    Ok(())
}
