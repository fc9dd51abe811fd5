use usergate::api::v1::PublicUser;
use usergate::logger::*;
use usergate::server::Server;
use usergate::settings::*;

/// Look up an account by e-mail or user name the way login does.
///
/// $ cargo run --bin resolve_identity -- --settings=settings/dev.toml alice@example.com
#[derive(Debug, Parser)]
struct Args {
    #[arg(long)]
    settings: Option<String>,
    identifier: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(args.settings.as_deref())?;
    logger.reload_from_config(&LogConfig {
        filter: project_settings.log.filter.clone(),
    })?;

    let server = Server::try_new(&project_settings).await?;
    let outcome = server.identity_resolver.resolve_identity(&args.identifier).await;
    server.shutdown().await;

    match outcome {
        Ok(user) => {
            println!("{}", serde_json::to_string_pretty(&PublicUser::from(user))?);
            Ok(())
        }
        Err(e) => {
            error!(identifier = %args.identifier, "lookup failed");
            Err(e.into())
        }
    }
}
