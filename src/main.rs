// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, start logging, build the HTTP client
//   and the service registry, then hand over to `app::execute`.

use clap::Parser;
use soundlrous::{api::ApiClient, app, cli::Cli, logging, publisher::ServiceRegistry};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(logging::format_from_env(cli.log_format), cli.verbose);

    let api = ApiClient::new()?;
    let registry = ServiceRegistry::new();

    let code = app::execute(&cli, &registry, &api, &mut std::io::stdout().lock());
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
