// Driver: merge options, validate, persist, post and report.
// Everything the user sees on stdout is written to the `out` handle so the
// whole flow can run in tests against a mock transport.

use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use crate::api::Transport;
use crate::cli::Cli;
use crate::config;
use crate::error::{Result, SoundlrousError};
use crate::options::PostOptions;
use crate::publisher::{Credentials, Delivery, ServiceKind, ServiceRegistry};

/// Environment fallback for the SoundCloud client id. Used for the resolve
/// call only and never written to the config file.
pub const CLIENT_ID_ENV: &str = "SOUNDLROUS_CLIENT_ID";

/// Printed in place of a service response on dry runs.
pub const DRY_RUN_RESPONSE: &str = "Running debug mode.";

/// Everything validated and ready to post.
#[derive(Debug)]
pub struct Plan {
    pub service: ServiceKind,
    pub credentials: Credentials,
    pub options: PostOptions,
}

/// `defaults ⊕ persisted ⊕ cli`, each layer overriding the one before.
pub fn effective_options(persisted: PostOptions, cli: PostOptions) -> PostOptions {
    PostOptions::defaults().merge(persisted).merge(cli)
}

/// Check the required fields and split the credentials and service off
/// the options that go to the publisher.
pub fn plan(options: PostOptions, registry: &ServiceRegistry) -> Result<Plan> {
    let missing = |name: &str| SoundlrousError::MissingArgument(name.to_string());

    let email = options.email.clone().ok_or_else(|| missing("email"))?;
    let password = options
        .password
        .clone()
        .ok_or_else(|| missing("password (config key `passw`)"))?;
    if options.url.is_none() {
        return Err(missing("url"));
    }
    let service_name = options.service.clone().ok_or_else(|| missing("service"))?;
    let service = registry.lookup(&service_name)?;

    let options = PostOptions {
        email: None,
        password: None,
        service: None,
        ..options
    };

    Ok(Plan {
        service,
        credentials: Credentials { email, password },
        options,
    })
}

/// Run one invocation and return the process exit status.
pub fn execute<T, W>(cli: &Cli, registry: &ServiceRegistry, transport: &T, out: &mut W) -> i32
where
    T: Transport + ?Sized,
    W: Write,
{
    match run(cli, registry, transport, out) {
        Ok(()) => 0,
        Err(e) => {
            let code = e.exit_code();
            if let Err(io) = print_failure(out, &e) {
                error!(error = %io, "could not write to stdout");
            }
            code
        }
    }
}

fn print_failure<W: Write>(out: &mut W, e: &SoundlrousError) -> std::io::Result<()> {
    match e {
        SoundlrousError::MissingArgument(_) => {
            writeln!(out, "{e}")?;
            writeln!(out)?;
            write!(out, "{}", Cli::usage())
        }
        _ => {
            error!(error = %e, "giving up");
            writeln!(out, "Error: {e}")
        }
    }
}

/// Run one invocation: merge, validate, maybe persist, post, print.
pub fn run<T, W>(cli: &Cli, registry: &ServiceRegistry, transport: &T, out: &mut W) -> Result<()>
where
    T: Transport + ?Sized,
    W: Write,
{
    let config_path = config::resolve_config_path(cli.config.as_deref());
    let persisted = config::load(&config_path, out);
    let options = effective_options(persisted, cli.to_options());
    debug!(config = %config_path.display(), "options merged");

    let mut plan = plan(options.clone(), registry)?;

    if config::should_save(&config_path, &options) {
        config::save(&config_path, &options)?;
    }
    if plan.options.client_id.is_none() {
        plan.options.client_id = client_id_from_env();
    }

    let publisher = plan.service.publisher(plan.credentials);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Posting to {}...", plan.service));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let delivery = publisher.post(transport, &plan.options, cli.dry_run);
    spinner.finish_and_clear();

    report(out, plan.service, &delivery?)?;
    Ok(())
}

fn client_id_from_env() -> Option<String> {
    std::env::var(CLIENT_ID_ENV)
        .ok()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

fn report<W: Write>(out: &mut W, service: ServiceKind, delivery: &Delivery) -> std::io::Result<()> {
    let response = match delivery {
        Delivery::Sent(response) => response.body.as_str(),
        Delivery::DryRun(request) => {
            writeln!(out, "{request}")?;
            DRY_RUN_RESPONSE
        }
    };
    writeln!(out, "Posted to {service}")?;
    writeln!(out, "Response:")?;
    writeln!(out, "{response:?}")
}
