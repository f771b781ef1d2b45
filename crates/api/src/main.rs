//! TaskFlow - session credential manager
//!
//! Restores or establishes a session, prints the member profile and holds
//! the session until Ctrl-C.

use anyhow::Context as _;
use taskflow_domain::LoginRequest;
use taskflow_lib::utils::{execute_logged, init_tracing};
use taskflow_lib::AppContext;
use tracing::{info, warn};

const PASSWORD_ENV: &str = "TASKFLOW_PASSWORD";

#[tokio::main]
#[allow(clippy::print_stdout)]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenvy::dotenv();
    init_tracing().context("installing tracing subscriber")?;
    match env_file {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => warn!(error = %err, "no .env loaded"),
    }

    let config = taskflow_infra::config::load().context("loading configuration")?;
    let context = AppContext::new(config).context("building session context")?;

    context.bootstrap().await;

    if let Some(email) = login_email(std::env::args().skip(1)) {
        if context.session.is_authenticated() {
            context.session.logout().await;
        }
        let password = std::env::var(PASSWORD_ENV)
            .with_context(|| format!("{PASSWORD_ENV} must be set with --login"))?;
        execute_logged("session::login", || {
            context.session.login(LoginRequest::new(email, password))
        })
        .await?;
    }

    if !context.session.is_authenticated() {
        info!("not signed in; pass --login <email> with {PASSWORD_ENV} set");
        return Ok(());
    }

    let profile = execute_logged("member::profile", || context.api.profile()).await?;
    println!("{}", serde_json::to_string_pretty(&profile)?);

    info!("session active; press Ctrl-C to sign out");
    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;

    context.session.logout().await;
    context.shutdown();
    Ok(())
}

fn login_email(mut args: impl Iterator<Item = String>) -> Option<String> {
    while let Some(arg) = args.next() {
        if let Some(email) = arg.strip_prefix("--login=") {
            return Some(email.to_string());
        }
        if arg == "--login" {
            return args.next();
        }
    }
    None
}
