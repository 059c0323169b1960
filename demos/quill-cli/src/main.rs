use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use quill::QuillClientBuilder;
use quill::prelude::*;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "quill", about = "Talk to a Quill blog API with a managed session")]
struct Args {
    /// API base URL
    #[arg(long, env = "QUILL_API_URL")]
    api_url: Option<String>,

    /// Email address or username to sign in with
    #[arg(short, long, env = "QUILL_USER")]
    user: Option<String>,

    /// Password for --user. Prefer the environment variable
    #[arg(long, env = "QUILL_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the signed-in user
    Whoami,
    /// Fetch the profile from the server
    Profile,
    /// Change the display name
    Rename { display_name: String },
    /// GET an API path with the session's bearer token
    Get { path: String },
    /// Sign in, then sign out again
    Logout,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Resumes a session or signs in with the given credentials.
async fn sign_in(session: &quill::Session, args: &Args) -> anyhow::Result<()> {
    if session.bootstrap().await {
        return Ok(());
    }
    let (Some(user), Some(password)) = (&args.user, &args.password) else {
        bail!("not signed in: pass --user and set QUILL_PASSWORD");
    };
    let user = session.login(user, password).await.context("sign-in failed")?;
    tracing::info!(user = %user.id, role = %user.role, "signed in");
    Ok(())
}

fn print_user(user: &User) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(user)?);
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &args.api_url {
        config.api_url = url.clone();
    }
    let client = QuillClientBuilder::from_config(config).build()?;
    let session = client.session();

    sign_in(session, &args).await?;

    match &args.command {
        Command::Whoami => {
            let user = session.user().context("session has no user")?;
            print_user(&user)?;
        }
        Command::Profile => print_user(&session.fetch_profile().await?)?,
        Command::Rename { display_name } => {
            let update = ProfileUpdate {
                display_name: Some(display_name.clone()),
                ..ProfileUpdate::default()
            };
            print_user(&session.update_profile(&update).await?)?;
        }
        Command::Get { path } => {
            let response = session.authenticated_fetch(ApiRequest::get(path.as_str())).await?;
            let body: serde_json::Value = serde_json::from_slice(&response.body)
                .unwrap_or_else(|_| String::from_utf8_lossy(&response.body).into_owned().into());
            println!("{} {}", response.status, serde_json::to_string_pretty(&body)?);
            if !response.is_success() {
                bail!("request failed with status {}", response.status);
            }
        }
        Command::Logout => {
            session.logout().await;
            println!("signed out");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    run(Args::parse()).await
}
