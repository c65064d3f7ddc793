use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use session_guard::{
    ApiError, AuthConfig, AuthController, AuthError, EndpointConfig, GuardDecision, HttpSessionApi, LogoutMethod,
    Navigation, Navigator, RouteGuard, RouteTable,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing credentials; pass --username/--password or set SESSION_USERNAME/SESSION_PASSWORD")]
    MissingCredentials,
    #[error("http client setup failed: {0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("invalid route table: {0}")]
    InvalidRoutes(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "session-guard", about = "Drive the auth controller and route guard against a session service")]
struct Cli {
    #[arg(long, env = "SESSION_BASE_URL", default_value = session_guard::config::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "SESSION_LOGOUT_METHOD")]
    logout_method: Option<LogoutMethod>,

    #[command(flatten)]
    credentials: CredentialArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long, env = "SESSION_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "SESSION_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the session endpoint.
    Check,
    /// Log in, then confirm with a session probe.
    Login,
    /// Log in, then log out.
    Logout,
    /// Create an account.
    Register {
        #[arg(long)]
        password_confirm: Option<String>,
    },
    /// Run the route guard over a sequence of paths.
    Walk {
        paths: Vec<String>,

        /// Log in before the first navigation.
        #[arg(long, default_value_t = false)]
        login: bool,

        /// JSON route table; defaults to login pre-login-only, home protected.
        #[arg(long)]
        routes: Option<String>,
    },
}

/// Prints redirects instead of performing them.
struct TracingNavigator;

#[async_trait::async_trait]
impl Navigator for TracingNavigator {
    async fn navigate_to(&self, path: &str) {
        tracing::info!(%path, "navigate");
        println!("navigate {path}");
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut endpoints = EndpointConfig::from_env();
    endpoints.base_url = cli.base_url.trim_end_matches('/').to_owned();
    if let Some(method) = cli.logout_method {
        endpoints.logout_method = method;
    }

    let api = Arc::new(HttpSessionApi::new(endpoints)?);
    let config = AuthConfig::from_env().with_check_on_init(false);
    let controller = AuthController::builder(api, Arc::new(TracingNavigator))
        .config(config)
        .on_login(|| async { tracing::info!("session established") })
        .on_error(|err| tracing::warn!(kind = %err.kind, message = %err.message, "auth error"))
        .build();

    match cli.command {
        Command::Check => run_check(&controller).await,
        Command::Login => run_login(&controller, &cli.credentials).await,
        Command::Logout => {
            run_login(&controller, &cli.credentials).await?;
            controller.logout().await?;
            println!("logged out");
            Ok(())
        }
        Command::Register { password_confirm } => {
            let (username, password) = credentials(&cli.credentials)?;
            let confirm = password_confirm.as_deref().unwrap_or(password);
            controller.register(username, password, confirm).await?;
            println!("registered {username}");
            Ok(())
        }
        Command::Walk { paths, login, routes } => {
            if login {
                run_login(&controller, &cli.credentials).await?;
            }
            let routes = match routes {
                Some(raw) => serde_json::from_str::<RouteTable>(&raw)?,
                None => RouteTable::from_config(controller.config()),
            };
            run_walk(RouteGuard::new(controller, routes), &paths).await;
            Ok(())
        }
    }
}

fn credentials(args: &CredentialArgs) -> Result<(&str, &str), CliError> {
    match (args.username.as_deref(), args.password.as_deref()) {
        (Some(username), Some(password)) => Ok((username, password)),
        _ => Err(CliError::MissingCredentials),
    }
}

async fn run_check(controller: &AuthController) -> Result<(), CliError> {
    let outcome = controller.check_session().await;
    println!("{}", if outcome.valid { "valid" } else { "invalid" });
    Ok(())
}

async fn run_login(controller: &AuthController, args: &CredentialArgs) -> Result<(), CliError> {
    let (username, password) = credentials(args)?;
    controller.login(username, password).await?;
    println!("logged in as {username}");
    run_check(controller).await
}

async fn run_walk(guard: RouteGuard, paths: &[String]) {
    let mut from: Option<String> = None;
    for path in paths {
        let mut nav = Navigation::client(path.as_str());
        if let Some(prev) = from.take() {
            nav = nav.from_path(prev);
        }
        let decision = guard.before_each(&nav).await;
        match &decision {
            GuardDecision::Allowed => println!("{path} -> allowed"),
            GuardDecision::Redirecting { target } => println!("{path} -> redirect {target}"),
        }
        from = Some(decision.target().unwrap_or(path).to_owned());
    }
}
