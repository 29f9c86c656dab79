// SPDX-License-Identifier: MPL-2.0
use amap_console::app::{App, Flags};
use amap_console::routing::Navigation;
use amap_console::ui::login::LoginOutcome;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "\
Usage: amap-console [OPTIONS] [PATH]

Boots the console core, restores any saved session and shows what PATH
(default `/`) would display.

Options:
  --lang TAG          Language to use (e.g. fr, en)
  --config-dir DIR    Directory holding settings.toml
  --data-dir DIR      Directory holding the saved session and language
  --email EMAIL       Sign in with this email (requires --password)
  --password PASS     Password for --email
  --sign-out          Sign out before resolving PATH
  -h, --help          Print this help";

struct Args {
    flags: Flags,
    email: Option<String>,
    password: Option<String>,
    sign_out: bool,
    path: String,
}

fn parse_args() -> Result<Option<Args>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    let flags = Flags {
        lang: args.opt_value_from_str("--lang")?,
        config_dir: args.opt_value_from_str("--config-dir")?,
        data_dir: args.opt_value_from_str("--data-dir")?,
    };
    let email = args.opt_value_from_str("--email")?;
    let password = args.opt_value_from_str("--password")?;
    let sign_out = args.contains("--sign-out");
    let path = args
        .finish()
        .into_iter()
        .next()
        .and_then(|s| s.into_string().ok())
        .unwrap_or_else(|| "/".to_string());

    Ok(Some(Args {
        flags,
        email,
        password,
        sign_out,
        path,
    }))
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("amap_console=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            eprintln!("error: {error}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let mut app = match App::new(args.flags) {
        Ok(app) => app,
        Err(error) => {
            tracing::error!(%error, "cannot load translations");
            return ExitCode::FAILURE;
        }
    };
    app.initialize().await;

    if args.sign_out {
        app.sign_out();
    }
    let mut exit = ExitCode::SUCCESS;
    if let Some(email) = args.email.as_deref() {
        let password = args.password.as_deref().unwrap_or_default();
        if !matches!(app.sign_in(email, password).await, LoginOutcome::SignedIn { .. }) {
            exit = ExitCode::FAILURE;
        }
    }

    let navigation = app.navigate(&args.path);
    let navbar = app.navbar();
    println!(
        "[{}] {}",
        navbar.language_badge,
        navbar.user_email.as_deref().unwrap_or("-")
    );
    println!("{}", app.describe(&navigation));
    if let (Navigation::Render(route), Some(_)) = (&navigation, &navbar.user_email) {
        for item in app.sidebar(route) {
            println!("  {} {}", if item.active { '>' } else { ' ' }, item.label);
        }
    }
    for toast in app.toasts() {
        println!("{toast}");
    }
    exit
}
