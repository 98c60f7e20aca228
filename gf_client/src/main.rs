//! Command-line client for the greenify daily impact tracker.
//!
//! Logs in against the backend, keeps the token under the data directory and
//! records today's entry.

use anyhow::{Context, Result};
use gf_client::{
    DailyEntryReconciler, Outcome, SessionManager, StreakReader,
    commands::{Command, LogEdits, parse_command},
    config::ClientConfig,
    token_store::FileTokenStore,
};
use pico_args::Arguments;
use std::{path::PathBuf, sync::Arc};

const HELP: &str = "\
Track your daily environmental impact

USAGE:
  gf_client [OPTIONS] COMMAND [ARGS]

OPTIONS:
  --server URL          Server URL  [default: env GREENIFY_SERVER or http://localhost:8080]
  --data-dir DIR        Where the login token is kept  [default: env GREENIFY_DATA_DIR or ~/.greenify]

FLAGS:
  -h, --help            Print help information

COMMANDS:
  register USER EMAIL PASS    Create an account and log in
  login USER PASS             Log in
  logout                      Forget the stored login
  whoami                      Show the logged-in account
  today                       Show today's entry and points
  log [--trash N] [--recycle N] [--miles M] [--bottle] [--bag]
                              Update and save today's entry
  streak                      Show current and longest streak
  rename NEW_USERNAME         Change username
  passwd NEW_PASSWORD         Change password
  delete-account              Delete the account and log out
";

struct Args {
    config: ClientConfig,
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_target(false)
        .init();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let server: Option<String> = pargs
        .opt_value_from_str("--server")
        .context("Invalid --server value")?;
    let data_dir: Option<PathBuf> = pargs
        .opt_value_from_str("--data-dir")
        .context("Invalid --data-dir value")?;

    let free: Vec<String> = pargs
        .finish()
        .into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let args = Args {
        config: ClientConfig::from_env().with_overrides(server, data_dir),
        command: parse_command(&free)?,
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let store = FileTokenStore::new(&args.config.data_dir);
    let session = Arc::new(
        SessionManager::new(args.config.server_url.clone(), Box::new(store))
            .context("Failed to load the stored login")?,
    );

    match args.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            session
                .register_and_login(&username, &email, &password)
                .await?;
            println!("Registered and logged in as {}", username);
        }
        Command::Login { username, password } => {
            session.login(&username, &password).await?;
            println!("Logged in as {}", username);
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Command::WhoAmI => {
            if !session.is_authenticated() {
                println!("Not logged in");
            } else {
                match session.fetch_identity().await {
                    Some(identity) => println!("{} <{}>", identity.username, identity.email),
                    None if session.is_authenticated() => {
                        println!("Logged in (account details unavailable)")
                    }
                    None => println!("Session expired, please log in again"),
                }
            }
        }
        Command::Today => {
            let entry = DailyEntryReconciler::for_today(session.clone());
            entry.load().await;
            if !session.is_authenticated() {
                println!("Not logged in; showing an empty day");
            }
            println!("{}", entry.summary());
        }
        Command::Log(edits) => log_today(session, edits).await?,
        Command::Streak => match StreakReader::new(session).get_streak().await {
            Some(streak) => {
                println!(
                    "Current streak: {} day(s), longest: {} day(s)",
                    streak.current, streak.longest
                );
                if let Some(goal) = streak.goal {
                    println!("A day counts once it reaches {} points", goal);
                }
            }
            None => println!("No streak data yet"),
        },
        Command::Rename { new_username } => {
            session.change_username(&new_username).await?;
            println!("Username changed to {}", new_username.trim());
        }
        Command::ChangePassword { new_password } => {
            session.change_password(&new_password).await?;
            println!("Password changed");
        }
        Command::DeleteAccount => {
            session.delete_account().await?;
            println!("Account deleted");
        }
    }

    Ok(())
}

/// Load today's entry, apply the edits on top and save
async fn log_today(session: Arc<SessionManager>, edits: LogEdits) -> Result<()> {
    let entry = DailyEntryReconciler::for_today(session);
    entry.load().await;

    if let Some(trash) = edits.trash {
        entry.set_trash_count(trash);
    }
    if let Some(recycle) = edits.recycle {
        entry.set_recycle_count(recycle);
    }
    if let Some(miles) = edits.miles.as_deref() {
        entry.set_miles_text(miles);
    }
    if edits.bottle {
        entry.set_reusable_bottle(true);
    }
    if edits.bag {
        entry.set_reusable_bag(true);
    }

    println!("Projected: {} points", entry.projected_points());

    match entry.save().await? {
        Outcome::Applied(points) => println!("Saved {}: {} points", entry.date(), points),
        Outcome::Stale => println!("Entry changed while saving; run 'today' to check"),
    }

    Ok(())
}
