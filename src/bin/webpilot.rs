//! webpilot interactive CLI
//!
//! Numbered-menu front end over the task dispatcher: run tasks, manage
//! provider credentials, and restart or close the persistent browser
//! session.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use webpilot::{
    ChromeBackend, CredentialStore, Error, LaunchOptions, ModelCatalog, PageAgent,
    ProviderClientFactory, SessionManager, TaskDispatcher,
};

#[derive(Parser)]
#[command(name = "webpilot")]
#[command(version)]
#[command(about = "Dispatch natural-language tasks to a browser agent", long_about = None)]
struct Cli {
    /// Run the browser without a visible window (default: headed)
    #[arg(long)]
    headless: bool,

    /// Path to the credential file (default: ~/.webpilot/credentials.json)
    #[arg(long, value_name = "PATH")]
    credential_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    env_logger::init();

    let cli = Cli::parse();

    let credentials = match cli.credential_file {
        Some(ref path) => CredentialStore::new(path.clone()),
        None => CredentialStore::open_default()?,
    };

    let options = LaunchOptions::new().headless(cli.headless);
    let session = SessionManager::new(ChromeBackend, options);
    let mut dispatcher = TaskDispatcher::new(
        ModelCatalog::builtin(),
        credentials,
        session,
        Box::new(ProviderClientFactory),
        Box::new(PageAgent),
    );

    eprintln!("webpilot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "Browser mode: {}",
        if cli.headless { "headless" } else { "headed" }
    );

    let result = run_menus(&mut dispatcher).await;

    // Single shutdown funnel: menu exit, EOF and Ctrl-C all land here.
    // close_session is idempotent, with Drop behind it as the backstop.
    dispatcher.close_session();
    result
}

/// Prompt and read one line. `None` means EOF or Ctrl-C: time to leave.
async fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let read = tokio::task::spawn_blocking(|| {
        let mut buf = String::new();
        let n = std::io::stdin().read_line(&mut buf)?;
        Ok::<(usize, String), std::io::Error>((n, buf))
    });

    tokio::select! {
        joined = read => {
            let (n, buf) = joined??;
            if n == 0 {
                Ok(None)
            } else {
                Ok(Some(buf.trim().to_string()))
            }
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!();
            Ok(None)
        }
    }
}

async fn run_menus(dispatcher: &mut TaskDispatcher<ChromeBackend>) -> Result<()> {
    loop {
        println!("\nBrowser Automation Menu");
        println!("=======================");
        println!("1. Run task");
        println!("2. Manage credentials");
        println!("3. Restart browser session");
        println!("4. Close browser session");
        println!("5. Exit");

        let Some(choice) = read_line("\nSelect an option (1-5): ").await? else {
            return Ok(());
        };

        match choice.as_str() {
            "1" => run_task_flow(dispatcher).await?,
            "2" => credentials_menu(dispatcher).await?,
            "3" => match dispatcher.reset_session() {
                Ok(()) => println!("Browser session restarted"),
                Err(e) => println!("Failed to restart the session: {}", e),
            },
            "4" => {
                dispatcher.close_session();
                println!("Browser session closed");
            }
            "5" => return Ok(()),
            "" => {}
            _ => println!("Invalid choice"),
        }
    }
}

async fn run_task_flow(dispatcher: &mut TaskDispatcher<ChromeBackend>) -> Result<()> {
    let Some(provider_id) = choose_provider(dispatcher).await? else {
        return Ok(());
    };

    loop {
        let Some(task) = read_line("\nEnter your task (or 'exit' to return): ").await? else {
            return Ok(());
        };
        if task.is_empty() {
            println!("Task cannot be empty");
            continue;
        }
        if task.eq_ignore_ascii_case("exit") {
            return Ok(());
        }

        match dispatcher.run_task(&task, &provider_id).await {
            Ok(outcome) => {
                println!("\n{}", outcome.summary);
                if let Some(url) = outcome.final_url {
                    println!("(finished on {})", url);
                }
            }
            Err(Error::MissingCredential(_)) => {
                println!("No credential found for this provider.");
                if !enroll_flow(dispatcher, &provider_id).await? {
                    return Ok(());
                }
            }
            Err(Error::SessionInit(reason)) => {
                println!("Failed to start the browser session: {}", reason);
                let Some(answer) = read_line("Retry? (y/n): ").await? else {
                    return Ok(());
                };
                if !answer.eq_ignore_ascii_case("y") {
                    return Ok(());
                }
            }
            Err(e) => {
                println!("Task failed: {}", e);
                println!("The browser session is still running; restart it from the main menu if it misbehaves.");
            }
        }
    }
}

/// Prompt for a secret, probe it, persist on success. Returns whether a
/// credential was enrolled.
async fn enroll_flow(
    dispatcher: &TaskDispatcher<ChromeBackend>,
    provider_id: &str,
) -> Result<bool> {
    loop {
        let Some(secret) = read_line("Enter API key: ").await? else {
            return Ok(false);
        };

        match dispatcher.enroll(provider_id, &secret).await {
            Ok(()) => {
                println!("Credential verified and saved");
                return Ok(true);
            }
            Err(e @ (Error::InvalidCredential(_) | Error::ProbeFailed(_))) => println!("{}", e),
            Err(e) => {
                println!("Failed to save credential: {}", e);
                return Ok(false);
            }
        }

        let Some(answer) = read_line("Try again? (y/n): ").await? else {
            return Ok(false);
        };
        if !answer.eq_ignore_ascii_case("y") {
            return Ok(false);
        }
    }
}

async fn credentials_menu(dispatcher: &mut TaskDispatcher<ChromeBackend>) -> Result<()> {
    loop {
        println!("\nCredential Management");
        println!("=====================");
        println!("1. Add/Update credential");
        println!("2. Remove credential");
        println!("3. List status");
        println!("4. Return to main menu");

        let Some(choice) = read_line("\nSelect an option (1-4): ").await? else {
            return Ok(());
        };

        match choice.as_str() {
            "1" => {
                if let Some(id) = choose_provider(dispatcher).await? {
                    enroll_flow(dispatcher, &id).await?;
                }
            }
            "2" => {
                if let Some(id) = choose_provider(dispatcher).await? {
                    match dispatcher.remove_credential(&id) {
                        Ok(()) => println!("Credential removed"),
                        Err(e) => println!("Failed to remove credential: {}", e),
                    }
                }
            }
            "3" => print_status(dispatcher),
            "4" => return Ok(()),
            "" => {}
            _ => println!("Invalid choice"),
        }
    }
}

fn print_status(dispatcher: &TaskDispatcher<ChromeBackend>) {
    println!("\nAvailable Models:");
    println!("=================");
    for (i, status) in dispatcher.credential_status().iter().enumerate() {
        let mark = if status.has_credential { "✅" } else { "❌" };
        println!(
            "{}. {} ({}) {}",
            i + 1,
            status.display_name,
            status.pricing_tier,
            mark
        );
    }
}

/// Pick a provider from the catalog; auto-selects when there is only one.
async fn choose_provider(dispatcher: &TaskDispatcher<ChromeBackend>) -> Result<Option<String>> {
    let entries: Vec<(String, String)> = dispatcher
        .catalog()
        .all()
        .map(|d| (d.provider_id.clone(), d.display_name.clone()))
        .collect();

    if entries.len() == 1 {
        return Ok(Some(entries[0].0.clone()));
    }

    loop {
        println!("\nSelect a model:");
        for (i, (_, name)) in entries.iter().enumerate() {
            println!("{}. {}", i + 1, name);
        }

        let prompt = format!("\nSelect an option (1-{}): ", entries.len());
        let Some(choice) = read_line(&prompt).await? else {
            return Ok(None);
        };

        match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= entries.len() => return Ok(Some(entries[n - 1].0.clone())),
            _ => println!("Invalid choice"),
        }
    }
}
