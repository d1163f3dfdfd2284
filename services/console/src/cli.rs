use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::io::BufReader;

use crate::demo::{run_demo, DemoArgs};
use crate::infra::{bootstrap, parse_id, ClientContext};
use crate::prompt::{mount, run_interactive, ConsoleWizard};
use crate::server;
use finapp::applications::{
    format_currency, ApplicationDetail, ApplicationId, ApplicationPayload, ApplicationRecord,
    ApplicationStorage, ApplicationTotals, ApplicationsPage, IdentityEvent,
};
use finapp::error::AppError;
use finapp::routes::{guard, Access, Route};
use finapp::session::IdentityError;

#[derive(Parser, Debug)]
#[command(
    name = "finapp",
    about = "Create and manage financial applications from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the development storage backend (default command)
    Serve(ServeArgs),
    /// Work with submitted applications
    Applications {
        #[command(subcommand)]
        command: ApplicationsCommand,
    },
    /// Fill in and submit a new application interactively
    Create,
    /// Show or change display preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
    /// Run a scripted end-to-end session against in-memory collaborators
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ApplicationsCommand {
    /// List the signed-in user's applications
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one application with its totals
    Show {
        #[arg(value_parser = parse_id)]
        id: ApplicationId,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Delete an application
    Delete {
        #[arg(value_parser = parse_id)]
        id: ApplicationId,
    },
    /// Replace an application with the payload in a JSON file
    Update {
        #[arg(value_parser = parse_id)]
        id: ApplicationId,
        /// Path to a JSON application payload
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum PrefsCommand {
    /// Print the current preferences
    Show,
    /// Collapse the sidebar
    Collapse,
    /// Expand the sidebar
    Expand,
    /// Flip the sidebar state
    Toggle,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    record: &'a ApplicationRecord,
    totals: ApplicationTotals,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
        Command::Applications { command } => {
            let context = ClientContext::from_config(bootstrap()?);
            run_applications(&context, command).await
        }
        Command::Create => {
            let context = ClientContext::from_config(bootstrap()?);
            run_create(&context).await
        }
        Command::Prefs { command } => {
            let context = ClientContext::from_config(bootstrap()?);
            run_prefs(&context, command);
            Ok(())
        }
    }
}

async fn run_applications(
    context: &ClientContext,
    command: ApplicationsCommand,
) -> Result<(), AppError> {
    let route = match &command {
        ApplicationsCommand::List { .. } => Route::Applications,
        ApplicationsCommand::Show { id, .. }
        | ApplicationsCommand::Delete { id }
        | ApplicationsCommand::Update { id, .. } => Route::Application { id: id.clone() },
    };
    if let Access::Redirect(target) = guard(&route, context.identity.as_ref()).await {
        eprintln!("not signed in; set APP_SESSION_USER_ID and APP_SESSION_EMAIL (redirect {target})");
        return Err(IdentityError::NotAuthenticated.into());
    }

    let storage = context.storage.as_ref();
    match command {
        ApplicationsCommand::List { json } => {
            let mut page = ApplicationsPage::new();
            page.load(context.identity.as_ref(), storage).await;
            if let Some(error) = page.error() {
                eprintln!("{error}");
                return Ok(());
            }

            let summaries = page.summaries();
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries).map_err(std::io::Error::from)?);
            } else if summaries.is_empty() {
                println!("No applications yet; run `finapp create` to start one.");
            } else {
                for summary in summaries {
                    println!(
                        "{:<28} {:<20} {:>3}  {}",
                        summary.id, summary.name, summary.age, summary.email
                    );
                }
            }
        }
        ApplicationsCommand::Show { id, json } => {
            let detail = ApplicationDetail::load(id, storage).await;
            match (detail.record(), detail.totals()) {
                (Some(record), Some(totals)) if json => {
                    let output = ShowOutput { record, totals };
                    println!("{}", serde_json::to_string_pretty(&output).map_err(std::io::Error::from)?);
                }
                (Some(record), Some(totals)) => print_record(record, &totals),
                _ => eprintln!("{}", detail.error().unwrap_or("Application not found")),
            }
        }
        ApplicationsCommand::Delete { id } => {
            let mut detail = ApplicationDetail::new(id.clone());
            match detail.delete(storage).await {
                Some(route) => println!("deleted {id}; back to {route}"),
                None => eprintln!("{}", detail.error().unwrap_or("Failed to delete application")),
            }
        }
        ApplicationsCommand::Update { id, file } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            let payload: ApplicationPayload =
                serde_json::from_str(&raw).map_err(std::io::Error::from)?;
            let record = storage.update_application(&id, payload).await?;
            println!("updated {}", record.id);
        }
    }
    Ok(())
}

fn print_record(record: &ApplicationRecord, totals: &ApplicationTotals) {
    let details = &record.body.personal_details;
    println!("{} ({})", details.name, record.id);
    println!("  age {} | {}", details.age, details.email);
    println!(
        "  income {} | expenses {} | assets {} | liabilities {}",
        format_currency(totals.income),
        format_currency(totals.expenses),
        format_currency(totals.assets),
        format_currency(totals.liabilities)
    );
    println!("  net worth {}", format_currency(totals.net_worth()));
}

async fn run_create(context: &ClientContext) -> Result<(), AppError> {
    let mut wizard = mount(&context.local);
    if let IdentityEvent::Unavailable(reason) =
        wizard.resolve_identity(context.identity.as_ref()).await
    {
        eprintln!("warning: {reason}; submitting will require a session");
    }

    let session = ConsoleWizard::new(wizard, context.submission());
    run_interactive(session, BufReader::new(tokio::io::stdin())).await
}

fn run_prefs(context: &ClientContext, command: PrefsCommand) {
    let preferences = context.preferences();
    let collapsed = match command {
        PrefsCommand::Show => preferences.sidebar_collapsed(),
        PrefsCommand::Collapse => {
            preferences.set_sidebar_collapsed(true);
            true
        }
        PrefsCommand::Expand => {
            preferences.set_sidebar_collapsed(false);
            false
        }
        PrefsCommand::Toggle => preferences.toggle_sidebar(),
    };
    println!(
        "sidebar: {}",
        if collapsed { "collapsed" } else { "expanded" }
    );
    println!("local state: {}", context.local.path().display());
    println!("api endpoint: {}", context.config.api.endpoint);
}
