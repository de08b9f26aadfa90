use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ControllerEvent, HttpUsersGateway, SaveOutcome, SortKey, TracingErrorSink,
    UserListController, ViewSnapshot,
};
use shared::{domain::UserId, form::UserForm};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, Settings, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(about = "Browse and edit the remote users list")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Users resource URL, e.g. http://localhost:3000/users
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    page_size: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = SortKey::None)]
        sort: SortKey,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
    },
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<String>,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
}

fn apply_cli_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(v) = &cli.api_url {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = cli.page_size {
        settings.page_size = v;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)?;
    apply_cli_overrides(&mut settings, &cli);
    settings.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .with_context(|| format!("invalid log filter '{}'", settings.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(api_base_url = %settings.api_base_url, page_size = settings.page_size, "starting");

    let controller = UserListController::new_with_dependencies(
        Arc::new(HttpUsersGateway::new(settings.api_base_url.clone())),
        Arc::new(TracingErrorSink),
        settings.page_size()?,
    );
    spawn_event_logger(&controller);

    if !controller.load().await {
        bail!("failed to load users from {}", settings.api_base_url);
    }

    run_command(&controller, cli.command).await?;

    print!("{}", render_view(&controller.snapshot().await));
    Ok(())
}

fn spawn_event_logger(controller: &UserListController) {
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ControllerEvent::OperationFailed { operation }) => {
                    warn!(operation, "operation failed")
                }
                Ok(event) => debug!(?event, "controller event"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "controller events lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

async fn run_command(controller: &UserListController, command: Command) -> Result<()> {
    match command {
        Command::List { search, sort, page } => {
            controller.set_search_term(search).await;
            controller.sort_by(sort).await;
            if !select_page(controller, page).await {
                let total = controller.snapshot().await.total_pages;
                warn!(page, total_pages = total, "page out of range; showing page 1");
            }
        }
        Command::Add { name, age } => {
            controller.open_create_session().await;
            let outcome = controller.save_session(&UserForm::new(name, age)).await;
            report_outcome(outcome)?;
        }
        Command::Update { id, name, age } => {
            let id = UserId(id);
            if !controller.open_edit_session(id).await {
                bail!("no user with id {id}");
            }
            let editing = controller
                .snapshot()
                .await
                .session
                .editing
                .context("edit session has no record")?;
            let mut form = UserForm::from_user(&editing);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(age) = age {
                form.age = age;
            }
            let outcome = controller.save_session(&form).await;
            report_outcome(outcome)?;
        }
        Command::Delete { id } => {
            let id = UserId(id);
            if !controller.delete_user(id).await {
                bail!("failed to delete user {id}");
            }
            println!("deleted user {id}");
        }
    }
    Ok(())
}

/// Page 1 is always shown, even when nothing matches and there are no pages.
async fn select_page(controller: &UserListController, page: usize) -> bool {
    page == 1 || controller.go_to_page(page).await
}

fn report_outcome(outcome: SaveOutcome) -> Result<()> {
    match outcome {
        SaveOutcome::Created(user) => println!("created user {} ({})", user.id, user.name),
        SaveOutcome::Updated(user) => println!("updated user {} ({})", user.id, user.name),
        SaveOutcome::Rejected(errors) => bail!(errors),
        SaveOutcome::Failed => bail!("the users service rejected the request"),
        SaveOutcome::NoSession => bail!("no open edit session"),
    }
    Ok(())
}

fn render_view(view: &ViewSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>6}  {:<24} {:>4}\n", "ID", "NAME", "AGE"));
    for user in &view.users {
        out.push_str(&format!("{:>6}  {:<24} {:>4}\n", user.id.0, user.name, user.age));
    }
    if view.users.is_empty() {
        out.push_str("(no users)\n");
    }
    out.push_str(&format!(
        "page {}/{} | {} matching | sort: {}",
        view.current_page,
        view.total_pages.max(1),
        view.filtered_count,
        view.sort_key
    ));
    if !view.search_term.is_empty() {
        out.push_str(&format!(" | search: {:?}", view.search_term));
    }
    out.push('\n');
    out
}
