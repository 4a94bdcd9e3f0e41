use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use client_core::{
    ControllerError, DisplayPresenter, StatusClient, StatusController, StatusView, StoreConnection,
};
use message_composer::MessageComposer;
use shared::OfficeStatus;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{cli::ManagerArgs, input::Prompter, render};

#[derive(Debug, PartialEq, Eq)]
enum ManagerCommand {
    Change(OfficeStatus),
    Context(String),
    Clear,
    Install,
    Status,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<ManagerCommand> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let command = match word.to_ascii_lowercase().as_str() {
        "context" | "ctx" => ManagerCommand::Context(rest.trim().to_string()),
        "clear" => ManagerCommand::Clear,
        "install" => ManagerCommand::Install,
        "status" | "" => ManagerCommand::Status,
        "help" | "?" => ManagerCommand::Help,
        "quit" | "exit" | "q" => ManagerCommand::Quit,
        other => ManagerCommand::Change(other.parse().ok()?),
    };
    Some(command)
}

fn screen(controller: &StatusController, view: &StatusView) -> String {
    let frame =
        DisplayPresenter::present_manager(&controller.snapshot(), &view.current(), &Local);
    render::manager_screen(&frame)
}

pub async fn run(
    connection: Arc<StoreConnection>,
    composer: MessageComposer,
    args: ManagerArgs,
) -> Result<()> {
    let mut client = StatusClient::start_manager(connection, composer).await;
    let controller = Arc::clone(
        client
            .controller()
            .context("manager client started without a controller")?,
    );

    let result = match args.set {
        Some(status) => one_shot(&controller, status, args.context).await,
        None => interactive(&controller, client.view()).await,
    };
    client.shutdown();
    result
}

async fn one_shot(
    controller: &StatusController,
    status: OfficeStatus,
    context: Option<String>,
) -> Result<()> {
    if let Some(context) = context {
        controller.set_context(context);
    }
    let record = controller.request_status_change(status).await?;
    info!(status = %record.status, "manager: one-shot change done");
    println!("{}", screen(controller, controller.view()));
    Ok(())
}

async fn interactive(controller: &Arc<StatusController>, view: &StatusView) -> Result<()> {
    let mut prompter = Prompter::new();
    let mut changes = PendingChanges::default();
    println!("{}", screen(controller, view));
    println!("{}", render::status_menu());

    while let Some(line) = prompter.line("mudir> ").await? {
        let Some(command) = parse_command(&line) else {
            println!("{}", render::notice(&format!("unknown command: {line}")));
            continue;
        };
        match command {
            ManagerCommand::Change(status) => changes.spawn(Arc::clone(controller), status),
            ManagerCommand::Context(text) => {
                controller.set_context(text);
                println!("{}", screen(controller, view));
            }
            ManagerCommand::Clear => {
                controller.set_context("");
                println!("{}", screen(controller, view));
            }
            ManagerCommand::Install => println!("{}\n", render::INSTALL_HELP),
            ManagerCommand::Status => println!("{}", screen(controller, view)),
            ManagerCommand::Help => println!("{}", render::status_menu()),
            ManagerCommand::Quit => break,
        }
    }
    changes.finish().await;
    Ok(())
}

/// Changes run in the background so the prompt stays responsive; a second
/// change typed meanwhile is rejected by the controller. Leaving the screen
/// waits for whatever is still in flight so its record reaches the store.
#[derive(Default)]
struct PendingChanges {
    tasks: Vec<JoinHandle<()>>,
}

impl PendingChanges {
    fn spawn(&mut self, controller: Arc<StatusController>, status: OfficeStatus) {
        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(tokio::spawn(async move {
            match controller.request_status_change(status).await {
                Ok(_) => println!("\n{}", screen(&controller, controller.view())),
                Err(ControllerError::ChangeInProgress) => println!(
                    "\n{}",
                    render::notice("a status change is already in progress, try again shortly")
                ),
            }
        }));
    }

    async fn finish(self) {
        for task in self.tasks {
            if let Err(err) = task.await {
                warn!("manager: status change task failed: {err}");
            }
        }
    }
}
