use clap::{Args, Subcommand};

use super::OutputFormat;
use erx_sync::models::{PageRequest, Task};
use erx_sync::ErxTaskRepository;

const AUDIT_EVENTS_SHOWN: usize = 10;

#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub command: TaskSubcommand,
}

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// List all locally stored tasks
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a task's details
    Show {
        /// Task ID
        id: String,

        /// Fetch the task from the server using this access code
        #[arg(long)]
        access_code: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete tasks (on the server too, unless all of them were scanned)
    Delete {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

impl TaskCommand {
    pub async fn run(&self, repo: &ErxTaskRepository) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            TaskSubcommand::List { format } => {
                let tasks = repo.load_local_all().await?;

                if tasks.is_empty() {
                    println!("No tasks found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&tasks)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<24}  {:<12}  {:<8}  MEDICATION", "ID", "STATUS", "SOURCE");
                        println!("{}", "-".repeat(80));
                        for task in &tasks {
                            println!(
                                "{:<24}  {:<12}  {:<8}  {}",
                                task.identifier,
                                task.status.to_string(),
                                task.source.to_string(),
                                task.medication_name.as_deref().unwrap_or("-")
                            );
                        }
                        println!("\nTotal: {} task(s)", tasks.len());
                    }
                }
                Ok(())
            }

            TaskSubcommand::Show {
                id,
                access_code,
                format,
            } => {
                let task = repo
                    .load_remote(id, access_code.as_deref())
                    .await?
                    .ok_or_else(|| format!("Task not found: {}", id))?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&task)?);
                    }
                    OutputFormat::Text => {
                        print_task(&task);
                        let events = repo
                            .load_local_audit_events(
                                Some(&task.identifier),
                                PageRequest::nth(0, AUDIT_EVENTS_SHOWN),
                            )
                            .await?;
                        if !events.is_empty() {
                            println!("\nHistory:");
                            for event in &events {
                                println!(
                                    "  {}  {}",
                                    event.timestamp,
                                    event.text.as_deref().unwrap_or("-")
                                );
                            }
                        }
                    }
                }
                Ok(())
            }

            TaskSubcommand::Delete { ids } => {
                let mut tasks = Vec::with_capacity(ids.len());
                for id in ids {
                    let task = repo
                        .load_local(id, None)
                        .await?
                        .ok_or_else(|| format!("Task not found: {}", id))?;
                    tasks.push(task);
                }

                repo.delete_tasks(&tasks).await?;
                for task in &tasks {
                    println!("Deleted task: {}", task.identifier);
                }
                Ok(())
            }
        }
    }
}

fn print_task(task: &Task) {
    println!("{}", task);
    if let Some(authored_on) = &task.authored_on {
        println!("  authored on:  {}", authored_on);
    }
    if let Some(expires_on) = &task.expires_on {
        println!("  expires on:   {}", expires_on);
    }
    if let Some(redeemed_on) = &task.redeemed_on {
        println!("  redeemed on:  {}", redeemed_on);
    }
    if !task.medication_dispenses.is_empty() {
        println!("\nDispensed:");
        for dispense in &task.medication_dispenses {
            println!(
                "  {}  {}",
                dispense.when_handed_over.as_deref().unwrap_or("-"),
                dispense.medication_name.as_deref().unwrap_or("-")
            );
        }
    }
    if !task.communications.is_empty() {
        let unread = task.communications.iter().filter(|c| !c.is_read).count();
        println!(
            "\nMessages: {} ({} unread)",
            task.communications.len(),
            unread
        );
    }
}
