//! CLI commands

use anyhow::{Context, Result, bail};
use assist_http::AssistClient;
use assist_http::types::{ListQuery, UseYn};
use clap::{Args, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        /// Login ID
        #[arg(short, long)]
        user: String,

        /// Password
        #[arg(short, long, env = "ASSIST_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the user stored at login
    Whoami,

    /// Profile of the signed-in user
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Change the password
    Password {
        #[arg(long, env = "ASSIST_CURRENT_PASSWORD", hide_env_values = true)]
        current: String,

        #[arg(long, env = "ASSIST_NEW_PASSWORD", hide_env_values = true)]
        new: String,

        /// Confirmation; defaults to the new password
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Chat with the assistant
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },

    /// Expense receipts
    Receipt {
        #[command(subcommand)]
        command: ReceiptCommands,
    },

    /// Admin back-office
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Fetch the profile
    Show,

    /// Update profile fields
    Update {
        /// Field to change, as key=value (repeatable)
        #[arg(long = "set", value_parser = parse_key_val, required = true)]
        fields: Vec<(String, String)>,
    },
}

#[derive(Subcommand)]
pub enum ChatCommands {
    /// List chats
    List,

    /// Start a new chat
    New {
        #[arg(long)]
        title: Option<String>,
    },

    /// Ask a question in a chat
    Ask { chat_id: String, question: String },

    /// Delete a chat
    Delete { chat_id: String },

    /// Report an answer for review
    Report { chat_id: String, reason: String },
}

#[derive(Subcommand)]
pub enum ReceiptCommands {
    /// Upload a receipt image or PDF
    Upload { file: PathBuf },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List members
    Users(ListArgs),

    /// Enable member accounts
    Enable {
        #[arg(required = true)]
        user_ids: Vec<String>,
    },

    /// Disable member accounts
    Disable {
        #[arg(required = true)]
        user_ids: Vec<String>,
    },

    /// List submitted receipts
    Receipts(ListArgs),

    /// Download the receipt export
    Download {
        #[command(flatten)]
        list: ListArgs,

        /// File to write the export to
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long)]
    page: Option<u32>,

    #[arg(long)]
    page_size: Option<u32>,

    #[arg(long)]
    search: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
}

impl From<ListArgs> for ListQuery {
    fn from(args: ListArgs) -> Self {
        Self {
            page: args.page,
            page_size: args.page_size,
            search: args.search,
            start_date: args.from,
            end_date: args.to,
        }
    }
}

impl Commands {
    pub async fn execute(self, client: &AssistClient) -> Result<()> {
        match self {
            Commands::Login { user, password } => {
                let login = client.login(&user, &password).await?;
                let name = login
                    .user
                    .as_ref()
                    .and_then(|u| u.get("name").or_else(|| u.get("user_login_id")))
                    .and_then(Value::as_str)
                    .unwrap_or(user.as_str());
                println!("Signed in as {name}");
                Ok(())
            }
            Commands::Logout => {
                client.logout().await?;
                println!("Signed out");
                Ok(())
            }
            Commands::Whoami => match client.current_user() {
                Some(user) if client.is_authenticated() => print_json(&user),
                _ => bail!("Not signed in. Run `assist login` first."),
            },
            Commands::Profile { command } => command.execute(client).await,
            Commands::Password {
                current,
                new,
                confirm,
            } => {
                let confirm = confirm.unwrap_or_else(|| new.clone());
                if confirm != new {
                    bail!("New password and confirmation do not match");
                }
                let message = client.change_password(&current, &new, &confirm).await?;
                println!("{}", message.as_deref().unwrap_or("Password changed"));
                Ok(())
            }
            Commands::Chat { command } => command.execute(client).await,
            Commands::Receipt { command } => command.execute(client).await,
            Commands::Admin { command } => command.execute(client).await,
        }
    }
}

impl ProfileCommands {
    pub async fn execute(self, client: &AssistClient) -> Result<()> {
        match self {
            ProfileCommands::Show => print_json(&client.profile().await?),
            ProfileCommands::Update { fields } => {
                let update: Map<String, Value> = fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect();
                print_json(&client.update_profile(&Value::Object(update)).await?)
            }
        }
    }
}

impl ChatCommands {
    pub async fn execute(self, client: &AssistClient) -> Result<()> {
        match self {
            ChatCommands::List => print_json(&client.list_chats().await?),
            ChatCommands::New { title } => print_json(&client.new_chat(title.as_deref()).await?),
            ChatCommands::Ask { chat_id, question } => {
                print_json(&client.query_chat(&chat_id, &question).await?)
            }
            ChatCommands::Delete { chat_id } => {
                client.delete_chat(&chat_id).await?;
                println!("Deleted chat {chat_id}");
                Ok(())
            }
            ChatCommands::Report { chat_id, reason } => {
                client.report_chat(&chat_id, &reason).await?;
                println!("Reported chat {chat_id}");
                Ok(())
            }
        }
    }
}

impl ReceiptCommands {
    pub async fn execute(self, client: &AssistClient) -> Result<()> {
        match self {
            ReceiptCommands::Upload { file } => {
                info!(file = %file.display(), "Uploading receipt");
                let receipt = client
                    .upload_receipt_file(&file)
                    .await
                    .with_context(|| format!("Failed to upload {}", file.display()))?;
                print_json(&receipt)
            }
        }
    }
}

impl AdminCommands {
    pub async fn execute(self, client: &AssistClient) -> Result<()> {
        match self {
            AdminCommands::Users(list) => print_json(&client.list_users(&list.into()).await?),
            AdminCommands::Enable { user_ids } => {
                print_json(&client.update_user_use_yn(user_ids, UseYn::Enabled).await?)
            }
            AdminCommands::Disable { user_ids } => {
                print_json(&client.update_user_use_yn(user_ids, UseYn::Disabled).await?)
            }
            AdminCommands::Receipts(list) => {
                print_json(&client.list_receipts(&list.into()).await?)
            }
            AdminCommands::Download { list, output } => {
                let export = client.download_receipts(&list.into()).await?;
                std::fs::write(&output, &export)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                println!("Wrote {} bytes to {}", export.len(), output.display());
                Ok(())
            }
        }
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
