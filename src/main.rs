//! HipChat CLI - send messages and read rooms from the terminal

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hipchat_client::{
    decode_messages, Color, Config, Format, HipChatClient, MessageFormat, RoomRef, SendOptions,
};

#[derive(Parser)]
#[command(name = "hipchat")]
#[command(about = "Lightweight CLI client for the HipChat v1 API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Response format for this run: json or xml
    #[arg(long, global = true)]
    format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message to a room
    Send {
        /// Message content (limited XHTML unless --text is given)
        message: String,

        /// Room id or name (defaults to the configured room)
        #[arg(short, long)]
        room: Option<String>,

        /// Sender name, at most 15 characters
        #[arg(short, long)]
        from: Option<String>,

        /// Ping users in the room: true or false (overrides the configured default)
        #[arg(short, long)]
        notify: Option<bool>,

        /// Background color: yellow, red, green, purple, gray, random
        #[arg(short, long)]
        color: Option<String>,

        /// Send as plain text instead of HTML
        #[arg(long)]
        text: bool,
    },

    /// List rooms
    Rooms {
        /// Print the raw API response
        #[arg(long)]
        raw: bool,
    },

    /// Show a room's history
    History {
        /// Room id or name (defaults to the configured room)
        #[arg(short, long)]
        room: Option<String>,

        /// Day to show (YYYY-MM-DD); most recent messages if omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Print the raw API response
        #[arg(long)]
        raw: bool,
    },

    /// Store default settings
    Configure {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        notify: Option<bool>,
        #[arg(long)]
        auto_truncate: Option<bool>,
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Show current configuration
    Status,
}

/// Numeric arguments name a room id, anything else a room name.
fn parse_room(arg: &str) -> RoomRef {
    arg.trim()
        .parse::<u64>()
        .map(RoomRef::Id)
        .unwrap_or_else(|_| RoomRef::Name(arg.to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config = Config::load()?;
    if let Some(ref format) = cli.format {
        config.format = format.parse::<Format>()?;
    }

    match cli.command {
        Commands::Send {
            message,
            room,
            from,
            notify,
            color,
            text,
        } => {
            let mut options = SendOptions::new();
            if let Some(room) = room {
                options = options.room(parse_room(&room));
            }
            if let Some(from) = from {
                options = options.from(from);
            }
            if let Some(notify) = notify {
                options = options.notify(notify);
            }
            if let Some(color) = color {
                options = options.color(color.parse::<Color>()?);
            }
            if text {
                options = options.message_format(MessageFormat::Text);
            }

            tracing::info!("Sending message...");
            let client = HipChatClient::new(config);
            client.send_message_with(&message, options)?;
            println!("Message sent.");
        }
        Commands::Rooms { raw } => {
            let client = HipChatClient::new(config);
            if raw {
                println!("{}", client.list_rooms()?);
                return Ok(());
            }

            println!("\nRooms:");
            println!("{:-<60}", "");
            for room in client.rooms_lazy() {
                let room = room?;
                let private = if room.is_private { " (private)" } else { "" };
                println!("{}{}", room.name, private);
                println!("  ID: {}", room.room_id);
                if !room.topic.is_empty() {
                    println!("  Topic: {}", room.topic);
                }
                if let Some(last) = room.last_active_at() {
                    println!("  Last active: {}", last.format("%Y-%m-%d %H:%M UTC"));
                }
                println!();
            }
        }
        Commands::History { room, date, raw } => {
            let format = config.format;
            let client = HipChatClient::new(config);
            let body = match room {
                Some(room) => client.room_history_in(parse_room(&room), date)?,
                None => client.room_history(date)?,
            };
            if raw {
                println!("{}", body);
                return Ok(());
            }

            let messages = decode_messages(&body, format)?;
            if messages.is_empty() {
                println!("(no messages)");
            }
            for msg in &messages {
                println!(
                    "[{}] {}: {}",
                    msg.date.format("%Y-%m-%d %H:%M"),
                    msg.from.name,
                    msg.message
                );
                if let Some(ref file) = msg.file {
                    println!("    file: {} ({} bytes) {}", file.name, file.size, file.url);
                }
            }
        }
        Commands::Configure {
            token,
            room,
            from,
            color,
            notify,
            auto_truncate,
            api_url,
            timezone,
        } => {
            // Start from the file alone so env overrides are not persisted.
            let mut stored = Config::load_file()?;
            if let Some(token) = token {
                stored.token = Some(token);
            }
            if let Some(room) = room {
                stored.room = Some(parse_room(&room));
            }
            if let Some(from) = from {
                stored.from = from;
            }
            if let Some(color) = color {
                stored.color = color.parse::<Color>()?;
            }
            if let Some(notify) = notify {
                stored.notify = notify;
            }
            if let Some(auto_truncate) = auto_truncate {
                stored.auto_truncate = auto_truncate;
            }
            if let Some(api_url) = api_url {
                stored.api_url = api_url;
            }
            if let Some(timezone) = timezone {
                stored.timezone = timezone;
            }
            if let Some(format) = cli.format {
                stored.format = format.parse::<Format>()?;
            }
            stored.save().context("Failed to save configuration")?;
            println!("Configuration saved to {}", Config::config_path()?.display());
        }
        Commands::Status => {
            println!("Config file: {}", Config::config_path()?.display());
            println!("API URL:       {}", config.base_url());
            let token = match config.token.as_deref() {
                Some(t) if t.chars().count() > 4 => {
                    format!("{}****", t.chars().take(4).collect::<String>())
                }
                Some(_) => "****".to_string(),
                None => "(not set)".to_string(),
            };
            println!("Token:         {}", token);
            let room = config
                .room
                .as_ref()
                .map_or_else(|| "(not set)".to_string(), |r| r.to_string());
            println!("Default room:  {}", room);
            println!("From:          {}", config.from);
            println!("Notify:        {}", config.notify);
            println!("Color:         {}", config.color);
            println!("Format:        {}", config.format);
            println!("Auto-truncate: {}", config.auto_truncate);
            println!("Timezone:      {}", config.timezone);
        }
    }

    Ok(())
}
