//! LinkCard CLI: command-line interface for capturing media and composing cards.
//!
//! Usage:
//!   linkcard defaults <ACTION>     Show, change, or reset the quick-mode template
//!   linkcard quick <MEDIA>         Publish a card from the saved defaults
//!   linkcard create [OPTIONS]      Compose a card from uploaded or recorded media
//!   linkcard edit <ID> [OPTIONS]   Update an existing card
//!   linkcard record <MODE>         Capture a photo, audio, or video artifact
//!   linkcard list                  List your cards, newest first
//!   linkcard delete <ID>           Delete a card
//!   linkcard check                 Check capture devices and storage

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use linkcard_capture_engine::CaptureMode;
use linkcard_common::config::{config_file_path, AppConfig};

mod commands;

use commands::{AppContext, DefaultsArgs, FormArgs};

#[derive(Parser)]
#[command(
    name = "linkcard",
    about = "Capture media and compose monetized media cards",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/linkcard/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding defaults and the card library
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Creator id to compose and list cards as
    #[arg(long, global = true)]
    user: Option<String>,

    /// Use scripted in-process devices instead of real hardware
    #[arg(long, global = true)]
    synthetic: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the quick-mode defaults template
    Defaults {
        #[command(subcommand)]
        action: DefaultsAction,
    },

    /// Publish a card from a single media file using the saved defaults
    Quick {
        /// Media file or http(s) URL
        media: String,

        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mime: Option<String>,
    },

    /// Compose a card with the full form
    Create {
        #[command(flatten)]
        form: FormArgs,

        /// Media file or http(s) URL
        #[arg(long, conflicts_with = "record")]
        media: Option<String>,

        /// Record the media now: photo, audio, or video
        #[arg(long)]
        record: Option<CaptureMode>,

        /// Stop recording after this many seconds (default: until Ctrl+C)
        #[arg(long)]
        seconds: Option<u64>,

        /// Custom thumbnail file or URL
        #[arg(long)]
        thumbnail: Option<String>,

        /// Print the card without saving it
        #[arg(long)]
        preview: bool,
    },

    /// Edit a card from your library
    Edit {
        /// Card id
        id: String,

        #[command(flatten)]
        form: FormArgs,

        /// Replace the media with this file or URL
        #[arg(long)]
        media: Option<String>,

        /// Replace the thumbnail with this file or URL
        #[arg(long)]
        thumbnail: Option<String>,
    },

    /// Capture a single artifact to a file
    Record {
        /// photo, audio, or video
        mode: CaptureMode,

        /// Output file (defaults to capture.<ext> in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop recording after this many seconds (default: until Ctrl+C)
        #[arg(long)]
        seconds: Option<u64>,
    },

    /// List your cards, newest first
    List {
        /// Print the cards as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a card
    Delete {
        /// Card id
        id: String,
    },

    /// Check capture devices and storage
    Check,
}

#[derive(Subcommand)]
enum DefaultsAction {
    /// Print the current template
    Show,

    /// Change template fields
    Set {
        #[command(flatten)]
        fields: DefaultsArgs,

        /// Default thumbnail file or URL
        #[arg(long)]
        thumbnail: Option<String>,
    },

    /// Restore the seed template
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config_file_path);
    let (mut config, config_error) = match AppConfig::try_load_from(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    linkcard_common::logging::init_logging(&config.logging);
    if let Some(e) = config_error {
        tracing::warn!(path = %config_path.display(), error = %e, "Ignoring config file, using defaults");
    }

    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if cli.user.is_some() {
        config.creator_id = cli.user;
    }
    let ctx = AppContext::new(config, cli.synthetic);

    match cli.command {
        Commands::Defaults { action } => match action {
            DefaultsAction::Show => commands::defaults::show(&ctx),
            DefaultsAction::Set { fields, thumbnail } => {
                commands::defaults::set(&ctx, fields, thumbnail)
            }
            DefaultsAction::Reset => commands::defaults::reset(&ctx),
        },
        Commands::Quick { media, mime } => commands::quick::run(&ctx, media, mime).await,
        Commands::Create {
            form,
            media,
            record,
            seconds,
            thumbnail,
            preview,
        } => commands::create::run(&ctx, form, media, record, seconds, thumbnail, preview).await,
        Commands::Edit {
            id,
            form,
            media,
            thumbnail,
        } => commands::edit::run(&ctx, id, form, media, thumbnail).await,
        Commands::Record {
            mode,
            output,
            seconds,
        } => commands::record::run(&ctx, mode, output, seconds).await,
        Commands::List { json } => commands::list::run(&ctx, json).await,
        Commands::Delete { id } => commands::delete::run(&ctx, id).await,
        Commands::Check => commands::check::run(&ctx).await,
    }
}
