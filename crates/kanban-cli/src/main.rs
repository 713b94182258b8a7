//! kanban - Single-user kanban board in the terminal
//!
//! Lists, cards and comments in one local JSON snapshot.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "kanban")]
#[command(about = "Single-user kanban board")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "KANBAN_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the board snapshot
    #[arg(long, global = true, env = "KANBAN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the board
    Show,

    /// Set the board title
    Title {
        /// New title
        title: String,
    },

    /// Manage lists
    List {
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Manage cards
    Card {
        #[command(subcommand)]
        command: CardCommands,
    },

    /// Manage card comments
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },

    /// Replay a drag gesture (ids tagged list:<id> or card:<id>)
    Drag {
        #[command(subcommand)]
        command: DragCommands,
    },

    /// Print the stored snapshot
    Export {
        /// Pretty-print
        #[arg(long)]
        pretty: bool,
    },

    /// Replace the board with a snapshot file
    Import {
        /// Path to a snapshot JSON file
        path: PathBuf,
    },

    /// Replace the board with an empty one
    Reset {
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },

    /// Show or create configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Add a list at the end of the board
    Add {
        /// List title
        title: String,
    },
    /// Remove a list and its cards
    Rm {
        /// List ID
        id: String,
    },
    /// Rename a list
    Rename {
        /// List ID
        id: String,
        /// New title
        title: String,
    },
    /// Move a list to another position
    Move {
        /// Current position (0-based)
        from: usize,
        /// New position (0-based)
        to: usize,
    },
}

#[derive(Subcommand)]
enum CardCommands {
    /// Add a card at the end of a list
    Add {
        /// List ID
        list: String,
        /// Card title
        title: String,
    },
    /// Remove a card
    Rm {
        /// Card ID
        id: String,
    },
    /// Toggle a card's done flag
    Done {
        /// Card ID
        id: String,
    },
    /// Rename a card
    Rename {
        /// Card ID
        id: String,
        /// New title
        title: String,
    },
    /// Move a card to a list
    Move {
        /// Card ID
        id: String,
        /// Target list ID
        list: String,
        /// Position in the target list (appends if omitted)
        #[arg(short, long)]
        index: Option<usize>,
    },
    /// Reorder a card within its list
    Reorder {
        /// List ID
        list: String,
        /// Current position (0-based)
        from: usize,
        /// New position (0-based)
        to: usize,
    },
}

#[derive(Subcommand)]
enum CommentCommands {
    /// Add a comment to a card
    Add {
        /// Card ID
        card: String,
        /// Comment text
        text: String,
    },
    /// Remove a comment
    Rm {
        /// Card ID
        card: String,
        /// Comment ID
        comment: String,
    },
    /// List a card's comments, newest first
    Ls {
        /// Card ID
        card: String,
    },
}

#[derive(Subcommand)]
enum DragCommands {
    /// Hover the source over a target
    Over {
        /// Dragged element, e.g. card:<id>
        source: String,
        /// Element under the pointer, if any
        target: Option<String>,
    },
    /// Drop the source on a target
    End {
        /// Dragged element, e.g. card:<id>
        source: String,
        /// Element under the pointer, if any
        target: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Get a specific config value
    Get {
        /// Config key (e.g., "slot", "display.colors")
        key: String,
    },
}

fn init_tracing(default_filter: &str, verbose: bool) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if verbose {
            "kanban_core=debug,kanban_cli=debug".to_string()
        } else {
            default_filter.to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = commands::Context::load(cli.config, cli.data_dir, cli.json)?;
    init_tracing(&ctx.config.log_filter, cli.verbose);

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => commands::show(&ctx),
        Commands::Title { title } => commands::set_title(&ctx, &title),
        Commands::List { command } => match command {
            ListCommands::Add { title } => commands::list_add(&ctx, &title),
            ListCommands::Rm { id } => commands::list_rm(&ctx, &id),
            ListCommands::Rename { id, title } => commands::list_rename(&ctx, &id, &title),
            ListCommands::Move { from, to } => commands::list_move(&ctx, from, to),
        },
        Commands::Card { command } => match command {
            CardCommands::Add { list, title } => commands::card_add(&ctx, &list, &title),
            CardCommands::Rm { id } => commands::card_rm(&ctx, &id),
            CardCommands::Done { id } => commands::card_done(&ctx, &id),
            CardCommands::Rename { id, title } => commands::card_rename(&ctx, &id, &title),
            CardCommands::Move { id, list, index } => commands::card_move(&ctx, &id, &list, index),
            CardCommands::Reorder { list, from, to } => {
                commands::card_reorder(&ctx, &list, from, to)
            }
        },
        Commands::Comment { command } => match command {
            CommentCommands::Add { card, text } => commands::comment_add(&ctx, &card, &text),
            CommentCommands::Rm { card, comment } => commands::comment_rm(&ctx, &card, &comment),
            CommentCommands::Ls { card } => commands::comment_ls(&ctx, &card),
        },
        Commands::Drag { command } => match command {
            DragCommands::Over { source, target } => {
                commands::drag(&ctx, commands::DragPhase::Over, &source, target.as_deref())
            }
            DragCommands::End { source, target } => {
                commands::drag(&ctx, commands::DragPhase::End, &source, target.as_deref())
            }
        },
        Commands::Export { pretty } => commands::export(&ctx, pretty),
        Commands::Import { path } => commands::import(&ctx, &path),
        Commands::Reset { force } => commands::reset(&ctx, force),
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => commands::config_show(&ctx),
            Some(ConfigCommands::Path) => commands::config_path(&ctx),
            Some(ConfigCommands::Init { force }) => commands::config_init(&ctx, force),
            Some(ConfigCommands::Get { key }) => commands::config_get(&ctx, &key),
        },
    }
}
