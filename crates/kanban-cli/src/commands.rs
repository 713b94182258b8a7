//! CLI command implementations

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use kanban_core::{Config, DndId, FileSlot, Snapshot, Store, persist};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// Everything a command needs: resolved config and output mode
pub struct Context {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub json: bool,
}

impl Context {
    pub fn load(config_path: Option<PathBuf>, data_dir: Option<PathBuf>, json: bool) -> Result<Self> {
        let config_path = config_path.or_else(Config::default_path);
        let mut config = match &config_path {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        if data_dir.is_some() {
            config.data_dir = data_dir;
        }
        if !config.display.colors {
            colored::control::set_override(false);
        }
        Ok(Self {
            config,
            config_path,
            json,
        })
    }

    fn open(&self) -> Result<Store<FileSlot>> {
        let slot = self.config.file_slot()?;
        Ok(Store::open(slot, &self.config.board_title))
    }
}

pub enum DragPhase {
    Over,
    End,
}

/// Trim user text; empty input never reaches the store
fn require_text(what: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        bail!("{} must not be empty", what);
    }
    Ok(value.to_string())
}

fn report(ctx: &Context, changed: bool, done: &str, subject: &str) -> Result<()> {
    if ctx.json {
        println!(
            "{}",
            serde_json::json!({ "changed": changed, "id": subject })
        );
    } else if changed {
        println!("{} {}", "✓".green(), done);
    } else {
        println!("{} Nothing changed (unknown id or same position: {})", "!".yellow(), subject);
    }
    Ok(())
}

pub fn show(ctx: &Context) -> Result<()> {
    let store = ctx.open()?;
    let snap = store.snapshot();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(snap.as_ref())?);
        return Ok(());
    }

    println!("{}", snap.board.title.bold());
    if snap.board.list_ids.is_empty() {
        println!();
        println!("No lists yet. Add one with: kanban list add <title>");
        return Ok(());
    }

    for (index, list) in snap.ordered_lists().enumerate() {
        println!();
        println!(
            "{} {} {} ({})",
            format!("{}.", index).dimmed(),
            list.title.bold(),
            list.id.cyan(),
            list.card_ids.len()
        );
        for card in snap.cards_in(list) {
            let mark = if card.done { "[x]".green() } else { "[ ]".normal() };
            let title = if card.done {
                card.title.strikethrough()
            } else {
                card.title.normal()
            };
            let comments = if card.comments.is_empty() {
                String::new()
            } else {
                format!(" ({} comments)", card.comments.len())
            };
            println!("  {} {} {}{}", mark, title, card.id.cyan(), comments.dimmed());
        }
    }

    Ok(())
}

pub fn set_title(ctx: &Context, title: &str) -> Result<()> {
    let mut store = ctx.open()?;
    let changed = store.set_board_title(title);
    report(ctx, changed, &format!("Board title set to {}", title), &store.snapshot().board.id)
}

pub fn list_add(ctx: &Context, title: &str) -> Result<()> {
    let title = require_text("List title", title)?;
    let mut store = ctx.open()?;
    let id = store.add_list(&title);

    if ctx.json {
        let snap = store.snapshot();
        println!("{}", serde_json::to_string(&snap.lists[&id])?);
    } else {
        println!("{} Created list: {}", "✓".green(), id);
        println!("  Title: {}", title);
    }
    Ok(())
}

pub fn list_rm(ctx: &Context, id: &str) -> Result<()> {
    let mut store = ctx.open()?;
    let cards = store.snapshot().list(id).map_or(0, |l| l.card_ids.len());
    let changed = store.remove_list(id);
    report(ctx, changed, &format!("Removed list {} and {} cards", id, cards), id)
}

pub fn list_rename(ctx: &Context, id: &str, title: &str) -> Result<()> {
    let title = require_text("List title", title)?;
    let mut store = ctx.open()?;
    let changed = store.rename_list(id, &title);
    report(ctx, changed, &format!("Renamed {} to {}", id, title), id)
}

pub fn list_move(ctx: &Context, from: usize, to: usize) -> Result<()> {
    let mut store = ctx.open()?;
    let changed = store.reorder_list(from, to);
    report(ctx, changed, &format!("Moved list {} to {}", from, to), &from.to_string())
}

pub fn card_add(ctx: &Context, list: &str, title: &str) -> Result<()> {
    let title = require_text("Card title", title)?;
    let mut store = ctx.open()?;
    let Some(id) = store.add_card(list, &title) else {
        bail!("List not found: {}", list);
    };

    if ctx.json {
        let snap = store.snapshot();
        println!("{}", serde_json::to_string(&snap.cards[&id])?);
    } else {
        println!("{} Created card: {}", "✓".green(), id);
        println!("  Title: {}", title);
    }
    Ok(())
}

pub fn card_rm(ctx: &Context, id: &str) -> Result<()> {
    let mut store = ctx.open()?;
    let changed = store.remove_card(id);
    report(ctx, changed, &format!("Removed card {}", id), id)
}

pub fn card_done(ctx: &Context, id: &str) -> Result<()> {
    let mut store = ctx.open()?;
    let changed = store.toggle_card_done(id);
    let state = match store.snapshot().card(id) {
        Some(card) if card.done => "done",
        _ => "not done",
    };
    report(ctx, changed, &format!("Marked {} {}", id, state), id)
}

pub fn card_rename(ctx: &Context, id: &str, title: &str) -> Result<()> {
    let title = require_text("Card title", title)?;
    let mut store = ctx.open()?;
    let changed = store.rename_card(id, &title);
    report(ctx, changed, &format!("Renamed {} to {}", id, title), id)
}

pub fn card_move(ctx: &Context, id: &str, list: &str, index: Option<usize>) -> Result<()> {
    let mut store = ctx.open()?;
    let changed = store.move_card(id, list, index.unwrap_or(usize::MAX));
    report(ctx, changed, &format!("Moved {} to {}", id, list), id)
}

pub fn card_reorder(ctx: &Context, list: &str, from: usize, to: usize) -> Result<()> {
    let mut store = ctx.open()?;
    let changed = store.reorder_card(list, from, to);
    report(ctx, changed, &format!("Moved card {} to {} in {}", from, to, list), list)
}

pub fn comment_add(ctx: &Context, card: &str, text: &str) -> Result<()> {
    let text = require_text("Comment", text)?;
    let mut store = ctx.open()?;
    let Some(id) = store.add_comment(card, &text) else {
        bail!("Card not found: {}", card);
    };

    if ctx.json {
        println!("{}", serde_json::json!({ "id": id, "card": card }));
    } else {
        println!("{} Added comment {} to {}", "✓".green(), id, card);
    }
    Ok(())
}

pub fn comment_rm(ctx: &Context, card: &str, comment: &str) -> Result<()> {
    let mut store = ctx.open()?;
    let changed = store.remove_comment(card, comment);
    report(ctx, changed, &format!("Removed comment {}", comment), comment)
}

#[derive(Tabled)]
struct CommentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Comment")]
    text: String,
}

pub fn comment_ls(ctx: &Context, card_id: &str) -> Result<()> {
    let store = ctx.open()?;
    let snap = store.snapshot();
    let card = snap
        .card(card_id)
        .ok_or_else(|| anyhow::anyhow!("Card not found: {}", card_id))?;
    let comments = card.comments_newest_first();

    if ctx.json {
        println!("{}", serde_json::to_string(&comments)?);
    } else if comments.is_empty() {
        println!("No comments yet");
    } else {
        let rows = comments.iter().map(|c| CommentRow {
            id: c.id.clone(),
            created: c
                .created_at
                .with_timezone(&chrono::Local)
                .format(&ctx.config.display.date_format)
                .to_string(),
            text: c.text.clone(),
        });
        println!("{} {}", card.title.bold(), card.id.cyan());
        println!("{}", Table::new(rows));
    }
    Ok(())
}

pub fn drag(ctx: &Context, phase: DragPhase, source: &str, target: Option<&str>) -> Result<()> {
    let source: DndId = source.parse()?;
    let target: Option<DndId> = target.map(str::parse).transpose()?;

    let mut store = ctx.open()?;
    let changed = match phase {
        DragPhase::Over => store.drag_over(&source, target.as_ref()),
        DragPhase::End => store.drag_end(&source, target.as_ref()),
    };
    let done = match &target {
        Some(target) => format!("Dropped {} on {}", source, target),
        None => format!("Dropped {}", source),
    };
    report(ctx, changed, &done, &source.to_string())
}

pub fn export(ctx: &Context, pretty: bool) -> Result<()> {
    let store = ctx.open()?;
    let snap = store.snapshot();
    if pretty {
        println!("{}", serde_json::to_string_pretty(snap.as_ref())?);
    } else {
        println!("{}", persist::encode(&snap)?);
    }
    Ok(())
}

pub fn import(ctx: &Context, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot = persist::decode(&raw)
        .with_context(|| format!("{} is not a usable snapshot", path.display()))?;
    let (lists, cards) = (snapshot.lists.len(), snapshot.cards.len());

    let mut store = ctx.open()?;
    store.replace(snapshot)?;

    if ctx.json {
        println!("{}", serde_json::json!({ "lists": lists, "cards": cards }));
    } else {
        println!("{} Imported {} lists and {} cards", "✓".green(), lists, cards);
    }
    Ok(())
}

pub fn reset(ctx: &Context, force: bool) -> Result<()> {
    if !force {
        println!("{}", "This will remove every list and card on the board.".red());
        print!("Continue? [y/N] ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted");
            return Ok(());
        }
    }

    let mut store = ctx.open()?;
    store.replace(Snapshot::empty(&ctx.config.board_title))?;
    println!("{} Board reset", "✓".green());
    Ok(())
}

fn resolved_config_path(ctx: &Context) -> Result<&Path> {
    ctx.config_path
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("No config path available; pass --config"))
}

/// Show current configuration
pub fn config_show(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("{}", "Current configuration:".bold());
        println!();
        if let Some(ref dir) = config.data_dir {
            println!("data_dir = \"{}\"", dir.display());
        }
        println!("slot = \"{}\"", config.slot);
        println!("board_title = \"{}\"", config.board_title);
        println!("log_filter = \"{}\"", config.log_filter);
        println!();
        println!("[display]");
        println!("colors = {}", config.display.colors);
        println!("date_format = \"{}\"", config.display.date_format);
        println!();
        println!("{} {}", "Snapshot:".dimmed(), config.slot_path()?.display());
    }

    Ok(())
}

/// Print where the config file lives
pub fn config_path(ctx: &Context) -> Result<()> {
    println!("{}", resolved_config_path(ctx)?.display());
    Ok(())
}

/// Write a commented default config
pub fn config_init(ctx: &Context, force: bool) -> Result<()> {
    let path = resolved_config_path(ctx)?;
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default_with_comments())?;
    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}

/// Get a specific config value
pub fn config_get(ctx: &Context, key: &str) -> Result<()> {
    // Convert config to JSON for key lookup
    let config_json = serde_json::to_value(&ctx.config)?;

    // Parse key path (e.g., "display.colors" -> ["display", "colors"])
    let mut value = &config_json;
    for part in key.split('.') {
        value = value
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Config key not found: {}", key))?;
    }

    if ctx.json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        match value {
            serde_json::Value::String(s) => println!("{}", s),
            serde_json::Value::Bool(b) => println!("{}", b),
            serde_json::Value::Number(n) => println!("{}", n),
            serde_json::Value::Null => println!("null"),
            _ => println!("{}", serde_json::to_string_pretty(value)?),
        }
    }

    Ok(())
}
