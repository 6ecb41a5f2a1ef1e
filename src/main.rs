// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;
mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{AddArgs, Commands, LiftKeyCli, MergeArgs, UiArgs};
use liftkey::logging::{init_logging, LogTarget};
use liftkey::{
    shortcut_url, AcquisitionSession, BridgeInbox, Capability, CardStorage, Config, EmulationSession,
    MemoryClipboard, MergeEngine, PendingBridge, Platform, SqliteStorage, TransferPath,
    VaultStore,
};

fn main() -> Result<()> {
    let cli = LiftKeyCli::parse();

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(platform) = cli.platform.as_deref() {
        config.platform = Platform::from_name(platform);
    }

    match cli.command.unwrap_or(Commands::Ui(UiArgs::default())) {
        Commands::Ui(args) => run_ui_mode(&config, args),
        Commands::List => run_list(&cli_vault(&config)?),
        Commands::Add(args) => run_add(&config, &mut cli_vault(&config)?, args),
        Commands::Remove { id } => run_remove(&mut cli_vault(&config)?, &id),
        Commands::Merge(args) => run_merge(&mut cli_vault(&config)?, args),
        Commands::Show { id } => run_show(&config, &cli_vault(&config)?, &id),
        Commands::ShortcutUrl => {
            println!("{}", shortcut_url(&config.bridge_base_url));
            Ok(())
        }
    }
}

/// Logging to stderr + the vault, for the one-shot subcommands
fn cli_vault(config: &Config) -> Result<VaultStore<SqliteStorage>> {
    init_logging("liftkey=warn", config.log_format, LogTarget::Stderr)
        .context("Failed to initialize logging")?;
    open_vault(config)
}

fn open_vault(config: &Config) -> Result<VaultStore<SqliteStorage>> {
    let storage = SqliteStorage::open(&config.db_path, &config.storage_key)
        .with_context(|| format!("Failed to open vault database {:?}", config.db_path))?;
    Ok(VaultStore::open(storage))
}

/// Resolve a full id or a unique id prefix
fn resolve_id<S: CardStorage>(vault: &VaultStore<S>, needle: &str) -> Result<String> {
    if vault.get(needle).is_some() {
        return Ok(needle.to_string());
    }

    let matches: Vec<&str> = vault
        .cards()
        .iter()
        .map(|c| c.id())
        .filter(|id| id.starts_with(needle))
        .collect();

    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => bail!("No card matches '{}'", needle),
        _ => bail!("'{}' matches {} cards, use a longer prefix", needle, matches.len()),
    }
}

fn run_list<S: CardStorage>(vault: &VaultStore<S>) -> Result<()> {
    if vault.is_empty() {
        println!("Vault is empty. Add a card with `liftkey add --uid <UID>`.");
        return Ok(());
    }

    println!("{:<10} {:<24} {:<22} {:<8} FLOORS", "ID", "NAME", "UID", "TYPE");
    for card in vault.cards() {
        println!(
            "{:<10} {:<24} {:<22} {:<8} {}",
            card.id().get(..8).unwrap_or(card.id()),
            card.name(),
            card.serial_number(),
            card.card_type().as_str(),
            card.floor_label()
        );
    }
    println!("\n{} card(s)", vault.len());

    Ok(())
}

fn run_add(config: &Config, vault: &mut VaultStore<SqliteStorage>, args: AddArgs) -> Result<()> {
    // The identifier is delivered like a bridged one, so the flow lands in `detected`
    let mut bridge = PendingBridge::new();
    bridge.deliver(&args.uid);

    let mut session = AcquisitionSession::new(config.platform, Capability::Unavailable);
    session.open(&mut bridge);
    session.set_name(&args.name);
    session.set_floors(&args.floors);

    match session.save(vault) {
        Some(card) => {
            println!("✓ Added {} ({}) floors: {}", card.name(), card.serial_number(), card.floor_label());
            println!("  id: {}", card.id());
            Ok(())
        }
        None => bail!("Card identifier is empty"),
    }
}

fn run_remove<S: CardStorage>(vault: &mut VaultStore<S>, id: &str) -> Result<()> {
    let id = resolve_id(vault, id)?;
    if let Some(card) = vault.remove(&id) {
        println!("✓ Removed {} ({})", card.name(), card.serial_number());
    }
    Ok(())
}

fn run_merge<S: CardStorage>(vault: &mut VaultStore<S>, args: MergeArgs) -> Result<()> {
    vault.clear_selection();
    for needle in &args.ids {
        let id = resolve_id(vault, needle)?;
        if !vault.is_selected(&id) {
            vault.toggle_selection(&id);
        }
    }

    let merged = vault
        .merge_selected(&MergeEngine::new(), args.name.as_deref())
        .context("Merge failed")?;

    println!("✓ Merged into {} ({})", merged.name(), merged.serial_number());
    println!("  floors: {}", merged.floor_label());
    println!("  id: {}", merged.id());
    Ok(())
}

fn run_show<S: CardStorage>(config: &Config, vault: &VaultStore<S>, id: &str) -> Result<()> {
    let id = resolve_id(vault, id)?;
    let card = vault
        .get(&id)
        .with_context(|| format!("Card {} disappeared", id))?;

    // No tag writer or share sheet from a terminal: export goes through the clipboard
    let mut session = EmulationSession::new(
        Capability::Unavailable,
        Capability::Unavailable,
        Box::new(MemoryClipboard::new()),
        config.error_display(),
    );
    session.open(card);

    println!("📶 {} - hold near the reader", card.name());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if session.transfer_path() == TransferPath::ShareOnly {
        println!("Tag writing is not available here; share the card data instead:\n");
    }
    println!("{}", liftkey::share_text(card));

    session.close();
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config, args: UiArgs) -> Result<()> {
    init_logging("liftkey=info", config.log_format, LogTarget::File(&config.log_file))
        .context("Failed to initialize logging")?;

    let vault = open_vault(config)?;
    let stored_bridge = SqliteStorage::open(&config.db_path, &config.storage_key)
        .context("Failed to open bridge inbox")?;

    let mut launch = match args.bridge_url.as_deref() {
        Some(url) => PendingBridge::from_url(url),
        None => PendingBridge::new(),
    };
    if let Some(uid) = args.uid.as_deref() {
        launch.deliver(uid);
    }

    let mut app = ui::App::new(config, vault, ui::LaunchBridge::new(launch, stored_bridge));
    ui::run_ui(&mut app)?;

    println!("\n✅ LiftKey closed");
    if let Some(text) = app.clipboard_text() {
        println!("\n📋 Last copied:\n{}", text);
    }
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config, _args: UiArgs) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin liftkey-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftkey::{Card, CardType, MemoryStorage};

    #[test]
    fn test_resolve_id_by_prefix() {
        let mut vault = VaultStore::open(MemoryStorage::new());
        let id = vault
            .add(Card::new("A", "04:01", vec![1], CardType::New).unwrap())
            .id()
            .to_string();

        assert_eq!(resolve_id(&vault, &id).unwrap(), id);
        assert_eq!(resolve_id(&vault, &id[..6]).unwrap(), id);
        assert!(resolve_id(&vault, "zzzz").is_err());
    }
}
