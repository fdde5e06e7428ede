//! Betledger CLI - command-line interface for the personal bet ledger

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::{ColoredString, Colorize};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use betledger::core::{display_odds, payout_if_win, profit_for_bet, settle, to_number};
use betledger::core::{american_to_decimal, decimal_to_american, format_american};
use betledger::data::{export_json, import_into, LedgerStore};
use betledger::error::{validate_new_bet, validate_patch};
use betledger::ledger::{
    aggregate, breakdown, Dimension, FilterSpec, LedgerReport, ResultFilter, SportFilter,
};
use betledger::models::{Bet, BetPatch, BetResult, NewBet, OddsType, SPORT_PRESETS};
use betledger::LedgerConfig;

#[derive(Parser)]
#[command(name = "betledger")]
#[command(author, version, about = "Personal bet ledger CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Path to the ledger file (overrides BETLEDGER_FILE)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Show odds in decimal form
    #[arg(long, global = true)]
    decimal: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Search book, sport, event, market and notes
    #[arg(short, long, default_value = "")]
    query: String,

    /// Result filter: All, Pending, Won, Lost, Push or Void
    #[arg(long, default_value = "All")]
    result: ResultFilter,

    /// Sport filter (All or a sport name)
    #[arg(long, default_value = "All")]
    sport: String,

    /// First date to include (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    from: String,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    to: String,
}

impl FilterArgs {
    fn to_spec(&self) -> FilterSpec {
        FilterSpec {
            query: self.query.clone(),
            result: self.result,
            sport: SportFilter::from(self.sport.as_str()),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct BetFields {
    /// Bet date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    book: Option<String>,

    #[arg(long)]
    sport: Option<String>,

    #[arg(long)]
    event: Option<String>,

    #[arg(long)]
    market: Option<String>,

    /// American or Decimal
    #[arg(long)]
    odds_type: Option<OddsType>,

    /// Odds, e.g. -110, +150 or 1.91
    #[arg(long, allow_hyphen_values = true)]
    odds: Option<String>,

    #[arg(long)]
    stake: Option<String>,

    /// Pending, Won, Lost, Push or Void
    #[arg(long)]
    result: Option<BetResult>,

    #[arg(long)]
    notes: Option<String>,
}

impl BetFields {
    fn into_patch(self) -> BetPatch {
        BetPatch {
            date: self.date,
            book: self.book,
            sport: self.sport,
            event: self.event,
            market: self.market,
            odds_type: self.odds_type,
            odds: self.odds,
            stake: self.stake,
            result: self.result,
            notes: self.notes,
        }
    }

    fn into_new_bet(self) -> NewBet {
        let defaults = NewBet::default();
        NewBet {
            date: self.date.unwrap_or(defaults.date),
            book: self.book.unwrap_or_default(),
            sport: self.sport.unwrap_or_default(),
            event: self.event.unwrap_or_default(),
            market: self.market.unwrap_or_default(),
            odds_type: self.odds_type.unwrap_or(defaults.odds_type),
            odds: self.odds.unwrap_or_default(),
            stake: self.stake.unwrap_or_default(),
            result: self.result.unwrap_or(defaults.result),
            notes: self.notes.unwrap_or_default(),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BreakdownBy {
    Sport,
    Book,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new bet
    Add {
        #[command(flatten)]
        fields: BetFields,

        /// Save even if the entry is incomplete
        #[arg(long)]
        skip_validation: bool,
    },

    /// Change fields of an existing bet
    Edit {
        /// Bet id (or a unique prefix)
        id: String,

        #[command(flatten)]
        fields: BetFields,

        /// Save even if the changed fields are invalid
        #[arg(long)]
        skip_validation: bool,
    },

    /// Delete a bet
    Delete {
        /// Bet id (or a unique prefix)
        id: String,
    },

    /// List bets, most recent first
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show summary statistics
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show the cumulative P&L curve
    Curve {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Break results down by sport or book
    Breakdown {
        #[arg(long, value_enum, default_value = "sport")]
        by: BreakdownBy,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Settle a hypothetical bet without saving it
    Settle {
        #[arg(long, default_value = "American")]
        odds_type: OddsType,

        #[arg(long, allow_hyphen_values = true)]
        odds: String,

        #[arg(long)]
        stake: String,

        #[arg(long, default_value = "Won")]
        result: BetResult,
    },

    /// Convert odds between American and decimal
    Convert {
        /// Odds value
        #[arg(allow_hyphen_values = true)]
        odds: String,

        /// Convention of the given value
        #[arg(long, default_value = "American")]
        from: OddsType,
    },

    /// Replace the ledger with bets from a JSON file
    Import {
        /// JSON file containing an array of bets
        file: PathBuf,
    },

    /// Write the ledger as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete all bets
    Clear {
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let mut config = LedgerConfig::from_env();
    if let Some(path) = cli.ledger {
        config.ledger_path = path;
    }
    if cli.decimal {
        config.odds_view = OddsType::Decimal;
    }
    debug!(?config, "Loaded configuration");

    if cli.interactive {
        return run_interactive(&config);
    }

    let Some(command) = cli.command else {
        println!("Use --help for usage information or --interactive for interactive mode.");
        return Ok(());
    };

    match command {
        Commands::Add {
            fields,
            skip_validation,
        } => {
            let mut store = open_store(&config.ledger_path)?;
            add_bet(&mut store, fields.into_new_bet(), skip_validation, config.odds_view)?;
        }
        Commands::Edit {
            id,
            fields,
            skip_validation,
        } => {
            let mut store = open_store(&config.ledger_path)?;
            edit_bet(&mut store, &id, fields.into_patch(), skip_validation, config.odds_view)?;
        }
        Commands::Delete { id } => {
            let mut store = open_store(&config.ledger_path)?;
            let id = resolve_id(&store, &id)?;
            let removed = store.remove(&id)?;
            println!("{} {} ({})", "Deleted".red(), short_id(&removed.id), removed.event);
        }
        Commands::List { filter } => {
            let store = open_store(&config.ledger_path)?;
            let report = aggregate(store.bets(), &filter.to_spec());
            print_table(&report, config.odds_view);
        }
        Commands::Stats { filter } => {
            let store = open_store(&config.ledger_path)?;
            let report = aggregate(store.bets(), &filter.to_spec());
            print_stats(&report);
        }
        Commands::Curve { filter } => {
            let store = open_store(&config.ledger_path)?;
            let report = aggregate(store.bets(), &filter.to_spec());
            print_curve(&report);
        }
        Commands::Breakdown { by, filter } => {
            let store = open_store(&config.ledger_path)?;
            let report = aggregate(store.bets(), &filter.to_spec());
            print_breakdown(&report, by);
        }
        Commands::Settle {
            odds_type,
            odds,
            stake,
            result,
        } => {
            let bet = NewBet {
                odds_type,
                odds,
                stake,
                result,
                ..NewBet::default()
            }
            .into_bet(String::new());
            print_settlement(&bet);
        }
        Commands::Convert { odds, from } => run_convert(&odds, from),
        Commands::Import { file } => {
            let mut store = open_store(&config.ledger_path)?;
            let json = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            let count = import_into(&mut store, &json)
                .with_context(|| format!("Invalid file {:?}, ledger left unchanged", file))?;
            println!("{} {} bets", "Imported".green(), count);
        }
        Commands::Export { output } => {
            let store = open_store(&config.ledger_path)?;
            let json = export_json(store.bets())?;
            match output {
                Some(path) => {
                    fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
                    println!("{} {} bets to {:?}", "Exported".green(), store.bets().len(), path);
                }
                None => println!("{}", json),
            }
        }
        Commands::Clear { yes } => {
            let mut store = open_store(&config.ledger_path)?;
            clear_ledger(&mut store, yes)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}

fn open_store(path: &Path) -> Result<LedgerStore> {
    LedgerStore::open(path).with_context(|| format!("Failed to open ledger {:?}", path))
}

/// Full id, or the single bet whose id starts with `prefix`
fn resolve_id(store: &LedgerStore, prefix: &str) -> Result<String> {
    if store.get(prefix).is_some() {
        return Ok(prefix.to_string());
    }

    let matches: Vec<&Bet> = store
        .bets()
        .iter()
        .filter(|b| b.id.starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [bet] => Ok(bet.id.clone()),
        [] => bail!("No bet with id '{}'", prefix),
        _ => bail!("Id prefix '{}' matches {} bets", prefix, matches.len()),
    }
}

fn add_bet(store: &mut LedgerStore, new_bet: NewBet, skip_validation: bool, view: OddsType) -> Result<()> {
    if !skip_validation {
        validate_new_bet(&new_bet)?;
    }

    let bet = store.add(new_bet).context("Failed to save bet")?;
    println!("{} {}", "Added".green(), short_id(&bet.id));
    print_bet_summary(&bet, view);
    Ok(())
}

fn edit_bet(
    store: &mut LedgerStore,
    id: &str,
    patch: BetPatch,
    skip_validation: bool,
    view: OddsType,
) -> Result<()> {
    if patch.is_empty() {
        bail!("Nothing to change; pass at least one field");
    }

    let id = resolve_id(store, id)?;
    if !skip_validation {
        if let Some(current) = store.get(&id) {
            validate_patch(current, &patch)?;
        }
    }
    let bet = store.update(&id, &patch).context("Failed to save bet")?;
    println!("{} {}", "Updated".green(), short_id(&bet.id));
    print_bet_summary(&bet, view);
    Ok(())
}

fn clear_ledger(store: &mut LedgerStore, yes: bool) -> Result<()> {
    let confirmed = yes
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("This will delete ALL bets from this device. Continue?")
            .default(false)
            .interact()?;

    if confirmed {
        let count = store.clear()?;
        println!("{} {} bets", "Cleared".red(), count);
    } else {
        println!("Nothing deleted.");
    }
    Ok(())
}

fn print_bet_summary(bet: &Bet, view: OddsType) {
    let s = settle(bet);
    println!(
        "  {} {} {} @ {} ({}) stake {} -> payout {} / P&L {}",
        bet.date,
        or_dash(&bet.event),
        or_dash(&bet.market),
        display_odds(bet, view),
        bet.odds_type,
        format_currency(to_number(&bet.stake)),
        format_currency(s.payout_if_win),
        color_money(s.profit),
    );
}

fn print_table(report: &LedgerReport, view: OddsType) {
    if report.bets.is_empty() {
        println!("{}", "No bets match the current filters.".yellow());
        return;
    }

    println!(
        "{:<8} {:<10} {:<12} {:<8} {:<28} {:>9} {:>10} {:<8} {:>10} {:>10}",
        "Id", "Date", "Book", "Sport", "Event / Market", "Odds", "Stake", "Result", "Payout", "P&L"
    );
    println!("{}", "-".repeat(124));

    for bet in &report.bets {
        let event = if bet.market.is_empty() {
            or_dash(&bet.event).to_string()
        } else {
            format!("{} / {}", or_dash(&bet.event), bet.market)
        };
        let profit = profit_for_bet(bet);

        println!(
            "{:<8} {:<10} {:<12} {:<8} {:<28} {:>9} {:>10} {:<8} {:>10} {:>10}",
            short_id(&bet.id),
            truncate(&bet.date, 10),
            truncate(or_dash(&bet.book), 12),
            truncate(or_dash(&bet.sport), 8),
            truncate(&event, 28),
            display_odds(bet, view),
            format_currency(to_number(&bet.stake)),
            color_result(bet.result),
            format_currency(payout_if_win(bet)),
            color_money(profit),
        );
    }

    println!();
    println!("{} bets", report.bets.len());
    warn_undated(report);
}

fn print_stats(report: &LedgerReport) {
    let stats = &report.stats;
    let perf = &report.performance;

    println!("{}", "Summary:".yellow().bold());
    println!("{}", "-".repeat(40));
    println!("Realized P&L:   {}", color_money(stats.realized));
    println!("ROI:            {:.1}%", stats.roi);
    println!("Total staked:   {}", format_currency(stats.total_stake));
    println!("Pending stake:  {}", format_currency(stats.pending_stake));
    println!("Record (W-L-P): {}", stats.record());
    println!("Pending bets:   {}", stats.pending);
    println!("Bets:           {}", stats.count);
    println!("{}", "-".repeat(40));
    println!("Hit rate:       {:.1}%", perf.hit_rate * 100.0);
    println!("Profit factor:  {:.2}", perf.profit_factor);
    println!("Max drawdown:   {}", format_currency(perf.max_drawdown));
    warn_undated(report);
}

fn print_curve(report: &LedgerReport) {
    if report.equity_curve.is_empty() {
        println!("{}", "No settled bets yet.".yellow());
        return;
    }

    let max_abs = report
        .equity_curve
        .iter()
        .map(|p| p.cumulative_profit.abs())
        .fold(0.0_f64, f64::max);

    println!("{}", "Cumulative P&L:".yellow().bold());
    println!("{:<10} {:>12}", "Date", "P&L");
    println!("{}", "-".repeat(60));

    for point in &report.equity_curve {
        let width = if max_abs > 0.0 {
            (point.cumulative_profit.abs() / max_abs * 30.0).round() as usize
        } else {
            0
        };
        let bar = if point.cumulative_profit >= 0.0 {
            "#".repeat(width).green()
        } else {
            "#".repeat(width).red()
        };
        println!(
            "{:<10} {:>12} {}",
            truncate(&point.date, 10),
            format_currency(point.cumulative_profit),
            bar
        );
    }
    warn_undated(report);
}

fn print_breakdown(report: &LedgerReport, by: BreakdownBy) {
    let (dimension, label) = match by {
        BreakdownBy::Sport => (Dimension::Sport, "Sport"),
        BreakdownBy::Book => (Dimension::Book, "Book"),
    };
    let analysis = breakdown(&report.bets, dimension);

    println!("\n{}", format!("Analysis by {}:", label).yellow().bold());
    println!(
        "{:<14} {:>6} {:>6} {:>12} {:>12} {:>8}",
        label, "Bets", "Wins", "Stake", "Profit", "ROI"
    );
    println!("{}", "-".repeat(64));
    for a in &analysis {
        println!(
            "{:<14} {:>6} {:>6} {:>12} {:>12} {:>7.1}%",
            truncate(&a.key, 14),
            a.bets,
            a.wins,
            format_currency(a.stake),
            format_currency(a.profit),
            a.roi
        );
    }
}

fn print_settlement(bet: &Bet) {
    let s = settle(bet);
    println!("{}", "Settlement:".yellow().bold());
    println!("Odds:                {} ({})", bet.odds, bet.odds_type);
    println!("Stake:               {}", format_currency(to_number(&bet.stake)));
    println!("Result:              {}", color_result(bet.result));
    println!("Realized P&L:        {}", color_money(s.profit));
    println!("Payout if win:       {}", format_currency(s.payout_if_win));
    println!("Implied probability: {:.1}%", s.implied_probability * 100.0);
}

fn run_convert(odds: &str, from: OddsType) {
    let value = to_number(odds);
    let converted = match from {
        OddsType::American => american_to_decimal(value).map(|d| format!("{:.2}", d)),
        OddsType::Decimal => decimal_to_american(value).map(format_american),
    };

    match converted {
        Some(text) => println!("{} -> {}", odds, text.cyan()),
        None => println!("{}", format!("Cannot convert '{}'", odds).red()),
    }
}

fn run_interactive(config: &LedgerConfig) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    let theme = ColorfulTheme::default();
    let mut store = open_store(&config.ledger_path)?;
    println!("Ledger: {:?}\n", store.path());

    loop {
        let options = vec!["Add a bet", "List bets", "Show stats", "Quit"];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                let new_bet = prompt_new_bet(&theme)?;
                println!();
                if let Err(e) = add_bet(&mut store, new_bet, false, config.odds_view) {
                    println!("{} {:#}", "Not saved:".red(), e);
                }
                println!();
            }
            1 => {
                println!();
                let report = aggregate(store.bets(), &FilterSpec::default());
                print_table(&report, config.odds_view);
                println!();
            }
            2 => {
                println!();
                let report = aggregate(store.bets(), &FilterSpec::default());
                print_stats(&report);
                println!();
            }
            3 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

fn prompt_new_bet(theme: &ColorfulTheme) -> Result<NewBet> {
    let defaults = NewBet::default();

    let date: String = Input::with_theme(theme)
        .with_prompt("Date (YYYY-MM-DD)")
        .default(defaults.date.clone())
        .interact_text()?;

    let book: String = Input::with_theme(theme)
        .with_prompt("Book")
        .allow_empty(true)
        .interact_text()?;

    let other = SPORT_PRESETS.len() - 1;
    let sport_idx = Select::with_theme(theme)
        .with_prompt("Sport")
        .items(&SPORT_PRESETS)
        .default(other)
        .interact()?;

    let event: String = Input::with_theme(theme)
        .with_prompt("Event")
        .allow_empty(true)
        .interact_text()?;

    let market: String = Input::with_theme(theme)
        .with_prompt("Market")
        .allow_empty(true)
        .interact_text()?;

    let odds_type = if Select::with_theme(theme)
        .with_prompt("Odds type")
        .items(&["American", "Decimal"])
        .default(0)
        .interact()?
        == 1
    {
        OddsType::Decimal
    } else {
        OddsType::American
    };

    let hint = match odds_type {
        OddsType::American => "Odds (e.g. -120 or +150)",
        OddsType::Decimal => "Odds (e.g. 1.80)",
    };
    let odds: String = Input::with_theme(theme).with_prompt(hint).interact_text()?;

    let stake: String = Input::with_theme(theme).with_prompt("Stake").interact_text()?;

    let results: Vec<&str> = BetResult::ALL.iter().map(|r| r.as_str()).collect();
    let result_idx = Select::with_theme(theme)
        .with_prompt("Result")
        .items(&results)
        .default(0)
        .interact()?;

    let notes: String = Input::with_theme(theme)
        .with_prompt("Notes")
        .allow_empty(true)
        .interact_text()?;

    let new_bet = NewBet {
        date,
        book,
        sport: SPORT_PRESETS[sport_idx].to_string(),
        event,
        market,
        odds_type,
        odds,
        stake,
        result: BetResult::ALL[result_idx],
        notes,
    };

    // Preview what the entry settles to before it is saved
    let preview = new_bet.clone().into_bet(String::new());
    let s = settle(&preview);
    println!(
        "Implied probability: {:.1}%  Payout if win: {}",
        s.implied_probability * 100.0,
        format_currency(s.payout_if_win)
    );

    Ok(new_bet)
}

fn warn_undated(report: &LedgerReport) {
    if !report.undated.is_empty() {
        println!(
            "{} {} bet(s) have an unreadable date and were sorted as today: {}",
            "!".yellow(),
            report.undated.len(),
            report
                .undated
                .iter()
                .map(|id| short_id(id))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}

/// Format money as `$12.34` / `-$12.34`
fn format_currency(n: f64) -> String {
    let sign = if n < 0.0 { "-" } else { "" };
    format!("{}${:.2}", sign, n.abs())
}

fn color_money(n: f64) -> ColoredString {
    if n >= 0.0 {
        format_currency(n).green()
    } else {
        format_currency(n).red()
    }
}

fn color_result(result: BetResult) -> ColoredString {
    match result {
        BetResult::Won => result.as_str().green(),
        BetResult::Lost => result.as_str().red(),
        BetResult::Pending => result.as_str().yellow(),
        BetResult::Push | BetResult::Void => result.as_str().normal(),
    }
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Truncate text to fit display width
fn truncate(text: &str, max_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        text.to_string()
    } else {
        chars[..max_len - 1].iter().collect::<String>() + "…"
    }
}
