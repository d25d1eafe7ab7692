//! Command definitions and execution

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use metacoin_core::{Address, Amount, QuestionId};
use metacoin_market::{MarketConfig, MarketEvent, MarketState, Outcome, QuestionMarket};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "metacoin")]
#[command(about = "MetaCoin ledger with an escrow-backed question market")]
pub struct Cli {
    /// Market state file
    #[arg(long, env = "METACOIN_STATE", default_value = "metacoin-state.json")]
    pub state: PathBuf,

    /// Market configuration (TOML), read by `init`
    #[arg(long, env = "METACOIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `metacoin_market=debug`. Defaults to RUST_LOG.
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new market, minting the supply to the owner
    Init {
        #[arg(long)]
        owner: Address,
        /// Overrides the configured supply
        #[arg(long)]
        total_supply: Option<Amount>,
        /// Replace an existing state file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Set the question cost (owner only)
    SetCost {
        #[arg(long)]
        caller: Address,
        cost: Amount,
    },
    /// Print the question cost
    Cost,
    /// Post a question
    Ask {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        text: String,
        /// Account allowed to answer; repeat for several
        #[arg(long = "answerer")]
        answerers: Vec<Address>,
        /// Report the outcome without committing it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Answer a question
    Answer {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        id: QuestionId,
        #[arg(long)]
        answer: String,
        /// Report the outcome without committing it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print a question as JSON
    Question { id: QuestionId },
    /// Print the number of questions
    Count,
    /// Print the balance of an account
    Balance { account: Address },
    /// Print the total supply
    Supply,
    /// Print the notification audit trail as JSON lines
    Events,
    /// Print the state digest
    Digest,
}

/// Execute one command, writing its results to `out`
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    match &cli.command {
        Commands::Init {
            owner,
            total_supply,
            force,
        } => init(cli, *owner, *total_supply, *force, out),
        Commands::SetCost { caller, cost } => {
            let market = load(&cli.state)?;
            market.set_question_cost(*caller, *cost)?;
            save(&market, &cli.state)?;
            writeln!(out, "{}", cost)?;
            Ok(())
        }
        Commands::Cost => {
            writeln!(out, "{}", load(&cli.state)?.question_cost())?;
            Ok(())
        }
        Commands::Ask {
            caller,
            text,
            answerers,
            dry_run,
        } => {
            let market = load(&cli.state)?;
            if *dry_run {
                let outcome =
                    market.preview_ask_question(*caller, text, answerers.iter().copied())?;
                return print_outcome(&outcome, out);
            }
            let seen = market.events().len();
            market.ask_question(*caller, text.as_str(), answerers.iter().copied())?;
            save(&market, &cli.state)?;
            print_new_events(&market, seen, out)
        }
        Commands::Answer {
            caller,
            id,
            answer,
            dry_run,
        } => {
            let market = load(&cli.state)?;
            if *dry_run {
                let outcome = market.preview_answer_question(*caller, *id, answer);
                return print_outcome(&outcome, out);
            }
            let seen = market.events().len();
            market.answer_question(*caller, *id, answer.as_str())?;
            save(&market, &cli.state)?;
            print_new_events(&market, seen, out)
        }
        Commands::Question { id } => {
            let question = load(&cli.state)?.question(*id)?;
            writeln!(out, "{}", serde_json::to_string(&question)?)?;
            Ok(())
        }
        Commands::Count => {
            writeln!(out, "{}", load(&cli.state)?.question_count())?;
            Ok(())
        }
        Commands::Balance { account } => {
            writeln!(out, "{}", load(&cli.state)?.balance_of(account))?;
            Ok(())
        }
        Commands::Supply => {
            writeln!(out, "{}", load(&cli.state)?.total_supply())?;
            Ok(())
        }
        Commands::Events => {
            print_events(&load(&cli.state)?.events(), out)
        }
        Commands::Digest => {
            writeln!(out, "{}", load(&cli.state)?.state_digest())?;
            Ok(())
        }
    }
}

fn init<W: Write>(
    cli: &Cli,
    owner: Address,
    total_supply: Option<Amount>,
    force: bool,
    out: &mut W,
) -> Result<()> {
    if cli.state.exists() && !force {
        bail!(
            "state file {} already exists (use --force to replace it)",
            cli.state.display()
        );
    }

    let mut config = match &cli.config {
        Some(path) => MarketConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MarketConfig::default(),
    };
    if let Some(supply) = total_supply {
        config.total_supply = supply;
    }
    config.validate()?;

    let market = QuestionMarket::with_config(owner, &config);
    save(&market, &cli.state)?;
    info!("Initialised market at {}", cli.state.display());
    writeln!(out, "{}", market.state_digest())?;
    Ok(())
}

fn load(path: &Path) -> Result<QuestionMarket> {
    let state = MarketState::load_from_file(path)
        .with_context(|| format!("loading market state {}", path.display()))?;
    debug!("Loaded market state from {}", path.display());
    Ok(QuestionMarket::restore(state)?)
}

fn save(market: &QuestionMarket, path: &Path) -> Result<()> {
    market
        .snapshot()
        .save_to_file(path)
        .with_context(|| format!("saving market state {}", path.display()))
}

fn print_outcome<T, W: Write>(outcome: &Outcome<T>, out: &mut W) -> Result<()> {
    match outcome.failure() {
        None => writeln!(out, "true")?,
        Some(reason) => writeln!(out, "false: {}", reason)?,
    }
    Ok(())
}

fn print_new_events<W: Write>(market: &QuestionMarket, seen: usize, out: &mut W) -> Result<()> {
    let events = market.events();
    print_events(&events[seen.min(events.len())..], out)
}

fn print_events<W: Write>(events: &[MarketEvent], out: &mut W) -> Result<()> {
    for event in events {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
    }
    Ok(())
}
