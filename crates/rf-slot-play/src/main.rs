//! Slot Play — headless terminal player
//!
//! Usage:
//!   rf-slot-play                      - One spin at normal speed
//!   rf-slot-play --spins 20 --auto    - Auto-play twenty spins
//!   rf-slot-play --paytable           - Print the paytable and exit
//!
//! `RUST_LOG=debug` shows every engine transition.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tokio::sync::broadcast::error::RecvError;

use rf_slot_core::{GameConfig, SessionStats, SpinOutcome, TimingConfig, TimingProfile, VisibleWindow};
use rf_slot_session::{
    AudioError, Notice, NoticeLevel, Notifier, SessionEvent, SlotSession, SoundBoard, SoundCue,
};

#[derive(Parser)]
#[command(name = "rf-slot-play", about = "Play the three-reel slot machine in a terminal")]
struct Cli {
    /// Number of spins to play
    #[arg(short = 'n', long, default_value_t = 1)]
    spins: u64,

    /// Chain spins with auto-play
    #[arg(short, long)]
    auto: bool,

    /// Wager per spin (clamped into the bet limits)
    #[arg(short, long)]
    wager: Option<f64>,

    /// Seed for a reproducible session
    #[arg(short, long)]
    seed: Option<u64>,

    /// Timing profile
    #[arg(short, long, value_enum)]
    profile: Option<ProfileArg>,

    /// Game config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the paytable and exit
    #[arg(long)]
    paytable: bool,

    /// Start with sound off
    #[arg(long)]
    mute: bool,

    /// Force a win on the first spin
    #[arg(long)]
    force_win: bool,

    /// Force a jackpot on the first spin
    #[arg(long, conflicts_with = "force_win")]
    force_jackpot: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Normal,
    Turbo,
    Studio,
}

impl From<ProfileArg> for TimingProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Normal => TimingProfile::Normal,
            ProfileArg::Turbo => TimingProfile::Turbo,
            ProfileArg::Studio => TimingProfile::Studio,
        }
    }
}

/// Prints audio cues as text
struct TerminalSpeaker;

impl SoundBoard for TerminalSpeaker {
    fn play(&self, cue: SoundCue) -> Result<(), AudioError> {
        println!("  ♪ {}", cue.name());
        Ok(())
    }
}

/// Prints notices inline
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "★",
            NoticeLevel::Error => "error",
        };
        println!("  [{}] {}", tag, notice.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    if cli.paytable {
        print_paytable();
        return Ok(());
    }
    if cli.spins == 0 {
        bail!("--spins must be at least 1");
    }

    log::info!("Starting slot session ({:?} timing)", config.timing.profile);

    let mut builder = SlotSession::builder(config)
        .sound(Arc::new(TerminalSpeaker))
        .notifier(Arc::new(TerminalNotifier));
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    let session = builder.build().context("Failed to start session")?;

    if cli.mute {
        session.toggle_sound();
    }
    if let Some(wager) = cli.wager {
        let applied = session.set_wager(wager);
        if applied != wager {
            println!("Wager clamped to {:.2}", applied);
        }
    }
    if cli.force_win {
        session.force_win();
    }
    if cli.force_jackpot {
        session.force_jackpot();
    }

    play(&session, &cli).await?;
    print_stats(&session.stats(), session.snapshot().balance);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(profile) = cli.profile {
        config.timing = TimingConfig::from_profile(profile.into());
    }
    config.validate().context("Invalid game config")?;
    Ok(config)
}

async fn play(session: &SlotSession, cli: &Cli) -> Result<()> {
    let mut events = session.subscribe();

    if cli.auto {
        session.toggle_auto_play();
    } else {
        session.spin().context("Spin rejected")?;
    }

    let mut resolved = 0;
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Missed {} events", skipped);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match event {
            SessionEvent::SpinStarted(ticket) => {
                println!(
                    "\nSpin #{}  wager {:.2}  balance {:.2}  jackpot {:.2}",
                    ticket.spin_id, ticket.wager, ticket.balance_after_debit, ticket.jackpot_pool
                );
            }
            SessionEvent::ReelStopped(stop) => {
                log::debug!("reel {} stopped at {}", stop.reel, stop.position);
            }
            SessionEvent::SpinResolved(outcome) => {
                print_outcome(&outcome);
                resolved += 1;
                if resolved >= cli.spins {
                    break;
                }
                if !cli.auto {
                    if let Err(e) = session.spin() {
                        println!("Stopping: {}", e);
                        break;
                    }
                }
            }
            SessionEvent::SpinRejected { reason } => {
                log::info!("Spin rejected: {}", reason);
            }
            SessionEvent::AutoPlayChanged(false) => {
                println!("Auto-play ended");
                break;
            }
            _ => {}
        }
    }

    session.stop_auto_play();
    Ok(())
}

fn print_window(window: &VisibleWindow) {
    for row in 0..3 {
        let cells: Vec<String> = window
            .row(row)
            .iter()
            .map(|s| format!("{:^8}", s.name()))
            .collect();
        println!("  |{}|", cells.join("|"));
    }
}

fn print_outcome(outcome: &SpinOutcome) {
    print_window(&outcome.window);
    for line in outcome.win_lines() {
        println!("  row {}: 3 × {}", line.row + 1, line.symbol);
    }
    if outcome.is_win() {
        println!(
            "  Won {:.2} (×{:.1}){}",
            outcome.total_payout,
            outcome.evaluation.multiplier,
            match outcome.jackpot_award {
                Some(amount) => format!(", including jackpot {:.2}", amount),
                None => String::new(),
            }
        );
    } else {
        println!("  No win");
    }
    println!("  Balance {:.2}", outcome.balance);
}

fn print_paytable() {
    println!("{:<8} {:>6} {:>9} {:>7} {:>10}", "symbol", "payout", "line pay", "weight", "per cell");
    for entry in rf_slot_core::paytable_entries() {
        println!(
            "{:<8} {:>6} {:>9} {:>7} {:>9.2}%",
            entry.symbol.name(),
            entry.payout,
            entry.line_pay,
            entry.weight,
            entry.cell_probability * 100.0
        );
    }
}

fn print_stats(stats: &SessionStats, balance: f64) {
    println!("\n── Session ──");
    println!("  spins         {}", stats.total_spins);
    println!("  wagered       {:.2}", stats.total_wagered);
    println!("  paid          {:.2}", stats.total_paid);
    println!("  hit rate      {:.1}%", stats.hit_rate() * 100.0);
    println!("  return        {:.1}%", stats.rtp() * 100.0);
    println!("  jackpots      {}", stats.jackpots_won);
    println!("  biggest win   {:.2}", stats.biggest_payout);
    println!("  balance       {:.2}", balance);
}
