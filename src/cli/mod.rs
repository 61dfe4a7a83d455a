// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands off to Layer 2.
//
//   1. `inspect`  — print one record (or all) in readable form
//   2. `guess`    — score one record's candidates with the Guesser
//   3. `evaluate` — score every record and report accuracy

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, GuessArgs, InspectArgs};

use crate::application::guess_use_case::{GuessConfig, GuessUseCase};
use crate::application::inspect_use_case::InspectUseCase;

#[derive(Parser, Debug)]
#[command(
    name = "guesswhat",
    version,
    about = "Read GuessWhat?! games and score their candidate objects with the Guesser."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Routes only; every computation lives in the use cases.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Inspect(args)  => run_inspect(args),
            Commands::Guess(args)    => run_guess(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let use_case = InspectUseCase::new(&args.store.resolve()?)?;
    let ids = match args.record_id {
        Some(id) => id..id + 1,
        None     => 0..use_case.record_count()?,
    };
    for id in ids {
        println!("{}\n", use_case.report(id)?);
    }
    Ok(())
}

fn run_guess(args: GuessArgs) -> Result<()> {
    let record_id = args.record_id;
    let use_case  = GuessUseCase::new(GuessConfig::try_from(args)?)?;
    let outcome   = use_case.guess(record_id)?;

    println!("Record {}", outcome.record_id);
    for (i, lp) in outcome.log_probs.iter().enumerate() {
        let marker = if i == outcome.best_index { '>' } else { ' ' };
        println!("  {marker} candidate {i:>3}  log p = {lp:>9.4}  p = {:.4}", lp.exp());
    }
    println!(
        "Guessed object {} (p = {:.4}): {}",
        outcome.object_id,
        outcome.confidence(),
        if outcome.correct { "correct" } else { "wrong" }
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let use_case = GuessUseCase::new(GuessConfig::try_from(args)?)?;
    let summary  = use_case.evaluate()?;

    println!("Games      : {}", summary.games);
    println!("Scored     : {}", summary.scored);
    println!("Correct    : {}", summary.correct);
    println!("Accuracy   : {:.2}%", summary.accuracy() * 100.0);
    println!("Mean loss  : {:.4}", summary.mean_loss);
    Ok(())
}
