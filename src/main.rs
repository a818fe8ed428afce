use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hmm_lattice::{forward, generate, loader, viterbi};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "hmm-lattice")]
#[command(version)]
#[command(about = "Sample from, score and decode a discrete hidden Markov model")]
struct Cli {
    /// Model basename; reads <basename>.trans and <basename>.emit
    basename: PathBuf,

    /// Print a sampled sequence of this length
    #[arg(long)]
    generate: Option<usize>,

    /// Print the most likely final state for these observations
    #[arg(long, num_args = 1..)]
    forward: Option<Vec<String>>,

    /// Print the most likely state path for these observations
    #[arg(long, num_args = 1..)]
    viterbi: Option<Vec<String>>,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let model = loader::load(&cli.basename)
        .with_context(|| format!("failed to load model {}", cli.basename.display()))?;

    info!("Loaded {} states and {} symbols.", model.n_states(), model.n_symbols());

    if let Some(n) = cli.generate {
        let mut rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let sequence = generate(&model, n, &mut rng).context("sampling failed")?;
        print!("{sequence}");
    }

    if let Some(obs) = &cli.forward {
        let res = forward(&model, obs).context("forward scoring failed")?;
        info!("P(observations) = {:.6e}", res.likelihood);
        println!("{}", res.state);
    }

    if let Some(obs) = &cli.viterbi {
        let res = viterbi(&model, obs).context("Viterbi decoding failed")?;
        info!("Path probability = {:.6e}", res.score);
        println!("{}", res.states.join(" "));
    }

    info!("Done.");
    Ok(())
}
