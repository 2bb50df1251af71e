//! HelixTUI - Molecular Biology in the Terminal
//!
//! ## Usage
//!
//! ```bash
//! helixtui replication              # Unzip, prime, copy and seal a DNA helix
//! helixtui synthesis                # Transcribe a gene and translate it
//! helixtui synthesis --template TACAAAATT
//! helixtui replication --autoplay   # Watch a perfect run in the console
//! ```
//!
//! ## Keys
//!
//! - `1-4` + `Enter`: select and deploy enzymes
//! - `a/c/g/t/u`: place a nucleotide
//! - `j/k` + `Enter`: offer a tRNA to the A-site
//! - `:q`: Quit
//! - `?`: Help

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use helixtui::app::{AppState, Game};
use helixtui::autoplay::play_to_completion;
use helixtui::config::GameConfig;
use helixtui::controller::run_app;
use helixtui::engine::GameEvent;
use helixtui::logging::{init_logging, LogConfig, LogFormat};
use helixtui::model::{Alphabet, Sequence};
use helixtui::replication::ReplicationGame;
use helixtui::scoring::ScoreState;
use helixtui::source::{FixedSource, RandomSource, SequenceSource};
use helixtui::synthesis::SynthesisGame;
use helixtui::ui::glyphs;

/// Which puzzle to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GameArg {
    /// DNA replication: unwind, prime, polymerize, ligate
    Replication,
    /// Protein synthesis: transcription then translation
    Synthesis,
}

/// HelixTUI - timed molecular biology puzzles for the terminal
///
/// Without --autoplay, opens the interactive game.
/// With --autoplay, plays a perfect round and prints every event to stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Puzzle to play
    #[arg(value_enum)]
    game: GameArg,

    /// Base pairs in the replication template
    #[arg(short = 'n', long = "length", default_value = "10")]
    length: usize,

    /// Codons in the synthesis gene
    #[arg(short = 'c', long = "codons", default_value = "5")]
    codons: usize,

    /// Do not force a stop codon at the end of the gene
    #[arg(long = "no-stop")]
    no_stop: bool,

    /// Seed for reproducible sequences and shuffles
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Seconds on each stage countdown
    #[arg(long = "stage-seconds", default_value = "15")]
    stage_seconds: u32,

    /// Use this DNA template instead of a random one
    #[arg(short = 't', long = "template")]
    template: Option<String>,

    /// Play a perfect round without the terminal interface
    #[arg(long = "autoplay")]
    autoplay: bool,

    /// Use unicode box-drawing glyphs
    #[arg(long = "fancy")]
    fancy: bool,

    /// Write logs to this file
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn validate(&self) -> Result<()> {
        if self.length == 0 {
            bail!("Strand length must be at least 1");
        }
        if self.codons == 0 {
            bail!("Gene must have at least 1 codon");
        }
        if self.codons < 2 && !self.no_stop {
            bail!("A gene with a start and a stop codon needs at least 2 codons (got {})", self.codons);
        }
        if self.stage_seconds == 0 {
            bail!("Stage countdown must be at least 1 second");
        }
        Ok(())
    }

    fn game_config(&self) -> GameConfig {
        let mut config = GameConfig::default();
        config.replication.strand_length = self.length;
        config.synthesis.codons = self.codons;
        config.synthesis.pin_stop = !self.no_stop;
        config.timing.stage_seconds = self.stage_seconds;
        config
    }

    fn source(&self) -> Result<Box<dyn SequenceSource>> {
        if let Some(template) = &self.template {
            let sequence = Sequence::parse(Alphabet::Dna, template)
                .with_context(|| format!("Invalid template {template:?}"))?;
            if sequence.is_empty() {
                bail!("Template must not be empty");
            }
            if self.game == GameArg::Synthesis && sequence.len() % 3 != 0 {
                bail!(
                    "Synthesis template length must be a multiple of 3 (got {})",
                    sequence.len()
                );
            }
            return Ok(Box::new(FixedSource::new(sequence)));
        }
        Ok(match self.seed {
            Some(seed) => Box::new(RandomSource::seeded(seed)),
            None => Box::new(RandomSource::from_os_rng()),
        })
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            // Shuffles must not mirror the sequence stream
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        }
    }

    fn build_game(&self) -> Result<Game> {
        let config = self.game_config();
        let source = self.source()?;
        let rng = self.rng();
        let game = match self.game {
            GameArg::Replication => Game::Replication(ReplicationGame::new(&config, source, rng)?),
            GameArg::Synthesis => Game::Synthesis(SynthesisGame::new(&config, source, rng)?),
        };
        Ok(game)
    }
}

/// Plays a perfect round, writing every event and the final score to `out`.
fn narrate_autoplay<W: Write>(game: Game, out: &mut W) -> Result<ScoreState> {
    // The first failed write is kept and reported once the round is over
    let mut write_error: Option<io::Error> = None;
    let mut print = |event: &GameEvent| {
        if write_error.is_some() || matches!(event, GameEvent::TimerTick { .. }) {
            return;
        }
        if let Err(err) = writeln!(out, "{event}") {
            write_error = Some(err);
        }
    };
    let think_time = Duration::from_millis(500);

    let score = match game {
        Game::Replication(mut game) => play_to_completion(&mut game, think_time, &mut print)?,
        Game::Synthesis(mut game) => play_to_completion(&mut game, think_time, &mut print)?,
    };
    if let Some(err) = write_error {
        return Err(err).context("Cannot write autoplay output");
    }

    writeln!(
        out,
        "Final score: {} ({} mistakes, {}s)",
        score.score, score.mistakes, score.global_elapsed
    )
    .context("Cannot write autoplay output")?;
    Ok(score)
}

/// Runs autoplay mode: a perfect round, narrated on stdout.
fn run_autoplay(game: Game) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    narrate_autoplay(game, &mut handle)?;
    handle.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;

    let log_config = LogConfig::from_verbosity(args.verbose)
        .with_format(LogFormat::Compact)
        .with_log_file(args.log_file.clone());
    // The interactive mode owns the terminal: stderr logging would corrupt it
    if args.autoplay || log_config.log_file.is_some() {
        init_logging(&log_config)?;
    }

    let game = args.build_game()?;
    info!(game = game.title(), seed = ?args.seed, "game created");

    if args.autoplay {
        run_autoplay(game)
    } else {
        run_app(AppState::new(game), glyphs::select(args.fancy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts a few lines, then fails like a closed pipe.
    struct ClosingPipe {
        lines_left: usize,
    }

    impl Write for ClosingPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.lines_left == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            if buf.contains(&b'\n') {
                self.lines_left -= 1;
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["helixtui"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_empty_template_is_rejected() {
        let args = parse(&["synthesis", "--template", ""]);
        let err = args.source().err().unwrap();
        assert_eq!(err.to_string(), "Template must not be empty");

        let args = parse(&["replication", "--template", ""]);
        assert!(args.build_game().is_err());
    }

    #[test]
    fn test_template_is_used() {
        let args = parse(&["synthesis", "--template", "TACAAAATT"]);
        match args.build_game() {
            Ok(Game::Synthesis(game)) => assert_eq!(game.template().to_string(), "TACAAAATT"),
            _ => panic!("expected a synthesis game"),
        }
    }

    #[test]
    fn test_autoplay_narration() {
        let Ok(game) = parse(&["replication", "--seed", "3", "--length", "4"]).build_game() else {
            panic!("game should build");
        };
        let mut out = Vec::new();
        let score = narrate_autoplay(game, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(score.mistakes, 0);
        assert!(text.contains("Replication Complete!"));
        assert!(text.ends_with(&format!(
            "Final score: {} (0 mistakes, {}s)\n",
            score.score, score.global_elapsed
        )));
    }

    #[test]
    fn test_autoplay_reports_write_errors() {
        let Ok(game) = parse(&["synthesis", "--seed", "3"]).build_game() else {
            panic!("game should build");
        };
        let mut out = ClosingPipe { lines_left: 2 };
        let err = narrate_autoplay(game, &mut out).err().unwrap();
        assert_eq!(err.to_string(), "Cannot write autoplay output");
    }
}
