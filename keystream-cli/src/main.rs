#![deny(missing_docs)]
//! A command-line interface for the LFSR keystream toolkit.

use clap::{Parser, Subcommand, ValueEnum};
use keystream_core::bits::{self, format_bits};
use keystream_core::combiner::{ClockedStats, CombinerStats};
use keystream_core::config::SearchDefaults;
use keystream_core::pipeline::{self, PipelineRequest};
use keystream_core::service::{
    self, DecryptRequest, GenerateLfsrRequest, GenerateLfsrResponse, RunFsm2Request,
    RunFsm3Request, TwoRegisterVariant,
};
use log::{error, info};
use serde::Serialize;
use std::fmt::{Display, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Run a 3-bit register with taps 0 and 2\nkeystream-cli lfsr --state 001 --taps 0,2\n\n# Combine three streams with the clock-controlled rule\nkeystream-cli fsm3 --r1 101 --r2 11 --r3 01\n\n# Combine two streams, keeping only steps where R1 is 1\nkeystream-cli fsm2 --r1 10 --r2 101 --variant sparse\n\n# Try the built-in keys against the built-in ciphertext\nkeystream-cli decrypt\n\n# Run the three-register preset and save the keystream\nkeystream-cli pipeline --preset three-register --output keystream.txt"
)]
struct Cli {
    /// JSON file overriding the built-in ciphertext, keys and dictionary.
    #[arg(long, global = true, env = "KEYSTREAM_DEFAULTS", value_name = "FILE")]
    defaults: Option<PathBuf>,

    /// Print the raw JSON payload instead of a report.
    #[arg(long, global = true)]
    json: bool,

    /// Write the result to a file instead of standard output.
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// A bit sequence written as `1011`, `1,0,1,1` or `"1 0 1 1"`.
#[derive(Clone, Debug)]
struct BitArg(Vec<u8>);

fn parse_bit_arg(text: &str) -> Result<BitArg, String> {
    bits::parse_bits(text)
        .map(BitArg)
        .map_err(|e| e.to_string())
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    /// One output bit per step
    Dense,
    /// Output only when R1 emits 1
    Sparse,
}

impl From<Variant> for TwoRegisterVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Dense => Self::Dense,
            Variant::Sparse => Self::Sparse,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve one LFSR until its first repeated state
    Lfsr {
        /// Initial register state
        #[arg(short, long, value_parser = parse_bit_arg)]
        state: BitArg,

        /// Comma-separated feedback tap indices
        #[arg(short, long, value_delimiter = ',')]
        taps: Vec<usize>,

        /// Maximum number of steps before giving up on finding a period
        #[arg(long)]
        max_steps: Option<usize>,
    },
    /// Combine three streams with the clock-controlled rule
    Fsm3 {
        /// Control stream
        #[arg(long, value_parser = parse_bit_arg)]
        r1: BitArg,
        /// Stream feeding the b carry
        #[arg(long, value_parser = parse_bit_arg)]
        r2: BitArg,
        /// Stream feeding the c carry
        #[arg(long, value_parser = parse_bit_arg)]
        r3: BitArg,
        /// Initial b carry
        #[arg(long, default_value_t = 0)]
        b_minus1: u8,
        /// Initial c carry
        #[arg(long, default_value_t = 0)]
        c_minus1: u8,
        /// Number of steps; defaults to len(r1) * len(r2) * len(r3)
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Combine two streams with an alternating-step rule
    Fsm2 {
        /// Control stream
        #[arg(long, value_parser = parse_bit_arg)]
        r1: BitArg,
        /// Data stream
        #[arg(long, value_parser = parse_bit_arg)]
        r2: BitArg,
        /// Number of steps; defaults to len(r1) * len(r2)
        #[arg(long)]
        steps: Option<usize>,
        /// Which alternating-step rule to apply
        #[arg(long, value_enum, default_value = "dense")]
        variant: Variant,
    },
    /// Try candidate keys against a ciphertext and rank the decodings
    Decrypt {
        /// Ciphertext bits; the configured default when omitted
        #[arg(long, value_parser = parse_bit_arg)]
        cipher: Option<BitArg>,
        /// Candidate key, repeatable; the configured defaults when omitted
        #[arg(long = "key", value_parser = parse_bit_arg)]
        keys: Vec<BitArg>,
        /// File of scoring words separated by whitespace or commas
        #[arg(long, value_name = "FILE")]
        dictionary_file: Option<PathBuf>,
        /// Scoring word, repeatable
        #[arg(long = "word")]
        words: Vec<String>,
    },
    /// Generate register streams and combine them in one go
    Pipeline {
        /// Built-in register preset
        #[arg(long, default_value = "three-register", conflicts_with = "config")]
        preset: String,
        /// JSON file describing the registers and the combiner rule
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Combiner step count
        #[arg(long)]
        steps: Option<usize>,
        /// Step budget for each register
        #[arg(long)]
        max_steps: Option<usize>,
    },
}

fn fail(context: &str, err: impl Display) -> ! {
    error!("{context}: {err}");
    std::process::exit(1);
}

fn render<T: Serialize>(json: bool, value: &T, report: impl FnOnce(&T) -> String) -> String {
    if json {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| fail("Failed to serialize result", e))
    } else {
        report(value)
    }
}

fn describe_period(period: Option<usize>) -> String {
    period.map_or_else(|| "none (step budget exhausted)".to_string(), |p| p.to_string())
}

fn describe_optional<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

fn lfsr_report(label: &str, run: &GenerateLfsrResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{label} period: {}", describe_period(run.period));
    let _ = writeln!(
        out,
        "{label} theoretical period: {}",
        describe_optional(run.theoretical_period)
    );
    let _ = writeln!(out, "{label} outputs: {}", format_bits(&run.outputs));
    let _ = writeln!(out, "{label} states:");
    for (i, state) in run.states.iter().enumerate() {
        let _ = writeln!(out, "  {i:>4} : {}", format_bits(state));
    }
    out
}

fn clocked_report(stats: &ClockedStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "FSM stats:");
    let _ = writeln!(out, "  steps : {}", stats.steps);
    let _ = writeln!(out, "  real_period : {}", stats.real_period);
    let _ = writeln!(
        out,
        "  theoretical_period : {}",
        describe_optional(stats.theoretical_period)
    );
    let _ = writeln!(out, "  r1_index : {}", stats.r1_index);
    let _ = writeln!(out, "  r2_index : {}", stats.r2_index);
    let _ = writeln!(out, "  r3_index : {}", stats.r3_index);
    let _ = writeln!(out, "  ones : {}", stats.ones);
    let _ = writeln!(out, "  zeros : {}", stats.zeros);
    out
}

fn keystream_report(stats: &str, keystream: &[u8]) -> String {
    format!(
        "{stats}\nFSM output:\n{}\n\nFSM output length: {}\n",
        format_bits(keystream),
        keystream.len()
    )
}

fn read_words(path: &Path) -> Vec<String> {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| fail("Failed to read dictionary file", e));
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn load_defaults(path: Option<&Path>) -> SearchDefaults {
    path.map_or_else(SearchDefaults::builtin, |p| {
        SearchDefaults::from_json_file(p).unwrap_or_else(|e| fail("Failed to load defaults", e))
    })
}

fn run(cli: &Cli) -> String {
    match &cli.command {
        Commands::Lfsr {
            state,
            taps,
            max_steps,
        } => {
            let request = GenerateLfsrRequest {
                init_state: state.0.clone(),
                taps: taps.clone(),
                max_steps: *max_steps,
            };
            info!(
                "Running {}-bit register with taps {taps:?}",
                request.init_state.len()
            );
            let response = service::generate_lfsr(&request)
                .unwrap_or_else(|e| fail("Failed to run LFSR", e));
            render(cli.json, &response, |r| lfsr_report("R", r))
        }
        Commands::Fsm3 {
            r1,
            r2,
            r3,
            b_minus1,
            c_minus1,
            steps,
        } => {
            let request = RunFsm3Request {
                r1: r1.0.clone(),
                r2: r2.0.clone(),
                r3: r3.0.clone(),
                b_minus1: *b_minus1,
                c_minus1: *c_minus1,
                steps: *steps,
            };
            let response = service::run_fsm_3(&request)
                .unwrap_or_else(|e| fail("Failed to run FSM", e));
            render(cli.json, &response, |r| {
                keystream_report(&clocked_report(&r.stats), &r.fsm)
            })
        }
        Commands::Fsm2 {
            r1,
            r2,
            steps,
            variant,
        } => {
            let request = RunFsm2Request {
                r1: r1.0.clone(),
                r2: r2.0.clone(),
                steps: *steps,
                variant: (*variant).into(),
            };
            let response = service::run_fsm_2(&request)
                .unwrap_or_else(|e| fail("Failed to run FSM", e));
            render(cli.json, &response, |r| {
                let stats = format!(
                    "FSM stats:\n  output_length : {}\n  theoretical_period : {}\n",
                    r.stats.output_length,
                    describe_optional(r.stats.theoretical_period)
                );
                keystream_report(&stats, &r.fsm)
            })
        }
        Commands::Decrypt {
            cipher,
            keys,
            dictionary_file,
            words,
        } => {
            let defaults = load_defaults(cli.defaults.as_deref());
            let mut dictionary: Vec<String> =
                dictionary_file.as_deref().map(read_words).unwrap_or_default();
            dictionary.extend(words.iter().cloned());
            let request = DecryptRequest {
                cipher_bits: cipher.as_ref().map(|c| c.0.clone()),
                keys: (!keys.is_empty()).then(|| keys.iter().map(|k| k.0.clone()).collect()),
                dictionary: (!dictionary.is_empty()).then_some(dictionary),
            };
            let response = service::decrypt(&request, &defaults)
                .unwrap_or_else(|e| fail("Failed to decrypt", e));
            render(cli.json, &response, |r| {
                let mut out = String::new();
                for candidate in &r.per_key {
                    let _ = writeln!(
                        out,
                        "Key{}: {}    (score={})",
                        candidate.key_index, candidate.decoded_text, candidate.score
                    );
                }
                let _ = writeln!(out);
                let _ = writeln!(out, "Best key: {}", describe_optional(r.best.key_index));
                let _ = writeln!(out, "Decoded text: {}", r.best.decoded_text);
                let _ = writeln!(out, "Score: {}", r.best.score);
                out
            })
        }
        Commands::Pipeline {
            preset,
            config,
            steps,
            max_steps,
        } => {
            let mut request: PipelineRequest = match config {
                Some(path) => {
                    let text = fs::read_to_string(path)
                        .unwrap_or_else(|e| fail("Failed to read pipeline file", e));
                    serde_json::from_str(&text)
                        .unwrap_or_else(|e| fail("Failed to parse pipeline file", e))
                }
                None => pipeline::preset(preset)
                    .unwrap_or_else(|e| fail("Failed to load preset", e)),
            };
            if steps.is_some() {
                request.steps = *steps;
            }
            if max_steps.is_some() {
                request.max_steps = *max_steps;
            }
            let response = pipeline::run_pipeline(&request)
                .unwrap_or_else(|e| fail("Failed to run pipeline", e));
            render(cli.json, &response, |r| {
                let mut out = String::new();
                for (i, register) in r.registers.iter().enumerate() {
                    out.push_str(&lfsr_report(&format!("R{}", i + 1), register));
                    out.push('\n');
                }
                let stats = match &r.stats {
                    CombinerStats::Clocked(stats) => clocked_report(stats),
                    CombinerStats::Alternating(stats) => format!(
                        "FSM stats:\n  output_length : {}\n  theoretical_period : {}\n",
                        stats.output_length,
                        describe_optional(stats.theoretical_period)
                    ),
                };
                out.push_str(&keystream_report(&stats, &r.keystream));
                out
            })
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = run(&cli);

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &result) {
                fail("Failed to write output file", e);
            }
            info!("Result written to '{}'", path.display());
        }
        None => print!("{result}"),
    }
}
