mod convert;
mod subset;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::subset::{DEFAULT_CALIBRATION_SIZE, DEFAULT_SEED, DEFAULT_TEST_SIZE};

/// DialFact to MCQA benchmark conversion
#[derive(Parser, Debug)]
#[command(name = "dialfact-mcqa", version)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Convert DialFact JSONL splits into a claim verification MCQA dataset
    Convert {
        #[arg(long, default_value = "test_split.jsonl")]
        test_file: PathBuf,
        #[arg(long, default_value = "valid_split.jsonl")]
        valid_file: PathBuf,
        #[arg(long, default_value = "dialfact_mcqa.json")]
        output: PathBuf,
        /// Directory of the persistent page cache
        #[arg(long, default_value = "wikipedia_cache")]
        cache_dir: PathBuf,
        /// Items placed in the calibration bucket before the rest go to test
        #[arg(long, default_value_t = 5)]
        calibration_size: usize,
    },
    /// Sample a seeded calibration/test subset from a converted dataset
    Subset {
        #[arg(long, default_value = "dialfact_mcqa.json")]
        input: PathBuf,
        #[arg(long, default_value = "dialfact_mcqa_subset.json")]
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_CALIBRATION_SIZE)]
        calib_size: usize,
        #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
        test_size: usize,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
}

pub async fn run(cmd: Cmd) -> anyhow::Result<()> {
    match cmd {
        Cmd::Convert {
            test_file,
            valid_file,
            output,
            cache_dir,
            calibration_size,
        } => {
            let options = crate::config::ConvertOptions {
                calibration_size,
                ..Default::default()
            };
            convert::convert(&test_file, &valid_file, &output, &cache_dir, options).await
        }
        Cmd::Subset {
            input,
            output,
            calib_size,
            test_size,
            seed,
        } => subset::subset(&input, &output, calib_size, test_size, seed),
    }
}
