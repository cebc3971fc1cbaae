use anyhow::{Context, Result};
use rcss_syntax::logging::tracing_init;
use rcss_syntax::row_parser::fuzz::{fuzz_reparse, retest_fuzz_error};

type FuzzSampleList = Vec<String>;

// Usage: fuzz_reparse [seed] [iterations]
// Stored samples in fuzz_reparse_samples.json are retested first.
pub fn main() -> Result<()> {
    tracing_init(tracing::Level::INFO);

    let samples_path = std::path::Path::new(file!())
        .parent()
        .context("sample directory")?
        .join("fuzz_reparse_samples.json");
    let file = std::fs::File::open(&samples_path)
        .with_context(|| format!("could not open {}", samples_path.display()))?;
    let fuzz_samples: FuzzSampleList = serde_json::from_reader(file)?;

    let div = "#".repeat(44) + "\n";
    for sample in fuzz_samples {
        println!("{div}##### RETESTING FUZZ SAMPLE `{}` ##### \n{div}", sample.escape_debug());
        retest_fuzz_error(&sample);
    }

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(seed) => seed.parse().context("seed must be a number")?,
        None => fastrand::u64(..),
    };
    let iterations = match args.next() {
        Some(n) => n.parse().context("iterations must be a number")?,
        None => 10_000,
    };

    println!("fuzzing {iterations} edits with seed {seed}");
    let [token, block, full] = fuzz_reparse(seed, iterations);
    println!("token reparses: {token}, block reparses: {block}, full reparses: {full}");
    Ok(())
}
