use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rcss_syntax::logging::tracing_init;
use rcss_syntax::{parse_with, ParserConfig};

// Usage: rcss_syntax <file.rcss> [config.json] [--outline]
fn main() -> Result<()> {
    tracing_init(tracing::Level::INFO);

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        bail!("usage: rcss_syntax <file.rcss> [config.json] [--outline]");
    };
    let mut config = ParserConfig::default();
    let mut outline = false;
    for arg in args {
        if arg == "--outline" {
            outline = true;
            continue;
        }
        let json = std::fs::read_to_string(&arg)
            .with_context(|| format!("could not read configuration `{arg}`"))?;
        config = ParserConfig::from_json(&json)?;
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("could not read `{}`", path.display()))?;
    let tree = parse_with(&text, &config);
    if outline {
        println!("{}", tree.fancy_string());
    } else {
        print!("{}", tree.debug_dump());
    }
    tracing::info!(errors = tree.errors().len(), "parsed {}", path.display());
    Ok(())
}
