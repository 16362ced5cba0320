use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;

use hack_vm_translator::{BootstrapMode, Job, TranslatorOptions};

#[derive(Parser, Debug)]
#[command(name = "vmtranslator")]
#[command(about = "Translates VM code (a .vm file or a directory of them) into Hack assembly")]
#[command(version)]
struct Cli {
    /// Input .vm file or directory containing .vm files
    input: PathBuf,

    /// Output .asm file (defaults to <input>.asm, or <dir>/<dir>.asm)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Whether to emit the SP=256 / call Sys.init prologue
    #[arg(long, value_enum, default_value_t = BootstrapMode::Auto)]
    bootstrap: BootstrapMode,

    /// Leave out the `// <command>` line before each command's code
    #[arg(long)]
    no_comments: bool,

    /// Log progress at debug level (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let job = Job::plan(&cli.input, cli.output.as_deref())
        .with_context(|| format!("cannot translate {}", cli.input.display()))?;

    let options = TranslatorOptions {
        echo_commands: !cli.no_comments,
    };
    job.run(cli.bootstrap, options)
        .with_context(|| format!("translation of {} failed", cli.input.display()))?;

    println!("{}", job.output.display());
    Ok(())
}
