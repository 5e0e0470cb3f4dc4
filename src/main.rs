use clap::{ArgAction, CommandFactory, Parser, ValueHint, value_parser};
use clap_complete::aot::{Shell, generate};
use fsweep::{DEFAULT_WORKERS, MAX_WORKERS, WalkError, Walker};
use std::io::stdout;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
///generate our arguments and parse them.
pub struct Args {
    #[arg(
        value_name = "DIRECTORY",
        help = "Root of the subtree to census",
        value_hint = ValueHint::DirPath,
        required_unless_present = "generate",
        index = 1
    )]
    directory: Option<PathBuf>,

    #[arg(
        value_name = "OUTPUT",
        help = "File the record stream is written to",
        value_hint = ValueHint::FilePath,
        required_unless_present = "generate",
        index = 2
    )]
    output: Option<PathBuf>,

    #[arg(
        short = 'j',
        long = "workers",
        default_value_t = DEFAULT_WORKERS,
        help = format!("Worker cap, clamped to 1..={MAX_WORKERS}\n")
    )]
    workers: usize,

    #[arg(
        long = "include-snapshots",
        default_value_t = false,
        help = "Descend into directories named .snapshot instead of skipping them\n"
    )]
    include_snapshots: bool,

    #[arg(
        short = 'z',
        long = "compress",
        default_value_t = false,
        help = "Stream the record lines through a zstd frame (the header stays plain)\n"
    )]
    compress: bool,

    #[arg(
        long = "generate",
        action = ArgAction::Set,
        value_parser = value_parser!(Shell),
        help = "Generate shell completions"
    )]
    generate: Option<Shell>,
}

fn main() -> Result<(), WalkError> {
    let args = Args::parse();

    if let Some(generator) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_owned();
        generate(generator, &mut cmd, name, &mut stdout());
        return Ok(());
    }

    // both are required when --generate is absent
    let (Some(directory), Some(output)) = (args.directory, args.output) else {
        eprintln!("Error: DIRECTORY and OUTPUT are required.");
        std::process::exit(2);
    };

    if !directory.is_dir() {
        eprintln!("{} is not a directory", directory.display());
        std::process::exit(1);
    }

    let summary = Walker::init(&directory, &output)
        .max_workers(args.workers)
        .ignore_snapshots(!args.include_snapshots)
        .compress(args.compress)
        .run()?;

    println!(
        "wrote {} (workers spawned: {}, compressed: {})",
        summary.output.display(),
        summary.workers_spawned,
        summary.compressed
    );

    Ok(())
}
