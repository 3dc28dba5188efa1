use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use yearn_app::{RunOptions, Yearn};
use yearn_core::config::Config;
use yearn_core::CONFIG_FILE;

#[derive(clap::Parser)]
#[clap(name = "Yearn")]
#[clap(version = "0.1")]
#[clap(about = "Headless libretro frontend", long_about = None)]
struct Context {
    /// Verbosity
    #[clap(short, long)]
    verbose: bool,
    /// Trace level verbosity
    #[clap(short, long)]
    trace: bool,
    /// Root directory, relative paths in the config resolve against it
    #[clap(short, long, default_value = ".")]
    root: PathBuf,
    /// Config file [default: <root>/yearn.toml]
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Core to use, by name or static prefix
    #[clap(long)]
    core: Option<String>,
    /// Stop after this many frames
    #[clap(short, long)]
    frames: Option<u64>,
    /// Save state to load before running
    #[clap(short, long)]
    state: Option<PathBuf>,
    /// Resume from the game's state file in the state directory
    #[clap(long)]
    resume: bool,
    /// Write the game's state file on exit
    #[clap(long)]
    save_state: bool,
    /// List the available cores and exit
    #[clap(short, long)]
    list: bool,
    /// Content to run
    game: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Context::parse();
    let level = if args.verbose || args.trace {
        if args.trace {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Debug
        }
    } else {
        log::LevelFilter::Info
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .env()
        .init()?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| args.root.join(CONFIG_FILE));
    let config = Config::load(&config_path)?.resolve(&args.root);

    let mut yearn = Yearn::new(config);

    if args.list {
        for core in yearn.cores() {
            let sys = core.sys_info();
            println!(
                "{} {} [{}] ({})",
                sys.library_name,
                sys.library_version,
                core.extensions_str(),
                core.source()
            );
        }
        return Ok(());
    }

    yearn.run(&RunOptions {
        game: args.game,
        core: args.core,
        frames: args.frames,
        state: args.state,
        resume: args.resume,
        save_state: args.save_state,
        pace: true,
    })?;
    Ok(())
}
