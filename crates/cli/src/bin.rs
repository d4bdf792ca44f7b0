use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use eyre::{bail, Result, WrapErr};
use log::{debug, info};
use owo_colors::OwoColorize;
use tinyc::Module;

#[derive(Parser)]
#[command(name = "tinyc", version)]
/// tinyc CLI
struct TinycCli {
    #[command(subcommand)]
    nested: TinycSubcommand,

    /// log level
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum TinycSubcommand {
    Run(Run),
    Build(Build),
}

/// compile and run a program
#[derive(Args)]
struct Run {
    /// source file (`.c`) or compiled archive (`.tac`) to run
    file: PathBuf,

    /// function to run
    #[arg(short = 'f', long, default_value = "start")]
    func: String,

    /// integer arguments to pass to the function
    #[arg(short = 'a', long = "arg")]
    args: Vec<i32>,
}

/// compile a program to x86-64 assembly or a `.tac` archive
#[derive(Args)]
struct Build {
    /// source file to compile
    file: PathBuf,

    /// output file; assembly goes to stdout when omitted
    #[arg(short = 'o', long)]
    out: Option<PathBuf>,

    /// output format
    #[arg(long, value_enum, default_value = "asm")]
    emit: Emit,
}

#[derive(Clone, Copy, ValueEnum)]
enum Emit {
    Asm,
    Tac,
}

fn main() -> Result<()> {
    let args = TinycCli::parse();
    let level = match args.log_level.as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "info" => log::LevelFilter::Info,
        _ => log::LevelFilter::Info,
    };

    pretty_env_logger::formatted_builder().filter_level(level).init();

    match args.nested {
        TinycSubcommand::Run(args) => run(args),
        TinycSubcommand::Build(args) => build(args),
    }
}

fn load_module(file: &Path) -> Result<Module> {
    let module = match file.extension().is_some_and(|ext| ext == "tac") {
        true => {
            let bytes = std::fs::read(file).wrap_err_with(|| format!("error reading {}", file.display()))?;
            Module::from_tac(&bytes)?
        }
        false => Module::parse_file(file)?,
    };
    Ok(module)
}

fn run(args: Run) -> Result<()> {
    let module = load_module(&args.file)?;
    debug!("args: {:?}", args.args);

    let func = module.get_func(&args.func)?;
    match func.call(&args.args) {
        Ok(result) => {
            info!("`{}` returned {result}", args.func);
            println!("{result}");
            Ok(())
        }
        Err(tinyc::Error::Trap(trap)) => {
            eprintln!("{} {trap}", "trap:".red().bold());
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

fn build(args: Build) -> Result<()> {
    let module = load_module(&args.file)?;

    match args.emit {
        Emit::Asm => {
            let asm = module.to_x86_64();
            match &args.out {
                Some(path) => {
                    std::fs::write(path, asm).wrap_err_with(|| format!("error writing {}", path.display()))?;
                    info!("wrote assembly to {}", path.display());
                }
                None => print!("{asm}"),
            }
        }
        Emit::Tac => {
            let Some(path) = &args.out else {
                bail!("`--emit tac` requires an output file (`-o`)");
            };
            let tac = module.serialize_tac()?;
            std::fs::write(path, tac).wrap_err_with(|| format!("error writing {}", path.display()))?;
            info!("wrote archive to {}", path.display());
        }
    }
    Ok(())
}
