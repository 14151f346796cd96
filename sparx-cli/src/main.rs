use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

use sparx_core::{
    EmberEnv, GithubFeed, GlobalCache, PackageId, ProjectConfig, MANIFEST_FILE,
};

#[derive(Parser)]
#[command(name = "sparx")]
#[command(version = "0.1.0")]
#[command(about = "Sparx package manager for the Ember engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a spark into the global cache
    Add {
        /// Path to a .spkg archive, or a creator/package feed identifier
        #[arg(value_name = "TARGET")]
        target: String,

        /// Release tag to install (required for feed identifiers)
        #[arg(value_name = "TAG")]
        tag: Option<String>,
    },

    /// Declare an installed spark as a dependency of the current project
    Use {
        /// Spark identifier (creator/package)
        #[arg(value_name = "PACKAGE")]
        package: String,
    },

    /// Generate the build descriptor and run the Ember build tool
    Build,

    /// Select the active Ember engine version
    Emberversion {
        /// Installed Ember version to activate
        #[arg(value_name = "VERSION")]
        version: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Add { target, tag } => add_command(&target, tag.as_deref()),
        Commands::Use { package } => use_command(&package),
        Commands::Build => build_command(),
        Commands::Emberversion { version } => emberversion_command(&version),
    }
}

/// Resolve the Ember environment at the process edge: `EMBER_PATH` for the
/// engine root (falling back to `~/.ember`) and `SPARX_TEMP` for the
/// scratch directory (falling back to the system temp dir).
fn ember_env() -> Result<EmberEnv> {
    let ember_root = match std::env::var_os("EMBER_PATH") {
        Some(path) => PathBuf::from(path),
        None => dirs::home_dir()
            .map(|home| home.join(".ember"))
            .context("cannot locate the Ember installation; set EMBER_PATH or install Ember under ~/.ember")?,
    };

    let temp_dir = match std::env::var_os("SPARX_TEMP") {
        Some(path) => PathBuf::from(path),
        None => std::env::temp_dir(),
    };

    Ok(EmberEnv::new(ember_root, temp_dir))
}

fn add_command(target: &str, tag: Option<&str>) -> Result<()> {
    let env = ember_env()?;
    let cache = GlobalCache::open(&env)?;
    let feed = GithubFeed::new()?;

    let archive = sparx_core::resolve(target, tag, &feed, &env)?;

    println!("installing spark...");
    let pending = sparx_core::stage(archive.path(), &cache)?;

    println!(
        "are you sure you want to install spark {} version {}?",
        pending.manifest().name,
        pending.manifest().version
    );
    println!(
        "it will take up {:.2} MB of disk space",
        pending.size_mb()
    );

    let accepted = prompt_yes_no("y/n? ")?;
    match pending.confirm(accepted)? {
        Some(installed) => {
            println!("✅ installed {} {}", installed.name, installed.version)
        }
        None => println!("aborting"),
    }

    Ok(())
}

fn use_command(package: &str) -> Result<()> {
    let env = ember_env()?;
    let cache = GlobalCache::open(&env)?;
    let id = PackageId::parse(package)?;

    if !cache.has_package(&id) {
        anyhow::bail!(
            "spark {} is not in the global cache; install it with `sparx add`",
            id
        );
    }

    let project_dir = std::env::current_dir()?;
    let mut config = ProjectConfig::load(&project_dir).with_context(|| {
        format!(
            "no {} project configuration found in the current directory",
            MANIFEST_FILE
        )
    })?;

    config.add_spark(&id);
    config.store(&project_dir)?;

    println!("✅ {} now uses {}", config.name, id);
    Ok(())
}

fn build_command() -> Result<()> {
    let env = ember_env()?;
    let cache = GlobalCache::open(&env)?;

    let project_dir = std::env::current_dir()?;
    let config = ProjectConfig::load(&project_dir).with_context(|| {
        format!(
            "no {} project configuration found in the current directory",
            MANIFEST_FILE
        )
    })?;

    println!("created project files. building...");
    let outcome = sparx_core::run_build(&config, &cache, &project_dir)?;

    println!("✅ build complete");
    if outcome.assets_staged {
        println!("   staged assets into {}", sparx_core::build::OUTPUT_DIR);
    }

    Ok(())
}

fn emberversion_command(version: &str) -> Result<()> {
    let env = ember_env()?;
    env.set_active_version(version)?;

    println!("✅ ember {} is now the active version", version);
    Ok(())
}

fn prompt_yes_no(prompt: &str) -> Result<bool> {
    print!("\n{}", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
