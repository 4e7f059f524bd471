use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use puppet_release::bump;
use puppet_release::config;
use puppet_release::each::{self, EachOptions};
use puppet_release::git::Git2Vcs;
use puppet_release::install::{self, InstallOptions};
use puppet_release::manifest::Manifest;
use puppet_release::push;
use puppet_release::report::{self, DiffMode};
use puppet_release::semver;
use puppet_release::ui;

#[derive(Parser)]
#[command(
    name = "puppet-release",
    about = "Promote, compare and install the module pins of a Puppetfile",
    version
)]
struct Cli {
    #[arg(short, long, global = true, help = "Show logs verbosely")]
    verbose: bool,

    #[arg(long, global = true, help = "Path holding the module checkouts")]
    module_path: Option<String>,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs)]
struct CheckoutArgs {
    #[arg(help = "A Puppetfile path")]
    file: String,

    #[arg(
        long,
        help = "Throttle number of concurrent jobs; 0 means one per module"
    )]
    throttle: Option<i64>,

    #[arg(short, long, help = "Check out with --force")]
    force: bool,

    #[arg(
        long,
        default_value = ".*",
        help = "Regex selecting modules to be installed"
    )]
    includes_with_repository_name: String,
}

#[derive(Subcommand)]
enum Command {
    /// Clone or fetch the modules of a Puppetfile and check out their pins
    Install(CheckoutArgs),

    /// Check out modules without network access
    Checkout(CheckoutArgs),

    /// Print a Puppetfile in canonical form, entries sorted by name
    Format {
        #[arg(help = "Puppetfile to be formatted")]
        file: String,

        #[arg(short = 'w', long, help = "Overwrite the file in place")]
        overwrite: bool,
    },

    /// Compare two Puppetfiles against the checked out module trees
    Diff {
        #[arg(help = "Source Puppetfile")]
        src: String,

        #[arg(help = "Destination Puppetfile")]
        dst: String,

        #[arg(help = "Extra directories to be compared")]
        dirs: Vec<String>,

        #[arg(long, value_enum, default_value = "stat")]
        mode: DiffMode,
    },

    /// Print the git push commands a release needs
    GitPush {
        #[arg(help = "Source Puppetfile")]
        src: String,

        #[arg(help = "Destination Puppetfile")]
        dst: String,

        #[arg(long, help = "Remote name (defaults to the configured remote)")]
        remote_name: Option<String>,
    },

    /// Print a bumped-up Puppetfile based on the given files
    BumpUp {
        #[arg(help = "Source (baseline) Puppetfile")]
        src: String,

        #[arg(help = "Destination (proposed) Puppetfile")]
        dst: String,

        #[arg(long, help = "Release branch name used first")]
        release_branch: Option<String>,
    },

    /// Run a command once per module; {name}, {ref}, {ref_semver} and
    /// {value} expand in arguments and templates
    Each {
        #[arg(help = "A Puppetfile path")]
        file: String,

        #[arg(short, long, default_value = "", help = "Prefix template")]
        prefix: String,

        #[arg(short, long, default_value = "", help = "Body template")]
        body: String,

        #[arg(short, long, default_value = "", help = "Suffix template")]
        suffix: String,

        #[arg(last = true, help = "Command and args")]
        args: Vec<String>,
    },

    /// Sort versions read from stdin in ascending order
    SemverSort,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = config::load_config(cli.config.as_deref())?;
    let module_root = PathBuf::from(
        cli.module_path
            .clone()
            .unwrap_or_else(|| config.module_path.clone()),
    );
    let vcs = Git2Vcs::new();

    match cli.command {
        Command::Install(args) => run_checkout(args, false, &config, &vcs, &module_root),
        Command::Checkout(args) => run_checkout(args, true, &config, &vcs, &module_root),

        Command::Format { file, overwrite } => {
            let path = Path::new(&file);
            let formatted = Manifest::load(path)?.sorted_by_name().format();
            if overwrite {
                std::fs::write(path, formatted)?;
            } else {
                print!("{}", formatted);
            }
            Ok(())
        }

        Command::Diff {
            src,
            dst,
            dirs,
            mode,
        } => {
            let src = Manifest::load(Path::new(&src))?;
            let dst = Manifest::load(Path::new(&dst))?;
            let text = report::report(&src, &dst, &dirs, mode, &vcs, &module_root)?;
            print!("{}", text);
            Ok(())
        }

        Command::GitPush {
            src,
            dst,
            remote_name,
        } => {
            let src = Manifest::load(Path::new(&src))?;
            let dst = Manifest::load(Path::new(&dst))?;
            let remote = remote_name.unwrap_or_else(|| config.remote.clone());
            let stdout = io::stdout();
            push::print_push_commands(&src, &dst, &remote, &module_root, &mut stdout.lock())?;
            Ok(())
        }

        Command::BumpUp {
            src,
            dst,
            release_branch,
        } => {
            let release = release_branch.unwrap_or_else(|| config.release_branch.clone());
            let stdout = io::stdout();
            let failed = bump::bump_file(
                Path::new(&src),
                Path::new(&dst),
                &release,
                &vcs,
                &module_root,
                &mut stdout.lock(),
            )?;
            if failed > 0 {
                ui::display_error(&format!("{} module(s) could not be bumped", failed));
                std::process::exit(1);
            }
            Ok(())
        }

        Command::Each {
            file,
            prefix,
            body,
            suffix,
            args,
        } => {
            let manifest = Manifest::load(Path::new(&file))?;
            let opts = EachOptions {
                prefix,
                body,
                suffix,
            };
            let stdout = io::stdout();
            each::run_each(&manifest, &args, &opts, &module_root, &mut stdout.lock())?;
            Ok(())
        }

        Command::SemverSort => {
            let stdin = io::stdin();
            let mut versions = Vec::new();
            for line in stdin.lock().lines() {
                let line = line?;
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    versions.push(trimmed.to_string());
                }
            }
            let sorted = semver::sort_versions(&versions)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for version in sorted {
                writeln!(out, "{}", version)?;
            }
            Ok(())
        }
    }
}

fn run_checkout(
    args: CheckoutArgs,
    only_checkout: bool,
    config: &config::Config,
    vcs: &Git2Vcs,
    module_root: &Path,
) -> Result<()> {
    let manifest = Manifest::load(Path::new(&args.file))?;
    let throttle = match args.throttle {
        Some(n) if n > 0 => n as usize,
        Some(_) => 0,
        None => config.install.throttle,
    };
    let opts = InstallOptions {
        throttle,
        force: args.force || config.install.force,
        only_checkout,
        includes: args.includes_with_repository_name,
    };
    let failed = install::run_install(&manifest, &opts, vcs, module_root)?;
    if failed.is_empty() {
        ui::display_success(&format!(
            "{} module(s) up to date in {}",
            manifest.entries().len(),
            module_root.display()
        ));
        Ok(())
    } else {
        ui::display_error(&format!("failed modules: {}", failed.join(", ")));
        std::process::exit(1);
    }
}
