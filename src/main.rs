use anyhow::Result;
use clap::{Parser, Subcommand};

use sitecost::cli::{handle_report_command, handle_stats_command, ReportArgs, StatsArgs};
use sitecost::config::{paths::SiteCostPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "sitecost",
    version,
    about = "Material and labor cost reports for construction sites",
    long_about = "sitecost turns material-activity and labor-ledger query results \
                  into a cost report: per-day material spend, labor totals and the \
                  overall project cost, as a terminal report or JSON, YAML or CSV."
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a cost report
    Report(ReportArgs),

    /// Print summary figures as JSON
    Stats(StatsArgs),

    /// Write default settings
    Init {
        /// Overwrite existing settings
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        sitecost::logging::init_with_default("debug");
    } else {
        sitecost::logging::init();
    }

    let paths = SiteCostPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Report(args)) => handle_report_command(&settings, args)?,
        Some(Commands::Stats(args)) => handle_stats_command(&settings, args)?,
        Some(Commands::Init { force }) => {
            if paths.is_initialized() && !force {
                println!(
                    "Settings already exist at: {}",
                    paths.settings_file().display()
                );
                println!("Use --force to overwrite them with defaults.");
            } else {
                let defaults = Settings::default();
                defaults.save(&paths)?;
                println!("Settings written to: {}", paths.settings_file().display());
                println!();
                println!("Set your company details and UTC offset there, then run");
                println!("'sitecost report --activities <FILE>'.");
            }
        }
        Some(Commands::Config) => {
            println!("sitecost Configuration");
            println!("======================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:   {}", settings.currency_symbol);
            println!("  Date format:       {}", settings.date_format);
            match settings.utc_offset_minutes {
                Some(minutes) => println!("  UTC offset:        {} minutes", minutes),
                None => println!("  UTC offset:        host local time"),
            }
            println!("  Validation policy: {}", settings.validation_policy);
            println!(
                "  Cost tolerance:    {} + {} per unit",
                settings.cost_tolerance.absolute, settings.cost_tolerance.per_unit_rounding
            );
            if settings.company.name.is_empty() {
                println!("  Company:           (not set)");
            } else {
                println!("  Company:           {}", settings.company.name);
            }
        }
        None => {
            println!("sitecost - construction site cost reports");
            println!();
            println!("Run 'sitecost --help' for usage information.");
        }
    }

    Ok(())
}
