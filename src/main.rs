use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use webmap_export::{compose, config, output, project};

/// Inline map script, ending with `</script>` and any WFS includes.
const SCRIPT_FILE: &str = "map_script.html";
/// `<script>` tags loading exported layer data, for the document head.
const INCLUDES_FILE: &str = "data_includes.html";

#[derive(Parser)]
#[command(name = "webmap-export")]
#[command(about = "Generate the Leaflet / Mapbox GL script of a web map export")]
#[command(long_about = "\
Generate the Leaflet / Mapbox GL script of a web map export

Reads a project description (JSON) and an optional webmap.toml, and writes
the map's inline script, the data include tags and legend icons:

  dist/
  ├── map_script.html              # Inline script, closed by </script>
  ├── data_includes.html           # <script src=\"data/<layer>.js\"> tags
  └── legend/
      └── Landuse_1_Forest0.png    # One swatch per legend entry

Layers are emitted in drawing order. Layer-tree groups become collapsible
entries of the layer menu.

Run 'webmap-export gen-config' to generate a documented webmap.toml.")]
#[command(version)]
struct Cli {
    /// Project description (JSON)
    #[arg(long, default_value = "project.json", global = true)]
    project: PathBuf,

    /// Directory containing webmap.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose the map script and write legend icons
    Generate,
    /// Validate the project and config without writing anything
    Check,
    /// Print a stock webmap.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match cli.command {
        Command::Generate => {
            let project = project::load_project(&cli.project)?;
            let export_config = config::load_config(&cli.config)?;
            std::fs::create_dir_all(&cli.output)?;

            let composed = compose::compose(&project, &export_config, &cli.output)?;
            let script_path = cli.output.join(SCRIPT_FILE);
            std::fs::write(&script_path, &composed.script)?;
            std::fs::write(
                cli.output.join(INCLUDES_FILE),
                composed.data_includes.concat(),
            )?;
            info!("wrote {}", script_path.display());
            output::print_export_output(&composed, &script_path);
        }
        Command::Check => {
            println!("==> Checking {}", cli.project.display());
            let project = project::load_project(&cli.project)?;
            config::load_config(&cli.config)?;
            let config_file = cli.config.join(config::CONFIG_FILE);
            let config_file = config_file.exists().then_some(config_file.as_path());
            output::print_check_output(&project, config_file);
            println!("==> Project is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn setup_logging(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
