use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use schema_editor::slot::time_label;
use schema_editor::*;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the LED controller
    #[arg(short, long, global = true, default_value = config::DEFAULT_BASE_URL)]
    device: String,

    /// Language of status messages (en, de)
    #[arg(short, long, global = true, default_value = "en")]
    lang: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a schema as a grid
    Show {
        /// Schema key, e.g. schema_01.csv
        key: String,
    },
    /// Write a schema's CSV to a file or stdout
    Export {
        key: String,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a CSV file as a schema
    Import {
        key: String,
        /// CSV file to upload
        file: PathBuf,
    },
    /// Set one value of a slot and save
    Set {
        key: String,
        /// Slot index (0-47)
        index: usize,
        /// Field (r, g, b, aux1, aux2, aux3)
        field: String,
        /// New value, clamped to 0-255
        value: String,
    },
    /// Set the color of a slot and save
    Color {
        key: String,
        /// Slot index (0-47)
        index: usize,
        /// Red value (0-255)
        red: u8,
        /// Green value (0-255)
        green: u8,
        /// Blue value (0-255)
        blue: u8,
    },
    /// Make the light run a schema
    Activate { key: String },
    /// Show the slot of a schema in effect right now
    Now { key: String },
    /// Print the demo schema as CSV
    Demo,
}

type Controller = ScheduleController<HttpStore, TextGrid, StatusBoard>;

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    // Initialize tracing with pretty colors
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| EnvFilter::new("schema_editor=info")),
        )
        .compact()
        .init();

    // Initialize color-eyre for pretty error reporting
    color_eyre::install()?;

    let cli = Cli::parse();
    debug!("Parsed command line arguments");

    let config = EditorConfig::default()
        .with_base_url(cli.device.as_str())
        .with_language(cli.lang.parse()?);
    let store = HttpStore::new(&config)?;

    match cli.command {
        Commands::Show { key } => {
            let key: SchemaKey = key.parse()?;
            let mut controller = controller(store.clone(), &config);
            controller.load(&key).await;
            print!("{}", controller.view());
            report(&controller);
        }
        Commands::Export { key, output } => {
            let key: SchemaKey = key.parse()?;
            let mut controller = controller(store.clone(), &config);
            if controller.load(&key).await == LoadOutcome::Demo {
                report(&controller);
                return Err(eyre!("schema {key} could not be loaded"));
            }
            let csv = controller.schedule().to_csv();
            match output {
                Some(path) => {
                    tokio::fs::write(&path, csv + "\n").await?;
                    info!("Wrote {} to {}", key, path.display());
                }
                None => println!("{csv}"),
            }
        }
        Commands::Import { key, file } => {
            let key: SchemaKey = key.parse()?;
            let text = tokio::fs::read_to_string(&file).await?;
            let schedule = Schedule::parse(&text);
            debug!("Uploading {} parsed from {}", key, file.display());
            store.store(&key, &schedule.to_csv()).await?;
            info!("Uploaded {} to {}", file.display(), key);
        }
        Commands::Set {
            key,
            index,
            field,
            value,
        } => {
            let key: SchemaKey = key.parse()?;
            let field = Field::from_name(&field).ok_or_else(|| eyre!("unknown field {field:?}"))?;
            let mut controller = loaded(store.clone(), &config, &key).await?;

            let stored = controller.update_value(index, field, &value)?;
            info!("{} {} = {}", time_label(index), field, stored);
            save(&mut controller, &key).await?;
        }
        Commands::Color {
            key,
            index,
            red,
            green,
            blue,
        } => {
            let key: SchemaKey = key.parse()?;
            let mut controller = loaded(store.clone(), &config, &key).await?;

            controller.open_color_modal(index)?;
            controller.set_preview(Field::Red, red);
            controller.set_preview(Field::Green, green);
            controller.set_preview(Field::Blue, blue);
            controller.apply_color_modal();
            info!("{} color = {}", time_label(index), Rgb::new(red, green, blue));
            save(&mut controller, &key).await?;
        }
        Commands::Activate { key } => {
            let key: SchemaKey = key.parse()?;
            store.activate(&key).await?;
            let message = Catalog::new(config.language)
                .translate("schema.activated", &[("file", key.as_str())]);
            println!("{message}");
        }
        Commands::Now { key } => {
            let key: SchemaKey = key.parse()?;
            let mut controller = controller(store.clone(), &config);
            controller.load(&key).await;
            report(&controller);

            let now = Local::now().time();
            let index = Schedule::slot_index_for(now);
            let row = GridRow::new(index, controller.schedule().slot_at(now));
            println!("{row}");
        }
        Commands::Demo => {
            println!("{}", Schedule::demo().to_csv());
        }
    }

    Ok(())
}

fn controller(store: HttpStore, config: &EditorConfig) -> Controller {
    ScheduleController::new(
        store,
        TextGrid::default(),
        StatusBoard::new(config.notice_timeout),
        Catalog::new(config.language),
    )
}

/// Loads a schema for editing, refusing to continue on demo data
#[instrument(skip(store, config))]
async fn loaded(store: HttpStore, config: &EditorConfig, key: &SchemaKey) -> Result<Controller> {
    let mut controller = controller(store, config);
    if controller.load(key).await == LoadOutcome::Demo {
        report(&controller);
        return Err(eyre!("schema {key} could not be loaded, not editing demo data"));
    }
    Ok(controller)
}

async fn save(controller: &mut Controller, key: &SchemaKey) -> Result<()> {
    let outcome = controller.save(key).await;
    report(controller);
    match outcome {
        SaveOutcome::Saved => Ok(()),
        SaveOutcome::Failed => Err(eyre!("saving {key} failed")),
    }
}

/// Prints the current status notice
fn report(controller: &Controller) {
    if let Some(notice) = controller.notifier().current(STATUS_ELEMENT) {
        eprintln!("{}", notice.message);
    }
}
