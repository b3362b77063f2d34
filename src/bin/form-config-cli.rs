use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use form_config::cache::source::write_snapshot;
use form_config::cache::ConfigEvents;
use form_config::editor::ConfigEditor;
use form_config::form::{normalize, ConfigDocument, DefaultRegistry, FormName};
use form_config::store::{ConfigStore, HttpConfigStore};

#[derive(Parser)]
#[command(name = "form-config-cli")]
#[command(about = "Management CLI for the form configuration service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored document of a form
    Get { form: String },
    /// Print every stored document
    List,
    /// Replace a form's document with the contents of a JSON file
    Put { form: String, file: PathBuf },
    /// Print the effective field list of a built-in form
    Resolved { form: String },
    /// Move one field of a built-in form and save the new order
    Move {
        form: String,
        field: String,
        direction: Direction,
    },
    /// Write every stored document to a static snapshot file
    Export { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Up,
    Down,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let store = HttpConfigStore::new(&cli.url)?;

    match cli.command {
        Commands::Get { form } => {
            let form = FormName::new(form)?;
            match store.get(&form).await? {
                Some(document) => print_json(&document)?,
                None => eprintln!("No configuration stored for {form}"),
            }
        }
        Commands::List => print_json(&store.list().await?)?,
        Commands::Put { form, file } => {
            let form = FormName::new(form)?;
            let raw = tokio::fs::read(&file).await?;
            let document = ConfigDocument::parse(serde_json::from_slice(&raw)?)?;
            print_json(&store.put(&form, document).await?)?;
        }
        Commands::Resolved { form } => {
            let form = FormName::new(form)?;
            print_json(&store.resolved(&form).await?)?;
        }
        Commands::Move {
            form,
            field,
            direction,
        } => move_field(store, FormName::new(form)?, &field, direction).await?,
        Commands::Export { file } => {
            let documents = store.list().await?;
            write_snapshot(&file, &documents).await?;
            eprintln!("Wrote {} forms to {}", documents.len(), file.display());
        }
    }

    Ok(())
}

async fn move_field(
    store: HttpConfigStore,
    form: FormName,
    field: &str,
    direction: Direction,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = DefaultRegistry::builtin()?;
    let defaults = registry
        .get(&form)
        .ok_or_else(|| format!("No default fields registered for {form}"))?;

    let config = store
        .get(&form)
        .await?
        .and_then(|document| normalize(&form, &document));

    let mut editor = ConfigEditor::new(Arc::new(store), ConfigEvents::default());
    editor.open(defaults, config.as_ref())?;

    let index = editor
        .entries()
        .and_then(|entries| entries.iter().position(|e| e.name == field))
        .ok_or_else(|| format!("{form} has no field '{field}'"))?;
    match direction {
        Direction::Up => editor.move_up(index)?,
        Direction::Down => editor.move_down(index)?,
    }

    if let Some(entries) = editor.entries() {
        for entry in entries {
            println!("{:>3}  {}", entry.order, entry.name);
        }
    }
    let stored = editor.save().await?;
    eprintln!("Saved {} (id {})", stored.form_name, stored.id);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
