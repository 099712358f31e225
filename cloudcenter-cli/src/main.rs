mod state_file;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use cloudcenter_core::provider::{Provider, ResourceType};
use cloudcenter_core::resource::{Resource, State, Value};
use cloudcenter_core::schema::ResourceSchema;
use cloudcenter_provider::resources::resource_types;
use cloudcenter_provider::{CloudCenterProvider, ProviderConfig};

use state_file::{StateFile, load_attributes};

#[derive(Parser)]
#[command(name = "cloudcenter")]
#[command(about = "Manage CloudCenter resources from JSON attribute files", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: Connection,

    #[command(subcommand)]
    command: Commands,
}

/// Connection parameters; unset values come from CLOUDCENTER_USERNAME,
/// CLOUDCENTER_PASSWORD and CLOUDCENTER_URL
#[derive(Args, Default)]
struct Connection {
    #[arg(long, global = true)]
    username: Option<String>,

    #[arg(long, global = true)]
    password: Option<String>,

    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List resource types, or show the schema of one
    Resources {
        /// Resource type (e.g. cloudcenter_group)
        resource_type: Option<String>,
    },
    /// Validate an attribute file against a resource schema
    Validate {
        resource_type: String,
        /// Path to JSON attribute file
        file: PathBuf,
    },
    /// Create a resource and record its state
    Create {
        resource_type: String,
        /// Local name of the resource
        name: String,
        /// Path to JSON attribute file
        file: PathBuf,
        /// Where to write the state (default: <name>.state.json)
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Refresh a state file from CloudCenter
    Read {
        /// Path to state file
        state: PathBuf,
    },
    /// Update a resource to match an attribute file
    Update {
        /// Path to state file
        state: PathBuf,
        /// Path to JSON attribute file
        file: PathBuf,
    },
    /// Delete a resource and remove its state file
    Delete {
        /// Path to state file
        state: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resources { resource_type } => run_resources(resource_type.as_deref()),
        Commands::Validate {
            resource_type,
            file,
        } => run_validate(&resource_type, &file),
        Commands::Create {
            resource_type,
            name,
            file,
            state,
        } => {
            let state = state.unwrap_or_else(|| PathBuf::from(format!("{}.state.json", name)));
            run_create(&cli.connection, &resource_type, &name, &file, &state).await
        }
        Commands::Read { state } => run_read(&cli.connection, &state).await,
        Commands::Update { state, file } => run_update(&cli.connection, &state, &file).await,
        Commands::Delete { state } => run_delete(&cli.connection, &state).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn get_schemas() -> HashMap<String, ResourceSchema> {
    resource_types()
        .iter()
        .map(|t| (t.name().to_string(), t.schema()))
        .collect()
}

fn get_schema(resource_type: &str) -> Result<ResourceSchema, String> {
    get_schemas()
        .remove(resource_type)
        .ok_or_else(|| format!("Unknown resource type: {}", resource_type))
}

fn get_provider(connection: &Connection) -> Result<CloudCenterProvider, String> {
    let mut attrs = HashMap::new();
    let explicit = [
        ("username", &connection.username),
        ("password", &connection.password),
        ("base_url", &connection.base_url),
    ];
    for (key, value) in explicit {
        if let Some(v) = value {
            attrs.insert(key.to_string(), Value::String(v.clone()));
        }
    }

    let config = ProviderConfig::from_attributes(&attrs).map_err(|e| e.to_string())?;
    CloudCenterProvider::new(&config).map_err(|e| e.to_string())
}

fn run_resources(resource_type: Option<&str>) -> Result<(), String> {
    let Some(resource_type) = resource_type else {
        let mut types: Vec<Box<dyn ResourceType>> = resource_types();
        types.sort_by_key(|t| t.name());
        for t in types {
            println!("{}", t.name());
        }
        return Ok(());
    };

    let schema = get_schema(resource_type)?;
    println!("{}", schema.resource_type.cyan().bold());
    if let Some(description) = &schema.description {
        println!("  {}", description);
    }
    println!();
    for attr in schema.sorted_attributes() {
        let mut line = format!("  {} ({}, {})", attr.name, attr.attr_type, attr.mode());
        if attr.sensitive {
            line.push_str(", sensitive");
        }
        if let Some(description) = &attr.description {
            line.push_str(&format!(" - {}", description));
        }
        println!("{}", line);
    }
    Ok(())
}

fn run_validate(resource_type: &str, file: &Path) -> Result<(), String> {
    let schema = get_schema(resource_type)?;
    let attrs = load_attributes(file)?;

    println!("{}", "Validating...".cyan());
    validate_attributes(&schema, &attrs)?;
    println!("{}", format!("✓ {} is valid", file.display()).green());
    Ok(())
}

fn validate_attributes(schema: &ResourceSchema, attrs: &HashMap<String, Value>) -> Result<(), String> {
    schema.validate(attrs).map_err(|errors| {
        let lines: Vec<String> = errors
            .iter()
            .map(|e| format!("{}: {}", schema.resource_type, e))
            .collect();
        lines.join("\n")
    })
}

async fn run_create(
    connection: &Connection,
    resource_type: &str,
    name: &str,
    file: &Path,
    state_path: &Path,
) -> Result<(), String> {
    let schema = get_schema(resource_type)?;
    let mut resource = Resource::new(resource_type, name);
    resource.attributes = load_attributes(file)?;
    validate_attributes(&schema, &resource.attributes)?;

    let provider = get_provider(connection)?;
    let state = provider.create(&resource).await.map_err(|e| e.to_string())?;

    StateFile::from_state(&state).save(state_path)?;
    println!("  {} create {}", "✓".green(), state.id);
    print_state(&schema, &state);
    Ok(())
}

async fn run_read(connection: &Connection, state_path: &Path) -> Result<(), String> {
    let current = StateFile::load(state_path)?.to_state();
    let schema = get_schema(&current.id.resource_type)?;

    let provider = get_provider(connection)?;
    let state = provider.read(&current).await.map_err(|e| e.to_string())?;

    if !state.exists {
        println!("{}", format!("{} does not exist", state.id).yellow());
        return Ok(());
    }
    StateFile::from_state(&state).save(state_path)?;
    print_state(&schema, &state);
    Ok(())
}

async fn run_update(connection: &Connection, state_path: &Path, file: &Path) -> Result<(), String> {
    let current = StateFile::load(state_path)?.to_state();
    let schema = get_schema(&current.id.resource_type)?;

    let mut desired = Resource::new(&current.id.resource_type, &current.id.name);
    desired.attributes = load_attributes(file)?;
    validate_attributes(&schema, &desired.attributes)?;

    let provider = get_provider(connection)?;
    let state = provider
        .update(&current, &desired)
        .await
        .map_err(|e| e.to_string())?;

    StateFile::from_state(&state).save(state_path)?;
    println!("  {} update {}", "✓".green(), state.id);
    print_state(&schema, &state);
    Ok(())
}

async fn run_delete(connection: &Connection, state_path: &Path) -> Result<(), String> {
    let current = StateFile::load(state_path)?.to_state();

    let provider = get_provider(connection)?;
    provider.delete(&current).await.map_err(|e| e.to_string())?;

    fs::remove_file(state_path)
        .map_err(|e| format!("Failed to remove {}: {}", state_path.display(), e))?;
    println!("  {} delete {}", "✓".green(), current.id);
    Ok(())
}

fn print_state(schema: &ResourceSchema, state: &State) {
    println!("{}", state.id.to_string().cyan().bold());
    if let Some(identifier) = &state.identifier {
        println!("  identifier: {}", identifier);
    }
    for (key, value) in display_attributes(schema, state) {
        println!("  {}: {}", key, value);
    }
}

/// Attributes sorted by name, with sensitive values redacted
fn display_attributes(schema: &ResourceSchema, state: &State) -> Vec<(String, String)> {
    let mut keys: Vec<&String> = state.attributes.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|key| {
            let shown = if schema.is_sensitive(key) {
                "(sensitive)".to_string()
            } else {
                format_value(&state.attributes[key])
            };
            (key.clone(), shown)
        })
        .collect()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::List(items) => {
            let strs: Vec<_> = items.iter().map(format_value).collect();
            format!("[{}]", strs.join(", "))
        }
        Value::Map(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let strs: Vec<_> = entries
                .into_iter()
                .map(|(k, v)| format!("{}: {}", k, format_value(v)))
                .collect();
            format!("{{{}}}", strs.join(", "))
        }
    }
}
