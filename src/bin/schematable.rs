use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "schematable", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a schema + data pair as an HTML table.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input schema JSON.
    #[arg(long)]
    schema: PathBuf,

    /// Input data JSON (defaults to an empty object).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output HTML path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Emit header and row action cells.
    #[arg(long)]
    show_actions: bool,

    /// Submission endpoint forwarded to the table templates.
    #[arg(long)]
    endpoint: Option<String>,

    /// Submission HTTP method forwarded to the table templates.
    #[arg(long)]
    method: Option<String>,

    /// Render a reusable row template (mode 2) instead of concrete rows.
    #[arg(long)]
    stamp: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).with_context(|| format!("parse {what} JSON '{}'", path.display()))
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let schema: schematable::SchemaNode = read_json(&args.schema, "schema")?;
    let data: serde_json::Value = match &args.data {
        Some(path) => read_json(path, "data")?,
        None => serde_json::Value::Object(serde_json::Map::new()),
    };

    let schema_dir = args.schema.parent().unwrap_or_else(|| Path::new("."));
    let resolver = if schema.definitions.is_some() {
        schematable::SchemaResolver::new().with_base_document(schema.clone())
    } else {
        schematable::SchemaResolver::new().with_base_path(schema_dir)
    };

    let options = schematable::TableOptions {
        schema_base_path: Some(schema_dir.to_path_buf()),
        show_actions: args.show_actions,
        endpoint: args.endpoint.clone(),
        method: args.method.clone(),
        ..schematable::TableOptions::default()
    };
    let mode = if args.stamp {
        schematable::RenderMode::Stamp
    } else {
        schematable::RenderMode::Data
    };
    let pack = schematable::HtmlPack::new().with_render_mode(mode);

    let mut engine = schematable::TableEngine::new(schema, data, options, pack)?;
    engine.prepare(&resolver).await?;
    let output = engine.build().await?;

    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(path, &output.html)
                .with_context(|| format!("write html '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{}", output.html),
    }
    Ok(())
}
