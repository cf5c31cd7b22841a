use clap::Parser;
use minipack_core::{
    canonical_identifier, resolve_rules, BuildContext, BundlerConfig, DependencyGraphBuilder,
    DirStore, LoaderRegistry, RuntimeEmitter,
};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// minipack - a static module bundler for JavaScript
#[derive(Parser, Debug)]
#[command(name = "minipack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Entry module, relative to the project root (e.g. ./src/app.js)
    #[arg(value_name = "ENTRY")]
    entry: Option<String>,

    /// Path to minipack.json configuration file
    #[arg(short, long, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Project root that module identifiers resolve against
    #[arg(long, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Output directory for the bundle
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Output file name
    #[arg(long, value_name = "FILE")]
    out_file: Option<String>,

    /// Initialize a new minipack project
    #[arg(long)]
    init: bool,
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug for per-module and per-loader logs
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    if cli.init {
        init_project()?;
        return Ok(());
    }

    let config = load_config(&cli)?;

    let entry = cli.entry.clone().unwrap_or_else(|| config.entry.clone());
    let entry = canonical_identifier(&entry);

    let registry = LoaderRegistry::new();
    let rules = resolve_rules(&config.module.rules, &registry)?;
    debug!("resolved {} loader rule(s)", rules.len());

    let store = DirStore::new(&cli.root);
    info!("bundling {} from {}", entry, cli.root.display());

    let modules = DependencyGraphBuilder::new(BuildContext {
        entry: entry.clone(),
        rules: &rules,
        store: &store,
    })
    .build()?;
    info!("discovered {} module(s)", modules.len());

    let artifact = RuntimeEmitter::emit(&modules, &entry);

    let out_dir = cli
        .out_dir
        .unwrap_or_else(|| PathBuf::from(&config.output.path));
    let filename = cli
        .out_file
        .unwrap_or_else(|| config.output.filename.clone());
    std::fs::create_dir_all(&out_dir)?;
    let out_path = out_dir.join(filename);
    std::fs::write(&out_path, artifact)?;

    println!(
        "Bundled {} module(s) into {}",
        modules.len(),
        out_path.display()
    );

    Ok(())
}

/// Load configuration from --project, minipack.json in the current
/// directory, or defaults, in that order
fn load_config(cli: &Cli) -> anyhow::Result<BundlerConfig> {
    if let Some(ref project_path) = cli.project {
        let config = BundlerConfig::from_file(project_path)
            .map_err(|e| anyhow::anyhow!("failed to load {}: {}", project_path.display(), e))?;
        return Ok(config);
    }

    let default_path = cli.root.join("minipack.json");
    if default_path.exists() {
        let config = BundlerConfig::from_file(&default_path)
            .map_err(|e| anyhow::anyhow!("failed to load minipack.json: {}", e))?;
        return Ok(config);
    }

    Ok(BundlerConfig::default())
}

/// Scaffold a new project: configuration file plus a two-module sample
fn init_project() -> anyhow::Result<()> {
    println!("Initializing new minipack project...");

    BundlerConfig::init_file(std::path::Path::new("minipack.json"))?;
    println!("Created minipack.json");

    std::fs::create_dir_all("src/js")?;
    println!("Created src/ directory");

    let greeting = r#"module.exports = { text: "Hello from minipack" };
"#;
    std::fs::write("src/js/greeting.js", greeting)?;

    let app = r#"const greeting = require("./js/greeting.js");

console.log(greeting.text);
"#;
    std::fs::write("src/app.js", app)?;
    println!("Created src/app.js and src/js/greeting.js");

    println!("\nProject initialized successfully!");
    println!("Run 'minipack' to bundle it into ./dist/bundle.js.");

    Ok(())
}
