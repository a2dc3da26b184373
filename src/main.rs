//! Command-line interface for wsdl-types

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use wsdl_types::exports::GraphDump;
#[cfg(feature = "cli")]
use wsdl_types::{
    Error, Member, ResolutionMode, ResolvedGraph, ResolverOptions, SchemaRegistry, TypeNode,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "wsdl-types")]
#[command(author, version, about = "Resolve WSDL and XML Schema type graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Load schema documents, resolve every reference and summarize the graph
    Inspect {
        /// WSDL or XSD files
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Downgrade malformed compositors to warnings
        #[arg(long)]
        lax: bool,

        /// Output the resolved graph as JSON
        #[arg(short, long)]
        json: bool,

        /// Show the member sequence of one group (local or `{ns}local` name)
        #[arg(short, long, value_name = "NAME")]
        group: Option<String>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect {
            files,
            lax,
            json,
            group,
        } => cmd_inspect(files, lax, json, group),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn cmd_inspect(
    files: Vec<PathBuf>,
    lax: bool,
    json_output: bool,
    group: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode = if lax {
        ResolutionMode::Lax
    } else {
        ResolutionMode::Strict
    };
    let mut registry = SchemaRegistry::new(ResolverOptions::new().with_mode(mode));
    for file in &files {
        registry.load_file(file)?;
    }

    let graph = match registry.resolve_all() {
        Ok(graph) => graph,
        Err(Error::Resolution(diagnostics)) => {
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic);
            }
            return Err(format!("{} error(s), no graph produced", diagnostics.error_count()).into());
        }
        Err(e) => return Err(e.into()),
    };

    for warning in graph.diagnostics() {
        eprintln!("{}", warning);
    }

    if let Some(name) = group {
        return print_group(&graph, &name, json_output);
    }

    let dump = GraphDump::from_graph(&graph);
    if json_output {
        println!("{}", dump.to_json(true)?);
    } else {
        print_summary(&dump);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn print_summary(dump: &GraphDump) {
    println!("wsdl-types v{}", wsdl_types::VERSION);
    println!();
    println!("Namespaces:");
    for namespace in &dump.namespaces {
        println!("  {}", namespace.as_deref().unwrap_or("(none)"));
    }
    println!();
    println!("Statistics:");
    println!("  Groups: {}", dump.groups.len());
    println!("  Elements: {}", dump.elements.len());
    println!("  Complex Types: {}", dump.complex_types.len());
    println!("  Simple Types: {}", dump.simple_types.len());
    println!("  Warnings: {}", dump.warnings.len());

    if !dump.groups.is_empty() {
        println!("\n=== Model Groups ===");
        for group in &dump.groups {
            let recursive = if group.recursive { " (recursive)" } else { "" };
            println!(
                "  {} [{}, {} members]{}",
                group.qualified_name,
                group.compositor,
                group.members.len(),
                recursive
            );
        }
    }
}

#[cfg(feature = "cli")]
fn print_group(
    graph: &ResolvedGraph,
    name: &str,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let found = graph.groups().find(|(_, g)| {
        g.qualified_name
            .as_ref()
            .is_some_and(|q| q.local_name == name || q.to_string() == name)
    });
    let Some((_, group)) = found else {
        return Err(format!("Group '{}' not found", name).into());
    };

    let dump = GraphDump::from_graph(graph);
    let local = group.name.as_deref().unwrap_or(name);
    if json_output {
        if let Some(entry) = dump.group(local) {
            println!("{}", serde_json::to_string_pretty(entry)?);
        }
        return Ok(());
    }

    println!("Group: {}", group.wsdl_name().unwrap_or_default());
    println!("  Compositor: {}", group.compositor);
    for member in graph.members(group) {
        println!("  {}", describe(graph, &member));
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn describe(graph: &ResolvedGraph, member: &Member<'_>) -> String {
    let label = match member.node {
        TypeNode::Element(element) => {
            let type_name = element
                .type_ref
                .and_then(|t| graph.node(t))
                .and_then(TypeNode::qualified_name)
                .map(|q| q.to_string())
                .unwrap_or_else(|| "(anonymous)".to_string());
            format!("element {} : {}", element.qualified_name, type_name)
        }
        TypeNode::Group(group) => match group.wsdl_name() {
            Some(name) => format!("group {}", name),
            None => format!("{} ({} members)", group.compositor, group.len()),
        },
        TypeNode::Any(any) => format!("any {}", any.namespace),
        other => other.kind_name().to_string(),
    };
    format!("{} {}", label, member.occurs)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
