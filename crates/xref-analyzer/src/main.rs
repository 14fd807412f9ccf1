use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use xref_analyzer::config::AnalyzerSettings;
use xref_analyzer::ide::lsp;
use xref_analyzer::ide::navigation::IdePosition;
use xref_analyzer::resolve::TypeHierarchyDirection;
use xref_analyzer::{ParsedAst, XrefProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Query {
    Definition,
    References,
    Implementations,
    TypeDefinition,
    Highlights,
    SymbolInfo,
    Links,
    TypeHierarchy,
    Supertypes,
    CallHierarchy,
    IncomingCalls,
    OutgoingCalls,
}

#[derive(Parser, Debug)]
#[command(name = "xref-analyzer", version, about)]
struct Args {
    /// Navigation query to run.
    #[arg(value_enum)]
    query: Query,

    /// Clang JSON AST dump of the main file (`clang -Xclang -ast-dump=json -fsyntax-only`).
    #[arg(long)]
    ast: PathBuf,

    /// Main source file the dump was produced from.
    #[arg(long)]
    main: PathBuf,

    /// Directory of JSON index shards.
    #[arg(long)]
    index: Vec<PathBuf>,

    /// Zero-based line.
    #[arg(long)]
    line: u32,

    /// Zero-based UTF-16 column.
    #[arg(long)]
    character: u32,

    /// Maximum references; `0` means unlimited.
    #[arg(long)]
    limit: Option<usize>,

    /// Subtype levels resolved by a type hierarchy query.
    #[arg(long)]
    depth: Option<u32>,

    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level or finer.
    #[arg(long, short)]
    verbose: bool,

    #[arg(long)]
    log_file: Option<String>,
}

fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("xref-analyzer.log")
}

fn init_logging(
    args: &Args,
    settings: &AnalyzerSettings,
) -> PathBuf {
    let directive = settings.logging.directive(args.verbose);
    let log_path = args
        .log_file
        .clone()
        .or_else(|| settings.logging.file.clone())
        .map(PathBuf::from)
        .unwrap_or_else(default_log_path);

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or(Path::new(".")),
        log_path.file_name().unwrap_or(OsStr::new("xref-analyzer.log")),
    );
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(false)
        .with_filter(EnvFilter::new(&directive));

    let stderr_layer = settings.logging.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(EnvFilter::new(&directive))
    });

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();
    log_path
}

fn load_settings(args: &Args) -> Result<AnalyzerSettings, String> {
    let mut settings = match &args.config {
        Some(path) => AnalyzerSettings::from_toml_file(path).map_err(|err| format!("{}: {err}", path.display()))?,
        None => AnalyzerSettings::default(),
    };
    if !args.index.is_empty() {
        settings.index.shard_dirs = args.index.iter().map(|dir| dir.display().to_string()).collect();
    }
    Ok(settings)
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn run_query(
    provider: &XrefProvider,
    ast: &ParsedAst,
    args: &Args,
) -> Value {
    let position = IdePosition::new(args.line, args.character);
    match args.query {
        Query::Definition => to_json(&lsp::located_symbols_to_lsp(&provider.locate(ast, position))),
        Query::References => {
            let settings = &provider.settings().references;
            let limit = args.limit.unwrap_or(settings.limit);
            let result = provider.references_with(ast, position, limit, settings.include_context);
            to_json(&lsp::references_to_lsp(&result))
        },
        Query::Implementations => to_json(&lsp::located_symbols_to_lsp(&provider.implementations(ast, position))),
        Query::TypeDefinition => to_json(&lsp::located_symbols_to_lsp(&provider.type_definition(ast, position))),
        Query::Highlights => {
            let highlights: Vec<_> = provider.highlights(ast, position).iter().map(lsp::highlight_to_lsp).collect();
            to_json(&highlights)
        },
        Query::SymbolInfo => to_json(&provider.symbol_info(ast, position)),
        Query::Links => {
            let links: Vec<_> = provider.document_links(ast).iter().map(lsp::document_link_to_lsp).collect();
            to_json(&links)
        },
        Query::TypeHierarchy => {
            let items = provider.type_hierarchy(ast, position, args.depth, TypeHierarchyDirection::Both);
            to_json(&items)
        },
        Query::Supertypes => {
            let items: Vec<_> = provider
                .type_hierarchy(ast, position, Some(0), TypeHierarchyDirection::Parents)
                .into_iter()
                .flat_map(|item| item.parents.unwrap_or_default())
                .filter_map(|parent| lsp::type_hierarchy_item_to_lsp(&parent))
                .collect();
            to_json(&items)
        },
        Query::CallHierarchy => {
            let items: Vec<_> = provider
                .prepare_call_hierarchy(ast, position)
                .iter()
                .filter_map(lsp::call_hierarchy_item_to_lsp)
                .collect();
            to_json(&items)
        },
        Query::IncomingCalls => {
            let calls: Vec<_> = provider
                .prepare_call_hierarchy(ast, position)
                .iter()
                .flat_map(|item| provider.incoming_calls(item))
                .filter_map(|call| lsp::incoming_call_to_lsp(&call))
                .collect();
            to_json(&calls)
        },
        Query::OutgoingCalls => {
            let calls: Vec<_> = provider
                .prepare_call_hierarchy(ast, position)
                .iter()
                .flat_map(|item| provider.outgoing_calls(item))
                .filter_map(|call| lsp::outgoing_call_to_lsp(&call))
                .collect();
            to_json(&calls)
        },
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("xref-analyzer: invalid config {err}");
            return ExitCode::FAILURE;
        },
    };
    let log_path = init_logging(&args, &settings);
    info!("Starting xref-analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!("Log file: {}", log_path.display());

    let provider = XrefProvider::with_configured_index(settings);
    let ast = match provider.load_ast_dump(&args.ast, &args.main) {
        Ok(ast) => ast,
        Err(err) => {
            error!("[index] failed to import {}: {err}", args.ast.display());
            return ExitCode::FAILURE;
        },
    };

    let output = run_query(&provider, &ast, &args);
    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        },
        Err(err) => {
            error!("failed to render {:?} result: {err}", args.query);
            ExitCode::FAILURE
        },
    }
}
