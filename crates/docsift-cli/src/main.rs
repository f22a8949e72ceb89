//! docsift command-line client
//!
//! Inspects, filters, sorts and pages JSON document collections, and builds
//! Mango query descriptors from compact condition arguments. Every
//! subcommand prints JSON to stdout.

mod args;
mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use docsift::{FieldType, FilterCondition, Limit, QueryCondition, SortKey, DEFAULT_LIMIT};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::commands::ViewRequest;

/// docsift command-line client
#[derive(Parser, Debug)]
#[command(name = "docsift")]
#[command(version, about = "Filter, sort and query JSON document collections")]
struct Cli {
    /// Print compact JSON instead of indented JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the fields found in a document collection
    Fields(FieldsArgs),

    /// Filter, sort and paginate a document collection
    View(ViewArgs),

    /// Build a Mango query descriptor
    Query(QueryArgs),
}

#[derive(Args, Debug)]
struct FieldsArgs {
    /// JSON file: an array of documents, a list-documents response or a query response
    file: PathBuf,

    /// Include internal fields such as `_id` and `_rev`
    #[arg(long)]
    all: bool,

    /// Show the inferred type of each field
    #[arg(long)]
    types: bool,
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// JSON file of documents
    file: PathBuf,

    /// Saved view (filters, logic, sort, page, pageSize) to start from
    #[arg(long, value_name = "VIEW.json")]
    view: Option<PathBuf>,

    /// Filter condition, FIELD:OPERATOR[:VALUE] (repeatable)
    #[arg(short, long = "filter", value_name = "SPEC", value_parser = args::parse_filter)]
    filters: Vec<FilterCondition>,

    /// Declared type for a field, FIELD=TYPE (repeatable)
    #[arg(short = 't', long = "type", value_name = "FIELD=TYPE", value_parser = args::parse_type)]
    types: Vec<(String, FieldType)>,

    /// Keep documents matching any filter instead of all of them
    #[arg(long)]
    any: bool,

    /// Sort key, FIELD[:asc|desc] (repeatable; earlier keys win)
    #[arg(short, long = "sort", value_name = "SPEC", value_parser = args::parse_sort)]
    sort: Vec<SortKey>,

    /// Page number, starting at 1
    #[arg(short, long)]
    page: Option<usize>,

    /// Documents per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Page size used when neither --page-size nor the view file sets one
    #[arg(long, env = "DOCSIFT_PAGE_SIZE", value_name = "N")]
    default_page_size: Option<usize>,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Condition, FIELD:$OPERATOR:VALUE (repeatable)
    #[arg(short = 'w', long = "where", value_name = "SPEC", value_parser = args::parse_where)]
    conditions: Vec<QueryCondition>,

    /// Comma-separated fields to return
    #[arg(long, value_name = "FIELDS")]
    fields: Option<String>,

    /// Sort field
    #[arg(long, value_name = "FIELD")]
    sort: Option<String>,

    /// Sort direction (asc or desc)
    #[arg(long, default_value = "asc")]
    direction: String,

    /// Maximum number of documents
    #[arg(long, default_value_t = DEFAULT_LIMIT, conflicts_with = "no_limit")]
    limit: u64,

    /// Ask for every matching document
    #[arg(long)]
    no_limit: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docsift=warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let output = execute(cli.command)?;
    let text = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{}", text);
    Ok(())
}

fn execute(command: Command) -> Result<Value> {
    match command {
        Command::Fields(args) => {
            let docs = commands::read_documents(&args.file)?;
            commands::fields(&docs, args.all, args.types)
        }
        Command::View(args) => {
            let docs = commands::read_documents(&args.file)?;
            let base = args.view.as_deref().map(commands::read_view).transpose()?;
            let request = ViewRequest {
                base,
                filters: args.filters,
                types: args.types.into_iter().collect(),
                any: args.any,
                sort: args.sort,
                page: args.page,
                page_size: args.page_size,
                default_page_size: args.default_page_size,
            };
            commands::view(&docs, request)
        }
        Command::Query(args) => {
            let fields = args
                .fields
                .as_deref()
                .map(crate::args::parse_field_list)
                .unwrap_or_default();
            let sort = args.sort.map(|field| (field, args.direction));
            let limit = if args.no_limit {
                Limit::Unbounded
            } else {
                Limit::Bounded(args.limit)
            };
            commands::query(&args.conditions, fields, sort, limit)
        }
    }
}
