// Tabular Data Engine - Main executable
// Author: Gabriel Demetrios Lafis

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use tabular_data_engine::{
    api::{AppState, Server},
    data::{load_dataset, FileFormat},
    processing::{
        AggregateOp, DatasetProcessor, FilterCondition, SampleMethod, SortCondition,
    },
    storage::MemoryStorage,
    utils::{init_logging, Config},
};

fn file_arg() -> Arg<'static> {
    Arg::new("file")
        .value_name("FILE")
        .help("CSV or JSON file to load")
        .required(true)
        .index(1)
}

fn cli() -> Command<'static> {
    Command::new("Tabular Data Engine")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gabriel Demetrios Lafis")
        .about("Type-aware querying of CSV and JSON tables")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true),
        )
        .subcommand(
            Command::new("stats")
                .about("Print dataset and per-field statistics")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("query")
                .about("Filter, sort, sample and clean rows, then export them")
                .arg(file_arg())
                .arg(
                    Arg::new("filter")
                        .short('f')
                        .long("filter")
                        .value_name("FIELD:OP[:VALUE[:VALUE2]]")
                        .help("Filter condition; repeat to combine")
                        .takes_value(true)
                        .multiple_occurrences(true),
                )
                .arg(
                    Arg::new("sort")
                        .short('s')
                        .long("sort")
                        .value_name("FIELD[:DIRECTION]")
                        .help("Sort key; repeat for tie-breakers")
                        .takes_value(true)
                        .multiple_occurrences(true),
                )
                .arg(
                    Arg::new("sample")
                        .long("sample")
                        .value_name("N")
                        .help("Keep at most N rows")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("sample-method")
                        .long("sample-method")
                        .value_name("METHOD")
                        .help("first, last or random")
                        .takes_value(true)
                        .default_value("first"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Seed for random sampling")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("clean")
                        .long("clean")
                        .help("Coerce every declared field to its type"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_name("FORMAT")
                        .help("csv or json")
                        .takes_value(true)
                        .default_value("csv"),
                ),
        )
        .subcommand(
            Command::new("aggregate")
                .about("Aggregate a value field per group")
                .arg(file_arg())
                .arg(
                    Arg::new("group")
                        .long("group")
                        .value_name("FIELD")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::new("value")
                        .long("value")
                        .value_name("FIELD")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::new("op")
                        .long("op")
                        .value_name("OP")
                        .help("sum, avg, count, min or max")
                        .takes_value(true)
                        .default_value("sum"),
                ),
        )
        .subcommand(
            Command::new("server")
                .about("Run the API server")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("Sets the server host")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("Sets the server port")
                        .takes_value(true),
                ),
        )
}

#[actix_web::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Load configuration
    let config = match matches.value_of("config") {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Error loading config file {}", path))?,
        None => Config::default(),
    };

    if let Err(err) = init_logging(config.log_level_filter()) {
        eprintln!("Error initializing logger: {}", err);
    }

    match matches.subcommand() {
        Some(("stats", args)) => run_stats(&config, args),
        Some(("query", args)) => run_query(&config, args),
        Some(("aggregate", args)) => run_aggregate(&config, args),
        Some(("server", args)) => run_server(config, args).await,
        _ => {
            println!("No subcommand specified. Use --help for usage information.");
            Ok(())
        }
    }
}

fn load(config: &Config, args: &ArgMatches) -> Result<DatasetProcessor> {
    let path = args.value_of("file").context("Missing input file")?;
    let dataset = load_dataset(path, &config.ingestion.ingest_options())
        .with_context(|| format!("Error loading {}", path))?;

    info!("Loaded {} rows from {}", dataset.len(), path);
    Ok(DatasetProcessor::new(dataset))
}

fn run_stats(config: &Config, args: &ArgMatches) -> Result<()> {
    let processor = load(config, args)?;

    let fields: Vec<_> = processor
        .schema()
        .fields
        .iter()
        .map(|field| {
            json!({
                "name": field.name,
                "type": field.field_type,
                "unique": processor.unique_values(&field.name).len(),
                "numeric": processor.numeric_stats(&field.name),
            })
        })
        .collect();

    let report = json!({
        "stats": processor.stats(),
        "fields": fields,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_query(config: &Config, args: &ArgMatches) -> Result<()> {
    let processor = load(config, args)?;

    let filters = args
        .values_of("filter")
        .map(|values| values.map(str::parse).collect::<Result<Vec<FilterCondition>, _>>())
        .transpose()?
        .unwrap_or_default();
    let sort = args
        .values_of("sort")
        .map(|values| values.map(str::parse).collect::<Result<Vec<SortCondition>, _>>())
        .transpose()?
        .unwrap_or_default();
    let format: FileFormat = args.value_of("format").unwrap_or("csv").parse()?;

    let mut rows = processor.filter(&filters);
    if !sort.is_empty() {
        rows = processor.sort(&rows, &sort);
    }

    if let Some(size) = args.value_of("sample") {
        let size: usize = size
            .parse()
            .with_context(|| format!("Invalid sample size: {}", size))?;
        let method: SampleMethod = args.value_of("sample-method").unwrap_or("first").parse()?;

        let view = DatasetProcessor::new(processor.dataset().derive(rows));
        rows = match args.value_of("seed") {
            Some(seed) => {
                let seed: u64 = seed
                    .parse()
                    .with_context(|| format!("Invalid seed: {}", seed))?;
                view.sample_with_rng(size, method, &mut StdRng::seed_from_u64(seed))
            }
            None => view.sample(size, method),
        };
    }

    if args.is_present("clean") {
        rows = processor.clean_rows(&rows);
    }

    debug!("Query produced {} rows", rows.len());
    println!("{}", processor.export(&rows, format)?);
    Ok(())
}

fn run_aggregate(config: &Config, args: &ArgMatches) -> Result<()> {
    let processor = load(config, args)?;

    let group = args.value_of("group").context("Missing --group")?;
    let value = args.value_of("value").context("Missing --value")?;
    let op: AggregateOp = args.value_of("op").unwrap_or("sum").parse()?;

    let result = processor.aggregate(group, value, op);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn run_server(config: Config, args: &ArgMatches) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(host) = args.value_of("host") {
        server_config.host = host.to_string();
    }
    if let Some(port) = args.value_of("port") {
        server_config.port = port
            .parse()
            .with_context(|| format!("Invalid port: {}", port))?;
    }

    let state = AppState::new(
        Arc::new(MemoryStorage::new()),
        config.ingestion.ingest_options(),
    );

    Server::new(state, server_config).run().await?;
    Ok(())
}
