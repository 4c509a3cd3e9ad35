//! imt-query: run one lookup against the backend and print the result.
//!
//! Usage: `imt-query [--config <path>] <kind> [lookup.json]`
//!
//! `kind` is one of `keywords`, `stopwords`, `equivalences`, `raw-corpus`,
//! `logical-corpus`, `topic-models`, `domain-models`, `topics:<model>`, or
//! `documents:<task>` (the sample of a domain-model sampling task).
//! The lookup is read from the file, or from stdin when no file is given.

use imt_client::{
    ApiClient, ApiClientError, ClientConfig, ConfigError, Resource, ResourceClient,
};
use imt_core::{DocumentFilter, Lookup, ResourceId};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiClientError),
    #[error("Invalid lookup JSON: {0}")]
    Lookup(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

struct Args {
    kind: String,
    input: Option<PathBuf>,
}

fn parse_args() -> Result<Args, CliError> {
    let mut positional = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            args.next();
            continue;
        }
        positional.push(arg);
    }
    let mut positional = positional.into_iter();
    let kind = positional
        .next()
        .ok_or_else(|| CliError::Usage("usage: imt-query [--config <path>] <kind> [lookup.json]".to_string()))?;
    Ok(Args {
        kind,
        input: positional.next().map(PathBuf::from),
    })
}

fn read_input(input: Option<&PathBuf>) -> Result<String, CliError> {
    match input {
        Some(path) if path.as_os_str() != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

async fn run<R: Resource>(client: ResourceClient<R>, text: &str) -> Result<String, CliError>
where
    R::Item: Serialize,
{
    let lookup: Lookup<R::Filter> = if text.trim().is_empty() {
        client.lookup()
    } else {
        serde_json::from_str(text)?
    };
    let result = client.query(&lookup).await?;
    Ok(serde_json::to_string_pretty(&result)?)
}

async fn documents(api: &ApiClient, task: &str, text: &str) -> Result<String, CliError> {
    let task: ResourceId = task
        .parse()
        .map_err(|_| CliError::Usage(format!("invalid task id: {}", task)))?;
    let lookup: Lookup<DocumentFilter> = if text.trim().is_empty() {
        Lookup::new(DocumentFilter::default()).with_page(0, api.defaults().default_page_size)
    } else {
        serde_json::from_str(text)?
    };
    let result = api.tasks().query_documents(task, &lookup).await?;
    Ok(serde_json::to_string_pretty(&result)?)
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let config = ClientConfig::load()?;
    imt_client::logging::init(&config.log)?;

    let args = parse_args()?;
    let text = read_input(args.input.as_ref())?;
    let api = ApiClient::new(&config)?;

    let output = match args.kind.as_str() {
        "keywords" => run(api.keywords(), &text).await?,
        "stopwords" => run(api.stopwords(), &text).await?,
        "equivalences" => run(api.equivalences(), &text).await?,
        "raw-corpus" => run(api.raw_corpora(), &text).await?,
        "logical-corpus" => run(api.logical_corpora(), &text).await?,
        "topic-models" => run(api.topic_models(), &text).await?,
        "domain-models" => run(api.domain_models(), &text).await?,
        other => {
            if let Some(model) = other.strip_prefix("topics:") {
                run(api.topics(model)?, &text).await?
            } else if let Some(task) = other.strip_prefix("documents:") {
                documents(&api, task, &text).await?
            } else {
                return Err(CliError::Usage(format!("unknown resource kind: {}", other)));
            }
        }
    };
    println!("{}", output);
    Ok(())
}
