//! article-digest: summarize, extract theses, draft a channel post or
//! translate an article from the command line.
//!
//! Usage:
//!   article-digest <operation> [--file <path>] [--resource <id>] [--backend <name>] [--config <path>]

use anyhow::{bail, Context};
use article_digest::{ArticleDigester, BackendId, Credentials, Operation, Settings};
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct Args {
    operation: Option<Operation>,
    file: Option<PathBuf>,
    resource: Option<String>,
    backend: Option<BackendId>,
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.is_empty() {
        print_usage();
        std::process::exit(1);
    }
    if matches!(raw[0].as_str(), "help" | "--help" | "-h") {
        print_usage();
        return;
    }
    if matches!(raw[0].as_str(), "version" | "--version" | "-V") {
        println!("article-digest {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    match run(&raw).await {
        Ok(content) => println!("{content}"),
        Err(e) => {
            match e.downcast_ref::<article_digest::Error>() {
                Some(err) => {
                    let category = err.category();
                    eprintln!("{} [{}]", category.label(), category.code());
                    eprintln!("{err}");
                }
                None => eprintln!("Error: {e:#}"),
            }
            std::process::exit(1);
        }
    }
}

async fn run(raw: &[String]) -> anyhow::Result<String> {
    let args = parse_args(raw)?;
    let Some(operation) = args.operation else {
        bail!("missing <operation>; expected one of: about, thesis, telegram, translate");
    };

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(backend) = args.backend {
        settings.backend = backend;
    }

    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("cannot read article text from stdin")?;
            buf
        }
    };
    let resource = args
        .resource
        .or_else(|| args.file.as_ref().map(|p| p.display().to_string()))
        .unwrap_or_else(|| "stdin".to_string());

    let digester = ArticleDigester::from_settings(&settings, &Credentials::resolve())?;
    let result = digester.digest(&resource, &text, operation).await;
    digester.shutdown();
    Ok(result?.content)
}

fn parse_args(raw: &[String]) -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--file" | "-f" => args.file = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--resource" | "-r" => args.resource = Some(value(&mut iter, arg)?.to_string()),
            "--backend" | "-b" => args.backend = Some(value(&mut iter, arg)?.parse()?),
            "--config" | "-c" => args.config = Some(PathBuf::from(value(&mut iter, arg)?)),
            flag if flag.starts_with('-') => bail!("unknown option: {flag}"),
            op if args.operation.is_none() => args.operation = Some(op.parse()?),
            extra => bail!("unexpected argument: {extra}"),
        }
    }
    Ok(args)
}

fn value<'a>(iter: &mut std::slice::Iter<'a, String>, flag: &str) -> anyhow::Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .with_context(|| format!("{flag} needs a value"))
}

fn print_usage() {
    println!(
        r#"article-digest: LLM article digests with retry and fallback

USAGE:
    article-digest <OPERATION> [OPTIONS]

OPERATIONS:
    about          Short summary of the article
    thesis         Key points as a list
    telegram       Channel post
    translate      Translation into Russian

OPTIONS:
    -f, --file <path>       Read the article from a file (default: stdin)
    -r, --resource <id>     Cache key for the article (default: file path)
    -b, --backend <name>    Primary backend: yandex or openrouter
    -c, --config <path>     YAML settings file

ENVIRONMENT:
    YANDEX_GPT_API_KEY, YANDEX_FOLDER_ID, OPENROUTER_API_KEY, APP_URL
    DIGEST_* overrides for settings, RUST_LOG for log filtering"#
    );
}
