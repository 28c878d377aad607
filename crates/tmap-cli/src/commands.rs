use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use tmap_client::{ClientConfig, DirTmapStore, TmapClient};
use tmap_proto::{decode_str_value, encode_str_value, Operation, OperationLog};

use crate::cli::*;

const DEFAULT_CONFIG: &str = "tmap.toml";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let client = config.open_dir_client()?;
    let format = cli.format;
    match cli.command {
        Command::Create(args) => {
            let object = config.object(args.target.object.as_deref())?;
            client.create(object, args.header.as_bytes())?;
            println!("{} Created map {}", "✓".green().bold(), object.bold());
            Ok(())
        }
        Command::Set(args) => {
            let object = config.object(args.target.object.as_deref())?;
            if args.raw {
                client.set(object, &args.key, args.value.as_bytes())?;
            } else {
                client.set_str(object, &args.key, &args.value)?;
            }
            println!("{} {} = {}", "set".green(), args.key.yellow(), args.value);
            Ok(())
        }
        Command::Rm(args) => {
            let object = config.object(args.target.object.as_deref())?;
            client.remove(object, &args.key)?;
            println!("{} {}", "removed".green(), args.key.yellow());
            Ok(())
        }
        Command::SetHeader(args) => {
            let object = config.object(args.target.object.as_deref())?;
            client.set_header(object, args.header.as_bytes())?;
            println!("{} header of {}", "replaced".green(), object.bold());
            Ok(())
        }
        Command::Get(args) => cmd_get(&client, &config, args, format),
        Command::Dump(args) => cmd_dump(&client, &config, args, format),
        Command::Batch(args) => cmd_batch(&client, &config, args),
        Command::Objects => cmd_objects(&client, format),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => {
            ClientConfig::load(Path::new(DEFAULT_CONFIG))?
        }
        None => ClientConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.store_root = root.clone();
    }
    tracing::debug!(root = %config.store_root.display(), "configuration loaded");
    Ok(config)
}

fn cmd_get(
    client: &TmapClient<DirTmapStore>,
    config: &ClientConfig,
    args: GetArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let object = config.object(args.target.object.as_deref())?;
    if args.strict {
        let value = client
            .try_read_value(object, &args.key)?
            .map(|v| RenderedValue::of(&v))
            .with_context(|| format!("key {:?} not found in {object}", args.key))?;
        match format {
            OutputFormat::Text => println!("{value}"),
            OutputFormat::Json => println!(
                "{}",
                json!({
                    "key": args.key,
                    "encoding": value.encoding(),
                    "value": value.text(),
                })
            ),
        }
    } else {
        let value = client.read_key(object, &args.key);
        match format {
            OutputFormat::Text => println!("{value}"),
            OutputFormat::Json => println!(
                "{}",
                json!({ "key": args.key, "encoding": "str", "value": value })
            ),
        }
    }
    Ok(())
}

fn cmd_dump(
    client: &TmapClient<DirTmapStore>,
    config: &ClientConfig,
    args: ObjectArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let object = config.object(args.object.as_deref())?;
    let map = client.read_map(object)?;
    match format {
        OutputFormat::Text => {
            println!("{} {}", "object".bold(), object);
            let header = RenderedValue::of(map.header()).to_string();
            println!("{} {}", "header".bold(), header.cyan());
            println!("{} {}", "entries".bold(), map.len());
            for (key, value) in map.iter() {
                println!("  {} = {}", key.yellow(), RenderedValue::of(value));
            }
        }
        OutputFormat::Json => {
            let entries: serde_json::Map<String, serde_json::Value> = map
                .iter()
                .map(|(k, v)| (k.to_owned(), RenderedValue::of(v).to_json()))
                .collect();
            println!(
                "{}",
                json!({
                    "object": object,
                    "header": RenderedValue::of(map.header()).to_json(),
                    "entries": entries,
                })
            );
        }
    }
    Ok(())
}

fn cmd_batch(
    client: &TmapClient<DirTmapStore>,
    config: &ClientConfig,
    args: BatchArgs,
) -> anyhow::Result<()> {
    let object = config.object(args.target.object.as_deref())?;
    let ops = args
        .ops
        .iter()
        .map(|s| parse_batch_op(s))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let log: OperationLog = ops.iter().collect();
    client.update(object, &log)?;
    println!(
        "{} Applied {} operations to {}",
        "✓".green().bold(),
        log.len(),
        object.bold()
    );
    Ok(())
}

fn cmd_objects(client: &TmapClient<DirTmapStore>, format: OutputFormat) -> anyhow::Result<()> {
    let names = client.store().object_names()?;
    match format {
        OutputFormat::Text => {
            for name in &names {
                println!("{name}");
            }
        }
        OutputFormat::Json => println!("{}", json!(names)),
    }
    Ok(())
}

/// Parse one batch operation: `create:HEADER`, `header:HEADER`,
/// `set:KEY=VALUE`, or `rm:KEY`. Set values are string-encoded.
fn parse_batch_op(spec: &str) -> anyhow::Result<Operation> {
    let Some((kind, rest)) = spec.split_once(':') else {
        bail!("operation {spec:?} is missing a ':'");
    };
    let op = match kind {
        "create" => Operation::create(rest.as_bytes()),
        "header" => Operation::set_header(rest.as_bytes()),
        "rm" => Operation::remove(rest),
        "set" => {
            let (key, value) = rest
                .split_once('=')
                .with_context(|| format!("set operation {spec:?} needs KEY=VALUE"))?;
            Operation::set(key, encode_str_value(value))
        }
        other => bail!("unknown operation kind {other:?}"),
    };
    Ok(op)
}

/// A stored value prepared for display, tagged with how it was read.
#[derive(Debug, PartialEq, Eq)]
enum RenderedValue {
    /// A string-encoded value, decoded.
    Str(String),
    /// Raw bytes that happen to be UTF-8.
    Utf8(String),
    /// Anything else, as `0x`-prefixed hex.
    Hex(String),
}

impl RenderedValue {
    fn of(bytes: &[u8]) -> Self {
        if let Ok(s) = decode_str_value(bytes) {
            return Self::Str(s);
        }
        match std::str::from_utf8(bytes) {
            Ok(s) => Self::Utf8(s.to_owned()),
            Err(_) => Self::Hex(format!("0x{}", hex::encode(bytes))),
        }
    }

    fn encoding(&self) -> &'static str {
        match self {
            Self::Str(_) => "str",
            Self::Utf8(_) => "utf8",
            Self::Hex(_) => "hex",
        }
    }

    fn text(&self) -> &str {
        match self {
            Self::Str(s) | Self::Utf8(s) | Self::Hex(s) => s,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        json!({ "encoding": self.encoding(), "value": self.text() })
    }
}

/// Decoded strings print quoted, raw UTF-8 with a `raw:` tag, hex as is.
impl std::fmt::Display for RenderedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Utf8(s) => write!(f, "raw:{s:?}"),
            Self::Hex(h) => f.write_str(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_each_batch_kind() {
        assert_eq!(
            parse_batch_op("create:hdr").unwrap(),
            Operation::create(b"hdr".to_vec())
        );
        assert_eq!(
            parse_batch_op("header:").unwrap(),
            Operation::set_header(Vec::new())
        );
        assert_eq!(parse_batch_op("rm:key1").unwrap(), Operation::remove("key1"));
        assert_eq!(
            parse_batch_op("set:key1=a=b").unwrap(),
            Operation::set("key1", encode_str_value("a=b"))
        );
    }

    #[test]
    fn reject_malformed_batch_ops() {
        assert!(parse_batch_op("set").is_err());
        assert!(parse_batch_op("set:novalue").is_err());
        assert!(parse_batch_op("drop:key").is_err());
    }

    #[test]
    fn render_prefers_string_values() {
        let value = RenderedValue::of(&encode_str_value("val1"));
        assert_eq!(value, RenderedValue::Str("val1".into()));
        assert_eq!(value.to_string(), "\"val1\"");

        let value = RenderedValue::of(b"plain");
        assert_eq!(value.encoding(), "utf8");
        assert_eq!(value.to_string(), "raw:\"plain\"");

        let value = RenderedValue::of(&[0xff, 0x00]);
        assert_eq!(value.encoding(), "hex");
        assert_eq!(value.to_string(), "0xff00");
    }

    #[test]
    fn empty_string_encoding_is_marked_as_decoded() {
        let value = RenderedValue::of(&[0, 0, 0, 0]);
        assert_eq!(value, RenderedValue::Str(String::new()));
        assert_eq!(value.to_string(), "\"\"");
        assert_eq!(value.to_json(), json!({ "encoding": "str", "value": "" }));

        let value = RenderedValue::of(b"");
        assert_eq!(value, RenderedValue::Utf8(String::new()));
        assert_eq!(value.to_string(), "raw:\"\"");
    }
}
