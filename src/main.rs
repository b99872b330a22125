//! ygo_lookup - command-line card lookups
//!
//! Every lookup goes through the response cache. By default the cache is
//! wiped on exit; pass `--keep-cache` to reuse it across runs.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use ygo_lookup::config::default_cache_dir;
use ygo_lookup::{
    CardClient, Filters, ImageSize, KeyOrder, LookupConfig, LookupError, LookupResult, Selector,
};

/// Yu-Gi-Oh! card lookups against YGOPRODeck with a local response cache
#[derive(Parser, Debug)]
#[command(name = "ygo_lookup")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Cache directory
    #[arg(long, global = true, default_value_os_t = default_cache_dir())]
    cache_dir: PathBuf,

    /// Keep cached responses after exit
    #[arg(long, global = true, default_value_t = false)]
    keep_cache: bool,

    /// Sort filters inside request keys so their order never matters
    #[arg(long, global = true, default_value_t = false)]
    sorted_keys: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up cards and print them as JSON
    Cards {
        #[command(flatten)]
        selector: SelectorArgs,

        /// Extra filter as field=value (repeatable), e.g. --filter "type=Effect Monster"
        #[arg(long = "filter", value_name = "FIELD=VALUE")]
        filters: Vec<String>,

        /// Only print these record fields (comma separated)
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
    },
    /// Print a random card
    Random {
        /// Only print these fields (comma separated)
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
    },
    /// Fetch a card image
    Image {
        #[command(flatten)]
        selector: SelectorArgs,

        /// Image size: normal, small or cropped
        #[arg(long, default_value = "normal")]
        size: String,

        /// Also save freshly fetched images into this directory as <name>.jpg
        #[arg(long)]
        save: Option<PathBuf>,

        /// Write the image bytes to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Remove every cached response
    ClearCache,
    /// Check that the card API is reachable
    Ping,
}

#[derive(Args, Debug)]
struct SelectorArgs {
    /// Exact card name
    #[arg(long, conflicts_with = "fname")]
    name: Option<String>,

    /// Partial card name
    #[arg(long)]
    fname: Option<String>,
}

impl SelectorArgs {
    fn selector(&self) -> Selector {
        match (&self.name, &self.fname) {
            (Some(name), _) => Selector::Name(name.clone()),
            (None, Some(fname)) => Selector::FName(fname.clone()),
            (None, None) => Selector::None,
        }
    }
}

fn main() {
    // Initialize logger. Set RUST_LOG environment variable to control log level.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> LookupResult<()> {
    let config = LookupConfig {
        cache_dir: cli.cache_dir,
        clear_on_close: !cli.keep_cache,
        key_order: if cli.sorted_keys {
            KeyOrder::Sorted
        } else {
            KeyOrder::Insertion
        },
        ..LookupConfig::default()
    };

    let client = CardClient::new(config)?;
    let result = run_command(&client, cli.command);
    // Close even when the command failed so a same-run cache never outlives the process
    let closed = client.close();
    result.and(closed)
}

fn run_command(client: &CardClient, command: Command) -> LookupResult<()> {
    match command {
        Command::Cards {
            selector,
            filters,
            fields,
        } => {
            let filters = parse_filters(&filters)?;
            let card_set = client.cards(&selector.selector(), &filters)?;
            let fields: Option<Vec<&str>> = fields
                .as_ref()
                .map(|f| f.iter().map(String::as_str).collect());
            let data = card_set.data(fields.as_deref());
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Random { fields } => {
            let fields: Option<Vec<&str>> = fields
                .as_ref()
                .map(|f| f.iter().map(String::as_str).collect());
            let card = client.random(fields.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        Command::Image {
            selector,
            size,
            save,
            out,
        } => {
            // Validate the size before any lookup happens
            let size: ImageSize = size.parse()?;
            let mut image = client.image(&selector.selector())?;
            if let Some(dir) = save {
                image = image.save_to(dir);
            }
            let bytes = image.fetch(size)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &bytes)?;
                    println!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => println!(
                    "Card {} ({}): {} bytes of {} image",
                    image.id(),
                    image.record().name,
                    bytes.len(),
                    size
                ),
            }
        }
        Command::ClearCache => {
            client.clear_cache()?;
            println!("Cleared {}", client.cache().root().display());
        }
        Command::Ping => {
            let base_url = client.builder().base_endpoint();
            client.fetcher().check_reachable(base_url)?;
            println!("{} is reachable", base_url);
        }
    }
    Ok(())
}

/// Parse `field=value` arguments, rejecting unknown field names
fn parse_filters(raw: &[String]) -> LookupResult<Filters> {
    let mut pairs = Vec::with_capacity(raw.len());
    for item in raw {
        let (field, value) = item
            .split_once('=')
            .ok_or_else(|| LookupError::InvalidParameter {
                field: "filter".to_string(),
                value: item.clone(),
            })?;
        pairs.push((field.trim(), value.trim()));
    }
    Filters::from_pairs(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filters() {
        let filters = parse_filters(&[
            "type=Effect Monster".to_string(),
            "level=1".to_string(),
        ])
        .unwrap();
        assert_eq!(filters.len(), 2);
    }

    #[test]
    fn test_parse_filters_rejects_unknown_and_malformed() {
        assert!(matches!(
            parse_filters(&["rarity=Secret".to_string()]),
            Err(LookupError::UnknownField(_))
        ));
        assert!(matches!(
            parse_filters(&["level".to_string()]),
            Err(LookupError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_cli_parses_image_command() {
        let cli = Cli::try_parse_from([
            "ygo_lookup",
            "--keep-cache",
            "image",
            "--name",
            "Kuriboh",
            "--size",
            "small",
        ])
        .unwrap();
        assert!(cli.keep_cache);
        match cli.command {
            Command::Image { selector, size, .. } => {
                assert_eq!(selector.selector(), Selector::Name("Kuriboh".into()));
                assert_eq!(size, "small");
            }
            other => panic!("Expected image command, got: {other:?}"),
        }
    }

    #[test]
    fn test_image_command_rejects_unknown_size_before_lookup() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let cache_dir = temp_dir.path().join("cache");
        let client = CardClient::new(LookupConfig::with_cache_dir(&cache_dir)).unwrap();
        let cli = Cli::try_parse_from([
            "ygo_lookup",
            "image",
            "--name",
            "Kuriboh",
            "--size",
            "huge",
        ])
        .unwrap();

        match run_command(&client, cli.command) {
            Err(LookupError::InvalidParameter { field, value }) => {
                assert_eq!(field, "size");
                assert_eq!(value, "huge");
            }
            other => panic!("Expected InvalidParameter, got: {other:?}"),
        }
        // No card lookup ran, so nothing was fetched or cached
        assert_eq!(std::fs::read_dir(&cache_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_cli_rejects_both_selectors() {
        assert!(Cli::try_parse_from([
            "ygo_lookup",
            "cards",
            "--name",
            "Kuriboh",
            "--fname",
            "kuri",
        ])
        .is_err());
    }
}
