//! dvbi-catalogue - inspect DVB-I service lists from the command line

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{info, warn};

use dvbi_catalogue::availability::now_seconds;
use dvbi_catalogue::config::ClientConfig;
use dvbi_catalogue::download::load_document;
use dvbi_catalogue::labels::language_name;
use dvbi_catalogue::provider::{parse_provider_directory, ProviderOffering, ServiceListOffering};
use dvbi_catalogue::query::{QueryValue, ServiceListQuery};
use dvbi_catalogue::text::pick;
use dvbi_catalogue::writer::{write_provider_directory, write_service_list, ServiceListInfo};
use dvbi_catalogue::{parse_service_list, CatalogueError, ChannelMap, ResolveOptions, Result};

#[derive(Debug, Parser)]
#[clap(name = "dvbi-catalogue")]
#[clap(about = "Inspect DVB-I service lists", long_about = None)]
#[clap(version)]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Persist the given options as new defaults
    #[clap(long, global = true)]
    save_config: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the services of a service list
    Services {
        /// URL or file; defaults to the configured service list
        source: Option<String>,

        /// Narrow to a region and use its channel numbers
        #[clap(short, long)]
        region: Option<String>,

        /// Find the region by postcode when no region is given
        #[clap(short, long)]
        postcode: Option<String>,

        /// Supported DRM system id, repeatable
        #[clap(long = "drm", value_name = "SYSTEM_ID")]
        drm: Vec<String>,

        /// JSON file of tunable broadcast channels
        #[clap(long, value_name = "FILE")]
        channel_map: Option<PathBuf>,

        /// Preferred language for titles
        #[clap(short, long)]
        lang: Option<String>,

        /// Print the whole catalogue as JSON
        #[clap(long)]
        json: bool,
    },
    /// List providers and their service lists from a provider directory
    Providers {
        source: String,

        #[clap(long)]
        json: bool,
    },
    /// Publish a channel map as a service list
    Generate {
        /// JSON file of channels to publish
        channel_map: PathBuf,

        /// Name of the generated list
        #[clap(long, default_value = "Channels")]
        name: String,

        #[clap(long, default_value = "localhost")]
        provider: String,

        /// Prefix for relative channel sources
        #[clap(long, default_value = "http://localhost")]
        base_url: String,
    },
    /// Publish a provider directory offering one service list
    Directory {
        /// Where the service list is served
        list_url: String,

        #[clap(long, default_value = "Channels")]
        name: String,

        #[clap(long, default_value = "localhost")]
        provider: String,

        /// Target country, repeatable
        #[clap(long)]
        country: Vec<String>,
    },
    /// Build a discovery query URL
    Query {
        base_url: String,

        #[clap(long)]
        provider: Vec<String>,

        #[clap(long)]
        language: Vec<String>,

        #[clap(long)]
        genre: Vec<String>,

        #[clap(long)]
        country: Vec<String>,

        /// Only regulator-endorsed lists
        #[clap(long)]
        regulator: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::load();

    match cli.command {
        Commands::Services {
            source,
            region,
            postcode,
            drm,
            channel_map,
            lang,
            json,
        } => {
            if let Some(source) = source {
                config.service_list_url = source;
            }
            if let Some(region) = region {
                config.region_id = region;
            }
            if let Some(postcode) = postcode {
                config.postcode = postcode;
            }
            if !drm.is_empty() {
                config.supported_drm = drm;
            }
            if let Some(lang) = lang {
                config.preferred_lang = lang;
            }
            if cli.save_config {
                config.save()?;
            }
            list_services(&config, channel_map, json)
        }
        Commands::Providers { source, json } => {
            if cli.save_config {
                config.save()?;
            }
            let xml = load_document(&source, &config.download_config())?;
            let providers = parse_provider_directory(&xml)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&providers)?);
                return Ok(());
            }
            for provider in &providers {
                println!("{}", provider.name.as_deref().unwrap_or("(unnamed provider)"));
                for list in &provider.service_lists {
                    println!("  {}  {}", list.name, list.url);
                }
            }
            Ok(())
        }
        Commands::Generate {
            channel_map,
            name,
            provider,
            base_url,
        } => {
            let channels = ChannelMap::load(&channel_map)?;
            let info = ServiceListInfo {
                name,
                provider,
                base_url,
            };
            print!("{}", write_service_list(&info, &channels));
            Ok(())
        }
        Commands::Directory {
            list_url,
            name,
            provider,
            country,
        } => {
            let providers = vec![ProviderOffering {
                name: Some(provider),
                service_lists: vec![ServiceListOffering {
                    name,
                    url: list_url,
                    target_countries: country,
                }],
            }];
            print!("{}", write_provider_directory(&providers));
            Ok(())
        }
        Commands::Query {
            base_url,
            provider,
            language,
            genre,
            country,
            regulator,
        } => {
            let query = ServiceListQuery {
                provider_name: query_value(provider),
                language: query_value(language),
                genre: query_value(genre),
                target_country: query_value(country),
                regulator_list: regulator,
            };
            println!("{}", query.build(&base_url));
            Ok(())
        }
    }
}

fn query_value(mut values: Vec<String>) -> Option<QueryValue> {
    match values.len() {
        0 => None,
        1 => values.pop().map(QueryValue::One),
        _ => Some(QueryValue::Many(values)),
    }
}

fn list_services(config: &ClientConfig, channel_map: Option<PathBuf>, json: bool) -> Result<()> {
    if config.service_list_url.is_empty() {
        return Err(CatalogueError::Download(
            "no service list given and none configured".to_string(),
        ));
    }

    let xml = load_document(&config.service_list_url, &config.download_config())?;
    let channel_map = channel_map.map(|path| ChannelMap::load(&path)).transpose()?;
    let options = ResolveOptions {
        channel_map: channel_map.as_ref(),
        supported_drm: if config.supported_drm.is_empty() {
            None
        } else {
            Some(config.supported_drm.as_slice())
        },
    };

    let mut catalogue = parse_service_list(&xml, &options)?;

    let region_id = if !config.region_id.is_empty() {
        Some(config.region_id.clone())
    } else if !config.postcode.is_empty() {
        match catalogue.find_region_by_postcode(&config.postcode) {
            Some(region) => {
                info!("Postcode {} is in region {}", config.postcode, region.region_id);
                Some(region.region_id.clone())
            }
            None => {
                warn!("No region matches postcode {}", config.postcode);
                None
            }
        }
    } else {
        None
    };
    if let Some(region_id) = region_id {
        catalogue.select_region(&region_id)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&catalogue)?);
        return Ok(());
    }

    let lang = config.preferred_lang.as_str();
    if let Some(name) = pick(&catalogue.names, lang) {
        println!("{} ({})", name, language_name(lang).unwrap_or(lang));
    }

    let now = now_seconds();
    let mut services: Vec<_> = catalogue.services.iter().collect();
    services.sort_by_key(|s| s.lcn);
    for service in services {
        let marker = if service.available_instances(now).is_empty() { " (unavailable)" } else { "" };
        println!(
            "{:>4}  {} [{}]{}",
            service.lcn,
            service.title_for(lang),
            service.source_types,
            marker
        );
    }
    Ok(())
}
