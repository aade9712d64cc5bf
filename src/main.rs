//! s3site CLI
//!
//! Entry point for the `s3site` command-line tool.

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use s3site::config::{
    parse_override_assignments, Mapping, SiteConfig, SiteConfigError, DEFAULT_SITE_FILE,
};
use s3site::distribution::{
    build_distribution_config_layers, resolve_endpoint, OverrideSource, RenderedDistribution,
};
use s3site::regions;
use s3site::ConfigSource;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "s3site")]
#[command(about = "Serve S3 static websites through CloudFront", version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SiteArgs {
    /// Path to site config file (default: s3site.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Bucket name (overrides the site file)
    #[arg(long)]
    bucket: Option<String>,

    /// Bucket region (overrides the site file)
    #[arg(long)]
    region: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the CloudFront distribution config
    Render {
        #[command(flatten)]
        site: SiteArgs,

        /// Override a setting, e.g. default_cache_behavior.min_TTL=987 (repeatable)
        #[arg(long = "set", value_name = "PATH=VALUE")]
        assignments: Vec<String>,

        /// Caller reference (default: timestamped per invocation)
        #[arg(long)]
        caller_reference: Option<String>,

        /// Output the rendered config with provenance as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the website endpoint CloudFront will use as origin
    Endpoint {
        #[command(flatten)]
        site: SiteArgs,
    },

    /// List known regions and their website endpoints
    Regions {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            site,
            assignments,
            caller_reference,
            json,
        } => {
            run_render(&site, &assignments, caller_reference, json);
        }
        Commands::Endpoint { site } => {
            run_endpoint(&site);
        }
        Commands::Regions { json } => {
            run_regions(json);
        }
    }
}

fn run_render(
    site_args: &SiteArgs,
    assignments: &[String],
    caller_reference: Option<String>,
    json_output: bool,
) {
    let (site, file_source) = match load_site(site_args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading site config: {}", e);
            process::exit(1);
        }
    };

    let cli_layer = match parse_override_assignments(assignments) {
        Ok(layer) => layer,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let from_cli = !cli_layer.is_empty() || caller_reference.is_some();

    // Layer order: caller reference, site file, CLI assignments
    let reference = caller_reference.unwrap_or_else(|| {
        format!(
            "s3site-{}-{}",
            site.bucket_name(),
            Utc::now().format("%Y%m%dT%H%M%SZ")
        )
    });
    let mut reference_layer = Mapping::new();
    reference_layer.insert("CallerReference", reference);

    let file_layer = site.overrides();
    let document =
        match build_distribution_config_layers(&site, [&reference_layer, &file_layer, &cli_layer]) {
            Ok(document) => document,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        };

    if json_output {
        let mut sources = vec![OverrideSource::builtin()];
        sources.extend(file_source);
        if from_cli {
            sources.push(OverrideSource::cli());
        }

        let rendered = RenderedDistribution::new(site.bucket_name(), &document, sources);
        match rendered.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", document);
    }
}

fn run_endpoint(site_args: &SiteArgs) {
    let (site, _) = match load_site(site_args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading site config: {}", e);
            process::exit(1);
        }
    };

    let bucket = site.bucket_name().trim();
    if bucket.is_empty() {
        eprintln!("Error: no bucket configured (set s3_bucket or pass --bucket)");
        process::exit(1);
    }

    println!("{}", resolve_endpoint(&site).hostname(bucket));
}

fn run_regions(json_output: bool) {
    let endpoints: Vec<_> = regions::endpoints().collect();

    if json_output {
        match serde_json::to_string_pretty(&endpoints) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        for endpoint in endpoints {
            println!("{:<16} {}", endpoint.region, endpoint.suffix);
        }
    }
}

/// Load the site file and apply --bucket/--region.
///
/// Without --config the default file is optional when --bucket is given.
fn load_site(args: &SiteArgs) -> Result<(SiteConfig, Option<OverrideSource>), SiteConfigError> {
    let default_path = Path::new(DEFAULT_SITE_FILE);
    let path = match &args.config {
        Some(path) => Some(path.as_path()),
        None if default_path.exists() => Some(default_path),
        None if args.bucket.is_some() => None,
        None => return Err(SiteConfigError::NotFound(default_path.to_path_buf())),
    };

    let (mut site, source) = match path {
        Some(path) => {
            let loaded = SiteConfig::load(path)?;
            let source = OverrideSource::file(loaded.path.display().to_string(), loaded.digest);
            (loaded.config, Some(source))
        }
        None => (SiteConfig::default(), None),
    };

    if let Some(bucket) = &args.bucket {
        site.s3_bucket = Some(bucket.clone());
    }
    if let Some(region) = &args.region {
        site.s3_endpoint = Some(region.clone());
    }
    Ok((site, source))
}
