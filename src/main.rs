//! xcom-downloader - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use xcom_downloader::{
    api::auth::CSRF_TOKEN_KEY,
    cli::Args,
    config::{validate_config, Config},
    download::{
        BulkOptions, BulkProgress, BulkStatus, Downloader, DownloadTask, HostEnv,
        ResolvedCapability,
    },
    error::{exit_codes, Error, Result},
    host::{CancelToken, FsSaveTarget, KeyValueStore, MemoryStore, ReqwestTransport},
    locator::{locate_post, ClickTarget},
    media::{archive_filename, normalize, record_from_api},
    output::{
        create_item_bar, create_spinner, print_banner, print_bulk_summary, print_error,
        print_info, print_media_listing, print_success, print_warning,
    },
    TwitterApi,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_) | Error::ConfigValidation { .. } | Error::MissingConfig(_) => {
                    ExitCode::from(exit_codes::CONFIG_ERROR as u8)
                }
                Error::Api(_)
                | Error::Authentication(_)
                | Error::PostNotFound(_)
                | Error::NoMediaFound(_) => ExitCode::from(exit_codes::API_ERROR as u8),
                Error::Download(_)
                | Error::CapabilityUnavailable
                | Error::AllDownloadsFailed(_) => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                Error::Cancelled => ExitCode::from(exit_codes::ABORT as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    if !args.quiet {
        print_banner();
    }

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        Config::default()
    };
    args.merge_into_config(&mut config);
    validate_config(&config)?;

    // Identify the post
    let target = ClickTarget::from_user_input(&args.post);
    let reference = locate_post(&target)
        .ok_or_else(|| Error::Config(format!("Not a recognizable post URL or id: {}", args.post)))?;
    print_info(&format!(
        "Post {} by @{}",
        reference.post_id,
        if reference.username.is_empty() {
            "unknown"
        } else {
            &reference.username
        }
    ));

    // Wire up the host environment
    let store = Arc::new(MemoryStore::new());
    if let Some(token) = &config.session.csrf_token {
        store.set(CSRF_TOKEN_KEY, token.clone());
    }
    let transport = Arc::new(ReqwestTransport::new(&config.session.user_agent)?);
    let api = TwitterApi::new(transport.clone(), store);

    // Resolve the post's media graph
    let spinner = create_spinner("Resolving media...");
    let resolved = api.post_media(&reference.post_id).await;
    spinner.finish_and_clear();
    let raw_media = resolved?;

    if raw_media.is_empty() {
        return Err(Error::NoMediaFound(reference.post_id.clone()));
    }

    let records = normalize(raw_media.iter().map(record_from_api).collect());
    if !args.quiet {
        print_media_listing(&records);
    }

    // Detect the download capability
    let output_directory = config.output_directory();
    let env = HostEnv {
        transport: Some(transport.clone()),
        native_save: Some(Arc::new(FsSaveTarget::new(output_directory.clone()))),
        blob_save: None,
    };
    let capability = ResolvedCapability::detect(&env);
    if !capability.is_available() {
        return Err(Error::CapabilityUnavailable);
    }
    let downloader = Downloader::new(transport, capability);

    // Ctrl-C aborts in-flight work cooperatively.
    let cancel = CancelToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            print_warning("Cancelling...");
            cancel_on_signal.cancel();
        }
    });

    // Single item requested, or only one item in the post
    if args.item.is_some() || records.len() == 1 {
        let index = args.item.unwrap_or(0);
        let record = records.get(index).ok_or_else(|| {
            Error::Config(format!(
                "Item index {} out of range (post has {} items)",
                index,
                records.len()
            ))
        })?;

        let outcome = downloader
            .download_single(DownloadTask::from(record), &cancel)
            .await?;
        print_success(&format!("Saved {}", outcome.path.display()));
        return Ok(());
    }

    // Bulk download into an archive
    let archive_name = args.zip_name.clone().unwrap_or_else(|| archive_filename(&records));
    let bar = if config.options.show_downloads {
        Some(create_item_bar(records.len() as u64, "Downloading"))
    } else {
        None
    };
    let progress_bar = bar.clone();

    let options = BulkOptions {
        concurrency: config.options.concurrency,
        retries: config.options.retries,
        archive_name: Some(archive_name),
        cancel: cancel.clone(),
        progress: progress_bar.map(|bar| {
            Box::new(move |progress: BulkProgress| {
                bar.set_position(progress.current as u64);
            }) as Box<dyn Fn(BulkProgress) + Send + Sync>
        }),
    };

    let tasks: Vec<DownloadTask> = records.iter().map(DownloadTask::from).collect();
    let result = downloader.download_bulk(tasks, options).await?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    print_bulk_summary(&result);
    match result.status {
        BulkStatus::AllFailed => Err(Error::AllDownloadsFailed(result.files_processed)),
        BulkStatus::Cancelled => Err(Error::Cancelled),
        _ => {
            if let Some(path) = &result.saved_path {
                print_success(&format!("Saved {}", path.display()));
            }
            Ok(())
        }
    }
}
