//! Binary entry point: one fetch-aggregate-render cycle.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use powmap_service::aggregate::aggregate;
use powmap_service::cache::FeedCache;
use powmap_service::config::{self, RunConfig};
use powmap_service::ingest::taipower;
use powmap_service::logging::{self, DataSource, LogLevel};
use powmap_service::render::html;

fn main() -> ExitCode {
    let config_path = std::env::args().nth(1);
    let config = match config::load(config_path.as_deref().map(Path::new)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::from(2);
        }
    };

    let min_level = if config.verbose { LogLevel::Debug } else { LogLevel::Info };
    logging::init_logger(min_level, config.log_file.as_deref(), config.log_file.is_some());

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

fn run(config: &RunConfig) -> Result<(), ()> {
    let client = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            logging::error(DataSource::System, &format!("HTTP client setup failed: {}", e));
            eprintln!("❌ 無法建立連線: {}", e);
            return Err(());
        }
    };

    logging::info(DataSource::Taipower, &format!("正在下載: {} ...", config.feed_url));

    let mut cache = FeedCache::new(config.cache_ttl_secs);
    let fetched = cache.get_or_fetch(|| taipower::fetch_unit_records(&client, &config.feed_url));
    let (records, from_cache) = match fetched {
        Ok(result) => result,
        Err(e) => {
            logging::log_feed_failure("feed fetch", &e);
            eprintln!("❌ 目前無法取得台電資料，請稍後重試。({})", e);
            return Err(());
        }
    };
    if from_cache {
        logging::debug(DataSource::Taipower, "served from feed cache");
    }

    // An empty publication renders as an empty map, which reads as "the
    // grid is down" — report it as a failed cycle instead.
    if records.is_empty() {
        logging::log_feed_failure("feed fetch", &powmap_service::model::FeedError::EmptyFeed);
        eprintln!("❌ 目前無法取得台電資料，請稍後重試。");
        return Err(());
    }

    let snapshot = aggregate(&records);
    logging::info(
        DataSource::Pipeline,
        &format!("資料處理完成。正向總發電量: {} MW", html::thousands(snapshot.total_gen)),
    );

    let page = html::render_page(&snapshot, html::taipei_now());
    if let Err(e) = std::fs::write(&config.output_path, &page) {
        logging::error(
            DataSource::Render,
            &format!("cannot write {}: {}", config.output_path, e),
        );
        eprintln!("❌ 地圖寫入失敗: {}", e);
        return Err(());
    }

    logging::log_run_summary(records.len(), snapshot.groups.len(), snapshot.total_gen);
    println!("✅ 地圖生成完畢: {}", config.output_path);
    Ok(())
}
