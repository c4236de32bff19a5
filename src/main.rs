use depth_crawler::config;
use depth_crawler::crawler::{self, CrawlTree};

use log2::*;
use anyhow::Result;
use tokio_util::sync::CancellationToken;
use std::time::Instant;

/// Indicates start time of a project, lazily initialized
pub static START_TIME: once_cell::sync::Lazy<Instant> = once_cell::sync::Lazy::new(Instant::now);

#[tokio::main]
async fn main() -> Result<()> {
    let _ = *START_TIME;
    let cfg = config::Config::new();
    cfg.validate()?;
    let _log2 = stdout()
        .module(true) // include module name
        .module_with_line(true) // include line number from module
        .module_filter(|module| module.starts_with("depth_crawler")) // include only modules having this pattern
        .compress(false) // compress output
        .level(cfg.log_level.to_string()) // level of logging (trace -
        .start();

    let crawler_config = cfg.crawler_config()?;

    // Ctrl-C stops the crawl, whatever was loaded so far still gets printed
    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let mut engine = crawler::CrawlEngine::new(crawler_config)
        .with_parser(cfg.parser.build())
        .with_cancellation(token);

    let tree = if cfg.search_mode() {
        match engine.start_search(&cfg.start_url, cfg.keywords.as_slice()).await {
            Ok(result) => {
                if result.is_empty() {
                    info!("No page matched {:?}", cfg.keywords);
                } else {
                    println!("Matches ({}):", result.match_count());
                    for node in result.matches() {
                        println!("  [{}] {} {}", node.depth(), node.url(), node.page().title());
                    }
                }
                result.into_tree()
            }
            Err(e) => {
                error!("Search failed: {}", e);
                return Err(e.into());
            }
        }
    } else {
        match engine.start_traversal(&cfg.start_url).await {
            Ok(tree) => {
                print!("{}", tree.render());
                tree
            }
            Err(e) => {
                error!("Crawling failed: {}", e);
                return Err(e.into());
            }
        }
    };

    if cfg.show_files {
        print_files(&tree);
    }

    if let Some(path) = cfg.output_file {
        std::fs::write(&path, serde_json::to_string_pretty(&tree.report())?)?;
        info!("Tree written to {:?}", path);
    }

    if tree.is_interrupted() {
        warn!("Crawl was interrupted, output is partial");
    }
    info!(
        "Loaded {} pages in {:.2}s",
        tree.len(),
        START_TIME.elapsed().as_secs_f64()
    );

    Ok(())
}

fn print_files(tree: &CrawlTree) {
    for node in tree.iter() {
        let files = node.page().files();
        if files.is_empty() {
            continue;
        }
        println!("Files on {}:", node.url());
        for file in files {
            println!("  {}", file);
        }
    }
}
