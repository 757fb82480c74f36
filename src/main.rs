use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use subfeed::config::DEFAULT_MEDIA_SIZE_INDEX;
use subfeed::{transform_post, FeedConfig, FetchCache, ListingPager};

#[derive(clap::ValueEnum, Clone, Debug)]
enum Sort {
    Hot,
    New,
    Top,
    Rising,
    Controversial,
}

impl Sort {
    fn as_str(&self) -> &'static str {
        match self {
            Sort::Hot => "hot",
            Sort::New => "new",
            Sort::Top => "top",
            Sort::Rising => "rising",
            Sort::Controversial => "controversial",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long, value_parser)]
    subreddit: String,
    #[clap(long, value_enum, default_value_t = Sort::Hot)]
    sort: Sort,
    #[clap(short, long, value_parser, default_value_t = 1)]
    max_pages: usize,
    #[clap(short = 'i', long, value_parser, default_value_t = DEFAULT_MEDIA_SIZE_INDEX)]
    media_size_index: usize,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Args = Args::parse();
    let config = FeedConfig::default().with_media_size_index(args.media_size_index);
    let cache = FetchCache::new(config.http_client()?);
    let mut pager = ListingPager::new(
        &args.subreddit,
        args.sort.as_str(),
        config.api_origin.clone(),
        cache,
    )?;

    let mut printed = 0;
    for _ in 0..args.max_pages {
        let added = pager
            .load_next_page()
            .await
            .with_context(|| format!("Failed to load r/{}", args.subreddit))?;

        for listing in pager.posts().into_iter().skip(printed) {
            let post = transform_post(listing, config.media_size_index).into_logged_post();
            println!("{}", serde_json::to_string(&post)?);
        }
        printed += added;

        if pager.is_reaching_end() {
            break;
        }
    }

    info!(
        "Printed {} posts from {} page(s) of r/{}",
        printed,
        pager.pages().len(),
        args.subreddit
    );
    Ok(())
}
