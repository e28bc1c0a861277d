use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Installs a stderr `fmt` subscriber. stdout stays free for rendered output.
pub fn tracing_init(level: LevelFilter) -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(level);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;
    return Ok(());
}

/// `-v` flags counted on the command line.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    return match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
}

#[cfg(test)]
mod test_logging {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(level_for_verbosity(0), LevelFilter::WARN);
        assert_eq!(level_for_verbosity(2), LevelFilter::DEBUG);
        assert_eq!(level_for_verbosity(9), LevelFilter::TRACE);
    }
}
