use log4rs::filter::{Filter, Response};
use log::{LevelFilter, Record};
use log4rs::Handle;
use chrono::Local;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::encode::pattern::PatternEncoder;
use log4rs::config::{Appender, Root};
use log4rs::config::runtime::ConfigBuilder;

const ROLL_SIZE: u64 = 10 * 1024; // 10KB
const ROLL_WINDOW: u32 = 30;

/// Accepts records whose level lies between the two bounds, in either order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct PassThroughFilter {
    level_range_start: LevelFilter,
    level_range_end: LevelFilter,
}

impl PassThroughFilter {
    pub fn new(level_range_start: LevelFilter, level_range_end: LevelFilter) -> PassThroughFilter {
        PassThroughFilter { level_range_start, level_range_end }
    }

    pub fn accepts(&self, level: log::Level) -> bool {
        (level >= self.level_range_start && level <= self.level_range_end) ||
        (level >= self.level_range_end && level <= self.level_range_start)
    }
}

impl Filter for PassThroughFilter {
    fn filter(&self, record: &Record) -> Response {
        if self.accepts(record.level()) {
            Response::Accept
        } else {
            Response::Reject
        }
    }
}

/// Adds one size-rolled file appender named `<band>_rolling_file` writing
/// `<log_dir>/<date>/<band>.app.log`.
fn add_band(
    config_builder: ConfigBuilder,
    log_dir: &str,
    date: &str,
    band: &str,
    filter: PassThroughFilter,
) -> Result<ConfigBuilder, Box<dyn std::error::Error>> {
    let log_file_path = format!("{}/{}/{}.app.log", log_dir, date, band);
    let size_trigger = SizeTrigger::new(ROLL_SIZE);
    let size_roller = FixedWindowRoller::builder()
        .build(&format!("{}/{}/{}.app.rotate.{{}}.log", log_dir, date, band), ROLL_WINDOW)?;
    let size_trigger_policy = CompoundPolicy::new(Box::new(size_trigger), Box::new(size_roller));
    let size_rolled_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("{d}, {l}, {M}, {m}{n}")))
        .build(log_file_path, Box::new(size_trigger_policy))?;
    Ok(config_builder.appender(
        Appender::builder()
            .filter(Box::new(filter))
            .build(format!("{}_rolling_file", band), Box::new(size_rolled_appender))
    ))
}

/// Installs the debug/info/error rolling file appenders under `log_dir`.
pub fn setup_logger(log_dir: &str) -> Result<Handle, Box<dyn std::error::Error>> {
    let date = Local::now().format("%Y-%m-%d").to_string();
    let mut config_builder = log4rs::config::runtime::ConfigBuilder::default();
    // trace, debug
    config_builder = add_band(config_builder, log_dir, &date, "debug",
        PassThroughFilter::new(LevelFilter::Trace, LevelFilter::Debug))?;
    // info
    config_builder = add_band(config_builder, log_dir, &date, "info",
        PassThroughFilter::new(LevelFilter::Info, LevelFilter::Info))?;
    // warn, error
    config_builder = add_band(config_builder, log_dir, &date, "error",
        PassThroughFilter::new(LevelFilter::Warn, LevelFilter::Error))?;

    let config =
    config_builder
        .build(
            Root::builder()
                .appender("debug_rolling_file")
                .appender("info_rolling_file")
                .appender("error_rolling_file")
                .build(LevelFilter::Trace)
        )?;

    let handle = log4rs::init_config(config)?;
    Ok(handle)
}

// test module
#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_band_filters() {
        let debug = PassThroughFilter::new(LevelFilter::Trace, LevelFilter::Debug);
        assert!(debug.accepts(Level::Trace));
        assert!(debug.accepts(Level::Debug));
        assert!(!debug.accepts(Level::Info));

        let errors = PassThroughFilter::new(LevelFilter::Warn, LevelFilter::Error);
        assert!(errors.accepts(Level::Warn));
        assert!(errors.accepts(Level::Error));
        assert!(!errors.accepts(Level::Info));
    }

    #[test]
    fn test_bounds_in_either_order() {
        let reversed = PassThroughFilter::new(LevelFilter::Debug, LevelFilter::Trace);
        assert!(reversed.accepts(Level::Trace));
        assert!(!reversed.accepts(Level::Warn));
    }
}
