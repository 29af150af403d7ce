use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;
use termcolor::{Color, ColorSpec, WriteColor};

pub use log::{debug, error, info, trace, warn};

pub fn init_logger() {
    let mut builder =
        Builder::from_env(Env::default().default_filter_or("hexglow=info"));
    builder.filter_module("naga", LevelFilter::Warn);
    builder.filter_module("wgpu", LevelFilter::Warn);
    builder.filter_module("wgpu_core", LevelFilter::Warn);
    builder.filter_module("wgpu_hal", LevelFilter::Warn);

    builder.format(|_buf, record| {
        let writer =
            termcolor::BufferWriter::stdout(termcolor::ColorChoice::Auto);
        let mut buffer = writer.buffer();
        let mut spec = ColorSpec::new();

        spec.set_fg(Some(match record.level() {
            log::Level::Trace => Color::Cyan,
            log::Level::Debug => Color::Blue,
            log::Level::Info => Color::Green,
            log::Level::Warn => Color::Yellow,
            log::Level::Error => Color::Red,
        }));

        buffer.set_color(&spec)?;
        let module_path = record.module_path().unwrap_or("<unknown>");
        write!(buffer, "[{}][{}]", record.level(), module_path)?;
        buffer.reset()?;
        writeln!(buffer, " {}", record.args())?;
        writer.print(&buffer)?;
        Ok(())
    });

    let _ = builder.try_init();
}

/// Logs a warning the first time this call site is reached and never again.
/// Meant for per-frame code where a repeated condition would flood the log.
#[macro_export]
macro_rules! warn_once {
    ($($arg:tt)+) => {{
        static ONCE: ::std::sync::Once = ::std::sync::Once::new();
        ONCE.call_once(|| ::log::warn!($($arg)+));
    }};
}

/// `debug_throttled!(millis, ...)` logs at most once per `millis` from this
/// call site.
#[macro_export]
macro_rules! debug_throttled {
    ($millis:expr, $($arg:tt)+) => {{
        static LAST: ::std::sync::Mutex<Option<::std::time::Instant>> =
            ::std::sync::Mutex::new(None);
        let now = ::std::time::Instant::now();
        let mut last = LAST.lock().unwrap_or_else(|e| e.into_inner());
        let due = match *last {
            Some(at) => {
                now.duration_since(at)
                    >= ::std::time::Duration::from_millis($millis)
            }
            None => true,
        };
        if due {
            *last = Some(now);
            ::log::debug!($($arg)+);
        }
    }};
}
