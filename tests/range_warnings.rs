use std::sync::Mutex;

use delayfx::dsp::delay::{DelayLine, LinearDelay};
use delayfx::dsp::echo::Echo;
use delayfx::dsp::filter::{BiQuad, Filter, FilterKind};
use delayfx::DesignCtx;
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Keeps every warning so tests can look for the one they caused.
struct CaptureLogger {
    warnings: Mutex<Vec<String>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(mut warnings) = self.warnings.lock() {
                warnings.push(record.args().to_string());
            }
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    warnings: Mutex::new(Vec::new()),
};

fn install() {
    // Every test calls this; only the first registration succeeds.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Warn);
}

fn warned(needle: &str) -> bool {
    LOGGER
        .warnings
        .lock()
        .unwrap()
        .iter()
        .any(|line| line.contains(needle))
}

#[test]
fn delay_saturation_is_logged() {
    install();
    let mut line = DelayLine::new(5, 10);
    line.set_delay(50);
    assert_eq!(line.delay(), 10);
    assert!(warned("DelayLine: set_delay(50) too big, saturating to 10"));

    let mut linear = LinearDelay::new(2.0, 8);
    linear.set_delay(-3.0);
    assert_eq!(linear.delay(), 0.0);
    assert!(warned("LinearDelay: set_delay(-3) less than zero"));
}

#[test]
fn effect_clamps_are_logged() {
    install();
    let mut echo = Echo::new(100.0).unwrap();
    echo.set_effect_mix(1.75);
    assert_eq!(echo.effect_mix(), 1.0);
    assert!(warned("Echo: effect mix (1.75) is greater than 1.0"));

    echo.set_delay(-2.5);
    assert_eq!(echo.delay(), 0);
    assert!(warned("Echo: set_delay(-2.5) is less than zero"));
}

#[test]
fn filter_clamps_are_logged() {
    install();
    let ctx = DesignCtx::default();
    let mut filter = FilterKind::BandPass.build(ctx, 1_000.0, 1.0);
    filter.set_q(-4.0);
    assert!(filter.q() > 0.0);
    assert!(warned("Q -4 too small"));

    let mut biquad = BiQuad::new(ctx);
    biquad.set_freq(-10.0);
    assert!(warned("frequency -10 Hz too low"));
}
