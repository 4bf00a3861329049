use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

/// Route parser events to the test output. Safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_test_writer()
        .try_init();
}
