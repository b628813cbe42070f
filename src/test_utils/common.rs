use once_cell::sync::Lazy;

static LOGGER: Lazy<()> = Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

/// Initializes logging exactly once across the test binary.
pub fn enable_logger() {
    Lazy::force(&LOGGER);
}
