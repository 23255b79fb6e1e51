use log::LevelFilter;

/// Initialize logging for the application.
///
/// Should be called once at the start of `main()`. Records are written to
/// stderr as `<timestamp>  <LEVEL> <message>`.
///
/// # Errors
///
/// Returns an error if a global logger has already been installed.
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}  {} {}",
                chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                record.level(),
                message
            ));
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

