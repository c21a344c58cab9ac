use env_logger::Env;
use miette::{IntoDiagnostic, Result};
use ticket_report::run;
use time::UtcOffset;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("error")).init();
    // Only readable while this is the sole thread, so before the runtime starts.
    let utc_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    tokio::runtime::Runtime::new()
        .into_diagnostic()?
        .block_on(run(utc_offset))
}
