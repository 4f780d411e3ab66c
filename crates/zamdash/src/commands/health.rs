//! Health command handler.
//!
//! Liveness only -- never contacts the ticket source, so it works
//! without any configuration.

use zamdash_core::HealthStatus;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let health = HealthStatus::healthy();
    let out = output::render_health(&global.output, &health);
    output::print_output(&out, global.quiet);
    Ok(())
}
