//! Metrics command handler.

use zamdash_config::Settings;
use zamdash_core::DashboardService;

use crate::cli::{GlobalOpts, MetricsArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    args: MetricsArgs,
    settings: Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let api = settings.build_api()?;
    let service =
        DashboardService::connect(api, settings.engine_config(), settings.name_table()?).await?;

    let snapshot = if args.refresh {
        service.force_refresh().await
    } else {
        service.snapshot().await
    };

    let out = output::render_snapshot(&global.output, &snapshot, args.full);
    output::print_output(&out, global.quiet);
    Ok(())
}
