//! Report discovery command.

use covgap_rs::core::coverage_discovery::CoverageDiscovery;

use crate::cli::args::DiscoverArgs;
use crate::cli::config_layer::load_configuration;
use crate::cli::output::{render_discovered, write_output};

/// List the validated JaCoCo reports under `--base-dir`.
pub async fn discover_command(args: DiscoverArgs) -> anyhow::Result<()> {
    let config = load_configuration(args.config.as_deref())?;
    let base_dir = args.base_dir.clone();
    let discovery = config.discovery.clone();

    let reports =
        tokio::task::spawn_blocking(move || CoverageDiscovery::discover(&base_dir, &discovery))
            .await??;

    let rendered = render_discovered(&reports, args.format)?;
    write_output(&rendered, None).await
}
