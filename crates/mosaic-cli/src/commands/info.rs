//! `mosaic info`: Display version and effective configuration.

use crate::config::{CliConfig, TARGETS};
use crate::output::StyledOutput;
use std::path::Path;

pub fn execute(config: &CliConfig, config_path: Option<&Path>, out: &mut StyledOutput) -> anyhow::Result<()> {
    out.bold(&format!("Mosaic v{}", env!("CARGO_PKG_VERSION")));
    out.newline();
    out.newline();

    println_field(out, "Platform:", &format!("{} ({})", std::env::consts::OS, std::env::consts::ARCH));
    let source = match config_path {
        Some(path) => path.display().to_string(),
        None if Path::new(crate::config::DEFAULT_CONFIG_FILE).exists() => {
            crate::config::DEFAULT_CONFIG_FILE.to_string()
        }
        None => "(defaults)".to_string(),
    };
    println_field(out, "Config:", &source);

    out.newline();
    out.bold("Runtime:");
    out.newline();
    let runtime = &config.runtime;
    println_field(out, "  unique_names", &runtime.unique_names.to_string());
    println_field(out, "  max_call_depth", &runtime.max_call_depth.to_string());
    println_field(out, "  private_prefix", &format!("{:?}", runtime.private_prefix));

    out.newline();
    out.bold("Log levels:");
    out.newline();
    println_field(out, "  default", &config.log.global.to_string());
    for target in TARGETS {
        println_field(out, &format!("  {}", target), &config.log.level_for(target).to_string());
    }
    out.flush();
    Ok(())
}

fn println_field(out: &mut StyledOutput, label: &str, value: &str) {
    out.plain(&format!("{:<22}", label));
    out.info(value);
    out.newline();
}
