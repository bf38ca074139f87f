//! `mosaic samples`: Run the bundled scenario catalog.

use crate::catalog;
use crate::output::StyledOutput;
use mosaic_core::RuntimeConfig;
use std::time::Instant;

/// Arguments for the samples command.
pub struct SamplesArgs {
    pub pattern: Option<String>,
    pub bail: bool,
}

pub fn execute(
    args: SamplesArgs,
    config: &RuntimeConfig,
    out: &mut StyledOutput,
) -> anyhow::Result<()> {
    let selected: Vec<_> = catalog::samples()
        .into_iter()
        .filter(|s| args.pattern.as_deref().map_or(true, |p| s.name.contains(p)))
        .collect();

    if selected.is_empty() {
        out.warning("No samples match the given pattern.");
        out.newline();
        return Ok(());
    }

    let start = Instant::now();
    let mut passed = 0usize;
    let mut failures = Vec::new();

    for sample in &selected {
        let result = catalog::runtime(config.clone()).and_then(|rt| (sample.run)(&rt));
        match result {
            Ok(()) => {
                passed += 1;
                out.pass_badge();
                out.plain(&format!(" {}", sample.name));
                out.newline();
            }
            Err(e) => {
                out.fail_badge();
                out.plain(&format!(" {}", sample.name));
                out.newline();
                failures.push((sample.name, format!("{:#}", e)));
                if args.bail {
                    break;
                }
            }
        }
    }

    if !failures.is_empty() {
        out.newline();
        for (name, message) in &failures {
            out.bold(name);
            out.newline();
            out.error(&format!("  {}", message));
            out.newline();
        }
    }

    out.newline();
    out.bold("Samples: ");
    if !failures.is_empty() {
        out.error(&format!("{} failed", failures.len()));
        out.plain(", ");
    }
    out.success(&format!("{} passed", passed));
    out.plain(&format!(", {} total", selected.len()));
    out.newline();
    out.dim(&format!("Time:    {:.3}s", start.elapsed().as_secs_f64()));
    out.newline();
    out.flush();

    if !failures.is_empty() {
        anyhow::bail!("{} sample(s) failed", failures.len());
    }
    Ok(())
}
