use anyhow::Context;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use fmu_sim::{options::SimOptions, simulate};

fn main() -> anyhow::Result<()> {
    let options = SimOptions::parse();

    // The handle keeps the logger alive for the rest of the run.
    let _logger = flexi_logger::Logger::try_with_env_or_str(
        options.verbosity.log_level_filter().as_str(),
    )?
    .start()?;

    let recording = simulate(&options).context("simulation failed")?;

    if let Some(path) = &options.output {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        recording.write_csv(std::io::BufWriter::new(file))?;
        log::info!("wrote {} samples to {}", recording.rows.len(), path.display());
    }

    if let Some(row) = recording.last() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(recording.columns.clone());
        table.add_row(
            std::iter::once(row.time.to_string())
                .chain(row.values.iter().map(f64::to_string)),
        );
        println!("Final values:\n{table}");
    }

    Ok(())
}
