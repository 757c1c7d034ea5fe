use anyhow::{Context, Result};
use log::info;

use crate::{assemble, cli::PreviewArgs, config::PipelineConfig, reader, table, training};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let frame = if args.training {
        let work_dir = args
            .work_dir
            .clone()
            .unwrap_or_else(|| PipelineConfig::default().work_dir);
        training::load_training_view(&work_dir, &args.input)?.frame
    } else if args.snapshot {
        assemble::read_snapshot(&args.input)
            .with_context(|| format!("Reading snapshot {:?}", args.input))?
    } else {
        reader::read_table(&args.input)?
    };
    print!("{}", table::render_frame(&frame, args.rows));
    info!(
        "Displayed {} of {} row(s) from {:?}",
        frame.len().min(args.rows),
        frame.len(),
        args.input
    );
    Ok(())
}
