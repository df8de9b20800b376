use anyhow::Result;
use log::info;

use crate::{cli::PreviewArgs, io_utils, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let loaded = io_utils::read_csv_table(&args.input, args.delimiter, encoding)?;
    print!("{}", table::render_frame(&loaded, args.rows));
    info!(
        "Displayed {} of {} row(s) from {:?}",
        loaded.height().min(args.rows),
        loaded.height(),
        args.input
    );
    Ok(())
}
