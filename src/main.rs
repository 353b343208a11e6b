//! titanasm binary.

use std::fs::File;
use std::io::Write;

use clap::Parser;
use miette::IntoDiagnostic;
use titanasm::cli::TitanasmCli;
use titanasm::{AssemblyCode, run_assembler};

fn main() -> miette::Result<()> {
	human_panic::setup_panic!(human_panic::metadata!());
	miette::set_hook(Box::new(|_| {
		Box::new(
			miette::MietteHandlerOpts::new().unicode(true).context_lines(3).tab_width(4).with_cause_chain().build(),
		)
	}))?;

	let args = TitanasmCli::parse();
	simple_logger::SimpleLogger::new().with_level(args.log_level()).env().without_timestamps().init().into_diagnostic()?;

	let code = AssemblyCode::from_file_or_assembly_error(&args.input.to_string_lossy()).map_err(|error| *error)?;
	let program = run_assembler(&code).map_err(|error| *error)?;
	log::info!("assembled {} bytes with {} labels", program.image.len(), program.symbols.len());

	if args.dump_symbols {
		eprint!("{}", program.symbols);
	}

	let mut rendered = args.output_format.render(&program.image);
	if args.writes_to_stdout() {
		if args.output_format.is_text() && !rendered.is_empty() {
			rendered.push(b'\n');
		}
		std::io::stdout().lock().write_all(&rendered).into_diagnostic()?;
	} else if let Some(output) = &args.output {
		let mut outfile = std::io::BufWriter::new(
			File::options().create(true).truncate(true).write(true).open(output).into_diagnostic()?,
		);
		outfile.write_all(&rendered).into_diagnostic()?;
		outfile.flush().into_diagnostic()?;
	}
	Ok(())
}
