use clap::Parser;

use lvt_cli::cli::{Cli, Command};
use lvt_cli::{fmt, scaffold};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::New { name } => {
            let dest = std::env::current_dir()?.join(&name);
            scaffold::new_project(&name, &dest)?;
            println!("created {}", dest.display());
        }
        Command::Fmt { path } => {
            let changed = fmt::fmt_file(&path)?;
            if changed {
                println!("formatted {}", path.display());
            } else {
                println!("{} already formatted", path.display());
            }
        }
    }
    Ok(())
}
