use clap::CommandFactory;
use std::fs;

// Brings `Cli` and its `PathBuf` import into scope.
include!("src/cli.rs");

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("../../../man");

    fs::create_dir_all(&man_dir)?;

    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd).date(chrono::Utc::now().format("%Y-%m-%d").to_string());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;

    fs::write(man_dir.join("membrane.1"), buffer)?;

    Ok(())
}
