use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use bruker2mrd::parameters::ParameterFile;

/// Parse a parameter file and render it back to text
pub fn run(file: PathBuf, name: Option<String>, output: Option<PathBuf>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("Parameter file does not exist: {}", file.display());
    }

    let document = ParameterFile::open(&file)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    info!("Parsed {} parameters from {}", document.len(), file.display());

    if let Some(name) = name {
        let parameter = document
            .find(&name)
            .with_context(|| format!("No parameter named {} in {}", name, file.display()))?;
        print!("{}", parameter);
        return Ok(());
    }

    match output {
        Some(path) => {
            let out = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            document
                .write_to(BufWriter::new(out))
                .context("Failed to write parameter document")?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", document),
    }

    Ok(())
}
