use regex::Regex;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;

// Modules that read `VRSTATS_*` variables at runtime.
const ENV_READERS: &[&str] = &[
    "src/env_loader.rs",
    "src/logging.rs",
    "src/vrstats/config.rs",
    "src/vrstats/paths.rs",
];

fn recognized_env_keys(key_literal: &Regex) -> std::io::Result<BTreeSet<String>> {
    let mut keys = BTreeSet::new();
    for reader in ENV_READERS {
        let source = fs::read_to_string(reader)?;
        keys.extend(
            key_literal
                .captures_iter(&source)
                .map(|caps| caps[1].to_string()),
        );
    }
    Ok(keys)
}

fn render(keys: &BTreeSet<String>) -> String {
    let entries = keys
        .iter()
        .map(|key| format!("    {key:?},\n"))
        .collect::<String>();
    format!("pub const RECOGNIZED_ENV_KEYS: &[&str] = &[\n{entries}];\n")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let key_literal = Regex::new(r#""(VRSTATS_[A-Z0-9_]+)""#)?;
    let keys = recognized_env_keys(&key_literal)?;

    let out_dir = env::var("OUT_DIR")?;
    fs::write(Path::new(&out_dir).join("env_keys.rs"), render(&keys))?;

    for reader in ENV_READERS {
        println!("cargo:rerun-if-changed={reader}");
    }
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
