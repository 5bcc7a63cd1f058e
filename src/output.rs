use serde::Serialize;

/// Print `data` on stdout. Diagnostics go to stderr so stdout stays parseable.
pub fn output_data<T: Serialize>(data: &T, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string(data)?);
        }
        "yaml" => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        "pretty" | _ => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
    }
    Ok(())
}

pub fn print_success(message: &str) {
    eprintln!("✅ {}", message);
}

pub fn print_error(message: &str) {
    eprintln!("\x1b[31m❌ Error: {}\x1b[0m", message);
}

pub fn print_warning(message: &str) {
    eprintln!("\x1b[33m⚠️  Warning: {}\x1b[0m", message);
}

pub fn print_info(message: &str) {
    eprintln!("ℹ️  {}", message);
}
