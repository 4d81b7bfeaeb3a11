use anyhow::Result;

use courier_core::config::AppConfig;

/// Prints the effective configuration. Secrets are redacted, never echoed.
pub fn run(config: &AppConfig) -> Result<()> {
    println!("[directory]");
    println!("contacts_path = {}", config.directory.contacts_path.display());
    println!("match_threshold = {}", config.directory.match_threshold);
    println!();
    println!("[llm]");
    println!("provider = {:?}", config.llm.provider);
    println!("model = {}", config.llm.model);
    println!(
        "api_key = {}",
        if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" }
    );
    println!("base_url = {}", config.llm.base_url.as_deref().unwrap_or("<unset>"));
    println!("timeout_secs = {}", config.llm.timeout_secs);
    println!("max_retries = {}", config.llm.max_retries);
    println!();
    println!("[dispatch]");
    println!("default_provider = {}", config.dispatch.default_provider.display_name());
    println!();
    println!("[logging]");
    println!("level = {}", config.logging.level);
    println!("format = {:?}", config.logging.format);
    Ok(())
}
