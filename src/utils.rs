use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::new(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        )))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: usize) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn redact_domain(domain: &str) -> String {
    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() <= 1 {
        return "*".repeat(domain.len());
    }

    let tld = parts[parts.len() - 1];
    if parts[parts.len() - 2].len() <= 3 {
        return format!("???.{}", tld);
    }

    let mut redacted: Vec<String> = parts[..parts.len() - 1]
        .iter()
        .map(|part| "*".repeat(part.len()))
        .collect();
    redacted.push(tld.to_string());
    redacted.join(".")
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if let Some(file) = &args.file {
        if !file.is_file() {
            anyhow::bail!("Log file not found: {:?}", file);
        }
    }

    if !args.no_store && args.store_dir.exists() && !args.store_dir.is_dir() {
        anyhow::bail!("--store-dir {:?} is not a directory", args.store_dir);
    }

    Ok(())
}
