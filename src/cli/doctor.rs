//! Doctor diagnostics CLI command.
//!
//! Checks that the Live Demo has what it needs and reports actionable fixes.

use std::time::Duration;

use crate::config::Config;

/// Diagnostic check result.
struct Check {
    name: &'static str,
    status: CheckStatus,
    message: String,
    fix: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl Check {
    fn ok(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Ok,
            message: message.into(),
            fix: None,
        }
    }

    fn warn(name: &'static str, message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Warning,
            message: message.into(),
            fix: Some(fix.into()),
        }
    }

    fn error(name: &'static str, message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Error,
            message: message.into(),
            fix: Some(fix.into()),
        }
    }

    fn icon(&self) -> &'static str {
        match self.status {
            CheckStatus::Ok => "[OK]",
            CheckStatus::Warning => "[WARN]",
            CheckStatus::Error => "[ERR]",
        }
    }
}

/// Run diagnostics against the loaded configuration.
pub async fn run_doctor_command(config: &Config) -> anyhow::Result<()> {
    println!("EduAI Doctor");
    println!("============\n");

    let mut checks = vec![
        Check::ok("Version", format!("eduboard v{}", env!("CARGO_PKG_VERSION"))),
        check_gemini_key(config),
        check_openai_key(config),
        check_bind(config),
    ];
    checks.push(check_reachable("Gemini API", &config.ai.gemini.base_url).await);
    checks.push(check_reachable("OpenAI API", &config.ai.openai.base_url).await);

    let mut errors = 0;
    let mut warnings = 0;

    for check in &checks {
        println!("  {} {}: {}", check.icon(), check.name, check.message);
        if let Some(ref fix) = check.fix {
            println!("       Fix: {}", fix);
        }

        match check.status {
            CheckStatus::Error => errors += 1,
            CheckStatus::Warning => warnings += 1,
            CheckStatus::Ok => {}
        }
    }

    println!();
    println!(
        "Summary: {} checks, {} passed, {} warnings, {} errors",
        checks.len(),
        checks.len() - errors - warnings,
        warnings,
        errors
    );

    if errors > 0 {
        println!("\nThe site will run, but the Live Demo will report configuration errors.");
    } else if warnings > 0 {
        println!("\nThe Live Demo should work, but consider addressing the warnings above.");
    } else {
        println!("\nAll checks passed.");
    }

    Ok(())
}

fn check_gemini_key(config: &Config) -> Check {
    if config.ai.gemini.api_key.is_some() {
        Check::ok(
            "Gemini",
            format!(
                "API key set (text: {}, vision: {})",
                config.ai.gemini.text_model, config.ai.gemini.vision_model
            ),
        )
    } else {
        Check::error(
            "Gemini",
            "GEMINI_API_KEY not set",
            "Add GEMINI_API_KEY to your .env file",
        )
    }
}

fn check_openai_key(config: &Config) -> Check {
    if config.ai.openai.api_key.is_some() {
        Check::ok(
            "OpenAI",
            format!(
                "API key set (image: {}, speech: {})",
                config.ai.openai.image_model, config.ai.openai.tts_model
            ),
        )
    } else {
        Check::error(
            "OpenAI",
            "OPENAI_API_KEY not set (image generation and narration disabled)",
            "Add OPENAI_API_KEY to your .env file",
        )
    }
}

fn check_bind(config: &Config) -> Check {
    let bind = config.server.bind;
    if bind.ip().is_unspecified() {
        Check::warn(
            "Bind",
            format!("{} (all interfaces)", bind),
            "Set EDUBOARD_BIND=127.0.0.1:<port> unless the site should be public",
        )
    } else {
        Check::ok("Bind", bind.to_string())
    }
}

async fn check_reachable(name: &'static str, base_url: &str) -> Check {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            return Check::error(name, format!("HTTP client error: {}", e), "Check TLS setup");
        }
    };

    // Any HTTP response (even 404) means the host is reachable.
    match client.get(base_url).send().await {
        Ok(resp) => Check::ok(name, format!("{} reachable ({})", base_url, resp.status())),
        Err(e) => Check::warn(
            name,
            format!("{} unreachable: {}", base_url, e.without_url()),
            "Check network connectivity and any proxy settings",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_missing_keys_are_errors() {
        let config = Config::default();
        assert_eq!(check_gemini_key(&config).status, CheckStatus::Error);
        assert_eq!(check_openai_key(&config).status, CheckStatus::Error);
    }

    #[test]
    fn test_present_keys_pass() {
        let mut config = Config::default();
        config.ai.gemini.api_key = Some(SecretString::from("g"));
        config.ai.openai.api_key = Some(SecretString::from("o"));
        assert_eq!(check_gemini_key(&config).status, CheckStatus::Ok);
        assert_eq!(check_openai_key(&config).status, CheckStatus::Ok);
    }

    #[test]
    fn test_public_bind_warns() {
        let mut config = Config::default();
        assert_eq!(check_bind(&config).status, CheckStatus::Ok);
        config.server.bind = "0.0.0.0:3000".parse().unwrap();
        let check = check_bind(&config);
        assert_eq!(check.status, CheckStatus::Warning);
        assert!(check.fix.is_some());
    }
}
