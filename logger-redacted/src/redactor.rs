use crate::config::LoggerConfig;
use crate::error::LoggerError;
use base64::{engine::general_purpose, Engine as _};
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

/// Masks personal data in text before it is logged.
pub struct PiiRedactor {
    enabled: bool,
    hash_for_correlation: bool,
    email: Regex,
    custom_patterns: Vec<(Regex, String)>,
}

impl PiiRedactor {
    pub fn new(config: &LoggerConfig) -> Result<Self, LoggerError> {
        let custom_patterns = config
            .custom_patterns
            .iter()
            .map(|custom| Ok((Regex::new(&custom.pattern)?, custom.replacement.clone())))
            .collect::<Result<Vec<_>, LoggerError>>()?;

        Ok(Self {
            enabled: config.redaction_enabled,
            hash_for_correlation: config.hash_for_correlation,
            email: Regex::new(EMAIL_PATTERN)?,
            custom_patterns,
        })
    }

    pub fn redact(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }

        let mut result = self.redact_emails(text);
        for (pattern, replacement) in &self.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).into_owned();
        }
        result
    }

    fn redact_emails(&self, text: &str) -> String {
        self.email
            .replace_all(text, |caps: &Captures| {
                let email = &caps[0];
                if self.hash_for_correlation {
                    format!("EMAIL[{}]", hash_value(email))
                } else {
                    mask_email(email)
                }
            })
            .into_owned()
    }
}

/// `john.doe@example.com` becomes `j***@e***`.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => format!("{}***@{}***", first_char(local), first_char(domain)),
        None => "***@***".to_string(),
    }
}

fn first_char(part: &str) -> &str {
    part.char_indices()
        .nth(1)
        .map_or(part, |(end, _)| &part[..end])
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    general_purpose::STANDARD.encode(&digest[..8])
}
