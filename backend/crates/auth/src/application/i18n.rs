//! Message Catalog
//!
//! Every message a client can see goes through here. Keys follow the
//! `section.name` convention (`users.invalidLogin`); placeholders are written
//! as `{name}`.

use std::collections::HashMap;

/// Built-in English catalog
const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("globals.terms.user", "User"),
    ("globals.terms.users", "Users"),
    ("globals.messages.invalidFields", "Invalid fields: {name}"),
    ("globals.messages.notFound", "{name} not found"),
    ("globals.messages.internalError", "Internal server error"),
    ("globals.messages.permissionDenied", "Permission denied: {name}"),
    ("users.login", "Login"),
    ("users.invalidLogin", "Invalid login or password"),
    ("users.invalidRequest", "Invalid request"),
    ("users.accountDisabled", "Account is disabled"),
    ("users.invalidSession", "Session expired or invalid. Please log in again"),
    ("users.usernameExists", "Username or e-mail already exists"),
];

/// Message catalog with `{name}` placeholder substitution
#[derive(Debug, Clone)]
pub struct I18n {
    messages: HashMap<String, String>,
}

impl Default for I18n {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl I18n {
    /// Built-in catalog with entries replaced by a flat JSON object
    ///
    /// Keys absent from `json` keep their built-in text.
    pub fn with_overrides(json: &str) -> Result<Self, serde_json::Error> {
        let overrides: HashMap<String, String> = serde_json::from_str(json)?;
        let mut i18n = Self::default();
        i18n.messages.extend(overrides);
        Ok(i18n)
    }

    /// Translate `key`; unknown keys come back verbatim.
    pub fn t(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Translate `key` and substitute `{name}` placeholders
    ///
    /// A parameter value written as `{some.key}` is itself translated first,
    /// so `ts("globals.messages.notFound", &[("name", "{globals.terms.user}")])`
    /// yields "User not found".
    pub fn ts(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut out = self.t(key);
        for (name, value) in params {
            let value = match value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
                Some(inner) if self.messages.contains_key(inner) => self.t(inner),
                _ => value.to_string(),
            };
            out = out.replace(&format!("{{{}}}", name), &value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate() {
        let i18n = I18n::default();
        assert_eq!(i18n.t("users.invalidLogin"), "Invalid login or password");
        assert_eq!(i18n.t("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_substitution() {
        let i18n = I18n::default();
        assert_eq!(
            i18n.ts("globals.messages.invalidFields", &[("name", "username")]),
            "Invalid fields: username"
        );
    }

    #[test]
    fn test_nested_key_in_param() {
        let i18n = I18n::default();
        assert_eq!(
            i18n.ts("globals.messages.notFound", &[("name", "{globals.terms.user}")]),
            "User not found"
        );
        // Braced values that are not keys stay as they are
        assert_eq!(
            i18n.ts("globals.messages.notFound", &[("name", "{nope}")]),
            "{nope} not found"
        );
    }

    #[test]
    fn test_overrides() {
        let i18n = I18n::with_overrides(r#"{"users.login": "Anmelden"}"#).unwrap();
        assert_eq!(i18n.t("users.login"), "Anmelden");
        assert_eq!(i18n.t("users.invalidRequest"), "Invalid request");
        assert!(I18n::with_overrides("[1, 2]").is_err());
    }
}
