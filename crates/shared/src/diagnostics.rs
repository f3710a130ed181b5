//! Best-effort rewriting of opaque endpoint messages into remediation steps.

use regex::Regex;

const MISSING_SHEET_PATTERN: &str = r"Sheet '(?P<sheet>[^']+)' not found";
const MISSING_SHEET_REMEDIATION: &str = "The tab '${sheet}' was not found. Please check that: \
1) The name of the TAB (at the bottom, not the spreadsheet file name) is exactly '${sheet}'. \
2) The script is bound to the correct spreadsheet.";

/// One `pattern -> remediation` rule. The remediation may reference named
/// capture groups of the pattern as `${name}`.
#[derive(Debug, Clone)]
pub struct DiagnosticRule {
    pattern: Regex,
    remediation: String,
}

impl DiagnosticRule {
    pub fn new(pattern: &str, remediation: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            remediation: remediation.into(),
        })
    }

    pub fn missing_sheet() -> Result<Self, regex::Error> {
        Self::new(MISSING_SHEET_PATTERN, MISSING_SHEET_REMEDIATION)
    }

    pub fn apply(&self, message: &str) -> Option<String> {
        let captures = self.pattern.captures(message)?;
        let mut rewritten = String::new();
        captures.expand(&self.remediation, &mut rewritten);
        Some(rewritten)
    }
}

/// Ordered rule set; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct DiagnosticRules {
    rules: Vec<DiagnosticRule>,
}

impl DiagnosticRules {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: DiagnosticRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the remediation of the first matching rule, or the message
    /// unchanged.
    pub fn rewrite(&self, message: &str) -> String {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(message))
            .unwrap_or_else(|| message.to_string())
    }
}

impl Default for DiagnosticRules {
    fn default() -> Self {
        Self {
            rules: DiagnosticRule::missing_sheet().into_iter().collect(),
        }
    }
}
