use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Severity;

/// Diagnostic categories that can be enabled per compilation.
///
/// Mirrors the convention that most checks are off unless the caller
/// explicitly asks for them: a category absent from the options map means the
/// corresponding pass does not run at all, not merely that its output is
/// silenced.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    /// Lexical and syntax errors. Always on; listed so diagnostics can carry
    /// a category uniformly.
    Syntax,
    /// Unresolved names and other structural semantic errors. Always on.
    Semantic,
    /// Definite-null dereference ("can only be null").
    NullReference,
    /// `== null` check on a value known to be non-null.
    RedundantNullCheck,
    /// String literal without a `//$NON-NLS-<n>$` tag, and unnecessary tags.
    NonExternalizedString,
    /// Superinterface already implied by the rest of the `implements` list.
    RedundantSuperinterface,
    /// `@param`/`@throws` tags that match nothing in the signature.
    UnexpectedJavadocTag,
    /// Parameters or declared exceptions lacking a javadoc tag.
    MissingJavadocTag,
    /// Field read without an explicit `this.` qualifier.
    UnqualifiedFieldAccess,
    /// Statements no execution path reaches.
    UnreachableCode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckSeverity {
    Ignore,
    Warning,
    Error,
}

impl CheckSeverity {
    pub fn as_severity(self) -> Option<Severity> {
        match self {
            CheckSeverity::Ignore => None,
            CheckSeverity::Warning => Some(Severity::Warning),
            CheckSeverity::Error => Some(Severity::Error),
        }
    }
}

/// Per-compilation configuration: a flat category -> severity map plus a few
/// boolean toggles. Passed explicitly into the compilation entry point; there
/// is no ambient global configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    categories: BTreeMap<DiagnosticCategory, CheckSeverity>,
    /// Parse `/** */` and `///` comments into javadoc structure and run the
    /// tag cross-reference checks.
    pub doc_comment_support: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            categories: BTreeMap::new(),
            doc_comment_support: false,
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: DiagnosticCategory, severity: CheckSeverity) -> &mut Self {
        if severity == CheckSeverity::Ignore {
            self.categories.remove(&category);
        } else {
            self.categories.insert(category, severity);
        }
        self
    }

    pub fn with(mut self, category: DiagnosticCategory, severity: CheckSeverity) -> Self {
        self.set(category, severity);
        self
    }

    /// Severity for an opt-in category, or `None` when the pass should not
    /// run. Syntax and semantic errors are unconditional.
    pub fn severity(&self, category: DiagnosticCategory) -> Option<Severity> {
        match category {
            DiagnosticCategory::Syntax | DiagnosticCategory::Semantic => Some(Severity::Error),
            _ => self
                .categories
                .get(&category)
                .copied()
                .and_then(CheckSeverity::as_severity),
        }
    }

    pub fn is_enabled(&self, category: DiagnosticCategory) -> bool {
        self.severity(category).is_some()
    }
}
