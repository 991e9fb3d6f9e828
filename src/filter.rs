// Filter policy - pure predicates deciding which fields survive extraction.
//
// A policy is an immutable set of boolean options built through a validating
// builder. The three field predicates are independent and side-effect free;
// evaluation order never changes the outcome.

use crate::report::FieldInfo;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use thiserror::Error;

/// Leading marker of library-private identifiers.
pub const PRIVATE_MARKER: char = '_';

// Closed list of primitive-like base types. Unlisted wrappers and generics
// are intentionally not expanded.
const PRIMITIVE_BASE_TYPES: &[&str] = &["int", "double", "num", "bool", "String", "DateTime"];

const ASYNC_WRAPPER: &str = "Future";

// The full primitive closure: each base type T plus T?, Future<T> and
// Future<T?>. Expanded once, not per field.
static PRIMITIVE_CLOSURE: Lazy<HashSet<String>> = Lazy::new(|| {
    let mut closure = HashSet::new();
    for base in PRIMITIVE_BASE_TYPES {
        closure.insert((*base).to_string());
        closure.insert(format!("{base}?"));
        closure.insert(format!("{ASYNC_WRAPPER}<{base}>"));
        closure.insert(format!("{ASYNC_WRAPPER}<{base}?>"));
    }
    closure
});

/// Rejected policy configurations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("--final-only and --no-final are mutually exclusive")]
    ConflictingFinality,
}

/// Immutable filter configuration. Construct through [`FilterPolicy::builder`];
/// conflicting options are rejected at build time, never reconciled silently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPolicy {
    private_only: bool,
    no_primitives: bool,
    final_only: bool,
    no_final: bool,
    no_classes: bool,
    no_imports: bool,
    markdown: bool,
}

impl FilterPolicy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    pub fn private_only(&self) -> bool {
        self.private_only
    }

    pub fn no_primitives(&self) -> bool {
        self.no_primitives
    }

    pub fn final_only(&self) -> bool {
        self.final_only
    }

    pub fn no_final(&self) -> bool {
        self.no_final
    }

    /// Suppress class-field extraction entirely.
    pub fn no_classes(&self) -> bool {
        self.no_classes
    }

    /// Suppress import extraction entirely.
    pub fn no_imports(&self) -> bool {
        self.no_imports
    }

    /// Presentation-boundary option: render Markdown instead of plain text.
    /// Not consumed by extraction.
    pub fn markdown(&self) -> bool {
        self.markdown
    }

    /// A field is kept iff all three predicates pass.
    pub fn keeps_field(&self, field: &FieldInfo, is_final: bool) -> bool {
        self.passes_visibility(&field.name)
            && self.passes_finality(is_final)
            && self.passes_primitiveness(&field.ty)
    }

    pub fn passes_visibility(&self, name: &str) -> bool {
        !self.private_only || name.starts_with(PRIVATE_MARKER)
    }

    /// The finality flag comes from the declaration, never inferred here.
    pub fn passes_finality(&self, is_final: bool) -> bool {
        (!self.final_only || is_final) && (!self.no_final || !is_final)
    }

    pub fn passes_primitiveness(&self, ty: &str) -> bool {
        !self.no_primitives || !PRIMITIVE_CLOSURE.contains(ty)
    }

    /// CLI-style flag names of the enabled options. Display metadata only.
    pub fn active_flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.private_only {
            flags.push("--private-only");
        }
        if self.no_primitives {
            flags.push("--no-primitives");
        }
        if self.final_only {
            flags.push("--final-only");
        }
        if self.no_final {
            flags.push("--no-final");
        }
        if self.no_classes {
            flags.push("--no-classes");
        }
        if self.no_imports {
            flags.push("--no-imports");
        }
        if self.markdown {
            flags.push("--markdown");
        }
        flags
    }
}

/// Builder for [`FilterPolicy`] with chainable setters.
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    private_only: bool,
    no_primitives: bool,
    final_only: bool,
    no_final: bool,
    no_classes: bool,
    no_imports: bool,
    markdown: bool,
}

impl PolicyBuilder {
    pub fn private_only(mut self, enabled: bool) -> Self {
        self.private_only = enabled;
        self
    }

    pub fn no_primitives(mut self, enabled: bool) -> Self {
        self.no_primitives = enabled;
        self
    }

    pub fn final_only(mut self, enabled: bool) -> Self {
        self.final_only = enabled;
        self
    }

    pub fn no_final(mut self, enabled: bool) -> Self {
        self.no_final = enabled;
        self
    }

    pub fn no_classes(mut self, enabled: bool) -> Self {
        self.no_classes = enabled;
        self
    }

    pub fn no_imports(mut self, enabled: bool) -> Self {
        self.no_imports = enabled;
        self
    }

    pub fn markdown(mut self, enabled: bool) -> Self {
        self.markdown = enabled;
        self
    }

    pub fn build(self) -> Result<FilterPolicy, PolicyError> {
        if self.final_only && self.no_final {
            return Err(PolicyError::ConflictingFinality);
        }
        Ok(FilterPolicy {
            private_only: self.private_only,
            no_primitives: self.no_primitives,
            final_only: self.final_only,
            no_final: self.no_final,
            no_classes: self.no_classes,
            no_imports: self.no_imports,
            markdown: self.markdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_keeps_everything() {
        let policy = FilterPolicy::default();
        assert!(policy.keeps_field(&FieldInfo::new("id", "int"), true));
        assert!(policy.keeps_field(&FieldInfo::new("_token", "String"), false));
        assert!(policy.keeps_field(&FieldInfo::untyped("anything"), false));
    }

    #[test]
    fn test_private_only_keeps_exactly_private_names() {
        let policy = FilterPolicy::builder().private_only(true).build().unwrap();
        assert!(policy.keeps_field(&FieldInfo::new("_token", "String"), false));
        assert!(policy.keeps_field(&FieldInfo::new("_", "String"), false));
        assert!(!policy.keeps_field(&FieldInfo::new("token", "String"), false));
        assert!(!policy.keeps_field(&FieldInfo::new("token_", "String"), false));
    }

    #[test]
    fn test_final_only_and_no_final() {
        let final_only = FilterPolicy::builder().final_only(true).build().unwrap();
        assert!(final_only.passes_finality(true));
        assert!(!final_only.passes_finality(false));

        let no_final = FilterPolicy::builder().no_final(true).build().unwrap();
        assert!(!no_final.passes_finality(true));
        assert!(no_final.passes_finality(false));
    }

    #[test]
    fn test_conflicting_finality_rejected_for_every_other_combination() {
        // The conflict must fail regardless of how the other options are set.
        for bits in 0..32u8 {
            let result = FilterPolicy::builder()
                .private_only(bits & 1 != 0)
                .no_primitives(bits & 2 != 0)
                .no_classes(bits & 4 != 0)
                .no_imports(bits & 8 != 0)
                .markdown(bits & 16 != 0)
                .final_only(true)
                .no_final(true)
                .build();
            assert_eq!(
                result,
                Err(PolicyError::ConflictingFinality),
                "combination {:#07b} must be rejected",
                bits
            );
        }
    }

    #[test]
    fn test_primitive_closure_membership() {
        let policy = FilterPolicy::builder().no_primitives(true).build().unwrap();
        for ty in ["int", "double", "num", "bool", "String", "DateTime"] {
            assert!(!policy.passes_primitiveness(ty), "{ty} is primitive");
            assert!(
                !policy.passes_primitiveness(&format!("{ty}?")),
                "{ty}? is primitive"
            );
            assert!(
                !policy.passes_primitiveness(&format!("Future<{ty}>")),
                "Future<{ty}> is primitive"
            );
            assert!(
                !policy.passes_primitiveness(&format!("Future<{ty}?>")),
                "Future<{ty}?> is primitive"
            );
        }
        assert!(policy.passes_primitiveness("User"));
        assert!(policy.passes_primitiveness("dynamic"));
        assert!(policy.passes_primitiveness("List<int>"));
        assert!(policy.passes_primitiveness("Stream<int>"));
        assert!(policy.passes_primitiveness("Future<User>"));
    }

    #[test]
    fn test_predicates_are_commutative() {
        // All orderings of the three predicates agree with keeps_field.
        let policy = FilterPolicy::builder()
            .private_only(true)
            .no_primitives(true)
            .no_final(true)
            .build()
            .unwrap();
        let cases = [
            (FieldInfo::new("_id", "int"), false),
            (FieldInfo::new("_user", "User"), false),
            (FieldInfo::new("_user", "User"), true),
            (FieldInfo::new("user", "User"), false),
        ];
        for (field, is_final) in &cases {
            let a = policy.passes_visibility(&field.name);
            let b = policy.passes_finality(*is_final);
            let c = policy.passes_primitiveness(&field.ty);
            let expected = policy.keeps_field(field, *is_final);
            assert_eq!(a && b && c, expected);
            assert_eq!(c && a && b, expected);
            assert_eq!(b && c && a, expected);
        }
    }

    #[test]
    fn test_active_flags_reports_enabled_options() {
        let policy = FilterPolicy::builder()
            .private_only(true)
            .markdown(true)
            .build()
            .unwrap();
        assert_eq!(policy.active_flags(), vec!["--private-only", "--markdown"]);
        assert!(FilterPolicy::default().active_flags().is_empty());
    }
}
