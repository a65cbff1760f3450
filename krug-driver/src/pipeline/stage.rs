//! Remote stages and their routes.

use std::{borrow::Cow, fmt};

/// A semantic resolution pass run over the scoped module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemaPass {
    Type,
    Symbol,
}

impl SemaPass {
    /// Every pass, in the order they run.
    pub const ALL: [SemaPass; 2] = [SemaPass::Type, SemaPass::Symbol];

    pub fn name(&self) -> &'static str {
        match self {
            SemaPass::Type => "type",
            SemaPass::Symbol => "symbol",
        }
    }
}

/// One remote operation of the compilation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Lex,
    Parse,
    BuildIr,
    BuildScope,
    Resolve(SemaPass),
    Generate,
}

impl Stage {
    /// Route on the compiler service, e.g. `/front/lex`.
    pub fn route(&self) -> Cow<'static, str> {
        match self {
            Stage::Lex => Cow::Borrowed("/front/lex"),
            Stage::Parse => Cow::Borrowed("/front/parse"),
            Stage::BuildIr => Cow::Borrowed("/ir/build"),
            Stage::BuildScope => Cow::Borrowed("/mid/build_scope"),
            Stage::Resolve(pass) => Cow::Owned(format!("/mid/resolve/{}", pass.name())),
            Stage::Generate => Cow::Borrowed("/back/gen"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::BuildIr => "build-ir",
            Stage::BuildScope => "build-scope",
            Stage::Resolve(SemaPass::Type) => "resolve-type",
            Stage::Resolve(SemaPass::Symbol) => "resolve-symbol",
            Stage::Generate => "generate",
        }
    }

    /// Whether the stage runs once per source file rather than once per program.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Stage::Lex | Stage::Parse)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes() {
        assert_eq!(Stage::Lex.route(), "/front/lex");
        assert_eq!(Stage::Parse.route(), "/front/parse");
        assert_eq!(Stage::BuildIr.route(), "/ir/build");
        assert_eq!(Stage::BuildScope.route(), "/mid/build_scope");
        assert_eq!(Stage::Resolve(SemaPass::Type).route(), "/mid/resolve/type");
        assert_eq!(Stage::Resolve(SemaPass::Symbol).route(), "/mid/resolve/symbol");
        assert_eq!(Stage::Generate.route(), "/back/gen");
    }

    #[test]
    fn test_pass_order() {
        assert_eq!(SemaPass::ALL, [SemaPass::Type, SemaPass::Symbol]);
    }

    #[test]
    fn test_per_file_stages() {
        assert!(Stage::Lex.is_per_file());
        assert!(Stage::Parse.is_per_file());
        assert!(!Stage::BuildIr.is_per_file());
        assert!(!Stage::Generate.is_per_file());
    }

    #[test]
    fn test_display() {
        assert_eq!(Stage::Resolve(SemaPass::Symbol).to_string(), "resolve-symbol");
    }
}
