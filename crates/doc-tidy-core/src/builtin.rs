//! Builtin Rule Definitions
//!
//! コード内で定義されるビルトイン分類ルール。
//! 設定ファイルで上書き・追加が可能。

/// ビルトイン分類ルール
///
/// ルールは定義順に評価され、最初にマッチしたルールで分類が確定する。
/// 広いパターン（guides等）は必ず後方に置くこと。
pub const BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        category: "instructions",
        pattern: r"(claude|agents|gemini|copilot-instructions)\.md$|instructions?[-._]|\.cursorrules",
        description: "AI assistant instruction files. \
                      Project-level prompts, agent definitions, tool rules. \
                      Classified by filename only, never by content.",
    },
    BuiltinRule {
        category: "architecture",
        pattern: r"(#+\s*)?arch(itecture)?[-._ ]|adr[-_]?[0-9]|(#+\s*)?design[-._ ]",
        description: "Architecture and design documents. \
                      ADRs, system design, component diagrams, data flow.",
    },
    BuiltinRule {
        category: "api",
        pattern: r"(#+\s*)?api[-._ ]|openapi|swagger",
        description: "API reference and endpoint documentation. \
                      REST/GraphQL surfaces, request/response contracts.",
    },
    BuiltinRule {
        category: "features",
        pattern: r"feature[-._]",
        description: "Feature specifications and feature-level design notes.",
    },
    BuiltinRule {
        category: "planning",
        pattern: r"(#+\s*)?(plan(ning)?|roadmap|backlog)[-._ ]",
        description: "Plans, roadmaps, backlogs, milestone notes.",
    },
    BuiltinRule {
        category: "troubleshooting",
        pattern: r"(#+\s*)?(troubleshooting|debug(ging)?|faq)[-._ ]?",
        description: "Troubleshooting guides, FAQs, debugging notes, \
                      known-issue lists.",
    },
    BuiltinRule {
        category: "guides",
        pattern: r"(#+\s*)?(guide|how-?to|tutorial|getting-started|setup)[-._ ]?|.*-guide\.md$",
        description: "How-to guides, tutorials, setup and onboarding docs. \
                      Deliberately broad and therefore listed last.",
    },
];

/// カテゴリ別の配置テンプレート
///
/// `root` はカテゴリにテンプレートがない場合のフォールバック。
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("root", "{aiDocs}/"),
    ("instructions", "{aiDocs}/instructions/"),
    ("architecture", "{aiDocs}/architecture/"),
    ("api", "{aiDocs}/api/"),
    ("features", "{aiDocs}/features/"),
    ("planning", "{aiDocs}/planning/"),
    ("troubleshooting", "{aiDocs}/troubleshooting/"),
    ("guides", "{aiDocs}/guides/"),
];

/// テンプレート内の名前付きパス変数
pub const BUILTIN_PATH_VARIABLES: &[(&str, &str)] = &[("aiDocs", "docs")];

/// 移動対象から常に除外されるファイル（名前またはフルパスの完全一致）
pub const DEFAULT_PROTECTED_FILES: &[&str] = &[
    "README.md",
    "LICENSE.md",
    "CHANGELOG.md",
    "CONTRIBUTING.md",
    "CODE_OF_CONDUCT.md",
    "SECURITY.md",
];

/// コンテンツマッチから除外されるカテゴリ
///
/// instructions系ドキュメントの定型文は多くのドキュメントに現れるため、
/// ファイル名マッチのみで分類する。
pub const DEFAULT_CONTENT_EXCLUDED: &[&str] = &["instructions"];

/// Default directories to exclude from document scans
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    // Build/cache directories
    "node_modules",
    "target",
    "dist",
    "build",
    "vendor",
    "__pycache__",
    // IDE/editor directories
    ".vscode",
    ".idea",
    // CI/CD directories
    ".github",
    ".gitlab",
];

/// ビルトインルール定義
#[derive(Debug, Clone, Copy)]
pub struct BuiltinRule {
    pub category: &'static str,
    pub pattern: &'static str,
    pub description: &'static str,
}
