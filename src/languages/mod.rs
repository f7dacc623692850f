use serde::{Deserialize, Serialize};

pub mod detector;

pub use detector::{detect, DetectionResult};

/// 支持的编程语言枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    JavaScript,
    Python,
    Java,
    C,
    Cpp,
    Csharp,
    Go,
    Php,
    Sql,
}

/// 语言选择顺序，与界面下拉列表一致
pub const ALL_LANGUAGES: [Language; 9] = [
    Language::JavaScript,
    Language::Python,
    Language::Java,
    Language::C,
    Language::Cpp,
    Language::Csharp,
    Language::Go,
    Language::Php,
    Language::Sql,
];

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Csharp => "csharp",
            Language::Go => "go",
            Language::Php => "php",
            Language::Sql => "sql",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Csharp => "C#",
            Language::Go => "Go",
            Language::Php => "PHP",
            Language::Sql => "SQL",
        }
    }

    /// 检测器输出中视为等价的别名集合
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Language::JavaScript => &["javascript", "js", "node"],
            Language::Python => &["python", "py"],
            Language::Java => &["java"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "c++", "hpp", "cc", "hxx"],
            Language::Csharp => &["csharp", "cs", "c#"],
            Language::Go => &["go", "golang"],
            Language::Php => &["php"],
            Language::Sql => &[
                "sql",
                "postgresql",
                "pgsql",
                "postgres",
                "mysql",
                "plsql",
                "tsql",
            ],
        }
    }

    /// 根据任意别名解析语言，大小写不敏感
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        ALL_LANGUAGES
            .into_iter()
            .find(|lang| lang.aliases().contains(&normalized.as_str()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_label(s).ok_or_else(|| format!("unsupported language: {}", s))
    }
}

/// 判断用户声明的语言与检测标签是否匹配
///
/// 未知的声明语言一律返回 false，检测标签先做大小写归一。
pub fn is_match(selected: &str, detected_label: &str) -> bool {
    let Some(language) = Language::from_label(selected) else {
        return false;
    };
    let normalized = detected_label.trim().to_lowercase();
    language.aliases().contains(&normalized.as_str())
}
