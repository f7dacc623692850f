use serde::{Deserialize, Serialize};

use super::Language;

/// 语言检测结果
///
/// `label` 为空字符串表示无法识别，`relevance` 表示证据权重之和。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub label: String,
    pub relevance: u32,
}

impl DetectionResult {
    pub fn unknown() -> Self {
        Self {
            label: String::new(),
            relevance: 0,
        }
    }
}

/// 每种语言的词法特征与权重，顺序与下拉列表一致
///
/// 同分时取靠前的语言，保证检测结果确定。
const LANGUAGE_PATTERNS: [(Language, &[(&str, u32)]); 9] = [
    (
        Language::JavaScript,
        &[
            ("function ", 4),
            ("console.", 4),
            ("require(", 4),
            ("module.exports", 5),
            ("document.", 4),
            ("=>", 3),
            ("===", 3),
            ("const ", 2),
            ("let ", 2),
            ("var ", 1),
            ("async ", 1),
            ("await ", 1),
        ],
    ),
    (
        Language::Python,
        &[
            ("def ", 5),
            ("if __name__", 6),
            ("self.", 4),
            ("elif ", 4),
            ("lambda ", 4),
            ("yield ", 4),
            ("print(", 3),
            ("return ", 3),
            ("import ", 2),
        ],
    ),
    (
        Language::Java,
        &[
            ("public static void main", 6),
            ("public class", 5),
            ("system.out", 5),
            ("import java.", 5),
            ("@override", 5),
            ("implements ", 3),
            ("extends ", 2),
            ("private ", 2),
            ("protected ", 2),
            ("void ", 2),
        ],
    ),
    (
        Language::C,
        &[
            ("#include <", 5),
            ("int main(", 5),
            ("printf(", 4),
            ("scanf(", 4),
            ("malloc(", 4),
            ("free(", 3),
            ("typedef ", 3),
            ("sizeof", 3),
            ("struct ", 2),
            ("void ", 1),
        ],
    ),
    (
        Language::Cpp,
        &[
            ("#include <iostream>", 6),
            ("std::", 5),
            ("using namespace", 5),
            ("cout <<", 5),
            ("cin >>", 5),
            ("template<", 4),
            ("nullptr", 4),
            ("public:", 3),
            ("private:", 3),
            ("delete ", 2),
        ],
    ),
    (
        Language::Csharp,
        &[
            ("console.writeline", 6),
            ("using system", 5),
            ("get; set;", 5),
            ("namespace ", 4),
            ("string[] args", 4),
            ("async task", 4),
            ("readonly ", 3),
            ("public class", 3),
        ],
    ),
    (
        Language::Go,
        &[
            ("package main", 6),
            ("func main()", 5),
            ("go func", 5),
            ("func ", 4),
            ("fmt.", 4),
            (":=", 4),
            ("defer ", 4),
            ("chan ", 4),
            ("import (", 3),
        ],
    ),
    (
        Language::Php,
        &[
            ("<?php", 6),
            ("$this->", 5),
            ("echo ", 4),
            ("public function", 4),
            ("foreach (", 3),
            ("array(", 3),
            ("->", 2),
        ],
    ),
    (
        Language::Sql,
        &[
            ("select ", 5),
            ("insert into", 5),
            ("create table", 5),
            ("delete from", 5),
            ("from ", 4),
            ("group by", 4),
            ("order by", 4),
            ("where ", 3),
            ("join ", 3),
            ("values (", 3),
        ],
    ),
];

/// 启发式语言检测
///
/// 对小写化后的代码做子串加权匹配，返回得分最高的语言标签。
/// 空白输入或没有任何证据时返回 `{ "", 0 }`，检测本身从不报错。
pub fn detect(text: &str) -> DetectionResult {
    if text.trim().is_empty() {
        return DetectionResult::unknown();
    }

    let lowered = text.to_lowercase();
    let mut best: Option<(Language, u32)> = None;

    for (language, patterns) in LANGUAGE_PATTERNS {
        let score: u32 = patterns
            .iter()
            .filter(|(pattern, _)| lowered.contains(pattern))
            .map(|(_, weight)| weight)
            .sum();

        if score > 0 && best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((language, score));
        }
    }

    match best {
        Some((language, relevance)) => DetectionResult {
            label: language.as_str().to_string(),
            relevance,
        },
        None => DetectionResult::unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_empty_input() {
        assert_eq!(detect(""), DetectionResult::unknown());
        assert_eq!(detect("   \n\t  "), DetectionResult::unknown());
    }

    #[test]
    fn test_detect_python_function() {
        let result = detect("def f(x): return x+1");
        assert_eq!(result.label, "python");
        assert!(result.relevance >= 8, "relevance was {}", result.relevance);
    }

    #[test]
    fn test_detect_sql_query() {
        let result = detect("SELECT * FROM t");
        assert_eq!(result.label, "sql");
        assert!(result.relevance >= 8, "relevance was {}", result.relevance);
    }

    #[test]
    fn test_detect_javascript() {
        let result = detect("function greet(name) {\n  console.log('hi ' + name);\n}");
        assert_eq!(result.label, "javascript");
        assert!(result.relevance >= 8);
    }

    #[test]
    fn test_detect_go() {
        let code = "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"hi\")\n}\n";
        let result = detect(code);
        assert_eq!(result.label, "go");
        assert!(result.relevance >= 8);
    }

    #[test]
    fn test_detect_c() {
        let code = "#include <stdio.h>\nint main(void) {\n    printf(\"hi\\n\");\n    return 0;\n}\n";
        let result = detect(code);
        assert_eq!(result.label, "c");
        assert!(result.relevance >= 8);
    }

    #[test]
    fn test_detect_cpp_beats_c() {
        let code = "#include <iostream>\nint main() {\n    std::cout << \"hi\";\n}\n";
        let result = detect(code);
        assert_eq!(result.label, "cpp");
    }

    #[test]
    fn test_detect_java() {
        let code = "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"hi\");\n    }\n}\n";
        let result = detect(code);
        assert_eq!(result.label, "java");
        assert!(result.relevance >= 8);
    }

    #[test]
    fn test_detect_csharp() {
        let code = "using System;\nclass Program {\n    static void Main(string[] args) {\n        Console.WriteLine(\"hi\");\n    }\n}\n";
        let result = detect(code);
        assert_eq!(result.label, "csharp");
    }

    #[test]
    fn test_detect_php() {
        let result = detect("<?php\necho 'hi';\n");
        assert_eq!(result.label, "php");
        assert!(result.relevance >= 8);
    }

    #[test]
    fn test_detect_prose_is_low_confidence() {
        let result = detect("this is just an ordinary sentence about nothing");
        assert!(result.relevance < 8);
    }

    #[test]
    fn test_detect_no_evidence_yields_empty_label() {
        let result = detect("x = 1");
        assert_eq!(result.label, "");
        assert_eq!(result.relevance, 0);
    }

    #[test]
    fn test_detected_label_matches_own_alias_table() {
        let samples = [
            ("def f(x): return x+1", "python"),
            ("SELECT id FROM users WHERE id = 1", "sql"),
            ("package main\nfunc main() { fmt.Println(1) }", "go"),
        ];
        for (code, selected) in samples {
            let result = detect(code);
            assert!(
                super::super::is_match(selected, &result.label),
                "{} should match {}",
                selected,
                result.label
            );
        }
    }
}
