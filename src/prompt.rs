use crate::config::Category;
use crate::segment::CodeSegment;
use crate::token_count::count_tokens;
use std::collections::BTreeMap;

/// Shown when nothing is selected instead of an empty document.
pub const EMPTY_PROMPT: &str = "No code selected for analysis.";

/// Simple text statistics for an assembled prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptStats {
    pub characters: usize,
    pub lines: usize,
    pub words: usize,
    pub estimated_tokens: usize,
}

/// Assembles the user request and the selected code segments, grouped by
/// category, into one markdown document.
pub fn build_prompt(user_request: &str, segments: &[CodeSegment]) -> String {
    let mut by_category: BTreeMap<Category, Vec<&CodeSegment>> = BTreeMap::new();
    for segment in segments.iter().filter(|s| s.selected) {
        by_category.entry(segment.category).or_default().push(segment);
    }

    if by_category.is_empty() {
        return EMPTY_PROMPT.to_string();
    }

    let mut prompt = String::new();
    prompt.push_str("# Code Analysis Request\n");
    prompt.push_str(&format!("\n## User Request:\n{}\n", user_request));
    prompt.push_str("\n## Code Structure:\n");

    for (category, segments) in &by_category {
        prompt.push_str(&format!("\n### {}:\n", category.display_name()));
        for segment in segments {
            prompt.push_str(&format!("\n#### File: `{}`\n", segment.file_name()));
            prompt.push_str(&format!("```\n{}\n```\n", segment.content));
        }
    }

    prompt.push_str("\n## Instructions:\n");
    prompt.push_str(
        "Review the provided code and give a clear, structured and detailed \
         answer to the request.\n",
    );
    prompt
}

/// Canned instruction for the docstring generation tool.
pub const DOCSTRING_INSTRUCTIONS: &str =
    "Generate detailed doc comments for every function, type and module in \
     the code. Use the standard documentation format of each language.";

/// Canned instruction for the README generation tool.
pub const README_INSTRUCTIONS: &str = "Generate a complete, professional README.md including:\n\
     - A clear project description\n\
     - Main features\n\
     - Requirements and dependencies\n\
     - Installation instructions\n\
     - A usage guide with examples\n\
     - Project structure\n\
     - Technologies used\n\
     - How to contribute\n\
     - License";

/// Canned instruction for the API documentation tool.
pub const API_DOCS_INSTRUCTIONS: &str = "Generate complete API documentation including:\n\
     - Every available endpoint\n\
     - Supported HTTP methods\n\
     - Parameters (query, body, headers)\n\
     - Request and response formats\n\
     - HTTP status codes\n\
     - Practical usage examples (curl, JavaScript, Python)\n\
     - Authentication requirements\n\
     - Rate limiting and restrictions";

/// Canned instruction for the code analysis tool.
pub const ANALYSIS_INSTRUCTIONS: &str = "Perform a complete, deep analysis of the code including:\n\
     - Overall quality and organization\n\
     - Adherence to good practices and patterns\n\
     - Possible bugs and vulnerabilities\n\
     - Performance optimization opportunities\n\
     - Security issues\n\
     - Maintainability and scalability\n\
     - Test coverage\n\
     - Documentation quality\n\
     - Refactoring suggestions\n\
     - Strengths and weaknesses";

pub fn docstring_prompt(segments: &[CodeSegment]) -> String {
    build_prompt(DOCSTRING_INSTRUCTIONS, segments)
}

pub fn readme_prompt(segments: &[CodeSegment]) -> String {
    build_prompt(README_INSTRUCTIONS, segments)
}

pub fn api_docs_prompt(segments: &[CodeSegment]) -> String {
    build_prompt(API_DOCS_INSTRUCTIONS, segments)
}

pub fn analysis_prompt(segments: &[CodeSegment]) -> String {
    build_prompt(ANALYSIS_INSTRUCTIONS, segments)
}

/// Computes character/line/word counts and the token estimate for `prompt`.
pub fn prompt_stats(prompt: &str) -> PromptStats {
    PromptStats {
        characters: prompt.chars().count(),
        lines: prompt.matches('\n').count() + 1,
        words: prompt.split_whitespace().count(),
        estimated_tokens: count_tokens(prompt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn segment(name: &str, category: Category, content: &str, selected: bool) -> CodeSegment {
        CodeSegment {
            path: PathBuf::from(format!("/project/{}", name)),
            category,
            content: content.to_string(),
            selected,
            token_count: 0,
        }
    }

    #[test]
    fn groups_selected_segments_by_category() {
        let segments = vec![
            segment("views.py", Category::Frontend, "render()", true),
            segment("db.py", Category::Database, "connect()", true),
            segment("api.py", Category::Backend, "serve()", true),
        ];
        let prompt = build_prompt("Refactor this", &segments);

        assert!(prompt.starts_with("# Code Analysis Request"));
        assert!(prompt.contains("## User Request:\nRefactor this"));
        assert!(prompt.contains("### Database:"));
        assert!(prompt.contains("#### File: `db.py`"));
        assert!(prompt.contains("```\nconnect()\n```"));
        assert!(prompt.contains("## Instructions:"));

        // Categories appear in declaration order regardless of add order
        let db = prompt.find("### Database:").unwrap();
        let backend = prompt.find("### Backend:").unwrap();
        let frontend = prompt.find("### Frontend:").unwrap();
        assert!(db < backend && backend < frontend);
    }

    #[test]
    fn unselected_segments_are_excluded() {
        let segments = vec![
            segment("a.py", Category::Backend, "a", true),
            segment("b.py", Category::Backend, "b", false),
        ];
        let prompt = build_prompt("", &segments);

        assert!(prompt.contains("a.py"));
        assert!(!prompt.contains("b.py"));
    }

    #[test]
    fn nothing_selected_yields_placeholder() {
        let segments = vec![segment("a.py", Category::Backend, "a", false)];
        assert_eq!(build_prompt("anything", &segments), EMPTY_PROMPT);
        assert_eq!(build_prompt("anything", &[]), EMPTY_PROMPT);
    }

    #[test]
    fn segments_keep_insertion_order_within_a_category() {
        let segments = vec![
            segment("zeta.py", Category::Backend, "z", true),
            segment("alpha.py", Category::Backend, "a", true),
        ];
        let prompt = build_prompt("", &segments);
        assert!(prompt.find("zeta.py").unwrap() < prompt.find("alpha.py").unwrap());
    }

    #[test]
    fn canned_prompts_wrap_the_same_document() {
        let segments = vec![segment("a.py", Category::Backend, "a", true)];
        let readme = readme_prompt(&segments);
        assert!(readme.contains("README.md"));
        assert!(readme.contains("### Backend:"));

        let docs = docstring_prompt(&segments);
        assert!(docs.contains("doc comments"));

        let api = api_docs_prompt(&segments);
        assert!(api.contains("endpoint"));

        let analysis = analysis_prompt(&segments);
        assert!(analysis.contains("Possible bugs"));
    }

    #[test]
    fn stats_count_characters_lines_and_words() {
        let stats = prompt_stats("one two\nthree");
        assert_eq!(stats.characters, 13);
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.words, 3);
        assert!(stats.estimated_tokens > 0);
    }
}
