/// Builds the explanation prompt for a snippet.
///
/// The four numbered sections are always present; the language only changes
/// the wording of the first line and the fence tag. The code is inserted verbatim.
pub fn build_prompt(code: &str, language: Option<&str>) -> String {
    let language = language.map(str::trim).filter(|l| !l.is_empty());
    let subject = language.unwrap_or("code");
    let fence_tag = language.unwrap_or("");

    format!(
        "You are an expert code explainer. Analyze the following {subject} and provide a clear, detailed explanation:\n\
         \n\
         1. What does this code do? (High-level overview)\n\
         2. How does it work? (Step-by-step explanation)\n\
         3. Key concepts used\n\
         4. Potential improvements or concerns (if any)\n\
         \n\
         Code to explain:\n\
         ```{fence_tag}\n\
         {code}\n\
         ```\n\
         \n\
         Provide a well-structured explanation that is easy to understand for developers."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_with_language() {
        let prompt = build_prompt("fn main() {}", Some("rust"));
        assert!(prompt.contains("Analyze the following rust and provide"));
        assert!(prompt.contains("```rust\nfn main() {}\n```"));
    }

    #[test]
    fn test_prompt_without_language() {
        let prompt = build_prompt("print(1)", None);
        assert!(prompt.contains("Analyze the following code and provide"));
        assert!(prompt.contains("```\nprint(1)\n```"));
    }

    #[test]
    fn test_blank_language_is_treated_as_absent() {
        assert_eq!(build_prompt("x", Some("  ")), build_prompt("x", None));
    }

    #[test]
    fn test_prompt_always_has_four_sections() {
        for language in [None, Some("python")] {
            let prompt = build_prompt("x = 1", language);
            assert!(prompt.contains("1. What does this code do? (High-level overview)"));
            assert!(prompt.contains("2. How does it work? (Step-by-step explanation)"));
            assert!(prompt.contains("3. Key concepts used"));
            assert!(prompt.contains("4. Potential improvements or concerns (if any)"));
        }
    }

    #[test]
    fn test_code_is_inserted_verbatim() {
        let code = "  line one\n\tline two  \n";
        let prompt = build_prompt(code, Some("text"));
        assert!(prompt.contains(&format!("```text\n{code}\n```")));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            build_prompt("a + b", Some("js")),
            build_prompt("a + b", Some("js"))
        );
    }
}
