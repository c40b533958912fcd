//! Document renderer.
//!
//! Merges the record into an externally supplied Jinja-style text template.
//! The template sees the record as `data` and gets one custom filter,
//! `escape_latex`. PDF compilation and preview rasterization are external
//! collaborators (`compile`, `preview`).

pub mod compile;
pub mod handlers;
pub mod preview;

use minijinja::value::Value;
use minijinja::{context, Environment};

use crate::cv::models::CvRecord;

/// Escapes LaTeX special characters.
///
/// One pass over the original text with a single dispatch per source
/// character, so characters inside a substitution are never re-escaped —
/// in particular a backslash becomes `\textbackslash{}` exactly once.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '\\' => out.push_str(r"\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_latex_filter(value: Value) -> String {
    escape_latex(&value.to_string())
}

/// Renders the record through the template text, producing the generated
/// document source. The record is exposed as `data`.
pub fn render_template(record: &CvRecord, template_text: &str) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_filter("escape_latex", escape_latex_filter);
    env.add_template("cv_template.tex", template_text)?;
    let template = env.get_template("cv_template.tex")?;
    template.render(context! { data => record })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::models::Publication;

    #[test]
    fn test_escape_each_special_exactly_once() {
        assert_eq!(
            escape_latex("100% & co_author {x}"),
            r"100\% \& co\_author \{x\}"
        );
    }

    #[test]
    fn test_escape_backslash_is_not_double_escaped() {
        assert_eq!(escape_latex(r"a\b"), r"a\textbackslash{}b");
        // The braces introduced by the substitution stay untouched.
        assert_eq!(escape_latex(r"\"), r"\textbackslash{}");
    }

    #[test]
    fn test_escape_tilde_caret_hash() {
        assert_eq!(
            escape_latex("~x^y#z"),
            r"\textasciitilde{}x\textasciicircum{}y\#z"
        );
    }

    #[test]
    fn test_escape_leaves_plain_text_alone() {
        assert_eq!(escape_latex("plain text 123"), "plain text 123");
        assert_eq!(escape_latex(""), "");
    }

    #[test]
    fn test_render_exposes_record_as_data() {
        let mut record = CvRecord::default();
        record.personal_info.name = "Ada".to_string();
        let tex = render_template(&record, r"\name{{ '{' }}{{ data.personal_info.name }}{{ '}' }}")
            .unwrap();
        assert_eq!(tex, r"\name{Ada}");
    }

    #[test]
    fn test_render_applies_escape_latex_filter() {
        let mut record = CvRecord::default();
        record.personal_info.name = "100% & co_author".to_string();
        let tex =
            render_template(&record, "{{ data.personal_info.name | escape_latex }}").unwrap();
        assert_eq!(tex, r"100\% \& co\_author");
    }

    #[test]
    fn test_render_iterates_year_buckets() {
        let mut record = CvRecord::default();
        record.publications.by_year.insert(
            2024,
            vec![Publication {
                title: "T".to_string(),
                ..Default::default()
            }],
        );
        let template = "{% for year, pubs in data.publications.by_year | items %}\
                        {{ year }}:{{ pubs | length }}{% endfor %}";
        assert_eq!(render_template(&record, template).unwrap(), "2024:1");
    }

    #[test]
    fn test_render_reports_template_errors() {
        let record = CvRecord::default();
        assert!(render_template(&record, "{% for %}").is_err());
    }
}
