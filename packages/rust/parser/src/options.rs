//! Lettered option extraction.
//!
//! Every `A.`..`D.` marker (plus trailing whitespace) starts an option whose
//! content runs up to the next marker or the end of the line.

use std::sync::LazyLock;

use regex::Regex;

use quizbank_shared::QuestionOption;

/// Matches an option marker and the whitespace that follows it.
static OPTION_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-D])\.\s*").expect("option marker regex"));

/// Extract all options on a line, left to right.
///
/// Markers with nothing between them still yield an option with empty content.
pub fn scan_options(line: &str) -> Vec<QuestionOption> {
    let markers: Vec<_> = OPTION_MARKER_RE.captures_iter(line).collect();

    markers
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let label = caps.get(1)?.as_str();
            let end = markers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(line.len(), |m| m.start());

            Some(QuestionOption::new(label, line[whole.end()..end].trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(options: &[QuestionOption]) -> Vec<(&str, &str)> {
        options
            .iter()
            .map(|o| (o.label.as_str(), o.content.as_str()))
            .collect()
    }

    #[test]
    fn inline_options() {
        let options = scan_options("A. 铜 B. 铁 C. 云母 D. 银");
        assert_eq!(
            pairs(&options),
            vec![("A", "铜"), ("B", "铁"), ("C", "云母"), ("D", "银")]
        );
    }

    #[test]
    fn single_option_per_line() {
        assert_eq!(pairs(&scan_options("C. 取向极化")), vec![("C", "取向极化")]);
    }

    #[test]
    fn no_space_after_marker() {
        assert_eq!(
            pairs(&scan_options("A.电子极化B.离子极化")),
            vec![("A", "电子极化"), ("B", "离子极化")]
        );
    }

    #[test]
    fn adjacent_markers_keep_empty_option() {
        assert_eq!(
            pairs(&scan_options("A. B. 铁")),
            vec![("A", ""), ("B", "铁")]
        );
    }

    #[test]
    fn text_before_first_marker_is_dropped() {
        assert_eq!(
            pairs(&scan_options("选项如下 A. 是 B. 否")),
            vec![("A", "是"), ("B", "否")]
        );
    }

    #[test]
    fn no_markers() {
        assert!(scan_options("这一行没有选项").is_empty());
        assert!(scan_options("E. 超出范围").is_empty());
        assert!(scan_options("a. 小写").is_empty());
    }

    #[test]
    fn content_spans_partition_the_line() {
        let line = "A. 1 B. 2 C. 3";
        let options = scan_options(line);
        assert_eq!(options.len(), 3);
        let rebuilt: String = options
            .iter()
            .map(|o| format!("{}. {}", o.label, o.content))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rebuilt, line);
    }
}
