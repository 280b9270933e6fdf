use std::borrow::Cow;

use teloxide::types::ParseMode;

use crate::quiz::{AnswerOutcome, QuizQuestion};

/// Longest text Telegram accepts in one message, in UTF-16 code units.
pub const MESSAGE_LIMIT: usize = 4096;

/// Markup dialect of the destination chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    Plain,
    #[default]
    MarkdownV2,
    Html,
}

impl RenderFormat {
    /// Escapes markup control characters so they display literally.
    pub fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            RenderFormat::Plain => Cow::Borrowed(text),
            RenderFormat::MarkdownV2 => escape_with(text, markdown_v2_escape),
            RenderFormat::Html => escape_with(text, html_escape),
        }
    }

    pub fn parse_mode(&self) -> Option<ParseMode> {
        match self {
            RenderFormat::Plain => None,
            RenderFormat::MarkdownV2 => Some(ParseMode::MarkdownV2),
            RenderFormat::Html => Some(ParseMode::Html),
        }
    }

    fn bold(&self, escaped: &str) -> String {
        match self {
            RenderFormat::Plain => escaped.to_owned(),
            RenderFormat::MarkdownV2 => format!("*{escaped}*"),
            RenderFormat::Html => format!("<b>{escaped}</b>"),
        }
    }
}

fn markdown_v2_escape(c: char) -> Option<&'static str> {
    Some(match c {
        '\\' => "\\\\",
        '_' => "\\_",
        '*' => "\\*",
        '[' => "\\[",
        ']' => "\\]",
        '(' => "\\(",
        ')' => "\\)",
        '~' => "\\~",
        '`' => "\\`",
        '>' => "\\>",
        '#' => "\\#",
        '+' => "\\+",
        '-' => "\\-",
        '=' => "\\=",
        '|' => "\\|",
        '{' => "\\{",
        '}' => "\\}",
        '.' => "\\.",
        '!' => "\\!",
        _ => return None,
    })
}

fn html_escape(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    }
}

fn escape_with(text: &str, rule: fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    if !text.chars().any(|c| rule(c).is_some()) {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match rule(c) {
            Some(escaped) => result.push_str(escaped),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Message body for a freshly started quiz.
///
/// The question's text and options are expected to be escaped for `format`
/// already (the parser does this); only the surrounding frame is escaped here.
pub fn render_question(question: &QuizQuestion, format: RenderFormat) -> String {
    let mut text = format.bold(&format.escape("🧠 Quiz Time!"));
    text.push_str("\n\n");
    text.push_str(question.text());
    text.push_str("\n\n");

    for (i, option) in question.options().iter().enumerate() {
        text.push_str(&format.escape(&format!("{}. ", i + 1)));
        text.push_str(option);
        text.push('\n');
    }

    text.push('\n');
    text.push_str(&format.escape("Reply with the correct option number!"));
    text
}

/// Feedback for a graded answer. `correct_option_text` is already escaped.
pub fn render_outcome(outcome: &AnswerOutcome, format: RenderFormat) -> String {
    if outcome.correct {
        format.escape("✅ Correct! Well done.").into_owned()
    } else {
        format!(
            "{}{}",
            format.escape("❌ Incorrect. The correct answer was: "),
            format.bold(&outcome.correct_option_text)
        )
    }
}

/// Splits `text` into pieces of at most `limit` UTF-16 code units.
///
/// Cuts after the last newline that fits, or mid-line when a single line is
/// too long. Blank pieces are dropped.
pub fn split_message(text: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let mut units = 0;
        let mut end = rest.len();
        for (idx, c) in rest.char_indices() {
            units += c.len_utf16();
            if units > limit {
                end = idx;
                break;
            }
        }

        let cut = if end == rest.len() {
            end
        } else {
            match rest[..end].rfind('\n') {
                Some(newline) if newline > 0 => newline + 1,
                // a single char wider than `limit` still has to move forward
                _ if end == 0 => rest.chars().next().map_or(rest.len(), char::len_utf8),
                _ => end,
            }
        };

        let chunk = rest[..cut].trim_end();
        if !chunk.trim_start().is_empty() {
            chunks.push(chunk);
        }
        rest = &rest[cut..];
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::parse_quiz;

    #[test]
    fn test_escape_markdown_v2() {
        let escaped = RenderFormat::MarkdownV2.escape("print(2 ** 3) -> 8. Done!");
        assert_eq!(escaped, "print\\(2 \\*\\* 3\\) \\-\\> 8\\. Done\\!");
    }

    #[test]
    fn test_escape_markdown_v2_backslash_and_backtick() {
        assert_eq!(
            RenderFormat::MarkdownV2.escape(r"C:\temp uses `dir`"),
            r"C:\\temp uses \`dir\`"
        );
    }

    #[test]
    fn test_escape_borrows_when_clean() {
        assert!(matches!(
            RenderFormat::MarkdownV2.escape("plain words"),
            Cow::Borrowed(_)
        ));
        assert!(matches!(RenderFormat::Plain.escape("a_b*c"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            RenderFormat::Html.escape("a < b && c > d"),
            "a &lt; b &amp;&amp; c &gt; d"
        );
    }

    #[test]
    fn test_render_question_markdown() {
        let question = parse_quiz(
            "Question: What is 2 ** 3?\n1. 6\n2. 8\n3. 9\n4. 2.5\nAnswer: 2",
            RenderFormat::MarkdownV2,
        )
        .unwrap();
        let text = render_question(&question, RenderFormat::MarkdownV2);

        assert!(text.starts_with("*🧠 Quiz Time\\!*\n\nWhat is 2 \\*\\* 3?\n\n"));
        assert!(text.contains("1\\. 6\n2\\. 8\n3\\. 9\n4\\. 2\\.5\n"));
        assert!(text.ends_with("Reply with the correct option number\\!"));
    }

    #[test]
    fn test_render_outcome() {
        let outcome = AnswerOutcome {
            correct: false,
            selected_index: 0,
            correct_index: 2,
            correct_option_text: "def".into(),
        };
        assert_eq!(
            render_outcome(&outcome, RenderFormat::Html),
            "❌ Incorrect. The correct answer was: <b>def</b>"
        );

        let outcome = AnswerOutcome {
            correct: true,
            ..outcome
        };
        assert_eq!(
            render_outcome(&outcome, RenderFormat::MarkdownV2),
            "✅ Correct\\! Well done\\."
        );
    }

    #[test]
    fn test_split_message_short_text() {
        assert_eq!(split_message("study plan", MESSAGE_LIMIT), ["study plan"]);
        assert!(split_message("  \n ", MESSAGE_LIMIT).is_empty());
    }

    #[test]
    fn test_split_message_prefers_newlines() {
        let chunks = split_message("week one\nweek two\nweek three", 18);
        assert_eq!(chunks, ["week one\nweek two", "week three"]);
    }

    #[test]
    fn test_split_message_hard_cut() {
        let text = "a".repeat(MESSAGE_LIMIT * 2 + 10);
        let chunks = split_message(&text, MESSAGE_LIMIT);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|chunk| chunk.len() <= MESSAGE_LIMIT));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_message_counts_utf16() {
        // each emoji is two UTF-16 code units
        let chunks = split_message("🧠🧠🧠", 4);
        assert_eq!(chunks, ["🧠🧠", "🧠"]);

        assert_eq!(split_message("🧠", 1), ["🧠"]);
    }
}
