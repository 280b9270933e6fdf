use teloxide::types::{KeyboardButton, KeyboardMarkup, ReplyMarkup};

use crate::quiz::QuizQuestion;

/// One button per option number, so a tap sends a reply the store can grade.
pub(crate) fn options_keyboard(question: &QuizQuestion) -> KeyboardMarkup {
    let row: Vec<KeyboardButton> = (1..=question.options().len())
        .map(|n| KeyboardButton::new(n.to_string()))
        .collect();

    KeyboardMarkup::new(vec![row])
        .resize_keyboard()
        .one_time_keyboard()
}

pub(crate) fn action_keyboard() -> KeyboardMarkup {
    let keyboard = vec![
        vec![KeyboardButton::new("/quiz")],
        vec![
            KeyboardButton::new("/studyplan"),
            KeyboardButton::new("/help"),
        ],
    ];

    KeyboardMarkup::new(keyboard).resize_keyboard()
}

pub(crate) fn remove_keyboard() -> ReplyMarkup {
    ReplyMarkup::kb_remove()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{markdown::RenderFormat, quiz::parse_quiz};

    #[test]
    fn test_options_keyboard_numbers_every_option() {
        let question = parse_quiz(
            "Question: x\n1. a\n2. b\n3. c\n4. d\nAnswer: 1",
            RenderFormat::Plain,
        )
        .unwrap();
        let keyboard = options_keyboard(&question);

        assert_eq!(keyboard.keyboard.len(), 1);
        let labels: Vec<&str> = keyboard.keyboard[0]
            .iter()
            .map(|button| button.text.as_str())
            .collect();
        assert_eq!(labels, ["1", "2", "3", "4"]);
    }
}
