//! Maps typed input lines to app actions.

use client_core::{CharacterForm, UiAction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Action(UiAction),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ConsoleCommand {
    /// Game input has to wait while a y/n question is open; `help` and
    /// `quit` never do.
    pub fn waits_for_confirm(&self) -> bool {
        matches!(self, ConsoleCommand::Action(_) | ConsoleCommand::Unknown(_))
    }
}

pub const HELP: &str = "\
commands:
  new                              start a new game
  load                             resume your saved character
  create <name>, <class>, <ancestry>
                                   submit the character form
  roll | ability | interact        game actions
  character | rules | menu         information and navigation
  back | ok                        host back / main button
  quit";

pub fn parse_command(line: &str) -> ConsoleCommand {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    let action = match word.to_ascii_lowercase().as_str() {
        "" => return ConsoleCommand::Empty,
        "help" | "?" => return ConsoleCommand::Help,
        "quit" | "exit" => return ConsoleCommand::Quit,
        "new" => UiAction::StartNewGame,
        "load" => UiAction::LoadGame,
        "character" | "char" => UiAction::ShowCharacter,
        "rules" => UiAction::ShowRules,
        "menu" => UiAction::ShowMainMenu,
        "create" => UiAction::SubmitCharacter(parse_form(rest)),
        "roll" => UiAction::RollDice,
        "ability" => UiAction::UseAbility,
        "interact" => UiAction::Interact,
        "back" => UiAction::BackButton,
        "ok" | "main" => UiAction::MainButton,
        other => return ConsoleCommand::Unknown(other.to_string()),
    };
    ConsoleCommand::Action(action)
}

/// Comma-separated `name, class, ancestry`; missing fields stay empty so the
/// app's own validation reports them.
fn parse_form(rest: &str) -> CharacterForm {
    let mut fields = rest.splitn(3, ',').map(str::trim);
    CharacterForm::new(
        fields.next().unwrap_or_default(),
        fields.next().unwrap_or_default(),
        fields.next().unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_words_to_actions_case_insensitively() {
        assert_eq!(
            parse_command("  ROLL "),
            ConsoleCommand::Action(UiAction::RollDice)
        );
        assert_eq!(
            parse_command("back"),
            ConsoleCommand::Action(UiAction::BackButton)
        );
        assert_eq!(parse_command("exit"), ConsoleCommand::Quit);
        assert_eq!(parse_command(""), ConsoleCommand::Empty);
        assert_eq!(
            parse_command("dance wildly"),
            ConsoleCommand::Unknown("dance".to_string())
        );
    }

    #[test]
    fn quit_and_help_are_not_held_back_by_an_open_question() {
        assert!(!parse_command("quit").waits_for_confirm());
        assert!(!parse_command("help").waits_for_confirm());
        assert!(!parse_command("").waits_for_confirm());
        assert!(parse_command("roll").waits_for_confirm());
        assert!(parse_command("maybe").waits_for_confirm());
    }

    #[test]
    fn create_splits_form_fields_on_commas() {
        assert_eq!(
            parse_command("create Aria Windrunner, ranger , elf"),
            ConsoleCommand::Action(UiAction::SubmitCharacter(CharacterForm::new(
                "Aria Windrunner",
                "ranger",
                "elf"
            )))
        );
    }

    #[test]
    fn create_with_missing_fields_leaves_them_empty() {
        assert_eq!(
            parse_command("create Aria"),
            ConsoleCommand::Action(UiAction::SubmitCharacter(CharacterForm::new(
                "Aria", "", ""
            )))
        );
    }
}
