//! Line-based answers for the controlled player.
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use werewolf_core::{Awaiting, NightAction, NightActionKind, PlayerId, Role, SessionView, Speech};
use werewolf_runtime::{InputProvider, Prompt, Result, RuntimeError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("nothing entered")]
    Empty,

    #[error("no living player called {0:?}")]
    UnknownPlayer(String),

    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("unknown role {0:?}")]
    UnknownRole(String),
}

/// Reads answers from stdin, one line per answer.
pub struct StdinInputProvider {
    terminal: Mutex<Terminal>,
}

struct Terminal {
    lines: Lines<BufReader<Stdin>>,
    /// Last roll call printed. Re-asks of the same prompt skip it.
    roll_call: Option<String>,
}

impl StdinInputProvider {
    pub fn new() -> Self {
        Self {
            terminal: Mutex::new(Terminal {
                lines: BufReader::new(tokio::io::stdin()).lines(),
                roll_call: None,
            }),
        }
    }

    async fn ask<T>(
        &self,
        prompt: &Prompt<'_>,
        question: &str,
        parse: impl Fn(&str) -> std::result::Result<T, InputError> + Send,
    ) -> Result<T> {
        let mut terminal = self.terminal.lock().await;
        let alive = roll_call(&prompt.view, prompt.player());
        if let Some(line) = fresh(&mut terminal.roll_call, alive) {
            println!("{line}");
        }
        loop {
            println!("{question}");
            let line = terminal
                .lines
                .next_line()
                .await
                .map_err(|_| RuntimeError::InputChannelClosed)?
                .ok_or(RuntimeError::InputChannelClosed)?;
            match parse(line.trim()) {
                Ok(answer) => return Ok(answer),
                Err(err) => println!("  {err}"),
            }
        }
    }
}

impl Default for StdinInputProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputProvider for StdinInputProvider {
    async fn night_action(&self, prompt: &Prompt<'_>) -> Result<NightAction> {
        let Awaiting::NightAction {
            role,
            kinds,
            kill_target,
            ..
        } = &prompt.awaiting
        else {
            return Ok(NightAction::Pass);
        };

        let mut question = format!("You are the {role}.");
        if let Some(victim) = kill_target {
            question.push_str(&format!(" The pack chose {}.", name_of(&prompt.view, *victim)));
        }
        let verbs = kinds
            .iter()
            .map(|kind| kind.as_ref())
            .collect::<Vec<_>>()
            .join(" | ");
        question.push_str(&format!(" [{verbs}] <player>, or `pass`:"));

        self.ask(prompt, &question, |line| {
            parse_night(line, kinds, &prompt.view)
        })
        .await
    }

    async fn speech(&self, prompt: &Prompt<'_>) -> Result<Speech> {
        self.ask(
            prompt,
            "Your speech (`/claim <role>` and `/accuse <player>` may lead):",
            |line| parse_speech(line, &prompt.view),
        )
        .await
    }

    async fn vote(&self, prompt: &Prompt<'_>) -> Result<PlayerId> {
        self.ask(prompt, "Vote for:", |line| parse_target(line, &prompt.view))
            .await
    }

    async fn last_stand(&self, prompt: &Prompt<'_>) -> Result<PlayerId> {
        self.ask(prompt, "You are dying. Shoot:", |line| {
            parse_target(line, &prompt.view)
        })
        .await
    }

    async fn rejected(&self, _prompt: &Prompt<'_>, reason: &str) {
        println!("  rejected: {reason}");
    }
}

fn roll_call(view: &SessionView, me: PlayerId) -> String {
    let others = view
        .alive_others(me)
        .map(|player| format!("{} ({})", player.name, player.id.0))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Alive: {others}")
}

/// `Some(line)` only when it differs from what was printed last.
fn fresh(last: &mut Option<String>, line: String) -> Option<String> {
    if last.as_deref() == Some(line.as_str()) {
        return None;
    }
    *last = Some(line.clone());
    Some(line)
}

fn name_of(view: &SessionView, id: PlayerId) -> String {
    view.player(id)
        .map_or_else(|| id.to_string(), |player| player.name.clone())
}

/// A living player by id (`3` or `#3`) or by name.
pub fn parse_target(input: &str, view: &SessionView) -> std::result::Result<PlayerId, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    let by_id = input
        .trim_start_matches('#')
        .parse::<u32>()
        .ok()
        .map(PlayerId);
    view.players
        .iter()
        .filter(|player| player.alive)
        .find(|player| Some(player.id) == by_id || player.name.eq_ignore_ascii_case(input))
        .map(|player| player.id)
        .ok_or_else(|| InputError::UnknownPlayer(input.to_owned()))
}

/// `pass`, `<kind> <player>`, or a bare player when only one kind is open.
pub fn parse_night(
    input: &str,
    kinds: &[NightActionKind],
    view: &SessionView,
) -> std::result::Result<NightAction, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty);
    }
    if input.eq_ignore_ascii_case("pass") {
        return Ok(NightAction::Pass);
    }

    let (verb, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
    if let Some(kind) = kinds
        .iter()
        .find(|kind| kind.as_ref().eq_ignore_ascii_case(verb))
    {
        let target = parse_target(rest, view)?;
        return Ok(NightAction::new(*kind, target));
    }
    match kinds {
        [kind] => Ok(NightAction::new(*kind, parse_target(input, view)?)),
        _ => Err(InputError::UnknownAction(verb.to_owned())),
    }
}

/// Free text, optionally led by `/claim <role>` and `/accuse <player>`.
pub fn parse_speech(input: &str, view: &SessionView) -> std::result::Result<Speech, InputError> {
    let mut speech = Speech::silent();
    let mut rest = input.trim();
    loop {
        let (command, after) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let (argument, tail) = after
            .trim_start()
            .split_once(char::is_whitespace)
            .unwrap_or((after.trim_start(), ""));
        match command {
            "/claim" => {
                let role = argument
                    .parse::<Role>()
                    .map_err(|_| InputError::UnknownRole(argument.to_owned()))?;
                speech = speech.declaring(role);
            }
            "/accuse" => speech = speech.accusing(parse_target(argument, view)?),
            _ => break,
        }
        rest = tail.trim_start();
    }
    speech.text = rest.to_owned();
    Ok(speech)
}

#[cfg(test)]
mod tests {
    use werewolf_core::{GameSession, RoleChoice, SessionSetup};

    use super::*;

    fn view() -> SessionView {
        let mut session = GameSession::default();
        session
            .start(SessionSetup::new(9, RoleChoice::Random, 1))
            .unwrap();
        session.view()
    }

    #[test]
    fn roll_call_is_printed_once_per_prompt() {
        let view = view();
        let mut last = None;

        let first = roll_call(&view, PlayerId(1));
        assert_eq!(fresh(&mut last, first.clone()), Some(first.clone()));
        assert_eq!(fresh(&mut last, first.clone()), None);

        let other_seat = roll_call(&view, PlayerId(2));
        assert_ne!(other_seat, first);
        assert_eq!(fresh(&mut last, other_seat.clone()), Some(other_seat));
    }

    #[test]
    fn targets_by_id_or_name() {
        let view = view();
        assert_eq!(parse_target("3", &view), Ok(PlayerId(3)));
        assert_eq!(parse_target("#4", &view), Ok(PlayerId(4)));
        assert_eq!(parse_target("player 5", &view), Ok(PlayerId(5)));
        assert_eq!(
            parse_target("Nobody", &view),
            Err(InputError::UnknownPlayer("Nobody".to_owned()))
        );
        assert_eq!(parse_target("  ", &view), Err(InputError::Empty));
    }

    #[test]
    fn night_answers_name_an_open_kind() {
        let view = view();
        let witch = [NightActionKind::Heal, NightActionKind::Poison];

        assert_eq!(parse_night("PASS", &witch, &view), Ok(NightAction::Pass));
        assert_eq!(
            parse_night("poison 2", &witch, &view),
            Ok(NightAction::Poison(PlayerId(2)))
        );
        assert_eq!(
            parse_night("kill 2", &witch, &view),
            Err(InputError::UnknownAction("kill".to_owned()))
        );
        assert_eq!(
            parse_night("6", &[NightActionKind::Investigate], &view),
            Ok(NightAction::Investigate(PlayerId(6)))
        );
    }

    #[test]
    fn speech_commands_lead_the_text() {
        let view = view();
        let speech = parse_speech("/claim seer /accuse 4 I checked them last night", &view).unwrap();

        assert_eq!(speech.declaration, Some(Role::Seer));
        assert_eq!(speech.accuses, Some(PlayerId(4)));
        assert_eq!(speech.text, "I checked them last night");

        let plain = parse_speech("nothing to add", &view).unwrap();
        assert_eq!(plain, Speech::new("nothing to add"));
        assert_eq!(
            parse_speech("/claim mayor hi", &view),
            Err(InputError::UnknownRole("mayor".to_owned()))
        );
    }
}
