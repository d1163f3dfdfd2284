//! Line-oriented front-end for the creation wizard.
//!
//! Each input line is one command (`set income 1 amount 5200`, `next`, `submit`, ...). Entry
//! positions are 1-based to match the numbering in validation messages.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use finapp::applications::{
    ApplicationStorage, Draft, FieldValue, ItemField, NumericField, PersonalField, Section,
    StepStatus, Step, SubmissionAdapter, SubmitOutcome, WizardController,
};
use finapp::error::AppError;
use finapp::session::IdentityProvider;
use finapp::storage::KeyValueStore;

const HELP: &[&str] = &[
    "commands:",
    "  set name|age|email <value>",
    "  set <section> <n> <field> <value>   e.g. set income 1 amount 5200",
    "  add <section> | remove <section> <n>",
    "  next | back | goto <step> | show | submit | quit",
    "sections: income, expenses, assets, liabilities",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldTarget {
    Personal(PersonalField),
    Item {
        section: Section,
        index: usize,
        field: ItemField,
    },
}

impl FieldTarget {
    fn parse_value(self, raw: &str) -> FieldValue {
        match self {
            FieldTarget::Personal(field) => field.parse_value(raw),
            FieldTarget::Item { field, .. } => field.parse_value(raw),
        }
    }
}

impl fmt::Display for FieldTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldTarget::Personal(field) => write!(f, "{field}"),
            FieldTarget::Item {
                section,
                index,
                field,
            } => write!(f, "{section} #{} {field}", index + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WizardCommand {
    Set { target: FieldTarget, raw: String },
    Add(Section),
    Remove { section: Section, index: usize },
    Next,
    Back,
    Goto(Step),
    Show,
    Submit,
    Help,
    Quit,
}

pub(crate) fn parse_command(line: &str) -> Result<WizardCommand, String> {
    let (verb, rest) = split_word(line);
    match verb.to_ascii_lowercase().as_str() {
        "set" => parse_set(rest),
        "add" => {
            let (section, _) = split_word(rest);
            Ok(WizardCommand::Add(section.parse()?))
        }
        "remove" | "rm" => {
            let (section, rest) = split_word(rest);
            let (position, _) = split_word(rest);
            Ok(WizardCommand::Remove {
                section: section.parse()?,
                index: parse_position(position)?,
            })
        }
        "next" | "n" => Ok(WizardCommand::Next),
        "back" | "b" => Ok(WizardCommand::Back),
        "goto" => {
            let (raw, _) = split_word(rest);
            raw.parse::<u8>()
                .ok()
                .and_then(Step::from_index)
                .map(WizardCommand::Goto)
                .ok_or_else(|| format!("step must be between 1 and {}", Step::LAST.index()))
        }
        "show" => Ok(WizardCommand::Show),
        "submit" => Ok(WizardCommand::Submit),
        "help" | "?" => Ok(WizardCommand::Help),
        "quit" | "exit" => Ok(WizardCommand::Quit),
        "" => Err("empty command".to_string()),
        other => Err(format!("unknown command '{other}' (try 'help')")),
    }
}

fn parse_set(input: &str) -> Result<WizardCommand, String> {
    let (first, rest) = split_word(input);
    if let Ok(field) = first.parse::<PersonalField>() {
        return Ok(WizardCommand::Set {
            target: FieldTarget::Personal(field),
            raw: rest.to_string(),
        });
    }

    let section: Section = first
        .parse()
        .map_err(|_| format!("'{first}' is neither a personal field nor a section"))?;
    let (position, rest) = split_word(rest);
    let (field, raw) = split_word(rest);
    Ok(WizardCommand::Set {
        target: FieldTarget::Item {
            section,
            index: parse_position(position)?,
            field: field.parse()?,
        },
        raw: raw.to_string(),
    })
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], input[end..].trim_start()),
        None => (input, ""),
    }
}

fn parse_position(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position - 1),
        _ => Err(format!("'{raw}' is not an entry number (1, 2, ...)")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    /// The wizard is done with; nothing more to read.
    Finished,
    /// The user walked away; the unsubmitted draft should be discarded.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reply {
    pub(crate) lines: Vec<String>,
    pub(crate) flow: Flow,
}

impl Reply {
    fn lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            flow: Flow::Continue,
        }
    }

    fn message(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }
}

pub(crate) struct ConsoleWizard<K: ?Sized, S: ?Sized, I: ?Sized> {
    wizard: WizardController<K>,
    adapter: SubmissionAdapter<S, I>,
}

impl<K, S, I> ConsoleWizard<K, S, I>
where
    K: KeyValueStore + ?Sized,
    S: ApplicationStorage + ?Sized,
    I: IdentityProvider + ?Sized,
{
    pub(crate) fn new(wizard: WizardController<K>, adapter: SubmissionAdapter<S, I>) -> Self {
        Self { wizard, adapter }
    }

    pub(crate) fn wizard(&self) -> &WizardController<K> {
        &self.wizard
    }

    pub(crate) fn into_wizard(self) -> WizardController<K> {
        self.wizard
    }

    pub(crate) async fn handle(&mut self, command: WizardCommand) -> Reply {
        match command {
            WizardCommand::Set { target, raw } => {
                let value = target.parse_value(&raw);
                let result = match target {
                    FieldTarget::Personal(field) => self.wizard.set_personal_field(field, value),
                    FieldTarget::Item {
                        section,
                        index,
                        field,
                    } => self.wizard.set_item_field(section, index, field, value),
                };
                match result {
                    Ok(_) => Reply::message(format!("{target} updated")),
                    Err(err) => Reply::message(format!("error: {err}")),
                }
            }
            WizardCommand::Add(section) => {
                let len = self.wizard.add_item(section).section_len(section);
                Reply::message(format!("added {section} #{len}"))
            }
            WizardCommand::Remove { section, index } => {
                match self.wizard.remove_item(section, index) {
                    Ok(_) => Reply::message(format!("removed {section} #{}", index + 1)),
                    Err(err) => Reply::message(format!("error: {err}")),
                }
            }
            WizardCommand::Next => {
                if self.wizard.next() {
                    Reply::lines(render_step(&self.wizard))
                } else if self.wizard.errors().is_empty() {
                    Reply::message("this is the last step; type 'submit' to send the application")
                } else {
                    Reply::lines(self.wizard.errors().to_vec())
                }
            }
            WizardCommand::Back => {
                self.wizard.previous();
                Reply::lines(render_step(&self.wizard))
            }
            WizardCommand::Goto(step) => {
                if self.wizard.jump_to(step) {
                    Reply::lines(render_step(&self.wizard))
                } else {
                    Reply::message(format!("step {step} is not complete yet"))
                }
            }
            WizardCommand::Show => Reply::lines(render_step(&self.wizard)),
            WizardCommand::Submit => self.submit().await,
            WizardCommand::Help => Reply::lines(HELP.iter().map(|line| line.to_string()).collect()),
            WizardCommand::Quit => Reply {
                lines: vec!["leaving the wizard; the draft was discarded".to_string()],
                flow: Flow::Abandoned,
            },
        }
    }

    async fn submit(&mut self) -> Reply {
        match self.wizard.submit(&self.adapter).await {
            SubmitOutcome::Submitted { id, redirect } => Reply {
                lines: vec![
                    format!("submitted application {id}"),
                    format!("continue at {redirect}"),
                ],
                flow: Flow::Finished,
            },
            SubmitOutcome::Invalid(errors) => Reply::lines(errors),
            SubmitOutcome::Failed(message) => Reply::message(message),
            SubmitOutcome::Unauthenticated { redirect } => Reply {
                lines: vec![format!(
                    "not signed in (set APP_SESSION_USER_ID and APP_SESSION_EMAIL); continue at {redirect}"
                )],
                flow: Flow::Finished,
            },
        }
    }
}

/// Progress line, step list and the fields of the current step.
pub(crate) fn render_step<K>(wizard: &WizardController<K>) -> Vec<String>
where
    K: KeyValueStore + ?Sized,
{
    let step = wizard.current_step();
    let mut lines = vec![format!(
        "Step {} of {}: {} ({}%)",
        step.index(),
        Step::LAST.index(),
        step.label(),
        wizard.progress_percent()
    )];

    let markers: Vec<String> = wizard
        .steps()
        .iter()
        .map(|view| {
            let marker = match view.status {
                StepStatus::Current => '>',
                StepStatus::Completed => 'x',
                StepStatus::Pending => ' ',
            };
            format!("[{marker}] {}", view.label)
        })
        .collect();
    lines.push(markers.join("  "));
    lines.extend(describe_step(wizard.draft(), step));
    lines
}

fn describe_step(draft: &Draft, step: Step) -> Vec<String> {
    let number = |value: NumericField| match value.value() {
        Some(value) => value.to_string(),
        None => "-".to_string(),
    };

    match step {
        Step::Personal => {
            let details = &draft.personal_details;
            vec![
                format!("  name:  {}", details.name),
                format!(
                    "  age:   {}",
                    details.age.map(|age| age.to_string()).unwrap_or_default()
                ),
                format!("  email: {}", details.email),
            ]
        }
        Step::Income => numbered(draft.income.iter().map(|entry| {
            format!(
                "source={} amount={} date={}",
                entry.source,
                number(entry.amount),
                entry.date
            )
        })),
        Step::Expenses => numbered(draft.expenses.iter().map(|entry| {
            format!(
                "description={} amount={} date={}",
                entry.description,
                number(entry.amount),
                entry.date
            )
        })),
        Step::Assets => numbered(draft.assets.iter().map(|entry| {
            format!(
                "description={} value={}",
                entry.description,
                number(entry.value)
            )
        })),
        Step::Liabilities => numbered(draft.liabilities.iter().map(|entry| {
            format!(
                "description={} amount={}",
                entry.description,
                number(entry.amount)
            )
        })),
    }
}

fn numbered(entries: impl Iterator<Item = String>) -> Vec<String> {
    let lines: Vec<String> = entries
        .enumerate()
        .map(|(index, entry)| format!("  #{} {entry}", index + 1))
        .collect();
    if lines.is_empty() {
        vec!["  (no entries)".to_string()]
    } else {
        lines
    }
}

/// Drive `session` from `input` until it finishes or the input ends.
///
/// End of input keeps the persisted draft so the next `create` picks it up again.
pub(crate) async fn run_interactive<K, S, I, R>(
    mut session: ConsoleWizard<K, S, I>,
    input: R,
) -> Result<(), AppError>
where
    K: KeyValueStore + ?Sized,
    S: ApplicationStorage + ?Sized,
    I: IdentityProvider + ?Sized,
    R: AsyncBufRead + Unpin,
{
    print_lines(&render_step(session.wizard()));
    print_lines(&["type 'help' for commands".to_string()]);

    let mut lines = input.lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            println!();
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match parse_command(&line) {
            Ok(command) => session.handle(command).await,
            Err(message) => Reply::message(message),
        };
        print_lines(&reply.lines);

        match reply.flow {
            Flow::Continue => {}
            Flow::Finished => return Ok(()),
            Flow::Abandoned => {
                session.into_wizard().teardown();
                return Ok(());
            }
        }
    }
}

fn prompt() -> Result<(), AppError> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Shared-ownership helper so callers can keep a handle on the key-value store.
pub(crate) fn mount<K>(store: &Arc<K>) -> WizardController<K>
where
    K: KeyValueStore + ?Sized,
{
    WizardController::mount(Arc::clone(store))
}
