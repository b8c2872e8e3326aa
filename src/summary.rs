//! Result summarization
//!
//! Folds the per-action results of one request into a single sentence.

use crate::core::ai::capitalize;
use crate::model::{ActionKind, TargetKind, TaskAction, TaskResult};

pub const NOTHING_TO_DO: &str = "No actionable request detected.";

/// One rendered clause of the summary
#[derive(Debug)]
enum Group {
    Done {
        kind: ActionKind,
        target: TargetKind,
        count: usize,
        topics: Vec<String>,
        /// A delete that removed only the most recent N
        limited: bool,
        first_message: String,
    },
    Failed(String),
}

impl Group {
    fn render(&self) -> String {
        match self {
            Group::Failed(message) => lower_first(message),
            Group::Done {
                kind,
                target,
                count,
                topics,
                limited,
                first_message,
            } => render_done(*kind, *target, *count, topics, *limited, first_message),
        }
    }
}

/// Summarize `actions` and the `results` they produced (same order)
pub fn summarize(actions: &[TaskAction], results: &[TaskResult]) -> String {
    if actions.is_empty() {
        return NOTHING_TO_DO.to_string();
    }

    let mut groups: Vec<Group> = Vec::new();

    for (action, result) in actions.iter().zip(results) {
        if !result.success {
            groups.push(Group::Failed(result.message.clone()));
            continue;
        }

        let topics = action_topics(action);
        let count = result.count.unwrap_or(0);
        let limited = action.kind() == ActionKind::Delete
            && action.params().count.is_some()
            && !action.params().wipe;

        let existing = groups.iter_mut().find(|g| {
            matches!(g, Group::Done { kind, target, .. }
                if *kind == action.kind() && *target == action.target())
        });

        match existing {
            Some(Group::Done {
                count: total,
                topics: known,
                limited: was_limited,
                ..
            }) => {
                *total += count;
                *was_limited |= limited;
                for topic in topics {
                    if !known.contains(&topic) {
                        known.push(topic);
                    }
                }
            }
            _ => groups.push(Group::Done {
                kind: action.kind(),
                target: action.target(),
                count,
                topics,
                limited,
                first_message: result.message.clone(),
            }),
        }
    }

    let clauses: Vec<String> = groups.iter().map(Group::render).collect();
    let sentence = match clauses.as_slice() {
        [] => return NOTHING_TO_DO.to_string(),
        [one] => one.clone(),
        [a, b] => format!("{}, {}", a, b),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    };

    let sentence = capitalize(sentence.trim_end_matches('.'));
    format!("{}.", sentence)
}

fn action_topics(action: &TaskAction) -> Vec<String> {
    let params = action.params();
    if !params.subjects.is_empty() {
        return params.subjects.iter().map(|s| s.topic.clone()).collect();
    }
    action.topic().map(|t| vec![t.to_string()]).unwrap_or_default()
}

fn render_done(
    kind: ActionKind,
    target: TargetKind,
    count: usize,
    topics: &[String],
    limited: bool,
    first_message: &str,
) -> String {
    let about = quoted(topics);

    match kind {
        ActionKind::Create if target == TargetKind::Schedule && count <= 1 => {
            lower_first(first_message)
        }
        ActionKind::Create => match about {
            Some(about) => format!("created {} {} about {}", count, target.noun(count), about),
            None => format!("created {} {}", count, target.noun(count)),
        },
        ActionKind::Delete => {
            let plural = target.noun(2);
            match (about, count) {
                (Some(about), 0) => format!("found no {} about {} to delete", plural, about),
                (Some(about), _) => format!("deleted {} about {}", plural, about),
                (None, 0) => format!("found no {} to delete", plural),
                (None, n) if limited => format!("deleted {} {}", n, target.noun(n)),
                (None, n) => format!("deleted all {} {}", n, target.noun(n)),
            }
        }
        ActionKind::Search => match about {
            Some(about) => format!("found {} {} about {}", count, target.noun(count), about),
            None => format!("found {} {}", count, target.noun(count)),
        },
        ActionKind::List => format!("you have {} {}", count, target.noun(count)),
        _ => lower_first(first_message),
    }
}

/// `"a"`, `"a" and "b"`, `"a", "b" and "c"`
fn quoted(topics: &[String]) -> Option<String> {
    let quoted: Vec<String> = topics.iter().map(|t| format!("\"{}\"", t)).collect();
    match quoted.as_slice() {
        [] => None,
        [one] => Some(one.clone()),
        [init @ .., last] => Some(format!("{} and {}", init.join(", "), last)),
    }
}

fn lower_first(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
