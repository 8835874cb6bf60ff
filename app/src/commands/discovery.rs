//! # appstrap Command Discovery
//!
//! File: app/src/commands/discovery.rs
//!
//! ## Overview
//!
//! Walks one namespace of the module index and turns its providers into
//! registered commands. Every entry must carry the expected capability;
//! task method names are folded to command names; console commands must
//! declare a non-empty name; names must be unique across the whole command
//! table.
//!
//! A discovery call is staged: nothing is committed to the application's
//! table unless the entire namespace validates. A failing entry therefore
//! never leaves partial registrations behind.
//!
use crate::commands::{Invoke, Mode, ModuleIndex, Provider, RegisteredCommand};
use crate::core::error::{AppError, Result};
use tracing::debug;

/// Validate every entry under `namespace` against `expected` and produce the
/// staged command registrations. `existing` is consulted for name clashes
/// with earlier discovery calls.
pub(crate) fn discover(
    index: &ModuleIndex,
    namespace: &str,
    expected: Mode,
    existing: &[RegisteredCommand],
) -> Result<Vec<RegisteredCommand>> {
    let mut staged: Vec<RegisteredCommand> = Vec::new();
    for entry in index.entries(namespace) {
        match (&entry.provider, expected) {
            (Provider::Tasks(set), Mode::Tasks) => {
                for task in set.tasks() {
                    let name = fold_method_name(&task.method);
                    if name.is_empty() {
                        return Err(AppError::Discovery(format!(
                            "Command name is empty for task '{}' of '{}'",
                            task.method, entry.type_name
                        ))
                        .into());
                    }
                    check_unique(&name, &entry.type_name, existing, &staged)?;
                    debug!("registering task command '{name}' from '{}'", entry.type_name);
                    staged.push(RegisteredCommand {
                        name,
                        type_name: entry.type_name.clone(),
                        description: String::new(),
                        invoke: Invoke::Task(task.run.clone()),
                    });
                }
            }
            (Provider::Console(command), Mode::Console) => {
                let name = command.name();
                if name.is_empty() {
                    return Err(AppError::Discovery(format!(
                        "Command name is empty for '{}'",
                        entry.type_name
                    ))
                    .into());
                }
                check_unique(&name, &entry.type_name, existing, &staged)?;
                debug!("registering console command '{name}' from '{}'", entry.type_name);
                staged.push(RegisteredCommand {
                    name,
                    type_name: entry.type_name.clone(),
                    description: command.description(),
                    invoke: Invoke::Console(command.clone()),
                });
            }
            (_, expected) => {
                return Err(AppError::Discovery(format!(
                    "'{}' in namespace '{namespace}' does not provide {expected} commands",
                    entry.type_name
                ))
                .into());
            }
        }
    }
    Ok(staged)
}

fn check_unique(
    name: &str,
    type_name: &str,
    existing: &[RegisteredCommand],
    staged: &[RegisteredCommand],
) -> Result<()> {
    if existing.iter().chain(staged.iter()).any(|c| c.name == name) {
        return Err(AppError::Discovery(format!(
            "duplicate command name '{name}' from '{type_name}'"
        ))
        .into());
    }
    Ok(())
}

/// Fold a camelCase task method name into its command name: the first hump
/// becomes the group, separated by a colon; remaining humps join with
/// hyphens. `helloTest` becomes `hello:test`, `deployBlueGreen` becomes
/// `deploy:blue-green`, a single hump stays as-is.
pub fn fold_method_name(method: &str) -> String {
    let mut humps: Vec<String> = Vec::new();
    for ch in method.chars() {
        if ch.is_uppercase() || humps.is_empty() {
            humps.push(String::new());
        }
        if let Some(current) = humps.last_mut() {
            current.extend(ch.to_lowercase());
        }
    }
    match humps.len() {
        0 => String::new(),
        1 => humps.remove(0),
        _ => {
            let group = humps.remove(0);
            format!("{group}:{}", humps.join("-"))
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{ConsoleCommand, Task, TaskSet};
    use std::io::Write;

    struct HelloTasks;

    impl TaskSet for HelloTasks {
        fn tasks(&self) -> Vec<Task> {
            vec![
                Task::new("helloTest", |out: &mut dyn Write| {
                    write!(out, "Hello !")?;
                    Ok(())
                }),
                Task::new("deployBlueGreen", |_out: &mut dyn Write| Ok(())),
            ]
        }
    }

    struct HelloWorldCommand;

    impl ConsoleCommand for HelloWorldCommand {
        fn name(&self) -> String {
            "hello".to_string()
        }

        fn execute(&self, out: &mut dyn Write) -> Result<()> {
            write!(out, "Hello world !!")?;
            Ok(())
        }
    }

    struct NamelessCommand;

    impl ConsoleCommand for NamelessCommand {
        fn name(&self) -> String {
            String::new()
        }

        fn execute(&self, _out: &mut dyn Write) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fold_method_name() {
        assert_eq!(fold_method_name("helloTest"), "hello:test");
        assert_eq!(fold_method_name("deployBlueGreen"), "deploy:blue-green");
        assert_eq!(fold_method_name("status"), "status");
        assert_eq!(fold_method_name(""), "");
    }

    #[test]
    fn test_task_discovery_registers_folded_names() {
        let mut index = ModuleIndex::new();
        index.register_task_set("tasks", "HelloTasks", HelloTasks);
        let staged = discover(&index, "tasks", Mode::Tasks, &[]).unwrap();
        let names: Vec<&str> = staged.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["hello:test", "deploy:blue-green"]);
        assert_eq!(staged[0].type_name, "HelloTasks");
    }

    #[test]
    fn test_console_discovery_uses_declared_name() {
        let mut index = ModuleIndex::new();
        index.register_console_command("console", "HelloWorldCommand", HelloWorldCommand);
        let staged = discover(&index, "console", Mode::Console, &[]).unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].name, "hello");
    }

    #[test]
    fn test_empty_console_name_fails() {
        let mut index = ModuleIndex::new();
        index.register_console_command("broken", "NamelessCommand", NamelessCommand);
        let err = discover(&index, "broken", Mode::Console, &[]).unwrap_err();
        assert!(err.to_string().contains("Command name is empty"));
    }

    #[test]
    fn test_capability_mismatch_fails() {
        let mut index = ModuleIndex::new();
        index.register_task_set("tasks", "HelloTasks", HelloTasks);
        let err = discover(&index, "tasks", Mode::Console, &[]).unwrap_err();
        assert!(err.to_string().contains("does not provide console commands"));
    }

    #[test]
    fn test_duplicate_names_fail() {
        let mut index = ModuleIndex::new();
        index.register_task_set("tasks", "HelloTasks", HelloTasks);
        let first = discover(&index, "tasks", Mode::Tasks, &[]).unwrap();
        let err = discover(&index, "tasks", Mode::Tasks, &first).unwrap_err();
        assert!(err.to_string().contains("duplicate command name 'hello:test'"));
    }

    #[test]
    fn test_unknown_namespace_stages_nothing() {
        let index = ModuleIndex::new();
        let staged = discover(&index, "nothing", Mode::Tasks, &[]).unwrap();
        assert!(staged.is_empty());
    }
}
