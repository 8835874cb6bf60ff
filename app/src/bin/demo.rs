//! # appstrap Demo Binary
//!
//! File: app/src/bin/demo.rs
//!
//! ## Overview
//!
//! A minimal embedding of the bootstrap library, used by the integration
//! test suite and as a copy-paste starting point. It registers one task set
//! under the `demo` namespace and runs the standard sequence: discover,
//! finalize, dispatch.
//!
//! ## Examples
//!
//! ```bash
//! # Greet
//! appstrap-demo hello:world
//!
//! # Emit log records at increasing verbosity
//! appstrap-demo -vv log:demo
//! ```
//!
use appstrap::{Application, ModuleIndex, Result, Task, TaskSet};
use std::io::Write;

/// The demo's only command provider: greeting plus a command that exercises
/// the logger at every level.
struct DemoTasks;

impl TaskSet for DemoTasks {
    fn tasks(&self) -> Vec<Task> {
        vec![
            Task::new("helloWorld", |out: &mut dyn Write| {
                writeln!(out, "Hello world !")?;
                Ok(())
            }),
            Task::new("logDemo", |out: &mut dyn Write| {
                tracing::error!("an error-level record");
                tracing::warn!("a warn-level record");
                tracing::info!("an info-level record");
                tracing::debug!("a debug-level record");
                writeln!(out, "log records emitted")?;
                Ok(())
            }),
        ]
    }
}

fn try_main() -> Result<i32> {
    let mut index = ModuleIndex::new();
    index.register_task_set("demo", "DemoTasks", DemoTasks);

    let mut app = Application::new(index);
    app.set_name("appstrap-demo");
    app.set_version(env!("CARGO_PKG_VERSION"));
    app.find_task_commands("demo")?;
    app.finalize()?;
    app.run()
}

fn main() {
    match try_main() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
