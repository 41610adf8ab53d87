use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;
use serde_json::json;

use prettiprint::{
    BoxStyle, ConsoleUtils, KeyValueOptions, Padding, PanelOptions, ProgressOptions, Severity,
    Spacing, TableOptions, TaskUpdate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    Messages,
    Structure,
    Data,
    Secrets,
    Progress,
    /// Interactive; only runs when asked for
    Prompts,
}

const DEFAULT_SECTIONS: [Section; 5] = [
    Section::Messages,
    Section::Structure,
    Section::Data,
    Section::Secrets,
    Section::Progress,
];

pub fn run(console: &ConsoleUtils, sections: &[Section]) -> Result<()> {
    let sections = if sections.is_empty() {
        &DEFAULT_SECTIONS[..]
    } else {
        sections
    };

    for section in sections {
        match section {
            Section::Messages => messages(console),
            Section::Structure => structure(console),
            Section::Data => data(console)?,
            Section::Secrets => secrets(console)?,
            Section::Progress => progress(console),
            Section::Prompts => prompts(console)?,
        }
    }
    Ok(())
}

fn messages(console: &ConsoleUtils) {
    console.header("Messages", None);
    console.success("Build finished in 42s");
    console.info("3 artifacts uploaded");
    console.warning("Cache is 91% full");
    console.error("Deployment to eu-west-1 failed");
    console.spacer(Spacing::Small);

    for severity in Severity::ALL {
        console.event(
            &format!("{} event (shown from verbosity 2)", severity.as_str().to_lowercase()),
            severity,
        );
    }
}

fn structure(console: &ConsoleUtils) {
    console.header("Structure", None);
    console.panel(
        "Panels frame a message with an optional title.",
        PanelOptions::default().title("Panel"),
    );
    console.panel(
        "Any box style works, with custom padding.",
        PanelOptions::default()
            .title("Heavy")
            .box_style(BoxStyle::Heavy)
            .border_style("bold magenta")
            .padding(Padding::symmetric(1, 4)),
    );
    console.rule(Some("Markdown"), None, None);
    console.markdown(
        "## Release notes\n\n\
         - **Faster** table rendering\n\
         - New `mono` theme\n\n\
         > Upgrade at your own pace.",
    );
    console.rule(None, None, None);
    console.code(
        "fn main() {\n    println!(\"hello\");\n}",
        "rust",
        Some("main.rs"),
        false,
    );
}

fn data(console: &ConsoleUtils) -> Result<()> {
    console.header("Data", None);
    console.table(
        &["Service", "Status", "Latency"],
        [
            ["auth", "healthy", "12ms"],
            ["search", "degraded", "340ms"],
            ["billing", "healthy", "25ms"],
        ],
        TableOptions::default().title("Services"),
    )?;
    console.dictionary(
        [
            ("region", json!("eu-west-1")),
            ("replicas", json!(3)),
            ("tags", json!(["blue", "canary"])),
        ],
        Some("Deployment"),
        true,
    )?;
    let settings = json!({
        "database": {"host": "db.internal", "port": 5432},
        "features": ["search", "export"],
        "debug": false
    });
    console.json(&settings, Some("settings.json"))?;
    console.tree(&settings, None)?;
    Ok(())
}

fn secrets(console: &ConsoleUtils) -> Result<()> {
    console.header("Secrets", None);
    console.key_value("user", "deploy-bot", KeyValueOptions::default())?;
    console.key_value("token", "$upaS3cr3t", KeyValueOptions::secret(3))?;
    console.key_value(
        "api key",
        "sk-live-0123456789",
        KeyValueOptions::secret(4).mask("#"),
    )?;
    Ok(())
}

fn progress(console: &ConsoleUtils) {
    console.header("Progress", None);
    {
        let mut status = console.status("Connecting...");
        thread::sleep(Duration::from_millis(600));
        status.update("Authenticating...");
        thread::sleep(Duration::from_millis(600));
    }
    console.success("Connected");

    let mut progress = console.progress(ProgressOptions::default());
    let download = progress.add_task("Downloading", 20);
    let extract = progress.add_task("Extracting", 10);
    for step in 0..20 {
        progress.advance(download, 1);
        if step % 2 == 1 {
            progress.advance(extract, 1);
        }
        thread::sleep(Duration::from_millis(80));
    }
    progress.update(extract, TaskUpdate::default().description("Extracted"));
    progress.finish();
    console.success("Done");
}

fn prompts(console: &ConsoleUtils) -> Result<()> {
    console.header("Prompts", None);
    let name = console.prompt("Your name", false)?;
    let _password = console.prompt("Password", true)?;
    if console.confirm(&format!("Save settings for {name}?"), true)? {
        console.success("Saved");
    } else {
        console.info("Nothing saved");
    }
    Ok(())
}
