use crate::prelude::{eprintln, print, println, *};
use colored::Colorize;
use edx2gift_core::{convert_edx_to_gift, Conversion, ConvertOptions, TitleMode, Warning};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

#[derive(Debug, clap::Parser)]
#[command(name = "convert")]
#[command(about = "Convert an edX XML formatted exercises file into Moodle GIFT format")]
pub struct App {
    /// The path to the edX XML formatted exercises file to convert (`-` reads stdin)
    #[clap(value_name = "EDX_XML_FILE")]
    file: PathBuf,

    /// Number given to the first question
    #[arg(long, env = "EDX2GIFT_START", default_value = "1")]
    start: usize,

    /// How elements other than responses become question titles
    #[arg(long, value_enum, env = "EDX2GIFT_TITLE_MODE", default_value = "markup")]
    title_mode: TitleModeArg,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum TitleModeArg {
    /// Keep the source markup of prompts and mark questions as HTML (default)
    Markup,
    /// Use the plain text of paragraphs only
    Text,
}

impl From<TitleModeArg> for TitleMode {
    fn from(mode: TitleModeArg) -> Self {
        match mode {
            TitleModeArg::Markup => TitleMode::Markup,
            TitleModeArg::Text => TitleMode::Text,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConvertOutput<'a> {
    pub gift: String,
    pub questions: usize,
    pub next_id: usize,
    pub warnings: &'a [Warning],
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let xml = read_input(&app.file).await?;

    let options = ConvertOptions {
        start_id: app.start,
        title_mode: app.title_mode.into(),
    };
    let conversion = convert_edx_to_gift(&xml, &options)
        .with_context(|| format!("Failed to convert {}", app.file.display()))?;

    log_warnings(&conversion);

    if app.json {
        println!("{}", render_json(&conversion)?);
    } else {
        print!("{}", conversion.gift());
    }

    if global.verbose {
        output_summary(&conversion);
    }

    Ok(())
}

/// Read the document from `path`, or from stdin when `path` is `-`.
pub async fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut xml = String::new();
        tokio::io::stdin()
            .read_to_string(&mut xml)
            .await
            .context("Failed to read edX XML from stdin")?;
        return Ok(xml);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

pub fn log_warnings(conversion: &Conversion) {
    for warning in &conversion.warnings {
        log::warn!("{warning}");
    }
}

fn render_json(conversion: &Conversion) -> Result<String> {
    let output = ConvertOutput {
        gift: conversion.gift(),
        questions: conversion.questions,
        next_id: conversion.next_id,
        warnings: &conversion.warnings,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn output_summary(conversion: &Conversion) {
    eprintln!();
    eprintln!(
        "{}: {}",
        "Questions".green(),
        conversion.questions.to_string().bright_cyan().bold()
    );
    eprintln!(
        "{}: {}",
        "Warnings".green(),
        if conversion.warnings.is_empty() {
            "0".bright_cyan().bold()
        } else {
            conversion.warnings.len().to_string().bright_yellow().bold()
        }
    );
    for warning in &conversion.warnings {
        eprintln!("  {}", warning.to_string().yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NUMERICAL: &str = r#"
        <problem>
        <p>Numerical response prompt?</p>
        <numericalresponse answer="1.2">
        <responseparam type="tolerance" default=".1" />
        <formulaequationinput label="IGNORED" />
        </numericalresponse>
        </problem>
    "#;

    #[tokio::test]
    async fn test_read_input_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(NUMERICAL.as_bytes()).unwrap();

        let xml = read_input(file.path()).await.unwrap();
        let conversion = convert_edx_to_gift(&xml, &ConvertOptions::default()).unwrap();
        assert_eq!(
            conversion.gift(),
            "::Q1::[html]<p>Numerical response prompt?</p>{#\n\t=%100%1.2:0.1\n}\n"
        );
    }

    #[tokio::test]
    async fn test_read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.xml");

        let err = read_input(&missing).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_render_json() {
        let conversion = convert_edx_to_gift(
            "<problem><numericalresponse/></problem>",
            &ConvertOptions::default(),
        )
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&render_json(&conversion).unwrap()).unwrap();
        assert_eq!(json["gift"], "::Q1::[html]{#\n\t=%100%\n}\n");
        assert_eq!(json["questions"], 1);
        assert_eq!(json["next_id"], 2);
        assert_eq!(json["warnings"][0]["kind"], "missing_answer");
    }

    #[test]
    fn test_title_mode_arg_conversion() {
        assert_eq!(TitleMode::from(TitleModeArg::Markup), TitleMode::Markup);
        assert_eq!(TitleMode::from(TitleModeArg::Text), TitleMode::Text);
    }
}
