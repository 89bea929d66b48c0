use std::{io::Write, path::PathBuf};

use anyhow::Context;
use clap::Subcommand;
use portfolio_config::Config;
use portfolio_di::Provide;
use portfolio_extern_contracts::resume::ResumeApiService;
use portfolio_models::resume::DownloadProgress;
use tracing::info;

use crate::environment::{types::ResumeApi, ConfigProvider};

#[derive(Debug, Subcommand)]
pub enum ResumeCommand {
    /// Show name, size and modification time of the resume
    Info,
    /// Download the resume
    Download {
        /// Where to write the file, defaults to the configured file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a link that downloads the resume in a browser
    Url,
}

impl ResumeCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        let resume: ResumeApi = ConfigProvider::new(&config)?.provide();

        match self {
            ResumeCommand::Info => show_info(&resume, &mut std::io::stdout()).await,
            ResumeCommand::Download { output } => {
                let output = output.unwrap_or_else(|| config.resume.file_name.clone().into());
                download(resume, output).await
            }
            ResumeCommand::Url => {
                println!("{}", resume.direct_download_url()?);
                Ok(())
            }
        }
    }
}

async fn show_info(
    resume: &impl ResumeApiService,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let metadata = resume.get_metadata().await?;

    writeln!(out, "Name:      {}", metadata.name)?;
    if let Some(size) = metadata.size {
        writeln!(out, "Size:      {size} bytes")?;
    }
    if let Some(modified_time) = metadata.modified_time {
        writeln!(out, "Modified:  {modified_time}")?;
    }
    if let Some(mime_type) = metadata.mime_type {
        writeln!(out, "Type:      {mime_type}")?;
    }

    Ok(())
}

async fn download(resume: ResumeApi, output: PathBuf) -> anyhow::Result<()> {
    let data = resume.download(render_progress).await?;
    eprintln!();

    tokio::fs::write(&output, &data)
        .await
        .with_context(|| format!("Failed to write resume to {}", output.display()))?;

    info!(path = %output.display(), size = data.len(), "Resume downloaded");
    println!("{}", output.display());

    Ok(())
}

fn render_progress(progress: DownloadProgress) {
    let mut stderr = std::io::stderr().lock();
    let _ = match progress.percent() {
        Some(percent) => write!(stderr, "\rDownloading... {percent:.0}%"),
        None => write!(stderr, "\rDownloading... {} bytes", progress.loaded),
    };
    let _ = stderr.flush();
}

#[cfg(test)]
mod tests {
    use portfolio_extern_contracts::resume::MockResumeApiService;
    use portfolio_models::resume::ResumeMetadata;
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn info() {
        // Arrange
        let resume = MockResumeApiService::new().with_get_metadata(ResumeMetadata {
            name: "Aditya_Gupta_Resume.pdf".into(),
            size: Some(123456),
            modified_time: Some(*portfolio_demo::NOW),
            mime_type: None,
        });
        let mut out = Vec::new();

        // Act
        show_info(&resume, &mut out).await.unwrap();

        // Assert
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Name:      Aditya_Gupta_Resume.pdf\n\
             Size:      123456 bytes\n\
             Modified:  2025-01-06 14:30:00 UTC\n"
        );
    }
}
