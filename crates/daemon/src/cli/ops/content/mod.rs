use clap::{Args, Subcommand};

pub mod add;
pub mod list;
pub mod rm;

use common::content::{ContentRecord, ContentType};

use crate::cli::op::Op;

crate::command_enum! {
    (List, list::List),
    (Add, add::Add),
    (Rm, rm::Rm),
}

pub type ContentCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Content {
    #[command(subcommand)]
    pub command: ContentCommand,
}

#[async_trait::async_trait]
impl Op for Content {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

/// One block per record. Ids are shown to admins, who need them for `rm`.
pub fn render_records(records: &[ContentRecord], show_ids: bool) -> String {
    records
        .iter()
        .map(|record| {
            let mut lines = vec![format!("[{}] {}", record.content_type, record.title)];
            if show_ids {
                lines.push(format!("  id:     {}", record.id));
            }
            if !record.board.is_empty() || !record.class.is_empty() {
                lines.push(format!("  scope:  {} / {}", record.board, record.class));
            }
            if record.content_type == ContentType::Quiz {
                if let Some(time) = &record.time {
                    lines.push(format!("  time:   {} min", time));
                }
                if let Some(marks) = &record.marks {
                    lines.push(format!("  marks:  {}", marks));
                }
            }
            if !record.link.is_empty() {
                lines.push(format!(
                    "  Open {}: {}",
                    record.content_type.open_label(),
                    record.link
                ));
            }
            lines.push(format!(
                "  added:  {}",
                record.timestamp.format("%Y-%m-%d %H:%M UTC")
            ));
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn quiz() -> ContentRecord {
        ContentRecord {
            id: "42".into(),
            content_type: ContentType::Quiz,
            title: "Algebra".into(),
            link: "https://forms/quiz".into(),
            board: "CBSE".into(),
            class: "Class 10".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
            time: Some("30".into()),
            marks: Some("25".into()),
            is_storage_file: false,
            file_name: None,
            storage_path: None,
        }
    }

    #[test]
    fn test_render_quiz() {
        let out = render_records(&[quiz()], false);
        assert!(out.starts_with("[quiz] Algebra"));
        assert!(out.contains("Open Test: https://forms/quiz"));
        assert!(out.contains("marks:  25"));
        assert!(out.contains("2024-06-01 09:30 UTC"));
        assert!(!out.contains("id:"));
    }

    #[test]
    fn test_render_ids_for_admin() {
        let mut note = quiz();
        note.content_type = ContentType::Note;
        let out = render_records(&[note], true);
        assert!(out.contains("id:     42"));
        assert!(out.contains("Open PDF"));
        assert!(!out.contains("marks"));
    }
}
