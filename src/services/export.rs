use crate::error::Result;
use crate::models::submission::STATUS_COMPLETED;
use chrono::{DateTime, Utc};
use rust_xlsxwriter::*;
use sqlx::FromRow;
use uuid::Uuid;

/// One flattened line of the admin results report.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionExportRow {
    pub id: Uuid,
    pub student_name: String,
    pub student_id: String,
    pub school_name: String,
    pub class_name: String,
    pub test_name: String,
    pub subject: String,
    pub score: i32,
    pub question_count: i32,
    pub total_time_taken: f64,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

pub struct ExportService;

impl ExportService {
    /// Generate a styled XLSX workbook from graded submissions.
    pub fn generate_submissions_xlsx(rows: &[SubmissionExportRow]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Submissions")?;

        // ── Color palette ──
        let primary_color = Color::RGB(0x1E293B); // Slate 800
        let header_bg = Color::RGB(0x0F172A); // Slate 900
        let header_text = Color::White;
        let alt_row_1 = Color::RGB(0xF8FAFC); // Slate 50
        let alt_row_2 = Color::White;
        let border_color = Color::RGB(0xE2E8F0); // Slate 200

        let status_completed = Color::RGB(0x10B981); // Emerald
        let status_in_progress = Color::RGB(0xF59E0B); // Amber
        let status_abandoned = Color::RGB(0xEF4444); // Red

        // Score colors by percentage of correct answers
        let score_high = Color::RGB(0x10B981); // Emerald (70%+)
        let score_mid = Color::RGB(0xF59E0B); // Amber (40-69%)
        let score_low = Color::RGB(0xEF4444); // Red (<40%)

        // ── Column definitions ──
        let columns = [
            ("№", 8.0),
            ("Student", 28.0),
            ("Student ID", 24.0),
            ("School", 30.0),
            ("Class", 12.0),
            ("Test", 32.0),
            ("Subject", 18.0),
            ("Score", 12.0),
            ("Questions", 12.0),
            ("Time (min)", 12.0),
            ("Status", 14.0),
            ("Submitted", 20.0),
        ];

        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        // ── Title row ──
        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(header_text)
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        worksheet.set_row_height(0, 40)?;
        worksheet.merge_range(
            0,
            0,
            0,
            (columns.len() - 1) as u16,
            "Submitted tests report",
            &title_format,
        )?;

        // ── Subtitle row ──
        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_background_color(primary_color)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        worksheet.set_row_height(1, 22)?;
        let now = chrono::Utc::now().format("%d.%m.%Y %H:%M UTC").to_string();
        let subtitle_text = format!("Exported: {}  •  Total submissions: {}", now, rows.len());
        worksheet.merge_range(
            1,
            0,
            1,
            (columns.len() - 1) as u16,
            &subtitle_text,
            &subtitle_format,
        )?;

        // ── Header row ──
        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        let header_row = 2;
        worksheet.set_row_height(header_row, 30)?;
        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
        }

        // ── Data rows ──
        let data_start_row = 3;
        for (idx, row_data) in rows.iter().enumerate() {
            let row = data_start_row + idx as u32;
            let bg = if idx % 2 == 0 { alt_row_1 } else { alt_row_2 };

            let base_fmt = Format::new()
                .set_font_size(10)
                .set_background_color(bg)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);

            let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);

            worksheet.set_row_height(row, 22)?;

            worksheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;

            let name_fmt = base_fmt.clone().set_bold();
            worksheet.write_string_with_format(row, 1, &row_data.student_name, &name_fmt)?;
            worksheet.write_string_with_format(row, 2, &row_data.student_id, &base_fmt)?;
            worksheet.write_string_with_format(row, 3, &row_data.school_name, &base_fmt)?;
            worksheet.write_string_with_format(row, 4, &row_data.class_name, &center_fmt)?;
            worksheet.write_string_with_format(row, 5, &row_data.test_name, &base_fmt)?;
            worksheet.write_string_with_format(row, 6, &row_data.subject, &base_fmt)?;

            // Score, color-coded by percentage
            let percent = if row_data.question_count > 0 {
                row_data.score as f64 * 100.0 / row_data.question_count as f64
            } else {
                0.0
            };
            let s_color = if percent >= 70.0 {
                score_high
            } else if percent >= 40.0 {
                score_mid
            } else {
                score_low
            };
            let score_fmt = Format::new()
                .set_font_size(11)
                .set_bold()
                .set_font_color(s_color)
                .set_background_color(bg)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            worksheet.write_number_with_format(row, 7, row_data.score as f64, &score_fmt)?;
            worksheet.write_number_with_format(
                row,
                8,
                row_data.question_count as f64,
                &center_fmt,
            )?;
            worksheet.write_number_with_format(
                row,
                9,
                (row_data.total_time_taken * 100.0).round() / 100.0,
                &center_fmt,
            )?;

            // Status (colored)
            let st_color = match row_data.status.as_str() {
                STATUS_COMPLETED => status_completed,
                "in-progress" => status_in_progress,
                "abandoned" => status_abandoned,
                _ => Color::RGB(0x64748B),
            };
            let status_fmt = Format::new()
                .set_font_size(10)
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(st_color)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            worksheet.write_string_with_format(row, 10, &row_data.status, &status_fmt)?;

            let submitted_str = row_data
                .created_at
                .map(|d| d.format("%d.%m.%Y %H:%M").to_string())
                .unwrap_or_else(|| "—".to_string());
            worksheet.write_string_with_format(row, 11, &submitted_str, &center_fmt)?;
        }

        // ── Summary row ──
        let total_row = data_start_row + rows.len() as u32 + 1;
        let summary_fmt = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(primary_color)
            .set_background_color(Color::RGB(0xE0E7FF)) // Indigo 100
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        worksheet.set_row_height(total_row, 26)?;
        worksheet.merge_range(
            total_row,
            0,
            total_row,
            2,
            &format!("Total: {} submissions", rows.len()),
            &summary_fmt,
        )?;

        let answered: i64 = rows.iter().map(|r| r.question_count as i64).sum();
        let correct: i64 = rows.iter().map(|r| r.score as i64).sum();
        let avg_percent = if answered > 0 {
            correct as f64 * 100.0 / answered as f64
        } else {
            0.0
        };
        let top_scores = rows
            .iter()
            .filter(|r| r.question_count > 0 && r.score * 100 >= r.question_count * 70)
            .count();
        let stats_summary = format!(
            "Avg correct: {:.0}% | Top scores (70%+): {}",
            avg_percent, top_scores
        );
        worksheet.merge_range(total_row, 3, total_row, 7, &stats_summary, &summary_fmt)?;
        for col in 8..columns.len() as u16 {
            worksheet.write_string_with_format(total_row, col, "", &summary_fmt)?;
        }

        // Freeze panes (header stays visible while scrolling)
        worksheet.set_freeze_panes(3, 0)?;

        // Auto-filter on data columns
        worksheet.autofilter(
            2,
            0,
            (data_start_row + rows.len() as u32 - 1).max(2),
            (columns.len() - 1) as u16,
        )?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
