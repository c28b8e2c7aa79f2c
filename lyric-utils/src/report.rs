//! Downloadable study reports.
//!
//! The text report is full UTF-8 and carries the transcript, summary counts,
//! quiz results and the top-10 vocabulary table. The PDF report is a minimal
//! single page (score and word-count summary only, ASCII-safe for the
//! built-in Latin fonts) and is an optional capability: when the `pdf`
//! feature is not compiled in, the exporter is resolved as unavailable and
//! returns a typed error instead of bytes.

use std::fmt::Write;

use crate::aggregate::top_n;
use crate::{TranslatedLine, WordCount};

/// Everything a report needs from the session, borrowed.
#[derive(Clone, Copy, Debug)]
pub struct ReportInput<'a> {
    pub lines: &'a [TranslatedLine],
    pub word_counts: &'a [WordCount],
    pub filtered_tokens: usize,
    pub quiz_score: u32,
    pub quiz_answered: usize,
    pub quiz_total: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("PDF export is unavailable: the optional PDF backend was not compiled in")]
    PdfUnavailable,
    #[cfg(feature = "pdf")]
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// Whether PDF generation was compiled in. Resolved once at startup and
/// injected into the exporter rather than probed at call time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PdfCapability {
    Available,
    Unavailable,
}

impl PdfCapability {
    pub fn detect() -> Self {
        if cfg!(feature = "pdf") {
            PdfCapability::Available
        } else {
            PdfCapability::Unavailable
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ReportExporter {
    pdf: PdfCapability,
}

impl ReportExporter {
    pub fn new(pdf: PdfCapability) -> Self {
        Self { pdf }
    }

    pub fn detect() -> Self {
        Self::new(PdfCapability::detect())
    }

    pub fn pdf_capability(&self) -> PdfCapability {
        self.pdf
    }

    /// Plain-text report, UTF-8.
    pub fn export_text(&self, input: &ReportInput) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "========================================");
        let _ = writeln!(out, "        한국어 가사 학습 리포트");
        let _ = writeln!(out, "========================================");
        let _ = writeln!(out);

        let _ = writeln!(out, "[가사 번역]");
        for (i, line) in input.lines.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, line.source);
            let _ = writeln!(out, "   → {}", line.translated.as_str());
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "[분석 요약]");
        let _ = writeln!(out, "추출된 토큰 수: {}", input.filtered_tokens);
        let _ = writeln!(out, "고유 단어 수: {}", input.word_counts.len());
        let _ = writeln!(out);

        let _ = writeln!(out, "[퀴즈 결과]");
        if input.quiz_total == 0 {
            let _ = writeln!(out, "퀴즈 미응시");
        } else {
            let _ = writeln!(
                out,
                "점수: {}/100 ({}/{} 응답)",
                input.quiz_score, input.quiz_answered, input.quiz_total
            );
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "[단어 빈도 TOP 10]");
        for (i, wc) in top_n(input.word_counts, 10).iter().enumerate() {
            let _ = writeln!(
                out,
                "{:2}. {} ({}) - {}회",
                i + 1,
                wc.word,
                wc.pos.korean_label(),
                wc.count
            );
        }

        out
    }

    /// Minimal single-page PDF with the score and word-count summary.
    pub fn export_pdf(&self, input: &ReportInput) -> Result<Vec<u8>, ExportError> {
        match self.pdf {
            PdfCapability::Unavailable => Err(ExportError::PdfUnavailable),
            PdfCapability::Available => render_pdf(input),
        }
    }
}

/// Text lines for the PDF body. The built-in PDF fonts cannot encode Hangul,
/// so the page holds only the numeric summary.
fn pdf_summary_lines(input: &ReportInput) -> Vec<String> {
    vec![
        "Korean Lyrics Study Report".to_string(),
        "--------------------------".to_string(),
        format!(
            "Quiz score: {} / 100 ({} of {} answered)",
            input.quiz_score, input.quiz_answered, input.quiz_total
        ),
        format!("Tokens analyzed: {}", input.filtered_tokens),
        format!("Unique words: {}", input.word_counts.len()),
        format!(
            "Translation failures: {}",
            input.lines.iter().filter(|l| l.translated.is_failed()).count()
        ),
    ]
}

#[cfg(feature = "pdf")]
fn render_pdf(input: &ReportInput) -> Result<Vec<u8>, ExportError> {
    use printpdf::{BuiltinFont, Mm, PdfDocument};

    let (doc, page, layer) =
        PdfDocument::new("Korean Lyrics Study Report", Mm(210.0), Mm(297.0), "report");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut y = 270.0;
    for line in pdf_summary_lines(input) {
        // Keep the text WinAnsi-safe.
        let ascii: String = line
            .chars()
            .map(|c| if c.is_ascii() { c } else { '?' })
            .collect();
        layer.use_text(ascii, 12.0, Mm(20.0), Mm(y), &font);
        y -= 8.0;
    }

    doc.save_to_bytes().map_err(|e| ExportError::Pdf(e.to_string()))
}

#[cfg(not(feature = "pdf"))]
fn render_pdf(_input: &ReportInput) -> Result<Vec<u8>, ExportError> {
    // Capability was forced on without the backend compiled in.
    Err(ExportError::PdfUnavailable)
}
