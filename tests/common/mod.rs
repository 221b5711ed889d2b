// Shared helpers for integration tests
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use coursesync::providers::{LlmProvider, ProviderRequest, ProviderResponse};
use coursesync::scrape::PageScraper;

/// Provider that answers with canned replies, in order
pub struct ScriptedProvider {
    replies: Mutex<Vec<String>>,
    seen: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        self.seen.lock().unwrap().push(request.clone());
        let text = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no scripted reply left"))?;
        Ok(ProviderResponse {
            id: "scripted".into(),
            model: "scripted".into(),
            text,
            stop_reason: Some("stop".into()),
            provider: "scripted".into(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted"
    }
}

/// Scraper that returns fixed content for every URL
pub struct StaticScraper(pub &'static str);

#[async_trait]
impl PageScraper for StaticScraper {
    async fn scrape(&self, _url: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

pub const SYLLABUS_REPLY: &str = r#"```json
{
  "course_name": "Linear Algebra",
  "course_code": "MATH 221",
  "instructor": "Prof. Noether",
  "assignments": [
    {"name": "Problem Set 1", "type": "homework", "due_date": "2025-09-15", "weight": 10, "estimated_hours": 6, "description": "Vectors"},
    {"name": "Midterm", "type": "exam", "due_date": "2025-10-20", "weight": 30, "description": "Chapters 1-4"}
  ]
}
```"#;

pub const WORKLOAD_REPLY: &str = r#"{"total_hours": 14, "weekly_breakdown": {"2025-09-08": 6, "2025-10-13": 8}, "risk_weeks": [], "recommendations": ["Review weekly"], "priority_assignments": ["Midterm"]}"#;

pub const SCHEDULE_REPLY: &str = r#"{"daily_schedule": {"2025-09-10": [{"assignment": "Problem Set 1", "task": "Questions 1-5", "hours": 3, "priority": "high"}]}, "warnings": [], "total_scheduled_hours": 3}"#;

pub const FEED_REPLY: &str = r#"[
  {"message": "Midterm in 3 weeks", "urgency": "low", "action": "Skim chapter 1", "send_at": "2025-09-29 09:00", "type": "reminder"},
  {"message": "Problem Set 1 due Monday", "urgency": "high", "action": "Finish questions 6-10", "send_at": "2025-09-13 18:00", "type": "deadline"}
]"#;

/// Single-page PDF with one Helvetica text line per entry
pub fn minimal_pdf(lines: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT /F1 12 Tf 72 720 Td 14 TL\n");
    for line in lines {
        let escaped = line
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        content.push_str(&format!("({}) Tj T*\n", escaped));
    }
    content.push_str("ET");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

pub const MULTIPART_BOUNDARY: &str = "coursesync-test-boundary";

/// multipart/form-data body: text fields, then an optional file part
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                MULTIPART_BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: application/pdf\r\n\r\n",
                MULTIPART_BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}
