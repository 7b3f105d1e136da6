//! Result rendering.
//!
//! A pure function from a [`DetectionResult`] to the ordered lines the UI
//! displays. Same input, same report: no clock, no randomness, no state.

use croploc_models::DetectionResult;
use serde::{Deserialize, Serialize};

/// Informational text shown when the service localized nothing.
const NO_OBJECTS_MESSAGE: &str = "No specific objects were localized in the selected region.";

/// Header line shown above a non-empty entry list.
const COMPLETE_MESSAGE: &str = "Object Localization Complete";

/// Caption shown when an entry's bounding polygon cannot be displayed.
const BOX_UNAVAILABLE_MESSAGE: &str = "Bounding box data unavailable.";

/// Severity/role of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Error,
    Info,
    Success,
    Entry,
    Caption,
}

/// One rendered line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLine {
    pub kind: LineKind,
    pub text: String,
}

impl ReportLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A deterministic, ordered rendering of one detection outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedReport {
    pub lines: Vec<ReportLine>,
}

impl RenderedReport {
    /// A report consisting of a single error line, used for transport and
    /// pipeline failures that never produced a structured result.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            lines: vec![ReportLine::new(LineKind::Error, message)],
        }
    }
}

/// Render a detection result for display.
///
/// - A service-reported error renders as exactly that message, nothing else.
/// - An empty entry list renders the informational no-objects line.
/// - Entries render in service order as a label/score line plus a caption
///   giving the diagonal corners of the bounding polygon; entries whose
///   polygon is missing or too short get a fallback caption instead.
pub fn render(result: &DetectionResult) -> RenderedReport {
    if let Some(error) = &result.error {
        return RenderedReport {
            lines: vec![ReportLine::new(LineKind::Error, error.clone())],
        };
    }

    if result.objects.is_empty() {
        return RenderedReport {
            lines: vec![ReportLine::new(LineKind::Info, NO_OBJECTS_MESSAGE)],
        };
    }

    let mut lines = Vec::with_capacity(1 + result.objects.len() * 2);
    lines.push(ReportLine::new(LineKind::Success, COMPLETE_MESSAGE));

    for object in &result.objects {
        lines.push(ReportLine::new(
            LineKind::Entry,
            format!("{} (Score: {:.2}%)", object.name, object.score * 100.0),
        ));

        let caption = match object.diagonal() {
            Some((first, third)) => format!(
                "Box: ({:.2}, {:.2}) to ({:.2}, {:.2})",
                first.x, first.y, third.x, third.y
            ),
            None => BOX_UNAVAILABLE_MESSAGE.to_string(),
        };
        lines.push(ReportLine::new(LineKind::Caption, caption));
    }

    RenderedReport { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use croploc_models::{DetectedObject, NormalizedVertex};

    fn cat() -> DetectedObject {
        DetectedObject {
            name: "Cat".to_string(),
            score: 0.8734,
            bounding_poly: vec![
                NormalizedVertex::new(0.1, 0.2),
                NormalizedVertex::new(0.9, 0.2),
                NormalizedVertex::new(0.9, 0.8),
                NormalizedVertex::new(0.1, 0.8),
            ],
        }
    }

    #[test]
    fn test_empty_result_renders_info() {
        let report = render(&DetectionResult::success(vec![]));
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].kind, LineKind::Info);
        assert_eq!(report.lines[0].text, NO_OBJECTS_MESSAGE);
    }

    #[test]
    fn test_error_renders_only_the_message() {
        let report = render(&DetectionResult::from_remote_error("quota exceeded"));
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].kind, LineKind::Error);
        assert_eq!(report.lines[0].text, "quota exceeded");
    }

    #[test]
    fn test_entry_formatting() {
        let report = render(&DetectionResult::success(vec![cat()]));

        assert_eq!(report.lines[0].kind, LineKind::Success);
        assert_eq!(report.lines[1].kind, LineKind::Entry);
        assert_eq!(report.lines[1].text, "Cat (Score: 87.34%)");
        assert_eq!(report.lines[2].kind, LineKind::Caption);
        assert_eq!(report.lines[2].text, "Box: (0.10, 0.20) to (0.90, 0.80)");
    }

    #[test]
    fn test_short_polygon_gets_fallback_caption() {
        let mut object = cat();
        object.bounding_poly.truncate(2);
        let report = render(&DetectionResult::success(vec![object]));

        assert_eq!(report.lines[1].text, "Cat (Score: 87.34%)");
        assert_eq!(report.lines[2].kind, LineKind::Caption);
        assert_eq!(report.lines[2].text, BOX_UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn test_entries_render_in_service_order() {
        let mut chair = cat();
        chair.name = "Chair".to_string();
        chair.score = 0.42;

        let report = render(&DetectionResult::success(vec![cat(), chair]));
        let entries: Vec<&str> = report
            .lines
            .iter()
            .filter(|l| l.kind == LineKind::Entry)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(entries, vec!["Cat (Score: 87.34%)", "Chair (Score: 42.00%)"]);
    }

    #[test]
    fn test_render_is_pure() {
        let result = DetectionResult::success(vec![cat()]);
        assert_eq!(render(&result), render(&result));
    }

    #[test]
    fn test_score_rounding() {
        let mut object = cat();
        object.score = 0.99999;
        let report = render(&DetectionResult::success(vec![object]));
        assert_eq!(report.lines[1].text, "Cat (Score: 100.00%)");
    }
}
