//! Test diagnostics module functionality

use storyboard_rs::{
    chart::Chart,
    diagnostics::SimpleSource,
    storyboard::{StoryboardError, StoryboardWarning, parse_storyboard},
    unit::Viewport,
};

#[test]
fn test_simple_source_creation() {
    let source_text = r#"{"texts": [{"time": 0}]}"#;
    let source = SimpleSource::new("storyboard.json", source_text);

    assert_eq!(source.text(), source_text);
    assert_eq!(source.name(), "storyboard.json");
}

#[test]
fn test_simple_source_locates_tokens() {
    let source_text = "{\n  \"texts\": [\n    {\"color\": \"nope\"}\n  ]\n}";
    let source = SimpleSource::new("storyboard.json", source_text);

    let range = source.find_quoted("color");
    assert_eq!(&source_text[range], "\"color\"");
    assert_eq!(source.find_quoted("missing"), 0..0);
    assert_eq!(&source_text[source.offset_of(3, 5)..][..1], "{");
    assert_eq!(source.offset_of(99, 1), source_text.len());
}

#[cfg(feature = "diagnostics")]
mod reports {
    use storyboard_rs::diagnostics::{
        collect_storyboard_reports, emit_storyboard_warnings, storyboard_error_report,
    };

    use super::*;

    #[test]
    fn test_emit_warnings_with_real_storyboard() {
        let source = r#"{"texts": [{"time": 0, "color": "nope", "easing": "wobble"}], "meta": 1}"#;
        let output = parse_storyboard(source, &Chart::default(), &Viewport::default()).unwrap();
        assert_eq!(output.warnings.len(), 3);

        emit_storyboard_warnings("storyboard.json", source, &output.warnings);
        let reports = collect_storyboard_reports("storyboard.json", source, &output.warnings);
        assert_eq!(reports.len(), 3);
    }

    #[test]
    fn test_empty_warnings() {
        let empty_warnings: Vec<StoryboardWarning> = vec![];
        let reports = collect_storyboard_reports("storyboard.json", "{}", &empty_warnings);
        assert!(reports.is_empty());
    }

    #[test]
    fn test_error_report() {
        let source = "{\"texts\": [\n  {\"time\": \"start:12\"}\n]}";
        let err = parse_storyboard(source, &Chart::default(), &Viewport::default()).unwrap_err();
        assert_eq!(err, StoryboardError::UnknownNote(12));

        let report = storyboard_error_report("storyboard.json", source, &err);
        let mut rendered = Vec::new();
        report
            .write(
                ("storyboard.json".to_string(), ariadne::Source::from(source)),
                &mut rendered,
            )
            .unwrap();
        assert!(String::from_utf8(rendered).unwrap().contains("storyboard error"));
    }
}
