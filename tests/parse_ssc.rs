use pretty_assertions::assert_eq;
use simfile_rs::simfile::{
    Format,
    model::{HoldKind, Note, StepKind},
    parse::{ParseError, Tolerance},
};

fn parse(source: &str) -> simfile_rs::simfile::model::RawSimfile {
    Format::Ssc
        .parse(source, Tolerance::Warn)
        .expect("fixture must parse")
}

const TWO_CHARTS: &str = "
#TITLE:Springtime;
#ARTIST:Kommisar;
#BPMS:0=181;
#NOTEDATA:;
#STEPSTYPE:dance-single;
#DIFFICULTY:Beginner;
#METER:2;
#NOTES:
0000
1000
0000
0100
;
#NOTEDATA:;
#STEPSTYPE:dance-single;
#DIFFICULTY:Challenge;
#METER:12;
#NOTES:
1111
;
";

#[test]
fn notedata_blocks_build_separate_charts() {
    let simfile = parse(TWO_CHARTS);

    assert_eq!(simfile.title, "Springtime");
    assert_eq!(
        simfile
            .available_types
            .iter()
            .map(|kind| kind.slug.as_str())
            .collect::<Vec<_>>(),
        vec!["single-beginner", "single-challenge"]
    );
    assert_eq!(simfile.available_types[1].feet, 12);

    let beginner = &simfile.charts["single-beginner"];
    assert_eq!(beginner.beats.len(), 2);
    assert_eq!(beginner.beats[0].offset, 1.0);
    assert_eq!(beginner.beats[1].offset, 3.0);

    // the trailing chart is committed at end of file
    let challenge = &simfile.charts["single-challenge"];
    assert_eq!(challenge.beats.len(), 1);
    assert_eq!(challenge.beats[0].steps.len(), 4);
}

#[test]
fn shared_timing_applies_to_every_chart() {
    let simfile = parse(TWO_CHARTS);
    for kind in &simfile.available_types {
        let chart = &simfile.charts[&kind.slug];
        assert_eq!(chart.bpm.len(), 1);
        assert_eq!(chart.bpm[0].bpm, 181.0);
        assert_eq!(chart.bpm[0].end_offset, None);
    }
}

#[test]
fn minepit_and_tail_lift_extensions() {
    let source = "
#TITLE:EXTENSIONS;
#BPMS:0=140;
#NOTEDATA:;
#STEPSTYPE:dance-single;
#DIFFICULTY:Challenge;
#METER:13;
#NOTES:
DM000
0000
0000
DL000
;
";
    let simfile = parse(source);
    let chart = &simfile.charts["single-challenge"];

    let mut holds = Vec::new();
    let mut lifts = Vec::new();
    for beat in &chart.beats {
        for note in &beat.steps {
            match note {
                Note::Hold(hold) => holds.push(*hold),
                Note::Step(step) if step.kind == StepKind::Lift => lifts.push(*step),
                Note::Step(_) => {}
            }
        }
    }

    assert_eq!(holds.len(), 1);
    assert_eq!(holds[0].kind, HoldKind::Minepit);
    assert_eq!(holds[0].column, 0);
    assert_eq!(holds[0].offset, 0.0);
    assert_eq!(holds[0].end_offset, 4.0);

    assert_eq!(lifts.len(), 1);
    assert_eq!(lifts[0].column, 0);
    assert_eq!(lifts[0].offset, 3.0);
}

#[test]
fn an_all_rest_chart_is_dropped_not_fatal() {
    let source = "
#TITLE:HALF EMPTY;
#BPMS:0=160;
#NOTEDATA:;
#STEPSTYPE:dance-single;
#DIFFICULTY:Beginner;
#METER:1;
#NOTES:
0000
0000
;
#NOTEDATA:;
#STEPSTYPE:dance-single;
#DIFFICULTY:Basic;
#METER:4;
#NOTES:
1000
;
";
    let simfile = parse(source);
    assert_eq!(simfile.available_types.len(), 1);
    assert_eq!(simfile.available_types[0].slug, "single-basic");
}

#[test]
fn displaybpm_parts_are_rounded_and_joined() {
    let source = "
#TITLE:ROUNDING;
#DISPLAYBPM:120.3:139.8;
#BPMS:0=120;
#NOTEDATA:;
#STEPSTYPE:dance-single;
#DIFFICULTY:Basic;
#METER:4;
#NOTES:
1000
;
";
    let simfile = parse(source);
    assert_eq!(simfile.display_bpm.as_deref(), Some("120-140"));
}

#[test]
fn empty_meta_values_do_not_overwrite() {
    let source = "
#TITLE:KEEP;
#ARTIST:;
#BPMS:0=120;
#NOTEDATA:;
#STEPSTYPE:dance-single;
#DIFFICULTY:Basic;
#METER:4;
#NOTES:
1000
;
";
    let simfile = parse(source);
    assert_eq!(simfile.title, "KEEP");
    assert_eq!(simfile.artist, None);
}

#[test]
fn chart_tag_outside_notedata_is_fatal() {
    let source = "
#TITLE:LOST TAG;
#BPMS:0=120;
#STEPSTYPE:dance-single;
";
    let err = Format::Ssc.parse(source, Tolerance::Warn).unwrap_err();
    let ParseError::Simfile { source: inner, .. } = err else {
        panic!("expected wrapped error, got {err:?}");
    };
    assert!(matches!(*inner, ParseError::ChartTagBeforeChart));
}

#[test]
fn notes_before_bpms_is_fatal() {
    let source = "
#TITLE:EAGER;
#NOTEDATA:;
#STEPSTYPE:dance-single;
#DIFFICULTY:Basic;
#METER:4;
#NOTES:
1000
;
";
    let err = Format::Ssc.parse(source, Tolerance::Warn).unwrap_err();
    let ParseError::Simfile { source: inner, .. } = err else {
        panic!("expected wrapped error, got {err:?}");
    };
    assert!(matches!(*inner, ParseError::MissingBpms));
}

#[test]
fn unknown_difficulty_drops_only_that_chart() {
    let source = "
#TITLE:PARTIAL;
#BPMS:0=120;
#NOTEDATA:;
#STEPSTYPE:dance-single;
#DIFFICULTY:Nightmare;
#METER:20;
#NOTES:
1000
;
#NOTEDATA:;
#STEPSTYPE:dance-single;
#DIFFICULTY:Expert;
#METER:9;
#NOTES:
0100
;
";
    let simfile = parse(source);
    assert_eq!(simfile.available_types.len(), 1);
    assert_eq!(simfile.available_types[0].slug, "single-expert");
}
